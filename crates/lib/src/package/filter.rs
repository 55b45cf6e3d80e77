//! Which Java-resource files make it into a package.

const SKIPPED_FOLDERS: &[&str] = &["CVS", ".svn", "SCCS", "META-INF"];
const SKIPPED_EXTENSIONS: &[&str] = &["aidl", "rs", "java", "class", "scc", "swp"];
const SKIPPED_FILES: &[&str] = &["thumbs.db", "picasa.ini", "package.html", "overview.html"];

/// Whether files below a folder with this name are packaged.
pub fn keep_folder(name: &str) -> bool {
  !SKIPPED_FOLDERS.iter().any(|f| name.eq_ignore_ascii_case(f)) && !name.starts_with('_')
}

/// Whether a file with this name is packaged.
pub fn keep_file(name: &str) -> bool {
  if name.starts_with('.') || name.ends_with('~') {
    return false;
  }
  let lower = name.to_ascii_lowercase();
  if SKIPPED_FILES.contains(&lower.as_str()) {
    return false;
  }
  match lower.rsplit_once('.') {
    Some((_, ext)) => !SKIPPED_EXTENSIONS.contains(&ext),
    None => true,
  }
}

/// Whether a `/`-separated archive path passes both the folder and file rules.
pub fn keep_archive_path(path: &str) -> bool {
  let mut segments: Vec<&str> = path.split('/').collect();
  let Some(file) = segments.pop().filter(|f| !f.is_empty()) else {
    return false;
  };
  segments.iter().all(|s| keep_folder(s)) && keep_file(file)
}
