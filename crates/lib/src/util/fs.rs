//! Deterministic directory walking.

use std::io;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

/// A regular file found under a walked root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalkedFile {
  /// Path relative to the walked root, `/`-separated.
  pub relative: String,
  pub path: PathBuf,
}

/// List every regular file under `root`, sorted by path.
///
/// Directories for which `keep_dir` returns false are not descended into.
/// Symlinks are followed so that linked resource folders package like real ones.
pub fn walk_files<F>(root: &Path, keep_dir: F) -> io::Result<Vec<WalkedFile>>
where
  F: Fn(&str) -> bool,
{
  let walker = WalkDir::new(root)
    .follow_links(true)
    .sort_by_file_name()
    .into_iter()
    .filter_entry(|e| {
      if e.depth() == 0 || !e.file_type().is_dir() {
        return true;
      }
      e.file_name().to_str().map(&keep_dir).unwrap_or(false)
    });

  let mut files = Vec::new();
  for entry in walker {
    let entry = entry?;
    if !entry.file_type().is_file() {
      continue;
    }
    let relative = relative_slash_path(root, entry.path());
    files.push(WalkedFile {
      relative,
      path: entry.into_path(),
    });
  }
  Ok(files)
}

/// Every file under `root` whose extension is `ext`, sorted by path.
pub fn files_with_extension(root: &Path, ext: &str) -> io::Result<Vec<PathBuf>> {
  Ok(
    walk_files(root, |_| true)?
      .into_iter()
      .map(|f| f.path)
      .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(ext))
      .collect(),
  )
}

fn relative_slash_path(root: &Path, path: &Path) -> String {
  path
    .strip_prefix(root)
    .unwrap_or(path)
    .components()
    .map(|c| c.as_os_str().to_string_lossy())
    .collect::<Vec<_>>()
    .join("/")
}
