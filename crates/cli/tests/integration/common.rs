//! Shared test helpers for CLI integration tests.

use std::path::{Path, PathBuf};

use assert_cmd::Command;
use assert_cmd::cargo::cargo_bin_cmd;
use tempfile::TempDir;

/// Get path to a fixture file.
pub fn fixture_path(name: &str) -> PathBuf {
  PathBuf::from(env!("CARGO_MANIFEST_DIR"))
    .join("tests")
    .join("fixtures")
    .join(name)
}

/// Read fixture content.
pub fn fixture_content(name: &str) -> String {
  std::fs::read_to_string(fixture_path(name)).unwrap_or_else(|e| panic!("Failed to load fixture {}: {}", name, e))
}

/// Write a minimal manifest declaring `package`.
pub fn manifest_xml(package: &str) -> String {
  format!(
    r#"<?xml version="1.0" encoding="utf-8"?>
<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="{}">
</manifest>
"#,
    package
  )
}

/// Isolated test environment.
///
/// Each test gets its own project folder with a main manifest and its own
/// per-user directory, so no real debug keystore is touched.
pub struct TestEnv {
  pub temp: TempDir,
  pub project_path: PathBuf,
}

impl TestEnv {
  /// Copy a fixture to `vforge.json` in a fresh project folder.
  pub fn from_fixture(name: &str) -> Self {
    let env = Self::empty();
    std::fs::write(&env.project_path, fixture_content(name)).unwrap();
    env
  }

  /// A project folder with only the main manifest.
  pub fn empty() -> Self {
    let temp = TempDir::new().unwrap();
    let project_path = temp.path().join("vforge.json");
    let env = Self { temp, project_path };
    env.write_file("src/main/AndroidManifest.xml", &manifest_xml("com.example"));
    env
  }

  pub fn path(&self, relative_path: &str) -> PathBuf {
    self.temp.path().join(relative_path)
  }

  /// Write a file relative to the temp directory.
  pub fn write_file(&self, relative_path: &str, content: &str) -> PathBuf {
    let path = self.path(relative_path);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent).unwrap();
    }
    std::fs::write(&path, content).unwrap();
    path
  }

  /// A library bundle folder with its manifest.
  pub fn library(&self, folder: &str, package: &str) {
    self.write_file(&format!("{}/AndroidManifest.xml", folder), &manifest_xml(package));
  }

  /// The vforge binary with SDK and user-directory variables isolated.
  pub fn cmd(&self) -> Command {
    let mut cmd = cargo_bin_cmd!("vforge");
    cmd
      .env_remove("ANDROID_SDK_ROOT")
      .env_remove("ANDROID_HOME")
      .env_remove("RUST_LOG")
      .env("ANDROID_SDK_HOME", self.path("home"));
    cmd
  }

  /// Write a resource archive for the fake `aapt` to hand out.
  pub fn resource_archive(&self) -> PathBuf {
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    let path = self.path("fixture.ap_");
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = zip::ZipWriter::new(file);
    zip.start_file("resources.arsc", SimpleFileOptions::default()).unwrap();
    zip.write_all(b"arsc").unwrap();
    zip.finish().unwrap();
    path
  }

  /// An SDK whose tools are shell scripts leaving plausible outputs behind.
  #[cfg(unix)]
  pub fn fake_sdk(&self) -> PathBuf {
    let archive = self.resource_archive();
    let root = self.path("sdk");
    let platform = root.join("platforms").join("android-17");
    std::fs::create_dir_all(&platform).unwrap();
    std::fs::write(platform.join("android.jar"), "").unwrap();
    std::fs::write(platform.join("framework.aidl"), "").unwrap();

    let aapt = format!(
      r#"#!/bin/sh
echo "aapt $*" >> "{log}"
while [ $# -gt 0 ]; do
  if [ "$1" = "-F" ]; then cp "{archive}" "$2"; fi
  shift
done
"#,
      log = self.path("tools.log").display(),
      archive = archive.display()
    );
    let dx = format!(
      r#"#!/bin/sh
echo "dx $*" >> "{log}"
while [ $# -gt 0 ]; do
  case "$1" in --output=*) echo dex > "${{1#--output=}}" ;; --output) echo dex > "$2" ;; esac
  shift
done
"#,
      log = self.path("tools.log").display()
    );
    let merger = r#"#!/bin/sh
while [ $# -gt 0 ]; do
  case "$1" in --out) out="$2" ;; --main) main="$2" ;; esac
  shift
done
cp "$main" "$out"
"#;
    let noop = "#!/bin/sh\nexit 0\n";

    write_script(&root.join("platform-tools").join("aapt"), &aapt);
    write_script(&root.join("platform-tools").join("dx"), &dx);
    write_script(&root.join("platform-tools").join("aidl"), noop);
    write_script(&root.join("tools").join("manifmerger"), merger);
    root
  }

  pub fn tool_log(&self) -> String {
    std::fs::read_to_string(self.path("tools.log")).unwrap_or_default()
  }
}

#[cfg(unix)]
fn write_script(path: &Path, content: &str) {
  use std::os::unix::fs::PermissionsExt;

  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
  std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o755)).unwrap();
}
