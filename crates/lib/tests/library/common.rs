//! Shared fixtures for library integration tests.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use vforge_lib::project::{Project, ProjectDescriptor};

pub fn write(path: &Path, content: &str) -> PathBuf {
  std::fs::create_dir_all(path.parent().unwrap()).unwrap();
  std::fs::write(path, content).unwrap();
  path.to_path_buf()
}

pub fn manifest(path: &Path, package: &str) -> PathBuf {
  write(
    path,
    &format!(
      r#"<manifest xmlns:android="http://schemas.android.com/apk/res/android" package="{}"/>"#,
      package
    ),
  )
}

/// A project folder with a main manifest, loaded from `json`.
pub struct Workspace {
  pub temp: TempDir,
}

impl Workspace {
  pub fn new() -> Self {
    let temp = TempDir::new().unwrap();
    manifest(&temp.path().join("src/main/AndroidManifest.xml"), "com.example");
    Self { temp }
  }

  pub fn path(&self, rel: &str) -> PathBuf {
    self.temp.path().join(rel)
  }

  pub fn mkdir(&self, rel: &str) -> PathBuf {
    let path = self.path(rel);
    std::fs::create_dir_all(&path).unwrap();
    path
  }

  /// A library bundle folder under `libs/<name>`.
  pub fn library(&self, name: &str, package: &str) -> PathBuf {
    let dir = self.path(&format!("libs/{}", name));
    manifest(&dir.join("AndroidManifest.xml"), package);
    std::fs::create_dir_all(dir.join("res")).unwrap();
    dir
  }

  pub fn project(&self, json: &str) -> Project {
    let descriptor: ProjectDescriptor = serde_json::from_str(json).unwrap();
    Project::from_descriptor(self.temp.path(), descriptor).unwrap()
  }
}
