//! Source roots: the files contributed by one configuration layer.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// A filesystem-rooted bundle of inputs owned by one layer slot of a variant.
///
/// Every location is optional: a missing folder simply contributes nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceRoot {
  pub name: String,
  /// Absent for pure test source roots.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub manifest: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resources: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assets: Option<PathBuf>,
  pub java_resources: Vec<PathBuf>,
  pub java_sources: Vec<PathBuf>,
  pub aidl: Vec<PathBuf>,
  pub compile_classpath: Vec<PathBuf>,
}

impl SourceRoot {
  pub const MANIFEST_FILE: &'static str = "AndroidManifest.xml";

  /// Build a source root following the conventional layout under `dir`:
  /// `AndroidManifest.xml`, `res`, `assets`, `resources`, `java` and `aidl`.
  pub fn conventional(name: &str, dir: &Path) -> Self {
    Self {
      name: name.to_string(),
      manifest: Some(dir.join(Self::MANIFEST_FILE)),
      resources: Some(dir.join("res")),
      assets: Some(dir.join("assets")),
      java_resources: vec![dir.join("resources")],
      java_sources: vec![dir.join("java")],
      aidl: vec![dir.join("aidl")],
      compile_classpath: Vec::new(),
    }
  }

  /// The manifest, only if it exists as a regular file.
  pub fn existing_manifest(&self) -> Option<&Path> {
    self.manifest.as_deref().filter(|p| p.is_file())
  }

  /// Java-resource folders that exist on disk, in declaration order.
  pub fn existing_java_resources(&self) -> impl Iterator<Item = &Path> {
    self.java_resources.iter().map(PathBuf::as_path).filter(|p| p.is_dir())
  }
}
