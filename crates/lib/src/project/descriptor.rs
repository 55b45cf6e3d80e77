//! On-disk shape of a project descriptor.
//!
//! ```json
//! {
//!   "kind": "application",
//!   "target": "android-17",
//!   "defaultConfig": { "name": "main", "versionCode": 1 },
//!   "sourceRoots": { "main": { "res": "res" } },
//!   "buildTypes": [{ "name": "staging", "debuggable": true }],
//!   "productFlavors": [{ "name": "free", "packageName": "com.example.free" }],
//!   "libraries": {
//!     "core": { "folder": "libs/core" },
//!     "ui": { "folder": "libs/ui", "dependencies": ["core"] }
//!   },
//!   "dependencies": ["ui"],
//!   "jars": ["libs/gson.jar"],
//!   "aaptOptions": { "noCompress": ["ogg"] },
//!   "dexOptions": { "jumboMode": true }
//! }
//! ```

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::{BuildType, ConfigLayer};
use crate::orchestrator::{AaptOptions, DexOptions};
use crate::source::SourceRoot;
use crate::variant::VariantKind;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ProjectDescriptor {
  pub kind: VariantKind,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target: Option<String>,
  pub default_config: ConfigLayer,
  /// Source roots that differ from the conventional `src/<name>` layout.
  pub source_roots: BTreeMap<String, SourceRootDecl>,
  pub build_types: Vec<BuildTypeDecl>,
  /// Flavors in declaration order.
  pub product_flavors: Vec<ConfigLayer>,
  pub libraries: BTreeMap<String, LibraryDecl>,
  /// Names from `libraries`, highest priority first.
  pub dependencies: Vec<String>,
  pub jars: Vec<PathBuf>,
  pub aapt_options: AaptOptions,
  pub dex_options: DexOptions,
}

/// A build type declaration. Unset fields keep the preset for that name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildTypeDecl {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub debuggable: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub debug_jni_build: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub debug_signed: Option<bool>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub package_name_suffix: Option<String>,
  pub build_config_lines: Vec<String>,
}

impl BuildTypeDecl {
  pub fn to_build_type(&self) -> BuildType {
    let mut build_type = BuildType::new(&self.name);
    if let Some(v) = self.debuggable {
      build_type.debuggable = v;
    }
    if let Some(v) = self.debug_jni_build {
      build_type.debug_jni_build = v;
    }
    if let Some(v) = self.debug_signed {
      build_type.debug_signed = v;
    }
    if self.package_name_suffix.is_some() {
      build_type.package_name_suffix = self.package_name_suffix.clone();
    }
    build_type.add_build_config_lines(self.build_config_lines.iter().cloned());
    build_type
  }
}

/// An entry of the library table.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LibraryDecl {
  /// Bundle folder holding `AndroidManifest.xml`, `classes.jar`, `res`...
  pub folder: PathBuf,
  /// Other library names this one depends on.
  pub dependencies: Vec<String>,
}

/// Overrides for one source root. Paths are relative to `dir`, which itself
/// defaults to `src/<name>`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SourceRootDecl {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub dir: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub manifest: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub res: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub assets: Option<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub resources: Option<Vec<PathBuf>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub java: Option<Vec<PathBuf>>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub aidl: Option<Vec<PathBuf>>,
}

impl SourceRootDecl {
  /// Resolve against the project folder.
  pub fn to_source_root(&self, name: &str, project_dir: &Path) -> SourceRoot {
    let dir = match &self.dir {
      Some(dir) => project_dir.join(dir),
      None => conventional_dir(name, project_dir),
    };
    let mut root = SourceRoot::conventional(name, &dir);
    if let Some(manifest) = &self.manifest {
      root.manifest = Some(dir.join(manifest));
    }
    if let Some(res) = &self.res {
      root.resources = Some(dir.join(res));
    }
    if let Some(assets) = &self.assets {
      root.assets = Some(dir.join(assets));
    }
    if let Some(resources) = &self.resources {
      root.java_resources = resources.iter().map(|p| dir.join(p)).collect();
    }
    if let Some(java) = &self.java {
      root.java_sources = java.iter().map(|p| dir.join(p)).collect();
    }
    if let Some(aidl) = &self.aidl {
      root.aidl = aidl.iter().map(|p| dir.join(p)).collect();
    }
    root
  }
}

pub(crate) fn conventional_dir(name: &str, project_dir: &Path) -> PathBuf {
  project_dir.join("src").join(name)
}
