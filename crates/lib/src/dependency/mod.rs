//! Resolved library dependencies.
//!
//! A [`DependencyNode`] is an already-resolved library bundle on disk. Its
//! artifacts live at fixed locations under the bundle's root folder. Nodes are
//! shared through [`Arc`] so that a library reachable from several parents is
//! the same value everywhere in the tree.
//!
//! Node identity is the root folder: two nodes with the same root are the same
//! library, which is what [`flatten`] deduplicates on and what cycle detection
//! keys on.

mod flatten;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::Serialize;
use thiserror::Error;

pub use flatten::flatten;

/// Errors raised while ordering the dependency graph.
#[derive(Debug, Error)]
pub enum DependencyError {
  /// A library depends, directly or transitively, on itself.
  #[error("dependency cycle detected: {chain}")]
  Cycle { chain: String },
}

/// A single resolved library module and its own resolved dependencies.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DependencyNode {
  name: String,
  root: PathBuf,
  #[serde(skip)]
  dependencies: Vec<Arc<DependencyNode>>,
}

impl DependencyNode {
  pub const MANIFEST: &'static str = "AndroidManifest.xml";
  pub const CLASSES_JAR: &'static str = "classes.jar";
  pub const RES: &'static str = "res";
  pub const ASSETS: &'static str = "assets";
  pub const JNI: &'static str = "jni";
  pub const AIDL: &'static str = "aidl";
  pub const PROGUARD_RULES: &'static str = "proguard.txt";
  pub const LINT_JAR: &'static str = "lint.jar";

  pub fn new(name: &str, root: impl Into<PathBuf>) -> Self {
    Self {
      name: name.to_string(),
      root: root.into(),
      dependencies: Vec::new(),
    }
  }

  pub fn with_dependencies(mut self, dependencies: Vec<Arc<DependencyNode>>) -> Self {
    self.dependencies = dependencies;
    self
  }

  pub fn into_arc(self) -> Arc<Self> {
    Arc::new(self)
  }

  pub fn name(&self) -> &str {
    &self.name
  }

  /// The bundle's root folder, also the node's identity.
  pub fn root(&self) -> &Path {
    &self.root
  }

  pub fn dependencies(&self) -> &[Arc<DependencyNode>] {
    &self.dependencies
  }

  pub fn has_dependencies(&self) -> bool {
    !self.dependencies.is_empty()
  }

  pub fn manifest(&self) -> PathBuf {
    self.root.join(Self::MANIFEST)
  }

  pub fn jar_file(&self) -> PathBuf {
    self.root.join(Self::CLASSES_JAR)
  }

  pub fn res_folder(&self) -> PathBuf {
    self.root.join(Self::RES)
  }

  pub fn assets_folder(&self) -> PathBuf {
    self.root.join(Self::ASSETS)
  }

  pub fn jni_folder(&self) -> PathBuf {
    self.root.join(Self::JNI)
  }

  pub fn aidl_folder(&self) -> PathBuf {
    self.root.join(Self::AIDL)
  }

  pub fn proguard_rules(&self) -> PathBuf {
    self.root.join(Self::PROGUARD_RULES)
  }

  pub fn lint_jar(&self) -> PathBuf {
    self.root.join(Self::LINT_JAR)
  }
}

impl PartialEq for DependencyNode {
  fn eq(&self, other: &Self) -> bool {
    self.root == other.root
  }
}

impl Eq for DependencyNode {}

/// A plain jar dependency: contributes classes and Java resources, nothing else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JarDependency {
  pub location: PathBuf,
}

impl JarDependency {
  pub fn new(location: impl Into<PathBuf>) -> Self {
    Self {
      location: location.into(),
    }
  }
}
