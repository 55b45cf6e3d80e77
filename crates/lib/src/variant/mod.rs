//! Build variants.
//!
//! A [`VariantPlan`] combines the default configuration, one build type, an
//! ordered list of flavors and the resolved library graph, and answers every
//! "what goes into this build" question the orchestrator asks.

mod plan;

use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::dependency::DependencyError;
use crate::error::ErrorKind;
use crate::manifest::ManifestError;

pub use plan::VariantPlan;

/// What a variant produces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VariantKind {
  /// An installable application package.
  #[default]
  Application,
  /// A library bundle consumed by other variants.
  Library,
  /// An instrumentation test package for another variant.
  Test,
}

impl fmt::Display for VariantKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      VariantKind::Application => "application",
      VariantKind::Library => "library",
      VariantKind::Test => "test",
    };
    f.write_str(s)
  }
}

/// Errors raised while assembling or querying a plan.
#[derive(Debug, Error)]
pub enum PlanError {
  #[error("main manifest missing from {}", path.display())]
  MissingManifest { path: PathBuf },

  #[error("source root '{source_root}' declares no manifest")]
  ManifestNotDeclared { source_root: String },

  #[error("a test variant needs a tested variant")]
  MissingTestedPlan,

  #[error("a test variant cannot test another test variant")]
  NestedTest,

  #[error(transparent)]
  Dependency(#[from] DependencyError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),
}

impl PlanError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      PlanError::Dependency(_) => ErrorKind::DependencyCycle,
      PlanError::Manifest(e) => e.kind(),
      _ => ErrorKind::Configuration,
    }
  }
}
