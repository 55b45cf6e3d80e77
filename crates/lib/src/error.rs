//! Top-level build error and its taxonomy.
//!
//! Each module reports its own error type. Everything that reaches the caller
//! of the orchestrator is a [`BuildError`], which carries an [`ErrorKind`] tag
//! and keeps the module error as its source.

use std::fmt;
use std::io;
use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use crate::dependency::DependencyError;
use crate::manifest::ManifestError;
use crate::package::{PackageError, SigningError};
use crate::process::ProcessError;
use crate::project::ProjectError;
use crate::sdk::SdkError;
use crate::variant::PlanError;

/// Failure classes a build driver can react to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
  /// A precondition was violated: missing variant, target, path or manifest.
  Configuration,
  /// An external program failed or reported failure.
  ExternalTool,
  /// Two package inputs provide the same archive path.
  PackagingConflict,
  /// Signing credentials were missing or unusable.
  Signing,
  /// A library depends on itself.
  DependencyCycle,
  Io,
}

impl fmt::Display for ErrorKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      ErrorKind::Configuration => "configuration",
      ErrorKind::ExternalTool => "external-tool",
      ErrorKind::PackagingConflict => "packaging-conflict",
      ErrorKind::Signing => "signing",
      ErrorKind::DependencyCycle => "dependency-cycle",
      ErrorKind::Io => "io",
    };
    f.write_str(s)
  }
}

/// Any failure surfaced by the build engine.
#[derive(Debug, Error)]
pub enum BuildError {
  /// An orchestrator step was entered without what it needs.
  #[error("{0}")]
  Precondition(String),

  #[error(transparent)]
  Plan(#[from] PlanError),

  #[error(transparent)]
  Dependency(#[from] DependencyError),

  #[error(transparent)]
  Manifest(#[from] ManifestError),

  #[error(transparent)]
  Process(#[from] ProcessError),

  #[error(transparent)]
  Package(#[from] PackageError),

  #[error(transparent)]
  Signing(#[from] SigningError),

  #[error(transparent)]
  Sdk(#[from] SdkError),

  #[error(transparent)]
  Project(#[from] ProjectError),

  #[error("io error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl BuildError {
  pub fn precondition(message: impl Into<String>) -> Self {
    BuildError::Precondition(message.into())
  }

  pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
    BuildError::Io {
      path: path.into(),
      source,
    }
  }

  pub fn kind(&self) -> ErrorKind {
    match self {
      BuildError::Precondition(_) => ErrorKind::Configuration,
      BuildError::Plan(e) => e.kind(),
      BuildError::Dependency(_) => ErrorKind::DependencyCycle,
      BuildError::Manifest(e) => e.kind(),
      BuildError::Process(_) => ErrorKind::ExternalTool,
      BuildError::Package(e) => e.kind(),
      BuildError::Signing(_) => ErrorKind::Signing,
      BuildError::Sdk(_) => ErrorKind::Configuration,
      BuildError::Project(e) => e.kind(),
      BuildError::Io { .. } => ErrorKind::Io,
    }
  }
}
