//! Manifest parsing and merging.
//!
//! The plan only needs one fact from a manifest, its declared package, which it
//! reads through a [`ManifestParser`] handed in at construction. Merging is
//! delegated to an external tool behind [`ManifestMerger`].

mod merger;
mod test_manifest;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use thiserror::Error;

use crate::error::ErrorKind;
use crate::process::ProcessError;

pub use merger::{ManifestMerger, ToolManifestMerger};
pub use test_manifest::write_test_manifest;

/// Errors from reading, generating or merging manifests.
#[derive(Debug, Error)]
pub enum ManifestError {
  #[error("failed to read manifest {path}: {source}")]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("manifest {path} does not declare a package")]
  MissingPackage { path: PathBuf },

  #[error("failed to write manifest {path}: {source}")]
  Write {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  /// The merge tool could not be run or exited non-zero.
  #[error("manifest merge tool failed: {0}")]
  Tool(#[from] ProcessError),

  /// The merge tool reported failure without erroring.
  #[error("manifest merge into {output} failed")]
  Rejected { output: PathBuf },
}

impl ManifestError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ManifestError::Read { .. } | ManifestError::Write { .. } => ErrorKind::Io,
      ManifestError::MissingPackage { .. } => ErrorKind::Configuration,
      ManifestError::Tool(_) | ManifestError::Rejected { .. } => ErrorKind::ExternalTool,
    }
  }
}

/// Reads the package name a manifest declares.
pub trait ManifestParser: Send + Sync {
  fn package_name(&self, manifest: &Path) -> Result<String, ManifestError>;
}

static PACKAGE_ATTR: LazyLock<Regex> = LazyLock::new(|| {
  Regex::new(r#"(?s)<manifest\b[^>]*?\spackage\s*=\s*["']([^"']+)["']"#).unwrap()
});

/// Extracts the `package` attribute of the root `<manifest>` element.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexManifestParser;

impl RegexManifestParser {
  /// Parse the package out of manifest text.
  pub fn parse(content: &str) -> Option<&str> {
    let content = strip_comments(content);
    PACKAGE_ATTR
      .captures(content)
      .and_then(|c| c.get(1))
      .map(|m| m.as_str().trim())
      .filter(|p| !p.is_empty())
  }
}

impl ManifestParser for RegexManifestParser {
  fn package_name(&self, manifest: &Path) -> Result<String, ManifestError> {
    let content = fs::read_to_string(manifest).map_err(|source| ManifestError::Read {
      path: manifest.to_path_buf(),
      source,
    })?;
    Self::parse(&content)
      .map(str::to_string)
      .ok_or_else(|| ManifestError::MissingPackage {
        path: manifest.to_path_buf(),
      })
  }
}

// Leading comments and the XML declaration may mention `package=`.
fn strip_comments(content: &str) -> &str {
  let mut rest = content;
  loop {
    let trimmed = rest.trim_start();
    if let Some(after) = trimmed.strip_prefix("<!--") {
      match after.find("-->") {
        Some(end) => rest = &after[end + 3..],
        None => return "",
      }
    } else if trimmed.starts_with("<?") {
      match trimmed.find("?>") {
        Some(end) => rest = &trimmed[end + 2..],
        None => return "",
      }
    } else {
      return trimmed;
    }
  }
}
