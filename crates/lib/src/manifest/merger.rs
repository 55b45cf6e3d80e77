use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::ManifestError;
use crate::process::{CommandRunner, ToolCommand};

/// Merges a main manifest with overlay manifests into `output`.
///
/// Returns `Ok(false)` when the merge ran but did not succeed. Callers treat
/// that exactly like an error.
pub trait ManifestMerger: Send + Sync {
  fn merge(&self, output: &Path, main: &Path, overlays: &[PathBuf]) -> Result<bool, ManifestError>;
}

/// Runs the SDK's command-line manifest merger:
/// `manifmerger merge --out <output> --main <main> [--libs <a:b:...>]`.
pub struct ToolManifestMerger {
  tool: PathBuf,
  runner: Arc<dyn CommandRunner>,
}

impl ToolManifestMerger {
  pub fn new(tool: impl Into<PathBuf>, runner: Arc<dyn CommandRunner>) -> Self {
    Self {
      tool: tool.into(),
      runner,
    }
  }

  fn command(&self, output: &Path, main: &Path, overlays: &[PathBuf]) -> ToolCommand {
    let mut cmd = ToolCommand::new(&self.tool);
    cmd.arg("merge").flag_path("--out", output).flag_path("--main", main);
    if !overlays.is_empty() {
      let libs = overlays
        .iter()
        .map(|p| p.to_string_lossy().into_owned())
        .collect::<Vec<_>>()
        .join(":");
      cmd.flag("--libs", libs);
    }
    cmd
  }
}

impl ManifestMerger for ToolManifestMerger {
  fn merge(&self, output: &Path, main: &Path, overlays: &[PathBuf]) -> Result<bool, ManifestError> {
    debug!(main = %main.display(), overlays = overlays.len(), "merging manifests");
    // Success is judged by the file the tool writes, so nothing may pre-exist.
    if output.exists() {
      fs::remove_file(output).map_err(|source| ManifestError::Write {
        path: output.to_path_buf(),
        source,
      })?;
    }
    self.runner.run(&self.command(output, main, overlays))?;
    Ok(output.is_file())
  }
}
