//! Bytecode conversion.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Builder, create_parent};
use crate::error::BuildError;
use crate::process::ToolCommand;

/// Options for the dex converter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DexOptions {
  /// Allow more than 65k string references.
  pub jumbo_mode: bool,
  /// Allow classes in core library packages.
  pub core_library: bool,
}

impl Builder {
  /// Convert compiled classes and library jars into `out_dex`.
  ///
  /// Always a full conversion of every input.
  pub fn convert_bytecode(
    &self,
    classes: &[PathBuf],
    libraries: &[PathBuf],
    out_dex: &Path,
    options: &DexOptions,
  ) -> Result<(), BuildError> {
    self.variant()?;
    let target = self.target()?;
    if classes.is_empty() && libraries.is_empty() {
      return Err(BuildError::precondition("no class inputs to convert"));
    }
    create_parent(out_dex)?;

    let mut cmd = ToolCommand::new(&target.dx);
    cmd.arg("--dex");
    if self.verbose {
      cmd.arg("--verbose");
    }
    cmd.flag_path("--output", out_dex);
    if options.jumbo_mode {
      cmd.arg("--force-jumbo");
    }
    if options.core_library {
      cmd.arg("--core-library");
    }

    debug!(inputs = ?classes, "dex class inputs");
    debug!(inputs = ?libraries, "dex library inputs");
    for input in classes.iter().chain(libraries) {
      cmd.path_arg(input);
    }

    info!(output = %out_dex.display(), "converting bytecode");
    self.run(&cmd)
  }
}
