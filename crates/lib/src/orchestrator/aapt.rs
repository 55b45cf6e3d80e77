//! Resource compilation.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::{Builder, create_dir, create_parent};
use crate::error::BuildError;
use crate::process::ToolCommand;
use crate::variant::VariantKind;

/// Caller-supplied resource compiler options.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct AaptOptions {
  /// Pattern of asset names to leave out of the package.
  #[serde(skip_serializing_if = "Option::is_none")]
  pub ignore_assets: Option<String>,
  /// Extensions stored without compression.
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub no_compress: Vec<String>,
}

/// Where resource processing writes its outputs. Every output is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResourceOutputs {
  /// Folder for the generated `R.java`.
  pub source_dir: Option<PathBuf>,
  /// Compiled resource archive. Never produced for library variants.
  pub package: Option<PathBuf>,
  /// Keep rules for shrinking, only written alongside `package`.
  pub proguard: Option<PathBuf>,
}

impl Builder {
  /// Compile resources against `manifest`.
  ///
  /// `preprocessed` is the crunch output; it takes priority over every other
  /// resource folder when it exists.
  pub fn process_resources(
    &self,
    manifest: &Path,
    preprocessed: Option<&Path>,
    outputs: &ResourceOutputs,
    options: &AaptOptions,
  ) -> Result<(), BuildError> {
    let plan = self.variant()?;
    let target = self.target()?;
    if !manifest.is_file() {
      return Err(BuildError::precondition(format!(
        "manifest {} does not exist",
        manifest.display()
      )));
    }

    let mut cmd = ToolCommand::new(&target.aapt);
    cmd.arg("package");
    if self.verbose {
      cmd.arg("-v");
    }
    cmd
      .arg("-f")
      .arg("--no-crunch")
      .flag_path("-I", &target.android_jar)
      .flag_path("-M", manifest);

    if let Some(dir) = preprocessed.filter(|d| d.is_dir()) {
      cmd.flag_path("-S", dir);
    }
    for res in plan.resource_inputs().iter().filter(|d| d.is_dir()) {
      cmd.flag_path("-S", res);
    }
    cmd.arg("--auto-add-overlay");

    if let Some(assets) = plan.default_source().assets.as_deref().filter(|d| d.is_dir()) {
      cmd.flag_path("-A", assets);
    }

    if let Some(dir) = &outputs.source_dir {
      create_dir(dir)?;
      cmd.arg("-m").flag_path("-J", dir);
    }
    if plan.kind() != VariantKind::Library
      && let Some(package) = &outputs.package
    {
      create_parent(package)?;
      cmd.flag_path("-F", package);
      if let Some(proguard) = &outputs.proguard {
        create_parent(proguard)?;
        cmd.flag_path("-G", proguard);
      }
    }

    if plan.build_type().debuggable {
      cmd.arg("--debug-mode");
    }

    if plan.kind() == VariantKind::Application {
      if let Some(package) = plan.package_override()? {
        debug!(package = %package, "inserting package in manifest");
        cmd.flag("--rename-manifest-package", package);
      }
      let merged = plan.merged_config();
      if let Some(code) = merged.version_code {
        cmd.flag("--version-code", code.to_string());
      }
      if let Some(name) = &merged.version_name {
        cmd.flag("--version-name", name.clone());
      }
      if let Some(min) = merged.min_sdk_version {
        cmd.flag("--min-sdk-version", min.to_string());
      }
      if let Some(target_sdk) = merged.target_sdk_version {
        cmd.flag("--target-sdk-version", target_sdk.to_string());
      }
    }

    if plan.kind() == VariantKind::Library {
      cmd.arg("--non-constant-id");
    } else if let Some(packages) = plan.library_packages()? {
      cmd.flag("--extra-packages", packages);
    }

    if let Some(pattern) = &options.ignore_assets {
      cmd.flag("---ignore-assets", pattern.clone());
    }
    for ext in &options.no_compress {
      cmd.flag("-0", ext.clone());
    }

    info!(manifest = %manifest.display(), "processing resources");
    self.run(&cmd)
  }
}
