//! Build orchestration.
//!
//! [`Builder`] drives one variant through the toolchain. Each step checks its
//! preconditions, runs to completion through the [`CommandRunner`], and either
//! succeeds or returns a [`BuildError`]. Nothing is retried.
//!
//! ```text
//! target set -> variant set -> { crunch, manifest, aidl, build config }
//!            -> resources (needs manifest) -> dex -> package -> sealed
//! ```

mod aapt;
mod buildconfig;
mod dex;
mod manifest;
mod pipeline;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::info;

use crate::error::BuildError;
use crate::manifest::{ManifestMerger, ToolManifestMerger};
use crate::package::{JavaTools, PackageAssembler, SealedPackage, Signer};
use crate::process::{CommandRunner, ToolCommand};
use crate::sdk::Target;
use crate::util::fs::files_with_extension;
use crate::variant::VariantPlan;

pub use aapt::{AaptOptions, ResourceOutputs};
pub use dex::DexOptions;
pub use pipeline::{BuildReport, BuildStep, VariantOutputs};

/// Drives the external toolchain for one variant at a time.
pub struct Builder {
  runner: Arc<dyn CommandRunner>,
  merger: Option<Box<dyn ManifestMerger>>,
  target: Option<Target>,
  variant: Option<Arc<VariantPlan>>,
  java_tools: Option<JavaTools>,
  debug_keystore: Option<PathBuf>,
  verbose: bool,
}

impl Builder {
  pub fn new(runner: Arc<dyn CommandRunner>) -> Self {
    Self {
      runner,
      merger: None,
      target: None,
      variant: None,
      java_tools: None,
      debug_keystore: None,
      verbose: false,
    }
  }

  /// Pass verbose flags to the tools that support them.
  pub fn with_verbose(mut self, verbose: bool) -> Self {
    self.verbose = verbose;
    self
  }

  /// Set the compile target. Installs the target's manifest merge tool unless
  /// a merger was set explicitly.
  pub fn set_target(&mut self, target: Target) {
    if self.merger.is_none() {
      self.merger = Some(Box::new(ToolManifestMerger::new(
        &target.manifest_merger,
        Arc::clone(&self.runner),
      )));
    }
    info!(target = %target.name, "target set");
    self.target = Some(target);
  }

  pub fn set_manifest_merger(&mut self, merger: Box<dyn ManifestMerger>) {
    self.merger = Some(merger);
  }

  pub fn set_variant(&mut self, variant: Arc<VariantPlan>) {
    info!(variant = %variant.variant_name(), kind = %variant.kind(), "variant set");
    self.variant = Some(variant);
  }

  /// Use these `keytool`/`jarsigner` instead of searching `JAVA_HOME` and `PATH`.
  pub fn set_java_tools(&mut self, tools: JavaTools) {
    self.java_tools = Some(tools);
  }

  /// Use this debug keystore instead of the per-user default.
  pub fn set_debug_keystore(&mut self, path: impl Into<PathBuf>) {
    self.debug_keystore = Some(path.into());
  }

  pub fn target(&self) -> Result<&Target, BuildError> {
    self
      .target
      .as_ref()
      .ok_or_else(|| BuildError::precondition("target not set"))
  }

  pub fn variant(&self) -> Result<&VariantPlan, BuildError> {
    self
      .variant
      .as_deref()
      .ok_or_else(|| BuildError::precondition("no variant configuration has been set"))
  }

  /// Runtime classpath of the target: what compiled code links against.
  pub fn boot_classpath(&self) -> Result<Vec<PathBuf>, BuildError> {
    Ok(self.target()?.runtime_classpath())
  }

  fn merger(&self) -> Result<&dyn ManifestMerger, BuildError> {
    self
      .merger
      .as_deref()
      .ok_or_else(|| BuildError::precondition("no manifest merger available"))
  }

  fn run(&self, command: &ToolCommand) -> Result<(), BuildError> {
    self.runner.run(command)?;
    Ok(())
  }

  /// Crunch every existing resource folder into `out_dir` in one batch.
  ///
  /// Returns false without running anything when there is no resource folder.
  pub fn preprocess_resources(&self, out_dir: &Path) -> Result<bool, BuildError> {
    let plan = self.variant()?;
    let target = self.target()?;

    let inputs: Vec<PathBuf> = plan.resource_inputs().into_iter().filter(|p| p.is_dir()).collect();
    if inputs.is_empty() {
      info!("no resources to crunch");
      return Ok(false);
    }
    create_dir(out_dir)?;

    let mut cmd = ToolCommand::new(&target.aapt);
    cmd.arg("crunch");
    if self.verbose {
      cmd.arg("-v");
    }
    for input in &inputs {
      cmd.flag_path("-S", input);
    }
    cmd.flag_path("-C", out_dir);

    info!(folders = inputs.len(), "crunching resources");
    self.run(&cmd)?;
    Ok(true)
  }

  /// Compile every `.aidl` file under `source_dirs` into Java under `out_dir`.
  ///
  /// Library AIDL folders are added as import roots. Returns the file count.
  pub fn compile_aidl(&self, source_dirs: &[PathBuf], out_dir: &Path) -> Result<usize, BuildError> {
    let plan = self.variant()?;
    let target = self.target()?;
    let imports = plan.aidl_imports();

    let mut compiled = 0;
    for dir in source_dirs.iter().filter(|d| d.is_dir()) {
      let files = files_with_extension(dir, "aidl").map_err(|e| BuildError::io(dir, e))?;
      for file in files {
        create_dir(out_dir)?;
        let mut cmd = ToolCommand::new(&target.aidl);
        cmd
          .arg(format!("-p{}", target.framework_aidl.display()))
          .arg(format!("-o{}", out_dir.display()));
        for import in &imports {
          cmd.arg(format!("-I{}", import.display()));
        }
        for source in source_dirs {
          cmd.arg(format!("-I{}", source.display()));
        }
        cmd.path_arg(&file);
        self.run(&cmd)?;
        compiled += 1;
      }
    }
    info!(files = compiled, "aidl compiled");
    Ok(compiled)
  }

  /// Assemble and seal the final package, signing it when the build type or
  /// the merged configuration asks for it.
  pub fn package(
    &self,
    resource_archive: &Path,
    dex: &Path,
    native_libs: Option<&Path>,
    output: &Path,
  ) -> Result<SealedPackage, BuildError> {
    let plan = self.variant()?;
    self.target()?;
    let build_type = plan.build_type();

    let wants_signing = build_type.debug_signed || plan.merged_config().signing.is_ready();
    let tools = match (&self.java_tools, wants_signing) {
      (Some(tools), _) => Some(tools.clone()),
      (None, true) => Some(JavaTools::locate()?),
      (None, false) => None,
    };
    let signer = tools.map(|t| Signer::new(self.runner.as_ref(), t));
    let signing = match &signer {
      Some(signer) => signer.credentials_for(
        build_type,
        &plan.merged_config().signing,
        self.debug_keystore.as_deref(),
      )?,
      None => None,
    };

    let mut assembler = PackageAssembler::new(output, resource_archive, dex)?;
    assembler.set_debug_jni_mode(build_type.debug_jni_build);

    for source in plan.source_roots() {
      for folder in source.existing_java_resources() {
        assembler.add_source_folder(folder)?;
      }
    }
    for jar in plan.jars() {
      assembler.add_resources_from_jar(&jar.location)?;
    }
    for lib in plan.flattened_libraries() {
      assembler.add_resources_from_jar(&lib.jar_file())?;
    }
    if let Some(native) = native_libs {
      assembler.add_native_libraries(native)?;
    }

    let sealed = match (&signer, &signing) {
      (Some(signer), Some(info)) => assembler.seal(Some((signer, info)))?,
      _ => assembler.seal(None)?,
    };
    Ok(sealed)
  }
}

fn create_dir(dir: &Path) -> Result<(), BuildError> {
  fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))
}

fn create_parent(path: &Path) -> Result<(), BuildError> {
  match path.parent() {
    Some(parent) if !parent.as_os_str().is_empty() => create_dir(parent),
    _ => Ok(()),
  }
}
