//! The whole variant build, step by step.

use std::fmt;
use std::path::PathBuf;

use serde::Serialize;
use tracing::info;

use super::{AaptOptions, Builder, DexOptions, ResourceOutputs};
use crate::error::BuildError;
use crate::package::SealedPackage;
use crate::variant::VariantKind;

/// One stage of a variant build.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum BuildStep {
  PreprocessResources,
  MergeManifest,
  CompileAidl,
  GenerateBuildConfig,
  ProcessResources,
  ConvertBytecode,
  Package,
}

impl fmt::Display for BuildStep {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let s = match self {
      BuildStep::PreprocessResources => "preprocess-resources",
      BuildStep::MergeManifest => "merge-manifest",
      BuildStep::CompileAidl => "compile-aidl",
      BuildStep::GenerateBuildConfig => "generate-build-config",
      BuildStep::ProcessResources => "process-resources",
      BuildStep::ConvertBytecode => "convert-bytecode",
      BuildStep::Package => "package",
    };
    f.write_str(s)
  }
}

/// Inputs and output layout for [`Builder::run_variant`].
#[derive(Debug, Clone, Default)]
pub struct VariantOutputs {
  /// Everything is written below this folder.
  pub root: PathBuf,
  /// Folders of compiled classes to convert.
  pub classes: Vec<PathBuf>,
  /// Folder of `<abi>/*.so` native libraries.
  pub native_libs: Option<PathBuf>,
  pub aapt: AaptOptions,
  pub dex: DexOptions,
}

impl VariantOutputs {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self {
      root: root.into(),
      ..Self::default()
    }
  }

  pub fn crunched_resources(&self) -> PathBuf {
    self.root.join("res")
  }

  pub fn manifest(&self) -> PathBuf {
    self.root.join("manifest").join("AndroidManifest.xml")
  }

  pub fn generated_sources(&self) -> PathBuf {
    self.root.join("source")
  }

  pub fn resource_package(&self) -> PathBuf {
    self.root.join("resources.ap_")
  }

  pub fn proguard_rules(&self) -> PathBuf {
    self.root.join("proguard.txt")
  }

  pub fn dex(&self) -> PathBuf {
    self.root.join("classes.dex")
  }

  pub fn package(&self, variant: &str) -> PathBuf {
    self.root.join(format!("{}.apk", variant))
  }
}

/// What a finished run produced.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
  pub variant: String,
  pub kind: VariantKind,
  pub steps: Vec<BuildStep>,
  pub manifest: PathBuf,
  pub generated_sources: PathBuf,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub package: Option<SealedPackage>,
}

impl BuildReport {
  fn record(&mut self, step: BuildStep) {
    info!(step = %step, variant = %self.variant, "step complete");
    self.steps.push(step);
  }
}

impl Builder {
  /// Run every step for the current variant in order, stopping at the first
  /// failure.
  ///
  /// Library variants stop after resource processing: they are consumed as
  /// bundles, not packaged.
  pub fn run_variant(&self, outputs: &VariantOutputs) -> Result<BuildReport, BuildError> {
    let plan = self.variant()?;
    self.target()?;

    let mut report = BuildReport {
      variant: plan.variant_name(),
      kind: plan.kind(),
      steps: Vec::new(),
      manifest: outputs.manifest(),
      generated_sources: outputs.generated_sources(),
      package: None,
    };
    info!(variant = %report.variant, kind = %report.kind, "building variant");

    let crunched = outputs.crunched_resources();
    if self.preprocess_resources(&crunched)? {
      report.record(BuildStep::PreprocessResources);
    }

    self.process_manifest(&report.manifest)?;
    report.record(BuildStep::MergeManifest);

    self.compile_aidl(&plan.aidl_sources(), &report.generated_sources)?;
    report.record(BuildStep::CompileAidl);

    self.generate_build_config(&report.generated_sources, &[])?;
    report.record(BuildStep::GenerateBuildConfig);

    let library = plan.kind() == VariantKind::Library;
    let resource_outputs = ResourceOutputs {
      source_dir: Some(report.generated_sources.clone()),
      package: (!library).then(|| outputs.resource_package()),
      proguard: (!library).then(|| outputs.proguard_rules()),
    };
    let preprocessed = Some(crunched.as_path()).filter(|p| p.is_dir());
    self.process_resources(&report.manifest, preprocessed, &resource_outputs, &outputs.aapt)?;
    report.record(BuildStep::ProcessResources);

    if library {
      return Ok(report);
    }

    let dex = outputs.dex();
    let libraries = self.dex_libraries()?;
    self.convert_bytecode(&outputs.classes, &libraries, &dex, &outputs.dex)?;
    report.record(BuildStep::ConvertBytecode);

    let package = self.package(
      &outputs.resource_package(),
      &dex,
      outputs.native_libs.as_deref(),
      &outputs.package(&report.variant),
    )?;
    report.package = Some(package);
    report.record(BuildStep::Package);

    Ok(report)
  }

  /// Jars converted alongside the variant's own classes.
  fn dex_libraries(&self) -> Result<Vec<PathBuf>, BuildError> {
    let plan = self.variant()?;
    Ok(
      plan
        .flattened_libraries()
        .iter()
        .map(|lib| lib.jar_file())
        .chain(plan.jars().iter().map(|j| j.location.clone()))
        .filter(|p| p.is_file())
        .collect(),
    )
  }
}
