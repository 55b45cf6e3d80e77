//! Implementation of the `vforge build` command.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Args;
use tracing::debug;

use vforge_lib::orchestrator::{Builder, VariantOutputs};
use vforge_lib::process::SystemRunner;
use vforge_lib::sdk::Sdk;

use super::VariantArgs;
use crate::output::{
  OutputFormat, format_duration, print_info, print_json, print_stat, print_success, print_warning,
};

#[derive(Debug, Clone, Args)]
pub struct BuildArgs {
  #[command(flatten)]
  pub variant: VariantArgs,

  /// Folder of compiled classes, repeatable
  #[arg(long = "classes", required = true)]
  pub classes: Vec<PathBuf>,

  /// Folder of <abi>/*.so native libraries to package
  #[arg(long)]
  pub native_libs: Option<PathBuf>,

  /// Output folder (default: build/<variant> next to the project file)
  #[arg(long)]
  pub out: Option<PathBuf>,

  /// SDK folder (default: $ANDROID_SDK_ROOT, then $ANDROID_HOME)
  #[arg(long)]
  pub sdk: Option<PathBuf>,
}

pub fn cmd_build(args: &BuildArgs, verbose: bool, format: OutputFormat) -> Result<()> {
  let started = Instant::now();
  let (project, plan) = args.variant.load()?;
  let variant = plan.variant_name();

  let sdk = Sdk::locate(args.sdk.as_deref()).context("Failed to locate the SDK")?;
  let target = sdk.resolve_target(project.target()?)?;

  let mut outputs = VariantOutputs::new(
    args
      .out
      .clone()
      .unwrap_or_else(|| project.build_dir().join(&variant)),
  );
  outputs.classes = args.classes.clone();
  outputs.native_libs = args.native_libs.clone();
  outputs.aapt = project.aapt_options().clone();
  outputs.dex = project.dex_options();
  debug!(out = %outputs.root.display(), classes = outputs.classes.len(), "build outputs");

  let mut builder = Builder::new(Arc::new(SystemRunner)).with_verbose(verbose);
  builder.set_target(target);
  builder.set_variant(Arc::new(plan));

  let report = builder
    .run_variant(&outputs)
    .with_context(|| format!("Failed to build variant '{}'", variant))?;

  if format.is_json() {
    return print_json(&report);
  }

  print_success(&format!(
    "Built {} in {}",
    report.variant,
    format_duration(started.elapsed())
  ));
  let steps: Vec<String> = report.steps.iter().map(ToString::to_string).collect();
  print_stat("Steps", &steps.join(", "));
  print_stat("Manifest", &report.manifest.display().to_string());
  match &report.package {
    Some(package) => {
      print_stat("Package", &package.path.display().to_string());
      print_stat("Entries", &package.entries.to_string());
      if !package.signed {
        print_warning("package is unsigned");
      }
    }
    None => print_info("library variant: resources processed, no package produced"),
  }

  Ok(())
}
