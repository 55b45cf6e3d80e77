//! Implementation of the `vforge plan` command.
//!
//! Resolves a variant from the project descriptor and prints every input the
//! build would consume. No external tool runs.

use std::path::PathBuf;

use anyhow::Result;
use serde::Serialize;

use vforge_lib::config::{BuildType, ConfigLayer};
use vforge_lib::variant::{VariantKind, VariantPlan};

use super::VariantArgs;
use crate::output::{OutputFormat, print_json, print_list, print_paths, print_stat, print_success};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanSummary<'a> {
  variant: String,
  kind: VariantKind,
  package: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  tested_package: Option<String>,
  build_type: &'a BuildType,
  merged_config: &'a ConfigLayer,
  flattened_libraries: Vec<&'a str>,
  manifest_inputs: Vec<PathBuf>,
  resource_inputs: Vec<PathBuf>,
  compile_classpath: Vec<PathBuf>,
  aidl_imports: Vec<PathBuf>,
  #[serde(skip_serializing_if = "Option::is_none")]
  library_packages: Option<String>,
  build_config_lines: Vec<String>,
}

impl<'a> PlanSummary<'a> {
  fn new(plan: &'a VariantPlan) -> Result<Self> {
    Ok(Self {
      variant: plan.variant_name(),
      kind: plan.kind(),
      package: plan.package_name()?,
      tested_package: plan.tested_package_name()?,
      build_type: plan.build_type(),
      merged_config: plan.merged_config(),
      flattened_libraries: plan.flattened_libraries().iter().map(|l| l.name()).collect(),
      manifest_inputs: plan.manifest_inputs(),
      resource_inputs: plan.resource_inputs(),
      compile_classpath: plan.compile_classpath(),
      aidl_imports: plan.aidl_imports(),
      library_packages: plan.library_packages()?,
      build_config_lines: plan.build_config_lines(),
    })
  }
}

pub fn cmd_plan(args: &VariantArgs, format: OutputFormat) -> Result<()> {
  let (_project, plan) = args.load()?;
  let summary = PlanSummary::new(&plan)?;

  if format.is_json() {
    return print_json(&summary);
  }

  print_success(&format!("Variant: {}", summary.variant));
  print_stat("Kind", &summary.kind.to_string());
  print_stat("Package", &summary.package);
  if let Some(tested) = &summary.tested_package {
    print_stat("Tested package", tested);
  }
  let merged = summary.merged_config;
  if let Some(code) = merged.version_code {
    print_stat("Version code", &code.to_string());
  }
  if let Some(name) = &merged.version_name {
    print_stat("Version name", name);
  }
  if let Some(min) = merged.min_sdk_version {
    print_stat("Min SDK", &min.to_string());
  }
  if let Some(target) = merged.target_sdk_version {
    print_stat("Target SDK", &target.to_string());
  }
  print_stat("Debuggable", &summary.build_type.debuggable.to_string());
  if let Some(packages) = &summary.library_packages {
    print_stat("Library packages", packages);
  }

  print_list("Libraries", &summary.flattened_libraries);
  print_paths("Manifests", &summary.manifest_inputs);
  print_paths("Resources", &summary.resource_inputs);
  print_paths("AIDL imports", &summary.aidl_imports);
  print_paths("Classpath", &summary.compile_classpath);
  print_list("BuildConfig", &summary.build_config_lines);

  Ok(())
}
