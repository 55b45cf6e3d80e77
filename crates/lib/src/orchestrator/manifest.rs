//! Manifest step: copy, merge, or generate the variant's final manifest.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tempfile::NamedTempFile;
use tracing::{debug, info};

use super::{Builder, create_parent};
use crate::dependency::DependencyNode;
use crate::error::BuildError;
use crate::manifest::{ManifestError, write_test_manifest};
use crate::variant::{VariantKind, VariantPlan};

impl Builder {
  /// Produce the manifest the resource compiler will use at `output`.
  ///
  /// Intermediate merge results live in temporary files next to `output`
  /// and are removed on every exit path.
  pub fn process_manifest(&self, output: &Path) -> Result<(), BuildError> {
    let plan = self.variant()?;
    self.target()?;
    create_parent(output)?;

    if plan.kind() == VariantKind::Test {
      return if plan.tested_library().is_some() {
        let generated = self.intermediate(output)?;
        self.write_test_manifest(plan, generated.path())?;
        self.merge_library_manifests(generated.path(), plan.direct_libraries(), output)
      } else {
        self.write_test_manifest(plan, output)
      };
    }
    self.merge_app_manifest(plan, output)
  }

  fn write_test_manifest(&self, plan: &VariantPlan, output: &Path) -> Result<(), BuildError> {
    let package = plan.package_name()?;
    let tested = plan
      .tested_package_name()?
      .ok_or_else(|| BuildError::precondition("test variant has no tested package"))?;
    info!(package = %package, tested = %tested, "generating test manifest");
    write_test_manifest(output, &package, &tested, &plan.instrumentation_runner())?;
    Ok(())
  }

  fn merge_app_manifest(&self, plan: &VariantPlan, output: &Path) -> Result<(), BuildError> {
    let main = plan
      .default_source()
      .existing_manifest()
      .ok_or_else(|| BuildError::precondition("main manifest is missing"))?
      .to_path_buf();
    let overlays = plan.manifest_overlays();

    if overlays.is_empty() && !plan.has_libraries() {
      debug!(from = %main.display(), "copying manifest");
      fs::copy(&main, output).map_err(|e| BuildError::io(output, e))?;
      return Ok(());
    }

    // Held until the library fold below has consumed it.
    let mut app_merged: Option<NamedTempFile> = None;
    let mut main = main;
    if !overlays.is_empty() {
      let target = if plan.has_libraries() {
        let temp = self.intermediate(output)?;
        let path = temp.path().to_path_buf();
        app_merged = Some(temp);
        path
      } else {
        output.to_path_buf()
      };
      self.merge(&target, &main, &overlays)?;
      main = target;
    }

    if plan.has_libraries() {
      self.merge_library_manifests(&main, plan.direct_libraries(), output)?;
    }
    drop(app_merged);
    Ok(())
  }

  /// Merge each library's manifest into `main`, leaves first.
  ///
  /// A library with dependencies contributes its own manifest with its
  /// dependencies already folded in.
  fn merge_library_manifests(
    &self,
    main: &Path,
    libraries: &[Arc<DependencyNode>],
    output: &Path,
  ) -> Result<(), BuildError> {
    let mut intermediates = Vec::new();
    let mut manifests = Vec::with_capacity(libraries.len());

    for library in libraries {
      if library.has_dependencies() {
        let temp = self.intermediate(output)?;
        self.merge_library_manifests(&library.manifest(), library.dependencies(), temp.path())?;
        manifests.push(temp.path().to_path_buf());
        intermediates.push(temp);
      } else {
        manifests.push(library.manifest());
      }
    }

    self.merge(output, main, &manifests)
  }

  fn merge(&self, output: &Path, main: &Path, overlays: &[PathBuf]) -> Result<(), BuildError> {
    if !self.merger()?.merge(output, main, overlays)? {
      return Err(
        ManifestError::Rejected {
          output: output.to_path_buf(),
        }
        .into(),
      );
    }
    Ok(())
  }

  fn intermediate(&self, output: &Path) -> Result<NamedTempFile, BuildError> {
    let dir = match output.parent() {
      Some(p) if !p.as_os_str().is_empty() => p,
      _ => Path::new("."),
    };
    tempfile::Builder::new()
      .prefix("manifestMerge")
      .suffix(".xml")
      .tempfile_in(dir)
      .map_err(|e| BuildError::io(dir, e))
  }
}
