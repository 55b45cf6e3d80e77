use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::debug;

use super::{PlanError, VariantKind};
use crate::config::{BuildType, ConfigLayer};
use crate::consts::DEFAULT_TEST_RUNNER;
use crate::dependency::{DependencyNode, JarDependency, flatten};
use crate::manifest::ManifestParser;
use crate::source::SourceRoot;

/// One concrete variant: default config, build type, flavors and libraries.
///
/// Flavors and dependencies are attached while the plan is owned mutably.
/// Once it is shared (tested plans are held through [`Arc`]) it is frozen and
/// every query returns the same answer each time it is asked.
pub struct VariantPlan {
  kind: VariantKind,
  default_config: ConfigLayer,
  default_source: SourceRoot,
  build_type: BuildType,
  build_type_source: Option<SourceRoot>,
  flavors: Vec<ConfigLayer>,
  flavor_sources: Vec<SourceRoot>,
  merged: ConfigLayer,
  direct: Vec<Arc<DependencyNode>>,
  flattened: Vec<Arc<DependencyNode>>,
  jars: Vec<JarDependency>,
  tested: Option<Arc<VariantPlan>>,
  output: Option<Arc<DependencyNode>>,
  parser: Arc<dyn ManifestParser>,
}

impl VariantPlan {
  /// Create an application or library plan.
  ///
  /// Fails when the default source root has no manifest file on disk.
  pub fn new(
    kind: VariantKind,
    default_config: ConfigLayer,
    default_source: SourceRoot,
    build_type: BuildType,
    build_type_source: Option<SourceRoot>,
    parser: Arc<dyn ManifestParser>,
  ) -> Result<Self, PlanError> {
    if kind == VariantKind::Test {
      return Err(PlanError::MissingTestedPlan);
    }
    Self::build(
      kind,
      default_config,
      default_source,
      build_type,
      build_type_source,
      None,
      parser,
    )
  }

  /// Create the test plan of `tested`.
  ///
  /// When `tested` is a library with an output bundle, that bundle becomes
  /// the first direct dependency of the test plan.
  pub fn new_test(
    default_config: ConfigLayer,
    default_source: SourceRoot,
    build_type: BuildType,
    build_type_source: Option<SourceRoot>,
    tested: Arc<VariantPlan>,
    parser: Arc<dyn ManifestParser>,
  ) -> Result<Self, PlanError> {
    if tested.kind == VariantKind::Test {
      return Err(PlanError::NestedTest);
    }
    Self::build(
      VariantKind::Test,
      default_config,
      default_source,
      build_type,
      build_type_source,
      Some(tested),
      parser,
    )
  }

  fn build(
    kind: VariantKind,
    default_config: ConfigLayer,
    default_source: SourceRoot,
    build_type: BuildType,
    build_type_source: Option<SourceRoot>,
    tested: Option<Arc<VariantPlan>>,
    parser: Arc<dyn ManifestParser>,
  ) -> Result<Self, PlanError> {
    if kind != VariantKind::Test {
      validate_manifest(&default_source)?;
    }

    let mut direct = Vec::new();
    if let Some(tested) = &tested
      && tested.kind == VariantKind::Library
      && let Some(output) = &tested.output
    {
      direct.push(Arc::clone(output));
    }
    let flattened = flatten(&direct)?;

    Ok(Self {
      kind,
      merged: default_config.merge_over(&ConfigLayer::default()),
      default_config,
      default_source,
      build_type,
      build_type_source,
      flavors: Vec::new(),
      flavor_sources: Vec::new(),
      direct,
      flattened,
      jars: Vec::new(),
      tested,
      output: None,
      parser,
    })
  }

  /// Add a flavor. Later flavors win scalar merges; earlier flavors win
  /// resource overlays.
  pub fn add_flavor(&mut self, config: ConfigLayer, source: SourceRoot) {
    self.merged = config.merge_over(&self.merged);
    self.flavors.push(config);
    self.flavor_sources.push(source);
  }

  /// Append direct library dependencies and recompute the flattened order.
  ///
  /// On a cycle the plan is left unchanged.
  pub fn set_dependencies(&mut self, direct: Vec<Arc<DependencyNode>>) -> Result<(), PlanError> {
    let mut all = self.direct.clone();
    all.extend(direct);
    let flattened = flatten(&all)?;
    debug!(
      variant = %self.variant_name(),
      direct = all.len(),
      flattened = flattened.len(),
      "dependencies resolved"
    );
    self.direct = all;
    self.flattened = flattened;
    Ok(())
  }

  pub fn set_jars(&mut self, jars: Vec<JarDependency>) {
    self.jars = jars;
  }

  /// Record the bundle this library plan produces, so its test plan can consume it.
  pub fn set_output(&mut self, output: Option<Arc<DependencyNode>>) {
    self.output = output;
  }

  pub fn kind(&self) -> VariantKind {
    self.kind
  }

  pub fn default_config(&self) -> &ConfigLayer {
    &self.default_config
  }

  pub fn default_source(&self) -> &SourceRoot {
    &self.default_source
  }

  pub fn build_type(&self) -> &BuildType {
    &self.build_type
  }

  pub fn build_type_source(&self) -> Option<&SourceRoot> {
    self.build_type_source.as_ref()
  }

  pub fn flavors(&self) -> &[ConfigLayer] {
    &self.flavors
  }

  pub fn flavor_sources(&self) -> &[SourceRoot] {
    &self.flavor_sources
  }

  pub fn has_flavors(&self) -> bool {
    !self.flavors.is_empty()
  }

  /// The default config with every flavor merged on top.
  pub fn merged_config(&self) -> &ConfigLayer {
    &self.merged
  }

  pub fn direct_libraries(&self) -> &[Arc<DependencyNode>] {
    &self.direct
  }

  pub fn has_libraries(&self) -> bool {
    !self.direct.is_empty()
  }

  /// Every library once, highest priority first.
  pub fn flattened_libraries(&self) -> &[Arc<DependencyNode>] {
    &self.flattened
  }

  pub fn jars(&self) -> &[JarDependency] {
    &self.jars
  }

  pub fn tested(&self) -> Option<&VariantPlan> {
    self.tested.as_deref()
  }

  pub fn output(&self) -> Option<&Arc<DependencyNode>> {
    self.output.as_ref()
  }

  /// The tested plan, when this is the test plan of a library.
  pub fn tested_library(&self) -> Option<&VariantPlan> {
    self.tested().filter(|t| t.kind == VariantKind::Library)
  }

  /// Source roots in packaging priority order: build type, flavors, default.
  pub fn source_roots(&self) -> impl Iterator<Item = &SourceRoot> {
    self
      .build_type_source
      .iter()
      .chain(self.flavor_sources.iter())
      .chain(std::iter::once(&self.default_source))
  }

  /// Flavor names followed by the build type, camel-cased: `freeDebug`.
  pub fn variant_name(&self) -> String {
    let mut name = String::new();
    for flavor in &self.flavors {
      push_camel(&mut name, &flavor.name);
    }
    push_camel(&mut name, &self.build_type.name);
    if self.kind == VariantKind::Test {
      push_camel(&mut name, "test");
    }
    name
  }

  /// Package declared by the default manifest.
  pub fn package_from_manifest(&self) -> Result<String, PlanError> {
    let manifest = self
      .default_source
      .manifest
      .as_deref()
      .ok_or_else(|| PlanError::ManifestNotDeclared {
        source_root: self.default_source.name.clone(),
      })?;
    Ok(self.parser.package_name(manifest)?)
  }

  /// The package set by the flavors, with the build type suffix applied.
  ///
  /// `None` when neither a flavor override nor a suffix is set. A suffix
  /// without a leading `.` gets one.
  pub fn package_override(&self) -> Result<Option<String>, PlanError> {
    let mut package = self.merged.package_name.clone();
    if let Some(suffix) = self.build_type.package_suffix() {
      let base = match package {
        Some(p) => p,
        None => self.package_from_manifest()?,
      };
      package = Some(if suffix.starts_with('.') {
        format!("{}{}", base, suffix)
      } else {
        format!("{}.{}", base, suffix)
      });
    }
    Ok(package)
  }

  /// The package this variant's artifact is built as.
  pub fn package_name(&self) -> Result<String, PlanError> {
    if self.kind == VariantKind::Test {
      if let Some(package) = &self.merged.test_package_name {
        return Ok(package.clone());
      }
      let tested = self.tested().ok_or(PlanError::MissingTestedPlan)?;
      return Ok(format!("{}.test", tested.package_name()?));
    }

    match self.package_override()? {
      Some(package) => Ok(package),
      None => self.package_from_manifest(),
    }
  }

  /// The package instrumented by a test plan.
  ///
  /// A library under test is merged into its test package, so the test
  /// package instruments itself.
  pub fn tested_package_name(&self) -> Result<Option<String>, PlanError> {
    let Some(tested) = self.tested() else {
      return Ok(None);
    };
    let package = if tested.kind == VariantKind::Library {
      self.package_name()?
    } else {
      tested.package_name()?
    };
    Ok(Some(package))
  }

  pub fn instrumentation_runner(&self) -> String {
    self
      .merged
      .test_instrumentation_runner
      .clone()
      .unwrap_or_else(|| DEFAULT_TEST_RUNNER.to_string())
  }

  /// Build type and flavor manifests that exist, in that order.
  pub fn manifest_overlays(&self) -> Vec<PathBuf> {
    self
      .build_type_source
      .iter()
      .chain(self.flavor_sources.iter())
      .filter_map(SourceRoot::existing_manifest)
      .map(Path::to_path_buf)
      .collect()
  }

  /// Default, build type and flavor manifests, then each direct library's.
  pub fn manifest_inputs(&self) -> Vec<PathBuf> {
    let mut inputs: Vec<PathBuf> = self
      .default_source
      .existing_manifest()
      .map(Path::to_path_buf)
      .into_iter()
      .collect();
    inputs.extend(self.manifest_overlays());
    inputs.extend(
      self
        .direct
        .iter()
        .map(|lib| lib.manifest())
        .filter(|m| m.is_file()),
    );
    inputs
  }

  /// Resource folders in overlay order, highest priority first.
  pub fn resource_inputs(&self) -> Vec<PathBuf> {
    let mut inputs = Vec::new();
    if let Some(res) = self.build_type_source.as_ref().and_then(|s| s.resources.clone()) {
      inputs.push(res);
    }
    inputs.extend(self.flavor_sources.iter().filter_map(|s| s.resources.clone()));
    if let Some(res) = &self.default_source.resources {
      inputs.push(res.clone());
    }
    inputs.extend(self.flattened.iter().map(|lib| lib.res_folder()));
    inputs
  }

  /// Library AIDL folders that exist, in flattened order.
  pub fn aidl_imports(&self) -> Vec<PathBuf> {
    self
      .flattened
      .iter()
      .map(|lib| lib.aidl_folder())
      .filter(|p| p.is_dir())
      .collect()
  }

  /// AIDL source folders of every source root that exist.
  pub fn aidl_sources(&self) -> Vec<PathBuf> {
    self
      .source_roots()
      .flat_map(|s| s.aidl.iter())
      .filter(|p| p.is_dir())
      .cloned()
      .collect()
  }

  /// Compile classpath, deduplicated and sorted.
  ///
  /// The test plan of a library also sees the library's jar and classpath.
  pub fn compile_classpath(&self) -> Vec<PathBuf> {
    let mut classpath = BTreeSet::new();
    for source in self.source_roots() {
      classpath.extend(source.compile_classpath.iter().cloned());
    }
    classpath.extend(self.flattened.iter().map(|lib| lib.jar_file()));

    if let Some(tested) = self.tested_library() {
      if let Some(output) = &tested.output {
        classpath.insert(output.jar_file());
      }
      classpath.extend(tested.compile_classpath());
    }
    classpath.into_iter().collect()
  }

  /// Packages of every flattened library, colon-joined. `None` without libraries.
  pub fn library_packages(&self) -> Result<Option<String>, PlanError> {
    if self.flattened.is_empty() {
      return Ok(None);
    }
    let packages = self
      .flattened
      .iter()
      .map(|lib| self.parser.package_name(&lib.manifest()))
      .collect::<Result<Vec<_>, _>>()?;
    Ok(Some(packages.join(":")))
  }

  /// Build-config lines of every layer, each group tagged with its origin.
  pub fn build_config_lines(&self) -> Vec<String> {
    let mut lines = Vec::new();
    push_group(
      &mut lines,
      "// lines from default config.".to_string(),
      &self.default_config.build_config_lines,
    );
    push_group(
      &mut lines,
      format!("// lines from build type: {}", self.build_type.name),
      &self.build_type.build_config_lines,
    );
    for flavor in &self.flavors {
      push_group(
        &mut lines,
        format!("// lines from product flavor: {}", flavor.name),
        &flavor.build_config_lines,
      );
    }
    lines
  }
}

impl fmt::Debug for VariantPlan {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("VariantPlan")
      .field("name", &self.variant_name())
      .field("kind", &self.kind)
      .field("merged", &self.merged)
      .field("flattened", &self.flattened.len())
      .finish_non_exhaustive()
  }
}

fn validate_manifest(source: &SourceRoot) -> Result<(), PlanError> {
  match &source.manifest {
    Some(path) if path.is_file() => Ok(()),
    Some(path) => Err(PlanError::MissingManifest { path: path.clone() }),
    None => Err(PlanError::ManifestNotDeclared {
      source_root: source.name.clone(),
    }),
  }
}

fn push_group(out: &mut Vec<String>, header: String, lines: &[String]) {
  if !lines.is_empty() {
    out.push(header);
    out.extend(lines.iter().cloned());
  }
}

fn push_camel(name: &mut String, part: &str) {
  if name.is_empty() {
    name.push_str(part);
    return;
  }
  let mut chars = part.chars();
  if let Some(first) = chars.next() {
    name.extend(first.to_uppercase());
    name.push_str(chars.as_str());
  }
}
