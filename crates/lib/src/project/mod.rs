//! Project descriptors.
//!
//! A [`Project`] is a loaded `vforge.json` with its library table resolved
//! into shared [`DependencyNode`] trees. It builds [`VariantPlan`]s for a
//! chosen build type and flavor list. Every relative path in the descriptor
//! is resolved against the descriptor's folder.

mod descriptor;

use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use crate::config::{BuildType, ConfigLayer};
use crate::consts::PROJECT_FILE;
use crate::dependency::{DependencyError, DependencyNode, JarDependency};
use crate::error::ErrorKind;
use crate::manifest::{ManifestParser, RegexManifestParser};
use crate::orchestrator::{AaptOptions, DexOptions};
use crate::source::SourceRoot;
use crate::variant::{PlanError, VariantKind, VariantPlan};

pub use descriptor::{BuildTypeDecl, LibraryDecl, ProjectDescriptor, SourceRootDecl};

/// Source root name of instrumentation tests.
pub const TEST_SOURCE_ROOT: &str = "instrumentTest";

#[derive(Debug, Error)]
pub enum ProjectError {
  #[error("failed to read project file {}: {source}", path.display())]
  Read {
    path: PathBuf,
    #[source]
    source: io::Error,
  },

  #[error("failed to parse project file {}: {source}", path.display())]
  Parse {
    path: PathBuf,
    #[source]
    source: serde_json::Error,
  },

  #[error("project kind must be application or library, got {0}")]
  UnsupportedKind(VariantKind),

  #[error("unknown build type '{0}'")]
  UnknownBuildType(String),

  #[error("unknown product flavor '{0}'")]
  UnknownFlavor(String),

  #[error("library '{parent}' depends on unknown library '{name}'")]
  UnknownLibrary { name: String, parent: String },

  #[error("project declares no compile target")]
  NoTarget,

  #[error(transparent)]
  Dependency(#[from] DependencyError),

  #[error(transparent)]
  Plan(#[from] PlanError),
}

impl ProjectError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ProjectError::Read { .. } => ErrorKind::Io,
      ProjectError::Dependency(_) => ErrorKind::DependencyCycle,
      ProjectError::Plan(e) => e.kind(),
      _ => ErrorKind::Configuration,
    }
  }
}

/// A loaded project descriptor.
pub struct Project {
  dir: PathBuf,
  descriptor: ProjectDescriptor,
  direct: Vec<Arc<DependencyNode>>,
  parser: Arc<dyn ManifestParser>,
}

impl Project {
  /// Load a descriptor file. A folder means its `vforge.json`.
  pub fn load(path: &Path) -> Result<Self, ProjectError> {
    let path = if path.is_dir() {
      path.join(PROJECT_FILE)
    } else {
      path.to_path_buf()
    };
    let content = fs::read_to_string(&path).map_err(|source| ProjectError::Read {
      path: path.clone(),
      source,
    })?;
    let descriptor: ProjectDescriptor =
      serde_json::from_str(&content).map_err(|source| ProjectError::Parse {
        path: path.clone(),
        source,
      })?;

    let dir = match path.parent() {
      Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
      _ => PathBuf::from("."),
    };
    debug!(path = %path.display(), "loaded project");
    Self::from_descriptor(dir, descriptor)
  }

  /// Resolve an in-memory descriptor rooted at `dir`.
  pub fn from_descriptor(dir: impl Into<PathBuf>, descriptor: ProjectDescriptor) -> Result<Self, ProjectError> {
    let dir = dir.into();
    if descriptor.kind == VariantKind::Test {
      return Err(ProjectError::UnsupportedKind(descriptor.kind));
    }
    let direct = resolve_libraries(&dir, &descriptor)?;
    Ok(Self {
      dir,
      descriptor,
      direct,
      parser: Arc::new(RegexManifestParser),
    })
  }

  pub fn dir(&self) -> &Path {
    &self.dir
  }

  pub fn descriptor(&self) -> &ProjectDescriptor {
    &self.descriptor
  }

  pub fn kind(&self) -> VariantKind {
    self.descriptor.kind
  }

  pub fn target(&self) -> Result<&str, ProjectError> {
    self.descriptor.target.as_deref().ok_or(ProjectError::NoTarget)
  }

  pub fn aapt_options(&self) -> &AaptOptions {
    &self.descriptor.aapt_options
  }

  pub fn dex_options(&self) -> DexOptions {
    self.descriptor.dex_options
  }

  /// Default output folder.
  pub fn build_dir(&self) -> PathBuf {
    self.dir.join("build")
  }

  /// Direct libraries, resolved.
  pub fn libraries(&self) -> &[Arc<DependencyNode>] {
    &self.direct
  }

  /// Declared build types, falling back to the `debug` and `release` presets.
  pub fn build_type(&self, name: &str) -> Result<BuildType, ProjectError> {
    if let Some(decl) = self.descriptor.build_types.iter().find(|b| b.name == name) {
      return Ok(decl.to_build_type());
    }
    match name {
      BuildType::DEBUG | BuildType::RELEASE => Ok(BuildType::new(name)),
      _ => Err(ProjectError::UnknownBuildType(name.to_string())),
    }
  }

  pub fn flavor(&self, name: &str) -> Result<&ConfigLayer, ProjectError> {
    self
      .descriptor
      .product_flavors
      .iter()
      .find(|f| f.name == name)
      .ok_or_else(|| ProjectError::UnknownFlavor(name.to_string()))
  }

  /// The declared or conventional source root called `name`.
  pub fn source_root(&self, name: &str) -> SourceRoot {
    match self.descriptor.source_roots.get(name) {
      Some(decl) => decl.to_source_root(name, &self.dir),
      None => SourceRoot::conventional(name, &descriptor::conventional_dir(name, &self.dir)),
    }
  }

  /// Build the application or library plan for one build type and flavor list.
  pub fn variant<S: AsRef<str>>(&self, build_type: &str, flavors: &[S]) -> Result<VariantPlan, ProjectError> {
    let build_type = self.build_type(build_type)?;
    let build_type_source = self.source_root(&build_type.name);

    let mut plan = VariantPlan::new(
      self.descriptor.kind,
      self.default_config(),
      self.source_root("main"),
      build_type,
      Some(build_type_source),
      Arc::clone(&self.parser),
    )?;
    for name in flavors {
      let flavor = self.resolved_layer(self.flavor(name.as_ref())?);
      let source = self.source_root(&flavor.name);
      plan.add_flavor(flavor, source);
    }
    plan.set_dependencies(self.direct.clone())?;
    plan.set_jars(
      self
        .descriptor
        .jars
        .iter()
        .map(|jar| JarDependency::new(self.dir.join(jar)))
        .collect(),
    );

    if plan.kind() == VariantKind::Library {
      let name = plan.variant_name();
      let bundle = self.build_dir().join("bundles").join(&name);
      let output = DependencyNode::new(&name, bundle)
        .with_dependencies(plan.direct_libraries().to_vec());
      plan.set_output(Some(output.into_arc()));
    }
    Ok(plan)
  }

  /// Build the instrumentation test plan over [`Project::variant`].
  ///
  /// Test flavor sources live in `src/instrumentTest<Flavor>`.
  pub fn test_variant<S: AsRef<str>>(&self, build_type: &str, flavors: &[S]) -> Result<VariantPlan, ProjectError> {
    let tested = Arc::new(self.variant(build_type, flavors)?);
    let mut plan = VariantPlan::new_test(
      self.default_config(),
      self.source_root(TEST_SOURCE_ROOT),
      tested.build_type().clone(),
      None,
      Arc::clone(&tested),
      Arc::clone(&self.parser),
    )?;
    for flavor in tested.flavors() {
      let source = self.source_root(&format!("{}{}", TEST_SOURCE_ROOT, capitalize(&flavor.name)));
      plan.add_flavor(flavor.clone(), source);
    }
    Ok(plan)
  }

  fn default_config(&self) -> ConfigLayer {
    self.resolved_layer(&self.descriptor.default_config)
  }

  /// A layer with its keystore path made absolute.
  fn resolved_layer(&self, layer: &ConfigLayer) -> ConfigLayer {
    let mut layer = layer.clone();
    if let Some(store) = &layer.signing.store_location {
      layer.signing.store_location = Some(self.dir.join(store).to_string_lossy().into_owned());
    }
    layer
  }
}

impl std::fmt::Debug for Project {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("Project")
      .field("dir", &self.dir)
      .field("kind", &self.descriptor.kind)
      .field("libraries", &self.direct.len())
      .finish_non_exhaustive()
  }
}

fn capitalize(s: &str) -> String {
  let mut chars = s.chars();
  match chars.next() {
    Some(first) => first.to_uppercase().chain(chars).collect(),
    None => String::new(),
  }
}

/// Turn the library table into node trees, one shared node per name.
fn resolve_libraries(dir: &Path, descriptor: &ProjectDescriptor) -> Result<Vec<Arc<DependencyNode>>, ProjectError> {
  let mut resolved = HashMap::new();
  let mut stack = Vec::new();
  descriptor
    .dependencies
    .iter()
    .map(|name| resolve(name, "project", dir, descriptor, &mut resolved, &mut stack))
    .collect()
}

fn resolve(
  name: &str,
  parent: &str,
  dir: &Path,
  descriptor: &ProjectDescriptor,
  resolved: &mut HashMap<String, Arc<DependencyNode>>,
  stack: &mut Vec<String>,
) -> Result<Arc<DependencyNode>, ProjectError> {
  if let Some(start) = stack.iter().position(|n| n == name) {
    let mut chain = stack[start..].to_vec();
    chain.push(name.to_string());
    return Err(
      DependencyError::Cycle {
        chain: chain.join(" -> "),
      }
      .into(),
    );
  }
  if let Some(node) = resolved.get(name) {
    return Ok(Arc::clone(node));
  }

  let decl = descriptor.libraries.get(name).ok_or_else(|| ProjectError::UnknownLibrary {
    name: name.to_string(),
    parent: parent.to_string(),
  })?;

  stack.push(name.to_string());
  let children = decl
    .dependencies
    .iter()
    .map(|child| resolve(child, name, dir, descriptor, resolved, stack))
    .collect::<Result<Vec<_>, _>>()?;
  stack.pop();

  let node = DependencyNode::new(name, dir.join(&decl.folder))
    .with_dependencies(children)
    .into_arc();
  resolved.insert(name.to_string(), Arc::clone(&node));
  Ok(node)
}
