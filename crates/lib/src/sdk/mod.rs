//! SDK discovery and compile targets.
//!
//! An SDK directory holds one folder per platform under `platforms/` plus the
//! shared command-line tools. A [`Target`] is one platform with the tool paths
//! a build needs.

use std::env;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::debug;

use crate::consts::SDK_ENV_VARS;

/// Errors locating the SDK or one of its targets.
#[derive(Debug, Error)]
pub enum SdkError {
  #[error("no SDK found: pass --sdk or set {}", SDK_ENV_VARS.join(" or "))]
  NotFound,

  #[error("SDK location {} is not a directory", path.display())]
  NotADirectory { path: PathBuf },

  #[error("unknown target '{name}' in {}", sdk.display())]
  UnknownTarget { name: String, sdk: PathBuf },

  #[error("target '{name}' is missing {}", path.display())]
  Incomplete { name: String, path: PathBuf },

  #[error("cannot read api level from target name '{0}'")]
  BadTargetName(String),
}

/// A located SDK installation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Sdk {
  root: PathBuf,
}

impl Sdk {
  pub fn new(root: impl Into<PathBuf>) -> Result<Self, SdkError> {
    let root = root.into();
    if !root.is_dir() {
      return Err(SdkError::NotADirectory { path: root });
    }
    Ok(Self { root })
  }

  /// Locate the SDK: `explicit` first, then the SDK environment variables.
  pub fn locate(explicit: Option<&Path>) -> Result<Self, SdkError> {
    if let Some(path) = explicit {
      return Self::new(path);
    }
    for var in SDK_ENV_VARS {
      if let Ok(value) = env::var(var)
        && !value.is_empty()
      {
        debug!(var, path = %value, "sdk from environment");
        return Self::new(value);
      }
    }
    Err(SdkError::NotFound)
  }

  pub fn root(&self) -> &Path {
    &self.root
  }

  /// Resolve a platform target such as `android-17`.
  pub fn resolve_target(&self, name: &str) -> Result<Target, SdkError> {
    let platform = self.root.join("platforms").join(name);
    if !platform.is_dir() {
      return Err(SdkError::UnknownTarget {
        name: name.to_string(),
        sdk: self.root.clone(),
      });
    }
    let api_level = parse_api_level(name)?;

    let android_jar = platform.join("android.jar");
    if !android_jar.is_file() {
      return Err(SdkError::Incomplete {
        name: name.to_string(),
        path: android_jar,
      });
    }

    let mut optional_libraries: Vec<PathBuf> = std::fs::read_dir(platform.join("optional"))
      .into_iter()
      .flatten()
      .filter_map(Result::ok)
      .map(|e| e.path())
      .filter(|p| p.extension().and_then(|e| e.to_str()) == Some("jar"))
      .collect();
    optional_libraries.sort();

    let tools = self.root.join("platform-tools");
    Ok(Target {
      name: name.to_string(),
      api_level,
      framework_aidl: platform.join("framework.aidl"),
      android_jar,
      optional_libraries,
      aapt: tools.join(exe("aapt")),
      aidl: tools.join(exe("aidl")),
      dx: tools.join(script("dx")),
      manifest_merger: self.root.join("tools").join(script("manifmerger")),
      annotations_jar: self.root.join("tools").join("support").join("annotations.jar"),
    })
  }
}

/// One compile platform and its tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Target {
  pub name: String,
  pub api_level: u32,
  pub android_jar: PathBuf,
  pub framework_aidl: PathBuf,
  pub optional_libraries: Vec<PathBuf>,
  pub aapt: PathBuf,
  pub aidl: PathBuf,
  pub dx: PathBuf,
  pub manifest_merger: PathBuf,
  pub annotations_jar: PathBuf,
}

impl Target {
  /// Last api level whose platform jar lacks the support annotations.
  pub const ANNOTATIONS_MAX_API: u32 = 15;

  /// Platform jar, optional libraries, then annotations on old platforms.
  pub fn runtime_classpath(&self) -> Vec<PathBuf> {
    let mut classpath = vec![self.android_jar.clone()];
    classpath.extend(self.optional_libraries.iter().cloned());
    if self.api_level <= Self::ANNOTATIONS_MAX_API {
      classpath.push(self.annotations_jar.clone());
    }
    classpath
  }
}

fn parse_api_level(name: &str) -> Result<u32, SdkError> {
  name
    .rsplit('-')
    .next()
    .and_then(|n| n.parse().ok())
    .ok_or_else(|| SdkError::BadTargetName(name.to_string()))
}

fn exe(name: &str) -> String {
  format!("{}{}", name, env::consts::EXE_SUFFIX)
}

#[cfg(windows)]
fn script(name: &str) -> String {
  format!("{}.bat", name)
}

#[cfg(not(windows))]
fn script(name: &str) -> String {
  name.to_string()
}
