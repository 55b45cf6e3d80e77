use serde::{Deserialize, Serialize};

/// Signing credentials carried by a configuration layer.
///
/// Every field is independently overridable by a higher-priority layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SigningConfig {
  #[serde(skip_serializing_if = "Option::is_none")]
  pub store_location: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub store_password: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub key_alias: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub key_password: Option<String>,
}

impl SigningConfig {
  /// Returns true only when all four credentials are present.
  ///
  /// Partial credentials are never used to sign.
  pub fn is_ready(&self) -> bool {
    self.store_location.is_some()
      && self.store_password.is_some()
      && self.key_alias.is_some()
      && self.key_password.is_some()
  }

  fn merge_over(&self, base: &SigningConfig) -> SigningConfig {
    SigningConfig {
      store_location: choose(&self.store_location, &base.store_location),
      store_password: choose(&self.store_password, &base.store_password),
      key_alias: choose(&self.key_alias, &base.key_alias),
      key_password: choose(&self.key_password, &base.key_password),
    }
  }
}

/// A named, mergeable bag of build attributes: the default config or a product flavor.
///
/// `None` is the "unset" sentinel for every scalar: a merge never treats it as a value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigLayer {
  pub name: String,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub min_sdk_version: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub target_sdk_version: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version_code: Option<u32>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub version_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub package_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub test_package_name: Option<String>,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub test_instrumentation_runner: Option<String>,
  pub signing: SigningConfig,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub build_config_lines: Vec<String>,
}

impl ConfigLayer {
  pub fn new(name: &str) -> Self {
    Self {
      name: name.to_string(),
      ..Self::default()
    }
  }

  /// Append lines to the generated build-config class.
  pub fn add_build_config_lines<I, S>(&mut self, lines: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.build_config_lines.extend(lines.into_iter().map(Into::into));
  }

  /// Merge this layer on top of `base`, returning a new layer.
  ///
  /// Every scalar takes this layer's value when set and `base`'s otherwise.
  /// Neither input is modified. Build-config lines are not merged here: they are
  /// concatenated per layer by the variant plan.
  pub fn merge_over(&self, base: &ConfigLayer) -> ConfigLayer {
    ConfigLayer {
      name: String::new(),
      min_sdk_version: self.min_sdk_version.or(base.min_sdk_version),
      target_sdk_version: self.target_sdk_version.or(base.target_sdk_version),
      version_code: self.version_code.or(base.version_code),
      version_name: choose(&self.version_name, &base.version_name),
      package_name: choose(&self.package_name, &base.package_name),
      test_package_name: choose(&self.test_package_name, &base.test_package_name),
      test_instrumentation_runner: choose(&self.test_instrumentation_runner, &base.test_instrumentation_runner),
      signing: self.signing.merge_over(&base.signing),
      build_config_lines: Vec::new(),
    }
  }
}

fn choose(overlay: &Option<String>, base: &Option<String>) -> Option<String> {
  overlay.as_ref().or(base.as_ref()).cloned()
}

/// Build-type layer: debug/release style switches plus build-config lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BuildType {
  pub name: String,
  pub debuggable: bool,
  pub debug_jni_build: bool,
  pub debug_signed: bool,
  #[serde(skip_serializing_if = "Option::is_none")]
  pub package_name_suffix: Option<String>,
  #[serde(skip_serializing_if = "Vec::is_empty")]
  pub build_config_lines: Vec<String>,
}

impl Default for BuildType {
  fn default() -> Self {
    Self::release()
  }
}

impl BuildType {
  pub const DEBUG: &'static str = "debug";
  pub const RELEASE: &'static str = "release";

  pub fn new(name: &str) -> Self {
    match name {
      Self::DEBUG => Self::debug(),
      _ => Self {
        name: name.to_string(),
        ..Self::release()
      },
    }
  }

  pub fn debug() -> Self {
    Self {
      name: Self::DEBUG.to_string(),
      debuggable: true,
      debug_jni_build: true,
      debug_signed: true,
      package_name_suffix: None,
      build_config_lines: Vec::new(),
    }
  }

  pub fn release() -> Self {
    Self {
      name: Self::RELEASE.to_string(),
      debuggable: false,
      debug_jni_build: false,
      debug_signed: false,
      package_name_suffix: None,
      build_config_lines: Vec::new(),
    }
  }

  /// The suffix, if one is set and non-empty.
  pub fn package_suffix(&self) -> Option<&str> {
    self.package_name_suffix.as_deref().filter(|s| !s.is_empty())
  }

  pub fn add_build_config_lines<I, S>(&mut self, lines: I)
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.build_config_lines.extend(lines.into_iter().map(Into::into));
  }
}
