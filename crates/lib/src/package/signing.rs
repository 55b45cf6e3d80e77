//! Package signing credentials and the JDK tools that use them.
//!
//! Debug builds sign with a per-user debug keystore, created with `keytool`
//! the first time it is needed. Release builds sign only when all four
//! credentials are configured.

use std::env;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info};

use crate::config::{BuildType, SigningConfig};
use crate::platform::paths;
use crate::process::{CommandRunner, ProcessError, ToolCommand};

pub const DEBUG_KEY_ALIAS: &str = "androiddebugkey";
pub const DEBUG_PASSWORD: &str = "android";
pub const DEBUG_DNAME: &str = "CN=Android Debug,O=Android,C=US";
pub const DEBUG_VALIDITY_DAYS: u32 = 10950;

const STOREPASS_ENV: &str = "VFORGE_STOREPASS";
const KEYPASS_ENV: &str = "VFORGE_KEYPASS";

/// Errors obtaining credentials or signing.
#[derive(Debug, Error)]
pub enum SigningError {
  #[error("cannot determine the debug keystore location: set HOME or ANDROID_SDK_HOME")]
  NoUserDir,

  #[error("a folder is in the way of the debug keystore: {}", path.display())]
  KeystoreInTheWay { path: PathBuf },

  #[error("keytool did not create the debug keystore at {}", path.display())]
  StoreNotCreated { path: PathBuf },

  #[error("keystore {} does not exist", path.display())]
  MissingStore { path: PathBuf },

  #[error("{tool} not found: set JAVA_HOME or add it to PATH")]
  ToolNotFound { tool: &'static str },

  #[error("failed to create debug keystore: {0}")]
  Keytool(#[source] ProcessError),

  #[error("failed to sign package: {0}")]
  Jarsigner(#[source] ProcessError),

  #[error("io error at {path}: {source}")]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
}

/// Complete credentials for one signing operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningInfo {
  pub store: PathBuf,
  pub store_password: String,
  pub key_alias: String,
  pub key_password: String,
}

impl SigningInfo {
  pub fn debug(store: impl Into<PathBuf>) -> Self {
    Self {
      store: store.into(),
      store_password: DEBUG_PASSWORD.to_string(),
      key_alias: DEBUG_KEY_ALIAS.to_string(),
      key_password: DEBUG_PASSWORD.to_string(),
    }
  }

  /// Release credentials from a merged config. `None` unless all four are set.
  pub fn release(config: &SigningConfig) -> Result<Option<Self>, SigningError> {
    let (Some(store), Some(store_password), Some(key_alias), Some(key_password)) = (
      &config.store_location,
      &config.store_password,
      &config.key_alias,
      &config.key_password,
    ) else {
      return Ok(None);
    };
    let store = PathBuf::from(store);
    if !store.is_file() {
      return Err(SigningError::MissingStore { path: store });
    }
    Ok(Some(Self {
      store,
      store_password: store_password.clone(),
      key_alias: key_alias.clone(),
      key_password: key_password.clone(),
    }))
  }
}

/// Locations of `keytool` and `jarsigner`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JavaTools {
  pub keytool: PathBuf,
  pub jarsigner: PathBuf,
}

impl JavaTools {
  /// Look in `$JAVA_HOME/bin` first, then on `PATH`.
  pub fn locate() -> Result<Self, SigningError> {
    Ok(Self {
      keytool: locate_tool("keytool")?,
      jarsigner: locate_tool("jarsigner")?,
    })
  }
}

fn locate_tool(tool: &'static str) -> Result<PathBuf, SigningError> {
  if let Some(home) = env::var_os("JAVA_HOME").filter(|v| !v.is_empty()) {
    let candidate = PathBuf::from(home)
      .join("bin")
      .join(format!("{}{}", tool, env::consts::EXE_SUFFIX));
    if candidate.is_file() {
      return Ok(candidate);
    }
  }
  which::which(tool).map_err(|_| SigningError::ToolNotFound { tool })
}

/// Signs packages and manages the debug keystore.
pub struct Signer<'a> {
  runner: &'a dyn CommandRunner,
  tools: JavaTools,
}

impl<'a> Signer<'a> {
  pub fn new(runner: &'a dyn CommandRunner, tools: JavaTools) -> Self {
    Self { runner, tools }
  }

  /// Credentials a build type signs with, if any.
  ///
  /// Debug-signed build types always sign with the debug key, creating the
  /// keystore at `debug_store` (default: the per-user location) when absent.
  pub fn credentials_for(
    &self,
    build_type: &BuildType,
    merged: &SigningConfig,
    debug_store: Option<&Path>,
  ) -> Result<Option<SigningInfo>, SigningError> {
    if build_type.debug_signed {
      let store = match debug_store {
        Some(path) => path.to_path_buf(),
        None => paths::debug_keystore().ok_or(SigningError::NoUserDir)?,
      };
      return self.ensure_debug_keystore(&store).map(Some);
    }
    SigningInfo::release(merged)
  }

  /// Create the debug keystore unless it already exists.
  pub fn ensure_debug_keystore(&self, store: &Path) -> Result<SigningInfo, SigningError> {
    if store.is_dir() {
      return Err(SigningError::KeystoreInTheWay {
        path: store.to_path_buf(),
      });
    }
    if store.exists() {
      debug!(store = %store.display(), "reusing debug keystore");
      return Ok(SigningInfo::debug(store));
    }

    if let Some(parent) = store.parent() {
      std::fs::create_dir_all(parent).map_err(|source| SigningError::Io {
        path: parent.to_path_buf(),
        source,
      })?;
    }

    info!(store = %store.display(), "creating debug keystore");
    let mut cmd = ToolCommand::new(&self.tools.keytool);
    cmd
      .arg("-genkey")
      .flag("-alias", DEBUG_KEY_ALIAS)
      .flag("-keyalg", "RSA")
      .flag("-dname", DEBUG_DNAME)
      .flag("-validity", DEBUG_VALIDITY_DAYS.to_string())
      .flag("-keypass", DEBUG_PASSWORD)
      .flag_path("-keystore", store)
      .flag("-storepass", DEBUG_PASSWORD);
    self.runner.run(&cmd).map_err(SigningError::Keytool)?;

    if !store.is_file() {
      return Err(SigningError::StoreNotCreated {
        path: store.to_path_buf(),
      });
    }
    Ok(SigningInfo::debug(store))
  }

  /// Sign `package` in place.
  pub fn sign(&self, package: &Path, info: &SigningInfo) -> Result<(), SigningError> {
    info!(package = %package.display(), alias = %info.key_alias, "signing");
    let mut cmd = ToolCommand::new(&self.tools.jarsigner);
    cmd
      .flag_path("-keystore", &info.store)
      .flag("-storepass:env", STOREPASS_ENV)
      .flag("-keypass:env", KEYPASS_ENV)
      .flag("-sigalg", "SHA1withRSA")
      .flag("-digestalg", "SHA1")
      .path_arg(package)
      .arg(info.key_alias.clone())
      .env(STOREPASS_ENV, info.store_password.clone())
      .env(KEYPASS_ENV, info.key_password.clone());
    self.runner.run(&cmd).map_err(SigningError::Jarsigner)?;
    Ok(())
  }
}
