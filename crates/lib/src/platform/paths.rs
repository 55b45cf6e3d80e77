use crate::consts::{DEBUG_KEYSTORE_FILE, SDK_HOME_ENV, USER_DIR_NAME};
use std::path::PathBuf;

/// Returns the user's home directory
#[cfg(windows)]
pub fn home_dir() -> Option<PathBuf> {
  non_empty_var("USERPROFILE")
}

/// Returns the user's home directory
#[cfg(not(windows))]
pub fn home_dir() -> Option<PathBuf> {
  non_empty_var("HOME")
}

/// Returns the per-user tool directory (`.android`).
///
/// `ANDROID_SDK_HOME` replaces the home directory as its parent.
pub fn user_dir() -> Option<PathBuf> {
  non_empty_var(SDK_HOME_ENV)
    .or_else(home_dir)
    .map(|base| base.join(USER_DIR_NAME))
}

/// Returns the location of the debug keystore
pub fn debug_keystore() -> Option<PathBuf> {
  user_dir().map(|dir| dir.join(DEBUG_KEYSTORE_FILE))
}

fn non_empty_var(name: &str) -> Option<PathBuf> {
  std::env::var_os(name)
    .filter(|v| !v.is_empty())
    .map(PathBuf::from)
}
