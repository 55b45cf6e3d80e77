use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::Serialize;

use vforge_lib::platform::paths::debug_keystore;
use vforge_lib::sdk::Sdk;

use crate::output::{OutputFormat, print_json, print_stat, print_success};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct Info {
  version: &'static str,
  sdk: Option<PathBuf>,
  debug_keystore: Option<PathBuf>,
}

pub fn cmd_info(sdk: Option<&Path>, format: OutputFormat) -> Result<()> {
  let info = Info {
    version: env!("CARGO_PKG_VERSION"),
    sdk: Sdk::locate(sdk).ok().map(|s| s.root().to_path_buf()),
    debug_keystore: debug_keystore(),
  };

  if format.is_json() {
    return print_json(&info);
  }

  print_success(&format!("vforge {}", info.version));
  let missing = || "not found".to_string();
  print_stat("SDK", &info.sdk.as_ref().map_or_else(missing, |p| p.display().to_string()));
  print_stat(
    "Debug keystore",
    &info
      .debug_keystore
      .as_ref()
      .map_or_else(missing, |p| p.display().to_string()),
  );
  Ok(())
}
