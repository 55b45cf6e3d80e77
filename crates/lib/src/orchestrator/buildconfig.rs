//! Generated `BuildConfig` class.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::{Builder, create_parent};
use crate::error::BuildError;
use crate::variant::VariantKind;

impl Builder {
  /// Write `BuildConfig.java` under `out_dir`, in the package's folder.
  ///
  /// Test variants use their own package; other variants use the manifest
  /// package, which stays stable across package renames.
  pub fn generate_build_config(&self, out_dir: &Path, extra_lines: &[String]) -> Result<PathBuf, BuildError> {
    let plan = self.variant()?;
    let package = match plan.kind() {
      VariantKind::Test => plan.package_name()?,
      _ => plan.package_from_manifest()?,
    };

    let mut lines = plan.build_config_lines();
    lines.extend(extra_lines.iter().cloned());

    let mut file = out_dir.to_path_buf();
    file.extend(package.split('.'));
    file.push("BuildConfig.java");
    create_parent(&file)?;

    let content = render(&package, plan.build_type().debuggable, &lines);
    fs::write(&file, content).map_err(|e| BuildError::io(&file, e))?;
    info!(path = %file.display(), "generated build config");
    Ok(file)
  }
}

fn render(package: &str, debug: bool, lines: &[String]) -> String {
  let mut out = String::new();
  out.push_str("/** Automatically generated file. DO NOT MODIFY */\n");
  out.push_str(&format!("package {};\n\n", package));
  out.push_str("public final class BuildConfig {\n");
  out.push_str(&format!("    public final static boolean DEBUG = {};\n", debug));
  if !lines.is_empty() {
    out.push('\n');
    for line in lines {
      out.push_str("    ");
      out.push_str(line);
      out.push('\n');
    }
  }
  out.push_str("}\n");
  out
}
