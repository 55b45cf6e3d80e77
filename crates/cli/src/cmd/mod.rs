mod build;
mod info;
mod plan;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use vforge_lib::consts::PROJECT_FILE;
use vforge_lib::project::Project;
use vforge_lib::variant::VariantPlan;

pub use build::{BuildArgs, cmd_build};
pub use info::cmd_info;
pub use plan::cmd_plan;

/// Which variant of which project.
#[derive(Debug, Clone, Args)]
pub struct VariantArgs {
  /// Project descriptor, or a folder containing one
  #[arg(short, long, default_value = PROJECT_FILE)]
  pub project: PathBuf,

  /// Build type
  #[arg(short, long = "build-type", default_value = "debug")]
  pub build_type: String,

  /// Product flavor, repeatable, in priority order (last wins)
  #[arg(short, long = "flavor")]
  pub flavors: Vec<String>,

  /// Select the instrumentation test variant
  #[arg(long)]
  pub test: bool,
}

impl VariantArgs {
  pub fn load(&self) -> Result<(Project, VariantPlan)> {
    let project = Project::load(&self.project)
      .with_context(|| format!("Failed to load project: {}", self.project.display()))?;
    let plan = if self.test {
      project.test_variant(&self.build_type, &self.flavors)
    } else {
      project.variant(&self.build_type, &self.flavors)
    }
    .with_context(|| format!("Failed to resolve variant '{}'", self.build_type))?;
    Ok((project, plan))
  }
}
