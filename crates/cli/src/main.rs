mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use vforge_lib::error::{BuildError, ErrorKind};
use vforge_lib::project::ProjectError;
use vforge_lib::sdk::SdkError;

use crate::cmd::{BuildArgs, VariantArgs};
use crate::output::{OutputFormat, print_error};

/// vforge - resolve and build Android-style application, library and test variants
#[derive(Parser)]
#[command(name = "vforge")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Enable verbose output
  #[arg(short, long, global = true)]
  verbose: bool,

  /// Output format
  #[arg(short, long, global = true, value_enum, default_value_t)]
  output: OutputFormat,

  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// Show how a variant resolves, without running any tool
  Plan {
    #[command(flatten)]
    variant: VariantArgs,
  },

  /// Run the full build pipeline for a variant
  Build(BuildArgs),

  /// Show version, SDK location and debug keystore location
  Info {
    /// SDK folder (default: $ANDROID_SDK_ROOT, then $ANDROID_HOME)
    #[arg(long)]
    sdk: Option<PathBuf>,
  },
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = if cli.verbose {
    EnvFilter::new("debug")
  } else {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
  };
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let result = match &cli.command {
    Commands::Plan { variant } => cmd::cmd_plan(variant, cli.output),
    Commands::Build(args) => cmd::cmd_build(args, cli.verbose, cli.output),
    Commands::Info { sdk } => cmd::cmd_info(sdk.as_deref(), cli.output),
  };

  match result {
    Ok(()) => ExitCode::SUCCESS,
    Err(e) => {
      match error_kind(&e) {
        Some(kind) => print_error(&format!("[{}] {:#}", kind, e)),
        None => print_error(&format!("{:#}", e)),
      }
      ExitCode::FAILURE
    }
  }
}

/// The failure class of a library error anywhere in the chain.
fn error_kind(err: &anyhow::Error) -> Option<ErrorKind> {
  if let Some(e) = err.downcast_ref::<BuildError>() {
    return Some(e.kind());
  }
  if let Some(e) = err.downcast_ref::<ProjectError>() {
    return Some(e.kind());
  }
  err.downcast_ref::<SdkError>().map(|_| ErrorKind::Configuration)
}
