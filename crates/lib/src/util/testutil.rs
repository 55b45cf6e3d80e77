//! Test utilities for vforge-lib.
//!
//! Provides shell helpers for process tests, a [`RecordingRunner`] that stands
//! in for the external toolchain, and fixtures for SDKs, manifests and jars.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use zip::write::SimpleFileOptions;

use crate::process::{CommandRunner, ProcessError, ProcessOutput, ToolCommand};

/// Returns a command that runs `script` through the platform shell.
#[cfg(unix)]
pub fn shell_cmd(script: &str) -> ToolCommand {
  let mut cmd = ToolCommand::new("/bin/sh");
  cmd.arg("-c").arg(script);
  cmd
}

#[cfg(windows)]
pub fn shell_cmd(script: &str) -> ToolCommand {
  let mut cmd = ToolCommand::new("cmd.exe");
  cmd.arg("/C").arg(script);
  cmd
}

type Handler = Box<dyn Fn(&ToolCommand) -> Result<ProcessOutput, ProcessError> + Send + Sync>;

/// A [`CommandRunner`] that records every command instead of spawning it.
///
/// Handlers registered per program name can simulate tool side effects
/// (writing output files) or failures. Unhandled programs succeed silently.
#[derive(Default)]
pub struct RecordingRunner {
  commands: Mutex<Vec<ToolCommand>>,
  handlers: Vec<(String, Handler)>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Register a handler for commands whose program file name starts with `program`.
  /// Later registrations take precedence.
  pub fn on<F>(mut self, program: &str, handler: F) -> Self
  where
    F: Fn(&ToolCommand) -> Result<ProcessOutput, ProcessError> + Send + Sync + 'static,
  {
    self.handlers.push((program.to_string(), Box::new(handler)));
    self
  }

  /// Make every invocation of `program` fail with exit code 1.
  pub fn failing(self, program: &str) -> Self {
    let name = program.to_string();
    self.on(program, move |_| {
      Err(ProcessError::Failed {
        program: name.clone(),
        code: Some(1),
        stderr: format!("{} exploded", name),
      })
    })
  }

  pub fn commands(&self) -> Vec<ToolCommand> {
    self.commands.lock().unwrap().clone()
  }

  /// Recorded commands for one program.
  pub fn commands_for(&self, program: &str) -> Vec<ToolCommand> {
    self
      .commands()
      .into_iter()
      .filter(|c| c.program_name().starts_with(program))
      .collect()
  }
}

impl CommandRunner for RecordingRunner {
  fn run(&self, command: &ToolCommand) -> Result<ProcessOutput, ProcessError> {
    self.commands.lock().unwrap().push(command.clone());
    let name = command.program_name();
    for (program, handler) in self.handlers.iter().rev() {
      if name.starts_with(program.as_str()) {
        return handler(command);
      }
    }
    Ok(ProcessOutput::default())
  }
}

/// Write a minimal manifest declaring `package`.
pub fn write_manifest(path: &Path, package: &str) -> PathBuf {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(
    path,
    format!(
      "<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<manifest xmlns:android=\"http://schemas.android.com/apk/res/android\"\n    package=\"{}\">\n</manifest>\n",
      package
    ),
  )
  .unwrap();
  path.to_path_buf()
}

/// Write a file, creating parent directories.
pub fn write_file(path: &Path, content: &str) -> PathBuf {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  fs::write(path, content).unwrap();
  path.to_path_buf()
}

/// Write a zip archive containing `entries` (archive path, content).
pub fn write_zip(path: &Path, entries: &[(&str, &str)]) -> PathBuf {
  if let Some(parent) = path.parent() {
    fs::create_dir_all(parent).unwrap();
  }
  let file = fs::File::create(path).unwrap();
  let mut zip = zip::ZipWriter::new(file);
  for (name, content) in entries {
    zip.start_file(*name, SimpleFileOptions::default()).unwrap();
    zip.write_all(content.as_bytes()).unwrap();
  }
  zip.finish().unwrap();
  path.to_path_buf()
}

/// Names of all entries in a zip archive, in archive order.
pub fn zip_entry_names(path: &Path) -> Vec<String> {
  let file = fs::File::open(path).unwrap();
  let archive = zip::ZipArchive::new(file).unwrap();
  archive.file_names().map(str::to_string).collect()
}

/// Lay out a minimal SDK with one platform target under `root`.
pub fn fake_sdk(root: &Path, target: &str) -> PathBuf {
  let platform = root.join("platforms").join(target);
  write_file(&platform.join("android.jar"), "jar");
  write_file(&platform.join("framework.aidl"), "aidl");
  for tool in ["aapt", "aidl", "dx"] {
    write_file(&root.join("platform-tools").join(tool), "#!/bin/sh\n");
  }
  write_file(&root.join("tools").join("manifmerger"), "#!/bin/sh\n");
  root.to_path_buf()
}
