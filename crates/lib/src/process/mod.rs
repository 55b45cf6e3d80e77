//! Synchronous external-process invocation.
//!
//! Every toolchain program (resource compiler, AIDL compiler, dex converter,
//! manifest merger, keytool, jarsigner) is run through a [`CommandRunner`].
//! The default [`SystemRunner`] blocks until the child exits while draining its
//! stdout and stderr on two scoped reader threads, so a chatty tool can never
//! fill a pipe and deadlock. A non-zero exit is always a failure.

use std::fmt;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::thread;

use thiserror::Error;
use tracing::{debug, info};

/// Errors from running an external program.
#[derive(Debug, Error)]
pub enum ProcessError {
  /// The program could not be started at all.
  #[error("failed to start {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// The program ran and exited unsuccessfully.
  #[error("{program} failed with exit code {code:?}{}", format_stderr(.stderr))]
  Failed {
    program: String,
    code: Option<i32>,
    stderr: String,
  },

  /// Waiting on the program or reading its output failed.
  #[error("io error while running {program}: {source}")]
  Io {
    program: String,
    #[source]
    source: io::Error,
  },
}

fn format_stderr(stderr: &str) -> String {
  let trimmed = stderr.trim();
  if trimmed.is_empty() {
    String::new()
  } else {
    format!(": {}", trimmed)
  }
}

/// A fully specified external command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
  pub program: PathBuf,
  pub args: Vec<String>,
  pub cwd: Option<PathBuf>,
  /// Extra environment, left out of the displayed command line.
  pub env: Vec<(String, String)>,
}

impl ToolCommand {
  pub fn new(program: impl Into<PathBuf>) -> Self {
    Self {
      program: program.into(),
      args: Vec::new(),
      cwd: None,
      env: Vec::new(),
    }
  }

  pub fn arg(&mut self, arg: impl Into<String>) -> &mut Self {
    self.args.push(arg.into());
    self
  }

  pub fn path_arg(&mut self, path: &Path) -> &mut Self {
    self.args.push(path.to_string_lossy().into_owned());
    self
  }

  /// Push a flag followed by its value.
  pub fn flag(&mut self, flag: &str, value: impl Into<String>) -> &mut Self {
    self.args.push(flag.to_string());
    self.args.push(value.into());
    self
  }

  pub fn flag_path(&mut self, flag: &str, path: &Path) -> &mut Self {
    self.flag(flag, path.to_string_lossy().into_owned())
  }

  pub fn args<I, S>(&mut self, args: I) -> &mut Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    self.args.extend(args.into_iter().map(Into::into));
    self
  }

  pub fn current_dir(&mut self, dir: impl Into<PathBuf>) -> &mut Self {
    self.cwd = Some(dir.into());
    self
  }

  pub fn env(&mut self, key: impl Into<String>, value: impl Into<String>) -> &mut Self {
    self.env.push((key.into(), value.into()));
    self
  }

  /// Short program name for messages (file name of the program path).
  pub fn program_name(&self) -> String {
    self
      .program
      .file_name()
      .map(|n| n.to_string_lossy().into_owned())
      .unwrap_or_else(|| self.program.display().to_string())
  }

  pub fn has_arg(&self, arg: &str) -> bool {
    self.args.iter().any(|a| a == arg)
  }

  /// Value following the first occurrence of `flag`, if any.
  pub fn value_of(&self, flag: &str) -> Option<&str> {
    self
      .args
      .iter()
      .position(|a| a == flag)
      .and_then(|i| self.args.get(i + 1))
      .map(String::as_str)
  }

  /// Every value following an occurrence of `flag`, in order.
  pub fn values_of(&self, flag: &str) -> Vec<&str> {
    self
      .args
      .windows(2)
      .filter(|w| w[0] == flag)
      .map(|w| w[1].as_str())
      .collect()
  }
}

impl fmt::Display for ToolCommand {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.program.display())?;
    for arg in &self.args {
      write!(f, " {}", arg)?;
    }
    Ok(())
  }
}

/// Captured output of a successful run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProcessOutput {
  pub stdout: String,
  pub stderr: String,
}

/// Runs external commands to completion.
pub trait CommandRunner: Send + Sync {
  fn run(&self, command: &ToolCommand) -> Result<ProcessOutput, ProcessError>;
}

/// Runs commands as real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
  fn run(&self, command: &ToolCommand) -> Result<ProcessOutput, ProcessError> {
    let program = command.program_name();
    info!(command = %command, "executing");

    let mut process = Command::new(&command.program);
    process
      .args(&command.args)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped());
    if let Some(cwd) = &command.cwd {
      process.current_dir(cwd);
    }
    process.envs(command.env.iter().map(|(k, v)| (k, v)));

    let mut child = process.spawn().map_err(|source| ProcessError::Spawn {
      program: program.clone(),
      source,
    })?;

    let stdout = child.stdout.take();
    let stderr = child.stderr.take();

    let (status, stdout, stderr) = thread::scope(|scope| {
      let out_reader = scope.spawn(move || drain(stdout));
      let err_reader = scope.spawn(move || drain(stderr));
      let status = child.wait();
      (status, join_reader(out_reader), join_reader(err_reader))
    });

    let io_err = |source| ProcessError::Io {
      program: program.clone(),
      source,
    };
    let status = status.map_err(io_err)?;
    let stdout = stdout.map_err(io_err)?;
    let stderr = stderr.map_err(io_err)?;

    if !stdout.is_empty() {
      debug!(program = %program, stdout = %stdout.trim_end(), "command stdout");
    }
    if !stderr.is_empty() {
      debug!(program = %program, stderr = %stderr.trim_end(), "command stderr");
    }

    if !status.success() {
      return Err(ProcessError::Failed {
        program,
        code: status.code(),
        stderr,
      });
    }

    Ok(ProcessOutput { stdout, stderr })
  }
}

fn drain<R: Read>(pipe: Option<R>) -> io::Result<String> {
  let mut buf = Vec::new();
  if let Some(mut pipe) = pipe {
    pipe.read_to_end(&mut buf)?;
  }
  Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn join_reader(handle: thread::ScopedJoinHandle<'_, io::Result<String>>) -> io::Result<String> {
  handle
    .join()
    .unwrap_or_else(|_| Err(io::Error::other("output reader thread panicked")))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::util::testutil::shell_cmd;

  #[test]
  fn captures_stdout() {
    let output = SystemRunner.run(&shell_cmd("echo hello")).unwrap();
    assert_eq!(output.stdout.trim(), "hello");
  }

  #[test]
  fn captures_stderr_on_success() {
    let output = SystemRunner.run(&shell_cmd("echo oops >&2")).unwrap();
    assert_eq!(output.stderr.trim(), "oops");
  }

  #[test]
  fn non_zero_exit_is_failure_with_stderr() {
    let err = SystemRunner.run(&shell_cmd("echo broken >&2; exit 3")).unwrap_err();
    match err {
      ProcessError::Failed { code, stderr, .. } => {
        assert_eq!(code, Some(3));
        assert_eq!(stderr.trim(), "broken");
      }
      other => panic!("unexpected error: {}", other),
    }
  }

  #[test]
  fn missing_program_is_spawn_error() {
    let cmd = ToolCommand::new("/definitely/not/a/real/tool");
    assert!(matches!(SystemRunner.run(&cmd), Err(ProcessError::Spawn { .. })));
  }

  #[test]
  #[cfg(unix)]
  fn large_output_on_both_pipes_does_not_deadlock() {
    // Well beyond a pipe buffer on both streams.
    let script = "i=0; while [ $i -lt 20000 ]; do echo out-line-$i; echo err-line-$i >&2; i=$((i+1)); done";
    let output = SystemRunner.run(&shell_cmd(script)).unwrap();
    assert_eq!(output.stdout.lines().count(), 20000);
    assert_eq!(output.stderr.lines().count(), 20000);
  }

  #[test]
  #[cfg(unix)]
  fn runs_in_requested_directory() {
    let temp = tempfile::TempDir::new().unwrap();
    let mut cmd = shell_cmd("pwd");
    cmd.current_dir(temp.path());
    let output = SystemRunner.run(&cmd).unwrap();
    let reported = std::path::PathBuf::from(output.stdout.trim());
    assert_eq!(
      reported.canonicalize().unwrap(),
      temp.path().canonicalize().unwrap()
    );
  }

  #[test]
  #[cfg(unix)]
  fn extra_environment_reaches_child_but_not_display() {
    let mut cmd = shell_cmd("echo $VFORGE_SECRET");
    cmd.env("VFORGE_SECRET", "hunter2");
    assert!(!cmd.to_string().contains("hunter2"));
    let output = SystemRunner.run(&cmd).unwrap();
    assert_eq!(output.stdout.trim(), "hunter2");
  }

  #[test]
  fn flag_helpers() {
    let mut cmd = ToolCommand::new("/sdk/platform-tools/aapt");
    cmd.arg("package").flag("-S", "a").flag("-S", "b").flag("-M", "m.xml");
    assert_eq!(cmd.program_name(), "aapt");
    assert_eq!(cmd.value_of("-M"), Some("m.xml"));
    assert_eq!(cmd.values_of("-S"), vec!["a", "b"]);
    assert!(cmd.has_arg("package"));
    assert_eq!(cmd.to_string(), "/sdk/platform-tools/aapt package -S a -S b -M m.xml");
  }
}
