//! Process execution capability.
//!
//! Every engine invocation goes through [`ProcessRunner`], so the image builder
//! and container runner never spawn processes themselves.

use std::collections::VecDeque;
use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, ExitStatus, Stdio};

use tracing::{debug, info};

use crate::error::{FAILURE_EXIT_CODE, OrchestrateError, Result};
use crate::util::quote;

/// Runs an argv to completion and reports its exit status.
pub trait ProcessRunner {
  /// Run `argv` (program first) and wait for it to finish.
  ///
  /// Returns the exit status; a non-zero status is not an error at this level.
  fn run(&mut self, argv: &[String]) -> Result<i32>;

  /// Like [`ProcessRunner::run`], but the command's output is not shown.
  ///
  /// Used for lookups whose exit status is the only answer of interest.
  fn run_quiet(&mut self, argv: &[String]) -> Result<i32> {
    self.run(argv)
  }
}

/// Spawns real processes with inherited stdio.
#[derive(Debug, Clone)]
pub struct SystemRunner {
  working_dir: PathBuf,
}

impl SystemRunner {
  /// Children run with `working_dir` as their current directory.
  pub fn new(working_dir: impl Into<PathBuf>) -> Self {
    Self {
      working_dir: working_dir.into(),
    }
  }

  fn spawn(&self, argv: &[String], quiet: bool) -> Result<i32> {
    let (program, args) = argv.split_first().ok_or_else(|| OrchestrateError::Spawn {
      program: String::new(),
      source: std::io::Error::new(std::io::ErrorKind::InvalidInput, "empty command line"),
    })?;

    info!(cmd = %quote::join(argv), "executing command");

    let mut command = Command::new(program);
    command.args(args).current_dir(&self.working_dir);
    if quiet {
      command.stdout(Stdio::null()).stderr(Stdio::null());
    }

    let status = command.status().map_err(|source| OrchestrateError::Spawn {
      program: program.clone(),
      source,
    })?;

    let code = exit_code(status);
    debug!(program = %program, code, "command finished");
    Ok(code)
  }
}

impl ProcessRunner for SystemRunner {
  fn run(&mut self, argv: &[String]) -> Result<i32> {
    self.spawn(argv, false)
  }

  fn run_quiet(&mut self, argv: &[String]) -> Result<i32> {
    self.spawn(argv, true)
  }
}

/// Map an exit status to a shell-style code; signal deaths become `128 + signal`.
pub fn exit_code(status: ExitStatus) -> i32 {
  if let Some(code) = status.code() {
    return code;
  }

  #[cfg(unix)]
  {
    use std::os::unix::process::ExitStatusExt;
    if let Some(signal) = status.signal() {
      return 128 + signal;
    }
  }

  FAILURE_EXIT_CODE
}

/// Prints each command instead of running it.
///
/// Every command reports success except quiet lookups, which report failure so
/// that the full chain of fallbacks is printed.
pub struct DryRunRunner<W: Write> {
  out: W,
}

impl<W: Write> DryRunRunner<W> {
  pub fn new(out: W) -> Self {
    Self { out }
  }
}

impl<W: Write> ProcessRunner for DryRunRunner<W> {
  fn run(&mut self, argv: &[String]) -> Result<i32> {
    writeln!(self.out, "{}", quote::join(argv)).map_err(|source| OrchestrateError::Spawn {
      program: argv.first().cloned().unwrap_or_default(),
      source,
    })?;
    Ok(0)
  }

  fn run_quiet(&mut self, argv: &[String]) -> Result<i32> {
    self.run(argv)?;
    Ok(FAILURE_EXIT_CODE)
  }
}

/// Records every invocation and answers with scripted exit codes.
///
/// Once the scripted codes are exhausted every call succeeds.
#[derive(Debug, Default)]
pub struct RecordingRunner {
  pub calls: Vec<Vec<String>>,
  exit_codes: VecDeque<i32>,
}

impl RecordingRunner {
  pub fn new() -> Self {
    Self::default()
  }

  /// Answer successive calls with `codes`.
  pub fn with_exit_codes(codes: impl IntoIterator<Item = i32>) -> Self {
    Self {
      calls: Vec::new(),
      exit_codes: codes.into_iter().collect(),
    }
  }

  /// Calls whose second argv element is `subcommand` (e.g. `build`, `run`).
  pub fn calls_to(&self, subcommand: &str) -> Vec<&Vec<String>> {
    self
      .calls
      .iter()
      .filter(|argv| argv.get(1).map(String::as_str) == Some(subcommand))
      .collect()
  }
}

impl ProcessRunner for RecordingRunner {
  fn run(&mut self, argv: &[String]) -> Result<i32> {
    self.calls.push(argv.to_vec());
    Ok(self.exit_codes.pop_front().unwrap_or(0))
  }
}
