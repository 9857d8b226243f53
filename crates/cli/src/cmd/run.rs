//! Implementation of the orchestration run.
//!
//! Captures the host context, resolves the configuration (every usage error
//! is reported here, before git or the engine is started) and then executes
//! the image and container run phases.

use std::io;
use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::debug;

use ctrbuild_lib::engine::find_on_path;
use ctrbuild_lib::execute::execute;
use ctrbuild_lib::execute::process::{DryRunRunner, SystemRunner};
use ctrbuild_lib::git::GitRevisions;
use ctrbuild_lib::{HostContext, OrchestrationConfig, OrchestrationOptions};

/// Parsed command-line input for one invocation.
#[derive(Debug)]
pub struct RunArgs {
  pub options: OrchestrationOptions,
  pub cwd: Option<PathBuf>,
  pub dry_run: bool,
}

/// Execute the orchestration.
///
/// Returns the exit status the process should terminate with: the container's
/// exit status when the run phase executes, 0 otherwise.
pub fn cmd_run(args: RunArgs) -> Result<i32> {
  let ctx = HostContext::detect(args.cwd.as_deref()).context("Failed to inspect host")?;
  debug!(?ctx, "host context");

  let revisions = GitRevisions::new(&ctx.source_dir);
  let config = OrchestrationConfig::resolve_with(args.options, &ctx, &revisions).context("Invalid arguments")?;
  debug!(?config, "resolved configuration");

  let code = if args.dry_run {
    let mut runner = DryRunRunner::new(io::stdout().lock());
    execute(&config, find_on_path, &mut runner)?
  } else {
    let mut runner = SystemRunner::new(&config.source_dir);
    execute(&config, find_on_path, &mut runner)?
  };

  Ok(code)
}
