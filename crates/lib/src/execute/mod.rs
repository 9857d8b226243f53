//! Orchestration execution.
//!
//! Drives the phases of one invocation in order:
//! 1. Resolve the container engine (only if a phase is enabled)
//! 2. Acquire the image from the allowed sources, unless skipped
//! 3. Run the container, unless skipped
//!
//! A failed image acquisition stops the sequence before the run phase.

pub mod process;

use std::path::PathBuf;

use tracing::info;

use crate::config::OrchestrationConfig;
use crate::container::run_container;
use crate::engine::{EngineChoice, resolve_engine_with};
use crate::error::Result;
use crate::image::acquire_image;
use process::ProcessRunner;

/// Pick the engine: an explicit override, or the first engine `probe` finds.
pub fn select_engine<F>(config: &OrchestrationConfig, probe: F) -> Result<EngineChoice>
where
  F: Fn(&str) -> Option<PathBuf>,
{
  match &config.container_engine {
    Some(choice) => Ok(choice.clone()),
    None => resolve_engine_with(probe),
  }
}

/// Execute the configured phases and return the orchestration's exit status.
///
/// The status is the container's own exit status when the run phase executes,
/// and 0 otherwise.
pub fn execute<F, R>(config: &OrchestrationConfig, probe: F, runner: &mut R) -> Result<i32>
where
  F: Fn(&str) -> Option<PathBuf>,
  R: ProcessRunner + ?Sized,
{
  if !config.needs_engine() {
    info!("image build and container run both skipped, nothing to do");
    return Ok(0);
  }

  let engine = select_engine(config, probe)?;
  info!(engine = %engine.engine, program = %engine.program.display(), "using container engine");

  if config.build_image {
    acquire_image(&engine, config, runner)?;
  }

  if !config.run_container {
    return Ok(0);
  }

  run_container(&engine, config, runner)
}
