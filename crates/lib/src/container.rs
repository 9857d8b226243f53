//! Running the build container.

use tracing::info;

use crate::config::OrchestrationConfig;
use crate::consts::CONTAINER_CCACHE_DIR;
use crate::engine::{Engine, EngineChoice};
use crate::error::Result;
use crate::execute::process::ProcessRunner;
use crate::recipe::CommandLine;

/// Compose the container run invocation.
///
/// Extra arguments are passed verbatim, after the orchestrator's own options
/// and before the image reference; the container command comes last.
pub fn run_container_command(engine: &EngineChoice, config: &OrchestrationConfig) -> CommandLine {
  let mut cmd = vec![engine.program_arg(), "run".to_string()];

  if !config.keep_container {
    cmd.push("--rm".to_string());
  }
  if engine.engine == Engine::Podman {
    cmd.push("--pids-limit=-1".to_string());
  }
  if config.map_user {
    cmd.push("--user=0".to_string());
  }

  cmd.push(format!(
    "--volume={}:{}:Z",
    config.source_dir.display(),
    config.homedir
  ));
  cmd.push(format!("-eHOMEDIR={}", config.homedir));
  cmd.push(format!("-eBUILD_DIR={}", config.build_dir));

  if let Some(dir) = &config.ccache_dir {
    cmd.push(format!("--volume={}:{}:Z", dir.display(), CONTAINER_CCACHE_DIR));
    cmd.push(format!("-eCCACHE_DIR={}", CONTAINER_CCACHE_DIR));
  }

  cmd.extend(config.extra_args.iter().cloned());
  cmd.push(config.image_ref());
  cmd.extend(config.command.iter().cloned());
  cmd
}

/// Run the container and return the exit status of the containerized process.
pub fn run_container<R: ProcessRunner + ?Sized>(
  engine: &EngineChoice,
  config: &OrchestrationConfig,
  runner: &mut R,
) -> Result<i32> {
  match config.recipe {
    Some(recipe) => info!(image = %config.image_ref(), recipe = %recipe, "running recipe in container"),
    None => info!(image = %config.image_ref(), "running command in container"),
  }
  runner.run(&run_container_command(engine, config))
}
