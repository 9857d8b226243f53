mod cmd;
mod output;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use ctrbuild_lib::consts::{DEFAULT_BUILD_DIR, DEFAULT_CONTAINERFILE, DEFAULT_DISTRO, DEFAULT_HOMEDIR, DEFAULT_IMAGE_NAME};
use ctrbuild_lib::distro::known_short_names;
use ctrbuild_lib::error::{FAILURE_EXIT_CODE, OrchestrateError};
use ctrbuild_lib::recipe::Recipe;
use tracing_subscriber::EnvFilter;

use crate::cmd::RunArgs;

/// Build Ceph inside a container image tailored to a target distro
#[derive(Parser)]
#[command(name = "build-with-container")]
#[command(author, version, about, long_about = None)]
struct Cli {
  /// Distro alias or base image reference
  #[arg(short, long, default_value = DEFAULT_DISTRO, long_help = distro_help())]
  distro: String,

  /// Image tag (default: <branch>.<distro>)
  #[arg(short, long)]
  tag: Option<String>,

  /// Image repository name
  #[arg(long, visible_alias = "image-repo", default_value = DEFAULT_IMAGE_NAME)]
  name: String,

  /// Persist the dnf package cache under this directory
  #[arg(long, visible_alias = "dnf-cache-path", value_name = "DIR")]
  dnf_cache: Option<PathBuf>,

  /// Build directory, relative to the source root
  #[arg(short, long, value_name = "DIR", default_value = DEFAULT_BUILD_DIR)]
  build_dir: String,

  /// Extra argument for the container run command (repeatable)
  #[arg(short = 'x', long = "extra", value_name = "ARG", allow_hyphen_values = true)]
  extra: Vec<String>,

  /// Recipe to run in the container
  #[arg(short, long, visible_short_alias = 'e', visible_alias = "execute", long_help = recipe_help())]
  recipe: Option<String>,

  /// Do not run the container
  #[arg(long)]
  no_build: bool,

  /// Do not build the container image
  #[arg(long)]
  no_container_build: bool,

  /// Where the image may come from: cache, pull, build (comma separated)
  #[arg(short = 'I', long, value_name = "SOURCES", value_delimiter = ',')]
  image_sources: Vec<String>,

  /// Build any source rpm, not only the one made from the checked out commit
  #[arg(long)]
  rpm_no_match_sha: bool,

  /// Container engine to use instead of searching PATH (podman or docker)
  #[arg(long, value_name = "ENGINE")]
  container_engine: Option<String>,

  /// Source tree root (default: current directory)
  #[arg(long, value_name = "DIR")]
  cwd: Option<PathBuf>,

  /// Mount point of the source tree inside the container
  #[arg(long, value_name = "DIR", default_value = DEFAULT_HOMEDIR)]
  homedir: String,

  /// Containerfile used to build the image
  #[arg(long, value_name = "FILE", default_value = DEFAULT_CONTAINERFILE)]
  containerfile: PathBuf,

  /// Build context directory for the image
  #[arg(long, value_name = "DIR")]
  containerdir: Option<PathBuf>,

  /// Keep the container after it exits
  #[arg(long)]
  keep_container: bool,

  /// Print the engine commands instead of running them
  #[arg(long)]
  dry_run: bool,

  /// Enable debug logging
  #[arg(long)]
  debug: bool,

  /// Command to run in the container instead of a recipe
  #[arg(last = true, value_name = "CMD")]
  command: Vec<String>,
}

fn distro_help() -> String {
  format!(
    "Distro alias or base image reference.\n\nKnown distros: {}. Any other value is used as the base image as-is.",
    known_short_names().collect::<Vec<_>>().join(", ")
  )
}

fn recipe_help() -> String {
  format!(
    "Recipe to run in the container.\n\nOne of: {}. Defaults to `build` when no command is given after `--`.",
    Recipe::names()
  )
}

impl Cli {
  fn into_run_args(self) -> RunArgs {
    RunArgs {
      options: ctrbuild_lib::OrchestrationOptions {
        distro: Some(self.distro),
        tag: self.tag,
        image_name: Some(self.name),
        dnf_cache: self.dnf_cache,
        build_dir: Some(self.build_dir),
        homedir: Some(self.homedir),
        containerfile: Some(self.containerfile),
        containerdir: self.containerdir,
        container_engine: self.container_engine,
        image_sources: self.image_sources,
        extra_args: self.extra,
        recipe: self.recipe,
        command: self.command,
        keep_container: self.keep_container,
        rpm_no_match_sha: self.rpm_no_match_sha,
        no_run: self.no_build,
        no_image_build: self.no_container_build,
      },
      cwd: self.cwd,
      dry_run: self.dry_run,
    }
  }
}

fn main() -> ExitCode {
  let cli = Cli::parse();

  let filter = EnvFilter::try_from_default_env()
    .unwrap_or_else(|_| EnvFilter::new(if cli.debug { "debug" } else { "info" }));
  tracing_subscriber::fmt()
    .with_env_filter(filter)
    .with_writer(std::io::stderr)
    .without_time()
    .init();

  let code = match cmd::cmd_run(cli.into_run_args()) {
    Ok(0) => 0,
    Ok(code) => {
      output::print_warning(&format!("Container exited with status {}", code));
      code
    }
    Err(err) => {
      output::print_error(&format!("{:#}", err));
      err
        .downcast_ref::<OrchestrateError>()
        .map_or(FAILURE_EXIT_CODE, OrchestrateError::exit_code)
    }
  };

  ExitCode::from(u8::try_from(code).unwrap_or(FAILURE_EXIT_CODE as u8))
}
