//! Build-container image construction.

use std::fmt;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::str::FromStr;

use tracing::info;

use crate::config::OrchestrationConfig;
use crate::consts::{CONTAINER_CCACHE_DIR, CONTAINER_DNF_CACHE_DIR, CONTAINER_DNF_LIB_DIR, DNF_CACHE_MARKER};
use crate::engine::EngineChoice;
use crate::error::{OrchestrateError, Result};
use crate::execute::process::ProcessRunner;
use crate::recipe::CommandLine;

/// Where the build-container image may come from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageSource {
  /// An image with the same reference already present in local storage.
  Cache,
  /// The image pulled from a registry.
  Pull,
  /// The image built from the containerfile.
  Build,
}

impl ImageSource {
  /// Order in which sources are tried.
  pub const ALL: [ImageSource; 3] = [ImageSource::Cache, ImageSource::Pull, ImageSource::Build];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Cache => "cache",
      Self::Pull => "pull",
      Self::Build => "build",
    }
  }
}

impl fmt::Display for ImageSource {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for ImageSource {
  type Err = OrchestrateError;

  fn from_str(s: &str) -> Result<Self> {
    Self::ALL
      .into_iter()
      .find(|src| src.as_str() == s)
      .ok_or_else(|| OrchestrateError::UnknownImageSource {
        name: s.to_string(),
        known: Self::ALL.map(|src| src.as_str()).join(", "),
      })
  }
}

/// The set of allowed image sources.
///
/// Sources are always tried in [`ImageSource::ALL`] order, whatever order
/// they were given in. The default allows building only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageSources {
  pub cache: bool,
  pub pull: bool,
  pub build: bool,
}

impl Default for ImageSources {
  fn default() -> Self {
    Self {
      cache: false,
      pull: false,
      build: true,
    }
  }
}

impl ImageSources {
  /// Parse source names; each value may itself be a comma separated list.
  ///
  /// No values at all yields the default.
  pub fn parse<S: AsRef<str>>(values: &[S]) -> Result<Self> {
    let mut names = values
      .iter()
      .flat_map(|v| v.as_ref().split(','))
      .map(str::trim)
      .filter(|n| !n.is_empty())
      .peekable();
    if names.peek().is_none() {
      return Ok(Self::default());
    }

    let mut sources = Self {
      cache: false,
      pull: false,
      build: false,
    };
    for name in names {
      match name.parse::<ImageSource>()? {
        ImageSource::Cache => sources.cache = true,
        ImageSource::Pull => sources.pull = true,
        ImageSource::Build => sources.build = true,
      }
    }
    Ok(sources)
  }

  pub fn allows(&self, source: ImageSource) -> bool {
    match source {
      ImageSource::Cache => self.cache,
      ImageSource::Pull => self.pull,
      ImageSource::Build => self.build,
    }
  }
}

impl fmt::Display for ImageSources {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let names: Vec<_> = ImageSource::ALL
      .into_iter()
      .filter(|src| self.allows(*src))
      .map(|src| src.as_str())
      .collect();
    write!(f, "{}", names.join(", "))
  }
}

/// Compose the local image lookup.
pub fn inspect_image_command(engine: &EngineChoice, config: &OrchestrationConfig) -> CommandLine {
  vec![
    engine.program_arg(),
    "image".to_string(),
    "inspect".to_string(),
    config.image_ref(),
  ]
}

/// Compose the registry pull.
pub fn pull_image_command(engine: &EngineChoice, config: &OrchestrationConfig) -> CommandLine {
  vec![engine.program_arg(), "pull".to_string(), config.image_ref()]
}

/// Compose the image build invocation.
///
/// A package-cache directory adds both its volume mounts and `CLEAN_DNF=no`;
/// without one neither appears.
pub fn build_image_command(engine: &EngineChoice, config: &OrchestrationConfig) -> CommandLine {
  let mut cmd = vec![
    engine.program_arg(),
    "build".to_string(),
    "-t".to_string(),
    config.image_ref(),
    format!("--build-arg=JENKINS_HOME={}", config.homedir),
    format!("--build-arg=DISTRO={}", config.distro.image_ref),
  ];

  if let Some(dir) = &config.dnf_cache_dir {
    cmd.push(format!(
      "--volume={}:{}:Z",
      dir.join("lib").display(),
      CONTAINER_DNF_LIB_DIR
    ));
    cmd.push(format!("--volume={}:{}:Z", dir.display(), CONTAINER_DNF_CACHE_DIR));
    cmd.push("--build-arg=CLEAN_DNF=no".to_string());
  }

  if let Some(dir) = &config.ccache_dir {
    cmd.push(format!("--volume={}:{}:Z", dir.display(), CONTAINER_CCACHE_DIR));
  }

  cmd.push(format!(
    "--volume={}:{}:Z",
    config.source_dir.display(),
    config.homedir
  ));
  cmd.push("-f".to_string());
  cmd.push(config.containerfile.display().to_string());
  cmd.push(config.containerdir.display().to_string());
  cmd
}

/// Create the package-cache layout expected by the mounts.
pub fn prepare_dnf_cache(dir: &Path) -> Result<()> {
  for sub in ["lib", "cache"] {
    let path = dir.join(sub);
    fs::create_dir_all(&path).map_err(|e| OrchestrateError::io("failed to create", &path, e))?;
  }

  let marker = dir.join(DNF_CACHE_MARKER);
  OpenOptions::new()
    .create(true)
    .append(true)
    .open(&marker)
    .map_err(|e| OrchestrateError::io("failed to create", &marker, e))?;
  Ok(())
}

/// Build and tag the build-container image.
pub fn build_image<R: ProcessRunner + ?Sized>(
  engine: &EngineChoice,
  config: &OrchestrationConfig,
  runner: &mut R,
) -> Result<()> {
  if let Some(dir) = &config.dnf_cache_dir {
    prepare_dnf_cache(dir)?;
  }

  info!(image = %config.image_ref(), base = %config.distro.image_ref, "building container image");
  match runner.run(&build_image_command(engine, config))? {
    0 => Ok(()),
    code => Err(OrchestrateError::ImageBuildFailed { code }),
  }
}

/// Make the build-container image available from the first allowed source.
///
/// Tries the local image store, then a registry pull, then a build. Lookups
/// and pulls run with their output discarded; a failing lookup or pull moves
/// on to the next source, a failing build is fatal.
pub fn acquire_image<R: ProcessRunner + ?Sized>(
  engine: &EngineChoice,
  config: &OrchestrationConfig,
  runner: &mut R,
) -> Result<()> {
  let image = config.image_ref();
  let sources = config.image_sources;

  if sources.cache {
    if runner.run_quiet(&inspect_image_command(engine, config))? == 0 {
      info!(image = %image, "container image present");
      return Ok(());
    }
    info!(image = %image, "container image not present");
  }

  if sources.pull {
    if runner.run_quiet(&pull_image_command(engine, config))? == 0 {
      info!(image = %image, "container image pulled");
      return Ok(());
    }
    info!(image = %image, "container image could not be pulled");
  }

  if sources.build {
    return build_image(engine, config, runner);
  }

  Err(OrchestrateError::ImageUnavailable {
    image,
    sources: sources.to_string(),
  })
}
