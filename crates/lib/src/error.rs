//! Error types for ctrbuild-lib

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Exit status for usage, validation and environment errors.
pub const USAGE_EXIT_CODE: i32 = 2;

/// Exit status for host failures that are not the engine's fault.
pub const FAILURE_EXIT_CODE: i32 = 1;

/// Errors that can occur while resolving or executing an orchestration.
#[derive(Debug, Error)]
pub enum OrchestrateError {
  /// The recipe name is not in the recipe table.
  #[error("unknown recipe '{name}' (known recipes: {known})")]
  UnknownRecipe { name: String, known: String },

  /// Both a recipe and a raw trailing command were supplied.
  #[error("a recipe ('{recipe}') cannot be combined with an explicit command after `--`")]
  RecipeWithCommand { recipe: String },

  /// `--container-engine` named something that is neither podman nor docker.
  #[error("unsupported container engine '{0}' (expected podman or docker)")]
  UnsupportedEngine(String),

  /// `--image-sources` named something other than cache, pull or build.
  #[error("unknown image source '{name}' (expected one of: {known})")]
  UnknownImageSource { name: String, known: String },

  /// No supported container engine binary was found on the host.
  #[error("no container engine found (looked for: {searched})")]
  NoEngineFound { searched: String },

  /// No `--tag` was given and the current branch could not be determined.
  #[error("cannot derive an image tag: no branch detected (set --tag or {env})")]
  TagUnavailable { env: &'static str },

  /// None of the allowed image sources produced the image.
  #[error("container image {image} is not available from the allowed sources ({sources})")]
  ImageUnavailable { image: String, sources: String },

  /// The image build exited non-zero.
  #[error("container image build failed with exit code {code}")]
  ImageBuildFailed { code: i32 },

  /// The engine binary could not be started at all.
  #[error("failed to execute {program}: {source}")]
  Spawn {
    program: String,
    #[source]
    source: io::Error,
  },

  /// Host-side filesystem failure (cache preparation, cwd lookup).
  #[error("{context} {}: {source}", .path.display())]
  Io {
    context: &'static str,
    path: PathBuf,
    #[source]
    source: io::Error,
  },
}

impl OrchestrateError {
  /// The process exit status this error should produce.
  pub fn exit_code(&self) -> i32 {
    match self {
      Self::UnknownRecipe { .. }
      | Self::RecipeWithCommand { .. }
      | Self::UnsupportedEngine(_)
      | Self::UnknownImageSource { .. }
      | Self::NoEngineFound { .. }
      | Self::TagUnavailable { .. } => USAGE_EXIT_CODE,
      Self::ImageBuildFailed { code } => *code,
      Self::ImageUnavailable { .. } | Self::Spawn { .. } | Self::Io { .. } => FAILURE_EXIT_CODE,
    }
  }

  pub(crate) fn io(context: &'static str, path: impl Into<PathBuf>, source: io::Error) -> Self {
    Self::Io {
      context,
      path: path.into(),
      source,
    }
  }
}

pub type Result<T, E = OrchestrateError> = std::result::Result<T, E>;
