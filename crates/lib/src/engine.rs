//! Container engine discovery.

use std::fmt;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{OrchestrateError, Result};

/// Supported container engines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Engine {
  Podman,
  Docker,
}

impl Engine {
  /// Probe order: the first engine present on the host wins.
  pub const PRIORITY: [Engine; 2] = [Engine::Podman, Engine::Docker];

  /// Binary name looked up on `PATH`.
  pub fn binary(&self) -> &'static str {
    match self {
      Self::Podman => "podman",
      Self::Docker => "docker",
    }
  }
}

impl fmt::Display for Engine {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.binary())
  }
}

/// A resolved engine together with the program that will be executed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineChoice {
  pub engine: Engine,
  pub program: PathBuf,
}

impl EngineChoice {
  pub fn new(engine: Engine, program: impl Into<PathBuf>) -> Self {
    Self {
      engine,
      program: program.into(),
    }
  }

  /// Interpret a user-supplied engine name or path.
  ///
  /// The kind is inferred from the file name, so `/usr/local/bin/podman-remote`
  /// is podman and `docker` is docker.
  pub fn from_override(value: &str) -> Result<Self> {
    let file_name = Path::new(value)
      .file_name()
      .and_then(|n| n.to_str())
      .unwrap_or_default();

    let engine = Engine::PRIORITY
      .into_iter()
      .find(|e| file_name.starts_with(e.binary()))
      .ok_or_else(|| OrchestrateError::UnsupportedEngine(value.to_string()))?;

    Ok(Self::new(engine, value))
  }

  /// The program as an argv element.
  pub fn program_arg(&self) -> String {
    self.program.display().to_string()
  }
}

/// Locate `binary` on `PATH`.
pub fn find_on_path(binary: &str) -> Option<PathBuf> {
  which::which(binary).ok()
}

/// Resolve the container engine by searching `PATH`.
pub fn resolve_engine() -> Result<EngineChoice> {
  resolve_engine_with(find_on_path)
}

/// Resolve the container engine using `probe` to locate binaries.
///
/// `probe` receives a binary name and returns its path when present. Candidates
/// are tried in [`Engine::PRIORITY`] order.
pub fn resolve_engine_with<F>(probe: F) -> Result<EngineChoice>
where
  F: Fn(&str) -> Option<PathBuf>,
{
  for engine in Engine::PRIORITY {
    if let Some(path) = probe(engine.binary()) {
      debug!(engine = %engine, path = %path.display(), "found container engine");
      return Ok(EngineChoice::new(engine, path));
    }
    debug!(engine = %engine, "container engine not found");
  }

  Err(OrchestrateError::NoEngineFound {
    searched: Engine::PRIORITY.map(|e| e.binary()).join(", "),
  })
}
