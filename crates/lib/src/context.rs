//! Host state captured once per invocation.
//!
//! Everything the orchestration needs to know about the invoking host (source
//! tree location, home directory, branch, user) is read here and then passed
//! explicitly, so the rest of the crate never consults the process
//! environment.

use std::env;
use std::path::{Path, PathBuf};

use crate::consts::{BRANCH_ENV, CCACHE_DIR_NAME};
use crate::error::{OrchestrateError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostContext {
  /// Root of the source tree that gets mounted into the container.
  pub source_dir: PathBuf,
  /// `$HOME`, when set.
  pub home_dir: Option<PathBuf>,
  /// Current branch, used to derive the default image tag.
  pub branch: Option<String>,
  /// Whether the invoking user is root.
  pub is_root: bool,
}

impl HostContext {
  /// Capture the host state.
  ///
  /// `cwd` selects the source tree; the current directory is used otherwise.
  /// The branch is only taken from `CEPH_BRANCH` here; the git fallback is
  /// [`crate::git::GitRevisions`], consulted during config resolution.
  pub fn detect(cwd: Option<&Path>) -> Result<Self> {
    let source_dir = match cwd {
      Some(dir) => dir.to_path_buf(),
      None => env::current_dir().map_err(|e| OrchestrateError::io("failed to read", ".", e))?,
    };
    let source_dir =
      dunce::canonicalize(&source_dir).map_err(|e| OrchestrateError::io("failed to resolve", &source_dir, e))?;

    let home_dir = env::var_os("HOME").filter(|h| !h.is_empty()).map(PathBuf::from);
    let branch = env::var(BRANCH_ENV).ok().and_then(|b| sanitize_branch(&b));

    Ok(Self {
      source_dir,
      home_dir,
      branch,
      is_root: is_root(),
    })
  }

  /// Host ccache directory (`$HOME/.ccache`), when it exists.
  pub fn ccache_dir(&self) -> Option<PathBuf> {
    let dir = self.home_dir.as_ref()?.join(CCACHE_DIR_NAME);
    dir.is_dir().then_some(dir)
  }
}

/// Normalize a branch name for use in an image tag.
///
/// Slashes become dashes. Empty names and a detached `HEAD` are not branches.
pub fn sanitize_branch(raw: &str) -> Option<String> {
  let branch = raw.trim();
  if branch.is_empty() || branch == "HEAD" {
    return None;
  }
  Some(branch.replace('/', "-"))
}

#[cfg(unix)]
fn is_root() -> bool {
  rustix::process::getuid().is_root()
}

#[cfg(not(unix))]
fn is_root() -> bool {
  false
}
