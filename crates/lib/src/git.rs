//! Revision facts read from the source checkout.
//!
//! Learning the branch or commit costs a `git` process, so resolution asks a
//! [`RevisionSource`] only once every usage check has passed and only for the
//! facts the enabled phases actually need.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::context::sanitize_branch;

/// Supplies source-control facts on demand.
pub trait RevisionSource {
  /// Current branch, already sanitized for use in an image tag.
  fn branch(&self) -> Option<String>;

  /// Abbreviated commit id of `HEAD`.
  fn short_sha(&self) -> Option<String>;
}

/// A source that knows nothing; used when no checkout should be consulted.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoRevisions;

impl RevisionSource for NoRevisions {
  fn branch(&self) -> Option<String> {
    None
  }

  fn short_sha(&self) -> Option<String> {
    None
  }
}

/// Asks `git` in the source checkout.
#[derive(Debug, Clone)]
pub struct GitRevisions {
  repo_dir: PathBuf,
}

impl GitRevisions {
  pub fn new(repo_dir: impl Into<PathBuf>) -> Self {
    Self {
      repo_dir: repo_dir.into(),
    }
  }
}

impl RevisionSource for GitRevisions {
  fn branch(&self) -> Option<String> {
    rev_parse(&self.repo_dir, &["--abbrev-ref", "HEAD"]).and_then(|b| sanitize_branch(&b))
  }

  fn short_sha(&self) -> Option<String> {
    rev_parse(&self.repo_dir, &["--short", "HEAD"])
  }
}

/// Run `git rev-parse <args>` in `dir` and return its trimmed output.
fn rev_parse(dir: &Path, args: &[&str]) -> Option<String> {
  let output = Command::new("git")
    .arg("rev-parse")
    .args(args)
    .current_dir(dir)
    .output();

  match output {
    Ok(output) if output.status.success() => {
      let value = String::from_utf8_lossy(&output.stdout).trim().to_string();
      (!value.is_empty()).then_some(value)
    }
    Ok(output) => {
      debug!(?args, stderr = %String::from_utf8_lossy(&output.stderr).trim(), "git rev-parse failed");
      None
    }
    Err(e) => {
      debug!(error = %e, "git not available");
      None
    }
  }
}
