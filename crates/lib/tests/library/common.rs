//! Shared helpers for library integration tests.

use std::path::PathBuf;

use ctrbuild_lib::{HostContext, OrchestrationConfig, OrchestrationOptions, Result};

/// A host with a fixed source tree and branch, running as a regular user.
pub fn host(branch: Option<&str>) -> HostContext {
  HostContext {
    source_dir: PathBuf::from("/work/ceph"),
    home_dir: None,
    branch: branch.map(str::to_string),
    is_root: false,
  }
}

pub fn resolve(options: OrchestrationOptions) -> Result<OrchestrationConfig> {
  OrchestrationConfig::resolve(options, &host(Some("main")))
}

/// Probe reporting both engines as installed.
pub fn both_engines(binary: &str) -> Option<PathBuf> {
  Some(PathBuf::from("/usr/bin").join(binary))
}

pub fn args(words: &[&str]) -> Vec<String> {
  words.iter().map(|w| w.to_string()).collect()
}
