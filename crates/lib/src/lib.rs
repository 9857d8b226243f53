//! ctrbuild-lib: build orchestration for containerized Ceph builds
//!
//! This crate holds the decision logic behind `build-with-container`:
//! - `engine`: finding podman or docker on the host
//! - `distro`: mapping distro aliases to base images
//! - `recipe`: mapping recipe names to in-container command lines
//! - `config`: resolving command-line options into an `OrchestrationConfig`
//! - `git`: branch and commit of the source checkout, asked for lazily
//! - `image` / `container`: composing the engine invocations
//! - `execute`: running the phases through a `ProcessRunner`

pub mod config;
pub mod consts;
pub mod container;
pub mod context;
pub mod distro;
pub mod engine;
pub mod error;
pub mod execute;
pub mod git;
pub mod image;
pub mod recipe;
pub mod util;

pub use config::{OrchestrationConfig, OrchestrationOptions};
pub use context::HostContext;
pub use error::{OrchestrateError, Result};
