//! Orchestration configuration.
//!
//! [`OrchestrationOptions`] holds the raw inputs as they come from the command
//! line. [`OrchestrationConfig::resolve`] applies defaults, normalizes the
//! distro, derives the tag, translates the recipe and validates flag
//! combinations. Every usage error surfaces here, before any external process
//! is started.

use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::consts::{
  BRANCH_ENV, DEFAULT_BUILD_DIR, DEFAULT_CONTAINERDIR, DEFAULT_CONTAINERFILE, DEFAULT_DISTRO, DEFAULT_HOMEDIR,
  DEFAULT_IMAGE_NAME,
};
use crate::context::HostContext;
use crate::distro::{DistroSpec, normalize};
use crate::engine::EngineChoice;
use crate::error::{OrchestrateError, Result};
use crate::git::{NoRevisions, RevisionSource};
use crate::image::ImageSources;
use crate::recipe::{CommandLine, Recipe, RecipeEnv};

/// Recipe executed when neither a recipe nor a raw command is supplied.
const DEFAULT_RECIPE: Recipe = Recipe::Build;

/// Raw orchestration inputs. `None` means "use the default".
#[derive(Debug, Clone, Default)]
pub struct OrchestrationOptions {
  pub distro: Option<String>,
  pub tag: Option<String>,
  pub image_name: Option<String>,
  pub dnf_cache: Option<PathBuf>,
  pub build_dir: Option<String>,
  pub homedir: Option<String>,
  pub containerfile: Option<PathBuf>,
  pub containerdir: Option<PathBuf>,
  pub container_engine: Option<String>,
  /// Allowed image sources, each possibly a comma separated list.
  pub image_sources: Vec<String>,
  pub extra_args: Vec<String>,
  pub recipe: Option<String>,
  pub command: Vec<String>,
  pub keep_container: bool,
  /// Build whatever source rpm is present instead of the one made from `HEAD`.
  pub rpm_no_match_sha: bool,
  /// Skip the container run phase.
  pub no_run: bool,
  /// Skip the image build phase.
  pub no_image_build: bool,
}

/// Fully resolved, immutable parameters for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrchestrationConfig {
  pub distro_alias: String,
  pub distro: DistroSpec,
  pub image_name: String,
  /// Empty only when neither phase runs.
  pub tag: String,
  pub build_dir: String,
  pub homedir: String,
  pub source_dir: PathBuf,
  /// Per-distro package cache directory on the host.
  pub dnf_cache_dir: Option<PathBuf>,
  /// Host compiler-object cache directory.
  pub ccache_dir: Option<PathBuf>,
  pub containerfile: PathBuf,
  pub containerdir: PathBuf,
  /// Engine chosen with `--container-engine`; probed on `PATH` otherwise.
  pub container_engine: Option<EngineChoice>,
  pub image_sources: ImageSources,
  pub extra_args: Vec<String>,
  pub recipe: Option<Recipe>,
  /// Entrypoint arguments for the run phase.
  pub command: CommandLine,
  pub keep_container: bool,
  /// Run the container as uid 0 (mapped to the invoking user by rootless engines).
  pub map_user: bool,
  pub build_image: bool,
  pub run_container: bool,
}

impl OrchestrationConfig {
  /// Resolve without consulting the source checkout; the branch comes from
  /// `ctx` alone.
  pub fn resolve(options: OrchestrationOptions, ctx: &HostContext) -> Result<Self> {
    Self::resolve_with(options, ctx, &NoRevisions)
  }

  /// Resolve, asking `revisions` for the facts `ctx` lacks.
  ///
  /// `revisions` is consulted only after every usage check has passed, and
  /// only for what the enabled phases need: the branch when a phase needs a
  /// derived tag, the commit when the run phase builds rpms.
  pub fn resolve_with<V: RevisionSource + ?Sized>(
    options: OrchestrationOptions,
    ctx: &HostContext,
    revisions: &V,
  ) -> Result<Self> {
    let run_container = !options.no_run;
    let build_image = !options.no_image_build;

    if let (Some(recipe), false) = (&options.recipe, options.command.is_empty()) {
      return Err(OrchestrateError::RecipeWithCommand { recipe: recipe.clone() });
    }

    let recipe = match (&options.recipe, options.command.is_empty()) {
      (Some(name), _) => Some(name.parse::<Recipe>()?),
      (None, true) if run_container => Some(DEFAULT_RECIPE),
      (None, _) => None,
    };
    let image_sources = ImageSources::parse(&options.image_sources)?;
    let container_engine = options
      .container_engine
      .as_deref()
      .map(EngineChoice::from_override)
      .transpose()?;

    let build_dir = options.build_dir.unwrap_or_else(|| DEFAULT_BUILD_DIR.to_string());
    let homedir = options.homedir.unwrap_or_else(|| DEFAULT_HOMEDIR.to_string());

    let distro_alias = options.distro.unwrap_or_else(|| DEFAULT_DISTRO.to_string());
    let distro = normalize(&distro_alias);
    debug!(alias = %distro_alias, distro = %distro, "normalized distro");

    let dnf_cache_dir = match options.dnf_cache {
      Some(dir) if distro.uses_dnf => Some(
        absolutize(&ctx.source_dir, &dir).join(format!("_ceph_{}", distro.short_name)),
      ),
      Some(dir) => {
        warn!(distro = %distro.short_name, dir = %dir.display(), "distro does not use dnf, ignoring package cache");
        None
      }
      None => None,
    };

    let tag = match options.tag.filter(|t| !t.is_empty()) {
      Some(tag) => tag,
      None if build_image || run_container => {
        let branch = ctx.branch.clone().or_else(|| revisions.branch());
        derive_tag(None, branch.as_deref(), &distro)?
      }
      None => {
        debug!("no phase enabled, image tag not derived");
        String::new()
      }
    };

    let srpm_sha = match recipe {
      Some(Recipe::Rpmbuild) if run_container && !options.rpm_no_match_sha => {
        let sha = revisions
          .short_sha()
          .filter(|sha| sha.chars().all(|c| c.is_ascii_hexdigit()));
        if sha.is_none() {
          warn!("commit of the source tree unknown, any source rpm will be built");
        }
        sha
      }
      _ => None,
    };

    let command = match recipe {
      Some(recipe) => recipe.command_line(&RecipeEnv {
        homedir: &homedir,
        build_dir: &build_dir,
        srpm_sha: srpm_sha.as_deref(),
      }),
      None => options.command,
    };

    let containerdir = options
      .containerdir
      .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTAINERDIR));

    Ok(Self {
      distro_alias,
      distro,
      image_name: options.image_name.unwrap_or_else(|| DEFAULT_IMAGE_NAME.to_string()),
      tag,
      build_dir,
      homedir,
      source_dir: ctx.source_dir.clone(),
      dnf_cache_dir,
      ccache_dir: ctx.ccache_dir(),
      containerfile: options
        .containerfile
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONTAINERFILE)),
      containerdir: absolutize(&ctx.source_dir, &containerdir),
      container_engine,
      image_sources,
      extra_args: options.extra_args,
      recipe,
      command,
      keep_container: options.keep_container,
      map_user: !ctx.is_root,
      build_image,
      run_container,
    })
  }

  /// Fully qualified image reference, `<name>:<tag>`.
  pub fn image_ref(&self) -> String {
    format!("{}:{}", self.image_name, self.tag)
  }

  /// Whether any phase will touch the container engine.
  pub fn needs_engine(&self) -> bool {
    self.build_image || self.run_container
  }
}

/// Derive the image tag: an explicit tag wins, otherwise `<branch>.<distro>`.
pub fn derive_tag(explicit: Option<String>, branch: Option<&str>, distro: &DistroSpec) -> Result<String> {
  if let Some(tag) = explicit.filter(|t| !t.is_empty()) {
    return Ok(tag);
  }
  match branch {
    Some(branch) if !branch.is_empty() => Ok(format!("{}.{}", branch, distro.short_name)),
    _ => Err(OrchestrateError::TagUnavailable { env: BRANCH_ENV }),
  }
}

fn absolutize(base: &Path, path: &Path) -> PathBuf {
  if path.is_absolute() {
    path.to_path_buf()
  } else {
    base.join(path)
  }
}
