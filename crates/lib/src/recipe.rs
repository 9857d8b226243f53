//! Recipe translation.
//!
//! A recipe is a named build phase. Each recipe maps to exactly one
//! in-container command line through a fixed table; the table is not
//! extensible at runtime.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::error::OrchestrateError;
use crate::util::quote::quote;

/// An argv passed to the engine or to the container entrypoint.
pub type CommandLine = Vec<String>;

/// Compiler toolset activated when the image provides it.
const TOOLSET_ENABLE: &str = "/opt/rh/gcc-toolset-11/enable";

const RUN_MAKE: &str = "./src/script/run-make.sh";

const SRPM_GLOB: &str = "ceph*.src.rpm";

/// Known recipes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Recipe {
  Configure,
  Build,
  BuildTests,
  RunTests,
  MakeSrpm,
  Rpmbuild,
  Debs,
}

impl Recipe {
  pub const ALL: [Recipe; 7] = [
    Recipe::Configure,
    Recipe::Build,
    Recipe::BuildTests,
    Recipe::RunTests,
    Recipe::MakeSrpm,
    Recipe::Rpmbuild,
    Recipe::Debs,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      Self::Configure => "configure",
      Self::Build => "build",
      Self::BuildTests => "build-tests",
      Self::RunTests => "run-tests",
      Self::MakeSrpm => "make-srpm",
      Self::Rpmbuild => "rpmbuild",
      Self::Debs => "debs",
    }
  }

  /// Comma separated list of every recipe name.
  pub fn names() -> String {
    Self::ALL.map(|r| r.as_str()).join(", ")
  }

  /// The in-container command line for this recipe.
  pub fn command_line(&self, env: &RecipeEnv<'_>) -> CommandLine {
    let home = quote(env.homedir);
    let script = match self {
      Self::Configure => format!("cd {home} && source {RUN_MAKE} && has_build_dir || configure"),
      Self::Build => format!("cd {home} && source {RUN_MAKE} && build vstart"),
      Self::BuildTests => format!("cd {home} && source {RUN_MAKE} && build tests"),
      Self::RunTests => format!("cd {home} && source ./run-make-check.sh && build && run"),
      Self::MakeSrpm => format!("cd {home} && ./make-srpm.sh"),
      Self::Rpmbuild => {
        let srpm_glob = env.srpm_glob();
        let topdir = env.output_dir().join("rpmbuild").to_string_lossy().into_owned();
        let define = quote(&format!("_topdir {topdir}")).into_owned();
        let topdir = quote(&topdir).into_owned();
        format!(
          "cd {home} && set -- {srpm_glob} && \
           if [ ! -e \"$1\" ]; then ./make-srpm.sh && set -- {srpm_glob}; fi && \
           if [ \"$#\" -ne 1 ] || [ ! -e \"$1\" ]; then \
           echo 'expected exactly one source rpm matching {srpm_glob}' >&2; exit 1; fi && \
           mkdir -p {topdir} && rpmbuild --rebuild -D{define} \"$PWD/$1\""
        )
      }
      Self::Debs => {
        let outdir = quote(&env.output_dir().to_string_lossy()).into_owned();
        format!("mkdir -p {outdir} && cd {home} && ./make-debs.sh {outdir}")
      }
    };

    vec![
      "bash".to_string(),
      "-c".to_string(),
      format!("if [ -f {TOOLSET_ENABLE} ]; then source {TOOLSET_ENABLE}; fi; {script}"),
    ]
  }
}

impl fmt::Display for Recipe {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.as_str())
  }
}

impl FromStr for Recipe {
  type Err = OrchestrateError;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    Self::ALL
      .into_iter()
      .find(|r| r.as_str() == s)
      .ok_or_else(|| OrchestrateError::UnknownRecipe {
        name: s.to_string(),
        known: Self::names(),
      })
  }
}

/// In-container paths a recipe script refers to.
#[derive(Debug, Clone, Copy)]
pub struct RecipeEnv<'a> {
  /// Mount point of the source tree.
  pub homedir: &'a str,
  /// Build directory, relative to `homedir` unless absolute.
  pub build_dir: &'a str,
  /// Abbreviated commit the source rpm must have been made from, if any.
  pub srpm_sha: Option<&'a str>,
}

impl RecipeEnv<'_> {
  fn output_dir(&self) -> PathBuf {
    Path::new(self.homedir).join(self.build_dir)
  }

  fn srpm_glob(&self) -> String {
    match self.srpm_sha {
      Some(sha) => format!("ceph*.g{sha}.*.src.rpm"),
      None => SRPM_GLOB.to_string(),
    }
  }
}

/// Translate a recipe name into its in-container command line.
pub fn translate(name: &str, env: &RecipeEnv<'_>) -> Result<CommandLine, OrchestrateError> {
  Ok(name.parse::<Recipe>()?.command_line(env))
}
