//! Distro alias normalization.
//!
//! Known distros are described by a lookup table; any alias that does not match
//! a table entry is treated as a literal base image reference.

use std::fmt;

/// Short name assigned to aliases that are not in the table.
pub const CUSTOM_SHORT_NAME: &str = "custom";

/// Canonical description of a target distribution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DistroSpec {
  /// Stable short name, used in image tags and cache directory names.
  pub short_name: String,
  /// Base image the build container is derived from.
  pub image_ref: String,
  /// Whether the base image installs packages with dnf.
  pub uses_dnf: bool,
}

impl DistroSpec {
  pub fn is_custom(&self) -> bool {
    self.short_name == CUSTOM_SHORT_NAME
  }
}

impl fmt::Display for DistroSpec {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{} ({})", self.short_name, self.image_ref)
  }
}

struct KnownDistro {
  aliases: &'static [&'static str],
  short_name: &'static str,
  image_ref: &'static str,
  uses_dnf: bool,
}

const KNOWN_DISTROS: &[KnownDistro] = &[
  KnownDistro {
    aliases: &["centos8", "centos-stream8", "centos-8", "el8"],
    short_name: "centos8",
    image_ref: "quay.io/centos/centos:stream8",
    uses_dnf: true,
  },
  KnownDistro {
    aliases: &["centos9", "centos-stream9", "centos-9", "el9"],
    short_name: "centos9",
    image_ref: "quay.io/centos/centos:stream9",
    uses_dnf: true,
  },
  KnownDistro {
    aliases: &["ubuntu22.04", "ubuntu-22.04", "jammy", "ubuntu-jammy"],
    short_name: "ubuntu22.04",
    image_ref: "docker.io/ubuntu:22.04",
    uses_dnf: false,
  },
];

/// Map a distro alias to its [`DistroSpec`].
///
/// Never fails: an unknown alias yields a `custom` spec whose image reference is
/// the alias itself.
pub fn normalize(alias: &str) -> DistroSpec {
  match KNOWN_DISTROS.iter().find(|d| d.aliases.contains(&alias)) {
    Some(known) => DistroSpec {
      short_name: known.short_name.to_string(),
      image_ref: known.image_ref.to_string(),
      uses_dnf: known.uses_dnf,
    },
    None => DistroSpec {
      short_name: CUSTOM_SHORT_NAME.to_string(),
      image_ref: alias.to_string(),
      uses_dnf: true,
    },
  }
}

/// Short names of every distro in the table.
pub fn known_short_names() -> impl Iterator<Item = &'static str> {
  KNOWN_DISTROS.iter().map(|d| d.short_name)
}
