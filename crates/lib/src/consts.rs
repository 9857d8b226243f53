//! Defaults and fixed in-container locations.

/// Distro alias used when `--distro` is not given.
pub const DEFAULT_DISTRO: &str = "centos8";

/// Image repository used when `--name` is not given.
pub const DEFAULT_IMAGE_NAME: &str = "ceph-build";

/// Build directory, relative to the source root.
pub const DEFAULT_BUILD_DIR: &str = "build";

/// Where the source tree is mounted inside the container.
pub const DEFAULT_HOMEDIR: &str = "/build";

pub const DEFAULT_CONTAINERFILE: &str = "Dockerfile.build";

pub const DEFAULT_CONTAINERDIR: &str = ".";

/// Overrides the git-derived branch name used in the default image tag.
pub const BRANCH_ENV: &str = "CEPH_BRANCH";

/// Host ccache directory name, relative to `$HOME`.
pub const CCACHE_DIR_NAME: &str = ".ccache";

pub const CONTAINER_CCACHE_DIR: &str = "/root/.ccache";

pub const CONTAINER_DNF_LIB_DIR: &str = "/var/lib/dnf";

pub const CONTAINER_DNF_CACHE_DIR: &str = "/var/cache/dnf";

/// Marker file written into a prepared package-cache directory.
pub const DNF_CACHE_MARKER: &str = ".DNF_CACHE";
