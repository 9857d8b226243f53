//! Integration tests for branch and commit lookups against a stand-in `git`.

use std::os::unix::fs::PermissionsExt;
use std::path::PathBuf;

use predicates::prelude::*;

use super::common::TestEnv;

/// Install a `git` that logs its arguments and answers `rev-parse` queries.
///
/// Returns the path of the call log, which only exists once `git` ran.
fn fake_git(env: &TestEnv, branch: &str, sha: &str) -> PathBuf {
  let log = env.temp.path().join("git.log");
  let script = format!(
    "#!/bin/sh\necho \"$*\" >> '{}'\ncase \"$*\" in\n  *--short*) echo {} ;;\n  *--abbrev-ref*) echo {} ;;\nesac\nexit 0\n",
    log.display(),
    sha,
    branch
  );
  let path = env.tools_path().join("git");
  std::fs::write(&path, script).unwrap();
  std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755)).unwrap();
  log
}

#[test]
fn unknown_recipe_never_runs_git() {
  let env = TestEnv::new();
  let log = fake_git(&env, "main", "abc1234");

  env
    .bwc_cmd()
    .env_remove("CEPH_BRANCH")
    .args(["--container-engine", "podman", "-r", "nope"])
    .assert()
    .code(2)
    .stderr(predicate::str::contains("unknown recipe 'nope'"));

  assert!(!log.exists(), "git ran before validation");
}

#[test]
fn recipe_with_command_never_runs_git() {
  let env = TestEnv::new();
  let log = fake_git(&env, "main", "abc1234");

  env
    .bwc_cmd()
    .env_remove("CEPH_BRANCH")
    .args(["--container-engine", "podman", "-r", "configure", "--", "make"])
    .assert()
    .code(2);

  assert!(!log.exists(), "git ran before validation");
}

#[test]
fn skipped_phases_need_neither_branch_nor_git() {
  let env = TestEnv::new();
  let log = fake_git(&env, "main", "abc1234");

  env
    .bwc_cmd()
    .env_remove("CEPH_BRANCH")
    .args(["--no-build", "--no-container-build"])
    .assert()
    .success()
    .stdout(predicate::str::is_empty());

  assert!(!log.exists(), "git ran with both phases skipped");
}

#[test]
fn checkout_branch_names_the_image() {
  let env = TestEnv::new();
  let log = fake_git(&env, "wip/feature-x", "abc1234");

  env
    .bwc_cmd()
    .env_remove("CEPH_BRANCH")
    .args(["--container-engine", "podman", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("ceph-build:wip-feature-x.centos8"));

  let calls = std::fs::read_to_string(&log).unwrap();
  assert_eq!(calls.lines().collect::<Vec<_>>(), ["rev-parse --abbrev-ref HEAD"]);
}

#[test]
fn env_branch_skips_git() {
  let env = TestEnv::new();
  let log = fake_git(&env, "other", "abc1234");

  env
    .bwc_cmd()
    .args(["--container-engine", "podman", "--dry-run"])
    .assert()
    .success()
    .stdout(predicate::str::contains("ceph-build:main.centos8"));

  assert!(!log.exists());
}

#[test]
fn rpmbuild_selects_source_rpm_of_checkout() {
  let env = TestEnv::new();
  fake_git(&env, "main", "abc1234");

  env
    .bwc_cmd()
    .args(["--container-engine", "podman", "--dry-run", "--no-container-build", "-r", "rpmbuild"])
    .assert()
    .success()
    .stdout(predicate::str::contains("ceph*.gabc1234.*.src.rpm"));
}

#[test]
fn rpm_no_match_sha_accepts_any_source_rpm() {
  let env = TestEnv::new();
  let log = fake_git(&env, "main", "abc1234");

  env
    .bwc_cmd()
    .args([
      "--container-engine",
      "podman",
      "--dry-run",
      "--no-container-build",
      "-r",
      "rpmbuild",
      "--rpm-no-match-sha",
    ])
    .assert()
    .success()
    .stdout(predicate::str::contains("set -- ceph*.src.rpm"))
    .stdout(predicate::str::contains("gabc1234").not());

  assert!(!log.exists());
}
