//! End-to-end orchestration through the public API with a recording runner.

use std::path::PathBuf;

use ctrbuild_lib::OrchestrateError;
use ctrbuild_lib::OrchestrationConfig;
use ctrbuild_lib::OrchestrationOptions;
use ctrbuild_lib::execute::execute;
use ctrbuild_lib::execute::process::RecordingRunner;

use super::common::{args, both_engines, host, resolve};

#[test]
fn default_invocation_builds_then_runs_with_podman() {
  let config = resolve(OrchestrationOptions::default()).unwrap();
  let mut runner = RecordingRunner::new();

  let code = execute(&config, both_engines, &mut runner).unwrap();

  assert_eq!(code, 0);
  assert_eq!(runner.calls.len(), 2);
  assert_eq!(runner.calls[0][..2], args(&["/usr/bin/podman", "build"]));
  assert_eq!(runner.calls[1][..2], args(&["/usr/bin/podman", "run"]));
}

#[test]
fn no_build_only_builds_the_image() {
  let config = resolve(OrchestrationOptions {
    no_run: true,
    ..Default::default()
  })
  .unwrap();
  let mut runner = RecordingRunner::new();

  execute(&config, both_engines, &mut runner).unwrap();

  assert_eq!(runner.calls_to("build").len(), 1);
  assert_eq!(runner.calls_to("run").len(), 0);
}

#[test]
fn no_container_build_only_runs() {
  let config = resolve(OrchestrationOptions {
    no_image_build: true,
    command: args(&["ls"]),
    ..Default::default()
  })
  .unwrap();
  let mut runner = RecordingRunner::new();

  execute(&config, both_engines, &mut runner).unwrap();

  assert_eq!(runner.calls_to("build").len(), 0);
  assert_eq!(runner.calls_to("run").len(), 1);
  assert_eq!(runner.calls[0].last().map(String::as_str), Some("ls"));
}

#[test]
fn skipping_both_phases_spawns_nothing() {
  let config = resolve(OrchestrationOptions {
    no_run: true,
    no_image_build: true,
    ..Default::default()
  })
  .unwrap();
  let mut runner = RecordingRunner::new();

  assert_eq!(execute(&config, |_| None, &mut runner).unwrap(), 0);
  assert!(runner.calls.is_empty());
}

#[test]
fn unknown_recipe_fails_before_any_engine_call() {
  let mut runner = RecordingRunner::new();

  let result = resolve(OrchestrationOptions {
    recipe: Some("ship-it".into()),
    ..Default::default()
  })
  .and_then(|config| execute(&config, both_engines, &mut runner));

  let err = result.unwrap_err();
  assert!(matches!(err, OrchestrateError::UnknownRecipe { .. }));
  assert_eq!(err.exit_code(), 2);
  assert!(runner.calls.is_empty());
}

#[test]
fn recipe_with_raw_command_is_rejected() {
  let err = resolve(OrchestrationOptions {
    recipe: Some("configure".into()),
    command: args(&["make", "-j8"]),
    ..Default::default()
  })
  .unwrap_err();

  assert!(matches!(err, OrchestrateError::RecipeWithCommand { .. }));
  assert_eq!(err.exit_code(), 2);
}

#[test]
fn failed_image_build_skips_run() {
  let config = resolve(OrchestrationOptions::default()).unwrap();
  let mut runner = RecordingRunner::with_exit_codes([1]);

  let err = execute(&config, both_engines, &mut runner).unwrap_err();

  assert!(matches!(err, OrchestrateError::ImageBuildFailed { code: 1 }));
  assert_eq!(runner.calls.len(), 1);
  assert!(runner.calls_to("run").is_empty());
}

#[test]
fn container_exit_status_is_returned_unchanged() {
  let config = resolve(OrchestrationOptions::default()).unwrap();
  let mut runner = RecordingRunner::with_exit_codes([0, 3]);

  assert_eq!(execute(&config, both_engines, &mut runner).unwrap(), 3);
}

#[test]
fn dnf_cache_toggles_build_arguments() {
  let temp = tempfile::TempDir::new().unwrap();
  let with_cache = resolve(OrchestrationOptions {
    dnf_cache: Some(temp.path().to_path_buf()),
    no_run: true,
    ..Default::default()
  })
  .unwrap();
  let without_cache = resolve(OrchestrationOptions {
    no_run: true,
    ..Default::default()
  })
  .unwrap();

  let mut runner = RecordingRunner::new();
  execute(&with_cache, both_engines, &mut runner).unwrap();
  execute(&without_cache, both_engines, &mut runner).unwrap();

  let cache_dir = temp.path().join("_ceph_centos8");
  let cached = &runner.calls[0];
  assert!(cached.contains(&format!("--volume={}:/var/lib/dnf:Z", cache_dir.join("lib").display())));
  assert!(cached.contains(&format!("--volume={}:/var/cache/dnf:Z", cache_dir.display())));
  assert!(cached.contains(&"--build-arg=CLEAN_DNF=no".to_string()));

  let plain = &runner.calls[1];
  assert!(!plain.iter().any(|a| a.contains("dnf") || a.contains("CLEAN_DNF")));
}

#[test]
fn tag_follows_branch_or_explicit_value() {
  let derived = OrchestrationConfig::resolve(OrchestrationOptions::default(), &host(Some("feature-x"))).unwrap();
  assert_eq!(derived.tag, "feature-x.centos8");

  let explicit = OrchestrationConfig::resolve(
    OrchestrationOptions {
      tag: Some("mytag".into()),
      ..Default::default()
    },
    &host(None),
  )
  .unwrap();
  assert_eq!(explicit.tag, "mytag");
  assert_eq!(explicit.image_ref(), "ceph-build:mytag");
}

#[test]
fn custom_distro_uses_alias_as_base_image() {
  let config = resolve(OrchestrationOptions {
    distro: Some("registry.example.com/ceph/base:latest".into()),
    no_run: true,
    ..Default::default()
  })
  .unwrap();
  assert_eq!(config.tag, "main.custom");

  let mut runner = RecordingRunner::new();
  execute(&config, both_engines, &mut runner).unwrap();
  assert!(runner.calls[0].contains(&"--build-arg=DISTRO=registry.example.com/ceph/base:latest".to_string()));
  assert_eq!(config.source_dir, PathBuf::from("/work/ceph"));
}

#[test]
fn skipped_phases_need_no_branch() {
  let config = OrchestrationConfig::resolve(
    OrchestrationOptions {
      no_run: true,
      no_image_build: true,
      ..Default::default()
    },
    &host(None),
  )
  .unwrap();
  let mut runner = RecordingRunner::new();

  assert_eq!(execute(&config, |_| None, &mut runner).unwrap(), 0);
  assert!(runner.calls.is_empty());
}

#[test]
fn pulled_image_is_run_without_building() {
  let config = resolve(OrchestrationOptions {
    image_sources: args(&["cache,pull,build"]),
    ..Default::default()
  })
  .unwrap();
  let mut runner = RecordingRunner::with_exit_codes([125, 0, 0]);

  assert_eq!(execute(&config, both_engines, &mut runner).unwrap(), 0);
  assert_eq!(runner.calls[0][1..3], args(&["image", "inspect"]));
  assert_eq!(runner.calls[1][1..], args(&["pull", "ceph-build:main.centos8"]));
  assert!(runner.calls_to("build").is_empty());
  assert_eq!(runner.calls_to("run").len(), 1);
}
