//! # Configuration Tests
//!
//! Covers emulator option defaults, the Spike switch, JSON defaults and the
//! human-readable configuration dump.

use std::time::Duration;

use pretty_assertions::assert_eq;
use xsrun_core::RunnerConfig;
use xsrun_core::config::{EmuOptions, RunPolicy};

use crate::common::harness::Project;

#[test]
fn test_emu_defaults() {
    let emu = EmuOptions::default();
    assert_eq!(emu.diff, "./ready-to-run/riscv64-nemu-interpreter-so");
    assert!(emu.seed <= 9999);
    assert!(emu.fork && emu.difftest && emu.dump_db);
    assert_eq!(emu.max_instr, None);
    assert!(emu.extra_args.is_empty());
}

#[test]
fn test_random_seed_range() {
    for _ in 0..1000 {
        assert!(EmuOptions::random_seed() <= 9999);
    }
}

#[test]
fn test_spike_replaces_nemu_reference() {
    let emu = EmuOptions::default().with_spike();
    assert_eq!(emu.diff, "./ready-to-run/riscv64-spike-so");
}

#[test]
fn test_spike_keeps_custom_reference() {
    let emu = EmuOptions {
        diff: "/opt/ref/custom-so".to_string(),
        ..EmuOptions::default()
    }
    .with_spike();
    assert_eq!(emu.diff, "/opt/ref/custom-so");
}

#[test]
fn test_run_policy_defaults_and_durations() {
    let policy = RunPolicy::default();
    assert!(!policy.numa);
    assert_eq!(policy.threads, 1);
    assert_eq!(policy.timeout(), None);

    let policy = RunPolicy {
        timeout_secs: Some(90),
        numa_max_wait_secs: Some(5),
        ..RunPolicy::default()
    };
    assert_eq!(policy.timeout(), Some(Duration::from_secs(90)));
    assert_eq!(policy.numa_max_wait(), Some(Duration::from_secs(5)));
}

#[test]
fn test_json_fills_missing_sections() {
    let project = Project::new();
    let homes = serde_json::to_value(&project.config.homes).unwrap();
    let json = serde_json::json!({
        "homes": homes,
        "emu": { "seed": 3, "difftest": false },
        "run": { "numa": true }
    });
    let config: RunnerConfig = serde_json::from_value(json).unwrap();
    assert_eq!(config.homes, project.config.homes);
    assert_eq!(config.emu.seed, 3);
    assert!(!config.emu.difftest);
    assert!(config.emu.fork);
    assert_eq!(config.emu.diff, "./ready-to-run/riscv64-nemu-interpreter-so");
    assert!(config.run.numa);
    assert_eq!(config.run.threads, 1);
}

#[test]
fn test_config_json_round_trip() {
    let project = Project::new();
    let text = serde_json::to_string(&project.config).unwrap();
    let back: RunnerConfig = serde_json::from_str(&text).unwrap();
    assert_eq!(back, project.config);
}

#[test]
fn test_display_lists_environment_and_arguments() {
    let mut project = Project::new();
    project.config.run.timeout_secs = Some(60);
    let text = project.config.to_string();
    assert!(text.starts_with("Extra environment variables:\n"));
    assert!(text.contains(&format!(
        "NOOP_HOME: {}",
        project.config.homes.noop_home.display()
    )));
    assert!(text.contains("MODULEPATH: "));
    assert!(text.contains("emu arguments:\n--diff ./ready-to-run/riscv64-nemu-interpreter-so --seed 42"));
    assert!(text.contains("timeout: 60s"));
}
