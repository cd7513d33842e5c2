//! # Environment Tests
//!
//! Verifies the precedence of overrides, environment variables and defaults,
//! and the variables exported to subprocesses.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rstest::rstest;
use xsrun_core::env::{HomeOverrides, HomePaths, normalize_path};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect();
    move |name: &str| vars.get(name).cloned()
}

const CWD: &str = "/nonexistent/work/xs";

#[test]
fn test_defaults_are_siblings_of_noop_home() {
    let homes = HomePaths::resolve_with(&HomeOverrides::default(), lookup(&[]), Path::new(CWD));
    assert_eq!(homes.noop_home, PathBuf::from(CWD));
    assert_eq!(homes.nemu_home, PathBuf::from("/nonexistent/work/NEMU"));
    assert_eq!(homes.am_home, PathBuf::from("/nonexistent/work/nexus-am"));
    assert_eq!(homes.dramsim3_home, PathBuf::from("/nonexistent/work/DRAMsim3"));
    assert_eq!(homes.rvtest_home, PathBuf::from("/nonexistent/work/riscv-tests"));
    assert_eq!(homes.wave_home, PathBuf::from("/nonexistent/work/xs/build"));
    assert!(!homes.has_custom_wave_home());
}

#[test]
fn test_environment_variables_beat_defaults() {
    let homes = HomePaths::resolve_with(
        &HomeOverrides::default(),
        lookup(&[("NOOP_HOME", "/nonexistent/rtl"), ("NEMU_HOME", "ref/nemu")]),
        Path::new(CWD),
    );
    assert_eq!(homes.noop_home, PathBuf::from("/nonexistent/rtl"));
    assert_eq!(homes.nemu_home, PathBuf::from("/nonexistent/work/xs/ref/nemu"));
    assert_eq!(homes.am_home, PathBuf::from("/nonexistent/nexus-am"));
}

#[test]
fn test_overrides_beat_environment() {
    let overrides = HomeOverrides {
        nemu: Some(PathBuf::from("/nonexistent/mine/NEMU")),
        wave_dump: Some(PathBuf::from("../waves")),
        ..HomeOverrides::default()
    };
    let homes = HomePaths::resolve_with(
        &overrides,
        lookup(&[("NEMU_HOME", "/nonexistent/theirs/NEMU")]),
        Path::new(CWD),
    );
    assert_eq!(homes.nemu_home, PathBuf::from("/nonexistent/mine/NEMU"));
    assert_eq!(homes.wave_home, PathBuf::from("/nonexistent/work/waves"));
    assert!(homes.has_custom_wave_home());
}

#[test]
fn test_exported_environment() {
    let homes = HomePaths::resolve_with(&HomeOverrides::default(), lookup(&[]), Path::new(CWD));
    let env = homes.environment();
    let names: Vec<&str> = env.keys().map(String::as_str).collect();
    assert_eq!(
        names,
        vec!["AM_HOME", "DRAMSIM3_HOME", "MODULEPATH", "NEMU_HOME", "NOOP_HOME", "WAVE_HOME"]
    );
    assert_eq!(env["NOOP_HOME"], CWD);
    assert_eq!(
        env["MODULEPATH"],
        "/usr/share/Modules/modulefiles:/etc/modulefiles"
    );

    let vars = homes.path_variables();
    assert_eq!(vars["RVTEST_HOME"], "/nonexistent/work/riscv-tests");
    assert_eq!(vars.len(), env.len() + 1);
}

#[rstest]
#[case("a/./b/../c", "/nonexistent/base/a/c")]
#[case("/nonexistent/x/../y", "/nonexistent/y")]
#[case("..", "/nonexistent")]
#[case(".", "/nonexistent/base")]
fn test_normalize_path_lexically(#[case] input: &str, #[case] expected: &str) {
    assert_eq!(
        normalize_path(Path::new(input), Path::new("/nonexistent/base")),
        PathBuf::from(expected)
    );
}

#[test]
fn test_normalize_existing_path_canonicalizes() {
    let dir = tempfile::TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("sub")).unwrap();
    let normalized = normalize_path(Path::new("sub/.."), dir.path());
    assert_eq!(normalized, dir.path().canonicalize().unwrap());
}
