//! # Workload Tests
//!
//! Discovery over temporary trees, suite file parsing and source resolution.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rstest::rstest;
use tempfile::{NamedTempFile, TempDir};
use xsrun_core::Error;
use xsrun_core::workload::suite::expand_vars;
use xsrun_core::workload::{Suite, SuiteFile, SuiteSource, find_files_with_suffix, list_dir_with_suffix};

use crate::common::harness::write_file;

fn tree() -> TempDir {
    let dir = TempDir::new().unwrap();
    for rel in [
        "isa/rv64ui-p-add.bin",
        "isa/rv64ui-p-sub.bin",
        "isa/rv64um-p-mul.bin",
        "isa/rv64uf-p-fadd.bin",
        "isa/rv64ui-p-add.dump",
        "ckpt/gcc/_100_0.1_.zstd",
        "ckpt/gcc/nested/_200_0.2_.gz",
        "ckpt/mcf/_300_0.3_.zstd",
        "ckpt/mcf/readme.txt",
    ] {
        write_file(&dir.path().join(rel), "");
    }
    std::fs::create_dir_all(dir.path().join("isa/sub.bin")).unwrap();
    dir
}

fn names(paths: &[PathBuf]) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
        .collect()
}

#[test]
fn test_find_files_recursively() {
    let dir = tree();
    let found = find_files_with_suffix(&dir.path().join("ckpt"), &[".zstd", ".gz"]);
    assert_eq!(names(&found), vec!["_100_0.1_.zstd", "_200_0.2_.gz", "_300_0.3_.zstd"]);
}

#[test]
fn test_find_files_missing_root_is_empty() {
    assert!(find_files_with_suffix(Path::new("/nonexistent/ckpt"), &[".gz"]).is_empty());
}

#[rstest]
#[case(&[], vec!["rv64uf-p-fadd.bin", "rv64ui-p-add.bin", "rv64ui-p-sub.bin", "rv64um-p-mul.bin"])]
#[case(&["rv64ui", "rv64um"], vec!["rv64ui-p-add.bin", "rv64ui-p-sub.bin", "rv64um-p-mul.bin"])]
#[case(&["rv32"], vec![])]
fn test_list_dir_with_prefixes(#[case] prefixes: &[&str], #[case] expected: Vec<&str>) {
    let dir = tree();
    let found = list_dir_with_suffix(&dir.path().join("isa"), ".bin", prefixes).unwrap();
    assert_eq!(names(&found), expected);
}

#[test]
fn test_list_missing_dir_is_error() {
    let err = list_dir_with_suffix::<&str>(Path::new("/nonexistent/isa"), ".bin", &[]).unwrap_err();
    assert!(matches!(err, Error::Io { .. }));
}

fn vars(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

#[rstest]
#[case("$RVTEST_HOME/isa/build", "/opt/riscv-tests/isa/build")]
#[case("${RVTEST_HOME}x/isa", "/opt/riscv-testsx/isa")]
#[case("$UNKNOWN/a", "$UNKNOWN/a")]
#[case("/plain/path", "/plain/path")]
#[case("$NOOP_HOME/$RVTEST_HOME", "/rtl//opt/riscv-tests")]
fn test_expand_vars(#[case] input: &str, #[case] expected: &str) {
    let vars = vars(&[("RVTEST_HOME", "/opt/riscv-tests"), ("NOOP_HOME", "/rtl/")]);
    assert_eq!(expand_vars(Path::new(input), &vars), PathBuf::from(expected));
}

#[test]
fn test_sources_resolve_in_order() {
    let dir = tree();
    let root = dir.path().display().to_string();
    let suite = Suite {
        sources: vec![
            SuiteSource::List {
                base: PathBuf::from("$ROOT/isa"),
                entries: vec![PathBuf::from("rv64ui-p-add.bin")],
            },
            SuiteSource::App {
                base: PathBuf::from("/apps"),
                bench: "coremark".to_string(),
            },
            SuiteSource::Directory {
                dir: PathBuf::from("$ROOT/isa"),
                suffix: ".bin".to_string(),
                prefixes: vec!["rv64um".to_string()],
            },
        ],
    };
    let workloads = suite
        .workloads(&vars(&[("ROOT", root.as_str())]), &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(
        workloads,
        vec![
            dir.path().join("isa/rv64ui-p-add.bin"),
            PathBuf::from("/apps/coremark/coremark-riscv64-xs.bin"),
            dir.path().join("isa/rv64um-p-mul.bin"),
        ]
    );
}

#[test]
fn test_random_checkpoint_picks_one_from_pool() {
    let dir = tree();
    let source = SuiteSource::RandomCheckpoint {
        roots: vec![dir.path().join("ckpt/gcc"), dir.path().join("ckpt/mcf")],
        suffixes: vec![".zstd".to_string(), ".gz".to_string()],
    };
    let pool = find_files_with_suffix(&dir.path().join("ckpt"), &[".zstd", ".gz"]);
    let mut rng = StdRng::seed_from_u64(11);
    for _ in 0..10 {
        let picked = source.resolve(&BTreeMap::new(), &mut rng).unwrap();
        assert_eq!(picked.len(), 1);
        assert!(pool.contains(&picked[0]), "{picked:?}");
    }

    let a = source.resolve(&BTreeMap::new(), &mut StdRng::seed_from_u64(3)).unwrap();
    let b = source.resolve(&BTreeMap::new(), &mut StdRng::seed_from_u64(3)).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_random_checkpoint_empty_pool() {
    let source = SuiteSource::RandomCheckpoint {
        roots: vec![PathBuf::from("/nonexistent/ckpt")],
        suffixes: vec![".zstd".to_string()],
    };
    let err = source
        .resolve(&BTreeMap::new(), &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(matches!(err, Error::NoWorkloads(_)));
}

#[test]
fn test_empty_suite_is_error() {
    let err = Suite::default()
        .workloads(&BTreeMap::new(), &mut StdRng::seed_from_u64(0))
        .unwrap_err();
    assert!(matches!(err, Error::NoWorkloads(_)));
}

const SUITES: &str = r#"{
  "suites": {
    "riscv-tests": { "sources": [
      { "kind": "directory", "dir": "$RVTEST_HOME/isa/build", "prefixes": ["rv64ui"] }
    ] },
    "random": { "sources": [
      { "kind": "random_checkpoint", "roots": ["/share/checkpoints"] }
    ] },
    "cputest": { "sources": [
      { "kind": "list", "base": "$AM_HOME/tests/cputest/build",
        "entries": ["add-riscv64-xs.bin", "bit-riscv64-xs.bin"] }
    ] }
  }
}"#;

#[test]
fn test_suite_file_parses_with_defaults() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(SUITES.as_bytes()).unwrap();
    let suites = SuiteFile::load(file.path()).unwrap();
    assert_eq!(suites.suites.len(), 3);

    assert_eq!(
        suites.suite("riscv-tests").unwrap().sources,
        vec![SuiteSource::Directory {
            dir: PathBuf::from("$RVTEST_HOME/isa/build"),
            suffix: ".bin".to_string(),
            prefixes: vec!["rv64ui".to_string()],
        }]
    );
    assert_eq!(
        suites.suite("random").unwrap().sources,
        vec![SuiteSource::RandomCheckpoint {
            roots: vec![PathBuf::from("/share/checkpoints")],
            suffixes: vec![".zstd".to_string(), ".gz".to_string()],
        }]
    );

    let cputest = suites
        .suite("cputest")
        .unwrap()
        .workloads(&vars(&[("AM_HOME", "/am")]), &mut StdRng::seed_from_u64(0))
        .unwrap();
    assert_eq!(
        cputest,
        vec![
            PathBuf::from("/am/tests/cputest/build/add-riscv64-xs.bin"),
            PathBuf::from("/am/tests/cputest/build/bit-riscv64-xs.bin"),
        ]
    );
}

#[test]
fn test_unknown_suite() {
    let suites: SuiteFile = serde_json::from_str(SUITES).unwrap();
    assert!(matches!(suites.suite("linux"), Err(Error::UnknownSuite(name)) if name == "linux"));
}

#[test]
fn test_invalid_suite_file() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(br#"{ "suites": { "x": { "sources": [ { "kind": "nope" } ] } } }"#)
        .unwrap();
    assert!(matches!(
        SuiteFile::load(file.path()),
        Err(Error::SuiteFile { .. })
    ));
    assert!(matches!(
        SuiteFile::load(Path::new("/nonexistent/suites.json")),
        Err(Error::Io { .. })
    ));
}
