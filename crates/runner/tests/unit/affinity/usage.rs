//! # Utilization Sampling Tests
//!
//! Checks `/proc/stat` parsing, per-core deltas and the file-backed sampler.

use std::io::Write;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::NamedTempFile;
use xsrun_core::Error;
use xsrun_core::affinity::usage::{CpuTimes, parse_proc_stat, usage_between};
use xsrun_core::affinity::{ProcStatSampler, UtilizationSample, UtilizationSampler};

const STAT: &str = "\
cpu  400 0 200 1400 0 0 0 0 0 0
cpu0 100 0 50 350 0 0 0 0 0 0
cpu1 100 0 50 350 0 0 0 0 0 0
cpu3 200 0 100 700 0 0 0 0 0 0
intr 12345 0 0
ctxt 6789
";

fn times(busy: u64, idle: u64) -> CpuTimes {
    CpuTimes {
        user: busy,
        idle,
        ..CpuTimes::default()
    }
}

#[test]
fn test_parse_proc_stat_indexes_by_core_id() {
    let cores = parse_proc_stat(STAT).unwrap();
    assert_eq!(cores.len(), 4);
    assert!(cores[2].is_none());
    let cpu0 = cores[0].unwrap();
    assert_eq!(cpu0.busy(), 150);
    assert_eq!(cpu0.total(), 500);
}

#[test]
fn test_parse_proc_stat_rejects_short_lines() {
    let err = parse_proc_stat("cpu0 1 2 3\n").unwrap_err();
    assert!(matches!(err, Error::MalformedProcStat(_)));
}

#[test]
fn test_parse_proc_stat_requires_per_core_lines() {
    assert!(matches!(
        parse_proc_stat("cpu 1 2 3 4 5 6 7 8\n"),
        Err(Error::MalformedProcStat(_))
    ));
}

#[test]
fn test_usage_since_uses_deltas() {
    let before = times(100, 100);
    let after = times(175, 125);
    assert!((after.usage_since(&before) - 75.0).abs() < 1e-9);
    assert_eq!(before.usage_since(&before), 0.0);
}

#[test]
fn test_missing_cores_count_as_busy() {
    let before = vec![Some(times(0, 0)), None, Some(times(0, 0))];
    let after = vec![Some(times(10, 90)), Some(times(5, 5))];
    let sample = usage_between(&before, &after);
    assert_eq!(sample.len(), 3);
    assert!((sample.as_slice()[0] - 10.0).abs() < 1e-9);
    assert_eq!(sample.as_slice()[1], 100.0);
    assert_eq!(sample.as_slice()[2], 100.0);
}

#[test]
fn test_sample_display() {
    let sample = UtilizationSample::new(vec![0.0, 12.345, 100.0]);
    assert_eq!(sample.to_string(), "[0.0, 12.3, 100.0]");
    assert_eq!(sample.window(1, 2), &[12.345, 100.0]);
}

#[test]
fn test_file_sampler_reads_twice() {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(STAT.as_bytes()).unwrap();
    let mut sampler = ProcStatSampler::with_source(file.path(), Duration::ZERO);
    let sample = sampler.sample().unwrap();
    // Identical reads: present cores are idle, the offline core is busy.
    assert_eq!(sample.as_slice(), &[0.0, 0.0, 100.0, 0.0]);
}

#[test]
fn test_file_sampler_missing_file() {
    let mut sampler = ProcStatSampler::with_source("/nonexistent/stat", Duration::ZERO);
    assert!(matches!(sampler.sample(), Err(Error::Io { .. })));
}
