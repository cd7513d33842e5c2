//! Core reservation probe.
//!
//! Reservations are advisory. Sibling runs never lock cores; they are pinned
//! with `numactl -C <first>-<last>`, and the default probe infers their claims
//! by reading every process command line from the process table. Entries that
//! vanish mid-scan, deny access or have no command line are skipped.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use super::window::CoreRange;
use crate::common::constants::RESERVATION_EXCLUDED_NAME;

#[allow(clippy::expect_used)]
static PINNING_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"numactl +.*-C +([0-9]+)-([0-9]+)").expect("pinning pattern is a valid regex")
});

/// Source of core ranges currently claimed by other processes.
pub trait ReservationProbe {
    /// Lists every reserved range. Ranges may overlap or repeat.
    fn reserved_ranges(&self) -> Vec<CoreRange>;
}

/// A process as seen in the process table.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProcessEntry {
    /// Process id.
    pub pid: u32,
    /// Short process name (`comm`).
    pub name: String,
    /// Argument vector.
    pub cmdline: Vec<String>,
}

impl ProcessEntry {
    /// Builds an entry from a name and a space-separated command line.
    pub fn new(pid: u32, name: &str, cmdline: &str) -> Self {
        Self {
            pid,
            name: name.to_string(),
            cmdline: cmdline.split_whitespace().map(str::to_string).collect(),
        }
    }

    /// Core range declared on the command line, unless the process is excluded by name.
    pub fn reservation(&self) -> Option<CoreRange> {
        if self.name.contains(RESERVATION_EXCLUDED_NAME) {
            return None;
        }
        pinned_range(&self.cmdline.join(" "))
    }
}

/// Extracts the `-C <first>-<last>` range of a `numactl` invocation.
///
/// Returns `None` if the line carries no pinning, if either bound does not fit
/// a core index, or if the range is empty.
pub fn pinned_range(cmdline: &str) -> Option<CoreRange> {
    let caps = PINNING_PATTERN.captures(cmdline)?;
    let first = caps.get(1)?.as_str().parse().ok()?;
    let last = caps.get(2)?.as_str().parse().ok()?;
    CoreRange::new(first, last)
}

/// Collects the reservations declared by a set of processes.
pub fn reservations_from<'a>(entries: impl IntoIterator<Item = &'a ProcessEntry>) -> Vec<CoreRange> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let range = entry.reservation()?;
            debug!(pid = entry.pid, name = %entry.name, %range, "core reservation");
            Some(range)
        })
        .collect()
}

/// Probe over a procfs-style process table.
#[derive(Debug, Clone)]
pub struct ProcessTableProbe {
    root: PathBuf,
}

impl Default for ProcessTableProbe {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessTableProbe {
    /// Probe over `/proc`.
    pub fn new() -> Self {
        Self::with_root("/proc")
    }

    /// Probe over a directory laid out like `/proc` (`<pid>/cmdline`, `<pid>/comm`).
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Reads every readable process entry.
    pub fn processes(&self) -> Vec<ProcessEntry> {
        let Ok(dir) = fs::read_dir(&self.root) else {
            debug!(root = %self.root.display(), "process table unreadable");
            return Vec::new();
        };
        dir.filter_map(std::result::Result::ok)
            .filter_map(|entry| {
                let pid = entry.file_name().to_str()?.parse::<u32>().ok()?;
                read_process(&entry.path(), pid)
            })
            .collect()
    }
}

fn read_process(dir: &Path, pid: u32) -> Option<ProcessEntry> {
    let raw = fs::read(dir.join("cmdline")).ok()?;
    let cmdline: Vec<String> = raw
        .split(|&b| b == 0)
        .filter(|arg| !arg.is_empty())
        .map(|arg| String::from_utf8_lossy(arg).into_owned())
        .collect();
    if cmdline.is_empty() {
        return None;
    }
    let name = fs::read_to_string(dir.join("comm")).ok()?.trim().to_string();
    Some(ProcessEntry { pid, name, cmdline })
}

impl ReservationProbe for ProcessTableProbe {
    fn reserved_ranges(&self) -> Vec<CoreRange> {
        reservations_from(&self.processes())
    }
}
