//! Core windows and window selection.
//!
//! This module holds the pure part of the idle-core search. It provides:
//! 1. **Ranges:** `CoreRange`, an inclusive span of core indices claimed by another process.
//! 2. **Windows:** `CoreWindow`, the selected span plus its NUMA node and the matching `numactl` prefix.
//! 3. **Selection:** `select_window`, which scans aligned windows against a utilization sample.

use std::fmt;

use serde::Serialize;

use super::usage::UtilizationSample;
use crate::common::constants::{CORE_PEAK_USAGE_LIMIT, WINDOW_AVG_USAGE_LIMIT};

/// Inclusive range of core indices `[first, last]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CoreRange {
    /// First core of the range.
    pub first: usize,
    /// Last core of the range (inclusive).
    pub last: usize,
}

impl CoreRange {
    /// Creates a range; returns `None` if `first > last`.
    pub const fn new(first: usize, last: usize) -> Option<Self> {
        if first > last {
            None
        } else {
            Some(Self { first, last })
        }
    }

    /// Returns `true` if `core` lies within the range.
    pub const fn contains(&self, core: usize) -> bool {
        self.first <= core && core <= self.last
    }

    /// Returns `true` if the range shares at least one core with `[start, end]`.
    pub const fn overlaps(&self, start: usize, end: usize) -> bool {
        self.first <= end && start <= self.last
    }
}

impl fmt::Display for CoreRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.first, self.last)
    }
}

/// A selected window of contiguous cores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CoreWindow {
    /// NUMA node the window is bound to for memory allocation.
    pub node: usize,
    /// First core of the window.
    pub start: usize,
    /// Last core of the window (inclusive).
    pub end: usize,
}

impl CoreWindow {
    /// Number of cores in the window.
    pub const fn len(&self) -> usize {
        self.end - self.start + 1
    }

    /// Always `false`; a window holds at least one core.
    pub const fn is_empty(&self) -> bool {
        false
    }

    /// The window as a `CoreRange`.
    pub const fn range(&self) -> CoreRange {
        CoreRange {
            first: self.start,
            last: self.end,
        }
    }

    /// Core-pinning prefix: `numactl -m <node> -C <start>-<end>`.
    ///
    /// `numactl` execs into its command, so the prefix only shows up in the
    /// process table while some live process still carries it in its
    /// command line. Launchers keep such a process around (see
    /// [`crate::exec::CommandSpec::in_shell`]) so that
    /// [`super::reservation::pinned_range`] sees the reservation for the
    /// whole run.
    pub fn numactl_args(&self) -> Vec<String> {
        vec![
            "numactl".to_string(),
            "-m".to_string(),
            self.node.to_string(),
            "-C".to_string(),
            self.range().to_string(),
        ]
    }
}

impl fmt::Display for CoreWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node {} cores {}-{}", self.node, self.start, self.end)
    }
}

/// Two-node bisection used when the host topology is unknown.
///
/// Assumes two equally sized NUMA nodes: cores in the lower half map to node 0,
/// the upper half to node 1.
pub const fn bisect_node(start: usize, total: usize) -> usize {
    let half = total / 2;
    if half == 0 { 0 } else { (start % total) / half }
}

/// Returns the start of the first acceptable aligned window of `n` cores.
///
/// Windows are `[i*n, i*n + n)` for `i` in `0..total / n`; a trailing partial
/// window is never considered. A window is skipped if it intersects any
/// reservation, and accepted if its summed utilization is below
/// `30 * n` percent with no single core above 90 percent.
pub fn select_window(n: usize, sample: &UtilizationSample, reserved: &[CoreRange]) -> Option<usize> {
    if n == 0 {
        return None;
    }
    (0..sample.len() / n).map(|i| i * n).find(|&start| {
        let end = start + n - 1;
        if reserved.iter().any(|r| r.overlaps(start, end)) {
            return false;
        }
        let window = sample.window(start, n);
        let total: f64 = window.iter().sum();
        total < WINDOW_AVG_USAGE_LIMIT * n as f64
            && window.iter().all(|&usage| usage <= CORE_PEAK_USAGE_LIMIT)
    })
}
