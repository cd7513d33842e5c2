//! Per-core CPU utilization sampling.
//!
//! One `UtilizationSample` holds a percentage per logical core, all measured
//! over the same interval. The default sampler diffs two reads of `/proc/stat`.

use std::fmt;
use std::fs;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

use tracing::debug;

use crate::common::constants::SAMPLE_INTERVAL;
use crate::common::{Error, Result};

/// Source of synchronized per-core utilization snapshots.
pub trait UtilizationSampler {
    /// Takes one snapshot covering every logical core.
    fn sample(&mut self) -> Result<UtilizationSample>;
}

/// Utilization percentages in `[0, 100]`, indexed by core.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct UtilizationSample(Vec<f64>);

impl UtilizationSample {
    /// Wraps per-core percentages.
    pub const fn new(per_core: Vec<f64>) -> Self {
        Self(per_core)
    }

    /// A sample where every one of `cores` cores reports `usage`.
    pub fn uniform(cores: usize, usage: f64) -> Self {
        Self(vec![usage; cores])
    }

    /// Number of logical cores covered.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if no core was sampled.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Utilization of `n` cores starting at `start`.
    ///
    /// # Panics
    ///
    /// Panics if the window extends past the sampled cores.
    pub fn window(&self, start: usize, n: usize) -> &[f64] {
        &self.0[start..start + n]
    }

    /// All per-core values.
    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }
}

impl fmt::Display for UtilizationSample {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, usage) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{usage:.1}")?;
        }
        write!(f, "]")
    }
}

/// Cumulative jiffies of one `cpuN` line in `/proc/stat`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CpuTimes {
    /// Normal processes in user mode.
    pub user: u64,
    /// Niced processes in user mode.
    pub nice: u64,
    /// Kernel mode.
    pub system: u64,
    /// Idle.
    pub idle: u64,
    /// Waiting for I/O; counted as idle.
    pub iowait: u64,
    /// Servicing interrupts.
    pub irq: u64,
    /// Servicing softirqs.
    pub softirq: u64,
    /// Stolen by the hypervisor.
    pub steal: u64,
}

impl CpuTimes {
    /// Sum of all tracked fields.
    pub const fn total(&self) -> u64 {
        self.busy() + self.idle + self.iowait
    }

    /// Total minus idle and iowait.
    pub const fn busy(&self) -> u64 {
        self.user + self.nice + self.system + self.irq + self.softirq + self.steal
    }

    /// Utilization percentage between an earlier reading and `self`.
    pub fn usage_since(&self, earlier: &Self) -> f64 {
        let total = self.total().saturating_sub(earlier.total());
        if total == 0 {
            return 0.0;
        }
        let busy = self.busy().saturating_sub(earlier.busy());
        (busy as f64 / total as f64 * 100.0).clamp(0.0, 100.0)
    }
}

/// Parses the per-core lines of `/proc/stat`.
///
/// The result is indexed by core id. Ids absent from the file (offline cores)
/// are `None`. The aggregate `cpu` line is ignored.
pub fn parse_proc_stat(content: &str) -> Result<Vec<Option<CpuTimes>>> {
    let mut cores: Vec<Option<CpuTimes>> = Vec::new();
    for line in content.lines() {
        let mut fields = line.split_whitespace();
        let Some(label) = fields.next() else {
            continue;
        };
        let Some(id) = label.strip_prefix("cpu").filter(|s| !s.is_empty()) else {
            continue;
        };
        let Ok(id) = id.parse::<usize>() else {
            continue;
        };
        let values = fields
            .take(8)
            .map(str::parse::<u64>)
            .collect::<std::result::Result<Vec<_>, _>>()
            .map_err(|e| Error::MalformedProcStat(format!("{label}: {e}")))?;
        let [user, nice, system, idle, iowait, irq, softirq, steal] = values[..] else {
            return Err(Error::MalformedProcStat(format!(
                "{label}: expected 8 fields, found {}",
                values.len()
            )));
        };
        if cores.len() <= id {
            cores.resize(id + 1, None);
        }
        cores[id] = Some(CpuTimes {
            user,
            nice,
            system,
            idle,
            iowait,
            irq,
            softirq,
            steal,
        });
    }
    if cores.is_empty() {
        return Err(Error::MalformedProcStat("no per-core lines".to_string()));
    }
    Ok(cores)
}

/// Computes per-core utilization between two parsed `/proc/stat` reads.
///
/// Cores missing from either read report 100 percent so they are never picked.
pub fn usage_between(before: &[Option<CpuTimes>], after: &[Option<CpuTimes>]) -> UtilizationSample {
    let cores = before.len().max(after.len());
    let per_core = (0..cores)
        .map(|id| {
            match (
                before.get(id).copied().flatten(),
                after.get(id).copied().flatten(),
            ) {
                (Some(b), Some(a)) => a.usage_since(&b),
                _ => 100.0,
            }
        })
        .collect();
    UtilizationSample::new(per_core)
}

/// Samples `/proc/stat` twice, one interval apart.
#[derive(Debug, Clone)]
pub struct ProcStatSampler {
    path: PathBuf,
    interval: Duration,
}

impl Default for ProcStatSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcStatSampler {
    /// Sampler over `/proc/stat` with the default one-second interval.
    pub fn new() -> Self {
        Self::with_source("/proc/stat", SAMPLE_INTERVAL)
    }

    /// Sampler over an arbitrary stat file and interval.
    pub fn with_source(path: impl Into<PathBuf>, interval: Duration) -> Self {
        Self {
            path: path.into(),
            interval,
        }
    }

    fn read(&self) -> Result<Vec<Option<CpuTimes>>> {
        let content = fs::read_to_string(&self.path).map_err(|e| Error::io(&self.path, e))?;
        parse_proc_stat(&content)
    }
}

impl UtilizationSampler for ProcStatSampler {
    fn sample(&mut self) -> Result<UtilizationSample> {
        let before = self.read()?;
        thread::sleep(self.interval);
        let after = self.read()?;
        let sample = usage_between(&before, &after);
        debug!(cores = sample.len(), "sampled cpu utilization");
        Ok(sample)
    }
}
