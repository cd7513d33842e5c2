//! Configuration for simulation runs.
//!
//! This module defines the structures that parameterize a run. It provides:
//! 1. **Emulator Options:** Reference model, seed, instruction limit and feature switches for `emu`.
//! 2. **Run Policy:** NUMA pinning, window size, timeouts.
//! 3. **Root Config:** `RunnerConfig`, which bundles the above with the resolved tool homes.
//!
//! The CLI builds a `RunnerConfig` from flags; the same structure round-trips through JSON
//! (`xs show --json`) so a resolved configuration can be inspected or replayed.

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::common::constants::{DEFAULT_DIFF, MAX_SEED, NEMU_REF_NAME, SPIKE_REF_NAME};
use crate::env::HomePaths;
use crate::sim::emu;

/// Options forwarded to the `emu` executable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmuOptions {
    /// Stop after this many instructions (`--max-instr`).
    #[serde(default)]
    pub max_instr: Option<u64>,

    /// Reference model shared object for differential testing (`--diff`).
    #[serde(default = "EmuOptions::default_diff")]
    pub diff: String,

    /// Simulation seed (`--seed`); drawn in `0..=9999` when not given.
    #[serde(default = "EmuOptions::random_seed")]
    pub seed: u32,

    /// Simulated memory size (`--ram-size`), e.g. `8GB`.
    #[serde(default)]
    pub ram_size: Option<String>,

    /// Fork-based snapshotting for fast failure replay (`--enable-fork`).
    #[serde(default = "EmuOptions::enabled")]
    pub fork: bool,

    /// Differential testing against the reference model; off adds `--no-diff`.
    #[serde(default = "EmuOptions::enabled")]
    pub difftest: bool,

    /// Dump the debug database on exit (`--dump-db`).
    #[serde(default = "EmuOptions::enabled")]
    pub dump_db: bool,

    /// Restorer binary used for checkpoint workloads (`-r`).
    #[serde(default)]
    pub gcpt_restore_bin: Option<PathBuf>,

    /// Extra arguments appended verbatim.
    #[serde(default)]
    pub extra_args: Vec<String>,
}

impl EmuOptions {
    fn default_diff() -> String {
        DEFAULT_DIFF.to_string()
    }

    /// Draws a seed in `0..=9999`.
    pub fn random_seed() -> u32 {
        rand::thread_rng().gen_range(0..=MAX_SEED)
    }

    const fn enabled() -> bool {
        true
    }

    /// Switches the reference model to Spike.
    ///
    /// Only NEMU-based references are rewritten; a custom `diff` is kept.
    #[must_use]
    pub fn with_spike(mut self) -> Self {
        if self.diff.contains("nemu") {
            self.diff = self.diff.replace(NEMU_REF_NAME, SPIKE_REF_NAME);
        }
        self
    }
}

impl Default for EmuOptions {
    fn default() -> Self {
        Self {
            max_instr: None,
            diff: Self::default_diff(),
            seed: Self::random_seed(),
            ram_size: None,
            fork: true,
            difftest: true,
            dump_db: true,
            gcpt_restore_bin: None,
            extra_args: Vec::new(),
        }
    }
}

/// How runs are placed and bounded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunPolicy {
    /// Pin each run to an idle core window with `numactl`.
    #[serde(default)]
    pub numa: bool,

    /// Emulator threads; also the size of the pinned core window.
    #[serde(default = "RunPolicy::default_threads")]
    pub threads: usize,

    /// Per-run timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,

    /// Upper bound in seconds on waiting for an idle core window.
    #[serde(default)]
    pub numa_max_wait_secs: Option<u64>,
}

impl RunPolicy {
    const fn default_threads() -> usize {
        1
    }

    /// Per-run timeout.
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    /// Bound on waiting for a core window.
    pub fn numa_max_wait(&self) -> Option<Duration> {
        self.numa_max_wait_secs.map(Duration::from_secs)
    }
}

impl Default for RunPolicy {
    fn default() -> Self {
        Self {
            numa: false,
            threads: Self::default_threads(),
            timeout_secs: None,
            numa_max_wait_secs: None,
        }
    }
}

/// Root configuration for one wrapper invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Resolved tool homes.
    pub homes: HomePaths,
    /// `emu` options.
    #[serde(default)]
    pub emu: EmuOptions,
    /// Placement and limits.
    #[serde(default)]
    pub run: RunPolicy,
}

impl RunnerConfig {
    /// Configuration with default options for the given homes.
    pub fn new(homes: HomePaths) -> Self {
        Self {
            homes,
            emu: EmuOptions::default(),
            run: RunPolicy::default(),
        }
    }
}

impl fmt::Display for RunnerConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Extra environment variables:")?;
        for (name, value) in self.homes.environment() {
            writeln!(f, "{name}: {value}")?;
        }
        writeln!(f)?;
        writeln!(f, "emu arguments:")?;
        writeln!(f, "{}", emu::option_args(&self.emu).join(" "))?;
        writeln!(f)?;
        writeln!(f, "run policy:")?;
        writeln!(
            f,
            "numa: {}  threads: {}  timeout: {}",
            self.run.numa,
            self.run.threads,
            self.run
                .timeout_secs
                .map_or_else(|| "none".to_string(), |s| format!("{s}s"))
        )
    }
}
