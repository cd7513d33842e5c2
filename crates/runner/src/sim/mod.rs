//! Simulator launchers.
//!
//! This module turns a workload into a finished simulator run. It provides:
//! 1. **Commands:** `emu` and `simv` invocations built from the `RunnerConfig`.
//! 2. **Placement:** Optional pinning of `emu` to an idle core window.
//! 3. **Verdicts:** Exit codes for `emu`, log inspection for `simv`.

/// `emu` command construction.
pub mod emu;
/// `simv` command construction and log verdict.
pub mod simv;

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::affinity::IdleCoreFinder;
use crate::common::constants::{EMU_BINARY, SIM_TOP_VERILOG, SIMV_BINARY, SIMV_LOG};
use crate::common::{CancelToken, Error, Result};
use crate::config::RunnerConfig;
use crate::exec::{Executor, ExitOutcome};

/// Simulator executable used for a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SimulatorKind {
    /// Verilator-based emulator.
    #[default]
    Emu,
    /// VCS simulator.
    Simv,
}

/// A file worth keeping after a failed run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Every file directly in the build directory ending with the suffix.
    Suffix(&'static str),
    /// One file, relative to the build directory.
    File(&'static str),
}

impl SimulatorKind {
    /// Artifacts copied to the wave directory when a run fails.
    pub const fn artifacts(self) -> &'static [Artifact] {
        match self {
            Self::Emu => &[
                Artifact::Suffix(".vcd"),
                Artifact::Suffix(".fst"),
                Artifact::File(EMU_BINARY),
                Artifact::File(SIM_TOP_VERILOG),
                Artifact::Suffix(".db"),
            ],
            Self::Simv => &[
                Artifact::Suffix(".fsdb"),
                Artifact::File(SIMV_BINARY),
                Artifact::File(SIM_TOP_VERILOG),
                Artifact::Suffix(".db"),
            ],
        }
    }
}

impl fmt::Display for SimulatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Emu => write!(f, "emu"),
            Self::Simv => write!(f, "simv"),
        }
    }
}

/// Runs workloads on a simulator through an executor.
pub struct Launcher<'a> {
    config: &'a RunnerConfig,
    executor: &'a mut dyn Executor,
    finder: Option<IdleCoreFinder>,
}

impl fmt::Debug for Launcher<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Launcher")
            .field("config", self.config)
            .field("finder", &self.finder)
            .finish_non_exhaustive()
    }
}

impl<'a> Launcher<'a> {
    /// Launcher using `executor`; NUMA runs probe the live host.
    pub fn new(config: &'a RunnerConfig, executor: &'a mut dyn Executor) -> Self {
        Self {
            config,
            executor,
            finder: None,
        }
    }

    /// Uses `finder` instead of the live-host finder for NUMA runs.
    #[must_use]
    pub fn with_finder(mut self, finder: IdleCoreFinder) -> Self {
        self.finder = Some(finder);
        self
    }

    /// Configuration the launcher runs with.
    pub const fn config(&self) -> &RunnerConfig {
        self.config
    }

    /// Runs `workload` and reports how the run ended.
    ///
    /// A `simv` run whose log shows a failure is reported as `Exited(1)`.
    ///
    /// # Errors
    ///
    /// Fails if the simulator cannot be started, no core window is found
    /// before the deadline, or the `simv` log cannot be read.
    pub fn run(&mut self, kind: SimulatorKind, workload: &Path) -> Result<ExitOutcome> {
        info!(
            "Running {kind} with the following configurations:\n{}",
            self.config
        );
        info!("workload: {}", workload.display());
        match kind {
            SimulatorKind::Emu => self.run_emu(workload),
            SimulatorKind::Simv => self.run_simv(workload),
        }
    }

    /// Runs `workload` on `emu` and returns the raw outcome.
    ///
    /// # Errors
    ///
    /// As [`Self::run`].
    pub fn run_emu(&mut self, workload: &Path) -> Result<ExitOutcome> {
        let window = if self.config.run.numa {
            let mut cancel = CancelToken::new().observing_interrupts();
            if let Some(limit) = self.config.run.numa_max_wait() {
                cancel = cancel.with_timeout(limit);
            }
            let finder = self.finder.get_or_insert_with(IdleCoreFinder::system);
            Some(finder.find(self.config.run.threads, &cancel)?)
        } else {
            None
        };
        let command = emu::command(self.config, workload, window.as_ref());
        self.executor.execute(&command)
    }

    fn run_simv(&mut self, workload: &Path) -> Result<ExitOutcome> {
        let command = simv::command(self.config, workload);
        let outcome = self.executor.execute(&command)?;
        if outcome == ExitOutcome::Interrupted {
            return Ok(outcome);
        }
        let log_path = self.config.homes.build_dir().join(SIMV_LOG);
        let log = fs::read_to_string(&log_path).map_err(|e| Error::io(&log_path, e))?;
        if simv::log_passed(&log) {
            Ok(outcome)
        } else {
            warn!("simv log {} shows a failing run", log_path.display());
            Ok(ExitOutcome::Exited(1))
        }
    }
}
