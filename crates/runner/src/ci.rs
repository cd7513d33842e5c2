//! CI suite runner.
//!
//! Workloads run one after another; the first failure ends the suite. Before
//! returning, the failing run's waveforms, simulator binary, netlist and debug
//! database are copied to `WAVE_HOME` when it is not the build directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::common::Result;
use crate::exec::ExitOutcome;
use crate::sim::{Artifact, Launcher, SimulatorKind};

/// Runs a list of workloads on one simulator.
#[derive(Debug)]
pub struct CiRunner<'a> {
    launcher: Launcher<'a>,
    kind: SimulatorKind,
}

impl<'a> CiRunner<'a> {
    /// Runner driving `launcher` with the `kind` simulator.
    pub const fn new(launcher: Launcher<'a>, kind: SimulatorKind) -> Self {
        Self { launcher, kind }
    }

    /// Runs every workload in order and returns the suite's exit code.
    ///
    /// Returns 0 if all runs pass, otherwise the code of the first failing or
    /// interrupted run.
    ///
    /// # Errors
    ///
    /// Propagates launcher errors; artifact copy failures are only logged.
    pub fn run(&mut self, workloads: &[PathBuf]) -> Result<i32> {
        for (index, workload) in workloads.iter().enumerate() {
            info!("[{}/{}] {}", index + 1, workloads.len(), workload.display());
            let outcome = self.launcher.run(self.kind, workload)?;
            if outcome == ExitOutcome::Interrupted {
                warn!("suite interrupted");
                return Ok(outcome.code());
            }
            if !outcome.is_success() {
                let homes = &self.launcher.config().homes;
                if homes.has_custom_wave_home() {
                    info!("copy wave file to {}", homes.wave_home.display());
                    let _ = collect_artifacts(
                        &homes.build_dir(),
                        &homes.wave_home,
                        self.kind.artifacts(),
                    );
                }
                return Ok(outcome.code());
            }
        }
        Ok(0)
    }
}

/// Copies `artifacts` from `build_dir` into `dest` and returns the copied files.
///
/// Missing artifacts and copy failures are logged and skipped.
pub fn collect_artifacts(build_dir: &Path, dest: &Path, artifacts: &[Artifact]) -> Vec<PathBuf> {
    if let Err(e) = fs::create_dir_all(dest) {
        warn!("cannot create {}: {e}", dest.display());
        return Vec::new();
    }
    let sources = artifacts.iter().flat_map(|artifact| match artifact {
        Artifact::File(rel) => vec![build_dir.join(rel)],
        Artifact::Suffix(suffix) => matching_files(build_dir, suffix),
    });

    let mut copied = Vec::new();
    for source in sources {
        let Some(name) = source.file_name() else {
            continue;
        };
        let target = dest.join(name);
        match fs::copy(&source, &target) {
            Ok(_) => copied.push(target),
            Err(e) => warn!("cp {} {}: {e}", source.display(), target.display()),
        }
    }
    copied
}

fn matching_files(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    let Ok(entries) = fs::read_dir(dir) else {
        return Vec::new();
    };
    let mut files: Vec<PathBuf> = entries
        .filter_map(std::result::Result::ok)
        .filter(|entry| entry.file_type().is_ok_and(|t| t.is_file()))
        .map(|entry| entry.path())
        .filter(|path| {
            path.file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(suffix))
        })
        .collect();
    files.sort();
    files
}
