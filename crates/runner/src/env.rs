//! Tool home resolution and subprocess environment.
//!
//! Every external tool lives in its own checkout next to the RTL project. A
//! home is resolved from, in order, an explicit override, the matching
//! environment variable, and a default relative to `NOOP_HOME`. The resolved
//! homes are exported to every subprocess alongside `MODULEPATH`.

use std::collections::BTreeMap;
use std::env;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::common::constants::{BUILD_DIR, MODULEPATH};
use crate::common::{Error, Result};

/// Explicit home overrides, typically from the command line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HomeOverrides {
    /// RTL project root.
    pub noop: Option<PathBuf>,
    /// Reference ISA simulator checkout.
    pub nemu: Option<PathBuf>,
    /// Bare-metal application framework checkout.
    pub am: Option<PathBuf>,
    /// Memory-timing simulator checkout.
    pub dramsim3: Option<PathBuf>,
    /// ISA test suite checkout.
    pub rvtest: Option<PathBuf>,
    /// Destination for waveforms and artifacts of failed runs.
    pub wave_dump: Option<PathBuf>,
}

/// Resolved absolute tool homes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HomePaths {
    /// `NOOP_HOME`: the RTL project root.
    pub noop_home: PathBuf,
    /// `NEMU_HOME`.
    pub nemu_home: PathBuf,
    /// `AM_HOME`.
    pub am_home: PathBuf,
    /// `DRAMSIM3_HOME`.
    pub dramsim3_home: PathBuf,
    /// `RVTEST_HOME`; used to locate ISA tests, not exported.
    pub rvtest_home: PathBuf,
    /// `WAVE_HOME`.
    pub wave_home: PathBuf,
}

impl HomePaths {
    /// Resolves homes against the process environment and working directory.
    ///
    /// # Errors
    ///
    /// Fails only if the current directory cannot be determined.
    pub fn resolve(overrides: &HomeOverrides) -> Result<Self> {
        let cwd = env::current_dir().map_err(|e| Error::io(".", e))?;
        Ok(Self::resolve_with(overrides, |name| env::var(name).ok(), &cwd))
    }

    /// Resolves homes with an explicit variable lookup and working directory.
    pub fn resolve_with(
        overrides: &HomeOverrides,
        lookup: impl Fn(&str) -> Option<String>,
        cwd: &Path,
    ) -> Self {
        let pick = |explicit: &Option<PathBuf>, var: &str, default: PathBuf| {
            let chosen = explicit
                .clone()
                .or_else(|| lookup(var).map(PathBuf::from))
                .unwrap_or(default);
            normalize_path(&chosen, cwd)
        };

        let noop_home = pick(&overrides.noop, "NOOP_HOME", cwd.to_path_buf());
        let sibling = |name: &str| noop_home.join("..").join(name);
        let nemu_home = pick(&overrides.nemu, "NEMU_HOME", sibling("NEMU"));
        let am_home = pick(&overrides.am, "AM_HOME", sibling("nexus-am"));
        let dramsim3_home = pick(&overrides.dramsim3, "DRAMSIM3_HOME", sibling("DRAMsim3"));
        let rvtest_home = pick(&overrides.rvtest, "RVTEST_HOME", sibling("riscv-tests"));
        let wave_home = overrides.wave_dump.as_ref().map_or_else(
            || noop_home.join(BUILD_DIR),
            |path| normalize_path(path, cwd),
        );
        info!("set wave home to {}", wave_home.display());

        Self {
            noop_home,
            nemu_home,
            am_home,
            dramsim3_home,
            rvtest_home,
            wave_home,
        }
    }

    /// `$NOOP_HOME/build`, where simulators and their outputs live.
    pub fn build_dir(&self) -> PathBuf {
        self.noop_home.join(BUILD_DIR)
    }

    /// Returns `true` if waveforms go somewhere other than the build directory.
    pub fn has_custom_wave_home(&self) -> bool {
        self.wave_home != self.build_dir()
    }

    /// Variables exported to every subprocess.
    pub fn environment(&self) -> BTreeMap<String, String> {
        [
            ("NOOP_HOME", &self.noop_home),
            ("NEMU_HOME", &self.nemu_home),
            ("WAVE_HOME", &self.wave_home),
            ("AM_HOME", &self.am_home),
            ("DRAMSIM3_HOME", &self.dramsim3_home),
        ]
        .into_iter()
        .map(|(name, path)| (name.to_string(), path.display().to_string()))
        .chain(std::iter::once((
            "MODULEPATH".to_string(),
            MODULEPATH.to_string(),
        )))
        .collect()
    }

    /// Variables available for expansion in suite files: the exported
    /// environment plus `RVTEST_HOME`.
    pub fn path_variables(&self) -> BTreeMap<String, String> {
        let mut vars = self.environment();
        let _ = vars.insert(
            "RVTEST_HOME".to_string(),
            self.rvtest_home.display().to_string(),
        );
        vars
    }
}

/// Makes `path` absolute against `cwd` and resolves `.`/`..`.
///
/// Existing paths are canonicalized (symlinks resolved); missing ones are
/// normalized lexically.
pub fn normalize_path(path: &Path, cwd: &Path) -> PathBuf {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        cwd.join(path)
    };
    if let Ok(canonical) = absolute.canonicalize() {
        return canonical;
    }
    let mut normalized = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                let _ = normalized.pop();
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
