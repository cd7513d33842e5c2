//! CI suite definitions.
//!
//! Suites are data, not code: a JSON suite file maps suite names to ordered
//! workload sources.
//!
//! ```json
//! {
//!   "suites": {
//!     "riscv-tests": { "sources": [
//!       { "kind": "directory", "dir": "$RVTEST_HOME/isa/build",
//!         "prefixes": ["rv64ui", "rv64um"] }
//!     ] },
//!     "coremark": { "sources": [
//!       { "kind": "app", "base": "/share/workloads/apps", "bench": "coremark" }
//!     ] },
//!     "random": { "sources": [
//!       { "kind": "random_checkpoint", "roots": ["/share/checkpoints/spec06"] }
//!     ] }
//!   }
//! }
//! ```
//!
//! Paths may reference `$VAR` or `${VAR}`; variables are substituted from the
//! resolved tool homes and unknown names are left untouched.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use rand::Rng;
use rand::seq::SliceRandom;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};

use super::discover::{find_files_with_suffix, list_dir_with_suffix};
use crate::common::constants::CHECKPOINT_SUFFIXES;
use crate::common::{Error, Result};

#[allow(clippy::expect_used)]
static VARIABLE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}|\$([A-Za-z_][A-Za-z0-9_]*)")
        .expect("variable pattern is a valid regex")
});

/// One way of producing workloads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SuiteSource {
    /// Files directly inside `dir` with `suffix`, optionally filtered by name prefix.
    Directory {
        /// Directory to list.
        dir: PathBuf,
        /// Required file name suffix.
        #[serde(default = "SuiteSource::default_suffix")]
        suffix: String,
        /// Accepted name prefixes; empty accepts all.
        #[serde(default)]
        prefixes: Vec<String>,
    },
    /// Fixed entries relative to `base`.
    List {
        /// Base directory.
        base: PathBuf,
        /// Workloads relative to `base`.
        entries: Vec<PathBuf>,
    },
    /// A bare-metal application image: `<base>/<bench>/<bench>-riscv64-xs.bin`.
    App {
        /// Applications directory.
        base: PathBuf,
        /// Application name.
        bench: String,
    },
    /// One checkpoint picked uniformly among all found under `roots`.
    RandomCheckpoint {
        /// Directories searched recursively.
        roots: Vec<PathBuf>,
        /// Checkpoint suffixes.
        #[serde(default = "SuiteSource::default_checkpoint_suffixes")]
        suffixes: Vec<String>,
    },
}

impl SuiteSource {
    fn default_suffix() -> String {
        ".bin".to_string()
    }

    fn default_checkpoint_suffixes() -> Vec<String> {
        CHECKPOINT_SUFFIXES.iter().map(ToString::to_string).collect()
    }

    /// Expands the source into workload paths.
    ///
    /// # Errors
    ///
    /// `Io` if a directory source cannot be listed, `NoWorkloads` if a
    /// random checkpoint source finds no checkpoint.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        vars: &BTreeMap<String, String>,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>> {
        let expand = |path: &Path| expand_vars(path, vars);
        match self {
            Self::Directory {
                dir,
                suffix,
                prefixes,
            } => list_dir_with_suffix(&expand(dir), suffix, prefixes),
            Self::List { base, entries } => {
                let base = expand(base);
                Ok(entries.iter().map(|entry| base.join(entry)).collect())
            }
            Self::App { base, bench } => Ok(vec![
                expand(base)
                    .join(bench)
                    .join(format!("{bench}-riscv64-xs.bin")),
            ]),
            Self::RandomCheckpoint { roots, suffixes } => {
                let pool: Vec<PathBuf> = roots
                    .iter()
                    .flat_map(|root| find_files_with_suffix(&expand(root), suffixes))
                    .collect();
                pool.choose(rng).cloned().map(|pick| vec![pick]).ok_or_else(|| {
                    Error::NoWorkloads(format!("no checkpoint ending with {suffixes:?}"))
                })
            }
        }
    }
}

/// An ordered list of workload sources.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Suite {
    /// Sources, resolved in order.
    #[serde(default)]
    pub sources: Vec<SuiteSource>,
}

impl Suite {
    /// All workloads of the suite, in source order.
    ///
    /// # Errors
    ///
    /// Any source error, or `NoWorkloads` if the suite resolves to nothing.
    pub fn workloads<R: Rng + ?Sized>(
        &self,
        vars: &BTreeMap<String, String>,
        rng: &mut R,
    ) -> Result<Vec<PathBuf>> {
        let mut workloads = Vec::new();
        for source in &self.sources {
            workloads.extend(source.resolve(vars, rng)?);
        }
        if workloads.is_empty() {
            return Err(Error::NoWorkloads("suite resolved to no workloads".to_string()));
        }
        Ok(workloads)
    }
}

/// Named suites loaded from a JSON file.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SuiteFile {
    /// Suites by name.
    pub suites: BTreeMap<String, Suite>,
}

impl SuiteFile {
    /// Reads and parses a suite file.
    ///
    /// # Errors
    ///
    /// `Io` if unreadable, `SuiteFile` if the JSON is invalid.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        serde_json::from_str(&text).map_err(|source| Error::SuiteFile {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Looks up a suite by name.
    ///
    /// # Errors
    ///
    /// `UnknownSuite` if no suite has that name.
    pub fn suite(&self, name: &str) -> Result<&Suite> {
        self.suites
            .get(name)
            .ok_or_else(|| Error::UnknownSuite(name.to_string()))
    }
}

/// Substitutes `$VAR` and `${VAR}` in `path` from `vars`.
pub fn expand_vars(path: &Path, vars: &BTreeMap<String, String>) -> PathBuf {
    let text = path.to_string_lossy();
    let expanded = VARIABLE.replace_all(&text, |caps: &Captures<'_>| {
        let name = caps.get(1).or_else(|| caps.get(2)).map_or("", |m| m.as_str());
        vars.get(name)
            .cloned()
            .unwrap_or_else(|| caps[0].to_string())
    });
    PathBuf::from(expanded.into_owned())
}
