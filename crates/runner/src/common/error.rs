//! Error definitions.
//!
//! A single error enum covers every failure the wrapper reports. Transient
//! process-table errors never reach it: the reservation probe skips them.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use super::constants::INTERRUPTED_EXIT_CODE;

/// Errors raised by the run wrapper.
#[derive(Debug, Error)]
pub enum Error {
    /// Filesystem or procfs access failed.
    #[error("i/o error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// A subprocess could not be started or waited on.
    #[error("failed to run {program}: {source}")]
    Spawn {
        /// Program name.
        program: String,
        /// Underlying error.
        #[source]
        source: io::Error,
    },

    /// The SIGINT handler could not be installed.
    #[error("failed to install interrupt handler: {0}")]
    SignalHandler(#[source] io::Error),

    /// A core window of zero cores was requested.
    #[error("core window size must be positive")]
    InvalidWindowSize,

    /// The requested window is larger than the host.
    #[error("requested {requested} contiguous cores but the host has {available}")]
    WindowTooLarge {
        /// Requested window size.
        requested: usize,
        /// Logical cores on the host.
        available: usize,
    },

    /// The caller cancelled a blocking operation or its deadline passed.
    #[error("operation cancelled")]
    Cancelled,

    /// `/proc/stat` did not contain per-core lines in the expected format.
    #[error("malformed /proc/stat: {0}")]
    MalformedProcStat(String),

    /// The suite file could not be parsed.
    #[error("invalid suite file {}: {source}", path.display())]
    SuiteFile {
        /// Suite file path.
        path: PathBuf,
        /// Parser error.
        #[source]
        source: serde_json::Error,
    },

    /// The requested suite is not defined in the suite file.
    #[error("unknown suite '{0}'")]
    UnknownSuite(String),

    /// A workload source resolved to nothing.
    #[error("no workloads found: {0}")]
    NoWorkloads(String),

    /// Report output could not be serialized.
    #[error("failed to serialize output: {0}")]
    Serialize(#[source] serde_json::Error),
}

impl Error {
    /// Wraps an I/O error with the path that caused it.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Process exit code for a run that failed with this error.
    ///
    /// A cancellation caused by SIGINT reports 130 like an interrupted
    /// subprocess; everything else reports 1.
    pub const fn exit_code(&self, interrupted: bool) -> i32 {
        match self {
            Self::Cancelled if interrupted => INTERRUPTED_EXIT_CODE,
            _ => 1,
        }
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;
