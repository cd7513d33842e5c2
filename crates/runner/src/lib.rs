//! RTL simulation run wrapper library.
//!
//! This crate drives an external processor RTL toolchain from Rust. It provides:
//! 1. **Affinity:** An idle-core-window finder that pins emulator runs to quiet, unreserved cores.
//! 2. **Environment:** Tool home resolution and the environment exported to every subprocess.
//! 3. **Execution:** Structured command lines, session-isolated subprocesses, timeouts and interrupts.
//! 4. **Simulators:** Command construction for the `emu` and `simv` executables.
//! 5. **Workloads:** Suffix-based discovery and JSON-described CI suites.
//! 6. **CI:** Sequential suite runs with artifact collection on failure.

/// Idle-core-window finder and its probes (reservations, utilization, topology, backoff).
pub mod affinity;
/// CI suite runner and artifact collection.
pub mod ci;
/// Common types and constants (errors, defaults).
pub mod common;
/// Runner configuration (homes, emulator options, run policy).
pub mod config;
/// Tool home resolution and subprocess environment.
pub mod env;
/// Command descriptions, subprocess execution and interrupt handling.
pub mod exec;
/// Simulator launchers for `emu` and `simv`.
pub mod sim;
/// Workload discovery and CI suite definitions.
pub mod workload;

/// Crate-wide error type.
pub use crate::common::error::{Error, Result};
/// Root configuration type; use `RunnerConfig::default()` or deserialize from JSON.
pub use crate::config::RunnerConfig;
/// Blocking idle-core-window finder.
pub use crate::affinity::{CoreWindow, IdleCoreFinder};
