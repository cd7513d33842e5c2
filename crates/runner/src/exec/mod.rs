//! Subprocess plumbing.
//!
//! Launchers describe what to run with a `CommandSpec`; an `Executor` runs it.
//! The trait seam lets the CI runner and launchers be tested without spawning.

/// Structured command descriptions.
pub mod command;
/// Process execution with timeouts and interrupt forwarding.
pub mod executor;
/// SIGINT recording and process-group signalling.
pub mod signal;

pub use command::CommandSpec;
pub use executor::{Executor, ExitOutcome, SubprocessExecutor};
