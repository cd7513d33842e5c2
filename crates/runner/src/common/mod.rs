//! Common utilities and types used throughout the run wrapper.
//!
//! This module provides the building blocks shared by every component. It includes:
//! 1. **Cancellation:** A cloneable token with deadline and interrupt awareness.
//! 2. **Constants:** Default paths, thresholds and limits taken by the launchers and the finder.
//! 3. **Error Handling:** The crate-wide `Error` enum and `Result` alias.

/// Cancellation token for blocking loops.
pub mod cancel;

/// Default values and fixed thresholds.
pub mod constants;

/// Error types.
pub mod error;

pub use cancel::CancelToken;
pub use error::{Error, Result};
