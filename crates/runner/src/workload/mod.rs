//! Workload selection.
//!
//! This module decides which files a run or a CI suite executes. It provides:
//! 1. **Discovery:** Recursive and flat directory scans filtered by file suffix.
//! 2. **Suites:** JSON-defined, ordered workload sources with variable expansion.

/// Suffix-based file discovery.
pub mod discover;
/// Suite file format and resolution.
pub mod suite;

pub use discover::{find_files_with_suffix, list_dir_with_suffix};
pub use suite::{Suite, SuiteFile, SuiteSource};
