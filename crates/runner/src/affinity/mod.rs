//! Core affinity for pinned simulation runs.
//!
//! This module finds a window of idle CPU cores for NUMA-pinned emulator runs. It provides:
//! 1. **Reservations:** A probe inferring cores claimed by sibling `numactl` runs.
//! 2. **Utilization:** A sampler producing one synchronized per-core snapshot.
//! 3. **Topology:** A core-to-node map with a two-node bisection fallback.
//! 4. **Backoff:** Seedable random delays and cancellable sleeping.
//! 5. **Finder:** The polling search combining the above.

/// Retry delays and cancellable sleeping.
pub mod backoff;
/// The polling window search.
pub mod finder;
/// Core reservations inferred from the process table.
pub mod reservation;
/// NUMA node lookup.
pub mod topology;
/// Per-core utilization sampling.
pub mod usage;
/// Windows, ranges and the selection rule.
pub mod window;

pub use backoff::{Backoff, RandomBackoff, Sleeper, ThreadSleeper};
pub use finder::IdleCoreFinder;
pub use reservation::{ProcessEntry, ProcessTableProbe, ReservationProbe};
pub use topology::{SysfsTopology, TopologyProbe, UnknownTopology};
pub use usage::{ProcStatSampler, UtilizationSample, UtilizationSampler};
pub use window::{CoreRange, CoreWindow};
