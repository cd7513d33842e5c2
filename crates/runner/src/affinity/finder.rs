//! Idle-core-window finder.
//!
//! The finder polls until it can hand out `n` contiguous cores that no sibling
//! run has claimed and that the host is not busy on. Each attempt:
//! 1. **Reservations:** asks the reservation probe which ranges are taken.
//! 2. **Utilization:** takes one synchronized per-core sample.
//! 3. **Selection:** scans aligned windows of `n` cores, first acceptable wins.
//! 4. **Backoff:** otherwise logs the current utilization and sleeps a random delay.
//!
//! All four capabilities are injected, so a run against mocks is deterministic.

use std::fmt;

use tracing::info;

use super::backoff::{Backoff, RandomBackoff, Sleeper, ThreadSleeper};
use super::reservation::{ProcessTableProbe, ReservationProbe};
use super::topology::{SysfsTopology, TopologyProbe};
use super::usage::{ProcStatSampler, UtilizationSampler};
use super::window::{CoreWindow, bisect_node, select_window};
use crate::common::{CancelToken, Error, Result};

/// Blocking search for an idle, unreserved window of cores.
pub struct IdleCoreFinder {
    probe: Box<dyn ReservationProbe>,
    sampler: Box<dyn UtilizationSampler>,
    topology: Box<dyn TopologyProbe>,
    backoff: Box<dyn Backoff>,
    sleeper: Box<dyn Sleeper>,
}

impl fmt::Debug for IdleCoreFinder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdleCoreFinder").finish_non_exhaustive()
    }
}

impl IdleCoreFinder {
    /// Creates a finder from explicit capabilities.
    pub fn new(
        probe: Box<dyn ReservationProbe>,
        sampler: Box<dyn UtilizationSampler>,
        topology: Box<dyn TopologyProbe>,
        backoff: Box<dyn Backoff>,
        sleeper: Box<dyn Sleeper>,
    ) -> Self {
        Self {
            probe,
            sampler,
            topology,
            backoff,
            sleeper,
        }
    }

    /// Finder over the live host: `/proc` process table and `/proc/stat`,
    /// sysfs NUMA topology, random 1-60 s backoff.
    pub fn system() -> Self {
        Self::new(
            Box::new(ProcessTableProbe::new()),
            Box::new(ProcStatSampler::new()),
            Box::new(SysfsTopology::load()),
            Box::new(RandomBackoff::new()),
            Box::new(ThreadSleeper),
        )
    }

    /// Runs one search attempt without sleeping.
    ///
    /// # Errors
    ///
    /// `InvalidWindowSize` for `n == 0`, `WindowTooLarge` if the host has
    /// fewer than `n` cores, or the sampler's error.
    pub fn try_find(&mut self, n: usize) -> Result<Option<CoreWindow>> {
        if n == 0 {
            return Err(Error::InvalidWindowSize);
        }
        let reserved = self.probe.reserved_ranges();
        let sample = self.sampler.sample()?;
        let total = sample.len();
        if n > total {
            return Err(Error::WindowTooLarge {
                requested: n,
                available: total,
            });
        }
        let Some(start) = select_window(n, &sample, &reserved) else {
            info!("No free {n} cores found. CPU usage: {sample}");
            return Ok(None);
        };
        let node = self
            .topology
            .node_of(start)
            .unwrap_or_else(|| bisect_node(start, total));
        Ok(Some(CoreWindow {
            node,
            start,
            end: start + n - 1,
        }))
    }

    /// Blocks until a window of `n` cores is found or `cancel` fires.
    ///
    /// # Errors
    ///
    /// `Cancelled` once the token fires, otherwise as [`Self::try_find`].
    pub fn find(&mut self, n: usize, cancel: &CancelToken) -> Result<CoreWindow> {
        loop {
            if cancel.is_cancelled() {
                return Err(Error::Cancelled);
            }
            if let Some(window) = self.try_find(n)? {
                info!(%window, "selected core window");
                return Ok(window);
            }
            let delay = self.backoff.next_delay();
            self.sleeper.sleep(delay, cancel);
        }
    }
}
