//! Cancellation token for blocking loops.
//!
//! Every blocking loop in the wrapper (window search backoff, subprocess wait)
//! polls a `CancelToken`. A token fires when it is cancelled explicitly, when
//! its deadline passes, or, if it observes interrupts, once SIGINT arrived.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use crate::exec::signal;

/// Shared, cloneable cancellation signal with an optional deadline.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
    deadline: Option<Instant>,
    observe_interrupts: bool,
}

impl CancelToken {
    /// Creates a token that only fires when cancelled explicitly.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the token with an absolute deadline.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Returns the token with a deadline `timeout` from now.
    #[must_use]
    pub fn with_timeout(self, timeout: Duration) -> Self {
        self.with_deadline(Instant::now() + timeout)
    }

    /// Returns the token so that it also fires after SIGINT was received.
    ///
    /// Only meaningful once [`signal::install_interrupt_handler`] ran.
    #[must_use]
    pub const fn observing_interrupts(mut self) -> Self {
        self.observe_interrupts = true;
        self
    }

    /// Fires the token for every clone.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    /// Returns `true` once the token fired.
    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
            || self.deadline.is_some_and(|d| Instant::now() >= d)
            || (self.observe_interrupts && signal::interrupted())
    }
}
