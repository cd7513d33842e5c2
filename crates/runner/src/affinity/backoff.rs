//! Retry delays and cancellable sleeping.

use std::thread;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::common::CancelToken;
use crate::common::constants::{BACKOFF_MAX, BACKOFF_MIN, POLL_SLICE};

/// Produces the delay before the next search attempt.
pub trait Backoff {
    /// Next delay.
    fn next_delay(&mut self) -> Duration;
}

/// Suspends the caller between attempts.
pub trait Sleeper {
    /// Sleeps for `duration`, returning early once `cancel` fires.
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken);
}

/// Uniformly random delay between two bounds.
#[derive(Debug, Clone)]
pub struct RandomBackoff<R = StdRng> {
    rng: R,
    min: Duration,
    max: Duration,
}

impl RandomBackoff<StdRng> {
    /// Entropy-seeded backoff between 1 and 60 seconds.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_entropy(), BACKOFF_MIN, BACKOFF_MAX)
    }

    /// Deterministic backoff between 1 and 60 seconds.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), BACKOFF_MIN, BACKOFF_MAX)
    }
}

impl Default for RandomBackoff<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> RandomBackoff<R> {
    /// Backoff drawing from `rng` within `[min, max]`.
    pub fn with_rng(rng: R, min: Duration, max: Duration) -> Self {
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self { rng, min, max }
    }
}

impl<R: Rng> Backoff for RandomBackoff<R> {
    fn next_delay(&mut self) -> Duration {
        Duration::from_secs_f64(
            self.rng
                .gen_range(self.min.as_secs_f64()..=self.max.as_secs_f64()),
        )
    }
}

/// Sleeps on the current thread in short slices, checking the token between slices.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThreadSleeper;

impl Sleeper for ThreadSleeper {
    fn sleep(&mut self, duration: Duration, cancel: &CancelToken) {
        let until = Instant::now() + duration;
        while !cancel.is_cancelled() {
            let left = until.saturating_duration_since(Instant::now());
            if left.is_zero() {
                break;
            }
            thread::sleep(left.min(POLL_SLICE));
        }
    }
}
