use std::time::Duration;

use mockall::mock;
use xsrun_core::Result;
use xsrun_core::affinity::{
    Backoff, CoreRange, ReservationProbe, Sleeper, TopologyProbe, UtilizationSample,
    UtilizationSampler,
};
use xsrun_core::common::CancelToken;

mock! {
    pub Probe {}
    impl ReservationProbe for Probe {
        fn reserved_ranges(&self) -> Vec<CoreRange>;
    }
}

mock! {
    pub Sampler {}
    impl UtilizationSampler for Sampler {
        fn sample(&mut self) -> Result<UtilizationSample>;
    }
}

mock! {
    pub Topology {}
    impl TopologyProbe for Topology {
        fn node_of(&self, core: usize) -> Option<usize>;
    }
}

mock! {
    pub Delay {}
    impl Backoff for Delay {
        fn next_delay(&mut self) -> Duration;
    }
}

mock! {
    pub Sleep {}
    impl Sleeper for Sleep {
        fn sleep(&mut self, duration: Duration, cancel: &CancelToken);
    }
}

/// Probe reporting the given reservations on every call.
pub fn probe_with(ranges: Vec<CoreRange>) -> MockProbe {
    let mut probe = MockProbe::new();
    let _ = probe
        .expect_reserved_ranges()
        .returning(move || ranges.clone());
    probe
}

/// Sampler returning the same sample on every call.
pub fn sampler_with(sample: UtilizationSample) -> MockSampler {
    let mut sampler = MockSampler::new();
    let _ = sampler
        .expect_sample()
        .returning(move || Ok(sample.clone()));
    sampler
}

/// Backoff that always asks for one second.
pub fn fixed_delay() -> MockDelay {
    let mut delay = MockDelay::new();
    let _ = delay
        .expect_next_delay()
        .returning(|| Duration::from_secs(1));
    delay
}

/// Sleeper that must never be called.
pub fn no_sleep() -> MockSleep {
    let mut sleeper = MockSleep::new();
    let _ = sleeper.expect_sleep().times(0);
    sleeper
}
