//! Benchmark harness
//!
//! Produces a robust point estimate of a kernel's latency: a fixed number of
//! untimed warm-up calls, then timed calls until both a minimum invocation
//! count and a minimum cumulative duration are reached, reduced to the median.

mod clock;
mod samples;

pub use clock::{Clock, MonotonicClock};
pub use samples::{median, SampleSet};

use std::time::Duration;

/// Untimed calls made before any sample is recorded.
pub const WARMUP_INVOCATIONS: u32 = 50;
pub const DEFAULT_MIN_INVOCATIONS: u32 = 100;
pub const DEFAULT_MIN_DURATION: Duration = Duration::from_secs(1);

/// Stopping thresholds for one `measure` call.
///
/// Both thresholds are held in nanoseconds so the loop condition compares
/// like with like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HarnessConfig {
    min_invocations: u32,
    min_duration_ns: u64,
}

impl HarnessConfig {
    /// A zero invocation floor is raised to 1 since the median of nothing is undefined.
    pub fn new(min_invocations: u32, min_duration: Duration) -> Self {
        Self {
            min_invocations: min_invocations.max(1),
            min_duration_ns: u64::try_from(min_duration.as_nanos()).unwrap_or(u64::MAX),
        }
    }

    pub fn min_invocations(&self) -> u32 {
        self.min_invocations
    }

    pub fn min_duration(&self) -> Duration {
        Duration::from_nanos(self.min_duration_ns)
    }

    pub fn min_duration_ns(&self) -> u64 {
        self.min_duration_ns
    }
}

impl Default for HarnessConfig {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INVOCATIONS, DEFAULT_MIN_DURATION)
    }
}

/// Result of one harness run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Measurement {
    pub median_ns: u64,
    /// Number of timed invocations (warm-up excluded).
    pub samples: usize,
    pub total_ns: u64,
}

impl Measurement {
    pub fn median(&self) -> Duration {
        Duration::from_nanos(self.median_ns)
    }
}

/// Stateless between calls; the clock is the only injected dependency.
#[derive(Debug, Clone)]
pub struct Harness<C: Clock = MonotonicClock> {
    config: HarnessConfig,
    clock: C,
}

impl Harness<MonotonicClock> {
    pub fn new(config: HarnessConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }
}

impl<C: Clock> Harness<C> {
    pub fn with_clock(config: HarnessConfig, clock: C) -> Self {
        Self { config, clock }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Runs `kernel` through warm-up and the timed loop and returns the median.
    ///
    /// Kernel-visible state is not reset between invocations. A panic inside
    /// `kernel` unwinds straight through.
    pub fn measure<F: FnMut()>(&self, mut kernel: F) -> Measurement {
        for _ in 0..WARMUP_INVOCATIONS {
            kernel();
        }

        let mut samples = SampleSet::with_capacity(self.config.min_invocations as usize);
        while !samples.satisfies(self.config.min_invocations, self.config.min_duration_ns) {
            let start = self.clock.now_ns();
            kernel();
            let end = self.clock.now_ns();
            samples.push(end.saturating_sub(start));
        }

        let count = samples.len();
        let total_ns = samples.total_ns();
        // The loop guarantees at least one sample.
        let median_ns = samples.into_median().unwrap_or_default();

        log::trace!("harness: {count} samples, total {total_ns} ns, median {median_ns} ns");

        Measurement {
            median_ns,
            samples: count,
            total_ns,
        }
    }
}

/// Convenience wrapper over [`Harness`] with the monotonic clock.
pub fn measure<F: FnMut()>(kernel: F, min_invocations: u32, min_duration: Duration) -> Duration {
    Harness::new(HarnessConfig::new(min_invocations, min_duration))
        .measure(kernel)
        .median()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::cell::Cell;

    /// Advances by a fixed step on every reading.
    struct StepClock {
        now: Cell<u64>,
        step: u64,
    }

    impl StepClock {
        fn new(step: u64) -> Self {
            Self { now: Cell::new(0), step }
        }
    }

    impl Clock for StepClock {
        fn now_ns(&self) -> u64 {
            let t = self.now.get();
            self.now.set(t + self.step);
            t
        }
    }

    #[test]
    fn warmup_calls_are_not_recorded() {
        let calls = Cell::new(0u32);
        let harness = Harness::with_clock(HarnessConfig::new(10, Duration::from_nanos(1)), StepClock::new(5));
        let m = harness.measure(|| calls.set(calls.get() + 1));

        assert_eq!(m.samples, 10);
        assert_eq!(calls.get(), WARMUP_INVOCATIONS + 10);
    }

    #[test]
    fn duration_floor_extends_the_loop() {
        // Each timed call reads the clock twice, so one sample spans one step.
        let harness = Harness::with_clock(HarnessConfig::new(3, Duration::from_nanos(1_000)), StepClock::new(100));
        let m = harness.measure(|| {});

        assert_eq!(m.samples, 10);
        assert_eq!(m.total_ns, 1_000);
        assert_eq!(m.median_ns, 100);
    }

    #[test]
    fn count_floor_wins_when_duration_is_met_early() {
        let harness = Harness::with_clock(HarnessConfig::new(25, Duration::from_nanos(1)), StepClock::new(1_000_000));
        let m = harness.measure(|| {});

        assert_eq!(m.samples, 25);
        assert!(m.total_ns >= 1);
    }

    #[test]
    fn zero_min_invocations_is_raised_to_one() {
        let config = HarnessConfig::new(0, Duration::from_nanos(1));
        assert_eq!(config.min_invocations(), 1);
    }

    #[test]
    fn default_config_matches_documented_thresholds() {
        let config = HarnessConfig::default();
        assert_eq!(config.min_invocations(), 100);
        assert_eq!(config.min_duration_ns(), 1_000_000_000);
    }

    #[test]
    fn median_comes_from_recorded_samples() {
        // Readings alternate so sample durations are 1, 3, 5, 7, 9 ns.
        struct ScriptedClock {
            readings: Cell<usize>,
        }
        impl Clock for ScriptedClock {
            fn now_ns(&self) -> u64 {
                let i = self.readings.get();
                self.readings.set(i + 1);
                let sample = (i / 2) as u64;
                if i % 2 == 0 {
                    sample * 100
                } else {
                    sample * 100 + 2 * sample + 1
                }
            }
        }

        let harness = Harness::with_clock(
            HarnessConfig::new(5, Duration::from_nanos(1)),
            ScriptedClock { readings: Cell::new(0) },
        );
        let m = harness.measure(|| {});

        assert_eq!(m.samples, 5);
        assert_eq!(m.total_ns, 1 + 3 + 5 + 7 + 9);
        assert_eq!(m.median_ns, 5);
    }

    #[test]
    fn free_function_uses_real_clock() {
        let mut calls = 0u32;
        let median = measure(|| calls += 1, 5, Duration::from_micros(1));

        assert!(calls >= WARMUP_INVOCATIONS + 5);
        assert!(median <= Duration::from_secs(1));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn both_floors_hold_on_exit(min_inv in 1u32..200, min_ns in 1u64..50_000, step in 1u64..2_000) {
            let calls = Cell::new(0u32);
            let harness = Harness::with_clock(HarnessConfig::new(min_inv, Duration::from_nanos(min_ns)), StepClock::new(step));
            let m = harness.measure(|| calls.set(calls.get() + 1));

            prop_assert!(m.samples >= min_inv as usize);
            prop_assert!(m.total_ns >= min_ns);
            prop_assert_eq!(calls.get() as usize, WARMUP_INVOCATIONS as usize + m.samples);
            // Stops as soon as both floors are met.
            let before_last = m.total_ns - step;
            prop_assert!(m.samples == min_inv as usize || before_last < min_ns);
        }
    }
}
