//! [`PulseCounter`] – pulse-stream to counts-per-minute conversion.
//!
//! Pulses arrive from an asynchronous hardware context; rate queries come
//! from the synchronous control loop.  All shared state sits behind one
//! mutex, so writes never tear and queries always observe a consistent
//! snapshot.  The raw buffer is never exposed to the polling side.
//!
//! # Estimator
//!
//! Two estimates are blended (the calibration heuristic of the original
//! Cajoe D-v1.1 deployment):
//!
//! - `instant_count` – the number of pulses younger than the rolling window
//!   (default 60 s), read directly as CPM;
//! - `short_term_cpm` – pulses accumulated since the interval started,
//!   scaled by elapsed time.
//!
//! When at least one `reading_interval` (default 5 s) has elapsed, the new
//! estimate is the mean of the two and the interval restarts.  Between
//! recomputations, queries return the last computed estimate unchanged
//! (stale-on-demand), trading up to one interval of lag for smoother
//! readings.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use radscout_hal::PulseSink;
use radscout_types::RateEstimate;

// ─────────────────────────────────────────────────────────────────────────────
// Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Tuning constants for [`PulseCounter`].  The defaults match the J305
/// tube on the Cajoe D-v1.1 board; none of them is load-bearing.
#[derive(Debug, Clone, Copy)]
pub struct PulseCounterConfig {
    /// Rolling window for the instant count.
    pub window: Duration,
    /// Accumulation interval between estimate recomputations.
    pub reading_interval: Duration,
    /// Tube sensitivity in cps/(µR/s), used for the dose-rate conversion.
    pub tube_sensitivity: f64,
}

impl Default for PulseCounterConfig {
    fn default() -> Self {
        Self {
            window: Duration::from_secs(60),
            reading_interval: Duration::from_secs(5),
            tube_sensitivity: 65.0,
        }
    }
}

/// Convert a CPM value to a dose rate in µSv/h.
///
/// `cps = cpm / 60`, `µR/s = cps / sensitivity`, then
/// `µSv/h = µR/s * 0.036 * 3600`.  Non-positive CPM maps to zero.
pub fn dose_rate_from_cpm(cpm: f64, tube_sensitivity: f64) -> f64 {
    if cpm <= 0.0 {
        return 0.0;
    }
    let cps = cpm / 60.0;
    let micro_r_per_sec = cps / tube_sensitivity;
    micro_r_per_sec * 0.036 * 3600.0
}

// ─────────────────────────────────────────────────────────────────────────────
// Internal state
// ─────────────────────────────────────────────────────────────────────────────

struct CounterState {
    /// Pulse timestamps younger than the rolling window, oldest first.
    pulses: VecDeque<Instant>,
    /// Timestamp of the most recently accepted pulse; late or duplicate
    /// arrivals are dropped against it.
    last_pulse: Option<Instant>,
    /// Pulses accepted since the interval started.
    interval_count: u64,
    interval_start: Instant,
    last_estimate: RateEstimate,
}

impl CounterState {
    fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&oldest) = self.pulses.front() {
            if now.duration_since(oldest) > window {
                self.pulses.pop_front();
            } else {
                break;
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// PulseCounter
// ─────────────────────────────────────────────────────────────────────────────

/// Thread-safe pulse-rate estimator.
///
/// `Clone` produces another handle to the same counter, so one clone can be
/// registered as the [`PulseSink`] of a pulse source while the control loop
/// polls the original.
#[derive(Clone)]
pub struct PulseCounter {
    config: PulseCounterConfig,
    state: Arc<Mutex<CounterState>>,
}

impl Default for PulseCounter {
    fn default() -> Self {
        Self::new(PulseCounterConfig::default())
    }
}

impl PulseCounter {
    pub fn new(config: PulseCounterConfig) -> Self {
        Self {
            config,
            state: Arc::new(Mutex::new(CounterState {
                pulses: VecDeque::new(),
                last_pulse: None,
                interval_count: 0,
                interval_start: Instant::now(),
                last_estimate: RateEstimate::default(),
            })),
        }
    }

    /// Record a pulse that fired at `at`.
    ///
    /// Never fails the caller: late or duplicate timestamps (`at` not newer
    /// than the last accepted pulse) are dropped silently.
    pub fn record_pulse(&self, at: Instant) {
        let mut state = self.state.lock().expect("pulse history poisoned");
        if let Some(last) = state.last_pulse
            && at <= last
        {
            return;
        }
        state.last_pulse = Some(at);
        state.pulses.push_back(at);
        state.interval_count += 1;
        state.prune(at, self.config.window);
    }

    /// Record a pulse with the current time.  Convenience for wiring code.
    pub fn record_pulse_now(&self) {
        self.record_pulse(Instant::now());
    }

    /// The current rate estimate.  See [`PulseCounter::rate_at`].
    pub fn current_rate(&self) -> RateEstimate {
        self.rate_at(Instant::now())
    }

    /// The rate estimate as of `now`.
    ///
    /// Recomputes only when a full reading interval has elapsed; otherwise
    /// returns the last computed estimate unchanged, so two queries within
    /// the same interval and with no new pulses are identical.
    pub fn rate_at(&self, now: Instant) -> RateEstimate {
        let mut state = self.state.lock().expect("pulse history poisoned");
        let elapsed = now.duration_since(state.interval_start);
        if elapsed < self.config.reading_interval {
            return state.last_estimate;
        }

        state.prune(now, self.config.window);
        let instant_count = state.pulses.len() as f64;
        let short_term_cpm = state.interval_count as f64 / elapsed.as_secs_f64() * 60.0;
        let cpm = (instant_count + short_term_cpm) / 2.0;

        state.last_estimate = RateEstimate {
            cpm,
            dose_rate: dose_rate_from_cpm(cpm, self.config.tube_sensitivity),
        };
        state.interval_count = 0;
        state.interval_start = now;
        state.last_estimate
    }

    /// Number of pulses inside the rolling window as of now, read directly
    /// as CPM.
    pub fn instant_cpm(&self) -> usize {
        self.instant_cpm_at(Instant::now())
    }

    /// Number of pulses inside the rolling window as of `now`.
    pub fn instant_cpm_at(&self, now: Instant) -> usize {
        let mut state = self.state.lock().expect("pulse history poisoned");
        state.prune(now, self.config.window);
        state.pulses.len()
    }

    /// Clear the pulse history and restart the accumulation interval for a
    /// fresh reading, e.g. at the start of a sampling dwell.  The last
    /// computed estimate is kept (stale-on-demand semantics).
    pub fn reset(&self) {
        self.reset_at(Instant::now());
    }

    /// [`PulseCounter::reset`] with an explicit timestamp.
    pub fn reset_at(&self, now: Instant) {
        let mut state = self.state.lock().expect("pulse history poisoned");
        state.pulses.clear();
        state.interval_count = 0;
        state.interval_start = now;
    }

    /// The configured tube sensitivity, exposed for reporting.
    pub fn tube_sensitivity(&self) -> f64 {
        self.config.tube_sensitivity
    }
}

impl PulseSink for PulseCounter {
    fn on_pulse(&self, at: Instant) {
        self.record_pulse(at);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> PulseCounterConfig {
        PulseCounterConfig {
            window: Duration::from_secs(60),
            reading_interval: Duration::from_millis(100),
            tube_sensitivity: 65.0,
        }
    }

    /// Emit `n` evenly spaced pulses starting just after `start`.
    fn feed_pulses(counter: &PulseCounter, start: Instant, n: u32, spacing: Duration) {
        for i in 0..n {
            counter.record_pulse(start + spacing * (i + 1));
        }
    }

    #[test]
    fn empty_history_yields_zero_rate() {
        let counter = PulseCounter::new(fast_config());
        let rate = counter.rate_at(Instant::now() + Duration::from_secs(1));
        assert_eq!(rate.cpm, 0.0);
        assert_eq!(rate.dose_rate, 0.0);
    }

    #[test]
    fn rate_is_never_negative() {
        let counter = PulseCounter::new(fast_config());
        let start = Instant::now();
        feed_pulses(&counter, start, 10, Duration::from_millis(5));
        let rate = counter.rate_at(start + Duration::from_millis(200));
        assert!(rate.cpm >= 0.0);
        assert!(rate.dose_rate >= 0.0);
    }

    #[test]
    fn stale_on_demand_within_one_interval() {
        let counter = PulseCounter::new(fast_config());
        let start = Instant::now();
        feed_pulses(&counter, start, 5, Duration::from_millis(10));

        let first = counter.rate_at(start + Duration::from_millis(150));
        // Second query inside the fresh interval, no new pulses: identical.
        let second = counter.rate_at(start + Duration::from_millis(160));
        assert_eq!(first, second);
    }

    #[test]
    fn sixty_per_minute_reads_near_sixty() {
        // One pulse per second over 5 seconds of simulated time.
        let config = PulseCounterConfig {
            reading_interval: Duration::from_secs(5),
            ..PulseCounterConfig::default()
        };
        let counter = PulseCounter::new(config);
        let start = Instant::now();
        counter.reset_at(start);
        feed_pulses(&counter, start, 5, Duration::from_secs(1));

        let rate = counter.rate_at(start + Duration::from_secs(5));
        // instant_count = 5 (window is 60 s, only 5 s of pulses exist) and
        // short_term = 5 / 5 * 60 = 60, so the blend reads low until a full
        // window has passed; after 60 s of pulses both estimators agree.
        assert!(rate.cpm > 0.0);

        let counter = PulseCounter::new(PulseCounterConfig::default());
        let start = Instant::now();
        counter.reset_at(start);
        feed_pulses(&counter, start, 60, Duration::from_secs(1));
        let rate = counter.rate_at(start + Duration::from_secs(60));
        assert!(
            (rate.cpm - 60.0).abs() <= 6.0,
            "expected 60 ± 10% CPM, got {}",
            rate.cpm
        );
    }

    #[test]
    fn late_and_duplicate_pulses_are_dropped() {
        let counter = PulseCounter::new(fast_config());
        let start = Instant::now();
        let t1 = start + Duration::from_millis(10);
        let t2 = start + Duration::from_millis(20);

        counter.record_pulse(t1);
        counter.record_pulse(t2);
        counter.record_pulse(t2); // duplicate
        counter.record_pulse(t1); // late

        assert_eq!(counter.instant_cpm_at(t2), 2);
    }

    #[test]
    fn window_prunes_old_pulses() {
        let config = PulseCounterConfig {
            window: Duration::from_millis(50),
            ..fast_config()
        };
        let counter = PulseCounter::new(config);
        let start = Instant::now();
        counter.record_pulse(start + Duration::from_millis(1));
        counter.record_pulse(start + Duration::from_millis(2));
        counter.record_pulse(start + Duration::from_millis(100));

        // The first two pulses are older than the 50 ms window by now.
        assert_eq!(counter.instant_cpm_at(start + Duration::from_millis(100)), 1);
    }

    #[test]
    fn reset_clears_history_but_keeps_last_estimate() {
        let counter = PulseCounter::new(fast_config());
        let start = Instant::now();
        feed_pulses(&counter, start, 8, Duration::from_millis(10));
        let before = counter.rate_at(start + Duration::from_millis(150));
        assert!(before.cpm > 0.0);

        counter.reset_at(start + Duration::from_millis(200));
        assert_eq!(counter.instant_cpm_at(start + Duration::from_millis(200)), 0);
        // Within the fresh interval the stale estimate is still served.
        let after = counter.rate_at(start + Duration::from_millis(250));
        assert_eq!(after, before);
    }

    #[test]
    fn dose_conversion_matches_tube_calibration() {
        // 65 cps at sensitivity 65 is exactly 1 µR/s = 129.6 µSv/h.
        let cpm = 65.0 * 60.0;
        let dose = dose_rate_from_cpm(cpm, 65.0);
        assert!((dose - 0.036 * 3600.0).abs() < 1e-9);

        assert_eq!(dose_rate_from_cpm(0.0, 65.0), 0.0);
        assert_eq!(dose_rate_from_cpm(-5.0, 65.0), 0.0);
    }

    #[test]
    fn concurrent_recording_and_queries_do_not_lose_pulses() {
        use std::thread;

        let counter = PulseCounter::new(PulseCounterConfig::default());
        let writer = counter.clone();
        let base = Instant::now();

        let handle = thread::spawn(move || {
            for i in 0..1000u32 {
                writer.record_pulse(base + Duration::from_micros(u64::from(i) + 1));
            }
        });
        // Query concurrently from this thread.
        for _ in 0..100 {
            let _ = counter.current_rate();
        }
        handle.join().unwrap();

        assert_eq!(counter.instant_cpm_at(base + Duration::from_millis(2)), 1000);
    }

    #[test]
    fn sink_impl_forwards_to_record_pulse() {
        let counter = PulseCounter::new(fast_config());
        let start = Instant::now();
        let sink: &dyn PulseSink = &counter;
        sink.on_pulse(start + Duration::from_millis(1));
        assert_eq!(counter.instant_cpm_at(start + Duration::from_millis(1)), 1);
    }
}
