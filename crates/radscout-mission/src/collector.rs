//! [`SampleCollector`] – timed sampling dwell at a pose.
//!
//! A dwell resets the counter's pulse history (so prior motion does not
//! contaminate the reading), polls the rate at a fixed cadence for the
//! requested duration, and averages the polled values into one [`Sample`].
//! Averaging over the dwell suppresses single-poll noise; the pose is
//! snapshotted into the sample, and the sample is appended to the map,
//! which keeps the running maximum up to date.

use std::thread;
use std::time::{Duration, Instant};

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use radscout_perception::{PulseCounter, RadiationMap};
use radscout_types::{Pose, Sample};

/// Default poll cadence during a dwell (1 Hz).
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Collects one aggregated radiation sample per dwell.  Never fails: a
/// zero-pulse dwell yields a valid zero-rate sample.
#[derive(Debug, Clone)]
pub struct SampleCollector {
    poll_interval: Duration,
}

impl Default for SampleCollector {
    fn default() -> Self {
        Self::new(DEFAULT_POLL_INTERVAL)
    }
}

impl SampleCollector {
    /// Create a collector polling at `poll_interval`.  Tests shorten the
    /// cadence to keep dwells in the millisecond range.
    pub fn new(poll_interval: Duration) -> Self {
        Self { poll_interval }
    }

    /// Dwell for `duration` at `pose`, polling `counter`, and append the
    /// aggregated sample to `map`.
    ///
    /// At least one poll always happens, so a zero `duration` still yields
    /// a valid sample.
    pub fn collect(
        &self,
        duration: Duration,
        counter: &PulseCounter,
        pose: Pose,
        map: &mut RadiationMap,
    ) -> Sample {
        counter.reset();

        let start = Instant::now();
        let mut cpm_readings = Vec::new();
        let mut dose_readings = Vec::new();

        // Always polls at least once; the final sleep is clamped to the time
        // left so the dwell never overruns `duration` by a poll period.
        loop {
            let rate = counter.current_rate();
            cpm_readings.push(rate.cpm);
            dose_readings.push(rate.dose_rate);

            let remaining = duration.saturating_sub(start.elapsed());
            if remaining.is_zero() {
                break;
            }
            thread::sleep(self.poll_interval.min(remaining));
        }

        let n = cpm_readings.len() as f64;
        let cpm = cpm_readings.iter().sum::<f64>() / n;
        let dose_rate = dose_readings.iter().sum::<f64>() / n;

        let sample = Sample {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            pose,
            cpm,
            dose_rate,
            raw_readings: cpm_readings,
        };
        info!(
            cpm,
            dose_rate,
            polls = sample.raw_readings.len(),
            x = pose.x,
            y = pose.y,
            "sample collected"
        );
        map.add(sample.clone());
        sample
    }
}
