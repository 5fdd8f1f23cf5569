//! [`SourceSeeker`] – discrete gradient ascent toward the local maximum.
//!
//! The seeker is a small state machine.  From the current cell it probes the
//! four cardinal neighbours (step forward, sample, step back, rotate right to
//! the next heading; a final right turn after the fourth probe completes a
//! full rotation and restores the heading).  If the best probe strictly beat
//! the running best rate, the seeker turns to that heading and advances; if
//! no probe improved, the current cell is the local maximum and the search
//! has converged.
//!
//! Every probe is a full sampling dwell, so the whole search trail ends up in
//! the radiation map.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use radscout_perception::{PulseCounter, RadiationMap};
use radscout_types::{GaitCommand, Pose, RadError};

use crate::collector::SampleCollector;
use crate::drive::{MotionController, QUARTER_TURN_STEPS};

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeekTermination {
    /// No neighbour beat the current cell; the rover sits on the local
    /// maximum.
    Converged,
    /// The iteration budget ran out before convergence.
    BudgetExhausted,
    /// The stop signal was raised mid-search.
    Cancelled,
}

/// Summary of a finished search.
#[derive(Debug, Clone, PartialEq)]
pub struct SeekReport {
    pub termination: SeekTermination,
    /// Completed advances toward the source.
    pub iterations: u32,
    /// Best rate seen at a cell the rover occupied (CPM).
    pub best_cpm: f64,
    /// Dead-reckoned pose at the end of the search.
    pub final_pose: Pose,
    /// Rate at each occupied cell in order, starting with the baseline.
    /// Strictly increasing by construction.
    pub climb: Vec<f64>,
}

/// One winning probe: which quarter-turn heading it was taken at, and the
/// rate measured there.
#[derive(Debug, Clone, Copy)]
struct Probe {
    quarter: u32,
    cpm: f64,
}

/// Search state.  `Probing` sweeps the four neighbours, `Evaluating` decides
/// whether the best probe beat the current cell, `Advancing` carries the
/// winning probe to move toward, and `Converged` is terminal.
#[derive(Debug, Clone, Copy)]
enum SeekState {
    Probing,
    Evaluating { best: Option<Probe> },
    Advancing { probe: Probe },
    Converged,
}

/// Gradient-ascent search for the strongest nearby radiation source.
#[derive(Debug, Clone, Copy)]
pub struct SourceSeeker {
    /// Maximum number of advances before giving up.
    pub max_iterations: u32,
    /// Sampling dwell for the initial baseline.
    pub baseline_dwell: Duration,
    /// Sampling dwell at each probed neighbour.
    pub probe_dwell: Duration,
    /// Forward gait steps per advance.
    pub advance_steps: u32,
}

impl Default for SourceSeeker {
    fn default() -> Self {
        Self {
            max_iterations: 15,
            baseline_dwell: Duration::from_secs(5),
            probe_dwell: Duration::from_secs(1),
            advance_steps: 2,
        }
    }
}

impl SourceSeeker {
    /// Run the search from the rover's current pose.
    ///
    /// # Errors
    ///
    /// Propagates the first [`RadError::ActuatorFault`]; samples collected
    /// before the fault remain valid in `map`.
    pub fn seek(
        &self,
        drive: &mut MotionController,
        collector: &SampleCollector,
        counter: &PulseCounter,
        map: &mut RadiationMap,
        cancel: &AtomicBool,
    ) -> Result<SeekReport, RadError> {
        if cancel.load(Ordering::SeqCst) {
            return Ok(SeekReport {
                termination: SeekTermination::Cancelled,
                iterations: 0,
                best_cpm: 0.0,
                final_pose: drive.pose(),
                climb: Vec::new(),
            });
        }

        let baseline = collector.collect(self.baseline_dwell, counter, drive.pose(), map);
        info!(cpm = baseline.cpm, "seek baseline established");

        let mut best_cpm = baseline.cpm;
        let mut climb = vec![baseline.cpm];
        let mut iterations = 0u32;
        let mut state = SeekState::Probing;

        loop {
            state = match state {
                SeekState::Probing => {
                    if iterations >= self.max_iterations {
                        warn!(iterations, "seek budget exhausted");
                        return Ok(self.report(
                            SeekTermination::BudgetExhausted,
                            iterations,
                            best_cpm,
                            drive.pose(),
                            climb,
                        ));
                    }

                    let mut best: Option<Probe> = None;
                    for quarter in 0..4 {
                        if cancel.load(Ordering::SeqCst) {
                            warn!(iterations, "seek cancelled");
                            return Ok(self.report(
                                SeekTermination::Cancelled,
                                iterations,
                                best_cpm,
                                drive.pose(),
                                climb,
                            ));
                        }
                        if quarter > 0 {
                            drive.turn_right_90()?;
                        }
                        drive.move_and_track(GaitCommand::Forward, 1)?;
                        let probe =
                            collector.collect(self.probe_dwell, counter, drive.pose(), map);
                        drive.move_and_track(GaitCommand::Backward, 1)?;

                        let threshold = best.map_or(best_cpm, |p| p.cpm);
                        if probe.cpm > threshold {
                            best = Some(Probe {
                                quarter,
                                cpm: probe.cpm,
                            });
                        }
                    }
                    // Fourth right turn closes the full rotation and restores
                    // the heading the probing round started from.
                    drive.turn_right_90()?;

                    SeekState::Evaluating { best }
                }

                SeekState::Evaluating { best } => match best {
                    Some(probe) => SeekState::Advancing { probe },
                    None => SeekState::Converged,
                },

                SeekState::Advancing { probe } => {
                    if probe.quarter > 0 {
                        drive.move_and_track(
                            GaitCommand::TurnRight,
                            QUARTER_TURN_STEPS * probe.quarter,
                        )?;
                    }
                    drive.move_and_track(GaitCommand::Forward, self.advance_steps)?;
                    best_cpm = probe.cpm;
                    climb.push(probe.cpm);
                    iterations += 1;
                    let pose = drive.pose();
                    info!(
                        iterations,
                        cpm = probe.cpm,
                        x = pose.x,
                        y = pose.y,
                        "advanced toward source"
                    );
                    SeekState::Probing
                }

                SeekState::Converged => {
                    info!(iterations, best_cpm, "seek converged on local maximum");
                    return Ok(self.report(
                        SeekTermination::Converged,
                        iterations,
                        best_cpm,
                        drive.pose(),
                        climb,
                    ));
                }
            };
        }
    }

    fn report(
        &self,
        termination: SeekTermination,
        iterations: u32,
        best_cpm: f64,
        final_pose: Pose,
        climb: Vec<f64>,
    ) -> SeekReport {
        SeekReport {
            termination,
            iterations,
            best_cpm,
            final_pose,
            climb,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use radscout_hal::pulse::PulseSource;
    use radscout_hal::sim::{SimRover, SimRoverConfig, SyntheticField};
    use radscout_perception::{PoseTracker, PulseCounterConfig};
    use std::sync::Arc;

    fn dead_field() -> SyntheticField {
        SyntheticField {
            background_cpm: 0.0,
            source_strength: 0.0,
            noise_fraction: 0.0,
            ..SyntheticField::default()
        }
    }

    fn fast_seeker() -> SourceSeeker {
        SourceSeeker {
            max_iterations: 5,
            baseline_dwell: Duration::from_millis(10),
            probe_dwell: Duration::from_millis(5),
            advance_steps: 2,
        }
    }

    fn rig(config: SimRoverConfig) -> (SimRover, MotionController, SampleCollector, PulseCounter) {
        let rover = SimRover::new(config);
        let drive =
            MotionController::new(Box::new(rover.locomotion()), PoseTracker::default(), 60);
        let collector = SampleCollector::new(Duration::from_millis(2));
        let counter = PulseCounter::new(PulseCounterConfig {
            reading_interval: Duration::from_millis(5),
            ..PulseCounterConfig::default()
        });
        (rover, drive, collector, counter)
    }

    #[test]
    fn flat_field_converges_in_place() {
        let (_rover, mut drive, collector, counter) = rig(SimRoverConfig {
            field: dead_field(),
            ..SimRoverConfig::default()
        });
        let mut map = RadiationMap::default();
        let cancel = AtomicBool::new(false);

        let report = fast_seeker()
            .seek(&mut drive, &collector, &counter, &mut map, &cancel)
            .unwrap();

        assert_eq!(report.termination, SeekTermination::Converged);
        assert_eq!(report.iterations, 0);
        assert_eq!(report.climb, vec![0.0]);
        // Baseline plus four probes all land in the map.
        assert_eq!(map.len(), 5);
        // Probing restores the pose: back where it started, facing the same
        // way after the closing right turn.
        assert_eq!(report.final_pose, Pose::default());
    }

    #[test]
    fn zero_budget_stops_after_the_baseline() {
        let (_rover, mut drive, collector, counter) = rig(SimRoverConfig {
            field: dead_field(),
            ..SimRoverConfig::default()
        });
        let mut map = RadiationMap::default();
        let cancel = AtomicBool::new(false);

        let seeker = SourceSeeker {
            max_iterations: 0,
            ..fast_seeker()
        };
        let report = seeker
            .seek(&mut drive, &collector, &counter, &mut map, &cancel)
            .unwrap();

        assert_eq!(report.termination, SeekTermination::BudgetExhausted);
        assert_eq!(report.iterations, 0);
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn preset_cancellation_collects_nothing() {
        let (_rover, mut drive, collector, counter) = rig(SimRoverConfig {
            field: dead_field(),
            ..SimRoverConfig::default()
        });
        let mut map = RadiationMap::default();
        let cancel = AtomicBool::new(true);

        let report = fast_seeker()
            .seek(&mut drive, &collector, &counter, &mut map, &cancel)
            .unwrap();

        assert_eq!(report.termination, SeekTermination::Cancelled);
        assert!(report.climb.is_empty());
        assert!(map.is_empty());
    }

    #[test]
    fn actuator_fault_aborts_and_keeps_prior_samples() {
        // Call 0 is the first probe's forward step; call 1, the backward
        // step, fails.
        let (_rover, mut drive, collector, counter) = rig(SimRoverConfig {
            field: dead_field(),
            fail_after: Some(1),
            ..SimRoverConfig::default()
        });
        let mut map = RadiationMap::default();
        let cancel = AtomicBool::new(false);

        let err = fast_seeker()
            .seek(&mut drive, &collector, &counter, &mut map, &cancel)
            .unwrap_err();

        assert!(matches!(err, RadError::ActuatorFault { .. }));
        // Baseline and the first probe were stored before the fault.
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn seek_climbs_toward_a_live_source() {
        // Source 40 cm ahead on the +X axis, no noise, rate hot enough that
        // short dwells still see a clear gradient.
        let (rover, mut drive, _, _) = rig(SimRoverConfig {
            field: SyntheticField {
                source_x: 40.0,
                source_y: 0.0,
                background_cpm: 0.0,
                source_strength: 24_000.0,
                falloff_cm: 10.0,
                noise_fraction: 0.0,
            },
            ..SimRoverConfig::default()
        });
        let counter = PulseCounter::new(PulseCounterConfig {
            reading_interval: Duration::from_millis(20),
            ..PulseCounterConfig::default()
        });
        let collector = SampleCollector::new(Duration::from_millis(10));
        let mut source = rover.pulse_source();
        source.start(Arc::new(counter.clone())).unwrap();

        let mut map = RadiationMap::default();
        let cancel = AtomicBool::new(false);
        let seeker = SourceSeeker {
            max_iterations: 3,
            baseline_dwell: Duration::from_millis(100),
            probe_dwell: Duration::from_millis(100),
            advance_steps: 2,
        };
        let report = seeker
            .seek(&mut drive, &collector, &counter, &mut map, &cancel)
            .unwrap();
        source.stop();

        assert!(matches!(
            report.termination,
            SeekTermination::Converged | SeekTermination::BudgetExhausted
        ));
        assert!(
            report.climb.len() >= 2,
            "expected at least one advance, climb = {:?}",
            report.climb
        );
        assert!(
            report.climb.windows(2).all(|w| w[1] > w[0]),
            "climb must be strictly increasing: {:?}",
            report.climb
        );
        // Every advance moves the rover closer to the source.
        let d = |p: Pose| ((p.x - 40.0).powi(2) + p.y.powi(2)).sqrt();
        assert!(d(report.final_pose) < 40.0);
    }
}
