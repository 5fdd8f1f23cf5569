//! In-process rover simulation for headless tests and demos.
//!
//! [`SimRover`] couples three pieces behind one shared state:
//!
//! - a [`SimLocomotion`] driver that records every gait command and
//!   dead-reckons a simulated pose,
//! - a [`SyntheticField`] that maps that pose to a "true" radiation rate
//!   (background plus a single point source with `1/(1 + d/falloff)`
//!   falloff), and
//! - a [`SimPulseSource`] background thread emitting evenly spaced pulses at
//!   the field rate, exactly like a real tube line would.
//!
//! This lets the full RadScout stack (counter, collector, scanner, seeker)
//! run end-to-end without hardware.
//!
//! # Example
//!
//! ```rust
//! use radscout_hal::sim::{SimRover, SimRoverConfig};
//! use radscout_hal::Locomotion;
//! use radscout_types::GaitCommand;
//!
//! let rover = SimRover::new(SimRoverConfig::default());
//! let mut base = rover.locomotion();
//! base.execute(GaitCommand::Forward, 2, 60).expect("sim gait must succeed");
//! assert_eq!(rover.sim_pose().0, 20.0);
//! ```

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use rand::Rng;
use tracing::debug;

use radscout_types::{GaitCommand, RadError};

use crate::locomotion::Locomotion;
use crate::pulse::{PulseSink, PulseSource};

// ────────────────────────────────────────────────────────────────────────────
// Synthetic radiation field
// ────────────────────────────────────────────────────────────────────────────

/// A synthetic radiation field: uniform background plus one point source.
///
/// The rate at distance `d` from the source is
/// `background_cpm + source_strength / (1 + d / falloff_cm)`, optionally
/// perturbed by uniform noise of ±`noise_fraction`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyntheticField {
    /// Source X position (centimetres).
    pub source_x: f64,
    /// Source Y position (centimetres).
    pub source_y: f64,
    /// Background rate far from the source (CPM).
    pub background_cpm: f64,
    /// Peak contribution of the source at zero distance (CPM).
    pub source_strength: f64,
    /// Distance at which the source contribution halves once (centimetres).
    pub falloff_cm: f64,
    /// Relative measurement noise; 0 disables noise.
    pub noise_fraction: f64,
}

impl Default for SyntheticField {
    fn default() -> Self {
        Self {
            source_x: 50.0,
            source_y: 50.0,
            background_cpm: 20.0,
            source_strength: 1000.0,
            falloff_cm: 10.0,
            noise_fraction: 0.1,
        }
    }
}

impl SyntheticField {
    /// Noise-free rate at `(x, y)` in CPM.
    pub fn cpm_at(&self, x: f64, y: f64) -> f64 {
        let d = ((x - self.source_x).powi(2) + (y - self.source_y).powi(2)).sqrt();
        self.background_cpm + self.source_strength / (1.0 + d / self.falloff_cm)
    }

    /// Rate at `(x, y)` with the configured noise applied.
    pub fn sampled_cpm_at(&self, x: f64, y: f64, rng: &mut impl Rng) -> f64 {
        let cpm = self.cpm_at(x, y);
        if self.noise_fraction <= 0.0 {
            return cpm;
        }
        let jitter = rng.gen_range(-self.noise_fraction..self.noise_fraction);
        (cpm * (1.0 + jitter)).max(0.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Shared simulation state
// ────────────────────────────────────────────────────────────────────────────

struct RoverState {
    x: f64,
    y: f64,
    heading_deg: f64,
    commands: Vec<(GaitCommand, u32)>,
}

struct Shared {
    state: Mutex<RoverState>,
    field: SyntheticField,
    step_size_cm: f64,
    gait_latency: Duration,
    /// Current true rate at the sim pose, in milli-CPM, read by the pulse
    /// thread without taking the pose lock.
    cpm_millis: AtomicU64,
    stop: AtomicBool,
    executed: AtomicUsize,
    fail_after: Option<usize>,
}

impl Shared {
    fn refresh_rate(&self, x: f64, y: f64) {
        let cpm = if self.field.noise_fraction > 0.0 {
            self.field.sampled_cpm_at(x, y, &mut rand::thread_rng())
        } else {
            self.field.cpm_at(x, y)
        };
        self.cpm_millis
            .store((cpm.max(0.0) * 1000.0) as u64, Ordering::SeqCst);
    }
}

/// Configuration for [`SimRover`].
#[derive(Debug, Clone)]
pub struct SimRoverConfig {
    /// Centimetres travelled per forward/backward gait step.
    pub step_size_cm: f64,
    /// Simulated blocking time per gait command.
    pub gait_latency: Duration,
    /// The radiation field the rover moves through.
    pub field: SyntheticField,
    /// Starting pose `(x, y, heading_deg)`.
    pub start_pose: (f64, f64, f64),
    /// Fail the Nth `execute` call (0-based) with an actuator fault, for
    /// abort-path tests.  `None` never fails.
    pub fail_after: Option<usize>,
}

impl Default for SimRoverConfig {
    fn default() -> Self {
        Self {
            step_size_cm: 10.0,
            gait_latency: Duration::ZERO,
            field: SyntheticField::default(),
            start_pose: (0.0, 0.0, 0.0),
            fail_after: None,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimRover
// ────────────────────────────────────────────────────────────────────────────

/// Handle to the shared rover simulation.  Cheap to clone; hand out
/// [`SimRover::locomotion`] and [`SimRover::pulse_source`] to wire the
/// stack together.
#[derive(Clone)]
pub struct SimRover {
    shared: Arc<Shared>,
}

impl SimRover {
    /// Build a rover simulation from `config`.
    pub fn new(config: SimRoverConfig) -> Self {
        let (x, y, heading) = config.start_pose;
        let shared = Arc::new(Shared {
            state: Mutex::new(RoverState {
                x,
                y,
                heading_deg: heading.rem_euclid(360.0),
                commands: Vec::new(),
            }),
            field: config.field,
            step_size_cm: config.step_size_cm,
            gait_latency: config.gait_latency,
            cpm_millis: AtomicU64::new(0),
            stop: AtomicBool::new(false),
            executed: AtomicUsize::new(0),
            fail_after: config.fail_after,
        });
        shared.refresh_rate(x, y);
        Self { shared }
    }

    /// A locomotion driver backed by this simulation.
    pub fn locomotion(&self) -> SimLocomotion {
        SimLocomotion {
            shared: self.shared.clone(),
        }
    }

    /// A pulse source backed by this simulation.
    pub fn pulse_source(&self) -> SimPulseSource {
        SimPulseSource {
            shared: self.shared.clone(),
            handle: None,
        }
    }

    /// The noise-free field rate at the current sim pose (CPM).
    pub fn true_cpm(&self) -> f64 {
        let state = self.shared.state.lock().expect("sim state poisoned");
        self.shared.field.cpm_at(state.x, state.y)
    }

    /// The simulation's own dead-reckoned pose `(x, y, heading_deg)`.
    pub fn sim_pose(&self) -> (f64, f64, f64) {
        let state = self.shared.state.lock().expect("sim state poisoned");
        (state.x, state.y, state.heading_deg)
    }

    /// Every gait command executed so far, in order.
    pub fn commands(&self) -> Vec<(GaitCommand, u32)> {
        let state = self.shared.state.lock().expect("sim state poisoned");
        state.commands.clone()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimLocomotion
// ────────────────────────────────────────────────────────────────────────────

/// Simulated gait driver.  Records commands, updates the sim pose, and keeps
/// the pulse rate in step with the field.
pub struct SimLocomotion {
    shared: Arc<Shared>,
}

impl Locomotion for SimLocomotion {
    fn id(&self) -> &str {
        "sim"
    }

    fn execute(&mut self, command: GaitCommand, steps: u32, _speed: u8) -> Result<(), RadError> {
        let call = self.shared.executed.fetch_add(1, Ordering::SeqCst);
        if self.shared.fail_after == Some(call) {
            return Err(RadError::ActuatorFault {
                command: command.to_string(),
                details: "scripted sim fault".to_string(),
            });
        }

        let (x, y) = {
            let mut state = self.shared.state.lock().expect("sim state poisoned");
            let distance = f64::from(steps) * self.shared.step_size_cm;
            match command {
                GaitCommand::Forward => {
                    state.x += distance * state.heading_deg.to_radians().cos();
                    state.y += distance * state.heading_deg.to_radians().sin();
                }
                GaitCommand::Backward => {
                    state.x -= distance * state.heading_deg.to_radians().cos();
                    state.y -= distance * state.heading_deg.to_radians().sin();
                }
                GaitCommand::TurnLeft => {
                    state.heading_deg =
                        (state.heading_deg + 45.0 * f64::from(steps)).rem_euclid(360.0);
                }
                GaitCommand::TurnRight => {
                    state.heading_deg =
                        (state.heading_deg - 45.0 * f64::from(steps)).rem_euclid(360.0);
                }
                GaitCommand::Stand | GaitCommand::Sit => {}
            }
            state.commands.push((command, steps));
            (state.x, state.y)
        };

        self.shared.refresh_rate(x, y);
        debug!(%command, steps, x, y, "sim gait executed");

        if !self.shared.gait_latency.is_zero() {
            thread::sleep(self.shared.gait_latency);
        }
        Ok(())
    }
}

// ────────────────────────────────────────────────────────────────────────────
// SimPulseSource
// ────────────────────────────────────────────────────────────────────────────

/// Simulated pulse line: a background thread emitting evenly spaced pulses
/// at the field rate for the current sim pose.
pub struct SimPulseSource {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

impl PulseSource for SimPulseSource {
    fn id(&self) -> &str {
        "sim"
    }

    fn start(&mut self, sink: Arc<dyn PulseSink>) -> Result<(), RadError> {
        if self.handle.is_some() {
            return Err(RadError::PulseSource("already started".to_string()));
        }
        self.shared.stop.store(false, Ordering::SeqCst);

        let shared = self.shared.clone();
        self.handle = Some(thread::spawn(move || {
            let mut next_due = Instant::now();
            loop {
                if shared.stop.load(Ordering::SeqCst) {
                    break;
                }
                let cpm = shared.cpm_millis.load(Ordering::SeqCst) as f64 / 1000.0;
                if cpm <= 0.0 {
                    thread::sleep(Duration::from_millis(5));
                    next_due = Instant::now();
                    continue;
                }
                let period = Duration::from_secs_f64(60.0 / cpm);
                let now = Instant::now();
                if now >= next_due {
                    sink.on_pulse(now);
                    next_due += period;
                    // Re-anchor after a rate change left the schedule behind.
                    if next_due < now {
                        next_due = now + period;
                    }
                } else {
                    thread::sleep((next_due - now).min(Duration::from_millis(5)));
                }
            }
        }));
        Ok(())
    }

    fn stop(&mut self) {
        self.shared.stop.store(true, Ordering::SeqCst);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SimPulseSource {
    fn drop(&mut self) {
        self.stop();
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
