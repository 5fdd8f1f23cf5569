//! [`PoseTracker`] – dead reckoning from executed gait commands.
//!
//! There is no external positional correction on the crawler, so the pose
//! is reconstructed purely from the commands the actuator has completed:
//! each forward/backward step covers a calibrated distance along the
//! current heading, and each turn step rotates the heading by 45°.
//!
//! The tracker is a single-owner, single-threaded state machine; the
//! mission layer applies an update only after the actuator reports
//! completion, so the pose always reflects completed motion.

use radscout_types::{GaitCommand, Pose, normalize_heading};

/// Degrees of rotation per turn step of the crawler gait.
pub const DEGREES_PER_TURN_STEP: f64 = 45.0;

/// Default centimetres covered per forward/backward gait step.
pub const DEFAULT_STEP_SIZE_CM: f64 = 10.0;

/// Dead-reckons the robot pose from completed movement commands.
#[derive(Debug, Clone)]
pub struct PoseTracker {
    pose: Pose,
    step_size_cm: f64,
}

impl Default for PoseTracker {
    fn default() -> Self {
        Self::new(DEFAULT_STEP_SIZE_CM)
    }
}

impl PoseTracker {
    /// Create a tracker at the origin with the given step calibration.
    pub fn new(step_size_cm: f64) -> Self {
        Self {
            pose: Pose::default(),
            step_size_cm,
        }
    }

    /// Create a tracker starting from `pose`.
    pub fn with_pose(pose: Pose, step_size_cm: f64) -> Self {
        Self { pose, step_size_cm }
    }

    /// The current pose (value copy).
    pub fn pose(&self) -> Pose {
        self.pose
    }

    /// The calibrated step distance in centimetres.
    pub fn step_size_cm(&self) -> f64 {
        self.step_size_cm
    }

    /// Apply a *completed* movement command to the pose.
    ///
    /// Deterministic, no failure modes: the command set is closed and every
    /// input is valid by construction.  `stand`/`sit` leave the pose
    /// untouched.
    pub fn apply(&mut self, command: GaitCommand, steps: u32) {
        let distance = f64::from(steps) * self.step_size_cm;
        let heading_rad = self.pose.heading_deg.to_radians();

        match command {
            GaitCommand::Forward => {
                self.pose.x += distance * heading_rad.cos();
                self.pose.y += distance * heading_rad.sin();
            }
            GaitCommand::Backward => {
                self.pose.x -= distance * heading_rad.cos();
                self.pose.y -= distance * heading_rad.sin();
            }
            GaitCommand::TurnLeft => {
                self.pose.heading_deg = normalize_heading(
                    self.pose.heading_deg + DEGREES_PER_TURN_STEP * f64::from(steps),
                );
            }
            GaitCommand::TurnRight => {
                self.pose.heading_deg = normalize_heading(
                    self.pose.heading_deg - DEGREES_PER_TURN_STEP * f64::from(steps),
                );
            }
            GaitCommand::Stand | GaitCommand::Sit => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_moves_along_heading() {
        let mut tracker = PoseTracker::default();
        tracker.apply(GaitCommand::Forward, 3);
        let pose = tracker.pose();
        assert!((pose.x - 30.0).abs() < 1e-9);
        assert!(pose.y.abs() < 1e-9);
    }

    #[test]
    fn full_turn_returns_heading_to_start() {
        let mut tracker = PoseTracker::default();
        // 8 × 45° = 360°.
        tracker.apply(GaitCommand::TurnLeft, 8);
        assert!((tracker.pose().heading_deg - 0.0).abs() < 1e-9);
    }

    #[test]
    fn forward_then_backward_restores_position() {
        let mut tracker = PoseTracker::default();
        tracker.apply(GaitCommand::TurnLeft, 1); // 45°, exercise both axes
        tracker.apply(GaitCommand::Forward, 4);
        tracker.apply(GaitCommand::Backward, 4);
        let pose = tracker.pose();
        assert!(pose.x.abs() < 1e-9);
        assert!(pose.y.abs() < 1e-9);
    }

    #[test]
    fn turn_right_wraps_below_zero() {
        let mut tracker = PoseTracker::default();
        tracker.apply(GaitCommand::TurnRight, 1);
        assert!((tracker.pose().heading_deg - 315.0).abs() < 1e-9);
    }

    #[test]
    fn heading_stays_in_range_under_many_turns() {
        let mut tracker = PoseTracker::default();
        for _ in 0..13 {
            tracker.apply(GaitCommand::TurnLeft, 3);
        }
        let h = tracker.pose().heading_deg;
        assert!((0.0..360.0).contains(&h));
    }

    #[test]
    fn diagonal_translation_uses_trigonometry() {
        let mut tracker = PoseTracker::default();
        tracker.apply(GaitCommand::TurnLeft, 2); // 90°
        tracker.apply(GaitCommand::Forward, 2);
        let pose = tracker.pose();
        assert!(pose.x.abs() < 1e-9);
        assert!((pose.y - 20.0).abs() < 1e-9);
    }

    #[test]
    fn stand_and_sit_are_noops() {
        let mut tracker = PoseTracker::with_pose(Pose::new(5.0, 6.0, 90.0), 10.0);
        tracker.apply(GaitCommand::Stand, 1);
        tracker.apply(GaitCommand::Sit, 1);
        assert_eq!(tracker.pose(), Pose::new(5.0, 6.0, 90.0));
    }

    #[test]
    fn custom_step_size_scales_distance() {
        let mut tracker = PoseTracker::new(2.5);
        tracker.apply(GaitCommand::Forward, 2);
        assert!((tracker.pose().x - 5.0).abs() < 1e-9);
    }
}
