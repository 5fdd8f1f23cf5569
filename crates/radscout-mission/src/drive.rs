//! [`MotionController`] – movement with pose bookkeeping.
//!
//! Couples a [`Locomotion`] driver to the [`PoseTracker`] so that the pose
//! is updated exactly once per *completed* gait command.  The actuator call
//! blocks; if it fails, the pose is left untouched and the error propagates
//! to abort the calling operation.

use tracing::debug;

use radscout_hal::Locomotion;
use radscout_perception::PoseTracker;
use radscout_types::{GaitCommand, Pose, RadError};

/// Gait steps that make up a 90° turn (the crawler turns 45° per step).
pub const QUARTER_TURN_STEPS: u32 = 2;

/// Drives the locomotion actuator and keeps the dead-reckoned pose in step
/// with completed motion.
pub struct MotionController {
    base: Box<dyn Locomotion>,
    tracker: PoseTracker,
    speed: u8,
}

impl MotionController {
    /// Wrap `base`, starting from `tracker`'s pose, moving at `speed`.
    pub fn new(base: Box<dyn Locomotion>, tracker: PoseTracker, speed: u8) -> Self {
        Self {
            base,
            tracker,
            speed,
        }
    }

    /// Execute `command` for `steps` repetitions, blocking until complete,
    /// then apply the pose update.
    ///
    /// # Errors
    ///
    /// Propagates [`RadError::ActuatorFault`]; the pose is not updated for
    /// a failed command.
    pub fn move_and_track(&mut self, command: GaitCommand, steps: u32) -> Result<(), RadError> {
        self.base.execute(command, steps, self.speed)?;
        self.tracker.apply(command, steps);
        let pose = self.tracker.pose();
        debug!(%command, steps, x = pose.x, y = pose.y, heading = pose.heading_deg, "moved");
        Ok(())
    }

    /// Turn 90° clockwise.
    pub fn turn_right_90(&mut self) -> Result<(), RadError> {
        self.move_and_track(GaitCommand::TurnRight, QUARTER_TURN_STEPS)
    }

    /// Turn 90° counter-clockwise.
    pub fn turn_left_90(&mut self) -> Result<(), RadError> {
        self.move_and_track(GaitCommand::TurnLeft, QUARTER_TURN_STEPS)
    }

    /// The current dead-reckoned pose.
    pub fn pose(&self) -> Pose {
        self.tracker.pose()
    }

    /// The underlying pose tracker.
    pub fn tracker(&self) -> &PoseTracker {
        &self.tracker
    }
}
