//! `radscout-types` – shared data model for the RadScout stack.
//!
//! Everything the other crates exchange lives here: the closed gait command
//! set, the dead-reckoned [`Pose`], the [`RateEstimate`] produced by the
//! pulse counter, the immutable [`Sample`] records accumulated by the
//! radiation map, and the workspace-wide [`RadError`] error type.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

// ─────────────────────────────────────────────────────────────────────────────
// Gait commands
// ─────────────────────────────────────────────────────────────────────────────

/// The closed set of gait commands the locomotion hardware understands.
///
/// Every command is executed for a repetition count at a speed; the pose
/// tracker interprets completed commands to dead-reckon position and heading.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GaitCommand {
    /// Walk forward along the current heading.
    Forward,
    /// Walk backward against the current heading.
    Backward,
    /// Rotate 45° counter-clockwise per step.
    TurnLeft,
    /// Rotate 45° clockwise per step.
    TurnRight,
    /// Rise to the standing posture.  Does not change the pose.
    Stand,
    /// Lower to the parked posture.  Does not change the pose.
    Sit,
}

impl GaitCommand {
    /// Stable string form of the command, matching the serde representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            GaitCommand::Forward => "forward",
            GaitCommand::Backward => "backward",
            GaitCommand::TurnLeft => "turn-left",
            GaitCommand::TurnRight => "turn-right",
            GaitCommand::Stand => "stand",
            GaitCommand::Sit => "sit",
        }
    }
}

impl std::fmt::Display for GaitCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Pose
// ─────────────────────────────────────────────────────────────────────────────

/// A dead-reckoned 2-D pose: position in centimetres, heading in degrees.
///
/// The heading is always kept in `[0, 360)`.  Poses are plain values; the
/// pose tracker owns the live pose and every stored [`Sample`] carries a
/// snapshot copy taken at collection time.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Pose {
    /// X position in the world frame (centimetres).
    pub x: f64,
    /// Y position in the world frame (centimetres).
    pub y: f64,
    /// Heading, degrees counter-clockwise from +X, in `[0, 360)`.
    pub heading_deg: f64,
}

impl Pose {
    /// Construct a pose, normalising the heading into `[0, 360)`.
    pub fn new(x: f64, y: f64, heading_deg: f64) -> Self {
        Self {
            x,
            y,
            heading_deg: normalize_heading(heading_deg),
        }
    }
}

/// Wrap a heading in degrees into `[0, 360)`.
pub fn normalize_heading(heading_deg: f64) -> f64 {
    heading_deg.rem_euclid(360.0)
}

// ─────────────────────────────────────────────────────────────────────────────
// Rate estimate
// ─────────────────────────────────────────────────────────────────────────────

/// A smoothed radiation rate estimate derived from the pulse history.
///
/// Both fields are non-negative; an empty pulse history yields the zero
/// estimate rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RateEstimate {
    /// Counts per minute.
    pub cpm: f64,
    /// Derived dose rate in µSv/h.
    pub dose_rate: f64,
}

// ─────────────────────────────────────────────────────────────────────────────
// Samples
// ─────────────────────────────────────────────────────────────────────────────

/// One aggregated radiation sample, collected over a fixed dwell at a pose.
///
/// Immutable once created: `pose` is a value snapshot, so later motion never
/// retroactively changes a stored sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    /// Pose at collection time (value copy, not a reference).
    pub pose: Pose,
    /// Mean CPM over the dwell's polls.
    pub cpm: f64,
    /// Mean dose rate over the dwell's polls (µSv/h).
    pub dose_rate: f64,
    /// The individual polled CPM readings, in poll order.
    pub raw_readings: Vec<f64>,
}

/// Flat export row for external persistence or heatmap rendering.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SampleRecord {
    pub timestamp: DateTime<Utc>,
    pub x: f64,
    pub y: f64,
    pub heading_deg: f64,
    pub cpm: f64,
    pub dose_rate: f64,
}

impl From<&Sample> for SampleRecord {
    fn from(sample: &Sample) -> Self {
        Self {
            timestamp: sample.timestamp,
            x: sample.pose.x,
            y: sample.pose.y,
            heading_deg: sample.pose.heading_deg,
            cpm: sample.cpm,
            dose_rate: sample.dose_rate,
        }
    }
}

/// The running maximum over all collected samples.
///
/// Updated only when a new sample's CPM *strictly* exceeds the stored value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MaxRecord {
    pub cpm: f64,
    pub pose: Pose,
}

// ─────────────────────────────────────────────────────────────────────────────
// Errors
// ─────────────────────────────────────────────────────────────────────────────

/// Workspace-wide error type spanning actuator faults, pulse-source faults,
/// and configuration problems.
#[derive(Error, Debug)]
pub enum RadError {
    /// The locomotion actuator reported non-completion.  Fatal to the
    /// in-progress multi-step operation; already-stored samples and the
    /// pose history prior to the failure stay valid.
    #[error("actuator fault during '{command}': {details}")]
    ActuatorFault { command: String, details: String },

    /// The pulse source could not be started or stopped.
    #[error("pulse source fault: {0}")]
    PulseSource(String),

    /// Invalid or unreadable configuration.
    #[error("configuration error: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gait_command_serializes_kebab_case() {
        let json = serde_json::to_string(&GaitCommand::TurnLeft).unwrap();
        assert_eq!(json, "\"turn-left\"");
        let back: GaitCommand = serde_json::from_str("\"turn-right\"").unwrap();
        assert_eq!(back, GaitCommand::TurnRight);
    }

    #[test]
    fn gait_command_display_matches_serde_form() {
        for cmd in [
            GaitCommand::Forward,
            GaitCommand::Backward,
            GaitCommand::TurnLeft,
            GaitCommand::TurnRight,
            GaitCommand::Stand,
            GaitCommand::Sit,
        ] {
            let json = serde_json::to_string(&cmd).unwrap();
            assert_eq!(json, format!("\"{cmd}\""));
        }
    }

    #[test]
    fn pose_new_normalizes_heading() {
        assert_eq!(Pose::new(0.0, 0.0, 360.0).heading_deg, 0.0);
        assert_eq!(Pose::new(0.0, 0.0, -45.0).heading_deg, 315.0);
        assert_eq!(Pose::new(0.0, 0.0, 725.0).heading_deg, 5.0);
    }

    #[test]
    fn normalize_heading_stays_in_range() {
        for raw in [-720.0, -359.9, -0.1, 0.0, 359.9, 360.0, 1080.5] {
            let h = normalize_heading(raw);
            assert!((0.0..360.0).contains(&h), "heading {h} out of range for {raw}");
        }
    }

    #[test]
    fn sample_roundtrip() {
        let sample = Sample {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            pose: Pose::new(12.5, -3.0, 90.0),
            cpm: 42.0,
            dose_rate: 0.23,
            raw_readings: vec![40.0, 43.0, 43.0],
        };
        let json = serde_json::to_string(&sample).unwrap();
        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(sample, back);
    }

    #[test]
    fn sample_record_flattens_pose() {
        let sample = Sample {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            pose: Pose::new(10.0, 20.0, 45.0),
            cpm: 30.0,
            dose_rate: 0.1,
            raw_readings: vec![30.0],
        };
        let record = SampleRecord::from(&sample);
        assert_eq!(record.x, 10.0);
        assert_eq!(record.y, 20.0);
        assert_eq!(record.heading_deg, 45.0);
        assert_eq!(record.cpm, 30.0);
    }

    #[test]
    fn rad_error_display() {
        let err = RadError::ActuatorFault {
            command: "forward".to_string(),
            details: "gait engine timeout".to_string(),
        };
        assert!(err.to_string().contains("forward"));
        assert!(err.to_string().contains("gait engine timeout"));

        let err2 = RadError::PulseSource("already started".to_string());
        assert!(err2.to_string().contains("already started"));
    }
}
