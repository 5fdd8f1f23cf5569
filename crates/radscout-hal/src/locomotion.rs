//! Generic `Locomotion` trait for gait-driven robot bases.
//!
//! Drivers implement this trait and are handed to the mission layer as a
//! `Box<dyn Locomotion>`.  The rest of the stack only ever talks to the
//! trait, so the physical crawler can be swapped for a simulation without
//! touching coverage or search logic.

use radscout_types::{GaitCommand, RadError};

/// A gait-driven robot base (legged crawler, wheeled rover, simulation).
///
/// `execute` is **blocking**: it returns only once the gait has completed,
/// so callers may update their dead-reckoned pose immediately afterwards.
/// There is no retry policy; a fault is fatal to the calling operation.
pub trait Locomotion: Send {
    /// Stable identifier for this base, e.g. `"picrawler"` or `"sim"`.
    fn id(&self) -> &str;

    /// Execute `command` for `steps` repetitions at `speed` (0–100),
    /// blocking until the actuator reports completion.
    ///
    /// # Errors
    ///
    /// Returns [`RadError::ActuatorFault`] when the base reports
    /// non-completion.
    fn execute(&mut self, command: GaitCommand, steps: u32, speed: u8) -> Result<(), RadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Minimal in-process base used only for tests.
    struct MockBase {
        id: String,
        executed: Vec<(GaitCommand, u32, u8)>,
    }

    impl MockBase {
        fn new(id: &str) -> Self {
            Self {
                id: id.to_string(),
                executed: Vec::new(),
            }
        }
    }

    impl Locomotion for MockBase {
        fn id(&self) -> &str {
            &self.id
        }

        fn execute(
            &mut self,
            command: GaitCommand,
            steps: u32,
            speed: u8,
        ) -> Result<(), RadError> {
            self.executed.push((command, steps, speed));
            Ok(())
        }
    }

    #[test]
    fn mock_base_records_executed_commands() {
        let mut base = MockBase::new("test_base");
        assert_eq!(base.id(), "test_base");

        base.execute(GaitCommand::Forward, 2, 60).unwrap();
        base.execute(GaitCommand::TurnLeft, 1, 60).unwrap();

        assert_eq!(
            base.executed,
            vec![
                (GaitCommand::Forward, 2, 60),
                (GaitCommand::TurnLeft, 1, 60)
            ]
        );
    }
}
