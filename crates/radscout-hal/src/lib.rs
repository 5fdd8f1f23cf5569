//! `radscout-hal` – hardware abstraction for the RadScout robot.
//!
//! The rest of the stack only ever talks to the traits defined here, so the
//! physical gait engine and the Geiger-tube pulse line can be swapped for
//! simulations without touching sensing or search logic.
//!
//! # Modules
//!
//! - [`locomotion`] – [`Locomotion`][locomotion::Locomotion]: blocking gait
//!   command execution (`forward`, `backward`, `turn-left`, `turn-right`,
//!   `stand`, `sit`).
//! - [`pulse`] – [`PulseSource`][pulse::PulseSource] /
//!   [`PulseSink`][pulse::PulseSink]: the asynchronous radiation pulse line.
//!   The core never calls into the source; it only registers a sink.
//! - [`sim`] – [`SimRover`][sim::SimRover]: an in-process rover simulation
//!   combining a recording locomotion stub with a pulse emitter driven by a
//!   [`SyntheticField`][sim::SyntheticField], for headless tests and demos.

pub mod locomotion;
pub mod pulse;
pub mod sim;

pub use locomotion::Locomotion;
pub use pulse::{PulseSink, PulseSource};
pub use sim::{SimLocomotion, SimPulseSource, SimRover, SimRoverConfig, SyntheticField};
