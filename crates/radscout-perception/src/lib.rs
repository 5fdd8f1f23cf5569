//! `radscout-perception` – turns raw pulse events and executed gait commands
//! into the state the mission layer reasons about.
//!
//! # Modules
//!
//! - [`pulse_counter`] – [`PulseCounter`][pulse_counter::PulseCounter]:
//!   converts the asynchronous pulse stream into a smoothed
//!   counts-per-minute rate and a dose-rate estimate.  The only state shared
//!   between the pulse context and the control loop.
//! - [`pose`] – [`PoseTracker`][pose::PoseTracker]: dead-reckons 2-D
//!   position and heading from completed movement commands.
//! - [`map`] – [`RadiationMap`][map::RadiationMap]: accumulates samples,
//!   bins them spatially, and tracks the running maximum.

pub mod map;
pub mod pose;
pub mod pulse_counter;

pub use map::RadiationMap;
pub use pose::PoseTracker;
pub use pulse_counter::{PulseCounter, PulseCounterConfig};
