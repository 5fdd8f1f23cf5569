//! `radscout-mission` – the synchronous control loop of the RadScout robot.
//!
//! Everything here runs serially in one thread: movement commands block
//! until the actuator reports completion, then the pose is updated, then
//! the next step runs.  The only asynchronous activity in the system is the
//! pulse stream, which stays hidden behind the perception layer's counter.
//!
//! # Modules
//!
//! - [`drive`] – [`MotionController`][drive::MotionController]: couples the
//!   locomotion actuator to the pose tracker so every completed gait
//!   command also updates the dead-reckoned pose.
//! - [`collector`] – [`SampleCollector`][collector::SampleCollector]: a
//!   fixed-duration dwell at the current pose, polling the pulse counter
//!   and producing one aggregated [`Sample`][radscout_types::Sample].
//! - [`coverage`] – [`CoverageScanner`][coverage::CoverageScanner]: a
//!   boustrophedon grid sweep, sampling at every cell.
//! - [`seeker`] – [`SourceSeeker`][seeker::SourceSeeker]: discrete
//!   gradient-ascent search toward the local radiation maximum.
//! - [`telemetry`] – [`init_tracing`][telemetry::init_tracing]: structured
//!   logging setup for the binary.

pub mod collector;
pub mod coverage;
pub mod drive;
pub mod seeker;
pub mod telemetry;

pub use collector::SampleCollector;
pub use coverage::{CoverageScanner, ScanReport, ScanTermination};
pub use drive::MotionController;
pub use seeker::{SeekReport, SeekTermination, SourceSeeker};
pub use telemetry::init_tracing;
