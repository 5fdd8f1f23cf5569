//! [`CoverageScanner`] – boustrophedon grid sweep.
//!
//! Covers an N×N grid in a serpentine pattern: each row is walked forward
//! with a sample at every cell; at the end of a row the scanner turns 90°
//! (right on even rows, left on odd rows), advances one row, and turns the
//! same way again to face back along the next row.  Alternating the turn
//! direction keeps the sweep from re-crossing cells it has already sampled.
//!
//! Cancellation is cooperative, checked once per cell; samples collected
//! before a cancellation or an actuator fault stay valid in the map.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use tracing::{info, warn};

use radscout_perception::{PulseCounter, RadiationMap};
use radscout_types::{GaitCommand, RadError};

use crate::collector::SampleCollector;
use crate::drive::MotionController;

/// How a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTermination {
    /// All N² cells were visited.
    Completed,
    /// The stop signal was raised mid-sweep.
    Cancelled,
}

/// Summary of a finished (or cancelled) sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScanReport {
    pub termination: ScanTermination,
    /// Cells visited and sampled.  Equals `grid_size²` when completed.
    pub cells_visited: u32,
}

/// Drives the actuator through an N×N serpentine sweep, sampling at every
/// cell.
#[derive(Debug, Clone, Copy)]
pub struct CoverageScanner {
    /// Grid edge length in cells.
    pub grid_size: u32,
    /// Forward gait steps between adjacent cells.
    pub step_distance: u32,
    /// Sampling dwell at each cell.
    pub cell_dwell: Duration,
}

impl CoverageScanner {
    pub fn new(grid_size: u32, step_distance: u32, cell_dwell: Duration) -> Self {
        Self {
            grid_size,
            step_distance,
            cell_dwell,
        }
    }

    /// Run the sweep.  Returns the report, or the actuator fault that
    /// aborted it (already-collected samples remain valid in `map`).
    pub fn scan(
        &self,
        drive: &mut MotionController,
        collector: &SampleCollector,
        counter: &PulseCounter,
        map: &mut RadiationMap,
        cancel: &AtomicBool,
    ) -> Result<ScanReport, RadError> {
        let n = self.grid_size;
        info!(grid_size = n, step_distance = self.step_distance, "starting grid sweep");

        let mut cells_visited = 0u32;
        for row in 0..n {
            for col in 0..n {
                if cancel.load(Ordering::SeqCst) {
                    warn!(cells_visited, "grid sweep cancelled");
                    return Ok(ScanReport {
                        termination: ScanTermination::Cancelled,
                        cells_visited,
                    });
                }

                collector.collect(self.cell_dwell, counter, drive.pose(), map);
                cells_visited += 1;

                if col + 1 < n {
                    drive.move_and_track(GaitCommand::Forward, self.step_distance)?;
                }
            }

            // Row transition: turn, advance one row, turn the same way to
            // face back along the next row.  Right on even rows, left on
            // odd rows, so the sweep never doubles back over itself.
            if row + 1 < n {
                if row % 2 == 0 {
                    drive.turn_right_90()?;
                    drive.move_and_track(GaitCommand::Forward, self.step_distance)?;
                    drive.turn_right_90()?;
                } else {
                    drive.turn_left_90()?;
                    drive.move_and_track(GaitCommand::Forward, self.step_distance)?;
                    drive.turn_left_90()?;
                }
            }
        }

        info!(cells_visited, "grid sweep complete");
        Ok(ScanReport {
            termination: ScanTermination::Completed,
            cells_visited,
        })
    }
}
