//! Mission wiring – builds the simulated rover rig and runs the survey
//! operations the CLI exposes.
//!
//! Everything here targets the in-process simulation from `radscout-hal`;
//! swapping in real hardware means swapping the two trait objects handed to
//! the rig, nothing else.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::AtomicBool;
use std::time::Duration;

use colored::Colorize;
use serde_json::json;
use tracing::{info, warn};

use radscout_hal::{PulseSource, SimPulseSource, SimRover, SimRoverConfig, SyntheticField};
use radscout_mission::{
    CoverageScanner, MotionController, SampleCollector, ScanReport, SeekReport, SourceSeeker,
};
use radscout_perception::{PoseTracker, PulseCounter, PulseCounterConfig, RadiationMap};
use radscout_types::{GaitCommand, RadError};

use crate::config::Config;

/// The fully wired stack: simulated rover, live counter, and the map the
/// survey accumulates into.
pub struct Rig {
    pub rover: SimRover,
    pub drive: MotionController,
    pub collector: SampleCollector,
    pub counter: PulseCounter,
    pub map: RadiationMap,
    source: SimPulseSource,
}

impl Rig {
    /// Build the simulation rig from the operator config and start the
    /// pulse line.
    pub fn build(cfg: &Config) -> Result<Self, RadError> {
        let rover = SimRover::new(SimRoverConfig {
            step_size_cm: cfg.step_size_cm,
            field: SyntheticField::default(),
            ..SimRoverConfig::default()
        });

        let counter = PulseCounter::new(PulseCounterConfig {
            reading_interval: Duration::from_secs(cfg.reading_interval_secs),
            tube_sensitivity: cfg.tube_sensitivity,
            ..PulseCounterConfig::default()
        });
        let mut source = rover.pulse_source();
        source.start(Arc::new(counter.clone()))?;

        let mut drive = MotionController::new(
            Box::new(rover.locomotion()),
            PoseTracker::new(cfg.step_size_cm),
            cfg.gait_speed,
        );
        // Bring the crawler up to its walking posture before any mission
        // motion.
        drive.move_and_track(GaitCommand::Stand, 1)?;

        Ok(Self {
            rover,
            drive,
            collector: SampleCollector::default(),
            counter,
            map: RadiationMap::new(cfg.bin_size_cm),
            source,
        })
    }

    /// Park the crawler and stop the pulse line.  The pulse line also stops
    /// on drop.
    pub fn shutdown(&mut self) {
        if let Err(e) = self.drive.move_and_track(GaitCommand::Sit, 1) {
            warn!(error = %e, "could not park the crawler");
        }
        self.source.stop();
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Operations
// ─────────────────────────────────────────────────────────────────────────────

/// Run the grid coverage scan and print its outcome.
pub fn run_scan(rig: &mut Rig, cfg: &Config, cancel: &AtomicBool) -> Result<ScanReport, RadError> {
    println!(
        "  Scanning a {}×{} grid ({} s dwell per cell) …",
        cfg.grid_size, cfg.grid_size, cfg.dwell_secs
    );
    let scanner = CoverageScanner::new(
        cfg.grid_size,
        cfg.grid_step_distance,
        Duration::from_secs(cfg.dwell_secs),
    );
    let report = scanner.scan(
        &mut rig.drive,
        &rig.collector,
        &rig.counter,
        &mut rig.map,
        cancel,
    )?;

    println!(
        "  {} {} cells sampled ({:?})",
        "✓".green().bold(),
        report.cells_visited,
        report.termination
    );
    print_map_summary(&rig.map);
    Ok(report)
}

/// Run the gradient-ascent source search and print its outcome.
pub fn run_seek(rig: &mut Rig, cfg: &Config, cancel: &AtomicBool) -> Result<SeekReport, RadError> {
    println!(
        "  Searching for the source (budget {} advances) …",
        cfg.max_seek_iterations
    );
    let seeker = SourceSeeker {
        max_iterations: cfg.max_seek_iterations,
        baseline_dwell: Duration::from_secs(cfg.dwell_secs),
        probe_dwell: Duration::from_secs(cfg.probe_dwell_secs),
        ..SourceSeeker::default()
    };
    let report = seeker.seek(
        &mut rig.drive,
        &rig.collector,
        &rig.counter,
        &mut rig.map,
        cancel,
    )?;

    println!(
        "  {} {:?} after {} advance(s); best {:.1} CPM at ({:.0}, {:.0})",
        "✓".green().bold(),
        report.termination,
        report.iterations,
        report.best_cpm,
        report.final_pose.x,
        report.final_pose.y
    );
    Ok(report)
}

/// Grid scan followed by a source search, then export – the full survey.
pub fn run_demo(rig: &mut Rig, cfg: &Config, cancel: &AtomicBool) -> Result<(), RadError> {
    run_scan(rig, cfg, cancel)?;
    run_seek(rig, cfg, cancel)?;
    export(&rig.map, Path::new(&cfg.data_file))?;
    println!(
        "  {} Survey data written to {}",
        "✓".green().bold(),
        cfg.data_file.bold()
    );
    Ok(())
}

/// Print one rate reading per second until `count` readings are done or the
/// stop signal is raised.  Reports new pulses since the previous reading and
/// a coarse level assessment.
pub fn run_sensor_test(rig: &Rig, count: u32, cancel: &AtomicBool) {
    use std::sync::atomic::Ordering;

    println!("  Reading the tube ({count} samples, 1 Hz) …");
    let mut last_instant = rig.counter.instant_cpm();
    for i in 0..count {
        if cancel.load(Ordering::SeqCst) {
            break;
        }
        std::thread::sleep(Duration::from_secs(1));
        let rate = rig.counter.current_rate();
        let instant = rig.counter.instant_cpm();
        println!(
            "    [{:>2}] {:>8.1} CPM  instant {:>3}  {:>7.3} µSv/h",
            i + 1,
            rate.cpm,
            instant,
            rate.dose_rate
        );
        if instant > last_instant {
            println!(
                "         {} +{} pulse(s)",
                "▲".green(),
                instant - last_instant
            );
        }
        last_instant = instant;

        if rate.cpm > 100.0 {
            println!("         {}", "⚠  high radiation".red().bold());
        } else if rate.cpm > 50.0 {
            println!("         {}", "⚡ elevated radiation".yellow());
        } else if rate.cpm < 5.0 {
            println!("         {}", "check sensor connection".dimmed());
        }
    }
}

/// Write the whole survey – every sample plus the running maximum – as JSON.
pub fn export(map: &RadiationMap, path: &Path) -> Result<(), RadError> {
    let payload = json!({
        "samples": map.export(),
        "max": map.max(),
    });
    let raw = serde_json::to_string_pretty(&payload)
        .map_err(|e| RadError::Config(format!("failed to serialize survey data: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        RadError::Config(format!("failed to write {}: {}", path.display(), e))
    })?;
    info!(path = %path.display(), samples = map.len(), "survey data exported");
    Ok(())
}

/// Print the current map totals and hottest cell.
pub fn print_map_summary(map: &RadiationMap) {
    println!(
        "  Map: {} sample(s) over {} cell(s)",
        map.len().to_string().bold(),
        map.cells().len().to_string().bold()
    );
    if let Some(max) = map.max() {
        println!(
            "  Hottest reading: {} CPM at ({:.0}, {:.0})",
            format!("{:.1}", max.cpm).yellow().bold(),
            max.pose.x,
            max.pose.y
        );
    }
}
