//! REPL – interactive shell for driving the rover and running surveys.
//!
//! Supported commands:
//!   w / s        – one gait step forward / backward
//!   a / d        – turn 90° left / right
//!   stand / sit  – posture change (no pose effect)
//!   r            – take a radiation reading at the current pose
//!   g            – run the grid coverage scan
//!   f            – search for the radiation source
//!   v            – save the survey data to the configured JSON file
//!   i            – show pose, map totals, and the hottest reading
//!   help         – show this list
//!   q | quit     – exit

use colored::Colorize;
use std::io::{self, BufRead, Write};
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use radscout_types::{GaitCommand, RadError};

use crate::config::Config;
use crate::ops::{self, Rig};

/// Entry point for the interactive REPL.
///
/// `shutdown` is polled each iteration; when set the REPL exits cleanly.
pub fn run(cfg: &Config, rig: &mut Rig, shutdown: Arc<AtomicBool>) {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        if shutdown.load(Ordering::SeqCst) {
            break;
        }

        print!("{} ", "radscout>".bold().cyan());
        stdout.flush().ok();

        let mut line = String::new();
        match stdin.lock().read_line(&mut line) {
            Ok(0) => break, // EOF
            Ok(_) => {}
            Err(e) => {
                eprintln!("{}: {}", "Read error".red(), e);
                break;
            }
        }

        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        let outcome = match cmd {
            "w" => step(rig, GaitCommand::Forward),
            "s" => step(rig, GaitCommand::Backward),
            "a" => rig.drive.turn_left_90(),
            "d" => rig.drive.turn_right_90(),
            "stand" => rig.drive.move_and_track(GaitCommand::Stand, 1),
            "sit" => rig.drive.move_and_track(GaitCommand::Sit, 1),
            "r" => {
                cmd_reading(cfg, rig);
                Ok(())
            }
            "g" => ops::run_scan(rig, cfg, &shutdown).map(|_| ()),
            "f" => ops::run_seek(rig, cfg, &shutdown).map(|_| ()),
            "v" => cmd_save(cfg, rig),
            "i" => {
                cmd_info(rig);
                Ok(())
            }
            "help" => {
                cmd_help();
                Ok(())
            }
            "q" | "quit" => {
                println!("{}", "Goodbye.".green());
                shutdown.store(true, Ordering::SeqCst);
                break;
            }
            other => {
                println!(
                    "{} '{}'. Type {} for available commands.",
                    "Unknown command:".red(),
                    other.yellow(),
                    "help".bold()
                );
                Ok(())
            }
        };

        if let Err(e) = outcome {
            println!("{}: {}", "Command failed".red(), e);
        }
        // A scan or seek may have been interrupted; clear the flag so the
        // prompt comes back instead of exiting.
        if matches!(cmd, "g" | "f") {
            shutdown.store(false, Ordering::SeqCst);
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handlers
// ─────────────────────────────────────────────────────────────────────────────

fn step(rig: &mut Rig, command: GaitCommand) -> Result<(), RadError> {
    rig.drive.move_and_track(command, 1)?;
    let pose = rig.drive.pose();
    println!(
        "  at ({:.0}, {:.0}) heading {:.0}°",
        pose.x, pose.y, pose.heading_deg
    );
    Ok(())
}

fn cmd_reading(cfg: &Config, rig: &mut Rig) {
    println!("  Sampling for {} s …", cfg.dwell_secs);
    let pose = rig.drive.pose();
    let sample = rig.collector.collect(
        Duration::from_secs(cfg.dwell_secs),
        &rig.counter,
        pose,
        &mut rig.map,
    );
    println!(
        "  {} CPM  {} µSv/h at ({:.0}, {:.0})",
        format!("{:.1}", sample.cpm).yellow().bold(),
        format!("{:.3}", sample.dose_rate).yellow(),
        pose.x,
        pose.y
    );
}

fn cmd_save(cfg: &Config, rig: &Rig) -> Result<(), RadError> {
    ops::export(&rig.map, Path::new(&cfg.data_file))?;
    println!(
        "  {} Survey data written to {}",
        "✓".green().bold(),
        cfg.data_file.bold()
    );
    Ok(())
}

fn cmd_info(rig: &Rig) {
    let pose = rig.drive.pose();
    println!(
        "  Pose: ({:.1}, {:.1}) heading {:.0}°",
        pose.x, pose.y, pose.heading_deg
    );
    println!(
        "  Sim field truth here: {:.1} CPM",
        rig.rover.true_cpm()
    );
    ops::print_map_summary(&rig.map);
}

fn cmd_help() {
    println!();
    println!("{}", "RadScout Commands".bold().underline());
    println!("  {}      – one gait step forward / backward", "w  s".bold().cyan());
    println!("  {}      – turn 90° left / right",            "a  d".bold().cyan());
    println!("  {} – posture up / down",                "stand  sit".bold().cyan());
    println!("  {}         – radiation reading here",        "r".bold().cyan());
    println!("  {}         – grid coverage scan",            "g".bold().cyan());
    println!("  {}         – search for the source",         "f".bold().cyan());
    println!("  {}         – save survey data to JSON",      "v".bold().cyan());
    println!("  {}         – pose and map summary",          "i".bold().cyan());
    println!("  {}    – exit",                               "q  quit".bold().cyan());
    println!();
}
