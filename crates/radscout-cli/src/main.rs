//! `radscout` – RadScout command line interface.
//!
//! Drives the radiation-surveying crawler (simulated in-process) through
//! its mission operations:
//!
//! ```text
//! radscout            interactive shell (default)
//! radscout scan       grid coverage scan, then export
//! radscout seek       gradient-ascent source search, then export
//! radscout demo       scan + seek + export
//! radscout sensor-test  ten 1 Hz tube readings
//! ```
//!
//! Ctrl-C raises the shared stop flag; a running scan or search finishes its
//! current cell and exits cleanly with everything collected so far intact.

mod config;
mod ops;
mod repl;

use colored::Colorize;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

use radscout_mission::init_tracing;

fn main() {
    init_tracing();
    print_banner();

    // ── Shared stop flag ──────────────────────────────────────────────────
    let cancel = Arc::new(AtomicBool::new(false));
    let cancel_clone = cancel.clone();
    if let Err(e) = ctrlc::set_handler(move || {
        println!();
        println!(
            "{}",
            "⚠  Ctrl-C received – stopping after the current cell …"
                .yellow()
                .bold()
        );
        cancel_clone.store(true, Ordering::SeqCst);
    }) {
        warn!(error = %e, "failed to install Ctrl-C handler; graceful stop will not be available");
    }

    // ── Configuration ─────────────────────────────────────────────────────
    let cfg = match config::load() {
        Ok(Some(cfg)) => {
            println!(
                "  Config loaded from {}",
                config::config_path().display().to_string().bold()
            );
            cfg
        }
        Ok(None) => {
            match config::save(&config::Config::default()) {
                Ok(()) => println!(
                    "  {} Default config written to {}",
                    "✓".green().bold(),
                    config::config_path().display().to_string().bold()
                ),
                Err(e) => println!("{}: {}", "Could not write default config".red(), e),
            }
            config::default_with_env()
        }
        Err(e) => {
            println!("{}: {}", "Config error".red(), e);
            println!("  Using default configuration.");
            config::default_with_env()
        }
    };

    // ── Rover rig ─────────────────────────────────────────────────────────
    let mut rig = match ops::Rig::build(&cfg) {
        Ok(rig) => rig,
        Err(e) => {
            println!("{}: {}", "Failed to start the rover rig".red(), e);
            std::process::exit(1);
        }
    };

    // ── Subcommand dispatch ───────────────────────────────────────────────
    let command = std::env::args().nth(1).unwrap_or_else(|| "repl".to_string());
    let outcome = match command.as_str() {
        "scan" => ops::run_scan(&mut rig, &cfg, &cancel)
            .and_then(|_| ops::export(&rig.map, Path::new(&cfg.data_file))),
        "seek" => ops::run_seek(&mut rig, &cfg, &cancel)
            .and_then(|_| ops::export(&rig.map, Path::new(&cfg.data_file))),
        "demo" => ops::run_demo(&mut rig, &cfg, &cancel),
        "sensor-test" => {
            ops::run_sensor_test(&rig, 10, &cancel);
            Ok(())
        }
        "repl" => {
            println!("  Type {} for a list of commands.\n", "help".bold().cyan());
            repl::run(&cfg, &mut rig, cancel.clone());
            Ok(())
        }
        other => {
            println!(
                "{} '{}'. Commands: scan, seek, demo, sensor-test, repl.",
                "Unknown command:".red(),
                other.yellow()
            );
            std::process::exit(2);
        }
    };

    rig.shutdown();

    if let Err(e) = outcome {
        println!("{}: {}", "Mission failed".red(), e);
        std::process::exit(1);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   ___           _______                 __"#.bold().cyan());
    println!("{}", r#"  / _ \___ ____ / / ___/______  __ __ __/ /_"#.bold().cyan());
    println!("{}", r#" / , _/ _ `/ _  /\__ \/ __/ _ \/ // / _  __/"#.bold().cyan());
    println!("{}", r#"/_/|_|\_,_/\_,_/___/\__/\___/\_,_/\_,_/\__/"#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "RadScout".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Radiation-surveying crawler control");
    println!();
}
