//! Operator configuration – reads/writes `~/.radscout/config.toml`.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

use radscout_types::RadError;

/// Persisted operator configuration stored in `~/.radscout/config.toml`.
/// Every field has a hardware-calibrated default, so a missing file (or a
/// partial one) always yields a working setup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Geiger-tube sensitivity in cps/(µR/s) (J305 tube: 65).
    #[serde(default = "default_tube_sensitivity")]
    pub tube_sensitivity: f64,

    /// Centimetres travelled per forward/backward gait step.
    #[serde(default = "default_step_size_cm")]
    pub step_size_cm: f64,

    /// Edge length of a radiation-map cell in centimetres.
    #[serde(default = "default_bin_size_cm")]
    pub bin_size_cm: f64,

    /// Seconds between rate-estimate recomputations.
    #[serde(default = "default_reading_interval_secs")]
    pub reading_interval_secs: u64,

    /// Sampling dwell per grid cell (and seek baseline), in seconds.
    #[serde(default = "default_dwell_secs")]
    pub dwell_secs: u64,

    /// Sampling dwell per seek probe, in seconds.
    #[serde(default = "default_probe_dwell_secs")]
    pub probe_dwell_secs: u64,

    /// Grid edge length, in cells, for the coverage scan.
    #[serde(default = "default_grid_size")]
    pub grid_size: u32,

    /// Forward gait steps between adjacent grid cells.
    #[serde(default = "default_grid_step_distance")]
    pub grid_step_distance: u32,

    /// Advance budget for the source search.
    #[serde(default = "default_max_seek_iterations")]
    pub max_seek_iterations: u32,

    /// Gait speed handed to the locomotion driver (1–100).
    #[serde(default = "default_gait_speed")]
    pub gait_speed: u8,

    /// Path the survey data is exported to.
    #[serde(default = "default_data_file")]
    pub data_file: String,
}

fn default_tube_sensitivity() -> f64 {
    65.0
}
fn default_step_size_cm() -> f64 {
    10.0
}
fn default_bin_size_cm() -> f64 {
    10.0
}
fn default_reading_interval_secs() -> u64 {
    5
}
fn default_dwell_secs() -> u64 {
    5
}
fn default_probe_dwell_secs() -> u64 {
    1
}
fn default_grid_size() -> u32 {
    4
}
fn default_grid_step_distance() -> u32 {
    2
}
fn default_max_seek_iterations() -> u32 {
    15
}
fn default_gait_speed() -> u8 {
    60
}
fn default_data_file() -> String {
    "radiation_data.json".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tube_sensitivity: default_tube_sensitivity(),
            step_size_cm: default_step_size_cm(),
            bin_size_cm: default_bin_size_cm(),
            reading_interval_secs: default_reading_interval_secs(),
            dwell_secs: default_dwell_secs(),
            probe_dwell_secs: default_probe_dwell_secs(),
            grid_size: default_grid_size(),
            grid_step_distance: default_grid_step_distance(),
            max_seek_iterations: default_max_seek_iterations(),
            gait_speed: default_gait_speed(),
            data_file: default_data_file(),
        }
    }
}

/// Return the path to `~/.radscout/config.toml`.
pub fn config_path() -> PathBuf {
    config_path_for_home(
        &std::env::var("HOME")
            .or_else(|_| std::env::var("USERPROFILE"))
            .unwrap_or_else(|_| ".".to_string()),
    )
}

/// Build the config path relative to the given home directory.
/// Extracted for testability without mutating environment variables.
pub(crate) fn config_path_for_home(home: &str) -> PathBuf {
    PathBuf::from(home).join(".radscout").join("config.toml")
}

/// Load the config from disk.  Returns `None` if the file does not exist.
pub fn load() -> Result<Option<Config>, RadError> {
    load_from(&config_path())
}

/// Load the config from a specific path.
pub(crate) fn load_from(path: &PathBuf) -> Result<Option<Config>, RadError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        RadError::Config(format!("failed to read config at {}: {}", path.display(), e))
    })?;
    let mut cfg: Config = toml::from_str(&raw)
        .map_err(|e| RadError::Config(format!("failed to parse config: {}", e)))?;
    apply_env_overrides(&mut cfg);
    Ok(Some(cfg))
}

/// Apply `RADSCOUT_*` environment variable overrides to `cfg`.
///
/// Supported variables:
///
/// | Variable | Config field |
/// |---|---|
/// | `RADSCOUT_GRID_SIZE` | `grid_size` |
/// | `RADSCOUT_DWELL_SECS` | `dwell_secs` |
/// | `RADSCOUT_MAX_SEEK_ITERATIONS` | `max_seek_iterations` |
/// | `RADSCOUT_DATA_FILE` | `data_file` |
pub fn apply_env_overrides(cfg: &mut Config) {
    if let Ok(v) = std::env::var("RADSCOUT_GRID_SIZE")
        && let Ok(n) = v.parse::<u32>()
    {
        cfg.grid_size = n;
    }
    if let Ok(v) = std::env::var("RADSCOUT_DWELL_SECS")
        && let Ok(secs) = v.parse::<u64>()
    {
        cfg.dwell_secs = secs;
    }
    if let Ok(v) = std::env::var("RADSCOUT_MAX_SEEK_ITERATIONS")
        && let Ok(n) = v.parse::<u32>()
    {
        cfg.max_seek_iterations = n;
    }
    if let Ok(v) = std::env::var("RADSCOUT_DATA_FILE") {
        cfg.data_file = v;
    }
}

/// The default configuration with `RADSCOUT_*` env overrides applied, for
/// the first-run and unreadable-config paths (env overrides must work even
/// before a config file exists).
pub fn default_with_env() -> Config {
    let mut cfg = Config::default();
    apply_env_overrides(&mut cfg);
    cfg
}

/// Save the config to disk, creating `~/.radscout/` if necessary.
pub fn save(cfg: &Config) -> Result<(), RadError> {
    save_to(cfg, &config_path())
}

/// Save the config to a specific path.
pub(crate) fn save_to(cfg: &Config, path: &PathBuf) -> Result<(), RadError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .map_err(|e| RadError::Config(format!("failed to create config directory: {}", e)))?;
    }
    let raw = toml::to_string_pretty(cfg)
        .map_err(|e| RadError::Config(format!("failed to serialize config: {}", e)))?;
    fs::write(path, raw).map_err(|e| {
        RadError::Config(format!("failed to write config at {}: {}", path.display(), e))
    })?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_default_config() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());

        let cfg = Config::default();
        save_to(&cfg, &path).expect("save");

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded, cfg);
        assert_eq!(loaded.tube_sensitivity, 65.0);
        assert_eq!(loaded.grid_size, 4);
    }

    #[test]
    fn config_path_points_to_radscout_dir() {
        let p = config_path_for_home("/home/testuser");
        assert!(p.to_string_lossy().contains(".radscout"));
        assert!(p.to_string_lossy().ends_with("config.toml"));
    }

    #[test]
    fn load_from_returns_none_when_missing() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        let result = load_from(&path).expect("no error");
        assert!(result.is_none());
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "grid_size = 6\n").unwrap();

        let loaded = load_from(&path).expect("load ok").expect("some");
        assert_eq!(loaded.grid_size, 6);
        assert_eq!(loaded.dwell_secs, 5);
        assert_eq!(loaded.data_file, "radiation_data.json");
    }

    #[test]
    fn malformed_file_is_a_config_error() {
        let dir = tempfile::tempdir().expect("tmp dir");
        let path = config_path_for_home(&dir.path().to_string_lossy());
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "grid_size = \"lots\"\n").unwrap();

        let err = load_from(&path).unwrap_err();
        assert!(matches!(err, RadError::Config(_)));
    }

    #[test]
    fn apply_env_overrides_changes_grid_size() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("RADSCOUT_GRID_SIZE", "8") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.grid_size, 8);
        unsafe { std::env::remove_var("RADSCOUT_GRID_SIZE") };
    }

    #[test]
    fn apply_env_overrides_ignores_invalid_numbers() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("RADSCOUT_DWELL_SECS", "a-while") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.dwell_secs, 5);
        unsafe { std::env::remove_var("RADSCOUT_DWELL_SECS") };
    }

    #[test]
    fn default_with_env_honors_overrides_without_a_file() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("RADSCOUT_MAX_SEEK_ITERATIONS", "3") };
        let cfg = default_with_env();
        assert_eq!(cfg.max_seek_iterations, 3);
        unsafe { std::env::remove_var("RADSCOUT_MAX_SEEK_ITERATIONS") };
    }

    #[test]
    fn apply_env_overrides_changes_data_file() {
        // SAFETY: single-threaded test; no data races on env vars.
        unsafe { std::env::set_var("RADSCOUT_DATA_FILE", "/tmp/survey.json") };
        let mut cfg = Config::default();
        apply_env_overrides(&mut cfg);
        assert_eq!(cfg.data_file, "/tmp/survey.json");
        unsafe { std::env::remove_var("RADSCOUT_DATA_FILE") };
    }
}
