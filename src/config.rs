//! Runtime configuration
//!
//! Read from a JSON file next to the binary; every key is optional.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::Field;
use crate::consts::{DEFAULT_PORT, FIELD_HEIGHT, FIELD_WIDTH, TICK_RATE};
use crate::sim::wave::MIN_FIELD_EXTENT;

/// Default save file location
pub const DEFAULT_SAVE_PATH: &str = "save_2d.json";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    // === Play field ===
    pub field_width: f32,
    pub field_height: f32,

    // === Randomness ===
    /// Fixed RNG seed; `None` derives one from the wall clock
    pub seed: Option<u64>,

    // === Storage ===
    pub save_path: PathBuf,

    // === Network ===
    pub port: u16,

    // === Effects ===
    /// Live particle cap (0 disables particles)
    pub max_particles: usize,

    // === Headless runner ===
    /// Stop the headless session after this many ticks
    pub max_ticks: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            field_width: FIELD_WIDTH,
            field_height: FIELD_HEIGHT,
            seed: None,
            save_path: PathBuf::from(DEFAULT_SAVE_PATH),
            port: DEFAULT_PORT,
            max_particles: 512,
            // Five minutes of play
            max_ticks: 5 * 60 * TICK_RATE as u64,
        }
    }
}

impl Config {
    /// Load from `path`, falling back to defaults on any failure
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                log::info!("No config at {} ({e}), using defaults", path.display());
                return Self::default();
            }
        };

        match serde_json::from_str::<Config>(&text) {
            Ok(config) => {
                log::info!("Loaded config from {}", path.display());
                config.sanitized()
            }
            Err(e) => {
                log::warn!("Bad config {}: {e}, using defaults", path.display());
                Self::default()
            }
        }
    }

    /// Play field described by this config
    pub fn field(&self) -> Field {
        Field::new(self.field_width, self.field_height)
    }

    /// Wall-clock length of one tick at the fixed rate
    pub fn tick_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / f64::from(TICK_RATE))
    }

    /// Seed to use for the next session
    pub fn resolve_seed(&self) -> u64 {
        self.seed.unwrap_or_else(|| {
            std::time::SystemTime::now()
                .duration_since(std::time::UNIX_EPOCH)
                .map(|d| d.as_nanos() as u64)
                .unwrap_or(0)
        })
    }

    /// Replace nonsensical values with defaults
    fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !(self.field_width.is_finite() && self.field_width >= MIN_FIELD_EXTENT) {
            log::warn!("field_width {} too small, using {}", self.field_width, defaults.field_width);
            self.field_width = defaults.field_width;
        }
        if !(self.field_height.is_finite() && self.field_height >= MIN_FIELD_EXTENT) {
            log::warn!("field_height {} too small, using {}", self.field_height, defaults.field_height);
            self.field_height = defaults.field_height;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.field(), Field::new(800.0, 600.0));
        assert_eq!(config.port, 5555);
        assert_eq!(config.save_path, PathBuf::from("save_2d.json"));
        assert_eq!(config.tick_duration().as_micros(), 16_666);
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let config: Config = serde_json::from_str(r#"{"seed": 42, "port": 7000}"#).unwrap();
        assert_eq!(config.seed, Some(42));
        assert_eq!(config.port, 7000);
        assert_eq!(config.max_particles, 512);
        assert_eq!(config.field_width, 800.0);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let config = Config::load("/nonexistent/nova-strike/config.json");
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_bad_values_sanitized() {
        let dir = std::env::temp_dir().join(format!("nova-config-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"field_width": -5.0, "tick_rate": 30}"#).unwrap();
        let config = Config::load(&path);
        assert_eq!(config.field_width, 800.0);
        // Unknown keys such as a tick rate are ignored
        assert_eq!(config.field_height, 600.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_tiny_field_rejected() {
        let dir = std::env::temp_dir().join(format!("nova-config-tiny-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("config.json");
        std::fs::write(&path, r#"{"field_width": 80.0, "field_height": 120.0, "seed": 1}"#).unwrap();
        let config = Config::load(&path);
        assert_eq!(config.field_width, 800.0);
        assert_eq!(config.field_height, 120.0);
        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_fixed_seed() {
        let config = Config {
            seed: Some(9),
            ..Default::default()
        };
        assert_eq!(config.resolve_seed(), 9);
    }
}
