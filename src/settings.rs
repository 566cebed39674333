//! Simulation tuning
//!
//! Defaults mirror `consts`. A JSON file may override any subset of fields.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::Result;
use crate::sim::VehicleParams;

/// Simulation configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Car footprint and handling
    pub vehicle: VehicleParams,
    /// Maximum range of every sensor ray
    pub sensor_length: f64,
    /// Target frame rate for real-time drivers
    pub fps: u32,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            vehicle: VehicleParams::default(),
            sensor_length: SENSOR_LENGTH,
            fps: FPS,
        }
    }
}

impl SimConfig {
    /// Parse a configuration from JSON, filling gaps with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.debug_validate();
        Ok(config)
    }

    /// Load a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)?;
        let config = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(config)
    }

    /// Write the configuration as pretty JSON
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }

    /// Out-of-range tuning is a programmer error, not a runtime condition
    fn debug_validate(&self) {
        debug_assert!(self.sensor_length > 0.0, "sensor_length must be positive");
        debug_assert!(self.vehicle.max_speed >= 0.0, "max_speed must not be negative");
        debug_assert!(
            self.vehicle.width > 0.0 && self.vehicle.height > 0.0,
            "car dimensions must be positive"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_consts() {
        let config = SimConfig::default();
        assert_eq!(config.sensor_length, SENSOR_LENGTH);
        assert_eq!(config.vehicle.width, CAR_WIDTH);
        assert_eq!(config.vehicle.height, CAR_HEIGHT);
        assert_eq!(config.vehicle.max_speed, CAR_MAX_SPEED);
        assert_eq!(config.vehicle.acceleration, CAR_ACC);
        assert_eq!(config.vehicle.rotation_speed, ROTATION_SPEED);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config = SimConfig::from_json(r#"{"sensor_length": 150.0, "vehicle": {"max_speed": 8.0}}"#)
            .unwrap();
        assert_eq!(config.sensor_length, 150.0);
        assert_eq!(config.vehicle.max_speed, 8.0);
        assert_eq!(config.vehicle.width, CAR_WIDTH);
        assert_eq!(config.fps, FPS);
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        assert!(SimConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn test_save_and_load() {
        let path = std::env::temp_dir().join(format!("racetrack_settings_{}.json", std::process::id()));
        let mut config = SimConfig::default();
        config.vehicle.rotation_speed = 2.5;
        config.save(&path).unwrap();

        let loaded = SimConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
        let _ = fs::remove_file(&path);
    }
}
