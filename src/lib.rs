//! Racetrack Sim - a sensor-driven car on a polyline racetrack
//!
//! Core modules:
//! - `sim`: Deterministic simulation (geometry, kinematics, sensors, collisions, episodes)
//! - `tracks`: Track registry (built-in tables and JSON track files)
//! - `controller`: Decision sources (human input, learned policy)
//! - `telemetry`: Per-tick recording for training data
//! - `settings`: Tuning configuration

pub mod controller;
pub mod error;
pub mod settings;
pub mod sim;
pub mod telemetry;
pub mod tracks;

pub use controller::{DecisionSource, HumanInput, MlpPolicy};
pub use error::{Error, InvalidTrackError, Result};
pub use settings::SimConfig;
pub use telemetry::{Recorder, TelemetryFrame};
pub use tracks::TrackRegistry;

use glam::DVec2;

/// Simulation tuning constants
pub mod consts {
    /// Frame rate the tuning values below are calibrated for
    pub const FPS: u32 = 60;

    /// Car footprint (pixels)
    pub const CAR_WIDTH: f64 = 10.0;
    pub const CAR_HEIGHT: f64 = 20.0;

    /// Top speed (pixels per tick)
    pub const CAR_MAX_SPEED: f64 = 5.0;
    /// Speed change per tick while accelerating or braking
    pub const CAR_ACC: f64 = 0.02;
    /// Heading change per tick while steering (degrees)
    pub const ROTATION_SPEED: f64 = 1.0;

    /// Maximum range of every sensor ray (pixels)
    pub const SENSOR_LENGTH: f64 = 300.0;
    /// Number of rays in the sensor fan
    pub const SENSOR_COUNT: usize = 13;
    /// Ray offsets from heading (degrees). Readings are consumed positionally.
    pub const SENSOR_OFFSETS: [f64; SENSOR_COUNT] = [
        0.0, -15.0, 15.0, -30.0, 30.0, -45.0, 45.0, -60.0, 60.0, -75.0, 75.0, -90.0, 90.0,
    ];
}

/// Unit vector for a heading in degrees (0 = up, clockwise positive, y grows downward)
#[inline]
pub fn heading_vector(heading_deg: f64) -> DVec2 {
    let rad = heading_deg.to_radians();
    DVec2::new(rad.sin(), -rad.cos())
}

/// Rotate a local offset by a heading in degrees, using the same clockwise convention
#[inline]
pub fn rotate_local(local: DVec2, heading_deg: f64) -> DVec2 {
    let rad = heading_deg.to_radians();
    let (sin_a, cos_a) = rad.sin_cos();
    DVec2::new(
        local.x * cos_a - local.y * sin_a,
        local.x * sin_a + local.y * cos_a,
    )
}
