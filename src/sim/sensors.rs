//! Fan of distance sensors cast from the car's center
//!
//! Readings are consumed positionally (e.g. as a feature vector), so their
//! order always follows `SENSOR_OFFSETS`.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::intersect;
use super::state::VehicleState;
use super::track::Track;
use crate::consts::{SENSOR_COUNT, SENSOR_OFFSETS};
use crate::heading_vector;

/// One ray of the fan
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SensorRay {
    /// Offset from heading (degrees)
    pub offset: f64,
    /// Distance to the nearest wall, or the sensor length if nothing is in range
    pub distance: f64,
    /// Nearest hit, or the ray's far end when nothing was hit
    pub endpoint: DVec2,
}

/// Readings for all rays, in `SENSOR_OFFSETS` order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorReading {
    pub rays: [SensorRay; SENSOR_COUNT],
}

impl SensorReading {
    /// `(offset, distance)` pairs
    pub fn pairs(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.rays.iter().map(|ray| (ray.offset, ray.distance))
    }

    pub fn distances(&self) -> [f64; SENSOR_COUNT] {
        self.rays.map(|ray| ray.distance)
    }

    /// Distances scaled into [0, 1] by the sensor length
    pub fn normalized(&self, sensor_length: f64) -> [f64; SENSOR_COUNT] {
        self.rays.map(|ray| ray.distance / sensor_length)
    }

    /// Straight-ahead distance
    pub fn front(&self) -> f64 {
        self.rays[0].distance
    }
}

/// Cast every ray of the fan against every wall
///
/// A ray that touches nothing reads exactly `sensor_length`, the same as a wall
/// sitting right at the tip of the ray.
pub fn sense(vehicle: &VehicleState, track: &Track, sensor_length: f64) -> SensorReading {
    debug_assert!(sensor_length > 0.0, "sensor length must be positive");

    let origin = vehicle.position;
    let rays = SENSOR_OFFSETS.map(|offset| {
        let tip = origin + heading_vector(vehicle.heading + offset) * sensor_length;

        let mut distance = sensor_length;
        let mut endpoint = tip;
        for wall in track.wall_segments() {
            if let Some(hit) = intersect(origin, tip, wall.p1, wall.p2) {
                let d = origin.distance(hit);
                if d < distance {
                    distance = d;
                    endpoint = hit;
                }
            }
        }

        SensorRay {
            offset,
            distance,
            endpoint,
        }
    });

    SensorReading { rays }
}
