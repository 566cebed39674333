//! Simulation state: the car, the episode phase and the context that owns them
//!
//! `SimState` replaces any process-wide game state. The caller owns it and
//! passes it to `tick` once per frame.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::sensors::{SensorReading, sense};
use super::track::{StartPose, Track};
use crate::consts::*;
use crate::settings::SimConfig;
use crate::{heading_vector, rotate_local};

/// Current phase of an episode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Episode {
    /// Car placed on the track, controls ignored
    #[default]
    Idle,
    /// Controls applied every tick
    Running,
    /// Car touched a wall. Terminal until reset.
    Collided,
}

/// The four driver controls for one tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Controls {
    pub up: bool,
    pub left: bool,
    pub right: bool,
    pub down: bool,
}

impl Controls {
    pub fn new(up: bool, left: bool, right: bool, down: bool) -> Self {
        Self {
            up,
            left,
            right,
            down,
        }
    }

    /// Accelerate only
    pub fn throttle() -> Self {
        Self {
            up: true,
            ..Default::default()
        }
    }
}

/// Car footprint and handling
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VehicleParams {
    pub width: f64,
    pub height: f64,
    pub max_speed: f64,
    /// Speed change per tick
    pub acceleration: f64,
    /// Degrees per tick
    pub rotation_speed: f64,
}

impl Default for VehicleParams {
    fn default() -> Self {
        Self {
            width: CAR_WIDTH,
            height: CAR_HEIGHT,
            max_speed: CAR_MAX_SPEED,
            acceleration: CAR_ACC,
            rotation_speed: ROTATION_SPEED,
        }
    }
}

/// Pose and motion of the car
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleState {
    /// Center of the car
    pub position: DVec2,
    /// Degrees, 0 = up, clockwise positive. Never wrapped.
    pub heading: f64,
    /// Distance travelled per tick, within [0, max_speed]
    pub speed: f64,
    /// Whether controls are applied this tick
    pub active: bool,
}

impl VehicleState {
    /// A stationary, inactive car at the given pose
    pub fn at(pose: StartPose) -> Self {
        Self {
            position: pose.position,
            heading: pose.heading,
            speed: 0.0,
            active: false,
        }
    }

    /// Advance one tick: rotate, then accelerate, then translate
    ///
    /// Does nothing while inactive. `up` wins over `down` when both are held.
    pub fn tick(&mut self, controls: Controls, params: &VehicleParams) {
        if !self.active {
            return;
        }

        if controls.left {
            self.heading -= params.rotation_speed;
        }
        if controls.right {
            self.heading += params.rotation_speed;
        }

        if controls.up {
            self.speed += params.acceleration;
        } else if controls.down {
            self.speed -= params.acceleration;
        }
        self.speed = self.speed.clamp(0.0, params.max_speed);

        self.position += heading_vector(self.heading) * self.speed;
    }

    /// Corners of the oriented bounding rectangle
    ///
    /// Fixed winding: front-left, front-right, rear-right, rear-left (for heading 0).
    /// Consecutive pairs, wrapping at the end, are the four edges.
    pub fn corners(&self, params: &VehicleParams) -> [DVec2; 4] {
        let half_w = params.width / 2.0;
        let half_h = params.height / 2.0;
        [
            DVec2::new(-half_w, -half_h),
            DVec2::new(half_w, -half_h),
            DVec2::new(half_w, half_h),
            DVec2::new(-half_w, half_h),
        ]
        .map(|local| self.position + rotate_local(local, self.heading))
    }
}

/// Complete simulation context for one car on one track
#[derive(Debug, Clone)]
pub struct SimState {
    /// Track being driven (read-only during a tick)
    pub track: Track,
    /// The car
    pub vehicle: VehicleState,
    /// Current phase
    pub episode: Episode,
    /// Tuning in effect
    pub config: SimConfig,
    /// Readings for the next decision
    pub reading: SensorReading,
    /// Ticks since the last reset
    pub time_ticks: u64,
}

impl SimState {
    /// Place a fresh car at the track's start pose, in `Idle`
    pub fn new(track: Track, config: SimConfig) -> Self {
        let vehicle = VehicleState::at(track.start());
        let reading = sense(&vehicle, &track, config.sensor_length);
        Self {
            track,
            vehicle,
            episode: Episode::Idle,
            config,
            reading,
            time_ticks: 0,
        }
    }

    /// Corners of the car under the current configuration
    pub fn corners(&self) -> [DVec2; 4] {
        self.vehicle.corners(&self.config.vehicle)
    }

    /// Recompute `reading` from the current pose
    pub fn refresh_sensors(&mut self) {
        self.reading = sense(&self.vehicle, &self.track, self.config.sensor_length);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn running_at(x: f64, y: f64, heading: f64) -> VehicleState {
        VehicleState {
            position: DVec2::new(x, y),
            heading,
            speed: 0.0,
            active: true,
        }
    }

    #[test]
    fn test_inactive_car_ignores_controls() {
        let params = VehicleParams::default();
        let mut car = running_at(50.0, 50.0, 0.0);
        car.active = false;
        let before = car;
        car.tick(Controls::new(true, true, false, false), &params);
        assert_eq!(car, before);
    }

    #[test]
    fn test_rest_without_input_is_unchanged() {
        let params = VehicleParams::default();
        let mut car = running_at(50.0, 50.0, 10.0);
        let before = car;
        car.tick(Controls::default(), &params);
        assert_eq!(car, before);
    }

    #[test]
    fn test_up_takes_priority_over_down() {
        let params = VehicleParams::default();
        let mut car = running_at(50.0, 50.0, 0.0);
        car.tick(Controls::new(true, false, false, true), &params);
        assert!((car.speed - CAR_ACC).abs() < 1e-12);
    }

    #[test]
    fn test_down_brakes_and_clamps_at_zero() {
        let params = VehicleParams::default();
        let mut car = running_at(50.0, 50.0, 0.0);
        car.speed = 0.01;
        car.tick(Controls::new(false, false, false, true), &params);
        assert_eq!(car.speed, 0.0);
        assert_eq!(car.position, DVec2::new(50.0, 50.0));
    }

    #[test]
    fn test_speed_clamped_to_max() {
        let params = VehicleParams::default();
        let mut car = running_at(0.0, 0.0, 0.0);
        car.speed = CAR_MAX_SPEED;
        car.tick(Controls::throttle(), &params);
        assert_eq!(car.speed, CAR_MAX_SPEED);
    }

    #[test]
    fn test_left_and_right_cancel() {
        let params = VehicleParams::default();
        let mut car = running_at(0.0, 0.0, 30.0);
        car.tick(Controls::new(false, true, true, false), &params);
        assert_eq!(car.heading, 30.0);
    }

    #[test]
    fn test_heading_zero_moves_up() {
        let params = VehicleParams::default();
        let mut car = running_at(50.0, 50.0, 0.0);
        car.tick(Controls::throttle(), &params);
        assert!((car.position.x - 50.0).abs() < 1e-12);
        assert!((car.position.y - (50.0 - CAR_ACC)).abs() < 1e-12);
    }

    #[test]
    fn test_rotation_applies_before_translation() {
        let params = VehicleParams::default();
        let mut car = running_at(0.0, 0.0, 89.0);
        car.speed = 1.0;
        car.tick(Controls::new(false, false, true, false), &params);
        // Heading is 90 when the car moves, so it goes straight right
        assert!((car.position - DVec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_corners_axis_aligned() {
        let params = VehicleParams::default();
        let car = running_at(50.0, 10.0, 0.0);
        let corners = car.corners(&params);
        assert_eq!(corners[0], DVec2::new(45.0, 0.0));
        assert_eq!(corners[1], DVec2::new(55.0, 0.0));
        assert_eq!(corners[2], DVec2::new(55.0, 20.0));
        assert_eq!(corners[3], DVec2::new(45.0, 20.0));
    }

    proptest! {
        #[test]
        fn prop_corners_form_car_rectangle(
            x in -500.0..500.0f64,
            y in -500.0..500.0f64,
            heading in -720.0..720.0f64,
        ) {
            let params = VehicleParams::default();
            let car = running_at(x, y, heading);
            let c = car.corners(&params);

            let eps = 1e-9;
            prop_assert!((c[0].distance(c[1]) - CAR_WIDTH).abs() < eps);
            prop_assert!((c[1].distance(c[2]) - CAR_HEIGHT).abs() < eps);
            prop_assert!((c[2].distance(c[3]) - CAR_WIDTH).abs() < eps);
            prop_assert!((c[3].distance(c[0]) - CAR_HEIGHT).abs() < eps);
            // Right angle at every corner
            prop_assert!((c[1] - c[0]).dot(c[2] - c[1]).abs() < 1e-6);
            // Front edge is perpendicular to the heading
            prop_assert!((c[1] - c[0]).dot(heading_vector(heading)).abs() < 1e-6);
            // Centered on the car
            let center = (c[0] + c[1] + c[2] + c[3]) / 4.0;
            prop_assert!(center.distance(car.position) < eps);
        }
    }
}
