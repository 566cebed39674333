//! Deterministic simulation module
//!
//! All driving logic lives here. This module must stay pure and deterministic:
//! - One update per tick, no wall-clock time
//! - No randomness
//! - Stable iteration order (walls in track order, rays in fan order)
//! - No rendering or platform dependencies

pub mod collision;
pub mod geometry;
pub mod sensors;
pub mod state;
pub mod tick;
pub mod track;

pub use collision::{Contact, collides, find_contact};
pub use geometry::{Segment, intersect};
pub use sensors::{SensorRay, SensorReading, sense};
pub use state::{Controls, Episode, SimState, VehicleParams, VehicleState};
pub use tick::{SimEvent, TickInput, load_track, reset, start, step, stop, tick};
pub use track::{Boundary, Polyline, StartPose, Track};
