//! Collision detection between the car outline and the track walls
//!
//! The test is discrete: only the pose at the end of a tick is checked. A car
//! that moves farther than its own length in one tick can pass through a wall
//! without any edge ever crossing it. At the default top speed (5 px/tick for a
//! 20 px car) this cannot happen.

use glam::DVec2;

use super::geometry::intersect;
use super::state::{VehicleParams, VehicleState};
use super::track::Track;

/// Where the car outline first crossed a wall
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// Car edge index (corner `i` to corner `i + 1`)
    pub edge: usize,
    /// Index into `Track::wall_segments`
    pub wall: usize,
    /// Intersection point
    pub point: DVec2,
}

/// First car edge / wall crossing, scanning edges in corner order
pub fn find_contact(vehicle: &VehicleState, track: &Track, params: &VehicleParams) -> Option<Contact> {
    let corners = vehicle.corners(params);

    for edge in 0..corners.len() {
        let p1 = corners[edge];
        let p2 = corners[(edge + 1) % corners.len()];

        for (wall, segment) in track.wall_segments().enumerate() {
            if let Some(point) = intersect(p1, p2, segment.p1, segment.p2) {
                return Some(Contact { edge, wall, point });
            }
        }
    }

    None
}

/// Check if any edge of the car outline crosses any wall
#[inline]
pub fn collides(vehicle: &VehicleState, track: &Track, params: &VehicleParams) -> bool {
    find_contact(vehicle, track, params).is_some()
}
