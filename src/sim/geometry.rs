//! Straight-segment geometry shared by walls, sensor rays and the car outline
//!
//! Everything here is a total function over finite coordinates. NaN or infinite
//! inputs are not checked and give unspecified results.

use glam::DVec2;
use serde::{Deserialize, Serialize};

/// A finite straight line between two points (wall edge or sensor ray)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub p1: DVec2,
    pub p2: DVec2,
}

impl Segment {
    pub fn new(p1: DVec2, p2: DVec2) -> Self {
        Self { p1, p2 }
    }

    #[inline]
    pub fn length(&self) -> f64 {
        self.p1.distance(self.p2)
    }

    /// Intersection point with another segment, if they cross
    #[inline]
    pub fn intersection(&self, other: &Segment) -> Option<DVec2> {
        intersect(self.p1, self.p2, other.p1, other.p2)
    }
}

/// Intersection of segments `a1-a2` and `b1-b2`
///
/// Solves the two-line parametric system and accepts the hit only when both
/// parameters lie in the closed interval `[0, 1]`, so touching an endpoint
/// counts. Parallel and collinear pairs (`denom == 0`) never intersect, even
/// when they overlap.
///
/// The zero test on `denom` is exact. Nearly parallel segments therefore give
/// very large `t`/`u` values that are rejected by the range check rather than
/// by a tolerance.
pub fn intersect(a1: DVec2, a2: DVec2, b1: DVec2, b2: DVec2) -> Option<DVec2> {
    let denom = (a1.x - a2.x) * (b1.y - b2.y) - (a1.y - a2.y) * (b1.x - b2.x);
    if denom == 0.0 {
        return None;
    }

    let t = ((a1.x - b1.x) * (b1.y - b2.y) - (a1.y - b1.y) * (b1.x - b2.x)) / denom;
    let u = -((a1.x - a2.x) * (a1.y - b1.y) - (a1.y - a2.y) * (a1.x - b1.x)) / denom;

    if (0.0..=1.0).contains(&t) && (0.0..=1.0).contains(&u) {
        Some(a1 + t * (a2 - a1))
    } else {
        None
    }
}
