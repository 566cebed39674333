//! Racetrack bounded by an outer and an inner polyline

use std::fmt;

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::geometry::Segment;
use crate::error::InvalidTrackError;

/// Which wall of the track a polyline describes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    Outer,
    Inner,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Boundary::Outer => f.write_str("outer"),
            Boundary::Inner => f.write_str("inner"),
        }
    }
}

/// Ordered boundary points. Insertion order is connectivity order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Polyline(pub Vec<DVec2>);

impl Polyline {
    pub fn new(points: Vec<DVec2>) -> Self {
        Self(points)
    }

    pub fn points(&self) -> &[DVec2] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Segments between consecutive points. The last-to-first edge is not included.
    pub fn segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.0.windows(2).map(|pair| Segment::new(pair[0], pair[1]))
    }

    /// Points of the closed loop as drawn, repeating the first point at the end
    /// unless the data already does.
    pub fn closed_loop(&self) -> Vec<DVec2> {
        let mut points = self.0.clone();
        if let (Some(&first), Some(&last)) = (points.first(), points.last()) {
            if points.len() > 1 && first != last {
                points.push(first);
            }
        }
        points
    }
}

impl From<Vec<DVec2>> for Polyline {
    fn from(points: Vec<DVec2>) -> Self {
        Self(points)
    }
}

/// Where and how the car is placed at the start of an episode
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StartPose {
    pub position: DVec2,
    /// Degrees, 0 = up, clockwise positive
    #[serde(default)]
    pub heading: f64,
}

impl StartPose {
    pub fn new(position: DVec2) -> Self {
        Self {
            position,
            heading: 0.0,
        }
    }

    pub fn with_heading(position: DVec2, heading: f64) -> Self {
        Self { position, heading }
    }
}

/// A validated racetrack
///
/// Wall segments are derived from the polylines on every call, so the two can
/// never disagree.
#[derive(Debug, Clone, PartialEq)]
pub struct Track {
    outer: Polyline,
    inner: Polyline,
    start: StartPose,
}

impl Track {
    /// Build a track from its two boundaries and start pose
    ///
    /// The outer wall needs at least 2 points. The inner wall may be empty
    /// (no inner wall) but a single point is rejected.
    pub fn load(
        outer: Vec<DVec2>,
        inner: Vec<DVec2>,
        start: StartPose,
    ) -> Result<Self, InvalidTrackError> {
        let outer = Polyline::new(outer);
        let inner = Polyline::new(inner);

        if outer.len() < 2 {
            return Err(InvalidTrackError::TooFewPoints {
                boundary: Boundary::Outer,
                got: outer.len(),
            });
        }
        if !inner.is_empty() && inner.len() < 2 {
            return Err(InvalidTrackError::TooFewPoints {
                boundary: Boundary::Inner,
                got: inner.len(),
            });
        }

        Ok(Self {
            outer,
            inner,
            start,
        })
    }

    pub fn outer(&self) -> &Polyline {
        &self.outer
    }

    pub fn inner(&self) -> &Polyline {
        &self.inner
    }

    pub fn start(&self) -> StartPose {
        self.start
    }

    /// All wall segments: outer polyline edges, then inner polyline edges
    ///
    /// Neither loop gets its closing last-to-first edge. Track data that wants a
    /// closed wall repeats the first point at the end.
    pub fn wall_segments(&self) -> impl Iterator<Item = Segment> + '_ {
        self.outer.segments().chain(self.inner.segments())
    }

    /// Closed outline of one boundary for drawing. Not used for sensing or collisions.
    pub fn closed_outline(&self, boundary: Boundary) -> Vec<DVec2> {
        match boundary {
            Boundary::Outer => self.outer.closed_loop(),
            Boundary::Inner => self.inner.closed_loop(),
        }
    }
}
