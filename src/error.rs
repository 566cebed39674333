//! Error types

use std::io;

use thiserror::Error;

use crate::sim::track::Boundary;

/// Result alias for fallible crate operations
pub type Result<T> = std::result::Result<T, Error>;

/// Malformed track input. Track construction aborts; no partial track exists.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidTrackError {
    #[error("{boundary} wall needs at least 2 points, got {got}")]
    TooFewPoints { boundary: Boundary, got: usize },
}

/// Errors raised outside the per-tick simulation
#[derive(Debug, Error)]
pub enum Error {
    #[error("invalid track: {0}")]
    InvalidTrack(#[from] InvalidTrackError),

    #[error("unknown track: {0}")]
    UnknownTrack(String),

    #[error("invalid policy: {0}")]
    InvalidPolicy(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}
