//! Track registry
//!
//! Maps track names to their data, resolved when the registry is built: a
//! table of built-in tracks plus any `*.json` track files found in a directory.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::error::{Error, InvalidTrackError, Result};
use crate::sim::{StartPose, Track};

/// Track loaded when none is named
pub const DEFAULT_TRACK: &str = "track1";

/// Raw track description as stored on disk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackData {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub outer_walls: Vec<DVec2>,
    #[serde(default)]
    pub inner_walls: Vec<DVec2>,
    pub car_start: DVec2,
    /// Degrees, 0 = up
    #[serde(default)]
    pub start_heading: f64,
}

impl TrackData {
    /// Validate into a track
    pub fn build(self) -> std::result::Result<Track, InvalidTrackError> {
        Track::load(
            self.outer_walls,
            self.inner_walls,
            StartPose::with_heading(self.car_start, self.start_heading),
        )
    }

    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn points(raw: &[(f64, f64)]) -> Vec<DVec2> {
    raw.iter().map(|&(x, y)| DVec2::new(x, y)).collect()
}

/// Loop with an S-curve at the bottom, both walls explicitly closed
fn track1() -> TrackData {
    TrackData {
        name: Some("track1".to_string()),
        outer_walls: points(&[
            (100.0, 100.0), (200.0, 50.0), (400.0, 50.0), (550.0, 100.0), (600.0, 200.0),
            (650.0, 300.0), (600.0, 400.0), (550.0, 450.0),
            (400.0, 500.0), (250.0, 500.0), (200.0, 450.0),
            (150.0, 350.0), (100.0, 300.0), (50.0, 200.0),
            (100.0, 150.0), (100.0, 100.0),
        ]),
        inner_walls: points(&[
            (200.0, 150.0), (300.0, 100.0), (400.0, 100.0), (500.0, 150.0), (550.0, 200.0),
            (575.0, 250.0), (550.0, 300.0), (500.0, 350.0),
            (400.0, 400.0), (300.0, 400.0), (250.0, 350.0),
            (200.0, 300.0), (150.0, 250.0), (200.0, 200.0),
            (200.0, 150.0),
        ]),
        car_start: DVec2::new(150.0, 180.0),
        start_heading: 0.0,
    }
}

/// Where a registered track comes from
#[derive(Debug, Clone)]
enum TrackSource {
    Builtin(fn() -> TrackData),
    File(PathBuf),
}

/// Name -> track lookup
#[derive(Debug, Clone, Default)]
pub struct TrackRegistry {
    sources: BTreeMap<String, TrackSource>,
}

impl TrackRegistry {
    /// Empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in tracks
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_builtin("track1", track1);
        registry
    }

    /// Add a built-in track, replacing any track with the same name
    pub fn register_builtin(&mut self, name: &str, data: fn() -> TrackData) {
        self.sources.insert(name.to_string(), TrackSource::Builtin(data));
    }

    /// Add a JSON track file, replacing any track with the same name
    pub fn register_file(&mut self, name: &str, path: impl Into<PathBuf>) {
        self.sources.insert(name.to_string(), TrackSource::File(path.into()));
    }

    /// Register every `*.json` file in a directory under its file stem
    pub fn scan_dir(&mut self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();
        let mut found = 0;
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()).map(str::to_string) else {
                log::warn!("Skipping track file with non UTF-8 name: {}", path.display());
                continue;
            };
            self.register_file(&name, path);
            found += 1;
        }
        log::info!("Found {} track files in {}", found, dir.display());
        Ok(found)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.sources.contains_key(name)
    }

    /// Registered names, in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.sources.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    /// Raw data for a track
    pub fn data(&self, name: &str) -> Result<TrackData> {
        match self.sources.get(name) {
            Some(TrackSource::Builtin(data)) => Ok(data()),
            Some(TrackSource::File(path)) => TrackData::from_json(&fs::read_to_string(path)?),
            None => Err(Error::UnknownTrack(name.to_string())),
        }
    }

    /// Load and validate a track
    pub fn load(&self, name: &str) -> Result<Track> {
        let track = self.data(name)?.build()?;
        log::info!(
            "Loaded track {} ({} wall segments)",
            name,
            track.wall_segments().count()
        );
        Ok(track)
    }

    /// Name following `current` in sorted order, wrapping around
    pub fn next_after(&self, current: &str) -> Option<&str> {
        let mut after = self
            .sources
            .range::<str, _>((std::ops::Bound::Excluded(current), std::ops::Bound::Unbounded))
            .map(|(name, _)| name.as_str());
        after.next().or_else(|| self.names().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("racetrack_tracks_{}_{}", tag, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn test_builtin_track1_loads() {
        let registry = TrackRegistry::builtin();
        let track = registry.load(DEFAULT_TRACK).unwrap();
        // 15 outer + 14 inner edges, closure included in the data
        assert_eq!(track.wall_segments().count(), 29);
        assert_eq!(track.start().position, DVec2::new(150.0, 180.0));
    }

    #[test]
    fn test_unknown_track() {
        let registry = TrackRegistry::builtin();
        assert!(matches!(registry.load("nope"), Err(Error::UnknownTrack(name)) if name == "nope"));
    }

    #[test]
    fn test_json_round_trip_and_defaults() {
        let json = r#"{"outer_walls": [[0, 0], [10, 0]], "car_start": [5, 5]}"#;
        let data = TrackData::from_json(json).unwrap();
        assert!(data.inner_walls.is_empty());
        assert_eq!(data.start_heading, 0.0);

        let again = TrackData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(again, data);
    }

    #[test]
    fn test_invalid_track_file() {
        let dir = temp_dir("invalid");
        fs::write(dir.join("bad.json"), r#"{"outer_walls": [[0, 0]], "car_start": [0, 0]}"#).unwrap();

        let mut registry = TrackRegistry::new();
        assert_eq!(registry.scan_dir(&dir).unwrap(), 1);
        assert!(matches!(registry.load("bad"), Err(Error::InvalidTrack(_))));
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_scan_dir_registers_json_only() {
        let dir = temp_dir("scan");
        let data = TrackData {
            name: None,
            outer_walls: vec![DVec2::new(0.0, 0.0), DVec2::new(100.0, 0.0)],
            inner_walls: vec![],
            car_start: DVec2::new(50.0, 50.0),
            start_heading: 90.0,
        };
        fs::write(dir.join("oval.json"), data.to_json().unwrap()).unwrap();
        fs::write(dir.join("notes.txt"), "not a track").unwrap();

        let mut registry = TrackRegistry::builtin();
        assert_eq!(registry.scan_dir(&dir).unwrap(), 1);
        assert!(registry.contains("oval"));
        assert!(!registry.contains("notes"));

        let track = registry.load("oval").unwrap();
        assert_eq!(track.start().heading, 90.0);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_next_after_cycles() {
        let mut registry = TrackRegistry::builtin();
        registry.register_builtin("track2", track1);
        registry.register_builtin("track3", track1);

        assert_eq!(registry.next_after("track1"), Some("track2"));
        assert_eq!(registry.next_after("track3"), Some("track1"));
        assert_eq!(TrackRegistry::new().next_after("track1"), None);
    }
}
