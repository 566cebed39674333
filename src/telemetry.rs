//! Per-tick telemetry recording
//!
//! Frames are buffered while recording is on and written as CSV when it is
//! switched off. The column layout is the one the training pipeline reads.

use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::Result;
use crate::consts::SENSOR_COUNT;
use crate::sim::{Controls, SensorReading};

/// CSV header, one column per field of `TelemetryFrame`
pub const CSV_HEADER: [&str; 1 + SENSOR_COUNT + 4] = [
    "speed",
    "dist_front",
    "dist_left_15",
    "dist_right_15",
    "dist_left_30",
    "dist_right_30",
    "dist_left_45",
    "dist_right_45",
    "dist_left_60",
    "dist_right_60",
    "dist_left_75",
    "dist_right_75",
    "dist_left_90",
    "dist_right_90",
    "left_pressed",
    "right_pressed",
    "down_pressed",
    "up_pressed",
];

/// One training sample
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TelemetryFrame {
    pub speed: f64,
    pub distances: [f64; SENSOR_COUNT],
    pub controls: Controls,
}

impl TelemetryFrame {
    pub fn new(speed: f64, reading: &SensorReading, controls: Controls) -> Self {
        Self {
            speed,
            distances: reading.distances(),
            controls,
        }
    }

    /// Field values in `CSV_HEADER` order, controls as 0/1
    pub fn record(&self) -> Vec<String> {
        let Controls {
            up,
            left,
            right,
            down,
        } = self.controls;
        let mut record = Vec::with_capacity(CSV_HEADER.len());
        record.push(self.speed.to_string());
        record.extend(self.distances.iter().map(f64::to_string));
        record.extend([left, right, down, up].map(|pressed| u8::from(pressed).to_string()));
        record
    }
}

/// Write frames as CSV with a header row
pub fn write_csv<W: io::Write>(frames: &[TelemetryFrame], out: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(out);
    wtr.write_record(CSV_HEADER)?;
    for frame in frames {
        wtr.write_record(frame.record())?;
    }
    wtr.flush()?;
    Ok(())
}

/// Toggleable frame buffer that flushes to a CSV file
#[derive(Debug)]
pub struct Recorder {
    path: PathBuf,
    recording: bool,
    frames: Vec<TelemetryFrame>,
}

impl Recorder {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            recording: false,
            frames: Vec::new(),
        }
    }

    pub fn is_recording(&self) -> bool {
        self.recording
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn frames(&self) -> &[TelemetryFrame] {
        &self.frames
    }

    /// Buffer a frame if recording
    pub fn record(&mut self, frame: TelemetryFrame) {
        if self.recording {
            self.frames.push(frame);
        }
    }

    /// Flip recording. Turning it off saves and clears any buffered frames.
    ///
    /// Returns the number of frames written.
    pub fn toggle(&mut self) -> Result<usize> {
        self.recording = !self.recording;
        if self.recording {
            log::info!("Recording telemetry");
            return Ok(0);
        }
        self.flush()
    }

    /// Save buffered frames, if any, and clear the buffer
    pub fn flush(&mut self) -> Result<usize> {
        if self.frames.is_empty() {
            return Ok(0);
        }
        let file = std::fs::File::create(&self.path)?;
        write_csv(&self.frames, io::BufWriter::new(file))?;

        let written = self.frames.len();
        self.frames.clear();
        log::info!("Saved {} telemetry frames to {}", written, self.path.display());
        Ok(written)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn frame(speed: f64, controls: Controls) -> TelemetryFrame {
        TelemetryFrame {
            speed,
            distances: [300.0; SENSOR_COUNT],
            controls,
        }
    }

    #[test]
    fn test_csv_layout() {
        let mut out = Vec::new();
        write_csv(&[frame(0.5, Controls::new(true, false, true, false))], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        let header = lines.next().unwrap();
        assert!(header.starts_with("speed,dist_front,dist_left_15"));
        assert!(header.ends_with("left_pressed,right_pressed,down_pressed,up_pressed"));

        let row: Vec<&str> = lines.next().unwrap().split(',').collect();
        assert_eq!(row.len(), CSV_HEADER.len());
        assert_eq!(row[0], "0.5");
        assert_eq!(row[1], "300");
        // left, right, down, up
        assert_eq!(&row[14..], &["0", "1", "0", "1"]);
    }

    #[test]
    fn test_csv_reads_back_with_header() {
        let frames = [
            frame(0.25, Controls::throttle()),
            frame(1.5, Controls::new(false, false, true, false)),
        ];
        let mut out = Vec::new();
        write_csv(&frames, &mut out).unwrap();

        let mut reader = csv::ReaderBuilder::new().from_reader(out.as_slice());
        let headers = reader.headers().unwrap().clone();
        assert_eq!(headers.iter().collect::<Vec<_>>(), CSV_HEADER);

        let rows: Vec<csv::StringRecord> = reader.records().map(|r| r.unwrap()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(&rows[0][0], "0.25");
        assert_eq!(&rows[0][17], "1");
        assert_eq!(&rows[1][0], "1.5");
        // right only
        assert_eq!(rows[1].iter().skip(14).collect::<Vec<_>>(), ["0", "1", "0", "0"]);
    }

    #[test]
    fn test_recorder_only_buffers_while_recording() {
        let path = std::env::temp_dir().join(format!("racetrack_rec_{}.csv", std::process::id()));
        let mut recorder = Recorder::new(&path);

        recorder.record(frame(1.0, Controls::default()));
        assert!(recorder.frames().is_empty());

        assert_eq!(recorder.toggle().unwrap(), 0);
        recorder.record(frame(1.0, Controls::throttle()));
        recorder.record(frame(1.1, Controls::throttle()));
        assert_eq!(recorder.frames().len(), 2);

        // Stopping writes and clears
        assert_eq!(recorder.toggle().unwrap(), 2);
        assert!(!recorder.is_recording());
        assert!(recorder.frames().is_empty());

        let saved = std::fs::read_to_string(&path).unwrap();
        assert_eq!(saved.lines().count(), 3);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_stopping_empty_recording_writes_nothing() {
        let path = std::env::temp_dir().join(format!("racetrack_empty_{}.csv", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut recorder = Recorder::new(&path);
        recorder.toggle().unwrap();
        assert_eq!(recorder.toggle().unwrap(), 0);
        assert!(!path.exists());
    }
}
