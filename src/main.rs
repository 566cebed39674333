//! Racetrack Sim headless runner
//!
//! Drives one episode on a named track with either held keys or a learned
//! policy, optionally recording telemetry, and reports how it ended.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use racetrack_sim::controller::{DecisionSource, HumanInput, MlpPolicy};
use racetrack_sim::sim::{self, Controls, Episode, SimEvent, SimState, TickInput};
use racetrack_sim::telemetry::{Recorder, TelemetryFrame};
use racetrack_sim::tracks::{DEFAULT_TRACK, TrackRegistry};
use racetrack_sim::{Result, SimConfig};

#[derive(Parser, Debug)]
#[command(name = "racetrack-sim", about = "Drive a car around a racetrack without a window")]
struct Args {
    /// Track name
    #[arg(short, long, default_value = DEFAULT_TRACK)]
    track: String,

    /// Directory of additional *.json tracks
    #[arg(long)]
    tracks_dir: Option<PathBuf>,

    /// Settings file (JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Policy weights (JSON). Without one, the held keys below drive the car.
    #[arg(short, long)]
    policy: Option<PathBuf>,

    /// Held keys for a keyboard-style run, any of: up, left, right, down
    #[arg(long, value_delimiter = ',', default_value = "up")]
    hold: Vec<String>,

    /// Maximum number of ticks
    #[arg(long, default_value_t = 3600)]
    ticks: u64,

    /// Record telemetry to this CSV file
    #[arg(short, long)]
    record: Option<PathBuf>,

    /// List registered tracks and exit
    #[arg(long)]
    list: bool,
}

fn held_controls(keys: &[String]) -> Controls {
    let mut controls = Controls::default();
    for key in keys {
        match key.trim().to_lowercase().as_str() {
            "up" => controls.up = true,
            "left" => controls.left = true,
            "right" => controls.right = true,
            "down" => controls.down = true,
            "" => {}
            other => log::warn!("Ignoring unknown key: {}", other),
        }
    }
    controls
}

fn run(args: Args) -> Result<()> {
    let mut registry = TrackRegistry::builtin();
    if let Some(dir) = &args.tracks_dir {
        registry.scan_dir(dir)?;
    }

    if args.list {
        for name in registry.names() {
            println!("{name}");
        }
        return Ok(());
    }

    let config = match &args.config {
        Some(path) => SimConfig::load(path)?,
        None => SimConfig::default(),
    };

    let mut source: Box<dyn DecisionSource> = match &args.policy {
        Some(path) => Box::new(MlpPolicy::load(path)?.or_sensor_length(config.sensor_length)?),
        None => Box::new(HumanInput::holding(held_controls(&args.hold))),
    };

    let track = registry.load(&args.track)?;
    let mut state = SimState::new(track, config);
    let mut recorder = args.record.as_ref().map(Recorder::new);
    if let Some(recorder) = recorder.as_mut() {
        recorder.toggle()?;
    }

    sim::start(&mut state);
    for _ in 0..args.ticks {
        let reading = state.reading.clone();
        let (controls, events) = sim::step(&mut state, source.as_mut(), TickInput::default());

        if let Some(recorder) = recorder.as_mut() {
            recorder.record(TelemetryFrame::new(state.vehicle.speed, &reading, controls));
        }
        if events.iter().any(|e| matches!(e, SimEvent::Collided(_))) {
            break;
        }
    }

    if let Some(recorder) = recorder.as_mut() {
        recorder.toggle()?;
    }

    let vehicle = &state.vehicle;
    match state.episode {
        Episode::Collided => println!(
            "Crashed after {} ticks at ({:.1}, {:.1})",
            state.time_ticks, vehicle.position.x, vehicle.position.y
        ),
        _ => println!(
            "Survived {} ticks at ({:.1}, {:.1}), speed {:.2}",
            state.time_ticks, vehicle.position.x, vehicle.position.y, vehicle.speed
        ),
    }
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Racetrack Sim (headless) starting...");

    match run(Args::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
