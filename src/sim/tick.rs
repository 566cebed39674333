//! Per-tick episode update
//!
//! Episode transitions:
//! - `Idle -> Running` on start
//! - `Running -> Idle` on stop (pose and speed kept)
//! - `Running -> Collided` when the post-move pose touches a wall
//! - any phase `-> Idle` on reset, with a fresh car at the start pose
//!
//! There is no way from `Collided` back to `Running` without a reset.

use super::collision::{Contact, find_contact};
use super::state::{Controls, Episode, SimState, VehicleState};
use super::track::Track;
use crate::controller::DecisionSource;

/// Commands for a single tick
#[derive(Debug, Clone, Copy, Default)]
pub struct TickInput {
    /// Driver controls
    pub controls: Controls,
    /// Start driving (space)
    pub start: bool,
    /// Stop driving without resetting
    pub stop: bool,
    /// Put a fresh car on the start pose (enter)
    pub reset: bool,
}

impl TickInput {
    pub fn drive(controls: Controls) -> Self {
        Self {
            controls,
            ..Default::default()
        }
    }
}

/// Something that happened during a tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SimEvent {
    Started,
    Stopped,
    Reset,
    Collided(Contact),
}

/// Begin an episode. Only valid from `Idle`.
pub fn start(state: &mut SimState) -> Option<SimEvent> {
    match state.episode {
        Episode::Idle => {
            state.episode = Episode::Running;
            state.vehicle.active = true;
            log::info!("Episode started at tick {}", state.time_ticks);
            Some(SimEvent::Started)
        }
        Episode::Running => None,
        Episode::Collided => {
            log::debug!("Start ignored: episode collided, reset first");
            None
        }
    }
}

/// Pause a running episode
pub fn stop(state: &mut SimState) -> Option<SimEvent> {
    if state.episode != Episode::Running {
        return None;
    }
    state.episode = Episode::Idle;
    state.vehicle.active = false;
    log::info!("Episode stopped at tick {}", state.time_ticks);
    Some(SimEvent::Stopped)
}

/// Replace the car with a fresh one at the track's start pose
pub fn reset(state: &mut SimState) -> SimEvent {
    state.vehicle = VehicleState::at(state.track.start());
    state.episode = Episode::Idle;
    state.time_ticks = 0;
    state.refresh_sensors();
    log::info!("Episode reset");
    SimEvent::Reset
}

/// Swap in another track and reset onto it
pub fn load_track(state: &mut SimState, track: Track) -> SimEvent {
    state.track = track;
    reset(state)
}

/// Advance the simulation by one tick
///
/// Signals are handled first (reset, then stop, then start), then the car
/// moves. Collisions are only checked while running, against the pose after
/// the move. Sensors are recomputed unless the tick ended in a collision.
pub fn tick(state: &mut SimState, input: &TickInput) -> Vec<SimEvent> {
    let mut events = Vec::new();

    if input.reset {
        events.push(reset(state));
    }
    if input.stop {
        events.extend(stop(state));
    }
    if input.start {
        events.extend(start(state));
    }

    if state.episode != Episode::Running {
        return events;
    }

    state.time_ticks += 1;
    state.vehicle.tick(input.controls, &state.config.vehicle);

    if let Some(contact) = find_contact(&state.vehicle, &state.track, &state.config.vehicle) {
        state.episode = Episode::Collided;
        state.vehicle.active = false;
        log::info!(
            "Collision after {} ticks at ({:.1}, {:.1})",
            state.time_ticks,
            contact.point.x,
            contact.point.y
        );
        events.push(SimEvent::Collided(contact));
        return events;
    }

    state.refresh_sensors();
    events
}

/// One decision cycle: ask the source for controls from the current readings, then tick
///
/// Returns the controls used along with the tick's events. The source is
/// consulted even while idle, mirroring a controller that polls every frame.
pub fn step(
    state: &mut SimState,
    source: &mut dyn DecisionSource,
    signals: TickInput,
) -> (Controls, Vec<SimEvent>) {
    let controls = source.decide(state.vehicle.speed, &state.reading);
    let input = TickInput {
        controls,
        ..signals
    };
    let events = tick(state, &input);
    (controls, events)
}
