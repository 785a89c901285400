//! Fixed-interval frame sampling for shot playback
//!
//! The stepper lands on collision instants; animation wants evenly spaced
//! frames. The sampler sub-steps through every event inside a frame and
//! snapshots the state exactly on each frame boundary.

use glam::DVec2;

use super::state::State;
use super::table::Table;
use super::tick::{settle, step};
use crate::error::SimResult;
use crate::settings::Settings;

/// Simulate a shot from `state` and return `settings.frame_count()` snapshots
///
/// Frame `i` is the table `i * frame_interval` seconds after `state`; frame 0
/// is `state` itself. The sequence always has the full length, whether or not
/// the balls have come to rest.
pub fn simulate_shot(state: &State, table: &Table, settings: &Settings) -> SimResult<Vec<State>> {
    settings.validate()?;
    state.validate()?;
    let count = settings.frame_count();
    let start = state.time;

    let mut frames = Vec::with_capacity(count);
    let mut current = state.clone();
    let mut resolved = 0usize;
    for i in 0..count {
        let boundary = start + i as f64 * settings.frame_interval;
        let mut events = 0u32;
        while current.time < boundary {
            let remaining = boundary - current.time;
            if events >= settings.max_substeps {
                log::warn!(
                    "Frame {} hit the sub-step cap ({}); settling the table {:.6}s before the boundary",
                    i,
                    settings.max_substeps,
                    remaining
                );
                current = settle(&current, remaining);
                break;
            }
            let out = step(&current, table, remaining)?;
            current = out.state;
            if out.event.is_none() {
                break;
            }
            events += 1;
        }
        resolved += events as usize;
        current.time = boundary;
        frames.push(current.clone());
    }

    let pocketed = current.balls.iter().filter(|b| !b.on_table()).count();
    log::info!(
        "Simulated {} frames: {} events, {} balls pocketed, at rest: {}",
        frames.len(),
        resolved,
        pocketed,
        current.at_rest()
    );
    Ok(frames)
}

/// Ball centers per frame (index 0 is the cue ball), for the animation layer
pub fn ball_positions(frames: &[State]) -> Vec<Vec<DVec2>> {
    frames.iter().map(State::positions).collect()
}

/// Strike the cue ball toward `finger` at `speed` and return the per-frame ball positions
pub fn find_all_states(
    state: &State,
    table: &Table,
    settings: &Settings,
    finger: DVec2,
    speed: f64,
) -> SimResult<Vec<Vec<DVec2>>> {
    let mut start = state.clone();
    start.strike_toward(finger, speed)?;
    let frames = simulate_shot(&start, table, settings)?;
    Ok(ball_positions(&frames))
}
