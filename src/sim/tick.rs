//! Event-driven stepping
//!
//! One call advances a state to its next collision, or to the end of the
//! slice if nothing collides first. The input state is never touched.

use glam::DVec2;

use super::collision::{CollisionEvent, detect};
use super::resolve::resolve;
use super::state::State;
use super::table::Table;
use crate::error::SimResult;

/// Outcome of a single step
#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    /// State after moving and resolving
    pub state: State,
    /// The event resolved at the end of the step; `None` means the full slice elapsed
    pub event: Option<CollisionEvent>,
}

/// Advance `state` by at most `horizon` seconds, resolving at most one event
pub fn step(state: &State, table: &Table, horizon: f64) -> SimResult<Step> {
    if horizon <= 0.0 {
        return Ok(Step {
            state: state.clone(),
            event: None,
        });
    }

    let event = detect(state, table, horizon);
    let dt = event.map_or(horizon, |e| e.dt);

    let mut next = state.clone();
    roll_all(&mut next, dt, table.geometry().friction);
    if let Some(event) = &event {
        log::debug!(
            "t={:.4}: {:?} after {:.6}s",
            next.time + dt,
            event.kind,
            event.dt
        );
        resolve(&mut next, table, &event.kind)?;
    }
    next.time += dt;

    Ok(Step { state: next, event })
}

/// Bring every on-table ball to rest where it is and advance the clock by `dt`
///
/// The fallback for a frame that has resolved too many events: nothing
/// moves, so nothing can pass through a rail or another ball.
pub fn settle(state: &State, dt: f64) -> State {
    let mut next = state.clone();
    for ball in next.balls.iter_mut().filter(|b| b.on_table()) {
        ball.vel = DVec2::ZERO;
    }
    next.time += dt;
    next
}

fn roll_all(state: &mut State, dt: f64, friction: f64) {
    for ball in state.balls.iter_mut().filter(|b| b.on_table()) {
        ball.roll(dt, friction);
    }
}
