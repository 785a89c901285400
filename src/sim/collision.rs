//! Continuous collision detection
//!
//! Every test here is exact: it solves for the time at which a ball moving
//! in a straight line first touches a collider, instead of stepping and
//! checking for overlap. `detect` runs all four scans over a time slice and
//! keeps the earliest event.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::state::{Ball, State};
use super::table::{Jaw, Pocket, Rail, Table};
use crate::consts::EPSILON;

/// What collided
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// Balls `a` and `b` touch (`a < b`)
    BallBall { a: usize, b: usize },
    /// A ball reaches a straight rail
    Wall { ball: usize, rail: Rail },
    /// A ball's center enters a pocket's capture circle
    Pocket { ball: usize, pocket: usize },
    /// A ball reaches one of the angled jaws beside a pocket
    PocketWall { ball: usize, jaw: usize },
}

/// The earliest event in a slice, `dt` seconds after the state it was detected in
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CollisionEvent {
    pub dt: f64,
    pub kind: EventKind,
}

/// Time until two circles in linear relative motion close to center distance `reach`
///
/// `dp` and `dv` are the relative position and velocity. Returns `None` when
/// the pair is not moving relative to each other, is receding, misses, or
/// already overlaps.
pub fn time_of_impact(dp: DVec2, dv: DVec2, reach: f64) -> Option<f64> {
    let dist = dp.length();
    let speed = dv.length();
    if dist <= EPSILON || speed <= EPSILON {
        return None;
    }

    let closing_cos = -dp.dot(dv) / (dist * speed);
    if closing_cos <= 0.0 {
        return None;
    }

    let b = 2.0 * dist * closing_cos;
    let disc = b * b - 4.0 * (dist * dist - reach * reach);
    if disc < 0.0 {
        return None;
    }

    let t = (b - disc.sqrt()) / (2.0 * speed);
    (t > 0.0).then_some(t)
}

/// Time until two balls touch
#[inline]
pub fn ball_ball_time(a: &Ball, b: &Ball, radius: f64) -> Option<f64> {
    time_of_impact(a.pos - b.pos, a.vel - b.vel, 2.0 * radius)
}

/// Time until a ball's center comes within a pocket's capture reach
///
/// The pocket is a stationary phantom ball of radius `pocket.radius - radius`,
/// so the closing distance works out to the pocket's reach.
#[inline]
pub fn pocket_time(ball: &Ball, pocket: &Pocket) -> Option<f64> {
    time_of_impact(ball.pos - pocket.center, ball.vel, pocket.radius)
}

/// Time until a ball reaches `rail`, if it gets there within `horizon`
///
/// Crossings that land in a pocket gap are not rail hits; the pocket and jaw
/// scans handle those.
pub fn wall_time(ball: &Ball, rail: Rail, table: &Table, horizon: f64) -> Option<f64> {
    let g = table.geometry();
    let r = g.ball_radius;
    let (pos, vel) = (ball.pos, ball.vel);
    let next = pos + vel * horizon;

    let t = match rail {
        Rail::Bottom if vel.y < 0.0 && next.y < r => (r - pos.y) / vel.y,
        Rail::Right if vel.x > 0.0 && next.x > g.width - r => (g.width - r - pos.x) / vel.x,
        Rail::Top if vel.y > 0.0 && next.y > g.height - r => (g.height - r - pos.y) / vel.y,
        Rail::Left if vel.x < 0.0 && next.x < r => (r - pos.x) / vel.x,
        _ => return None,
    };
    if t <= 0.0 {
        return None;
    }

    let contact = pos + vel * t;
    let along = if rail.is_horizontal() {
        contact.x
    } else {
        contact.y
    };
    table.rail_contains(rail, along).then_some(t)
}

/// Time until a ball touches a jaw
///
/// Either the flat face or the tip at `start`, where the jaw meets its
/// straight rail. The tip closes the seam between a rail and its jaw: a ball
/// crossing the gap just past the rail's end strikes it instead of leaving
/// the table.
pub fn jaw_time(ball: &Ball, jaw: &Jaw, radius: f64) -> Option<f64> {
    let face = jaw_face_time(ball, jaw, radius);
    let tip = jaw_tip_time(ball, jaw, radius);
    match (face, tip) {
        (Some(a), Some(b)) => Some(a.min(b)),
        (a, b) => a.or(b),
    }
}

/// Time until a ball touches the flat face of a jaw
///
/// The ball must approach from the jaw's normal side. If it drifts past the
/// pocket end of the jaw before closing onto the jaw's line it slips into
/// the pocket instead.
pub fn jaw_face_time(ball: &Ball, jaw: &Jaw, radius: f64) -> Option<f64> {
    let approach = ball.vel.dot(jaw.normal);
    if approach >= 0.0 {
        return None;
    }

    let offset = ball.pos - jaw.start;
    let gap = offset.dot(jaw.normal) - radius;
    if gap <= 0.0 {
        return None;
    }
    let t_line = gap / -approach;

    let along = offset.dot(jaw.dir);
    let drift = ball.vel.dot(jaw.dir);
    if drift > 0.0 {
        let t_end = (jaw.length - along) / drift;
        if t_end < t_line {
            return None;
        }
    }

    let contact = along + drift * t_line;
    (contact >= 0.0 && contact <= jaw.length).then_some(t_line)
}

/// Time until a ball touches the tip shared by a jaw and its rail
#[inline]
pub fn jaw_tip_time(ball: &Ball, jaw: &Jaw, radius: f64) -> Option<f64> {
    time_of_impact(ball.pos - jaw.start, ball.vel, radius)
}

/// Running minimum over candidate events; ties keep the first offer
struct Earliest {
    bound: f64,
    event: Option<CollisionEvent>,
}

impl Earliest {
    fn new(bound: f64) -> Self {
        Self { bound, event: None }
    }

    fn offer(&mut self, t: Option<f64>, kind: EventKind) {
        if let Some(t) = t
            && t > 0.0
            && t < self.bound
        {
            self.bound = t;
            self.event = Some(CollisionEvent { dt: t, kind });
        }
    }
}

/// Find the earliest event within `horizon` seconds of `state`
///
/// Scans ball-ball pairs, then pockets, then rails, then jaws. An event only
/// replaces the current best if it is strictly earlier, so on exact ties the
/// scan order is the priority. Pocketed balls are never considered.
pub fn detect(state: &State, table: &Table, horizon: f64) -> Option<CollisionEvent> {
    let r = table.ball_radius();
    let live: Vec<&Ball> = state.balls.iter().filter(|b| b.on_table()).collect();
    let mut earliest = Earliest::new(horizon);

    for (i, a) in live.iter().enumerate() {
        for b in &live[i + 1..] {
            earliest.offer(
                ball_ball_time(a, b, r),
                EventKind::BallBall { a: a.id, b: b.id },
            );
        }
    }

    for ball in &live {
        for pocket in table.pockets() {
            earliest.offer(
                pocket_time(ball, pocket),
                EventKind::Pocket {
                    ball: ball.id,
                    pocket: pocket.id,
                },
            );
        }
    }

    for ball in &live {
        for rail in Rail::ALL {
            earliest.offer(
                wall_time(ball, rail, table, horizon),
                EventKind::Wall { ball: ball.id, rail },
            );
        }
    }

    for ball in &live {
        for jaw in table.jaws() {
            earliest.offer(
                jaw_time(ball, jaw, r),
                EventKind::PocketWall {
                    ball: ball.id,
                    jaw: jaw.id,
                },
            );
        }
    }

    if let Some(event) = &earliest.event {
        log::trace!("Next event in {:.6}s: {:?}", event.dt, event.kind);
    }
    earliest.event
}
