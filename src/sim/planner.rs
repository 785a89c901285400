//! Shot planning
//!
//! Ghost-ball aiming: to send a target ball toward a point, the cue ball's
//! center must arrive at the ghost point, two radii behind the target on the
//! line from that point through the target. A shot is makeable when neither
//! leg of the path is blocked by another ball.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::collision::detect;
use super::state::{CUE_BALL, State};
use super::table::{Pocket, Table};
use crate::{cartesian_to_polar, normalize_angle, polar_to_cartesian};

/// The most forgiving makeable shot found by [`best_move`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BestMove {
    /// Cue strike angle (radians) for the center of the pocket
    pub angle: f64,
    /// Ball to be pocketed
    pub target: usize,
    pub pocket: usize,
    /// Intermediate ball for a combination shot
    pub via: Option<usize>,
    /// Angular window between aiming at either edge of the pocket mouth
    pub spread: f64,
}

/// True iff ball `id` exists and has not been pocketed
pub fn on_table(state: &State, id: usize) -> bool {
    state.on_table(id)
}

/// Where the striking ball's center must be to send `target` toward `aim`
pub fn ghost_point(target: DVec2, aim: DVec2, radius: f64) -> DVec2 {
    target + (target - aim).normalize_or_zero() * (2.0 * radius)
}

/// Whether a ball travelling from `from` to `to` would clip any on-table ball not in `ignore`
pub fn is_obstructed(
    state: &State,
    table: &Table,
    from: DVec2,
    to: DVec2,
    ignore: &[usize],
) -> bool {
    let path = to - from;
    let len = path.length();
    if len == 0.0 {
        return false;
    }
    let clearance = 2.0 * table.ball_radius();

    state
        .balls
        .iter()
        .filter(|b| b.on_table() && !ignore.contains(&b.id))
        .any(|b| {
            let off_line = (b.pos - from).perp_dot(path).abs() / len;
            let after_start = (b.pos - from).dot(path) > 0.0;
            let before_end = (b.pos - to).dot(from - to) > 0.0;
            off_line < clearance && after_start && before_end
        })
}

/// Cue angle that sends `target` toward `aim`, or `None` if either leg is blocked
///
/// Cuts the cue ball cannot reach (ghost point behind the target, or off the
/// playing surface) are reported as blocked.
pub fn direct_shot(
    state: &State,
    table: &Table,
    cue: usize,
    target: usize,
    aim: DVec2,
) -> Option<f64> {
    if cue == target || !state.on_table(cue) || !state.on_table(target) {
        return None;
    }
    let cue_pos = state.ball(cue)?.pos;
    let target_pos = state.ball(target)?.pos;
    let ghost = ghost_point(target_pos, aim, table.ball_radius());
    if !on_surface(table, ghost) {
        return None;
    }

    if is_obstructed(state, table, cue_pos, ghost, &[cue])
        || is_obstructed(state, table, target_pos, aim, &[target])
    {
        return None;
    }
    Some(cartesian_to_polar(ghost - cue_pos).1)
}

/// Cue angle for `ball_b` to knock `ball_c` toward `aim`, or `None` if any leg is blocked
pub fn combo_shot(
    state: &State,
    table: &Table,
    cue: usize,
    ball_b: usize,
    ball_c: usize,
    aim: DVec2,
) -> Option<f64> {
    if ball_b == ball_c || ball_c == cue || !state.on_table(ball_c) {
        return None;
    }
    let b_pos = state.ball(ball_b)?.pos;
    let c_pos = state.ball(ball_c)?.pos;
    let ghost = ghost_point(c_pos, aim, table.ball_radius());
    if !on_surface(table, ghost) {
        return None;
    }

    if is_obstructed(state, table, b_pos, c_pos, &[ball_b, ball_c])
        || is_obstructed(state, table, c_pos, aim, &[ball_c])
    {
        return None;
    }
    direct_shot(state, table, cue, ball_b, ghost)
}

fn on_surface(table: &Table, p: DVec2) -> bool {
    let g = table.geometry();
    let r = g.ball_radius;
    p.x >= r && p.x <= g.width - r && p.y >= r && p.y <= g.height - r
}

/// Score a shot toward `pocket`: both mouth edges must be makeable
fn evaluate<F>(table: &Table, pocket: &Pocket, shoot: F) -> Option<(f64, f64)>
where
    F: Fn(DVec2) -> Option<f64>,
{
    let (edge_a, edge_b) = pocket.mouth_edges(table.geometry().pocket_radius);
    let a = shoot(edge_a)?;
    let b = shoot(edge_b)?;
    let spread = normalize_angle(b - a).abs();
    let center = shoot(pocket.center)
        .unwrap_or_else(|| normalize_angle(a + normalize_angle(b - a) / 2.0));
    Some((center, spread))
}

/// Search every candidate, pocket and combination intermediary for the widest makeable shot
pub fn best_move(state: &State, table: &Table, candidates: &[usize]) -> Option<BestMove> {
    let mut best: Option<BestMove> = None;
    let mut consider =
        |found: Option<(f64, f64)>, target: usize, pocket: usize, via: Option<usize>| {
            if let Some((angle, spread)) = found
                && best.is_none_or(|b| spread > b.spread)
            {
                best = Some(BestMove {
                    angle,
                    target,
                    pocket,
                    via,
                    spread,
                });
            }
        };

    for &target in candidates {
        if target == CUE_BALL || !state.on_table(target) {
            continue;
        }
        for pocket in table.pockets() {
            consider(
                evaluate(table, pocket, |aim| {
                    direct_shot(state, table, CUE_BALL, target, aim)
                }),
                target,
                pocket.id,
                None,
            );

            for &via in candidates {
                if via == target || via == CUE_BALL || !state.on_table(via) {
                    continue;
                }
                consider(
                    evaluate(table, pocket, |aim| {
                        combo_shot(state, table, CUE_BALL, via, target, aim)
                    }),
                    target,
                    pocket.id,
                    Some(via),
                );
            }
        }
    }

    match &best {
        Some(m) => log::info!(
            "Best move: ball {} into pocket {} (via {:?}), angle {:.4}, spread {:.4}",
            m.target,
            m.pocket,
            m.via,
            m.angle,
            m.spread
        ),
        None => log::info!("No makeable shot among {} candidates", candidates.len()),
    }
    best
}

/// Where the cue ball first touches anything when struck along `angle`
///
/// Other balls are treated as stationary; this is a single lookahead for the
/// aiming overlay, not a simulation.
pub fn ghost_image(state: &State, table: &Table, angle: f64) -> Option<DVec2> {
    let cue = state.ball(CUE_BALL).filter(|b| b.on_table())?;
    let dir = polar_to_cartesian(1.0, angle);

    let mut probe = state.clone();
    for ball in &mut probe.balls {
        ball.vel = DVec2::ZERO;
    }
    if let Some(ball) = probe.ball_mut(CUE_BALL) {
        ball.vel = dir;
    }

    let g = table.geometry();
    let horizon = 2.0 * g.width.hypot(g.height);
    let event = detect(&probe, table, horizon)?;
    Some(cue.pos + dir * event.dt)
}
