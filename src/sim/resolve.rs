//! Collision response
//!
//! Velocity updates for each event kind. The stepper has already moved every
//! ball to the instant of contact; the only position change here is a push
//! out to `CONTACT_SKIN` clearance, so a contact that rounding left a hair
//! short still reads as touching on the next detection pass.

use glam::DVec2;

use super::collision::EventKind;
use super::state::{PocketStatus, State};
use super::table::{Jaw, Rail, Table};
use crate::consts::CONTACT_SKIN;
use crate::error::{SimError, SimResult};
use crate::project;

/// Apply the response for `kind` to `state`
///
/// Balls are looked up by id. An event naming a ball, pocket or jaw that
/// does not exist is an error and leaves `state` untouched.
pub fn resolve(state: &mut State, table: &Table, kind: &EventKind) -> SimResult<()> {
    let g = table.geometry();
    let r = g.ball_radius;
    match *kind {
        EventKind::BallBall { a, b } => {
            let ia = state.index_of(a).ok_or(SimError::UnknownBall { id: a })?;
            let ib = state.index_of(b).ok_or(SimError::UnknownBall { id: b })?;
            if ia == ib {
                return Err(SimError::InvalidBall {
                    id: a,
                    reason: "collides with itself",
                });
            }
            let (pa, pb) = separate(state.balls[ia].pos, state.balls[ib].pos, 2.0 * r);
            let (va, vb) = ball_ball_velocities(
                pa,
                state.balls[ia].vel,
                pb,
                state.balls[ib].vel,
                g.ball_restitution,
            );
            state.balls[ia].pos = pa;
            state.balls[ia].vel = va;
            state.balls[ib].pos = pb;
            state.balls[ib].vel = vb;
        }
        EventKind::Wall { ball, rail } => {
            let ball = state
                .ball_mut(ball)
                .ok_or(SimError::UnknownBall { id: ball })?;
            ball.pos = off_rail(ball.pos, rail, table);
            ball.vel = wall_velocity(ball.vel, rail, g.rail_restitution);
        }
        EventKind::Pocket { ball, pocket } => {
            if pocket >= table.pockets().len() {
                return Err(SimError::UnknownCollider {
                    kind: "pocket",
                    id: pocket,
                });
            }
            let ball = state
                .ball_mut(ball)
                .ok_or(SimError::UnknownBall { id: ball })?;
            ball.pocket = PocketStatus::PocketedAt(pocket);
            log::debug!("Ball {} pocketed in {}", ball.id, pocket);
        }
        EventKind::PocketWall { ball, jaw } => {
            let jaw = table.jaws().get(jaw).ok_or(SimError::UnknownCollider {
                kind: "jaw",
                id: jaw,
            })?;
            let ball = state
                .ball_mut(ball)
                .ok_or(SimError::UnknownBall { id: ball })?;
            let (pos, tangent) = jaw_contact(ball.pos, jaw, r);
            ball.pos = pos;
            ball.vel = jaw_velocity(ball.vel, tangent, g.rail_restitution);
        }
    }
    Ok(())
}

/// Move two touching centers apart symmetrically to at least `reach + CONTACT_SKIN`
fn separate(pa: DVec2, pb: DVec2, reach: f64) -> (DVec2, DVec2) {
    let axis = pb - pa;
    let dist = axis.length();
    let short = reach + CONTACT_SKIN - dist;
    if short <= 0.0 || dist == 0.0 {
        return (pa, pb);
    }
    let push = axis / dist * (short / 2.0);
    (pa - push, pb + push)
}

fn off_rail(pos: DVec2, rail: Rail, table: &Table) -> DVec2 {
    let g = table.geometry();
    let near = g.ball_radius + CONTACT_SKIN;
    match rail {
        Rail::Bottom => DVec2::new(pos.x, pos.y.max(near)),
        Rail::Top => DVec2::new(pos.x, pos.y.min(g.height - near)),
        Rail::Left => DVec2::new(pos.x.max(near), pos.y),
        Rail::Right => DVec2::new(pos.x.min(g.width - near), pos.y),
    }
}

/// Contact position (pushed clear) and the tangent to reflect about
///
/// A contact behind `start` is on the tip: its surface tangent is
/// perpendicular to the line from the tip to the ball's center.
fn jaw_contact(pos: DVec2, jaw: &Jaw, radius: f64) -> (DVec2, DVec2) {
    let offset = pos - jaw.start;
    let clear = radius + CONTACT_SKIN;
    if offset.dot(jaw.dir) < 0.0 {
        let dist = offset.length();
        if dist == 0.0 {
            return (pos, jaw.dir);
        }
        let normal = offset / dist;
        (jaw.start + normal * dist.max(clear), normal.perp())
    } else {
        let depth = offset.dot(jaw.normal);
        (pos + jaw.normal * (clear - depth).max(0.0), jaw.dir)
    }
}

/// Equal-mass collision: along the line of centers the balls trade velocity
/// components (scaled by `restitution`), tangential components are kept
pub fn ball_ball_velocities(
    pa: DVec2,
    va: DVec2,
    pb: DVec2,
    vb: DVec2,
    restitution: f64,
) -> (DVec2, DVec2) {
    let axis = pb - pa;
    let tangent = DVec2::new(axis.y, -axis.x);
    let va_t = project(va, tangent);
    let vb_t = project(vb, tangent);
    (
        va_t + restitution * (vb - vb_t),
        vb_t + restitution * (va - va_t),
    )
}

/// Flip the component perpendicular to `rail`, scaled by `restitution`
pub fn wall_velocity(vel: DVec2, rail: Rail, restitution: f64) -> DVec2 {
    if rail.is_horizontal() {
        DVec2::new(vel.x, -restitution * vel.y)
    } else {
        DVec2::new(-restitution * vel.x, vel.y)
    }
}

/// Reflect about the jaw's direction: keep the tangential part, flip and scale the rest
pub fn jaw_velocity(vel: DVec2, dir: DVec2, restitution: f64) -> DVec2 {
    let along = project(vel, dir);
    along - restitution * (vel - along)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::collision::{ball_ball_time, detect, jaw_time, wall_time};
    use crate::sim::state::Ball;
    use crate::sim::table::TableGeometry;

    #[test]
    fn test_bottom_rail_response() {
        let v = wall_velocity(DVec2::new(0.5, -0.5), Rail::Bottom, 0.8);
        assert_eq!(v, DVec2::new(0.5, 0.4));
        let v = wall_velocity(DVec2::new(-1.0, 0.25), Rail::Left, 0.8);
        assert_eq!(v, DVec2::new(0.8, 0.25));
    }

    #[test]
    fn test_head_on_exchange() {
        let (va, vb) = ball_ball_velocities(
            DVec2::new(1.0, 0.5),
            DVec2::new(1.0, 0.0),
            DVec2::new(1.057, 0.5),
            DVec2::new(-1.0, 0.0),
            0.95,
        );
        assert!((va - DVec2::new(-0.95, 0.0)).length() < 1e-12);
        assert!((vb - DVec2::new(0.95, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_tangential_component_kept() {
        // Contact along x; the y motion of the cue ball is untouched
        let (va, vb) = ball_ball_velocities(
            DVec2::new(1.0, 0.5),
            DVec2::new(1.0, 0.3),
            DVec2::new(1.057, 0.5),
            DVec2::ZERO,
            1.0,
        );
        assert!((va - DVec2::new(0.0, 0.3)).length() < 1e-12);
        assert!((vb - DVec2::new(1.0, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_jaw_reflection() {
        let dir = DVec2::new(-1.0, -1.0).normalize();
        let normal = DVec2::new(-1.0, 1.0).normalize();
        let v = jaw_velocity(-normal * 2.0 + dir, dir, 0.8);
        assert!((v - (normal * 1.6 + dir)).length() < 1e-12);
    }

    #[test]
    fn test_rail_event_end_to_end() {
        let table = Table::new(TableGeometry {
            width: 2.5,
            height: 1.25,
            ball_radius: 0.0285,
            rail_restitution: 0.8,
            ..Default::default()
        })
        .unwrap();
        let mut state = State {
            time: 0.0,
            balls: vec![Ball {
                vel: DVec2::new(0.5, -0.5),
                ..Ball::new(0, DVec2::new(1.4, 0.15))
            }],
        };
        let event = detect(&state, &table, 1.0).unwrap();
        resolve(&mut state, &table, &event.kind).unwrap();
        assert_eq!(state.balls[0].vel, DVec2::new(0.5, 0.4));
    }

    #[test]
    fn test_pocket_marks_ball() {
        let table = Table::default();
        let mut state = State::from_positions(&[DVec2::new(0.1, 0.1)]);
        resolve(
            &mut state,
            &table,
            &EventKind::Pocket { ball: 0, pocket: 0 },
        )
        .unwrap();
        assert_eq!(state.balls[0].pocket, PocketStatus::PocketedAt(0));
        assert!(!state.on_table(0));
    }

    #[test]
    fn test_no_repeat_after_resolution() {
        let table = Table::default();
        let r = table.ball_radius();

        // Ball-ball: move to contact, resolve, re-test the pair
        let mut a = Ball {
            vel: DVec2::new(1.0, 0.2),
            ..Ball::new(0, DVec2::new(1.0, 0.6))
        };
        let mut b = Ball::new(1, DVec2::new(1.3, 0.62));
        let t = ball_ball_time(&a, &b, r).unwrap();
        a.roll(t, 0.0);
        b.roll(t, 0.0);
        let (va, vb) = ball_ball_velocities(a.pos, a.vel, b.pos, b.vel, 0.95);
        a.vel = va;
        b.vel = vb;
        assert!(ball_ball_time(&a, &b, r).is_none());

        // Rail
        let mut ball = Ball {
            vel: DVec2::new(0.3, -0.7),
            ..Ball::new(0, DVec2::new(0.8, 0.4))
        };
        let t = wall_time(&ball, Rail::Bottom, &table, 1.0).unwrap();
        ball.roll(t, 0.0);
        ball.vel = wall_velocity(ball.vel, Rail::Bottom, 0.8);
        assert!(wall_time(&ball, Rail::Bottom, &table, 1.0).is_none());

        // Jaw
        let jaw = table.jaws()[0];
        let mid = (jaw.start + jaw.end) / 2.0;
        let mut ball = Ball {
            vel: -jaw.normal + jaw.dir * 0.1,
            ..Ball::new(0, mid + jaw.normal * (r + 0.05))
        };
        let t = jaw_time(&ball, &jaw, r).unwrap();
        ball.roll(t, 0.0);
        ball.vel = jaw_velocity(ball.vel, jaw.dir, 0.8);
        assert!(jaw_time(&ball, &jaw, r).is_none());
    }

    #[test]
    fn test_balls_resolved_by_id() {
        let table = Table::default();
        let mut state = State {
            time: 0.0,
            balls: vec![
                Ball {
                    vel: DVec2::new(1.0, 0.0),
                    ..Ball::new(0, DVec2::new(1.0, 0.6))
                },
                Ball::new(3, DVec2::new(1.3, 0.6)),
            ],
        };
        let event = detect(&state, &table, 1.0).unwrap();
        assert_eq!(event.kind, EventKind::BallBall { a: 0, b: 3 });
        for ball in &mut state.balls {
            ball.roll(event.dt, 0.0);
        }
        resolve(&mut state, &table, &event.kind).unwrap();
        // Head-on: the cue stops, ball 3 takes the along-axis velocity
        assert!(state.balls[0].vel.length() < 1e-12);
        assert!((state.balls[1].vel - DVec2::new(0.95, 0.0)).length() < 1e-12);
    }

    #[test]
    fn test_unknown_ids_are_errors() {
        let table = Table::default();
        let mut state = State::from_positions(&[DVec2::new(1.0, 0.6), DVec2::new(1.3, 0.6)]);
        let before = state.clone();
        for kind in [
            EventKind::BallBall { a: 0, b: 7 },
            EventKind::Wall {
                ball: 9,
                rail: Rail::Top,
            },
            EventKind::Pocket { ball: 0, pocket: 6 },
            EventKind::PocketWall { ball: 1, jaw: 12 },
        ] {
            assert!(resolve(&mut state, &table, &kind).is_err(), "{:?}", kind);
        }
        assert_eq!(state, before);
    }

    #[test]
    fn test_jaw_tip_reflects_about_contact_normal() {
        let table = Table::default();
        let r = table.ball_radius();
        let jaw = table.jaws()[0];
        // Contact straight above the tip: the normal is +y
        let mut state = State {
            time: 0.0,
            balls: vec![Ball {
                vel: DVec2::new(0.0, -1.0),
                ..Ball::new(0, jaw.start + DVec2::new(0.0, r))
            }],
        };
        resolve(&mut state, &table, &EventKind::PocketWall { ball: 0, jaw: 0 }).unwrap();
        assert!((state.balls[0].vel - DVec2::new(0.0, 0.8)).length() < 1e-12);
        assert!(state.balls[0].pos.distance(jaw.start) >= r);
    }

    #[test]
    fn test_contacts_left_with_clearance() {
        let table = Table::default();
        let r = table.ball_radius();

        // A ball a hair inside the rail line is pushed back onto it
        let mut state = State {
            time: 0.0,
            balls: vec![Ball {
                vel: DVec2::new(0.2, -1.0),
                ..Ball::new(0, DVec2::new(0.8, r - 1e-15))
            }],
        };
        resolve(
            &mut state,
            &table,
            &EventKind::Wall {
                ball: 0,
                rail: Rail::Bottom,
            },
        )
        .unwrap();
        assert!(state.balls[0].pos.y > r);

        // Struck back into the rail, it meets it again instead of passing through
        state.balls[0].vel = DVec2::new(0.0, -1.0);
        assert!(wall_time(&state.balls[0], Rail::Bottom, &table, 1.0).is_some());

        // Touching balls end up strictly apart
        let mut state = State::from_positions(&[
            DVec2::new(1.0, 0.6),
            DVec2::new(1.0 + 2.0 * r - 1e-15, 0.6),
        ]);
        state.balls[0].vel = DVec2::new(1.0, 0.0);
        resolve(&mut state, &table, &EventKind::BallBall { a: 0, b: 1 }).unwrap();
        assert!(state.balls[0].pos.distance(state.balls[1].pos) > 2.0 * r);
    }
}
