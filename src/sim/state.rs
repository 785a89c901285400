//! Ball and simulation state types
//!
//! A `State` is a value: the stepper reads one and returns a fresh one, so
//! frames handed to playback never share ball storage.

use glam::DVec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::table::Table;
use crate::error::{SimError, SimResult};

/// Id of the cue ball
pub const CUE_BALL: usize = 0;

/// Object balls in a full rack
pub const RACK_SIZE: usize = 15;

/// Whether a ball is still in play
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PocketStatus {
    #[default]
    NotPocketed,
    /// Dropped into the pocket with this id; permanent for the rest of the run
    PocketedAt(usize),
}

/// A ball entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub id: usize,
    pub pos: DVec2,
    pub vel: DVec2,
    #[serde(default)]
    pub pocket: PocketStatus,
}

impl Ball {
    pub fn new(id: usize, pos: DVec2) -> Self {
        Self {
            id,
            pos,
            vel: DVec2::ZERO,
            pocket: PocketStatus::NotPocketed,
        }
    }

    #[inline]
    pub fn on_table(&self) -> bool {
        self.pocket == PocketStatus::NotPocketed
    }

    #[inline]
    pub fn is_moving(&self) -> bool {
        self.on_table() && self.vel != DVec2::ZERO
    }

    /// Move along the current velocity for `dt` and bleed off `friction * dt` of speed
    pub fn roll(&mut self, dt: f64, friction: f64) {
        self.pos += self.vel * dt;
        let speed = self.vel.length();
        if speed > 0.0 {
            let new_speed = (speed - friction * dt).max(0.0);
            self.vel *= new_speed / speed;
        }
    }
}

/// Snapshot of the table at one instant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Simulation time (seconds)
    pub time: f64,
    /// Balls with unique ids; id 0 is the cue ball. Constructors here put ball `i` at index `i`
    pub balls: Vec<Ball>,
}

impl State {
    /// Build a state at time zero from resting ball positions (index 0 is the cue ball)
    pub fn from_positions(positions: &[DVec2]) -> Self {
        Self {
            time: 0.0,
            balls: positions
                .iter()
                .enumerate()
                .map(|(id, &pos)| Ball::new(id, pos))
                .collect(),
        }
    }

    /// Standard opening layout: cue ball on the head spot, fifteen balls racked on the foot spot
    pub fn rack(table: &Table) -> Self {
        let g = table.geometry();
        let r = g.ball_radius;
        // Hair of clearance so racked balls start separated rather than touching
        let spacing = 2.0 * r + r * 1e-3;
        let row_step = spacing * (3.0_f64).sqrt() / 2.0;
        let foot = DVec2::new(g.width * 0.75, g.height / 2.0);

        let mut positions = Vec::with_capacity(RACK_SIZE + 1);
        positions.push(DVec2::new(g.width * 0.25, g.height / 2.0));
        for row in 0..5 {
            for slot in 0..=row {
                positions.push(DVec2::new(
                    foot.x + row as f64 * row_step,
                    foot.y + (slot as f64 - row as f64 / 2.0) * spacing,
                ));
            }
        }
        Self::from_positions(&positions)
    }

    /// Deterministic random layout of `count` balls (cue ball included) that do not overlap
    pub fn scattered(table: &Table, count: usize, seed: u64) -> SimResult<Self> {
        let g = table.geometry();
        let r = g.ball_radius;
        let margin = 2.0 * r;
        let (x_range, y_range) = ((margin..g.width - margin), (margin..g.height - margin));
        if x_range.is_empty() || y_range.is_empty() {
            return Err(SimError::Placement {
                placed: 0,
                requested: count,
            });
        }

        let mut rng = Pcg32::seed_from_u64(seed);
        let mut positions: Vec<DVec2> = Vec::with_capacity(count);
        let max_attempts = 1000 * count.max(1);
        let mut attempts = 0;
        while positions.len() < count {
            if attempts >= max_attempts {
                return Err(SimError::Placement {
                    placed: positions.len(),
                    requested: count,
                });
            }
            attempts += 1;
            let candidate = DVec2::new(
                rng.random_range(x_range.clone()),
                rng.random_range(y_range.clone()),
            );
            if positions
                .iter()
                .all(|p| p.distance(candidate) > 2.0 * r + r * 1e-3)
            {
                positions.push(candidate);
            }
        }
        log::debug!(
            "Scattered {} balls (seed {}) after {} attempts",
            count,
            seed,
            attempts
        );
        Ok(Self::from_positions(&positions))
    }

    /// Look a ball up by id
    pub fn ball(&self, id: usize) -> Option<&Ball> {
        self.balls.iter().find(|b| b.id == id)
    }

    pub fn ball_mut(&mut self, id: usize) -> Option<&mut Ball> {
        self.balls.iter_mut().find(|b| b.id == id)
    }

    /// Slice index of ball `id`
    pub fn index_of(&self, id: usize) -> Option<usize> {
        self.balls.iter().position(|b| b.id == id)
    }

    /// Reject states the stepper cannot run: duplicate ids or non-finite motion
    pub fn validate(&self) -> SimResult<()> {
        for (i, ball) in self.balls.iter().enumerate() {
            if self.balls[..i].iter().any(|b| b.id == ball.id) {
                return Err(SimError::InvalidBall {
                    id: ball.id,
                    reason: "duplicate id",
                });
            }
            if !(ball.pos.is_finite() && ball.vel.is_finite()) {
                return Err(SimError::InvalidBall {
                    id: ball.id,
                    reason: "non-finite position or velocity",
                });
            }
        }
        if !self.time.is_finite() {
            return Err(SimError::InvalidBall {
                id: CUE_BALL,
                reason: "state time is not finite",
            });
        }
        Ok(())
    }

    /// True iff ball `id` exists and has not been pocketed
    pub fn on_table(&self, id: usize) -> bool {
        self.ball(id).is_some_and(Ball::on_table)
    }

    /// Ball centers in id order
    pub fn positions(&self) -> Vec<DVec2> {
        self.balls.iter().map(|b| b.pos).collect()
    }

    /// True once nothing on the table is moving
    pub fn at_rest(&self) -> bool {
        !self.balls.iter().any(Ball::is_moving)
    }

    /// Set the cue ball's velocity
    pub fn strike(&mut self, velocity: DVec2) -> SimResult<()> {
        let cue = self
            .ball_mut(CUE_BALL)
            .filter(|b| b.on_table())
            .ok_or(SimError::UnknownBall { id: CUE_BALL })?;
        cue.vel = velocity;
        log::info!("Cue ball struck at ({:.3}, {:.3})", velocity.x, velocity.y);
        Ok(())
    }

    /// Strike the cue ball toward a point (e.g. a finger position) at `speed`
    pub fn strike_toward(&mut self, point: DVec2, speed: f64) -> SimResult<()> {
        let cue = self
            .ball(CUE_BALL)
            .ok_or(SimError::UnknownBall { id: CUE_BALL })?;
        let dir = (point - cue.pos).normalize_or_zero();
        self.strike(dir * speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_roll_friction() {
        let mut ball = Ball::new(1, DVec2::new(1.0, 1.0));
        ball.vel = DVec2::new(3.0, 4.0);
        ball.roll(0.5, 2.0);
        assert!((ball.pos - DVec2::new(2.5, 3.0)).length() < 1e-12);
        // speed 5 -> 4, direction kept
        assert!((ball.vel - DVec2::new(2.4, 3.2)).length() < 1e-12);
    }

    #[test]
    fn test_roll_stops_at_zero() {
        let mut ball = Ball::new(1, DVec2::ZERO);
        ball.vel = DVec2::new(0.1, 0.0);
        ball.roll(1.0, 1.0);
        assert_eq!(ball.vel, DVec2::ZERO);

        // A resting ball stays at rest
        ball.roll(1.0, 1.0);
        assert_eq!(ball.vel, DVec2::ZERO);
    }

    #[test]
    fn test_rack_layout() {
        let table = Table::default();
        let state = State::rack(&table);
        assert_eq!(state.balls.len(), RACK_SIZE + 1);
        assert_eq!(state.time, 0.0);
        let r = table.ball_radius();
        for (i, a) in state.balls.iter().enumerate() {
            assert_eq!(a.id, i);
            for b in &state.balls[i + 1..] {
                assert!(a.pos.distance(b.pos) > 2.0 * r);
            }
        }
        assert!(state.at_rest());
    }

    #[test]
    fn test_scattered_is_deterministic() {
        let table = Table::default();
        let a = State::scattered(&table, 8, 42).unwrap();
        let b = State::scattered(&table, 8, 42).unwrap();
        let c = State::scattered(&table, 8, 43).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.balls.len(), 8);
    }

    #[test]
    fn test_scattered_overfull_table_fails() {
        let table = Table::new(crate::sim::TableGeometry {
            width: 0.3,
            height: 0.3,
            side_gap: 0.02,
            ..Default::default()
        })
        .unwrap();
        let err = State::scattered(&table, 50, 1).unwrap_err();
        assert!(matches!(err, SimError::Placement { requested: 50, .. }));
    }

    #[test]
    fn test_strike_toward() {
        let table = Table::default();
        let mut state = State::rack(&table);
        let cue = state.balls[CUE_BALL].pos;
        state
            .strike_toward(cue + DVec2::new(0.0, 2.0), 1.5)
            .unwrap();
        assert!((state.balls[CUE_BALL].vel - DVec2::new(0.0, 1.5)).length() < 1e-12);
        assert!(!state.at_rest());
    }

    #[test]
    fn test_lookup_by_id_not_index() {
        let mut state = State::from_positions(&[DVec2::new(1.0, 0.6), DVec2::new(1.3, 0.6)]);
        state.balls[1].id = 3;
        assert_eq!(state.ball(3).map(|b| b.pos), Some(DVec2::new(1.3, 0.6)));
        assert_eq!(state.index_of(3), Some(1));
        assert!(state.ball(1).is_none());
        assert!(state.on_table(3));
        assert!(state.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_balls() {
        let mut state = State::from_positions(&[DVec2::new(1.0, 0.6), DVec2::new(1.3, 0.6)]);
        state.balls[1].id = 0;
        assert!(matches!(
            state.validate(),
            Err(SimError::InvalidBall { id: 0, .. })
        ));

        let mut state = State::from_positions(&[DVec2::new(1.0, 0.6)]);
        state.balls[0].vel = DVec2::new(f64::NAN, 0.0);
        assert!(state.validate().is_err());
    }

    #[test]
    fn test_strike_pocketed_cue_fails() {
        let mut state = State::from_positions(&[DVec2::new(1.0, 0.5)]);
        state.balls[CUE_BALL].pocket = PocketStatus::PocketedAt(0);
        assert!(state.strike(DVec2::X).is_err());
        assert!(!state.on_table(CUE_BALL));
        assert!(!state.on_table(7));
    }
}
