//! Deterministic simulation module
//!
//! All physics and planning lives here. Everything is a pure function of its
//! inputs:
//! - States go in by reference and come out as fresh values
//! - Randomness only in `State::scattered`, from a seeded RNG
//! - Stable iteration order (by ball id)
//! - No rendering or platform dependencies

pub mod collision;
pub mod planner;
pub mod playback;
pub mod resolve;
pub mod state;
pub mod table;
pub mod tick;

pub use collision::{CollisionEvent, EventKind, detect, time_of_impact};
pub use planner::{
    BestMove, best_move, combo_shot, direct_shot, ghost_image, is_obstructed, on_table,
};
pub use playback::{ball_positions, find_all_states, simulate_shot};
pub use resolve::resolve;
pub use state::{Ball, CUE_BALL, PocketStatus, RACK_SIZE, State};
pub use table::{Jaw, Pocket, PocketKind, Rail, Table, TableGeometry};
pub use tick::{Step, settle, step};
