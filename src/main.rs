//! Pocket Pool console harness
//!
//! Racks the balls, asks the planner for a shot, plays it and prints the
//! table once per frame.
//!
//! Usage: `pocket-pool [table.json] [settings.json]`

use std::process::ExitCode;

use glam::DVec2;

use pocket_pool::sim::{
    CUE_BALL, RACK_SIZE, State, Table, best_move, ghost_image, on_table, simulate_shot,
};
use pocket_pool::{Settings, SimResult, cartesian_to_polar, polar_to_cartesian};

/// Cue speed for the planned shot (m/s)
const SHOT_SPEED: f64 = 3.0;
const SETTINGS_FILE: &str = "pocket_pool_settings.json";

fn main() -> ExitCode {
    env_logger::init();
    log::info!("Pocket Pool (native) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run() -> SimResult<()> {
    let mut args = std::env::args().skip(1);
    let table = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path)?;
            let table = Table::from_json(&json)?;
            log::info!("Loaded table from {}", path);
            table
        }
        None => Table::default(),
    };
    let settings = Settings::load_or_default(args.next().unwrap_or_else(|| SETTINGS_FILE.into()));

    let mut state = State::rack(&table);
    let candidates: Vec<usize> = (1..=RACK_SIZE).filter(|&id| on_table(&state, id)).collect();

    let angle = match best_move(&state, &table, &candidates) {
        Some(m) => {
            match m.via {
                Some(via) => println!(
                    "BEST MOVE: ball {} via ball {} into pocket {} at {:.4} rad (spread {:.4})",
                    m.target, via, m.pocket, m.angle, m.spread
                ),
                None => println!(
                    "BEST MOVE: ball {} into pocket {} at {:.4} rad (spread {:.4})",
                    m.target, m.pocket, m.angle, m.spread
                ),
            }
            m.angle
        }
        None => {
            println!("BEST MOVE: none, breaking");
            let cue = state.ball(CUE_BALL).map_or(DVec2::ZERO, |b| b.pos);
            let apex = state.ball(1).map_or(table.center(), |b| b.pos);
            cartesian_to_polar(apex - cue).1
        }
    };

    if let Some(contact) = ghost_image(&state, &table, angle) {
        println!("GHOST: ({:.4}, {:.4})", contact.x, contact.y);
    }

    state.strike(polar_to_cartesian(SHOT_SPEED, angle))?;
    let frames = simulate_shot(&state, &table, &settings)?;

    println!("STARTING SIMULATION");
    for frame in &frames {
        println!("TIME={:.6}", frame.time);
        for ball in frame.balls.iter().filter(|b| b.on_table()) {
            println!(
                "BALL({}): p=({:.6}, {:.6}) v=({:.6}, {:.6})",
                ball.id, ball.pos.x, ball.pos.y, ball.vel.x, ball.vel.y
            );
        }
        println!("==============");
    }

    if let Some(last) = frames.last() {
        let sunk: Vec<usize> = last
            .balls
            .iter()
            .filter(|b| !b.on_table())
            .map(|b| b.id)
            .collect();
        log::info!("Pocketed: {:?}", sunk);
    }
    Ok(())
}
