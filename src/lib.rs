//! Pocket Pool - continuous-time billiards physics
//!
//! Core modules:
//! - `sim`: Deterministic simulation (table geometry, collisions, stepping, shot planning)
//! - `settings`: Playback configuration
//! - `error`: Configuration and setup errors

pub mod error;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::Settings;

use glam::DVec2;

/// Simulation configuration constants
pub mod consts {
    /// Default playback frame interval (seconds)
    pub const FRAME_INTERVAL: f64 = 0.04;
    /// Default maximum animation duration (seconds)
    pub const MAX_DURATION: f64 = 10.0;
    /// Maximum resolved events per frame before the table is settled at its boundary
    pub const MAX_SUBSTEPS: u32 = 64;

    /// Numeric tolerance for geometric comparisons
    pub const EPSILON: f64 = 1e-12;
    /// Clearance left between colliders after a resolved contact
    pub const CONTACT_SKIN: f64 = 1e-9;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f64) -> f64 {
    use std::f64::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Convert cartesian (x, y) to polar (r, theta)
#[inline]
pub fn cartesian_to_polar(pos: DVec2) -> (f64, f64) {
    (pos.length(), pos.y.atan2(pos.x))
}

/// Component of `v` along `axis` (zero if the axis is degenerate)
#[inline]
pub fn project(v: DVec2, axis: DVec2) -> DVec2 {
    let len_sq = axis.length_squared();
    if len_sq == 0.0 {
        return DVec2::ZERO;
    }
    axis * (v.dot(axis) / len_sq)
}
