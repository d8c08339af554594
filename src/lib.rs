//! Tank Arena - top-down arena tank shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, collisions, abilities, spawning)
//! - `tuning`: Data-driven game balance
//! - `highscores`: In-memory leaderboard of finished runs
//!
//! Rendering, audio and menus live outside this crate and only read the
//! simulation state between frames.

pub mod highscores;
pub mod sim;
pub mod tuning;

pub use highscores::HighScores;
pub use tuning::{TankKind, TankProfile, Tuning, TuningError};

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Reference frame rate that velocities are expressed in (units per 1/60 s)
    pub const REFERENCE_HZ: f32 = 60.0;
    /// Largest frame delta the driver will feed into a single update
    pub const MAX_FRAME_DT: f32 = 0.1;

    /// Map dimensions (world units)
    pub const MAP_WIDTH: f32 = 2000.0;
    pub const MAP_HEIGHT: f32 = 1600.0;
    /// Inset of the playable border from every map edge
    pub const BORDER_OFFSET: f32 = 200.0;

    /// Viewport size used by the camera and spawn edge selection
    pub const VIEWPORT_WIDTH: f32 = 1500.0;
    pub const VIEWPORT_HEIGHT: f32 = 750.0;

    /// Tank physics
    pub const VELOCITY_DAMPING: f32 = 0.95;
    /// Velocity components below this snap to zero
    pub const VELOCITY_EPSILON: f32 = 0.01;
    /// Per-axis velocity cap as a multiple of tank speed
    pub const MAX_SPEED_FACTOR: f32 = 3.0;
    /// Separation distance below which the push normal falls back to +X
    pub const MIN_SEPARATION: f32 = 0.1;

    /// Offset outside the inner border at which enemies appear
    pub const SPAWN_EDGE_OFFSET: f32 = 30.0;
    /// Power-ups spawn at least this far inside the border
    pub const POWERUP_SPAWN_MARGIN: f32 = 50.0;

    /// Notification lifetime (seconds)
    pub const NOTIFICATION_DURATION: f32 = 2.0;
}

/// Normalized angle to [-π, π)
#[inline]
pub fn normalize_angle(mut angle: f32) -> f32 {
    use std::f32::consts::PI;
    while angle >= PI {
        angle -= 2.0 * PI;
    }
    while angle < -PI {
        angle += 2.0 * PI;
    }
    angle
}

/// Unit vector for a facing angle
#[inline]
pub fn angle_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Unit vector along `delta`, or +X when `delta` is too short to normalize
#[inline]
pub fn direction_or_axis(delta: Vec2) -> Vec2 {
    let len = delta.length();
    if len < consts::MIN_SEPARATION {
        Vec2::X
    } else {
        delta / len
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_angle_wraps() {
        use std::f32::consts::PI;
        // 3π lands on the ±π seam; either end is the same heading
        let wrapped = normalize_angle(3.0 * PI);
        assert!((-PI..PI).contains(&wrapped));
        assert!((wrapped.abs() - PI).abs() < 1e-4);
        assert!((normalize_angle(-1.5 * PI) - 0.5 * PI).abs() < 1e-4);
        assert!((normalize_angle(0.25) - 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_direction_or_axis_degenerate() {
        assert_eq!(direction_or_axis(Vec2::ZERO), Vec2::X);
        assert_eq!(direction_or_axis(Vec2::new(0.05, 0.0)), Vec2::X);
        let dir = direction_or_axis(Vec2::new(0.0, -4.0));
        assert!((dir - Vec2::new(0.0, -1.0)).length() < 1e-6);
    }
}
