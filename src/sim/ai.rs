//! Enemy steering and fire control
//!
//! All steering is exponential smoothing toward a target velocity and heading,
//! never an instant snap.

use std::f32::consts::FRAC_PI_2;

use glam::Vec2;
use rand::Rng;

use super::state::Tank;
use crate::consts::MIN_SEPARATION;
use crate::tuning::{AiTuning, TankKind, TankProfile};
use crate::{angle_to_dir, direction_or_axis, normalize_angle};

/// Turn `angle` toward `target` by `factor` of the shortest difference
fn turn_toward(angle: f32, target: f32, factor: f32) -> f32 {
    angle + normalize_angle(target - angle) * factor
}

/// Update an enemy's velocity and facing for this frame
pub fn steer(enemy: &mut Tank, player_pos: Vec2, tuning: &AiTuning, rng: &mut impl Rng) {
    let delta = player_pos - enemy.pos;
    let distance = delta.length();
    if distance < MIN_SEPARATION {
        return;
    }
    let to_player = delta / distance;
    let smoothing = tuning.smoothing;

    match enemy.kind {
        TankKind::Fast => {
            let heading = if distance > tuning.orbit_range {
                to_player
            } else {
                angle_to_dir(to_player.y.atan2(to_player.x) + FRAC_PI_2)
            };
            let target = heading * enemy.speed;
            enemy.vel += (target - enemy.vel) * smoothing;

            let aim = to_player.y.atan2(to_player.x);
            enemy.angle = turn_toward(enemy.angle, aim, smoothing * tuning.fast_turn_factor);
        }
        TankKind::Heavy => {
            let target = to_player * enemy.speed;
            enemy.vel += (target - enemy.vel) * smoothing * tuning.heavy_factor;

            let aim = to_player.y.atan2(to_player.x);
            enemy.angle = turn_toward(enemy.angle, aim, smoothing);
        }
        TankKind::Basic => {
            let mut heading = to_player;
            enemy.ai_frames = enemy.ai_frames.wrapping_add(1);
            if tuning.jitter_period > 0 && enemy.ai_frames % tuning.jitter_period == 0 {
                let jitter = Vec2::new(
                    rng.random_range(-tuning.jitter..=tuning.jitter),
                    rng.random_range(-tuning.jitter..=tuning.jitter),
                );
                heading = direction_or_axis(heading + jitter);
            }
            let target = heading * enemy.speed;
            enemy.vel += (target - enemy.vel) * smoothing;

            let aim = heading.y.atan2(heading.x);
            enemy.angle = turn_toward(enemy.angle, aim, smoothing);
        }
    }
}

/// A bullet an enemy wants to fire this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShotRequest {
    pub pos: Vec2,
    pub vel: Vec2,
    pub damage: i32,
}

/// Advance an enemy's fire timer; fire at the player once the delay has passed
pub fn enemy_fire(
    enemy: &mut Tank,
    player_pos: Vec2,
    dt: f32,
    profile: &TankProfile,
    bullet_speed: f32,
) -> Option<ShotRequest> {
    enemy.since_last_shot += dt;
    if enemy.since_last_shot < profile.fire_delay {
        return None;
    }
    enemy.since_last_shot = 0.0;

    let dir = direction_or_axis(player_pos - enemy.pos);
    Some(ShotRequest {
        pos: enemy.pos + dir * enemy.collision_radius,
        vel: dir * bullet_speed,
        damage: enemy.damage,
    })
}
