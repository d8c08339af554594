//! Camera follow, zoom and screen shake
//!
//! The camera is a view transform derived from the simulation. Its shake
//! jitter comes from a dedicated generator so that cosmetic randomness never
//! perturbs gameplay rolls.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::tuning::ArenaTuning;

/// Decorrelates the shake stream from the gameplay stream of the same seed
const SHAKE_SEED_SALT: u64 = 0x5348_414b_4543_414d;

/// A decaying camera perturbation
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ScreenShake {
    #[default]
    Idle,
    Active {
        intensity: f32,
        duration: f32,
        elapsed: f32,
    },
}

impl ScreenShake {
    /// Current amplitude, fading linearly to zero over the duration
    pub fn amplitude(&self) -> f32 {
        match *self {
            ScreenShake::Idle => 0.0,
            ScreenShake::Active {
                intensity,
                duration,
                elapsed,
            } => intensity * (1.0 - elapsed / duration).max(0.0),
        }
    }

    /// Advance; drops to idle once the duration has elapsed
    pub fn tick(&mut self, dt: f32) {
        if let ScreenShake::Active {
            intensity,
            duration,
            elapsed,
        } = *self
        {
            let elapsed = elapsed + dt;
            *self = if elapsed >= duration {
                ScreenShake::Idle
            } else {
                ScreenShake::Active {
                    intensity,
                    duration,
                    elapsed,
                }
            };
        }
    }
}

#[derive(Debug, Clone)]
pub struct Camera {
    /// World position of the view's top-left corner
    pub pos: Vec2,
    /// 1 = normal; the visible area is the viewport divided by this
    pub zoom: f32,
    pub shake: ScreenShake,
    rng: Pcg32,
    seed: u64,
}

impl Camera {
    pub fn new(seed: u64) -> Self {
        Self {
            pos: Vec2::ZERO,
            zoom: 1.0,
            shake: ScreenShake::Idle,
            rng: Pcg32::seed_from_u64(seed ^ SHAKE_SEED_SALT),
            seed,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.seed);
    }

    /// Start a shake, replacing any shake in progress
    pub fn start_shake(&mut self, intensity: f32, duration: f32) {
        if duration <= 0.0 {
            return;
        }
        self.shake = ScreenShake::Active {
            intensity,
            duration,
            elapsed: 0.0,
        };
    }

    /// World-space size of the visible area at the current zoom
    pub fn view_size(&self, arena: &ArenaTuning) -> Vec2 {
        arena.viewport() / self.zoom
    }

    /// Visible world rectangle as (min, max)
    pub fn view_rect(&self, arena: &ArenaTuning) -> (Vec2, Vec2) {
        (self.pos, self.pos + self.view_size(arena))
    }

    /// Center the view on `target`, add shake jitter, clamp to the map
    pub fn follow(&mut self, target: Vec2, arena: &ArenaTuning) {
        let size = self.view_size(arena);
        let mut pos = target - size / 2.0;

        let amplitude = self.shake.amplitude();
        if amplitude > 0.0 {
            pos += Vec2::new(
                self.rng.random_range(-amplitude..=amplitude),
                self.rng.random_range(-amplitude..=amplitude),
            );
        }

        let max = (Vec2::new(arena.width, arena.height) - size).max(Vec2::ZERO);
        self.pos = pos.clamp(Vec2::ZERO, max);
    }

    pub fn world_to_screen(&self, world: Vec2) -> Vec2 {
        (world - self.pos) * self.zoom
    }

    pub fn screen_to_world(&self, screen: Vec2) -> Vec2 {
        screen / self.zoom + self.pos
    }
}
