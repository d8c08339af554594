//! Data-driven game balance
//!
//! Every balance number the simulation reads lives here. Defaults reproduce the
//! shipped game; a JSON file can override any subset of fields.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Errors raised while loading or validating a tuning file
#[derive(Debug, thiserror::Error)]
pub enum TuningError {
    #[error("failed to read tuning file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse tuning: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid tuning value `{field}`: {reason}")]
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

/// Tank archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum TankKind {
    #[default]
    Basic,
    Fast,
    Heavy,
}

impl TankKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TankKind::Basic => "Basic",
            TankKind::Fast => "Fast",
            TankKind::Heavy => "Heavy",
        }
    }
}

/// Immutable stat record for one tank kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TankProfile {
    /// Base movement speed (units per reference frame)
    pub speed: f32,
    pub hp: i32,
    /// Damage dealt by this tank's bullets
    pub damage: i32,
    /// Sprite footprint, only used by presentation
    pub width: f32,
    pub height: f32,
    pub collision_radius: f32,
    /// Seconds between enemy shots
    pub fire_delay: f32,
    /// Score awarded for destroying this kind
    pub score: u64,
}

/// Stat profiles per tank kind
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TankProfiles {
    pub basic: TankProfile,
    pub fast: TankProfile,
    pub heavy: TankProfile,
}

impl Default for TankProfiles {
    fn default() -> Self {
        Self {
            basic: TankProfile {
                speed: 1.0,
                hp: 100,
                damage: 10,
                width: 150.0,
                height: 50.0,
                collision_radius: 30.0,
                fire_delay: 3.5,
                score: 100,
            },
            fast: TankProfile {
                speed: 1.5,
                hp: 70,
                damage: 5,
                width: 80.0,
                height: 40.0,
                collision_radius: 25.0,
                fire_delay: 2.5,
                score: 150,
            },
            heavy: TankProfile {
                speed: 0.7,
                hp: 150,
                damage: 15,
                width: 100.0,
                height: 50.0,
                collision_radius: 35.0,
                fire_delay: 4.5,
                score: 200,
            },
        }
    }
}

/// Arena geometry
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ArenaTuning {
    pub width: f32,
    pub height: f32,
    /// Inset of the playable border from the map edges
    pub border: f32,
    pub viewport_width: f32,
    pub viewport_height: f32,
}

impl Default for ArenaTuning {
    fn default() -> Self {
        Self {
            width: MAP_WIDTH,
            height: MAP_HEIGHT,
            border: BORDER_OFFSET,
            viewport_width: VIEWPORT_WIDTH,
            viewport_height: VIEWPORT_HEIGHT,
        }
    }
}

impl ArenaTuning {
    /// Top-left corner of the playable interior
    #[inline]
    pub fn inner_min(&self) -> Vec2 {
        Vec2::splat(self.border)
    }

    /// Bottom-right corner of the playable interior
    #[inline]
    pub fn inner_max(&self) -> Vec2 {
        Vec2::new(self.width - self.border, self.height - self.border)
    }

    /// Map center, where the player starts
    #[inline]
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// Whether a point lies inside the playable interior (border inclusive)
    pub fn contains(&self, pos: Vec2) -> bool {
        let min = self.inner_min();
        let max = self.inner_max();
        pos.x >= min.x && pos.x <= max.x && pos.y >= min.y && pos.y <= max.y
    }

    #[inline]
    pub fn viewport(&self) -> Vec2 {
        Vec2::new(self.viewport_width, self.viewport_height)
    }
}

/// Projectile, contact and physics response numbers
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatTuning {
    pub bullet_speed: f32,
    pub recoil: f32,
    /// Velocity retained after a wall bounce
    pub bounce_factor: f32,
    /// Impulse applied to both tanks of an overlapping player/enemy pair
    pub push_force: f32,
    /// Multiplier on `push_force` for enemy/enemy pairs
    pub enemy_push_factor: f32,
    /// Cap on positional separation per frame
    pub max_push: f32,
    /// Added to the player's radius for power-up pickup
    pub pickup_radius: f32,
    /// Seconds an explosion marker stays active
    pub explosion_duration: f32,
}

impl Default for CombatTuning {
    fn default() -> Self {
        Self {
            bullet_speed: 10.0,
            recoil: 10.0,
            bounce_factor: 0.9,
            push_force: 1.05,
            enemy_push_factor: 0.5,
            max_push: 2.0,
            pickup_radius: 15.0,
            explosion_duration: 0.5,
        }
    }
}

/// Player ability timings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AbilityTuning {
    pub shield_duration: f32,
    pub shield_cooldown: f32,
    pub rapid_fire_duration: f32,
    pub rapid_fire_cooldown: f32,
    pub rapid_fire_interval: f32,
    pub rapid_fire_recoil_factor: f32,
    /// Regular shots needed to earn one special bullet
    pub special_shots_required: u32,
    pub special_max_stock: u32,
    /// Charge stops accumulating here (seconds)
    pub special_charge_max: f32,
    /// Releasing below this fires nothing
    pub special_charge_min: f32,
    /// Camera zoom at full charge
    pub special_zoom: f32,
    pub special_damage: i32,
    /// Special bullet speed relative to `bullet_speed`
    pub special_speed_factor: f32,
    pub health_pickup_heal: i32,
    pub regen_display_duration: f32,
    pub regen_display_tick: f32,
}

impl Default for AbilityTuning {
    fn default() -> Self {
        Self {
            shield_duration: 10.0,
            shield_cooldown: 30.0,
            rapid_fire_duration: 5.0,
            rapid_fire_cooldown: 15.0,
            rapid_fire_interval: 0.1,
            rapid_fire_recoil_factor: 0.5,
            special_shots_required: 10,
            special_max_stock: 5,
            special_charge_max: 3.0,
            special_charge_min: 0.5,
            special_zoom: 1.5,
            special_damage: 1000,
            special_speed_factor: 1.5,
            health_pickup_heal: 50,
            regen_display_duration: 2.5,
            regen_display_tick: 0.1,
        }
    }
}

/// Spawn cadence and difficulty ramp
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Seconds between enemy spawns at difficulty 1 (divided by difficulty)
    pub enemy_interval: f32,
    pub base_max_enemies: usize,
    pub max_difficulty: u32,
    /// Seconds of play per difficulty level
    pub difficulty_period: f32,
    pub heavy_min_difficulty: u32,
    /// Roll (0..100) below which a Heavy spawns once unlocked
    pub heavy_chance: u32,
    pub fast_min_difficulty: u32,
    pub fast_chance: u32,
    pub powerup_interval: f32,
    pub health_pickup_interval: f32,
    pub max_active_powerups: usize,
    /// Roll (0..=100) below which a destroyed enemy drops a power-up
    pub drop_chance: u32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            enemy_interval: 2.0,
            base_max_enemies: 5,
            max_difficulty: 5,
            difficulty_period: 60.0,
            heavy_min_difficulty: 3,
            heavy_chance: 20,
            fast_min_difficulty: 2,
            fast_chance: 40,
            powerup_interval: 15.0,
            health_pickup_interval: 20.0,
            max_active_powerups: 3,
            drop_chance: 30,
        }
    }
}

/// Enemy steering
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Exponential smoothing factor applied per frame
    pub smoothing: f32,
    /// Heavy tanks steer at this fraction of `smoothing`
    pub heavy_factor: f32,
    /// Fast tanks orbit once closer than this
    pub orbit_range: f32,
    /// Fast tanks turn this many times quicker than they steer
    pub fast_turn_factor: f32,
    /// Frames between heading perturbations of Basic tanks
    pub jitter_period: u32,
    pub jitter: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            smoothing: 0.05,
            heavy_factor: 0.5,
            orbit_range: 300.0,
            fast_turn_factor: 2.0,
            jitter_period: 30,
            jitter: 0.1,
        }
    }
}

/// Power-up effect sizes and kill rewards
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PowerUpTuning {
    pub health_restore: i32,
    pub speed_multiplier: f32,
    pub damage_bonus: i32,
    /// Max HP gained every `kills_per_max_hp_bonus` kills
    pub max_hp_bonus: i32,
    pub kills_per_max_hp_bonus: u32,
}

impl Default for PowerUpTuning {
    fn default() -> Self {
        Self {
            health_restore: 30,
            speed_multiplier: 1.2,
            damage_bonus: 5,
            max_hp_bonus: 50,
            kills_per_max_hp_bonus: 5,
        }
    }
}

/// Complete balance configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub arena: ArenaTuning,
    pub combat: CombatTuning,
    pub abilities: AbilityTuning,
    pub spawn: SpawnTuning,
    pub ai: AiTuning,
    pub powerups: PowerUpTuning,
    pub profiles: TankProfiles,
}

impl Tuning {
    /// Stat profile for a tank kind
    pub fn profile(&self, kind: TankKind) -> &TankProfile {
        match kind {
            TankKind::Basic => &self.profiles.basic,
            TankKind::Fast => &self.profiles.fast,
            TankKind::Heavy => &self.profiles.heavy,
        }
    }

    /// Parse and validate a JSON document; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load a tuning file from disk
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        fn positive(value: f32, field: &'static str) -> Result<(), TuningError> {
            if value > 0.0 && value.is_finite() {
                Ok(())
            } else {
                Err(TuningError::Invalid {
                    field,
                    reason: "must be a positive number",
                })
            }
        }

        let arena = &self.arena;
        positive(arena.width - 2.0 * arena.border, "arena.border")?;
        positive(arena.height - 2.0 * arena.border, "arena.border")?;
        positive(arena.viewport_width, "arena.viewport_width")?;
        positive(arena.viewport_height, "arena.viewport_height")?;

        positive(self.combat.bullet_speed, "combat.bullet_speed")?;
        positive(self.combat.max_push, "combat.max_push")?;
        positive(self.combat.explosion_duration, "combat.explosion_duration")?;

        let ab = &self.abilities;
        positive(ab.shield_duration, "abilities.shield_duration")?;
        positive(ab.rapid_fire_duration, "abilities.rapid_fire_duration")?;
        positive(ab.rapid_fire_interval, "abilities.rapid_fire_interval")?;
        positive(ab.special_charge_max, "abilities.special_charge_max")?;
        positive(ab.regen_display_duration, "abilities.regen_display_duration")?;
        positive(ab.regen_display_tick, "abilities.regen_display_tick")?;
        if ab.special_shots_required == 0 {
            return Err(TuningError::Invalid {
                field: "abilities.special_shots_required",
                reason: "must be at least 1",
            });
        }
        if ab.special_charge_min > ab.special_charge_max {
            return Err(TuningError::Invalid {
                field: "abilities.special_charge_min",
                reason: "must not exceed special_charge_max",
            });
        }

        let spawn = &self.spawn;
        positive(spawn.enemy_interval, "spawn.enemy_interval")?;
        positive(spawn.difficulty_period, "spawn.difficulty_period")?;
        positive(spawn.powerup_interval, "spawn.powerup_interval")?;
        positive(spawn.health_pickup_interval, "spawn.health_pickup_interval")?;
        if spawn.max_difficulty == 0 {
            return Err(TuningError::Invalid {
                field: "spawn.max_difficulty",
                reason: "must be at least 1",
            });
        }
        if spawn.heavy_chance > 100 || spawn.fast_chance > 100 || spawn.drop_chance > 100 {
            return Err(TuningError::Invalid {
                field: "spawn",
                reason: "chances are percentages in 0..=100",
            });
        }

        for kind in [TankKind::Basic, TankKind::Fast, TankKind::Heavy] {
            let profile = self.profile(kind);
            positive(profile.collision_radius, "profiles.collision_radius")?;
            positive(profile.speed, "profiles.speed")?;
            positive(profile.fire_delay, "profiles.fire_delay")?;
            if profile.hp <= 0 {
                return Err(TuningError::Invalid {
                    field: "profiles.hp",
                    reason: "must be positive",
                });
            }
        }

        Ok(())
    }
}
