//! Game state and core simulation types
//!
//! The session owns every entity container. Presentation reads these between
//! frames and never mutates them.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::abilities::{RapidFire, RegenDisplay, Shield, SpecialShot};
use super::camera::Camera;
use super::spawn::Spawner;
use crate::consts::NOTIFICATION_DURATION;
use crate::highscores::HighScores;
use crate::tuning::{AbilityTuning, TankKind, TankProfile, Tuning};
use crate::angle_to_dir;

/// Stable handle for an entity within one session
pub type EntityId = u32;

/// Session state machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GamePhase {
    /// Title screen, nothing simulated
    #[default]
    Menu,
    /// Active gameplay
    Playing,
    /// Everything frozen
    Paused,
    /// Player destroyed; waiting for restart
    GameOver,
}

/// A combat unit, player or AI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tank {
    pub id: EntityId,
    pub kind: TankKind,
    pub pos: Vec2,
    pub vel: Vec2,
    /// Facing angle (radians)
    pub angle: f32,
    pub hp: i32,
    pub max_hp: i32,
    pub speed: f32,
    pub damage: i32,
    pub collision_radius: f32,
    pub width: f32,
    pub height: f32,
    pub alive: bool,
    pub is_player: bool,
    /// Seconds since this tank last fired (enemy cadence)
    pub since_last_shot: f32,
    /// Frames of steering run so far (drives periodic jitter)
    pub ai_frames: u32,
}

impl Tank {
    pub fn new(id: EntityId, kind: TankKind, pos: Vec2, profile: &TankProfile) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: Vec2::ZERO,
            angle: 0.0,
            hp: profile.hp,
            max_hp: profile.hp,
            speed: profile.speed,
            damage: profile.damage,
            collision_radius: profile.collision_radius,
            width: profile.width,
            height: profile.height,
            alive: true,
            is_player: false,
            // Fresh enemies may fire on their first update
            since_last_shot: profile.fire_delay,
            ai_frames: 0,
        }
    }

    /// Subtract damage; returns true only on the hit that kills
    pub fn apply_damage(&mut self, amount: i32) -> bool {
        if !self.alive {
            return false;
        }
        self.hp -= amount;
        if self.hp <= 0 {
            self.alive = false;
            return true;
        }
        false
    }

    /// Where this tank's bullets leave the barrel
    pub fn muzzle(&self) -> Vec2 {
        self.pos + angle_to_dir(self.angle) * self.collision_radius
    }

    #[inline]
    pub fn facing(&self) -> Vec2 {
        angle_to_dir(self.angle)
    }
}

/// A projectile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub id: EntityId,
    pub pos: Vec2,
    pub vel: Vec2,
    pub active: bool,
    pub from_enemy: bool,
    pub damage: i32,
    pub is_special: bool,
}

impl Bullet {
    pub fn new(id: EntityId, pos: Vec2, vel: Vec2, from_enemy: bool, damage: i32) -> Self {
        Self {
            id,
            pos,
            vel,
            active: true,
            from_enemy,
            damage,
            is_special: false,
        }
    }
}

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Health,
    Speed,
    Damage,
    Shield,
    RapidFire,
    /// Stored in inventory instead of applied on contact
    HealthPickup,
}

impl PowerUpKind {
    /// Kinds produced by timed spawns and enemy drops
    pub const DROPPABLE: [PowerUpKind; 5] = [
        PowerUpKind::Health,
        PowerUpKind::Speed,
        PowerUpKind::Damage,
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
    ];
}

/// A pickup lying in the arena
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: EntityId,
    pub kind: PowerUpKind,
    pub pos: Vec2,
    /// Session time at spawn, used by presentation for pulsing
    pub spawned_at: f32,
    pub active: bool,
}

/// Time-boxed death marker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Explosion {
    pub id: EntityId,
    pub pos: Vec2,
    pub started_at: f32,
    pub is_special: bool,
    pub active: bool,
}

impl Explosion {
    /// 0 at creation, 1 when expired
    pub fn progress(&self, now: f32, duration: f32) -> f32 {
        ((now - self.started_at) / duration).clamp(0.0, 1.0)
    }
}

/// Short on-screen message ("KILL", "HEALTH +50", ...)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    pub text: String,
    pub remaining: f32,
}

/// Per-run counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionStats {
    /// Regular and rapid-fire shots (special shots excluded)
    pub shots_fired: u32,
    pub kills: u32,
    pub score: u64,
    /// Highest difficulty level reached
    pub level: u32,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self {
            shots_fired: 0,
            kills: 0,
            score: 0,
            level: 1,
        }
    }
}

/// Things that happened during the last frame, for audio and particles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    PlayerShot { pos: Vec2, angle: f32, rapid: bool },
    SpecialShot { pos: Vec2, angle: f32 },
    EnemyShot { pos: Vec2, angle: f32 },
    BulletHit { pos: Vec2, enemy_bullet: bool },
    ShieldDeflect { pos: Vec2 },
    EnemyDestroyed { kind: TankKind, pos: Vec2, special: bool },
    PlayerDestroyed { pos: Vec2 },
    PowerUpCollected { kind: PowerUpKind, pos: Vec2 },
    ShieldActivated,
    ShieldExpired,
    RapidFireActivated,
    Healed { amount: i32 },
    SpecialEarned { stock: u32 },
    WallBounce { pos: Vec2, is_player: bool },
    TankContact { pos: Vec2 },
    EnemySpawned { kind: TankKind, pos: Vec2 },
    DifficultyUp { level: u32 },
}

/// The player tank with its abilities
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    pub tank: Tank,
    pub shield: Shield,
    pub rapid_fire: RapidFire,
    pub special: SpecialShot,
    pub regen: RegenDisplay,
    /// Stored health packs
    pub health_pickups: u32,
}

impl Player {
    pub fn new(id: EntityId, pos: Vec2, profile: &TankProfile) -> Self {
        let mut tank = Tank::new(id, TankKind::Basic, pos, profile);
        tank.is_player = true;
        Self {
            tank,
            shield: Shield::default(),
            rapid_fire: RapidFire::default(),
            special: SpecialShot::default(),
            regen: RegenDisplay::default(),
            health_pickups: 0,
        }
    }

    /// Spend one health pack; no-op without packs or at full health
    pub fn use_health_pickup(&mut self, tuning: &AbilityTuning) -> Option<i32> {
        if !self.tank.alive || self.health_pickups == 0 || self.tank.hp >= self.tank.max_hp {
            return None;
        }
        let amount = (self.tank.max_hp - self.tank.hp).min(tuning.health_pickup_heal);
        self.tank.hp += amount;
        self.health_pickups -= 1;
        self.regen.start(amount, tuning);
        Some(amount)
    }
}

/// Ability readouts for the HUD
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct HudInfo {
    pub hp: i32,
    pub max_hp: i32,
    pub shield_active: bool,
    pub shield_remaining: f32,
    pub shield_cooldown: f32,
    pub rapid_fire_active: bool,
    pub rapid_fire_remaining: f32,
    pub rapid_fire_cooldown: f32,
    pub special_stock: u32,
    /// 0-1 charge progress while the special trigger is held
    pub special_charge: f32,
    pub health_pickups: u32,
    /// 1 at heal time, 0 once the display has finished
    pub regen_progress: f32,
    pub difficulty: u32,
    pub score: u64,
    pub kills: u32,
    pub shots_fired: u32,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    pub tuning: Tuning,
    pub phase: GamePhase,
    /// Seconds of unpaused play this run
    pub time: f32,
    /// Current difficulty level (1..=max)
    pub difficulty: u32,
    pub player: Player,
    pub enemies: Vec<Tank>,
    pub bullets: Vec<Bullet>,
    pub powerups: Vec<PowerUp>,
    pub explosions: Vec<Explosion>,
    pub notifications: Vec<Notification>,
    pub stats: SessionStats,
    pub spawner: Spawner,
    pub camera: Camera,
    /// Events produced by the most recent update
    pub events: Vec<GameEvent>,
    /// Finished runs, recorded at each game over
    pub high_scores: HighScores,
    /// Gameplay RNG (spawns, rolls, AI jitter)
    pub(crate) rng: Pcg32,
    /// Movement axes held during the previous frame
    pub(crate) held_axes: [bool; 4],
    next_id: EntityId,
}

impl GameState {
    /// Create a session with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        Self::with_rng(seed, tuning, Pcg32::seed_from_u64(seed))
    }

    /// Create a session around an externally seeded generator
    pub fn with_rng(seed: u64, tuning: Tuning, rng: Pcg32) -> Self {
        let player = Player::new(1, tuning.arena.center(), &tuning.profiles.basic);
        Self {
            seed,
            phase: GamePhase::Menu,
            time: 0.0,
            difficulty: 1,
            player,
            enemies: Vec::new(),
            bullets: Vec::new(),
            powerups: Vec::new(),
            explosions: Vec::new(),
            notifications: Vec::new(),
            stats: SessionStats::default(),
            spawner: Spawner::default(),
            camera: Camera::new(seed),
            events: Vec::new(),
            high_scores: HighScores::new(),
            rng,
            held_axes: [false; 4],
            next_id: 2,
            tuning,
        }
    }

    /// Replace every container and timer for a fresh run and start playing
    pub fn reset(&mut self) {
        self.next_id = 1;
        let id = self.next_entity_id();
        self.player = Player::new(id, self.tuning.arena.center(), &self.tuning.profiles.basic);
        self.enemies.clear();
        self.bullets.clear();
        self.powerups.clear();
        self.explosions.clear();
        self.notifications.clear();
        self.events.clear();
        self.stats = SessionStats::default();
        self.spawner = Spawner::default();
        self.camera.reset();
        self.held_axes = [false; 4];
        self.time = 0.0;
        self.difficulty = 1;
        self.phase = GamePhase::Playing;
        self.camera.follow(self.player.tank.pos, &self.tuning.arena);
        log::info!("Run started (seed {})", self.seed);
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> EntityId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    pub fn spawn_enemy(&mut self, kind: TankKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        let tank = Tank::new(id, kind, pos, self.tuning.profile(kind));
        self.enemies.push(tank);
        id
    }

    pub fn spawn_bullet(
        &mut self,
        pos: Vec2,
        vel: Vec2,
        from_enemy: bool,
        damage: i32,
        is_special: bool,
    ) -> EntityId {
        let id = self.next_entity_id();
        let mut bullet = Bullet::new(id, pos, vel, from_enemy, damage);
        bullet.is_special = is_special;
        self.bullets.push(bullet);
        id
    }

    pub fn spawn_powerup(&mut self, kind: PowerUpKind, pos: Vec2) -> EntityId {
        let id = self.next_entity_id();
        self.powerups.push(PowerUp {
            id,
            kind,
            pos,
            spawned_at: self.time,
            active: true,
        });
        id
    }

    pub fn spawn_explosion(&mut self, pos: Vec2, is_special: bool) -> EntityId {
        let id = self.next_entity_id();
        self.explosions.push(Explosion {
            id,
            pos,
            started_at: self.time,
            is_special,
            active: true,
        });
        id
    }

    pub fn notify(&mut self, text: impl Into<String>) {
        self.notifications.push(Notification {
            text: text.into(),
            remaining: NOTIFICATION_DURATION,
        });
    }

    /// Live enemies (dead ones linger until the next purge)
    pub fn live_enemy_count(&self) -> usize {
        self.enemies.iter().filter(|e| e.alive).count()
    }

    pub fn is_over(&self) -> bool {
        self.phase == GamePhase::GameOver
    }

    /// Snapshot of timers and counters for the HUD
    pub fn hud(&self) -> HudInfo {
        let player = &self.player;
        HudInfo {
            hp: player.tank.hp,
            max_hp: player.tank.max_hp,
            shield_active: player.shield.is_up(),
            shield_remaining: player.shield.state.active_remaining(),
            shield_cooldown: player.shield.state.cooldown_remaining(),
            rapid_fire_active: player.rapid_fire.is_active(),
            rapid_fire_remaining: player.rapid_fire.state.active_remaining(),
            rapid_fire_cooldown: player.rapid_fire.state.cooldown_remaining(),
            special_stock: player.special.stock,
            special_charge: player.special.charge_progress(&self.tuning.abilities),
            health_pickups: player.health_pickups,
            regen_progress: player.regen.progress(&self.tuning.abilities),
            difficulty: self.difficulty,
            score: self.stats.score,
            kills: self.stats.kills,
            shots_fired: self.stats.shots_fired,
        }
    }
}
