//! Deterministic simulation module
//!
//! All gameplay logic lives here. Given the same seed, tuning and input
//! sequence, a session replays identically:
//! - Frame deltas are the only source of time
//! - Seeded RNG only, owned by the session
//! - Stable iteration order (insertion order of entities)
//! - No rendering or platform dependencies

pub mod abilities;
pub mod ai;
pub mod camera;
pub mod clock;
pub mod collision;
pub mod movement;
pub mod spawn;
pub mod state;
pub mod tick;

pub use abilities::{
    AbilityState, ChargeOutcome, ChargeState, RapidFire, RegenDisplay, Shield, SpecialShot,
};
pub use camera::{Camera, ScreenShake};
pub use clock::{Clock, FrameTimer, ManualClock, SystemClock};
pub use collision::{BulletHit, HitTarget};
pub use movement::MoveAxes;
pub use spawn::{SpawnEdge, Spawner, difficulty_at};
pub use state::{
    Bullet, EntityId, Explosion, GameEvent, GamePhase, GameState, HudInfo, Notification, Player,
    PowerUp, PowerUpKind, SessionStats, Tank,
};
pub use tick::{TickInput, tick};
