//! Player ability state machines
//!
//! Shield and rapid fire share [`AbilityState`]: a tagged READY/ACTIVE/COOLDOWN
//! machine whose payload carries the remaining time, so an active ability with
//! no time left cannot be represented. All timers count down by the frame delta
//! and stand still while the session is paused.

use serde::{Deserialize, Serialize};

use crate::tuning::AbilityTuning;

/// Timed ability with an active window and a cooldown measured from activation
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum AbilityState {
    #[default]
    Ready,
    /// `cooldown` runs concurrently with the active window
    Active { remaining: f32, cooldown: f32 },
    Cooldown { remaining: f32 },
}

impl AbilityState {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, AbilityState::Active { .. })
    }

    /// Seconds left in the active window (0 when not active)
    pub fn active_remaining(&self) -> f32 {
        match *self {
            AbilityState::Active { remaining, .. } => remaining,
            _ => 0.0,
        }
    }

    /// Seconds until input may activate again
    pub fn cooldown_remaining(&self) -> f32 {
        match *self {
            AbilityState::Ready => 0.0,
            AbilityState::Active { cooldown, .. } => cooldown,
            AbilityState::Cooldown { remaining } => remaining,
        }
    }

    /// Input activation is gated on the cooldown alone
    #[inline]
    pub fn can_activate(&self) -> bool {
        self.cooldown_remaining() <= 0.0
    }

    fn start(&mut self, duration: f32, cooldown: f32) {
        *self = AbilityState::Active {
            remaining: duration,
            cooldown: cooldown.max(0.0),
        };
    }

    /// Count down; returns true on the tick the active window ends
    pub fn tick(&mut self, dt: f32) -> bool {
        match *self {
            AbilityState::Ready => false,
            AbilityState::Active {
                remaining,
                cooldown,
            } => {
                let remaining = remaining - dt;
                let cooldown = (cooldown - dt).max(0.0);
                if remaining <= 0.0 {
                    *self = if cooldown > 0.0 {
                        AbilityState::Cooldown {
                            remaining: cooldown,
                        }
                    } else {
                        AbilityState::Ready
                    };
                    true
                } else {
                    *self = AbilityState::Active {
                        remaining,
                        cooldown,
                    };
                    false
                }
            }
            AbilityState::Cooldown { remaining } => {
                let remaining = remaining - dt;
                *self = if remaining > 0.0 {
                    AbilityState::Cooldown { remaining }
                } else {
                    AbilityState::Ready
                };
                false
            }
        }
    }
}

/// Damage-nullifying shield
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Shield {
    pub state: AbilityState,
}

impl Shield {
    #[inline]
    pub fn is_up(&self) -> bool {
        self.state.is_active()
    }

    /// Player-requested activation; refused while cooling down
    pub fn try_activate(&mut self, tuning: &AbilityTuning) -> bool {
        if !self.state.can_activate() {
            return false;
        }
        self.force_activate(tuning);
        true
    }

    /// Pickup activation: restarts the window and the full cooldown
    pub fn force_activate(&mut self, tuning: &AbilityTuning) {
        self.state
            .start(tuning.shield_duration, tuning.shield_cooldown);
    }

    /// Returns true when the shield drops this tick
    pub fn tick(&mut self, dt: f32) -> bool {
        self.state.tick(dt)
    }
}

/// Held-trigger automatic fire
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RapidFire {
    pub state: AbilityState,
    /// Seconds since the last automatic shot
    since_last_shot: f32,
}

impl Default for RapidFire {
    fn default() -> Self {
        Self {
            state: AbilityState::Ready,
            since_last_shot: f32::INFINITY,
        }
    }
}

impl RapidFire {
    #[inline]
    pub fn is_active(&self) -> bool {
        self.state.is_active()
    }

    /// Player-requested activation sets the full cooldown immediately
    pub fn try_activate(&mut self, tuning: &AbilityTuning) -> bool {
        if !self.state.can_activate() {
            return false;
        }
        if !self.is_active() {
            self.since_last_shot = f32::INFINITY;
        }
        self.state
            .start(tuning.rapid_fire_duration, tuning.rapid_fire_cooldown);
        true
    }

    /// Pickup activation clears any pending cooldown.
    ///
    /// Refreshing an open window keeps the shot timer running so the
    /// interval between shots still holds.
    pub fn activate_from_pickup(&mut self, tuning: &AbilityTuning) {
        if !self.is_active() {
            self.since_last_shot = f32::INFINITY;
        }
        self.state.start(tuning.rapid_fire_duration, 0.0);
    }

    /// Advance the shot timer; returns true when a bullet should be emitted
    pub fn step(&mut self, dt: f32, trigger_held: bool, tuning: &AbilityTuning) -> bool {
        if !self.is_active() {
            return false;
        }
        self.since_last_shot += dt;
        if trigger_held && self.since_last_shot >= tuning.rapid_fire_interval {
            self.since_last_shot = 0.0;
            return true;
        }
        false
    }

    /// Count down the window and cooldown; returns true when the window closes
    pub fn tick(&mut self, dt: f32) -> bool {
        self.state.tick(dt)
    }
}

/// Special-shot trigger state
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum ChargeState {
    #[default]
    Idle,
    Charging { elapsed: f32 },
}

/// Result of one special-charge step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChargeOutcome {
    None,
    /// Trigger released with enough charge; one stock unit consumed
    Fired,
    /// Trigger released too early; nothing consumed
    Fizzled,
}

/// Charged high-damage shot with an earned stock
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct SpecialShot {
    pub stock: u32,
    pub charge: ChargeState,
    /// Set by cancel; the trigger must be released before charging again
    awaiting_release: bool,
}

impl SpecialShot {
    #[inline]
    pub fn is_charging(&self) -> bool {
        matches!(self.charge, ChargeState::Charging { .. })
    }

    /// Count a regular shot; returns true if it earned a special bullet
    pub fn record_regular_shot(&mut self, shots_fired: u32, tuning: &AbilityTuning) -> bool {
        if shots_fired % tuning.special_shots_required == 0 && self.stock < tuning.special_max_stock
        {
            self.stock += 1;
            return true;
        }
        false
    }

    /// Abort an in-progress charge; no stock is consumed
    pub fn cancel(&mut self) -> bool {
        if !self.is_charging() {
            return false;
        }
        self.charge = ChargeState::Idle;
        self.awaiting_release = true;
        true
    }

    pub fn step(&mut self, trigger_held: bool, dt: f32, tuning: &AbilityTuning) -> ChargeOutcome {
        if self.awaiting_release {
            if !trigger_held {
                self.awaiting_release = false;
            }
            return ChargeOutcome::None;
        }

        match self.charge {
            ChargeState::Idle if trigger_held && self.stock > 0 => {
                self.charge = ChargeState::Charging {
                    elapsed: dt.min(tuning.special_charge_max),
                };
                ChargeOutcome::None
            }
            ChargeState::Idle => ChargeOutcome::None,
            ChargeState::Charging { elapsed } if trigger_held => {
                self.charge = ChargeState::Charging {
                    elapsed: (elapsed + dt).min(tuning.special_charge_max),
                };
                ChargeOutcome::None
            }
            ChargeState::Charging { elapsed } => {
                self.charge = ChargeState::Idle;
                if elapsed >= tuning.special_charge_min && self.stock > 0 {
                    self.stock -= 1;
                    ChargeOutcome::Fired
                } else {
                    ChargeOutcome::Fizzled
                }
            }
        }
    }

    /// 0-1 progress toward full charge
    pub fn charge_progress(&self, tuning: &AbilityTuning) -> f32 {
        match self.charge {
            ChargeState::Idle => 0.0,
            ChargeState::Charging { elapsed } => (elapsed / tuning.special_charge_max).min(1.0),
        }
    }

    /// Camera zoom factor for the current charge
    pub fn zoom(&self, tuning: &AbilityTuning) -> f32 {
        1.0 + (tuning.special_zoom - 1.0) * self.charge_progress(tuning)
    }
}

/// Cosmetic countdown shown after a health pack is used
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub enum RegenDisplay {
    #[default]
    Idle,
    Active {
        remaining: f32,
        /// Sub-timer for the display pulse
        tick: f32,
        healed: i32,
    },
}

impl RegenDisplay {
    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, RegenDisplay::Active { .. })
    }

    pub fn start(&mut self, healed: i32, tuning: &AbilityTuning) {
        *self = RegenDisplay::Active {
            remaining: tuning.regen_display_duration,
            tick: tuning.regen_display_tick,
            healed,
        };
    }

    /// Advance; returns true on frames where the display sub-timer rolls over
    pub fn step(&mut self, dt: f32, tuning: &AbilityTuning) -> bool {
        let RegenDisplay::Active {
            remaining,
            tick,
            healed,
        } = *self
        else {
            return false;
        };

        let remaining = remaining - dt;
        if remaining <= 0.0 {
            *self = RegenDisplay::Idle;
            return false;
        }
        let mut tick = tick - dt;
        let pulsed = tick <= 0.0;
        if pulsed {
            tick += tuning.regen_display_tick;
        }
        *self = RegenDisplay::Active {
            remaining,
            tick: tick.max(0.0),
            healed,
        };
        pulsed
    }

    /// 1 right after the heal, falling to 0 as the display finishes
    pub fn progress(&self, tuning: &AbilityTuning) -> f32 {
        match *self {
            RegenDisplay::Idle => 0.0,
            RegenDisplay::Active { remaining, .. } => {
                (remaining / tuning.regen_display_duration).clamp(0.0, 1.0)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 64.0;

    fn tuning() -> AbilityTuning {
        AbilityTuning::default()
    }

    #[test]
    fn test_shield_cycle() {
        let t = tuning();
        let mut shield = Shield::default();
        assert!(shield.try_activate(&t));
        assert!(shield.is_up());

        // Active for 10 s
        for _ in 0..639 {
            assert!(!shield.tick(DT));
        }
        assert!(shield.is_up());
        assert!(shield.tick(DT));
        assert!(!shield.is_up());

        // 20 s of cooldown left, input refused
        assert!((shield.state.cooldown_remaining() - 20.0).abs() < 1e-3);
        assert!(!shield.try_activate(&t));

        for _ in 0..1280 {
            shield.tick(DT);
        }
        assert_eq!(shield.state, AbilityState::Ready);
        assert!(shield.try_activate(&t));
    }

    #[test]
    fn test_shield_pickup_ignores_cooldown() {
        let t = tuning();
        let mut shield = Shield::default();
        shield.try_activate(&t);
        for _ in 0..700 {
            shield.tick(DT);
        }
        assert!(!shield.is_up());
        shield.force_activate(&t);
        assert!(shield.is_up());
        assert_eq!(shield.state.cooldown_remaining(), t.shield_cooldown);
    }

    #[test]
    fn test_rapid_fire_first_shot_is_immediate() {
        let t = tuning();
        let mut rapid = RapidFire::default();
        assert!(!rapid.step(DT, true, &t));
        assert!(rapid.try_activate(&t));
        assert!(rapid.step(DT, true, &t));
        assert!(!rapid.step(DT, true, &t));
    }

    #[test]
    fn test_rapid_fire_spacing() {
        let t = tuning();
        let mut rapid = RapidFire::default();
        rapid.try_activate(&t);

        let mut last_shot: Option<f32> = None;
        let mut now = 0.0;
        let mut shots = 0;
        while rapid.is_active() {
            if rapid.step(DT, true, &t) {
                if let Some(prev) = last_shot {
                    assert!(now - prev >= 0.1 - 1e-6);
                }
                last_shot = Some(now);
                shots += 1;
            }
            rapid.tick(DT);
            now += DT;
        }
        // Window closes exactly at the configured duration
        assert!((now - 5.0).abs() < 1e-4);
        assert!(shots > 40);
    }

    #[test]
    fn test_rapid_fire_pickup_refresh_keeps_shot_timer() {
        let t = tuning();
        let mut rapid = RapidFire::default();
        rapid.try_activate(&t);
        assert!(rapid.step(DT, true, &t));
        rapid.tick(DT);

        rapid.activate_from_pickup(&t);
        assert!(!rapid.step(DT, true, &t));
        assert_eq!(rapid.state.active_remaining(), t.rapid_fire_duration);
        assert_eq!(rapid.state.cooldown_remaining(), 0.0);
    }

    #[test]
    fn test_rapid_fire_input_during_pickup_window_keeps_shot_timer() {
        let t = tuning();
        let mut rapid = RapidFire::default();
        rapid.activate_from_pickup(&t);
        assert!(rapid.step(DT, true, &t));
        rapid.tick(DT);

        // A pickup window has no cooldown, so input may refresh it
        assert!(rapid.try_activate(&t));
        assert!(!rapid.step(DT, true, &t));
        assert_eq!(rapid.state.cooldown_remaining(), t.rapid_fire_cooldown);
    }

    #[test]
    fn test_rapid_fire_pickup_from_ready_fires_at_once() {
        let t = tuning();
        let mut rapid = RapidFire::default();
        rapid.activate_from_pickup(&t);
        assert!(rapid.step(DT, true, &t));
    }

    #[test]
    fn test_rapid_fire_input_respects_cooldown() {
        let t = tuning();
        let mut rapid = RapidFire::default();
        rapid.try_activate(&t);
        for _ in 0..320 {
            rapid.tick(DT);
        }
        assert!(!rapid.is_active());
        assert!(!rapid.try_activate(&t));

        // A pickup bypasses it and leaves no cooldown behind
        rapid.activate_from_pickup(&t);
        assert!(rapid.is_active());
        assert_eq!(rapid.state.cooldown_remaining(), 0.0);
        for _ in 0..320 {
            rapid.tick(DT);
        }
        assert_eq!(rapid.state, AbilityState::Ready);
    }

    #[test]
    fn test_special_accrual_and_cap() {
        let t = tuning();
        let mut special = SpecialShot::default();
        for shot in 1..=9 {
            assert!(!special.record_regular_shot(shot, &t));
        }
        assert!(special.record_regular_shot(10, &t));
        assert_eq!(special.stock, 1);

        special.stock = t.special_max_stock;
        assert!(!special.record_regular_shot(20, &t));
        assert_eq!(special.stock, t.special_max_stock);
    }

    #[test]
    fn test_special_release_after_threshold_fires() {
        let t = tuning();
        let mut special = SpecialShot {
            stock: 2,
            ..Default::default()
        };
        for _ in 0..32 {
            assert_eq!(special.step(true, DT, &t), ChargeOutcome::None);
        }
        assert!(special.is_charging());
        assert!(special.zoom(&t) > 1.0);
        assert_eq!(special.step(false, DT, &t), ChargeOutcome::Fired);
        assert_eq!(special.stock, 1);
        assert_eq!(special.zoom(&t), 1.0);
    }

    #[test]
    fn test_special_early_release_fizzles() {
        let t = tuning();
        let mut special = SpecialShot {
            stock: 1,
            ..Default::default()
        };
        for _ in 0..10 {
            special.step(true, DT, &t);
        }
        assert_eq!(special.step(false, DT, &t), ChargeOutcome::Fizzled);
        assert_eq!(special.stock, 1);
    }

    #[test]
    fn test_special_charge_caps_and_zoom() {
        let t = tuning();
        let mut special = SpecialShot {
            stock: 1,
            ..Default::default()
        };
        for _ in 0..400 {
            special.step(true, DT, &t);
        }
        assert_eq!(special.charge, ChargeState::Charging { elapsed: 3.0 });
        assert!((special.zoom(&t) - 1.5).abs() < 1e-6);
    }

    #[test]
    fn test_special_cancel_requires_release() {
        let t = tuning();
        let mut special = SpecialShot {
            stock: 1,
            ..Default::default()
        };
        for _ in 0..64 {
            special.step(true, DT, &t);
        }
        assert!(special.cancel());
        assert_eq!(special.zoom(&t), 1.0);

        // Still held: nothing restarts, releasing fires nothing
        assert_eq!(special.step(true, DT, &t), ChargeOutcome::None);
        assert!(!special.is_charging());
        assert_eq!(special.step(false, DT, &t), ChargeOutcome::None);
        assert_eq!(special.stock, 1);

        // Fresh press charges again
        special.step(true, DT, &t);
        assert!(special.is_charging());
    }

    #[test]
    fn test_special_without_stock_never_charges() {
        let t = tuning();
        let mut special = SpecialShot::default();
        special.step(true, DT, &t);
        assert!(!special.is_charging());
        assert!(!special.cancel());
    }

    #[test]
    fn test_regen_display_runs_out() {
        let t = tuning();
        let mut regen = RegenDisplay::default();
        regen.start(50, &t);
        assert_eq!(regen.progress(&t), 1.0);

        let mut pulses = 0;
        for _ in 0..200 {
            if regen.step(DT, &t) {
                pulses += 1;
            }
        }
        assert!(!regen.is_active());
        assert_eq!(regen.progress(&t), 0.0);
        assert!(pulses >= 20);
    }
}
