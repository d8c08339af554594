//! Velocity integration for tanks and bullets

use glam::Vec2;

use super::state::{Bullet, Tank};
use crate::consts::{MAX_SPEED_FACTOR, REFERENCE_HZ, VELOCITY_DAMPING, VELOCITY_EPSILON};
use crate::tuning::ArenaTuning;

/// Held movement directions for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveAxes {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveAxes {
    pub fn as_array(&self) -> [bool; 4] {
        [self.up, self.down, self.left, self.right]
    }
}

/// Turn held axes into velocity: a held axis drives at twice the tank's speed,
/// a just-released axis stops motion still heading that way.
pub fn apply_move_input(tank: &mut Tank, axes: MoveAxes, previous: [bool; 4]) {
    let drive = tank.speed * 2.0;
    let [was_up, was_down, was_left, was_right] = previous;

    if axes.up && !axes.down {
        tank.vel.y = -drive;
    } else if axes.down && !axes.up {
        tank.vel.y = drive;
    } else {
        if was_up && !axes.up && tank.vel.y < 0.0 {
            tank.vel.y = 0.0;
        }
        if was_down && !axes.down && tank.vel.y > 0.0 {
            tank.vel.y = 0.0;
        }
    }

    if axes.left && !axes.right {
        tank.vel.x = -drive;
    } else if axes.right && !axes.left {
        tank.vel.x = drive;
    } else {
        if was_left && !axes.left && tank.vel.x < 0.0 {
            tank.vel.x = 0.0;
        }
        if was_right && !axes.right && tank.vel.x > 0.0 {
            tank.vel.x = 0.0;
        }
    }
}

/// Advance a tank: clamp velocity, move, damp, snap tiny components to zero
pub fn integrate_tank(tank: &mut Tank, dt: f32) {
    let cap = tank.speed * MAX_SPEED_FACTOR;
    tank.vel = tank.vel.clamp(Vec2::splat(-cap), Vec2::splat(cap));

    tank.pos += tank.vel * dt * REFERENCE_HZ;

    tank.vel *= VELOCITY_DAMPING;
    if tank.vel.x.abs() < VELOCITY_EPSILON {
        tank.vel.x = 0.0;
    }
    if tank.vel.y.abs() < VELOCITY_EPSILON {
        tank.vel.y = 0.0;
    }
}

/// Advance a bullet; it deactivates once outside the arena interior
pub fn integrate_bullet(bullet: &mut Bullet, dt: f32, arena: &ArenaTuning) {
    if !bullet.active {
        return;
    }
    bullet.pos += bullet.vel * dt * REFERENCE_HZ;
    if !arena.contains(bullet.pos) {
        bullet.active = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{TankKind, Tuning};

    const DT: f32 = 1.0 / 64.0;

    fn tank() -> Tank {
        let tuning = Tuning::default();
        Tank::new(1, TankKind::Basic, Vec2::new(1000.0, 800.0), &tuning.profiles.basic)
    }

    #[test]
    fn test_integrate_moves_at_reference_rate() {
        let mut t = tank();
        t.vel = Vec2::new(2.0, 0.0);
        integrate_tank(&mut t, 1.0 / 60.0);
        assert!((t.pos.x - 1002.0).abs() < 1e-3);
        assert!((t.vel.x - 1.9).abs() < 1e-6);
    }

    #[test]
    fn test_integrate_clamps_velocity_per_axis() {
        let mut t = tank();
        t.vel = Vec2::new(50.0, -50.0);
        integrate_tank(&mut t, DT);
        assert!((t.vel.x - 3.0 * 0.95).abs() < 1e-5);
        assert!((t.vel.y + 3.0 * 0.95).abs() < 1e-5);
    }

    #[test]
    fn test_coasting_tank_stops() {
        let mut t = tank();
        t.vel = Vec2::new(2.0, -1.0);
        for _ in 0..500 {
            integrate_tank(&mut t, DT);
        }
        assert_eq!(t.vel, Vec2::ZERO);
    }

    #[test]
    fn test_move_input_and_release() {
        let mut t = tank();
        let held = MoveAxes {
            up: true,
            right: true,
            ..Default::default()
        };
        apply_move_input(&mut t, held, [false; 4]);
        assert_eq!(t.vel, Vec2::new(2.0, -2.0));

        // Release up only
        let now = MoveAxes {
            right: true,
            ..Default::default()
        };
        apply_move_input(&mut t, now, held.as_array());
        assert_eq!(t.vel, Vec2::new(2.0, 0.0));
    }

    #[test]
    fn test_release_keeps_knockback_in_other_direction() {
        let mut t = tank();
        t.vel = Vec2::new(0.0, 1.5);
        let released_up = [true, false, false, false];
        apply_move_input(&mut t, MoveAxes::default(), released_up);
        assert_eq!(t.vel.y, 1.5);
    }

    #[test]
    fn test_bullet_leaves_arena() {
        let arena = ArenaTuning::default();
        let mut b = Bullet::new(1, Vec2::new(1795.0, 800.0), Vec2::new(10.0, 0.0), false, 10);
        integrate_bullet(&mut b, DT, &arena);
        assert!(!b.active);

        let mut b = Bullet::new(2, Vec2::new(1000.0, 800.0), Vec2::new(10.0, 0.0), false, 10);
        integrate_bullet(&mut b, DT, &arena);
        assert!(b.active);
        assert!((b.pos.x - 1009.375).abs() < 1e-3);
    }
}
