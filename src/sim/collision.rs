//! Collision detection and response
//!
//! Everything here is circle-based: each tank has a collision radius, bullets
//! and power-ups are points. Resolvers mutate only physical state and report
//! what happened; scoring, drops and effects are applied by the caller once
//! the pass is complete, so no entity is removed while indices are still held.

use glam::Vec2;

use super::state::{Bullet, PowerUp, PowerUpKind, Tank};
use crate::consts::MIN_SEPARATION;
use crate::tuning::{ArenaTuning, CombatTuning};

/// Result of a wall check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BounceResult {
    /// Whether any axis was reflected
    pub hit: bool,
    /// Position after clamping
    pub point: Vec2,
}

impl BounceResult {
    pub fn miss(point: Vec2) -> Self {
        Self { hit: false, point }
    }
}

/// Reflect a tank off the inner border and clamp it back inside.
///
/// The reflected component always points inward, scaled by `bounce_factor`.
pub fn wall_bounce(tank: &mut Tank, arena: &ArenaTuning, bounce_factor: f32) -> BounceResult {
    let r = tank.collision_radius;
    let min = arena.inner_min() + Vec2::splat(r);
    let max = arena.inner_max() - Vec2::splat(r);
    let mut hit = false;

    if tank.pos.x < min.x {
        tank.vel.x = tank.vel.x.abs() * bounce_factor;
        hit = true;
    } else if tank.pos.x > max.x {
        tank.vel.x = -tank.vel.x.abs() * bounce_factor;
        hit = true;
    }

    if tank.pos.y < min.y {
        tank.vel.y = tank.vel.y.abs() * bounce_factor;
        hit = true;
    } else if tank.pos.y > max.y {
        tank.vel.y = -tank.vel.y.abs() * bounce_factor;
        hit = true;
    }

    contain(tank, arena);
    if hit {
        BounceResult {
            hit,
            point: tank.pos,
        }
    } else {
        BounceResult::miss(tank.pos)
    }
}

/// Clamp a tank's center so its circle lies inside the inner border
pub fn contain(tank: &mut Tank, arena: &ArenaTuning) {
    let r = Vec2::splat(tank.collision_radius);
    let min = arena.inner_min() + r;
    let max = (arena.inner_max() - r).max(min);
    tank.pos = tank.pos.clamp(min, max);
}

/// Push two overlapping tanks apart.
///
/// Both receive an equal and opposite impulse of `force` along the separating
/// normal and are moved apart by half the overlap, capped at `max_push`.
/// Returns the contact point when the pair overlapped.
pub fn separate_tanks(a: &mut Tank, b: &mut Tank, force: f32, max_push: f32) -> Option<Vec2> {
    let delta = b.pos - a.pos;
    let mut distance = delta.length();
    let min_distance = a.collision_radius + b.collision_radius;
    if distance >= min_distance {
        return None;
    }

    let normal = if distance < MIN_SEPARATION {
        distance = 1.0;
        Vec2::X
    } else {
        delta / distance
    };

    a.vel -= normal * force;
    b.vel += normal * force;

    let push = ((min_distance - distance) / 2.0).min(max_push);
    if push > 0.0 {
        a.pos -= normal * push;
        b.pos += normal * push;
    }

    Some(a.pos + normal * a.collision_radius)
}

/// Resolve player/enemy and enemy/enemy overlaps.
///
/// Returns the contact points involving the player.
pub fn resolve_tank_contacts(
    player: &mut Tank,
    enemies: &mut [Tank],
    combat: &CombatTuning,
) -> Vec<Vec2> {
    let mut player_contacts = Vec::new();

    if player.alive {
        for enemy in enemies.iter_mut().filter(|e| e.alive) {
            if let Some(point) = separate_tanks(player, enemy, combat.push_force, combat.max_push)
            {
                player_contacts.push(point);
            }
        }
    }

    let enemy_force = combat.push_force * combat.enemy_push_factor;
    for j in 1..enemies.len() {
        let (head, tail) = enemies.split_at_mut(j);
        let b = &mut tail[0];
        if !b.alive {
            continue;
        }
        for a in head.iter_mut().filter(|e| e.alive) {
            separate_tanks(a, b, enemy_force, combat.max_push);
        }
    }

    player_contacts
}

/// What a bullet struck
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    /// Index into the enemy slice
    Enemy(usize),
    Player,
}

/// One landed (or deflected) bullet
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BulletHit {
    pub bullet: usize,
    pub target: HitTarget,
    /// Bullet position at impact
    pub point: Vec2,
    pub damage: i32,
    /// Absorbed by the player's shield
    pub deflected: bool,
    /// This hit took the target to zero
    pub killed: bool,
    pub special: bool,
}

/// Test every active bullet against live tanks of the opposing side.
///
/// A bullet lands on at most one target and deactivates on impact. Damage to a
/// shielded player is nullified.
pub fn resolve_bullet_hits(
    bullets: &mut [Bullet],
    enemies: &mut [Tank],
    player: &mut Tank,
    player_shielded: bool,
) -> Vec<BulletHit> {
    let mut hits = Vec::new();

    for (bullet_index, bullet) in bullets.iter_mut().enumerate() {
        if !bullet.active {
            continue;
        }

        if bullet.from_enemy {
            if !player.alive || bullet.pos.distance(player.pos) >= player.collision_radius {
                continue;
            }
            bullet.active = false;
            let killed = !player_shielded && player.apply_damage(bullet.damage);
            hits.push(BulletHit {
                bullet: bullet_index,
                target: HitTarget::Player,
                point: bullet.pos,
                damage: if player_shielded { 0 } else { bullet.damage },
                deflected: player_shielded,
                killed,
                special: bullet.is_special,
            });
            continue;
        }

        let target = enemies
            .iter()
            .position(|e| e.alive && bullet.pos.distance(e.pos) < e.collision_radius);
        if let Some(enemy_index) = target {
            bullet.active = false;
            let killed = enemies[enemy_index].apply_damage(bullet.damage);
            hits.push(BulletHit {
                bullet: bullet_index,
                target: HitTarget::Enemy(enemy_index),
                point: bullet.pos,
                damage: bullet.damage,
                deflected: false,
                killed,
                special: bullet.is_special,
            });
        }
    }

    hits
}

/// Consume power-ups within reach of the player
pub fn collect_powerups(
    powerups: &mut [PowerUp],
    player: &Tank,
    pickup_radius: f32,
) -> Vec<(PowerUpKind, Vec2)> {
    if !player.alive {
        return Vec::new();
    }
    let reach = player.collision_radius + pickup_radius;
    powerups
        .iter_mut()
        .filter(|p| p.active && p.pos.distance(player.pos) < reach)
        .map(|p| {
            p.active = false;
            (p.kind, p.pos)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::{TankKind, Tuning};

    fn tank_at(kind: TankKind, pos: Vec2) -> Tank {
        let tuning = Tuning::default();
        Tank::new(1, kind, pos, tuning.profile(kind))
    }

    #[test]
    fn test_wall_bounce_reflects_inward() {
        let arena = ArenaTuning::default();
        let mut t = tank_at(TankKind::Basic, Vec2::new(220.0, 800.0));
        t.vel = Vec2::new(-2.0, 1.0);

        let result = wall_bounce(&mut t, &arena, 0.9);
        assert!(result.hit);
        assert!((t.vel.x - 1.8).abs() < 1e-6);
        assert_eq!(t.vel.y, 1.0);
        assert_eq!(t.pos.x, 230.0);
    }

    #[test]
    fn test_wall_bounce_far_edge() {
        let arena = ArenaTuning::default();
        let mut t = tank_at(TankKind::Heavy, Vec2::new(1000.0, 1390.0));
        t.vel = Vec2::new(0.0, 2.0);
        assert!(wall_bounce(&mut t, &arena, 0.9).hit);
        assert!((t.vel.y + 1.8).abs() < 1e-6);
        assert_eq!(t.pos.y, 1365.0);
    }

    #[test]
    fn test_wall_exact_boundary_is_not_a_bounce() {
        let arena = ArenaTuning::default();
        let mut t = tank_at(TankKind::Basic, Vec2::new(230.0, 800.0));
        t.vel = Vec2::new(-1.0, 0.0);
        assert!(!wall_bounce(&mut t, &arena, 0.9).hit);
        assert_eq!(t.vel.x, -1.0);
    }

    #[test]
    fn test_separate_overlapping_enemies() {
        // Combined radius 60, distance 50
        let mut a = tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0));
        let mut b = tank_at(TankKind::Basic, Vec2::new(1050.0, 800.0));
        let contact = separate_tanks(&mut a, &mut b, 0.525, 2.0);
        assert!(contact.is_some());
        assert_eq!(a.pos.x, 998.0);
        assert_eq!(b.pos.x, 1052.0);
        assert!(a.vel.x < 0.0 && b.vel.x > 0.0);
        assert_eq!(a.vel.x, -b.vel.x);
    }

    #[test]
    fn test_separate_small_overlap_moves_half() {
        let mut a = tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0));
        let mut b = tank_at(TankKind::Basic, Vec2::new(1059.0, 800.0));
        separate_tanks(&mut a, &mut b, 1.05, 2.0);
        assert!((a.pos.x - 999.5).abs() < 1e-4);
        assert!((b.pos.x - 1059.5).abs() < 1e-4);
    }

    #[test]
    fn test_separate_coincident_uses_fallback_axis() {
        let mut a = tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0));
        let mut b = tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0));
        separate_tanks(&mut a, &mut b, 1.0, 2.0);
        assert!(a.pos.is_finite() && b.pos.is_finite());
        assert_eq!(a.pos, Vec2::new(998.0, 800.0));
        assert_eq!(b.pos, Vec2::new(1002.0, 800.0));
    }

    #[test]
    fn test_separate_no_overlap() {
        let mut a = tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0));
        let mut b = tank_at(TankKind::Basic, Vec2::new(1060.0, 800.0));
        assert!(separate_tanks(&mut a, &mut b, 1.0, 2.0).is_none());
        assert_eq!(a.vel, Vec2::ZERO);
    }

    #[test]
    fn test_enemy_pair_converges() {
        let combat = CombatTuning::default();
        let mut player = tank_at(TankKind::Basic, Vec2::new(400.0, 400.0));
        let mut enemies = vec![
            tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0)),
            tank_at(TankKind::Basic, Vec2::new(1050.0, 800.0)),
        ];

        let mut previous_gap = 50.0;
        for _ in 0..10 {
            resolve_tank_contacts(&mut player, &mut enemies, &combat);
            let gap = enemies[0].pos.distance(enemies[1].pos);
            assert!(gap - previous_gap <= 4.0 + 1e-4);
            assert!(gap >= previous_gap);
            previous_gap = gap;
        }
        assert!(previous_gap >= 60.0);
    }

    #[test]
    fn test_player_contact_pushes_harder_than_enemy_pair() {
        let combat = CombatTuning::default();
        let mut player = tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0));
        let mut enemies = vec![
            tank_at(TankKind::Basic, Vec2::new(1050.0, 800.0)),
            tank_at(TankKind::Basic, Vec2::new(400.0, 400.0)),
            tank_at(TankKind::Basic, Vec2::new(450.0, 400.0)),
        ];

        let contacts = resolve_tank_contacts(&mut player, &mut enemies, &combat);
        assert_eq!(contacts.len(), 1);

        let full = combat.push_force;
        let half = combat.push_force * combat.enemy_push_factor;
        assert!((player.vel.x + full).abs() < 1e-6);
        assert!((enemies[0].vel.x - full).abs() < 1e-6);
        assert!((enemies[1].vel.x + half).abs() < 1e-6);
        assert!((enemies[2].vel.x - half).abs() < 1e-6);
        assert!((half * 2.0 - full).abs() < 1e-6);
    }

    #[test]
    fn test_bullet_hits_first_enemy_only() {
        let mut enemies = vec![
            tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0)),
            tank_at(TankKind::Basic, Vec2::new(1005.0, 800.0)),
        ];
        let mut player = tank_at(TankKind::Basic, Vec2::new(400.0, 400.0));
        let mut bullets = vec![Bullet::new(9, Vec2::new(1002.0, 800.0), Vec2::X, false, 10)];

        let hits = resolve_bullet_hits(&mut bullets, &mut enemies, &mut player, false);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].target, HitTarget::Enemy(0));
        assert!(!bullets[0].active);
        assert_eq!(enemies[0].hp, 90);
        assert_eq!(enemies[1].hp, 100);

        // Consumed bullets are never tested again
        let hits = resolve_bullet_hits(&mut bullets, &mut enemies, &mut player, false);
        assert!(hits.is_empty());
    }

    #[test]
    fn test_bullets_ignore_own_side() {
        let mut enemies = vec![tank_at(TankKind::Basic, Vec2::new(1000.0, 800.0))];
        let mut player = tank_at(TankKind::Basic, Vec2::new(400.0, 400.0));
        let mut bullets = vec![
            Bullet::new(1, Vec2::new(1000.0, 800.0), Vec2::X, true, 10),
            Bullet::new(2, Vec2::new(400.0, 400.0), Vec2::X, false, 10),
        ];
        let hits = resolve_bullet_hits(&mut bullets, &mut enemies, &mut player, false);
        assert!(hits.is_empty());
        assert!(bullets.iter().all(|b| b.active));
    }

    #[test]
    fn test_shield_deflects() {
        let mut enemies = Vec::new();
        let mut player = tank_at(TankKind::Basic, Vec2::new(400.0, 400.0));
        let mut bullets = vec![Bullet::new(1, Vec2::new(405.0, 400.0), Vec2::X, true, 30)];
        let hits = resolve_bullet_hits(&mut bullets, &mut enemies, &mut player, true);
        assert_eq!(hits.len(), 1);
        assert!(hits[0].deflected);
        assert_eq!(player.hp, 100);
        assert!(!bullets[0].active);
    }

    #[test]
    fn test_collect_powerups_in_reach() {
        let player = tank_at(TankKind::Basic, Vec2::new(400.0, 400.0));
        let mut powerups = vec![
            PowerUp {
                id: 1,
                kind: PowerUpKind::Speed,
                pos: Vec2::new(440.0, 400.0),
                spawned_at: 0.0,
                active: true,
            },
            PowerUp {
                id: 2,
                kind: PowerUpKind::Damage,
                pos: Vec2::new(446.0, 400.0),
                spawned_at: 0.0,
                active: true,
            },
        ];
        let taken = collect_powerups(&mut powerups, &player, 15.0);
        assert_eq!(taken, vec![(PowerUpKind::Speed, Vec2::new(440.0, 400.0))]);
        assert!(!powerups[0].active);
        assert!(powerups[1].active);

        // Consumed exactly once
        assert!(collect_powerups(&mut powerups, &player, 15.0).is_empty());
    }
}
