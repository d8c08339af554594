//! Per-frame simulation update
//!
//! Core game loop that advances the session by one frame delta. Stages run in
//! a fixed order: input, player, abilities, spawning, enemies, bullets,
//! collisions, cleanup, camera, cooldowns, game-over check.

use glam::Vec2;

use super::abilities::ChargeOutcome;
use super::ai::{enemy_fire, steer};
use super::collision::{
    HitTarget, collect_powerups, contain, resolve_bullet_hits, resolve_tank_contacts, wall_bounce,
};
use super::movement::{MoveAxes, apply_move_input, integrate_bullet, integrate_tank};
use super::spawn::{
    difficulty_at, edge_position, eligible_edges, farthest_edge, powerup_position,
    roll_enemy_kind, roll_powerup_kind, rolls_drop,
};
use super::state::{GameEvent, GamePhase, GameState, PowerUpKind};
use crate::consts::{MAX_FRAME_DT, MIN_SEPARATION};
use crate::tuning::TankKind;

/// Input for a single frame.
///
/// Held flags reflect the current device state; press flags are one-shot and
/// should be cleared by the driver after each call.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    pub axes: MoveAxes,
    /// World point the turret should face
    pub aim: Option<Vec2>,
    /// Primary trigger went down this frame
    pub fire_pressed: bool,
    pub fire_held: bool,
    /// Secondary trigger (special charge)
    pub special_held: bool,
    pub special_cancel: bool,
    pub shield: bool,
    pub rapid_fire: bool,
    pub use_health_pickup: bool,
    /// Pause toggle
    pub pause: bool,
    /// Start from the menu or restart after game over
    pub start: bool,
    /// Autopilot plays the player
    pub autopilot: bool,
}

/// Advance the session by one frame
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    state.events.clear();

    match state.phase {
        GamePhase::Menu | GamePhase::GameOver => {
            if input.start {
                state.reset();
            }
            return;
        }
        GamePhase::Paused => {
            if !input.pause {
                return;
            }
            state.phase = GamePhase::Playing;
            log::info!("Resumed at {:.1}s", state.time);
        }
        GamePhase::Playing => {
            if input.pause {
                state.phase = GamePhase::Paused;
                log::info!("Paused at {:.1}s", state.time);
                return;
            }
        }
    }

    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    let input = if input.autopilot {
        autopilot_input(state, input, dt)
    } else {
        input.clone()
    };

    handle_actions(state, &input);
    state.time += dt;

    // Player
    integrate_tank(&mut state.player.tank, dt);
    let bounce = wall_bounce(
        &mut state.player.tank,
        &state.tuning.arena,
        state.tuning.combat.bounce_factor,
    );
    if bounce.hit {
        state.camera.start_shake(3.0, 0.1);
        state.events.push(GameEvent::WallBounce {
            pos: bounce.point,
            is_player: true,
        });
    }

    // Abilities
    if state
        .player
        .rapid_fire
        .step(dt, input.fire_held, &state.tuning.abilities)
    {
        player_shoot(state, true);
    }
    step_special(state, input.special_held, dt);
    state.player.regen.step(dt, &state.tuning.abilities);

    update_difficulty(state);
    run_spawners(state, dt);
    update_enemies(state, dt);

    for bullet in &mut state.bullets {
        integrate_bullet(bullet, dt, &state.tuning.arena);
    }

    resolve_collisions(state);

    // Pushes and knockback can leave a tank past the border
    contain(&mut state.player.tank, &state.tuning.arena);
    for enemy in &mut state.enemies {
        contain(enemy, &state.tuning.arena);
    }

    for note in &mut state.notifications {
        note.remaining -= dt;
    }

    purge(state);

    state.camera.zoom = state.player.special.zoom(&state.tuning.abilities);
    state
        .camera
        .follow(state.player.tank.pos, &state.tuning.arena);

    state.player.rapid_fire.tick(dt);
    if state.player.shield.tick(dt) {
        state.events.push(GameEvent::ShieldExpired);
    }
    state.camera.shake.tick(dt);

    if !state.player.tank.alive {
        end_run(state);
    }
}

/// Aim, movement and one-shot presses
fn handle_actions(state: &mut GameState, input: &TickInput) {
    let player = &mut state.player;

    if let Some(target) = input.aim {
        let delta = target - player.tank.pos;
        if delta.length() >= MIN_SEPARATION {
            player.tank.angle = delta.y.atan2(delta.x);
        }
    }

    apply_move_input(&mut player.tank, input.axes, state.held_axes);
    state.held_axes = input.axes.as_array();

    let abilities = &state.tuning.abilities;
    if input.special_cancel && player.special.cancel() {
        log::debug!("Special shot cancelled");
    }
    if input.shield && player.shield.try_activate(abilities) {
        state.events.push(GameEvent::ShieldActivated);
    }
    if input.rapid_fire && player.rapid_fire.try_activate(abilities) {
        state.events.push(GameEvent::RapidFireActivated);
    }
    if input.use_health_pickup
        && let Some(amount) = player.use_health_pickup(abilities)
    {
        state.events.push(GameEvent::Healed { amount });
        state.notify(format!("HEALTH +{amount}"));
    }

    // One bullet per press; held fire belongs to rapid fire
    if input.fire_pressed && !state.player.rapid_fire.is_active() {
        player_shoot(state, false);
    }
}

/// Fire a regular bullet along the turret and apply recoil
fn player_shoot(state: &mut GameState, rapid: bool) {
    let combat = &state.tuning.combat;
    let tank = &mut state.player.tank;
    let dir = tank.facing();
    let pos = tank.muzzle();
    let vel = dir * combat.bullet_speed;
    let damage = tank.damage;

    let recoil = if rapid {
        combat.recoil * state.tuning.abilities.rapid_fire_recoil_factor
    } else {
        combat.recoil
    };
    tank.vel -= dir * recoil;

    state.spawn_bullet(pos, vel, false, damage, false);
    state.stats.shots_fired += 1;
    state.events.push(GameEvent::PlayerShot {
        pos,
        angle: dir.y.atan2(dir.x),
        rapid,
    });
    if rapid {
        state.camera.start_shake(0.5, 0.03);
    } else {
        state.camera.start_shake(1.0, 0.05);
    }

    if state
        .player
        .special
        .record_regular_shot(state.stats.shots_fired, &state.tuning.abilities)
    {
        let stock = state.player.special.stock;
        log::debug!("Special bullet earned ({stock} in stock)");
        state.events.push(GameEvent::SpecialEarned { stock });
    }
}

fn step_special(state: &mut GameState, held: bool, dt: f32) {
    let outcome = state
        .player
        .special
        .step(held, dt, &state.tuning.abilities);
    if outcome != ChargeOutcome::Fired {
        return;
    }

    let tank = &state.player.tank;
    let dir = tank.facing();
    let pos = tank.muzzle();
    let ab = &state.tuning.abilities;
    let vel = dir * state.tuning.combat.bullet_speed * ab.special_speed_factor;
    let damage = ab.special_damage;

    state.spawn_bullet(pos, vel, false, damage, true);
    state.camera.start_shake(5.0, 0.3);
    state.events.push(GameEvent::SpecialShot {
        pos,
        angle: dir.y.atan2(dir.x),
    });
}

fn update_difficulty(state: &mut GameState) {
    let level = difficulty_at(state.time, &state.tuning.spawn);
    if level > state.difficulty {
        state.difficulty = level;
        state.stats.level = state.stats.level.max(level);
        log::debug!("Difficulty {level} at {:.1}s", state.time);
        state.events.push(GameEvent::DifficultyUp { level });
    }
}

fn run_spawners(state: &mut GameState, dt: f32) {
    state.spawner.advance(dt);

    let live = state.live_enemy_count();
    if state
        .spawner
        .enemy_due(state.difficulty, live, &state.tuning.spawn)
    {
        let arena = &state.tuning.arena;
        let (view_min, view_max) = state.camera.view_rect(arena);
        let edges = eligible_edges(view_min, view_max, arena);
        let edge = farthest_edge(&edges, state.player.tank.pos, arena);
        let pos = edge_position(edge, arena, &mut state.rng);
        let kind = roll_enemy_kind(state.difficulty, &state.tuning.spawn, &mut state.rng);

        state.spawn_enemy(kind, pos);
        state.spawner.since_enemy = 0.0;
        log::debug!("Spawned {} enemy on {:?} edge", kind.as_str(), edge);
        state.events.push(GameEvent::EnemySpawned { kind, pos });
    }

    let active = state.powerups.iter().filter(|p| p.active).count();
    if state.spawner.powerup_due(active, &state.tuning.spawn) {
        let pos = powerup_position(&state.tuning.arena, &mut state.rng);
        let kind = roll_powerup_kind(&mut state.rng);
        state.spawn_powerup(kind, pos);
        state.spawner.since_powerup = 0.0;
        log::debug!("Spawned {kind:?} power-up");
    }

    let active = state.powerups.iter().filter(|p| p.active).count();
    if state.spawner.health_pickup_due(active, &state.tuning.spawn) {
        let pos = powerup_position(&state.tuning.arena, &mut state.rng);
        state.spawn_powerup(PowerUpKind::HealthPickup, pos);
        state.spawner.since_health_pickup = 0.0;
    }
}

/// Steer, bounce, fire and move every live enemy
fn update_enemies(state: &mut GameState, dt: f32) {
    let player_pos = state.player.tank.pos;
    let player_alive = state.player.tank.alive;
    let tuning = &state.tuning;
    let mut shots = Vec::new();

    for enemy in state.enemies.iter_mut().filter(|e| e.alive) {
        if player_alive {
            steer(enemy, player_pos, &tuning.ai, &mut state.rng);
        }
        wall_bounce(enemy, &tuning.arena, tuning.combat.bounce_factor);
        if player_alive
            && let Some(shot) = enemy_fire(
                enemy,
                player_pos,
                dt,
                tuning.profile(enemy.kind),
                tuning.combat.bullet_speed,
            )
        {
            shots.push(shot);
        }
        integrate_tank(enemy, dt);
    }

    for shot in shots {
        state.spawn_bullet(shot.pos, shot.vel, true, shot.damage, false);
        state.events.push(GameEvent::EnemyShot {
            pos: shot.pos,
            angle: shot.vel.y.atan2(shot.vel.x),
        });
    }
}

/// Bullets, tank contacts and pickups, then their consequences
fn resolve_collisions(state: &mut GameState) {
    let shielded = state.player.shield.is_up();
    let hits = resolve_bullet_hits(
        &mut state.bullets,
        &mut state.enemies,
        &mut state.player.tank,
        shielded,
    );

    for hit in hits {
        match hit.target {
            HitTarget::Enemy(index) => {
                state.events.push(GameEvent::BulletHit {
                    pos: hit.point,
                    enemy_bullet: false,
                });
                if hit.killed {
                    let enemy = &state.enemies[index];
                    let (kind, pos) = (enemy.kind, enemy.pos);
                    enemy_destroyed(state, kind, pos, hit.special);
                }
            }
            HitTarget::Player if hit.deflected => {
                state.events.push(GameEvent::ShieldDeflect { pos: hit.point });
            }
            HitTarget::Player => {
                state.events.push(GameEvent::BulletHit {
                    pos: hit.point,
                    enemy_bullet: true,
                });
                state.camera.start_shake(3.0, 0.15);
                if hit.killed {
                    let pos = state.player.tank.pos;
                    state.spawn_explosion(pos, false);
                    state.camera.start_shake(10.0, 0.5);
                    state.events.push(GameEvent::PlayerDestroyed { pos });
                    log::info!("Player destroyed at {:.1}s", state.time);
                }
            }
        }
    }

    let contacts = resolve_tank_contacts(
        &mut state.player.tank,
        &mut state.enemies,
        &state.tuning.combat,
    );
    for pos in contacts {
        state.camera.start_shake(2.0, 0.1);
        state.events.push(GameEvent::TankContact { pos });
    }

    let taken = collect_powerups(
        &mut state.powerups,
        &state.player.tank,
        state.tuning.combat.pickup_radius,
    );
    for (kind, pos) in taken {
        apply_powerup(state, kind);
        state.events.push(GameEvent::PowerUpCollected { kind, pos });
    }
}

/// Score, rewards and drops for a kill
fn enemy_destroyed(state: &mut GameState, kind: TankKind, pos: Vec2, special: bool) {
    state.spawn_explosion(pos, special);
    if special {
        state.camera.start_shake(6.0, 0.3);
    } else {
        state.camera.start_shake(4.0, 0.2);
    }

    state.stats.kills += 1;
    state.stats.score += state.tuning.profile(kind).score;
    state.notify("KILL");

    let rewards = &state.tuning.powerups;
    if rewards.kills_per_max_hp_bonus > 0 && state.stats.kills % rewards.kills_per_max_hp_bonus == 0
    {
        let bonus = rewards.max_hp_bonus;
        state.player.tank.max_hp += bonus;
        state.notify(format!("MAX HP +{bonus}"));
    }

    if rolls_drop(&state.tuning.spawn, &mut state.rng) {
        let drop = roll_powerup_kind(&mut state.rng);
        state.spawn_powerup(drop, pos);
    }

    state.events.push(GameEvent::EnemyDestroyed { kind, pos, special });
}

fn apply_powerup(state: &mut GameState, kind: PowerUpKind) {
    let effects = &state.tuning.powerups;
    let player = &mut state.player;
    match kind {
        PowerUpKind::Health => {
            player.tank.hp = (player.tank.hp + effects.health_restore).min(player.tank.max_hp);
        }
        PowerUpKind::Speed => player.tank.speed *= effects.speed_multiplier,
        PowerUpKind::Damage => player.tank.damage += effects.damage_bonus,
        PowerUpKind::Shield => {
            player.shield.force_activate(&state.tuning.abilities);
            state.events.push(GameEvent::ShieldActivated);
        }
        PowerUpKind::RapidFire => {
            player.rapid_fire.activate_from_pickup(&state.tuning.abilities);
            state.events.push(GameEvent::RapidFireActivated);
        }
        PowerUpKind::HealthPickup => {
            player.health_pickups += 1;
            state.notify("HEALTH PACK +1");
        }
    }
}

/// Drop consumed bullets, dead enemies, taken power-ups and finished effects
fn purge(state: &mut GameState) {
    let now = state.time;
    let duration = state.tuning.combat.explosion_duration;
    for explosion in &mut state.explosions {
        if now - explosion.started_at >= duration {
            explosion.active = false;
        }
    }

    state.bullets.retain(|b| b.active);
    state.enemies.retain(|e| e.alive);
    state.powerups.retain(|p| p.active);
    state.explosions.retain(|e| e.active);
    state.notifications.retain(|n| n.remaining > 0.0);
}

fn end_run(state: &mut GameState) {
    state.phase = GamePhase::GameOver;
    let stats = state.stats;
    let rank = state
        .high_scores
        .record(stats.score, stats.level, stats.kills, state.time);
    log::info!(
        "Game over: score {} kills {} level {} after {:.1}s (rank {:?})",
        stats.score,
        stats.kills,
        stats.level,
        state.time,
        rank
    );
}

/// Simple bot: keep a working distance from the nearest enemy and shoot it
fn autopilot_input(state: &GameState, input: &TickInput, dt: f32) -> TickInput {
    let mut input = input.clone();
    let player = &state.player;
    let pos = player.tank.pos;

    let nearest = state
        .enemies
        .iter()
        .filter(|e| e.alive)
        .min_by(|a, b| {
            a.pos
                .distance_squared(pos)
                .partial_cmp(&b.pos.distance_squared(pos))
                .unwrap_or(std::cmp::Ordering::Equal)
        });

    input.axes = MoveAxes::default();
    if let Some(enemy) = nearest {
        input.aim = Some(enemy.pos);
        let distance = enemy.pos.distance(pos);

        // Two shots a second
        input.fire_pressed = (state.time % 0.5) + dt >= 0.5;
        input.fire_held = true;
        input.rapid_fire = distance < 500.0;

        let away = pos - enemy.pos;
        let heading = if distance < 250.0 {
            away
        } else if distance > 450.0 {
            -away
        } else {
            Vec2::ZERO
        };
        input.axes = MoveAxes {
            up: heading.y < -1.0,
            down: heading.y > 1.0,
            left: heading.x < -1.0,
            right: heading.x > 1.0,
        };

        let ab = &state.tuning.abilities;
        input.special_held = player.special.stock > 0 && player.special.charge_progress(ab) < 1.0;
    }

    let threatened = state
        .bullets
        .iter()
        .any(|b| b.active && b.from_enemy && b.pos.distance(pos) < 120.0);
    input.shield = threatened;
    input.use_health_pickup = player.tank.hp * 2 < player.tank.max_hp;

    input
}
