//! Spawn timing, placement and difficulty ramp

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;
use crate::consts::{POWERUP_SPAWN_MARGIN, SPAWN_EDGE_OFFSET};
use crate::tuning::{ArenaTuning, SpawnTuning, TankKind};

/// Difficulty level for a given amount of play time
pub fn difficulty_at(time: f32, tuning: &SpawnTuning) -> u32 {
    let steps = (time.max(0.0) / tuning.difficulty_period).floor() as u32;
    let level = steps.saturating_add(1);
    level.min(tuning.max_difficulty)
}

/// Cap on live enemies at a difficulty level
#[inline]
pub fn max_enemies(difficulty: u32, tuning: &SpawnTuning) -> usize {
    tuning.base_max_enemies + difficulty.saturating_sub(1) as usize
}

/// Time since each kind of spawn last happened
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Spawner {
    pub since_enemy: f32,
    pub since_powerup: f32,
    pub since_health_pickup: f32,
}

impl Spawner {
    pub fn advance(&mut self, dt: f32) {
        self.since_enemy += dt;
        self.since_powerup += dt;
        self.since_health_pickup += dt;
    }

    pub fn enemy_due(&self, difficulty: u32, live_enemies: usize, tuning: &SpawnTuning) -> bool {
        let interval = tuning.enemy_interval / difficulty.max(1) as f32;
        self.since_enemy >= interval && live_enemies < max_enemies(difficulty, tuning)
    }

    pub fn powerup_due(&self, active_powerups: usize, tuning: &SpawnTuning) -> bool {
        self.since_powerup >= tuning.powerup_interval
            && active_powerups < tuning.max_active_powerups
    }

    pub fn health_pickup_due(&self, active_powerups: usize, tuning: &SpawnTuning) -> bool {
        self.since_health_pickup >= tuning.health_pickup_interval
            && active_powerups < tuning.max_active_powerups
    }
}

/// Arena edge an enemy enters from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpawnEdge {
    Top,
    Right,
    Bottom,
    Left,
}

impl SpawnEdge {
    pub const ALL: [SpawnEdge; 4] = [
        SpawnEdge::Top,
        SpawnEdge::Right,
        SpawnEdge::Bottom,
        SpawnEdge::Left,
    ];

    /// Distance from the player to this edge's inner border
    pub fn distance_from(&self, pos: Vec2, arena: &ArenaTuning) -> f32 {
        let min = arena.inner_min();
        let max = arena.inner_max();
        match self {
            SpawnEdge::Top => (pos.y - min.y).abs(),
            SpawnEdge::Right => (pos.x - max.x).abs(),
            SpawnEdge::Bottom => (pos.y - max.y).abs(),
            SpawnEdge::Left => (pos.x - min.x).abs(),
        }
    }
}

/// Edges whose map side is not touched by the visible area.
///
/// Falls back to all four when the view covers every side.
pub fn eligible_edges(view_min: Vec2, view_max: Vec2, arena: &ArenaTuning) -> Vec<SpawnEdge> {
    let edges: Vec<SpawnEdge> = SpawnEdge::ALL
        .into_iter()
        .filter(|edge| match edge {
            SpawnEdge::Top => view_min.y > 0.0,
            SpawnEdge::Right => view_max.x < arena.width,
            SpawnEdge::Bottom => view_max.y < arena.height,
            SpawnEdge::Left => view_min.x > 0.0,
        })
        .collect();
    if edges.is_empty() {
        SpawnEdge::ALL.to_vec()
    } else {
        edges
    }
}

/// The eligible edge farthest from the player; ties keep the earlier edge
pub fn farthest_edge(edges: &[SpawnEdge], player: Vec2, arena: &ArenaTuning) -> SpawnEdge {
    let mut best = edges.first().copied().unwrap_or(SpawnEdge::Top);
    let mut best_distance = -1.0;
    for &edge in edges {
        let distance = edge.distance_from(player, arena);
        if distance > best_distance {
            best_distance = distance;
            best = edge;
        }
    }
    best
}

/// Random point along an edge, just outside the inner border
pub fn edge_position(edge: SpawnEdge, arena: &ArenaTuning, rng: &mut impl Rng) -> Vec2 {
    let min = arena.inner_min();
    let max = arena.inner_max();
    let along_x = rng.random_range(min.x..max.x);
    let along_y = rng.random_range(min.y..max.y);
    match edge {
        SpawnEdge::Top => Vec2::new(along_x, min.y - SPAWN_EDGE_OFFSET),
        SpawnEdge::Right => Vec2::new(max.x + SPAWN_EDGE_OFFSET, along_y),
        SpawnEdge::Bottom => Vec2::new(along_x, max.y + SPAWN_EDGE_OFFSET),
        SpawnEdge::Left => Vec2::new(min.x - SPAWN_EDGE_OFFSET, along_y),
    }
}

/// Pick an enemy kind from a 0..100 roll.
///
/// Higher tiers unlock by difficulty; the bands belong to the roll, not the kind.
pub fn enemy_kind_for_roll(roll: u32, difficulty: u32, tuning: &SpawnTuning) -> TankKind {
    if difficulty >= tuning.heavy_min_difficulty && roll < tuning.heavy_chance {
        TankKind::Heavy
    } else if difficulty >= tuning.fast_min_difficulty && roll < tuning.fast_chance {
        TankKind::Fast
    } else {
        TankKind::Basic
    }
}

pub fn roll_enemy_kind(difficulty: u32, tuning: &SpawnTuning, rng: &mut impl Rng) -> TankKind {
    enemy_kind_for_roll(rng.random_range(0..100), difficulty, tuning)
}

/// Random power-up location, kept clear of the border
pub fn powerup_position(arena: &ArenaTuning, rng: &mut impl Rng) -> Vec2 {
    let min = arena.inner_min() + Vec2::splat(POWERUP_SPAWN_MARGIN);
    let max = (arena.inner_max() - Vec2::splat(POWERUP_SPAWN_MARGIN)).max(min);
    Vec2::new(
        rng.random_range(min.x..=max.x),
        rng.random_range(min.y..=max.y),
    )
}

/// Uniform pick among the kinds that apply on contact
pub fn roll_powerup_kind(rng: &mut impl Rng) -> PowerUpKind {
    PowerUpKind::DROPPABLE[rng.random_range(0..PowerUpKind::DROPPABLE.len())]
}

/// Whether a destroyed enemy leaves a power-up behind
pub fn rolls_drop(tuning: &SpawnTuning, rng: &mut impl Rng) -> bool {
    rng.random_range(0..=100) < tuning.drop_chance
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_difficulty_ramp() {
        let t = SpawnTuning::default();
        assert_eq!(difficulty_at(0.0, &t), 1);
        assert_eq!(difficulty_at(59.9, &t), 1);
        assert_eq!(difficulty_at(60.0, &t), 2);
        assert_eq!(difficulty_at(245.0, &t), 5);
        assert_eq!(difficulty_at(10_000.0, &t), 5);
        assert_eq!(difficulty_at(f32::MAX, &t), 5);
        assert_eq!(difficulty_at(f32::INFINITY, &t), 5);
    }

    #[test]
    fn test_drop_roll_rate() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut t = SpawnTuning::default();
        let drops = (0..10_000).filter(|_| rolls_drop(&t, &mut rng)).count();
        // 30 of 101 outcomes
        assert!((2_700..3_300).contains(&drops), "drops = {drops}");

        t.drop_chance = 0;
        assert!((0..1_000).all(|_| !rolls_drop(&t, &mut rng)));
        t.drop_chance = 101;
        assert!((0..1_000).all(|_| rolls_drop(&t, &mut rng)));
    }

    #[test]
    fn test_enemy_gate() {
        let t = SpawnTuning::default();
        let spawner = Spawner {
            since_enemy: 1.0,
            ..Default::default()
        };
        // Interval halves at difficulty 2
        assert!(!spawner.enemy_due(1, 0, &t));
        assert!(spawner.enemy_due(2, 0, &t));
        // Cap grows with difficulty
        assert!(!spawner.enemy_due(2, 6, &t));
        assert!(spawner.enemy_due(2, 5, &t));
    }

    #[test]
    fn test_powerup_gates_respect_cap() {
        let t = SpawnTuning::default();
        let spawner = Spawner {
            since_enemy: 0.0,
            since_powerup: 15.0,
            since_health_pickup: 20.0,
        };
        assert!(spawner.powerup_due(2, &t));
        assert!(!spawner.powerup_due(3, &t));
        assert!(spawner.health_pickup_due(0, &t));
        assert!(!spawner.health_pickup_due(3, &t));
    }

    #[test]
    fn test_edge_selection_prefers_far_offscreen_edge() {
        let arena = ArenaTuning::default();
        // View pinned to the top-left corner
        let edges = eligible_edges(Vec2::ZERO, Vec2::new(1500.0, 750.0), &arena);
        assert_eq!(edges, vec![SpawnEdge::Right, SpawnEdge::Bottom]);

        let player = Vec2::new(600.0, 400.0);
        assert_eq!(farthest_edge(&edges, player, &arena), SpawnEdge::Right);

        let player = Vec2::new(1700.0, 300.0);
        assert_eq!(farthest_edge(&edges, player, &arena), SpawnEdge::Bottom);
    }

    #[test]
    fn test_all_edges_when_view_covers_map() {
        let arena = ArenaTuning::default();
        let edges = eligible_edges(Vec2::ZERO, Vec2::new(2000.0, 1600.0), &arena);
        assert_eq!(edges, SpawnEdge::ALL.to_vec());
    }

    #[test]
    fn test_edge_positions_sit_outside_border() {
        let arena = ArenaTuning::default();
        let mut rng = Pcg32::seed_from_u64(3);
        for _ in 0..50 {
            let top = edge_position(SpawnEdge::Top, &arena, &mut rng);
            assert_eq!(top.y, 170.0);
            assert!(top.x >= 200.0 && top.x < 1800.0);
            let right = edge_position(SpawnEdge::Right, &arena, &mut rng);
            assert_eq!(right.x, 1830.0);
            assert!(right.y >= 200.0 && right.y < 1400.0);
        }
    }

    #[test]
    fn test_kind_bands_depend_on_difficulty() {
        let t = SpawnTuning::default();
        assert_eq!(enemy_kind_for_roll(5, 1, &t), TankKind::Basic);
        assert_eq!(enemy_kind_for_roll(5, 2, &t), TankKind::Fast);
        assert_eq!(enemy_kind_for_roll(5, 3, &t), TankKind::Heavy);
        assert_eq!(enemy_kind_for_roll(30, 3, &t), TankKind::Fast);
        assert_eq!(enemy_kind_for_roll(40, 5, &t), TankKind::Basic);
    }

    #[test]
    fn test_powerup_position_inside_margin() {
        let arena = ArenaTuning::default();
        let mut rng = Pcg32::seed_from_u64(11);
        for _ in 0..100 {
            let pos = powerup_position(&arena, &mut rng);
            assert!(pos.x >= 250.0 && pos.x <= 1750.0);
            assert!(pos.y >= 250.0 && pos.y <= 1350.0);
            assert_ne!(roll_powerup_kind(&mut rng), PowerUpKind::HealthPickup);
        }
    }
}
