//! Boss AI: config-driven patrol along the waypoint graph
//!
//! A boss walks straight legs between walkway intersections at constant
//! speed. On arrival it picks the next leg; it never despawns itself (the
//! spawn scheduler owns its lifetime).

use glam::Vec2;

use super::office::compute_walkway_lines;
use super::patrol::{Axis, PatrolQuery, pick_next_target};
use super::rng::RandomSource;
use super::state::{Boss, BossType, Desk, GameMode, Player};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::distance;
use crate::tuning::{BossConfig, BossScheduleTuning};

/// Create a boss at a random walkway intersection with one valid leg queued
pub fn create_boss_from_config(
    id: u32,
    config: &BossConfig,
    desks: &[Desk],
    rng: &mut impl RandomSource,
) -> Boss {
    let walkways = compute_walkway_lines(desks, (config.size / 2.0).ceil());
    let nodes: Vec<Vec2> = walkways.intersections().collect();
    let start = nodes
        .get(rng.index(nodes.len()))
        .copied()
        .unwrap_or(Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0));
    let next = pick_next_target(&PatrolQuery::at(start), &walkways, rng);

    Boss {
        id,
        boss_type: config.boss_type,
        position: start,
        speed: config.speed,
        detection_radius: config.detection_radius,
        size: config.size,
        color: config.color.clone(),
        base_points_per_second: config.base_points_per_second,
        patrol_route: [start, next],
        current_target: 1,
        walkways,
        last_point: None,
        last_axis: None,
        bias_target: None,
        snitch_called: false,
        last_shout_ms: None,
    }
}

/// Advance one frame toward the current target, picking a new leg on arrival
pub fn update_boss(boss: &mut Boss, rng: &mut impl RandomSource) {
    let target = boss.target();
    let to_target = target - boss.position;
    let dist = to_target.length();

    if dist > boss.speed {
        boss.position += to_target / dist * boss.speed;
        return;
    }

    // Arrived: snap and choose the next leg
    let came_from = boss.patrol_route[0];
    let leg_axis = Axis::of(came_from, target);
    boss.position = target;
    let query = PatrolQuery {
        from: target,
        avoid: Some(came_from),
        last_axis: Some(leg_axis),
        bias_target: boss.bias_target,
        allow_diagonal: true,
    };
    let next = pick_next_target(&query, &boss.walkways, rng);
    log::trace!(
        "{} boss {} arrived at ({:.0}, {:.0}), next ({:.0}, {:.0})",
        boss.boss_type.label(),
        boss.id,
        target.x,
        target.y,
        next.x,
        next.y
    );
    boss.patrol_route = [target, next];
    boss.current_target = 1;
    boss.last_point = Some(came_from);
    boss.last_axis = Some(leg_axis);
}

impl Boss {
    /// Pull future waypoint picks toward `target` (None clears the bias)
    pub fn set_bias_target(&mut self, target: Option<Vec2>) {
        self.bias_target = target;
    }
}

/// Detection only happens while seated and gaming; walking around is safe
pub fn is_player_detected(player: &Player, boss: &Boss, mode: GameMode) -> bool {
    mode == GameMode::Gaming
        && player.is_sitting
        && distance(player.position, boss.position) <= boss.detection_radius
}

/// Weighted draw over `spawn_probability`, renormalized without `exclude`
pub fn select_random_boss_type(
    configs: &[BossConfig],
    exclude: Option<BossType>,
    rng: &mut impl RandomSource,
) -> BossType {
    let pool: Vec<&BossConfig> = configs
        .iter()
        .filter(|c| Some(c.boss_type) != exclude && c.spawn_probability > 0.0)
        .collect();
    let Some(last) = pool.last() else {
        return configs
            .iter()
            .map(|c| c.boss_type)
            .find(|&t| Some(t) != exclude)
            .unwrap_or(BossType::Manager);
    };

    let total: f32 = pool.iter().map(|c| c.spawn_probability).sum();
    let mut roll = rng.next_f32() * total;
    for cfg in &pool {
        if roll < cfg.spawn_probability {
            return cfg.boss_type;
        }
        roll -= cfg.spawn_probability;
    }
    last.boss_type
}

pub fn random_spawn_delay(config: &BossConfig, rng: &mut impl RandomSource) -> f64 {
    let [min, max] = config.spawn_delay_ms;
    rng.range_ms(min, max)
}

/// How long a boss of this type stays: window + rarity bonus + jitter, floored
pub fn random_despawn_duration(
    config: &BossConfig,
    schedule: &BossScheduleTuning,
    rng: &mut impl RandomSource,
) -> f64 {
    let [min, max] = config.despawn_duration_ms;
    let base = rng.range_ms(min, max);
    let jitter = rng.range_ms(-schedule.despawn_jitter_ms, schedule.despawn_jitter_ms);
    (base + config.rarity_bonus_ms + jitter).max(schedule.min_despawn_ms)
}

/// Lines a boss yells
pub const SNITCH_ARRIVAL_SHOUT: &str = "I heard someone's slacking off!";
pub const CAUGHT_GLIMPSE_SHOUT: &str = "Hey! What's on your screen?";
