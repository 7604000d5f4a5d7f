//! Coworker AI: four behaviours on one movement substrate
//!
//! Coworkers patrol the same waypoint graph as bosses but resolve desk
//! collisions per axis, and can be diverted into a short "rush" toward the
//! player. The orchestrator decides when each behaviour fires; the checks
//! here only answer "would this coworker act now?".

use glam::Vec2;

use super::collision::{check_entity_collision, has_line_of_sight};
use super::office::compute_walkway_lines;
use super::patrol::{Axis, PatrolQuery, coerce_to_straight_target, pick_next_target};
use super::rng::RandomSource;
use super::state::{
    Boss, ConversationState, Coworker, CoworkerType, Desk, GameMode, Player, Rush,
};
use crate::consts::*;
use crate::distance;
use crate::tuning::{CoworkerConfig, CoworkerSystemTuning, Tuning};

/// Gossip openers
pub const GOSSIP_LINES: [&str; 4] = [
    "Did you hear about the reorg?",
    "So... about that team lunch yesterday.",
    "You won't believe what happened in accounting.",
    "Got a minute? This will only take a sec.",
];

pub const HELPFUL_WARNING: &str = "Psst! Boss nearby, look busy!";
pub const SNITCH_WARNING: &str = "Someone called the boss!";

/// Everything a behaviour check needs to know about the current frame
#[derive(Debug, Clone, Copy)]
pub struct ActionContext<'a> {
    pub player: &'a Player,
    pub mode: GameMode,
    pub boss: Option<&'a Boss>,
    pub desks: &'a [Desk],
    pub suspicion: f32,
    pub now_ms: f64,
    pub tuning: &'a Tuning,
}

impl ActionContext<'_> {
    fn can_act(&self, coworker: &Coworker) -> bool {
        let cooldown = self
            .tuning
            .coworker(coworker.coworker_type)
            .action_cooldown_ms;
        coworker.cooldown_elapsed(self.now_ms, cooldown)
    }
}

pub fn create_coworker_from_config(
    id: u32,
    config: &CoworkerConfig,
    desks: &[Desk],
    now_ms: f64,
    lifespan_ms: f64,
    rng: &mut impl RandomSource,
) -> Coworker {
    let walkways = compute_walkway_lines(desks, (config.size / 2.0).ceil());
    let nodes: Vec<Vec2> = walkways.intersections().collect();
    let start = nodes
        .get(rng.index(nodes.len()))
        .copied()
        .unwrap_or(Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT / 2.0));
    let query = PatrolQuery {
        allow_diagonal: config.coworker_type != CoworkerType::Snitch,
        ..PatrolQuery::at(start)
    };
    let next = pick_next_target(&query, &walkways, rng);

    Coworker {
        id,
        coworker_type: config.coworker_type,
        position: start,
        speed: config.speed,
        size: config.size,
        color: config.color.clone(),
        patrol_route: [start, next],
        current_target: 1,
        walkways,
        last_point: None,
        last_axis: None,
        last_action_ms: None,
        despawn_at_ms: now_ms + lifespan_ms,
        rush: None,
        last_near_player_ms: None,
    }
}

/// Pick a fresh leg from wherever the coworker currently stands
fn reanchor(coworker: &mut Coworker, rng: &mut impl RandomSource) {
    let from = coworker.position;
    let query = PatrolQuery {
        allow_diagonal: coworker.coworker_type != CoworkerType::Snitch,
        ..PatrolQuery::at(from)
    };
    let next = pick_next_target(&query, &coworker.walkways, rng);
    coworker.patrol_route = [from, next];
    coworker.current_target = 1;
}

/// Advance one frame: rush target if any, else the patrol leg.
///
/// Desk collisions cancel the blocked axis only, so coworkers slide along
/// desk edges instead of stopping dead.
pub fn update_coworker(
    coworker: &mut Coworker,
    desks: &[Desk],
    rush_speed_factor: f32,
    rng: &mut impl RandomSource,
) {
    let rush_target = coworker.rush.map(|r| r.target);
    let target = rush_target.unwrap_or(coworker.target());
    let speed = if rush_target.is_some() {
        coworker.speed * rush_speed_factor
    } else {
        coworker.speed
    };

    let pos = coworker.position;
    let to_target = target - pos;
    let dist = to_target.length();

    if dist <= speed {
        if rush_target.is_some() {
            // Hold at the rush point; ignore a spot inside furniture
            if !check_entity_collision(target, coworker.size, desks) {
                coworker.position = target;
            }
            return;
        }
        arrive(coworker, target, rng);
        return;
    }

    let step = to_target / dist * speed;
    let half = coworker.size / 2.0;
    let mut next_x = (pos.x + step.x).clamp(half, CANVAS_WIDTH - half);
    let mut next_y = (pos.y + step.y).clamp(half, CANVAS_HEIGHT - half);

    if check_entity_collision(Vec2::new(next_x, pos.y), coworker.size, desks) {
        next_x = pos.x;
    }
    if check_entity_collision(Vec2::new(next_x, next_y), coworker.size, desks) {
        next_y = pos.y;
    }
    coworker.position = Vec2::new(next_x, next_y);

    // Wedged against a desk on a patrol leg: pick a leg that is known clear
    if coworker.position == pos && rush_target.is_none() {
        log::trace!("coworker {} stalled, re-anchoring", coworker.id);
        reanchor(coworker, rng);
    }
}

fn arrive(coworker: &mut Coworker, target: Vec2, rng: &mut impl RandomSource) {
    let came_from = coworker.patrol_route[0];
    let leg_axis = Axis::of(came_from, target);
    let is_snitch = coworker.coworker_type == CoworkerType::Snitch;
    coworker.position = target;

    let query = PatrolQuery {
        from: target,
        avoid: Some(came_from),
        last_axis: Some(leg_axis),
        bias_target: None,
        allow_diagonal: !is_snitch,
    };
    let mut next = pick_next_target(&query, &coworker.walkways, rng);
    if is_snitch {
        next = coerce_to_straight_target(target, next, &coworker.walkways.obstacles, rng);
    }
    coworker.patrol_route = [target, next];
    coworker.current_target = 1;
    coworker.last_point = Some(came_from);
    coworker.last_axis = Some(leg_axis);
}

/// Where a helpful coworker heads: just below the player
pub fn helpful_rush_target(player: &Player, tuning: &CoworkerSystemTuning) -> Vec2 {
    let raw = player.center() + Vec2::new(0.0, PLAYER_SIZE / 2.0 + tuning.rush_offset_y);
    Vec2::new(
        raw.x.clamp(0.0, CANVAS_WIDTH),
        raw.y.clamp(0.0, CANVAS_HEIGHT),
    )
}

pub fn start_helpful_rush(
    coworker: &mut Coworker,
    player: &Player,
    now_ms: f64,
    tuning: &CoworkerSystemTuning,
) {
    if coworker.coworker_type != CoworkerType::Helpful {
        return;
    }
    coworker.rush = Some(Rush {
        until_ms: now_ms + tuning.rush_duration_ms,
        target: helpful_rush_target(player, tuning),
        tracks_player: true,
    });
}

/// Re-aim a tracking rush at the player's current position
pub fn update_rush_target(coworker: &mut Coworker, player: &Player, tuning: &CoworkerSystemTuning) {
    if let Some(rush) = coworker.rush.as_mut()
        && rush.tracks_player
    {
        rush.target = helpful_rush_target(player, tuning);
    }
}

/// Drop a lapsed rush and resume patrolling from the current spot
pub fn clear_expired_rush(coworker: &mut Coworker, now_ms: f64, rng: &mut impl RandomSource) {
    if coworker.rush.is_some_and(|r| now_ms >= r.until_ms) {
        coworker.rush = None;
        reanchor(coworker, rng);
    }
}

/// While the player games, snitches occasionally drift toward them
pub fn maybe_bias_snitch_toward_player(
    coworker: &mut Coworker,
    player: &Player,
    mode: GameMode,
    now_ms: f64,
    tuning: &CoworkerSystemTuning,
    rng: &mut impl RandomSource,
) {
    if coworker.coworker_type != CoworkerType::Snitch
        || mode != GameMode::Gaming
        || coworker.is_rushing(now_ms)
    {
        return;
    }
    if distance(player.position, coworker.position) <= tuning.snitch_bias_skip_distance {
        return;
    }
    if !rng.chance(tuning.snitch_bias_chance_per_frame) {
        return;
    }
    let raw = coworker.walkways.nearest_intersection(player.center());
    let target =
        coerce_to_straight_target(coworker.position, raw, &coworker.walkways.obstacles, rng);
    log::trace!("snitch {} drifting toward the player", coworker.id);
    coworker.patrol_route = [coworker.position, target];
    coworker.current_target = 1;
}

/// Snitch proximity memory
pub fn record_player_proximity(
    coworker: &mut Coworker,
    player: &Player,
    now_ms: f64,
    tuning: &CoworkerSystemTuning,
) {
    if coworker.coworker_type == CoworkerType::Snitch
        && distance(player.position, coworker.position) <= tuning.snitch_memory_radius
    {
        coworker.last_near_player_ms = Some(now_ms);
    }
}

/// Would this helpful coworker warn the player now? Returns where to show it.
pub fn check_helpful_coworker_action(coworker: &Coworker, ctx: &ActionContext) -> Option<Vec2> {
    let boss = ctx.boss?;
    if coworker.coworker_type != CoworkerType::Helpful || ctx.mode != GameMode::Gaming {
        return None;
    }
    if !ctx.can_act(coworker) {
        return None;
    }
    let sys = &ctx.tuning.coworker_system;
    let player_to_boss = distance(ctx.player.position, boss.position);
    let coworker_to_player = distance(ctx.player.position, coworker.position);

    let close = player_to_boss <= sys.helpful_boss_proximity;
    let seen = player_to_boss <= sys.helpful_boss_los_range
        && has_line_of_sight(boss.position, ctx.player.position, ctx.desks);

    ((close || seen) && coworker_to_player <= sys.helpful_reach)
        .then(|| coworker.position - Vec2::new(0.0, 30.0))
}

/// Would this snitch call the boss on this check?
pub fn check_snitch_action(
    coworker: &Coworker,
    ctx: &ActionContext,
    rng: &mut impl RandomSource,
) -> bool {
    if coworker.coworker_type != CoworkerType::Snitch || ctx.mode != GameMode::Gaming {
        return false;
    }
    let intr = &ctx.tuning.interruptions;
    if ctx.boss.is_some() || ctx.suspicion >= intr.snitch_max_suspicion {
        return false;
    }
    let recently_near = coworker
        .last_near_player_ms
        .is_some_and(|t| ctx.now_ms - t <= ctx.tuning.coworker_system.snitch_memory_ms);

    ctx.can_act(coworker) && recently_near && rng.chance(intr.snitch_call_chance)
}

/// Start a conversation lock if this gossip decides to chat
pub fn check_gossip_interruption(
    coworker: &Coworker,
    ctx: &ActionContext,
    existing: Option<&ConversationState>,
    rng: &mut impl RandomSource,
) -> Option<ConversationState> {
    if coworker.coworker_type != CoworkerType::Gossip
        || ctx.mode != GameMode::Gaming
        || existing.is_some()
    {
        return None;
    }
    if !ctx.can_act(coworker) || !rng.chance(ctx.tuning.interruptions.gossip_chance) {
        return None;
    }
    Some(start_conversation(Some(coworker.id), ctx.now_ms, ctx.tuning, rng))
}

/// A conversation with a randomized length and opener
pub fn start_conversation(
    coworker_id: Option<u32>,
    now_ms: f64,
    tuning: &Tuning,
    rng: &mut impl RandomSource,
) -> ConversationState {
    let [min, max] = tuning.interruptions.conversation_ms;
    ConversationState {
        coworker_id,
        start_ms: now_ms,
        duration_ms: rng.range_ms(min, max),
        message: GOSSIP_LINES[rng.index(GOSSIP_LINES.len())].to_string(),
    }
}

/// Send a gossip to sit beside the player for `hold_ms`
pub fn set_gossip_approach_target(coworker: &mut Coworker, anchor: Vec2, now_ms: f64, hold_ms: f64) {
    let beside = anchor
        + Vec2::new(
            PLAYER_SIZE + coworker.size / 2.0 + 4.0,
            PLAYER_SIZE / 2.0 + 2.0,
        );
    let half = coworker.size / 2.0;
    coworker.rush = Some(Rush {
        until_ms: now_ms + hold_ms,
        target: Vec2::new(
            beside.x.clamp(half, CANVAS_WIDTH - half),
            beside.y.clamp(half, CANVAS_HEIGHT - half),
        ),
        tracks_player: false,
    });
}

/// Would this distraction coworker ask a question on this check?
pub fn check_distraction_question(
    coworker: &Coworker,
    ctx: &ActionContext,
    conversation_active: bool,
    rng: &mut impl RandomSource,
) -> bool {
    if coworker.coworker_type != CoworkerType::Distraction
        || ctx.mode != GameMode::Gaming
        || conversation_active
    {
        return false;
    }
    ctx.can_act(coworker) && rng.chance(ctx.tuning.interruptions.distraction_chance)
}

/// Weighted draw over coworker `spawn_probability`
pub fn pick_random_coworker_config(
    configs: &[CoworkerConfig],
    rng: &mut impl RandomSource,
) -> CoworkerType {
    let total: f32 = configs.iter().map(|c| c.spawn_probability).sum();
    let mut roll = rng.next_f32() * if total > 0.0 { total } else { 1.0 };
    for cfg in configs {
        if roll < cfg.spawn_probability {
            return cfg.coworker_type;
        }
        roll -= cfg.spawn_probability;
    }
    configs
        .first()
        .map_or(CoworkerType::Helpful, |c| c.coworker_type)
}

pub fn random_coworker_spawn_delay(
    tuning: &CoworkerSystemTuning,
    rng: &mut impl RandomSource,
) -> f64 {
    let [min, max] = tuning.spawn_delay_ms;
    rng.range_ms(min, max)
}

pub fn random_coworker_lifespan(tuning: &CoworkerSystemTuning, rng: &mut impl RandomSource) -> f64 {
    let [min, max] = tuning.despawn_duration_ms;
    rng.range_ms(min, max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::create_boss_from_config;
    use crate::sim::office::{create_office_layout, player_seat_anchor};
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::state::BossType;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn spawn(kind: CoworkerType, tuning: &Tuning, rng: &mut impl RandomSource) -> Coworker {
        let desks = create_office_layout();
        create_coworker_from_config(7, tuning.coworker(kind), &desks, 0.0, 60_000.0, rng)
    }

    fn seated_player() -> Player {
        let desks = create_office_layout();
        Player {
            position: player_seat_anchor(&desks[0]),
            speed: PLAYER_SPEED,
            is_sitting: true,
        }
    }

    #[test]
    fn test_patrol_never_overlaps_desks() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = Pcg32::seed_from_u64(21);
        for kind in CoworkerType::ALL {
            let mut c = spawn(kind, &tuning, &mut rng);
            for _ in 0..3000 {
                update_coworker(&mut c, &desks, 1.8, &mut rng);
                assert!(!check_entity_collision(c.position, c.size, &desks));
            }
        }
    }

    #[test]
    fn test_snitch_moves_axis_aligned_between_nodes() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = Pcg32::seed_from_u64(8);
        let mut c = spawn(CoworkerType::Snitch, &tuning, &mut rng);
        for _ in 0..3000 {
            update_coworker(&mut c, &desks, 1.8, &mut rng);
            assert_ne!(Axis::of(c.patrol_route[0], c.patrol_route[1]), Axis::Diagonal);
        }
    }

    #[test]
    fn test_rush_is_faster_and_expires() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = ScriptedRandom::constant(0.3);
        let mut c = spawn(CoworkerType::Helpful, &tuning, &mut rng);
        c.position = Vec2::new(520.0, 300.0);
        let player = seated_player();
        start_helpful_rush(&mut c, &player, 1000.0, &tuning.coworker_system);
        assert!(c.is_rushing(1500.0));

        let before = c.position;
        update_coworker(&mut c, &desks, tuning.coworker_system.rush_speed_factor, &mut rng);
        let moved = c.position.distance(before);
        assert!((moved - c.speed * 1.8).abs() < 1e-3);

        clear_expired_rush(&mut c, 2999.0, &mut rng);
        assert!(c.rush.is_some());
        clear_expired_rush(&mut c, 3000.0, &mut rng);
        assert!(c.rush.is_none());
    }

    #[test]
    fn test_rush_tracks_player() {
        let tuning = Tuning::default();
        let mut rng = ScriptedRandom::constant(0.3);
        let mut c = spawn(CoworkerType::Helpful, &tuning, &mut rng);
        let mut player = seated_player();
        start_helpful_rush(&mut c, &player, 0.0, &tuning.coworker_system);
        let first = c.rush.map(|r| r.target);
        player.position += Vec2::new(40.0, 0.0);
        update_rush_target(&mut c, &player, &tuning.coworker_system);
        let second = c.rush.map(|r| r.target);
        assert_ne!(first, second);
        assert_eq!(second.map(|t| t.x), Some(player.center().x));
    }

    #[test]
    fn test_helpful_warns_near_boss_only_when_gaming() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = ScriptedRandom::constant(0.3);
        let player = seated_player();
        let mut c = spawn(CoworkerType::Helpful, &tuning, &mut rng);
        c.position = player.position + Vec2::new(50.0, 40.0);
        let mut boss =
            create_boss_from_config(2, tuning.boss(BossType::Manager), &desks, &mut rng);
        boss.position = player.position + Vec2::new(150.0, 48.0);

        let mut ctx = ActionContext {
            player: &player,
            mode: GameMode::Gaming,
            boss: Some(&boss),
            desks: &desks,
            suspicion: 0.0,
            now_ms: 10_000.0,
            tuning: &tuning,
        };
        assert!(check_helpful_coworker_action(&c, &ctx).is_some());

        ctx.mode = GameMode::Work;
        assert!(check_helpful_coworker_action(&c, &ctx).is_none());

        ctx.mode = GameMode::Gaming;
        ctx.boss = None;
        assert!(check_helpful_coworker_action(&c, &ctx).is_none());

        ctx.boss = Some(&boss);
        c.last_action_ms = Some(9_000.0);
        assert!(check_helpful_coworker_action(&c, &ctx).is_none());
    }

    #[test]
    fn test_snitch_requires_recent_sighting() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = ScriptedRandom::constant(0.3);
        let player = seated_player();
        let mut c = spawn(CoworkerType::Snitch, &tuning, &mut rng);
        let ctx = ActionContext {
            player: &player,
            mode: GameMode::Gaming,
            boss: None,
            desks: &desks,
            suspicion: 0.0,
            now_ms: 20_000.0,
            tuning: &tuning,
        };
        let mut hit = ScriptedRandom::constant(0.0);
        assert!(!check_snitch_action(&c, &ctx, &mut hit));

        c.last_near_player_ms = Some(18_000.0);
        assert!(check_snitch_action(&c, &ctx, &mut hit));

        c.last_near_player_ms = Some(16_000.0);
        assert!(!check_snitch_action(&c, &ctx, &mut hit));

        c.last_near_player_ms = Some(19_000.0);
        let mut miss = ScriptedRandom::constant(0.5);
        assert!(!check_snitch_action(&c, &ctx, &mut miss));

        let suspicious = ActionContext {
            suspicion: 10.0,
            ..ctx
        };
        assert!(!check_snitch_action(&c, &suspicious, &mut hit));
    }

    #[test]
    fn test_proximity_memory() {
        let tuning = Tuning::default();
        let mut rng = ScriptedRandom::constant(0.3);
        let player = seated_player();
        let mut c = spawn(CoworkerType::Snitch, &tuning, &mut rng);
        c.position = player.position + Vec2::new(300.0, 0.0);
        record_player_proximity(&mut c, &player, 100.0, &tuning.coworker_system);
        assert_eq!(c.last_near_player_ms, None);
        c.position = player.position + Vec2::new(100.0, 0.0);
        record_player_proximity(&mut c, &player, 200.0, &tuning.coworker_system);
        assert_eq!(c.last_near_player_ms, Some(200.0));
    }

    #[test]
    fn test_gossip_starts_conversation() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = ScriptedRandom::constant(0.3);
        let player = seated_player();
        let c = spawn(CoworkerType::Gossip, &tuning, &mut rng);
        let ctx = ActionContext {
            player: &player,
            mode: GameMode::Gaming,
            boss: None,
            desks: &desks,
            suspicion: 0.0,
            now_ms: 5_000.0,
            tuning: &tuning,
        };
        let mut hit = ScriptedRandom::constant(0.1);
        let convo = check_gossip_interruption(&c, &ctx, None, &mut hit).expect("chats");
        assert_eq!(convo.coworker_id, Some(c.id));
        assert!((3000.0..=8000.0).contains(&convo.duration_ms));

        assert!(check_gossip_interruption(&c, &ctx, Some(&convo), &mut hit).is_none());
        let mut miss = ScriptedRandom::constant(0.2);
        assert!(check_gossip_interruption(&c, &ctx, None, &mut miss).is_none());
    }

    #[test]
    fn test_gossip_holds_beside_seat() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = Pcg32::seed_from_u64(4);
        let mut c = spawn(CoworkerType::Gossip, &tuning, &mut rng);
        c.position = Vec2::new(280.0, 300.0);
        let anchor = player_seat_anchor(&desks[0]);
        set_gossip_approach_target(&mut c, anchor, 0.0, 60_000.0);
        for _ in 0..200 {
            update_coworker(&mut c, &desks, 1.8, &mut rng);
        }
        let target = c.rush.map(|r| r.target).expect("holding");
        assert_eq!(c.position, target);
        assert!(!check_entity_collision(target, c.size, &desks));
    }

    #[test]
    fn test_distraction_roll() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let mut rng = ScriptedRandom::constant(0.3);
        let player = seated_player();
        let c = spawn(CoworkerType::Distraction, &tuning, &mut rng);
        let ctx = ActionContext {
            player: &player,
            mode: GameMode::Gaming,
            boss: None,
            desks: &desks,
            suspicion: 0.0,
            now_ms: 5_000.0,
            tuning: &tuning,
        };
        assert!(check_distraction_question(&c, &ctx, false, &mut ScriptedRandom::constant(0.05)));
        assert!(!check_distraction_question(&c, &ctx, true, &mut ScriptedRandom::constant(0.05)));
        assert!(!check_distraction_question(&c, &ctx, false, &mut ScriptedRandom::constant(0.5)));
    }

    #[test]
    fn test_weighted_coworker_pick() {
        let tuning = Tuning::default();
        let pick = |v| pick_random_coworker_config(&tuning.coworkers, &mut ScriptedRandom::constant(v));
        assert_eq!(pick(0.0), CoworkerType::Helpful);
        assert_eq!(pick(0.4), CoworkerType::Snitch);
        assert_eq!(pick(0.6), CoworkerType::Gossip);
        assert_eq!(pick(0.9), CoworkerType::Distraction);
    }
}
