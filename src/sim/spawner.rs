//! Boss slot and coworker population scheduling
//!
//! Both schedulers are deadline comparisons against the frame time; nothing
//! here sleeps or keeps a timer of its own.

use super::boss::{
    SNITCH_ARRIVAL_SHOUT, create_boss_from_config, random_despawn_duration, random_spawn_delay,
    select_random_boss_type,
};
use super::coworker::{
    clear_expired_rush, create_coworker_from_config, maybe_bias_snitch_toward_player,
    pick_random_coworker_config, random_coworker_lifespan, random_coworker_spawn_delay,
    record_player_proximity, update_coworker, update_rush_target,
};
use super::rng::RandomSource;
use super::state::{BossShout, BossWarning, CoworkerType, GameEvent, GameState};

/// Delay before the next boss, shortened when a snitch has called one in
fn next_boss_delay(state: &GameState, rng: &mut impl RandomSource) -> f64 {
    let sched = &state.tuning.boss_schedule;
    let delay = random_spawn_delay(state.tuning.boss(sched.baseline_type), rng);
    if state.schedule.snitch_call_pending {
        delay * sched.snitch_spawn_delay_factor
    } else {
        delay
    }
}

/// Run the single boss slot: spawn, schedule, despawn.
///
/// Returns true when a snitch-called boss arrived this frame.
pub fn schedule_bosses(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) -> bool {
    let mut snitch_arrival = false;

    if state.bosses.is_empty()
        && state
            .schedule
            .next_boss_spawn_ms
            .is_some_and(|t| now_ms >= t)
    {
        snitch_arrival = spawn_boss(state, now_ms, rng);
    }

    if state.bosses.is_empty() && state.schedule.next_boss_spawn_ms.is_none() {
        let delay = next_boss_delay(state, rng);
        state.schedule.next_boss_spawn_ms = Some(now_ms + delay);
        log::debug!("Next boss in {:.1}s", delay / 1000.0);
    }

    let expired = state
        .schedule
        .active_boss_despawn_ms
        .is_some_and(|t| now_ms >= t);
    if expired && let Some(boss) = state.bosses.first() {
        let leaving = boss.boss_type;
        state.bosses.clear();
        state.schedule.active_boss_despawn_ms = None;
        state.push_event(GameEvent::BossDespawned {
            boss_type: leaving,
        });

        let delay = next_boss_delay(state, rng);
        state.schedule.next_boss_spawn_ms = Some(now_ms + delay);
        let upcoming = select_random_boss_type(&state.tuning.bosses, Some(leaving), rng);
        state.schedule.upcoming_boss_type = Some(upcoming);
        log::info!(
            "{} left the floor; {} expected in {:.1}s",
            leaving.label(),
            upcoming.label(),
            delay / 1000.0
        );
    }

    snitch_arrival
}

fn spawn_boss(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) -> bool {
    let boss_type = match state.schedule.upcoming_boss_type.take() {
        Some(t) => t,
        None => select_random_boss_type(&state.tuning.bosses, None, rng),
    };
    let config = state.tuning.boss(boss_type).clone();
    let id = state.next_entity_id();
    let mut boss = create_boss_from_config(id, &config, &state.desks, rng);

    let snitch_called = std::mem::take(&mut state.schedule.snitch_call_pending);
    boss.snitch_called = snitch_called;
    if snitch_called {
        boss.last_shout_ms = Some(now_ms);
        state.boss_shouts.push(BossShout {
            boss_id: id,
            message: SNITCH_ARRIVAL_SHOUT.to_string(),
            position: boss.position,
            remaining_ms: state.tuning.boss_schedule.shout_display_ms,
        });
        state.push_event(GameEvent::BossShouted { boss_id: id });
    }

    let stay = random_despawn_duration(&config, &state.tuning.boss_schedule, rng);
    state.schedule.active_boss_despawn_ms = Some(now_ms + stay);
    state.schedule.next_boss_spawn_ms = None;
    state.boss_warning = None;
    state.bosses.push(boss);
    state.push_event(GameEvent::BossSpawned {
        boss_type,
        snitch_called,
    });
    log::info!(
        "{} arrived{} for {:.1}s",
        boss_type.label(),
        if snitch_called { " (snitch call)" } else { "" },
        stay / 1000.0
    );
    snitch_called
}

/// Flag the next boss as snitch-called and pull its arrival forward
pub fn accelerate_boss_spawn(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) {
    state.schedule.snitch_call_pending = true;
    if !state.bosses.is_empty() {
        // Applied when the current boss leaves
        return;
    }
    let soon = now_ms + next_boss_delay(state, rng);
    let next = state
        .schedule
        .next_boss_spawn_ms
        .map_or(soon, |t| t.min(soon));
    state.schedule.next_boss_spawn_ms = Some(next);
    log::debug!("Boss spawn pulled forward to {:.0}ms", next);
}

/// Expose the pre-spawn warning during the final window before arrival
pub fn update_boss_warning(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) {
    let Some(spawn_at) = state.schedule.next_boss_spawn_ms else {
        state.boss_warning = None;
        return;
    };
    if !state.bosses.is_empty() {
        state.boss_warning = None;
        return;
    }

    let remaining = (spawn_at - now_ms).max(0.0);
    let window_type = state
        .schedule
        .upcoming_boss_type
        .unwrap_or(state.tuning.boss_schedule.baseline_type);
    if remaining > state.tuning.boss(window_type).warning_time_ms {
        state.boss_warning = None;
        return;
    }

    let boss_type = match state.schedule.upcoming_boss_type {
        Some(t) => t,
        None => {
            let t = select_random_boss_type(&state.tuning.bosses, None, rng);
            state.schedule.upcoming_boss_type = Some(t);
            t
        }
    };
    state.boss_warning = Some(BossWarning {
        boss_type,
        remaining_ms: remaining,
        total_warning_ms: state.tuning.boss(boss_type).warning_time_ms,
        is_active: true,
    });
}

pub fn boss_warning_active(state: &GameState) -> bool {
    state.boss_warning.as_ref().is_some_and(|w| w.is_active)
}

/// Next type to hire: one Snitch and one Helpful first, then any missing
/// Gossip/Distraction, then a weighted draw
fn pick_diverse_type(state: &GameState, rng: &mut impl RandomSource) -> CoworkerType {
    if !state.has_coworker(CoworkerType::Snitch) {
        return CoworkerType::Snitch;
    }
    if !state.has_coworker(CoworkerType::Helpful) {
        return CoworkerType::Helpful;
    }
    let missing: Vec<CoworkerType> = [CoworkerType::Gossip, CoworkerType::Distraction]
        .into_iter()
        .filter(|&t| !state.has_coworker(t))
        .collect();
    if !missing.is_empty() {
        return missing[rng.index(missing.len())];
    }
    pick_random_coworker_config(&state.tuning.coworkers, rng)
}

/// Move, retire and hire coworkers for this frame
pub fn update_coworkers(state: &mut GameState, now_ms: f64, rng: &mut impl RandomSource) {
    let sys = &state.tuning.coworker_system;
    for c in state.coworkers.iter_mut() {
        clear_expired_rush(c, now_ms, rng);
        update_rush_target(c, &state.player, sys);
        maybe_bias_snitch_toward_player(c, &state.player, state.mode, now_ms, sys, rng);
        record_player_proximity(c, &state.player, now_ms, sys);
        update_coworker(c, &state.desks, sys.rush_speed_factor, rng);
    }

    let (leaving, staying): (Vec<_>, Vec<_>) = std::mem::take(&mut state.coworkers)
        .into_iter()
        .partition(|c| now_ms >= c.despawn_at_ms);
    state.coworkers = staying;
    for c in leaving {
        log::debug!("Coworker {} ({:?}) went home", c.id, c.coworker_type);
        state.push_event(GameEvent::CoworkerLeft {
            coworker_type: c.coworker_type,
        });
    }

    let max = state.tuning.coworker_system.max_coworkers;
    state.coworkers.truncate(max);

    let due = match state.schedule.next_coworker_spawn_ms {
        Some(t) => now_ms >= t,
        None => true,
    };
    if !due {
        return;
    }

    if state.coworkers.len() < max {
        let kind = pick_diverse_type(state, rng);
        let config = state.tuning.coworker(kind).clone();
        let lifespan = random_coworker_lifespan(&state.tuning.coworker_system, rng);
        let id = state.next_entity_id();
        let coworker =
            create_coworker_from_config(id, &config, &state.desks, now_ms, lifespan, rng);
        state.coworkers.push(coworker);
        state.push_event(GameEvent::CoworkerSpawned {
            coworker_type: kind,
        });
        log::debug!("Coworker {id} ({kind:?}) joined for {:.0}s", lifespan / 1000.0);
    }

    let sys = &state.tuning.coworker_system;
    let delay = if state.coworkers.len() < max {
        sys.chain_spawn_ms
    } else {
        random_coworker_spawn_delay(sys, rng)
    };
    state.schedule.next_coworker_spawn_ms = Some(now_ms + delay);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::state::BossType;
    use crate::tuning::Tuning;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn fresh(rng: &mut impl RandomSource) -> GameState {
        GameState::new(Tuning::default(), 0.0, rng)
    }

    #[test]
    fn test_despawn_schedules_next_with_excluded_type() {
        let mut rng = ScriptedRandom::constant(0.0);
        let mut state = fresh(&mut rng);
        state.schedule.active_boss_despawn_ms = Some(1000.0);
        let arrived = schedule_bosses(&mut state, 1000.0, &mut rng);
        assert!(!arrived);
        assert!(state.bosses.is_empty());
        assert_eq!(state.schedule.upcoming_boss_type, Some(BossType::Director));
        let next = state.schedule.next_boss_spawn_ms.expect("scheduled");
        assert!((9000.0..=16000.0).contains(&next));
        assert!(state
            .events
            .contains(&GameEvent::BossDespawned { boss_type: BossType::Manager }));
    }

    #[test]
    fn test_spawn_uses_preselected_type() {
        let mut rng = ScriptedRandom::constant(0.0);
        let mut state = fresh(&mut rng);
        state.bosses.clear();
        state.schedule.next_boss_spawn_ms = Some(500.0);
        state.schedule.upcoming_boss_type = Some(BossType::Ceo);
        schedule_bosses(&mut state, 499.0, &mut rng);
        assert!(state.bosses.is_empty());
        schedule_bosses(&mut state, 500.0, &mut rng);
        assert_eq!(state.bosses.len(), 1);
        assert_eq!(state.bosses[0].boss_type, BossType::Ceo);
        assert_eq!(state.schedule.next_boss_spawn_ms, None);
        assert!(state.schedule.active_boss_despawn_ms.is_some());
        assert_eq!(state.schedule.upcoming_boss_type, None);
    }

    #[test]
    fn test_empty_slot_gets_a_timer() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = fresh(&mut rng);
        state.bosses.clear();
        state.schedule.active_boss_despawn_ms = None;
        schedule_bosses(&mut state, 2000.0, &mut rng);
        assert_eq!(state.schedule.next_boss_spawn_ms, Some(2000.0 + 11500.0));
    }

    #[test]
    fn test_snitch_call_accelerates_and_spikes() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = fresh(&mut rng);
        state.bosses.clear();
        state.schedule.next_boss_spawn_ms = Some(60_000.0);
        accelerate_boss_spawn(&mut state, 1000.0, &mut rng);
        // Manager window midpoint 11.5s at a quarter
        assert_eq!(state.schedule.next_boss_spawn_ms, Some(1000.0 + 2875.0));
        assert!(state.schedule.snitch_call_pending);

        let arrived = schedule_bosses(&mut state, 3875.0, &mut rng);
        assert!(arrived);
        assert!(state.bosses[0].snitch_called);
        assert!(!state.schedule.snitch_call_pending);
        assert_eq!(state.boss_shouts.len(), 1);
    }

    #[test]
    fn test_acceleration_keeps_an_earlier_spawn() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = fresh(&mut rng);
        state.bosses.clear();
        state.schedule.next_boss_spawn_ms = Some(1500.0);
        accelerate_boss_spawn(&mut state, 1000.0, &mut rng);
        assert_eq!(state.schedule.next_boss_spawn_ms, Some(1500.0));
    }

    #[test]
    fn test_warning_only_in_final_window() {
        let mut rng = ScriptedRandom::constant(0.0);
        let mut state = fresh(&mut rng);
        state.bosses.clear();
        state.schedule.next_boss_spawn_ms = Some(10_000.0);
        update_boss_warning(&mut state, 8_000.0, &mut rng);
        assert!(state.boss_warning.is_none());

        update_boss_warning(&mut state, 9_200.0, &mut rng);
        let warning = state.boss_warning.clone().expect("warning");
        assert!(warning.is_active);
        assert_eq!(warning.boss_type, BossType::Manager);
        assert!((warning.remaining_ms - 800.0).abs() < 1e-9);
        assert_eq!(state.schedule.upcoming_boss_type, Some(BossType::Manager));

        // Spawning clears it
        schedule_bosses(&mut state, 10_000.0, &mut rng);
        assert!(state.boss_warning.is_none());
        update_boss_warning(&mut state, 10_000.0, &mut rng);
        assert!(state.boss_warning.is_none());
    }

    #[test]
    fn test_coworker_population_is_diverse_and_capped() {
        let mut rng = Pcg32::seed_from_u64(12);
        let mut state = fresh(&mut rng);
        let mut now = 0.0;
        while now < 10_000.0 {
            update_coworkers(&mut state, now, &mut rng);
            now += 16.0;
        }
        assert_eq!(state.coworkers.len(), 4);
        assert!(state.has_coworker(CoworkerType::Snitch));
        assert!(state.has_coworker(CoworkerType::Helpful));
        assert!(state.has_coworker(CoworkerType::Gossip));
        assert!(state.has_coworker(CoworkerType::Distraction));
    }

    #[test]
    fn test_coworkers_leave_at_deadline() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = fresh(&mut rng);
        state.schedule.next_coworker_spawn_ms = Some(0.0);
        update_coworkers(&mut state, 0.0, &mut rng);
        assert_eq!(state.coworkers.len(), 1);
        let deadline = state.coworkers[0].despawn_at_ms;
        state.schedule.next_coworker_spawn_ms = Some(f64::MAX);
        update_coworkers(&mut state, deadline, &mut rng);
        assert!(state.coworkers.is_empty());
        assert!(state.events.contains(&GameEvent::CoworkerLeft {
            coworker_type: CoworkerType::Snitch
        }));
    }
}
