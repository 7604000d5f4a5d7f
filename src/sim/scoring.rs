//! Score and suspicion meters

use super::collision::has_line_of_sight;
use super::state::{
    Boss, Desk, GameEvent, GameMode, GameOverReason, GameState, MultiplierBreakdown, Player,
    RiskLevel,
};
use crate::distance;
use crate::tuning::Tuning;

/// Risk-weighted score multiplier.
///
/// Base grows by 1x per `suspicion_per_step` points (capped); risk depends
/// on whether the boss can see the player and how close it is.
pub fn calculate_dynamic_multiplier(
    suspicion: f32,
    boss: Option<&Boss>,
    player: &Player,
    mode: GameMode,
    desks: &[Desk],
    tuning: &Tuning,
) -> MultiplierBreakdown {
    let Some(boss) = boss else {
        return MultiplierBreakdown::default();
    };
    if mode != GameMode::Gaming {
        return MultiplierBreakdown::default();
    }

    let sc = &tuning.scoring;
    let base_multiplier =
        ((suspicion / sc.suspicion_per_step).floor() + 1.0).clamp(1.0, sc.max_base_multiplier);

    let dist = distance(player.position, boss.position);
    let los = has_line_of_sight(boss.position, player.position, desks);
    let (risk_multiplier, risk_level) = if los && dist <= tuning.suspicion.danger_zone_distance {
        (sc.extreme_risk, RiskLevel::ExtremeDanger)
    } else if los {
        (sc.visible_risk, RiskLevel::Visible)
    } else if dist <= sc.hidden_close_distance {
        (sc.hidden_close_risk, RiskLevel::Hidden)
    } else {
        (1.0, RiskLevel::Safe)
    };

    MultiplierBreakdown {
        total_multiplier: base_multiplier * risk_multiplier,
        base_multiplier,
        risk_multiplier,
        risk_level,
    }
}

/// Refresh the cached multiplier and accrue score for this frame
pub fn apply_score(state: &mut GameState, dt_ms: f64, now_ms: f64) {
    state.multiplier = calculate_dynamic_multiplier(
        state.suspicion,
        state.active_boss(),
        &state.player,
        state.mode,
        &state.desks,
        &state.tuning,
    );

    if state.is_game_over || state.mode != GameMode::Gaming || state.conversation.is_some() {
        return;
    }
    // Frozen while a question is pending or being answered
    if state.question.is_some() || state.answer_lock_active(now_ms) {
        return;
    }

    let seconds = dt_ms / 1000.0;
    let gained = match state.active_boss() {
        Some(boss) => {
            boss.base_points_per_second * state.multiplier.total_multiplier as f64 * seconds
        }
        None => state.tuning.easy_points_per_second() * seconds,
    };
    state.score = (state.score + gained).max(0.0);
}

/// Move the suspicion meter; reaching the cap ends the game.
///
/// `snitch_arrival` floors the meter at the snitch spike when a
/// snitch-called boss has just walked in.
pub fn update_suspicion(state: &mut GameState, dt_ms: f64, snitch_arrival: bool) {
    let t = &state.tuning.suspicion;
    let seconds = (dt_ms / 1000.0) as f32;
    let mut suspicion = state.suspicion;

    match state.active_boss() {
        None => suspicion -= t.no_boss_recovery_rate * seconds,
        Some(_) if state.mode == GameMode::Work => {
            suspicion -= t.working_recovery_rate * seconds;
        }
        Some(boss) => {
            let player = &state.player;
            if has_line_of_sight(boss.position, player.position, &state.desks) {
                let mut rate = t.gaming_heat_rate * t.line_of_sight_multiplier;
                if distance(player.position, boss.position) <= t.danger_zone_distance {
                    rate *= t.danger_zone_multiplier;
                }
                suspicion += rate * seconds;
            } else {
                suspicion -= t.hidden_recovery_rate * seconds;
            }
        }
    }

    if snitch_arrival {
        suspicion = suspicion.max(t.snitch_spike);
    }
    state.suspicion = suspicion.clamp(0.0, t.max_suspicion);

    if state.suspicion >= t.max_suspicion && !state.is_game_over {
        log::info!("Suspicion maxed out, game over (score {:.0})", state.score);
        end_game(state, GameOverReason::MaxSuspicion);
    }
}

/// Shift the meter by a one-off amount (question answers, penalties)
pub fn nudge_suspicion(state: &mut GameState, delta: f32) {
    let max = state.tuning.suspicion.max_suspicion;
    state.suspicion = (state.suspicion + delta).clamp(0.0, max);
}

/// Sticky terminal state
pub fn end_game(state: &mut GameState, reason: GameOverReason) {
    if state.is_game_over {
        return;
    }
    state.is_game_over = true;
    state.game_over_reason = Some(reason);
    state.push_event(GameEvent::GameOver { reason });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::boss::create_boss_from_config;
    use crate::sim::office::create_office_layout;
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::state::BossType;
    use glam::Vec2;

    fn boss_at(pos: Vec2, tuning: &Tuning) -> Boss {
        let desks = create_office_layout();
        let mut rng = ScriptedRandom::constant(0.0);
        let mut boss =
            create_boss_from_config(1, tuning.boss(BossType::Manager), &desks, &mut rng);
        boss.position = pos;
        boss
    }

    fn player_at(pos: Vec2) -> Player {
        Player {
            position: pos,
            speed: 2.0,
            is_sitting: true,
        }
    }

    fn gaming_state(rng: &mut ScriptedRandom) -> GameState {
        let mut state = GameState::new(Tuning::default(), 0.0, rng);
        state.player = player_at(Vec2::new(150.0, 252.0));
        state.mode = GameMode::Gaming;
        state
    }

    #[test]
    fn test_multiplier_extreme_danger() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        // Open corridor above the desks
        let player = player_at(Vec2::new(300.0, 85.0));
        let boss = boss_at(Vec2::new(350.0, 85.0), &tuning);
        let m = calculate_dynamic_multiplier(
            35.0,
            Some(&boss),
            &player,
            GameMode::Gaming,
            &desks,
            &tuning,
        );
        assert_eq!(m.base_multiplier, 4.0);
        assert_eq!(m.risk_multiplier, 3.0);
        assert_eq!(m.total_multiplier, 12.0);
        assert_eq!(m.risk_level, RiskLevel::ExtremeDanger);
    }

    #[test]
    fn test_multiplier_risk_bands() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let player = player_at(Vec2::new(45.0, 85.0));

        let far_visible = boss_at(Vec2::new(400.0, 85.0), &tuning);
        let m = calculate_dynamic_multiplier(0.0, Some(&far_visible), &player, GameMode::Gaming, &desks, &tuning);
        assert_eq!(m.risk_level, RiskLevel::Visible);
        assert_eq!(m.total_multiplier, 2.0);

        // Desk 0-0 sits between these two points
        let behind = player_at(Vec2::new(150.0, 140.0));
        let hidden_close = boss_at(Vec2::new(150.0, 258.0), &tuning);
        let m = calculate_dynamic_multiplier(0.0, Some(&hidden_close), &behind, GameMode::Gaming, &desks, &tuning);
        assert_eq!(m.risk_level, RiskLevel::Hidden);
        assert_eq!(m.risk_multiplier, 1.5);

        let hidden_far = boss_at(Vec2::new(160.0, 515.0), &tuning);
        let m = calculate_dynamic_multiplier(0.0, Some(&hidden_far), &behind, GameMode::Gaming, &desks, &tuning);
        assert_eq!(m.risk_level, RiskLevel::Safe);
    }

    #[test]
    fn test_multiplier_neutral_without_boss_or_gaming() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let player = player_at(Vec2::new(300.0, 85.0));
        let boss = boss_at(Vec2::new(350.0, 85.0), &tuning);
        let neutral = MultiplierBreakdown::default();
        assert_eq!(
            calculate_dynamic_multiplier(80.0, None, &player, GameMode::Gaming, &desks, &tuning),
            neutral
        );
        assert_eq!(
            calculate_dynamic_multiplier(80.0, Some(&boss), &player, GameMode::Work, &desks, &tuning),
            neutral
        );
    }

    #[test]
    fn test_base_multiplier_caps_at_ten() {
        let tuning = Tuning::default();
        let desks = create_office_layout();
        let player = player_at(Vec2::new(300.0, 85.0));
        let boss = boss_at(Vec2::new(700.0, 85.0), &tuning);
        let m = calculate_dynamic_multiplier(100.0, Some(&boss), &player, GameMode::Gaming, &desks, &tuning);
        assert_eq!(m.base_multiplier, 10.0);
    }

    #[test]
    fn test_easy_period_scoring() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = gaming_state(&mut rng);
        state.bosses.clear();
        apply_score(&mut state, 1000.0, 1000.0);
        assert!((state.score - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_boss_scoring_uses_multiplier() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = gaming_state(&mut rng);
        state.bosses[0].position = Vec2::new(45.0, 515.0);
        apply_score(&mut state, 500.0, 500.0);
        let expected = 20.0 * state.multiplier.total_multiplier as f64 * 0.5;
        assert!((state.score - expected).abs() < 1e-6);
        assert!(state.score > 0.0);
    }

    #[test]
    fn test_score_frozen_by_locks() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = gaming_state(&mut rng);
        state.bosses.clear();
        state.schedule.answer_lock_until_ms = Some(2000.0);
        apply_score(&mut state, 1000.0, 1000.0);
        assert_eq!(state.score, 0.0);

        state.schedule.answer_lock_until_ms = None;
        state.mode = GameMode::Work;
        apply_score(&mut state, 1000.0, 1000.0);
        assert_eq!(state.score, 0.0);
    }

    #[test]
    fn test_suspicion_recovers_and_clamps_at_zero() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = gaming_state(&mut rng);
        state.mode = GameMode::Work;
        state.suspicion = 3.0;
        update_suspicion(&mut state, 1000.0, false);
        assert_eq!(state.suspicion, 0.0);
    }

    #[test]
    fn test_suspicion_heats_under_line_of_sight() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = gaming_state(&mut rng);
        state.player.position = Vec2::new(45.0, 85.0);
        state.bosses[0].position = Vec2::new(145.0, 85.0);
        update_suspicion(&mut state, 1000.0, false);
        // 4 * 2.5 * 2 per second inside the danger zone
        assert!((state.suspicion - 20.0).abs() < 1e-4);
    }

    #[test]
    fn test_snitch_spike_and_max_game_over() {
        let mut rng = ScriptedRandom::constant(0.5);
        let mut state = gaming_state(&mut rng);
        state.bosses[0].position = Vec2::new(755.0, 515.0);
        update_suspicion(&mut state, 16.0, true);
        assert!(state.suspicion >= 30.0);

        state.suspicion = 99.9;
        state.player.position = Vec2::new(45.0, 85.0);
        state.bosses[0].position = Vec2::new(145.0, 85.0);
        update_suspicion(&mut state, 1000.0, false);
        assert_eq!(state.suspicion, 100.0);
        assert!(state.is_game_over);
        assert_eq!(state.game_over_reason, Some(GameOverReason::MaxSuspicion));
    }
}
