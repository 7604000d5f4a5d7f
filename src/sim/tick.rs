//! Per-frame state transition
//!
//! `tick` runs the ordered phases of one frame against a single `now_ms`
//! supplied by the driver. It never fails; missing desks, bosses or
//! coworkers simply disable the dependent phase.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::boss::{is_player_detected, update_boss};
use super::collision::check_collision;
use super::interrupts::{
    auto_resolve, check_boss_shouts, enforce_fairness, respond_to_question, run_distraction_checks,
    run_gossip_checks, run_helpful_checks, run_snitch_checks, tick_transients,
};
use super::office::is_near_seat_anchor;
use super::rng::RandomSource;
use super::scoring::{apply_score, end_game, update_suspicion};
use super::spawner::{schedule_bosses, update_boss_warning, update_coworkers};
use super::state::{GameEvent, GameMode, GameOverReason, GameState, QuestionResponse};
use crate::clamp_to_canvas;
use crate::consts::*;

/// Input for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickInput {
    pub up: bool,
    pub down: bool,
    pub left: bool,
    pub right: bool,
    /// Sit down (one-shot)
    pub interact: bool,
    /// Rising edge of the mode key; the driver does the edge detection
    pub toggle_mode: bool,
    /// Reply to a pending question
    pub respond: Option<QuestionResponse>,
}

impl TickInput {
    pub fn has_movement(&self) -> bool {
        self.up || self.down || self.left || self.right
    }
}

/// Milliseconds since the previous frame (never negative)
pub fn frame_delta_ms(state: &GameState, now_ms: f64) -> f64 {
    state
        .last_update_ms
        .map_or(DEFAULT_FRAME_MS, |last| (now_ms - last).max(0.0))
}

/// Advance the game by one frame
pub fn tick(
    state: &mut GameState,
    input: &TickInput,
    now_ms: f64,
    rng: &mut impl RandomSource,
) {
    state.events.clear();
    let dt_ms = frame_delta_ms(state, now_ms);

    if state.is_game_over {
        state.last_update_ms = Some(now_ms);
        return;
    }

    // Player
    apply_movement(state, input, now_ms);
    apply_sitting(state, input);
    apply_mode_toggle(state, input, now_ms);
    if let Some(response) = input.respond {
        respond_to_question(state, response, now_ms);
    }

    // Boss patrol and detection
    steer_bosses(state);
    for boss in state.bosses.iter_mut() {
        update_boss(boss, rng);
    }
    check_detection(state);

    apply_score(state, dt_ms, now_ms);
    let snitch_arrival = schedule_bosses(state, now_ms, rng);
    update_boss_warning(state, now_ms, rng);
    update_suspicion(state, dt_ms, snitch_arrival);

    if state.is_game_over {
        state.last_update_ms = Some(now_ms);
        return;
    }

    update_coworkers(state, now_ms, rng);

    run_helpful_checks(state, now_ms);
    run_snitch_checks(state, now_ms, rng);
    run_gossip_checks(state, now_ms, rng);
    run_distraction_checks(state, now_ms, rng);
    check_boss_shouts(state, now_ms);

    enforce_fairness(state, dt_ms, now_ms, rng);

    auto_resolve(state, dt_ms, now_ms);
    tick_transients(state, dt_ms);

    state.last_update_ms = Some(now_ms);
}

/// Walk, or stand up if seated and any direction is held
pub fn apply_movement(state: &mut GameState, input: &TickInput, now_ms: f64) {
    if state.player.is_sitting {
        if !input.has_movement() {
            return;
        }
        state.player.is_sitting = false;
        state.push_event(GameEvent::StoodUp);
        // The game lives on the desk PC, but an interruption still pins the mode
        if state.mode == GameMode::Gaming && !state.mode_switch_locked(now_ms) {
            state.mode = GameMode::Work;
            state.push_event(GameEvent::ModeChanged {
                mode: GameMode::Work,
            });
        }
    }

    let player = &mut state.player;
    let mut delta = Vec2::ZERO;
    if input.up {
        delta.y -= player.speed;
    }
    if input.down {
        delta.y += player.speed;
    }
    if input.left {
        delta.x -= player.speed;
    }
    if input.right {
        delta.x += player.speed;
    }

    let pos = player.position;
    let mut next = clamp_to_canvas(pos + delta, PLAYER_SIZE);
    // Resolve each axis on its own so the player slides along desk edges
    if check_collision(Vec2::new(next.x, pos.y), &state.desks) {
        next.x = pos.x;
    }
    if check_collision(next, &state.desks) {
        next.y = pos.y;
    }
    player.position = next;
}

/// Sit down at the seat anchor; sitting always resumes in work mode
pub fn apply_sitting(state: &mut GameState, input: &TickInput) {
    let Some(anchor) = state.seat_anchor() else {
        return;
    };
    if state.player.is_sitting {
        state.player.position = anchor;
        return;
    }
    if !input.interact || !is_near_seat_anchor(state.player.position, anchor, SEAT_ANCHOR_THRESHOLD)
    {
        return;
    }

    state.player.position = anchor;
    state.player.is_sitting = true;
    state.push_event(GameEvent::SatDown);
    if state.mode != GameMode::Work {
        state.mode = GameMode::Work;
        state.push_event(GameEvent::ModeChanged {
            mode: GameMode::Work,
        });
    }
}

/// Flip work/gaming; the toggle is swallowed when standing or interrupted
pub fn apply_mode_toggle(state: &mut GameState, input: &TickInput, now_ms: f64) {
    if !input.toggle_mode {
        return;
    }
    if !state.player.is_sitting || state.mode_switch_locked(now_ms) {
        log::trace!("Mode toggle ignored");
        return;
    }
    state.mode = state.mode.toggled();
    state.push_event(GameEvent::ModeChanged { mode: state.mode });
    log::debug!("Mode -> {:?}", state.mode);
}

/// A suspicious boss drifts toward the player's desk
fn steer_bosses(state: &mut GameState) {
    let threshold = state.tuning.boss_schedule.bias_suspicion_threshold;
    let bias = if state.mode == GameMode::Gaming && state.suspicion >= threshold {
        state.seat_anchor()
    } else {
        None
    };
    for boss in state.bosses.iter_mut() {
        boss.set_bias_target(bias);
    }
}

fn check_detection(state: &mut GameState) {
    let spotted = state
        .bosses
        .iter()
        .find(|b| is_player_detected(&state.player, b, state.mode))
        .map(|b| b.boss_type);
    if let Some(boss_type) = spotted {
        log::info!(
            "Caught gaming by the {} (score {:.0})",
            boss_type.label(),
            state.score
        );
        end_game(state, GameOverReason::Detected);
    }
}
