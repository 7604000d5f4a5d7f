//! Scripted player for demos and headless runs
//!
//! Walks to the desk, sits, and games whenever the coast is clear. It reads
//! the state the same way a renderer would and only ever produces input.

use super::state::{GameMode, GameState, QuestionResponse};
use super::tick::TickInput;
use crate::consts::SEAT_ANCHOR_THRESHOLD;
use crate::distance;

/// Extra distance beyond a boss's detection radius that counts as too close
pub const DEFAULT_SAFETY_MARGIN: f32 = 60.0;
/// Switch to work once suspicion reaches this
pub const DEFAULT_SUSPICION_CEILING: f32 = 70.0;

#[derive(Debug, Clone)]
pub struct Autopilot {
    pub safety_margin: f32,
    pub suspicion_ceiling: f32,
    /// Ignore questions instead of answering them
    pub ignore_questions: bool,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            safety_margin: DEFAULT_SAFETY_MARGIN,
            suspicion_ceiling: DEFAULT_SUSPICION_CEILING,
            ignore_questions: false,
        }
    }
}

impl Autopilot {
    pub fn new() -> Self {
        Self::default()
    }

    /// Would gaming right now be reckless?
    pub fn in_danger(&self, state: &GameState) -> bool {
        if state.boss_warning.as_ref().is_some_and(|w| w.is_active) {
            return true;
        }
        if state.suspicion >= self.suspicion_ceiling {
            return true;
        }
        state.bosses.iter().any(|b| {
            distance(state.player.position, b.position) <= b.detection_radius + self.safety_margin
        })
    }

    /// Input for the next frame
    pub fn decide(&self, state: &GameState) -> TickInput {
        let mut input = TickInput::default();
        if state.is_game_over {
            return input;
        }
        let Some(anchor) = state.seat_anchor() else {
            return input;
        };

        if !state.player.is_sitting {
            let to_seat = anchor - state.player.position;
            if to_seat.length() <= SEAT_ANCHOR_THRESHOLD {
                input.interact = true;
                return input;
            }
            let step = state.player.speed / 2.0;
            input.left = to_seat.x < -step;
            input.right = to_seat.x > step;
            input.up = to_seat.y < -step;
            input.down = to_seat.y > step;
            return input;
        }

        if state.question.is_some() {
            input.respond = Some(if self.ignore_questions {
                QuestionResponse::Ignore
            } else {
                QuestionResponse::Answer
            });
        }

        let wanted = if self.in_danger(state) {
            GameMode::Work
        } else {
            GameMode::Gaming
        };
        input.toggle_mode = state.mode != wanted;
        input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::rng::ScriptedRandom;
    use crate::sim::tick::tick;
    use crate::tuning::Tuning;
    use glam::Vec2;

    #[test]
    fn test_walks_to_desk_and_sits() {
        let mut rng = ScriptedRandom::constant(0.99);
        let mut state = GameState::new(Tuning::default(), 0.0, &mut rng);
        state.bosses[0].speed = 0.0;
        state.bosses[0].position = Vec2::new(755.0, 515.0);
        let pilot = Autopilot::new();
        let mut now = 0.0;
        for _ in 0..400 {
            now += 16.0;
            let input = pilot.decide(&state);
            tick(&mut state, &input, now, &mut rng);
            if state.player.is_sitting {
                break;
            }
        }
        assert!(state.player.is_sitting);
        assert_eq!(Some(state.player.position), state.seat_anchor());
    }

    #[test]
    fn test_games_when_clear_and_works_when_boss_near() {
        let mut rng = ScriptedRandom::constant(0.99);
        let mut state = GameState::new(Tuning::default(), 0.0, &mut rng);
        state.player.position = state.seat_anchor().expect("desk");
        state.player.is_sitting = true;
        state.bosses[0].position = Vec2::new(755.0, 515.0);
        let pilot = Autopilot::new();
        assert!(pilot.decide(&state).toggle_mode);

        state.mode = GameMode::Gaming;
        assert!(!pilot.decide(&state).toggle_mode);

        state.bosses[0].position = state.player.position + Vec2::new(120.0, 0.0);
        assert!(pilot.in_danger(&state));
        assert!(pilot.decide(&state).toggle_mode);
    }

    #[test]
    fn test_answers_questions() {
        let mut rng = ScriptedRandom::constant(0.99);
        let mut state = GameState::new(Tuning::default(), 0.0, &mut rng);
        state.player.position = state.seat_anchor().expect("desk");
        state.player.is_sitting = true;
        state.question = Some(crate::sim::state::WorkQuestion {
            coworker_id: None,
            text: "?".into(),
            position: Vec2::ZERO,
            remaining_ms: 1000.0,
            timeout_ms: 8000.0,
        });
        let input = Autopilot::new().decide(&state);
        assert_eq!(input.respond, Some(QuestionResponse::Answer));
    }
}
