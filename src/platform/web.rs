//! Browser export
//!
//! JavaScript owns the canvas and the animation loop; each frame it calls
//! `update` with the raw key states and draws from `snapshot_json`.

use rand::SeedableRng;
use rand_pcg::Pcg32;
use wasm_bindgen::prelude::*;

use super::{FrameClock, ToggleEdge};
use crate::sim::{Autopilot, GameState, QuestionResponse, TickInput, tick};
use crate::tuning::Tuning;

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    // A second init (hot reload) keeps the existing logger
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("Office Gamer core loaded");
}

/// One live session
#[wasm_bindgen]
pub struct WebGame {
    state: GameState,
    rng: Pcg32,
    clock: FrameClock,
    toggle: ToggleEdge,
    autopilot: Option<Autopilot>,
}

#[wasm_bindgen]
impl WebGame {
    /// Start a session at `now_ms`, optionally with a JSON balance override
    #[wasm_bindgen(constructor)]
    pub fn new(now_ms: f64, tuning_json: Option<String>) -> Result<WebGame, JsValue> {
        let tuning = match tuning_json {
            Some(json) => Tuning::from_json(&json).map_err(|e| JsValue::from_str(&e.to_string()))?,
            None => Tuning::default(),
        };
        let seed = js_sys::Date::now() as u64;
        let mut rng = Pcg32::seed_from_u64(seed);
        let clock = FrameClock::new(now_ms);
        let state = GameState::new(tuning, clock.now_ms(), &mut rng);
        log::info!("Started new game with seed: {}", seed);
        Ok(Self {
            state,
            rng,
            clock,
            toggle: ToggleEdge::new(),
            autopilot: None,
        })
    }

    /// Advance one animation frame with the current key states
    #[allow(clippy::too_many_arguments)]
    pub fn update(
        &mut self,
        now_ms: f64,
        up: bool,
        down: bool,
        left: bool,
        right: bool,
        interact: bool,
        toggle_held: bool,
        answer: bool,
        ignore: bool,
    ) {
        let sim_now = self.clock.advance(now_ms);
        let toggle_mode = self.toggle.rising(toggle_held);
        let input = match &self.autopilot {
            Some(pilot) => pilot.decide(&self.state),
            None => TickInput {
                up,
                down,
                left,
                right,
                interact,
                toggle_mode,
                respond: if answer {
                    Some(QuestionResponse::Answer)
                } else if ignore {
                    Some(QuestionResponse::Ignore)
                } else {
                    None
                },
            },
        };
        tick(&mut self.state, &input, sim_now, &mut self.rng);
    }

    /// Full state for the renderer
    pub fn snapshot_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.state).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Fresh session with the same balance
    pub fn reset(&mut self) {
        let seed = js_sys::Date::now() as u64;
        self.rng = Pcg32::seed_from_u64(seed);
        let tuning = self.state.tuning.clone();
        self.state = GameState::new(tuning, self.clock.now_ms(), &mut self.rng);
        self.toggle = ToggleEdge::new();
        log::info!("Started new game with seed: {}", seed);
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled.then(Autopilot::new);
        log::info!("Autopilot: {}", enabled);
    }

    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over
    }

    pub fn score(&self) -> f64 {
        self.state.score
    }

    pub fn suspicion(&self) -> f32 {
        self.state.suspicion
    }
}
