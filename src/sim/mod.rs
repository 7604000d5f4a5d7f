//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Time only arrives as the `now_ms` argument
//! - Randomness only through an injected `RandomSource`
//! - Stable iteration order (insertion order, IDs never reused)
//! - No rendering or platform dependencies

pub mod autopilot;
pub mod boss;
pub mod collision;
pub mod coworker;
pub mod interrupts;
pub mod office;
pub mod patrol;
pub mod rng;
pub mod scoring;
pub mod spawner;
pub mod state;
pub mod tick;

pub use autopilot::Autopilot;
pub use collision::{Rect, check_collision, has_line_of_sight};
pub use office::{create_office_layout, player_seat_anchor};
pub use rng::{RandomSource, ScriptedRandom};
pub use scoring::calculate_dynamic_multiplier;
pub use state::{
    Boss, BossType, Coworker, CoworkerType, Desk, GameEvent, GameMode, GameOverReason, GameState,
    MultiplierBreakdown, Player, QuestionResponse, RiskLevel,
};
pub use tick::{TickInput, tick};
