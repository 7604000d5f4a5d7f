//! Office Gamer - A 2D office stealth arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (movement, boss/coworker AI, scoring, schedulers)
//! - `tuning`: Data-driven game balance
//! - `platform`: Driver-side helpers (input edge detection, browser export)

pub mod platform;
pub mod sim;
pub mod tuning;

pub use tuning::Tuning;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Canvas dimensions (pixels)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Player square size and walking speed (pixels per frame)
    pub const PLAYER_SIZE: f32 = 20.0;
    pub const PLAYER_SPEED: f32 = 2.0;

    /// Office desk grid
    pub const DESK_WIDTH: f32 = 140.0;
    pub const DESK_HEIGHT: f32 = 80.0;
    pub const DESK_ROWS: usize = 2;
    pub const DESK_COLS: usize = 3;
    /// Horizontal gap between desk columns
    pub const WALKWAY_X: f32 = 100.0;
    /// Vertical gap between desk rows
    pub const WALKWAY_Y: f32 = 100.0;

    /// How close the player must be to the seat anchor to sit down
    pub const SEAT_ANCHOR_THRESHOLD: f32 = 12.0;

    /// Frame delta assumed on the very first update (ms)
    pub const DEFAULT_FRAME_MS: f64 = 16.0;
}

/// Euclidean distance between two points
#[inline]
pub fn distance(a: Vec2, b: Vec2) -> f32 {
    (a - b).length()
}

/// Clamp a point into the canvas, keeping a square of `size` fully inside.
///
/// `size` is measured from the point toward +x/+y (top-left anchored squares).
#[inline]
pub fn clamp_to_canvas(pos: Vec2, size: f32) -> Vec2 {
    use consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
    Vec2::new(
        pos.x.clamp(0.0, CANVAS_WIDTH - size),
        pos.y.clamp(0.0, CANVAS_HEIGHT - size),
    )
}
