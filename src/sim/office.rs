//! Office floor layout
//!
//! A fixed grid of desks centered on the canvas, and the walkway lines
//! between them that every mobile NPC patrols along.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::state::Desk;
use crate::consts::*;

/// Build the desk grid. The desk at row 0, column 0 belongs to the player.
pub fn create_office_layout() -> Vec<Desk> {
    let total_width = DESK_COLS as f32 * DESK_WIDTH + (DESK_COLS as f32 - 1.0) * WALKWAY_X;
    let total_height = DESK_ROWS as f32 * DESK_HEIGHT + (DESK_ROWS as f32 - 1.0) * WALKWAY_Y;
    let start_x = ((CANVAS_WIDTH - total_width) / 2.0).floor();
    let start_y = ((CANVAS_HEIGHT - total_height) / 2.0).floor();

    let mut desks = Vec::with_capacity(DESK_ROWS * DESK_COLS);
    for row in 0..DESK_ROWS {
        for col in 0..DESK_COLS {
            let x = start_x + col as f32 * (DESK_WIDTH + WALKWAY_X);
            let y = start_y + row as f32 * (DESK_HEIGHT + WALKWAY_Y);
            desks.push(Desk {
                id: format!("desk-{row}-{col}"),
                bounds: Rect::new(x, y, DESK_WIDTH, DESK_HEIGHT),
                is_player_desk: row == 0 && col == 0,
            });
        }
    }
    desks
}

/// Walkway coordinate lines plus the obstacles paths must avoid
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Walkways {
    /// x-coordinates of vertical walkways
    pub v_lines: Vec<f32>,
    /// y-coordinates of horizontal walkways
    pub h_lines: Vec<f32>,
    /// Desk bounds inflated by the entity's clearance
    pub obstacles: Vec<Rect>,
}

impl Walkways {
    /// Every waypoint-graph node (row-major over h_lines)
    pub fn intersections(&self) -> impl Iterator<Item = Vec2> + '_ {
        self.h_lines
            .iter()
            .flat_map(move |&y| self.v_lines.iter().map(move |&x| Vec2::new(x, y)))
    }

    pub fn nearest_intersection(&self, pos: Vec2) -> Vec2 {
        self.intersections()
            .min_by(|a, b| a.distance(pos).total_cmp(&b.distance(pos)))
            .unwrap_or(pos)
    }
}

/// Midpoints between neighbouring values, plus the outer gaps to the canvas edge
fn walkway_coords(starts: &mut Vec<f32>, extent: f32, canvas: f32) -> Vec<f32> {
    starts.sort_by(f32::total_cmp);
    starts.dedup();

    let (Some(&min), Some(&max)) = (starts.first(), starts.last()) else {
        return vec![canvas / 2.0];
    };

    let mut lines = Vec::with_capacity(starts.len() + 1);
    lines.push(min / 2.0);
    for pair in starts.windows(2) {
        let near_edge = pair[0] + extent;
        lines.push((near_edge + pair[1]) / 2.0);
    }
    lines.push((max + extent + canvas) / 2.0);
    lines
}

/// Derive the waypoint graph from the desks.
///
/// `clearance` inflates every desk when building `obstacles`, so an entity
/// of that half-size never grazes a corner while walking a validated leg.
pub fn compute_walkway_lines(desks: &[Desk], clearance: f32) -> Walkways {
    let desk_width = desks.first().map_or(0.0, |d| d.bounds.width);
    let desk_height = desks.first().map_or(0.0, |d| d.bounds.height);

    let mut cols: Vec<f32> = desks.iter().map(|d| d.bounds.x).collect();
    let mut rows: Vec<f32> = desks.iter().map(|d| d.bounds.y).collect();

    Walkways {
        v_lines: walkway_coords(&mut cols, desk_width, CANVAS_WIDTH),
        h_lines: walkway_coords(&mut rows, desk_height, CANVAS_HEIGHT),
        obstacles: desks.iter().map(|d| d.bounds.inflate(clearance)).collect(),
    }
}

pub fn player_desk(desks: &[Desk]) -> Option<&Desk> {
    desks.iter().find(|d| d.is_player_desk)
}

/// Where the player sits: just below the desk, horizontally centered
pub fn player_seat_anchor(desk: &Desk) -> Vec2 {
    let b = desk.bounds;
    Vec2::new(
        (b.x + b.width / 2.0 - PLAYER_SIZE / 2.0).round(),
        (b.y + b.height + 2.0).round(),
    )
}

pub fn is_near_seat_anchor(pos: Vec2, anchor: Vec2, threshold: f32) -> bool {
    pos.distance(anchor) <= threshold
}
