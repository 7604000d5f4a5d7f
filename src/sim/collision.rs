//! Collision detection for axis-aligned office geometry
//!
//! Everything here is pure: AABB overlap for the player and NPC squares,
//! and segment tests used both for line of sight and for validating patrol
//! legs against desk obstacles.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Desk;
use crate::consts::PLAYER_SIZE;

/// Axis-aligned rectangle (top-left origin)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Square of side `size` centered on `center`
    pub fn centered(center: Vec2, size: f32) -> Self {
        let half = size / 2.0;
        Self::new(center.x - half, center.y - half, size, size)
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Strict overlap: rectangles that only share an edge do not overlap
    #[inline]
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Closed containment (edges count as inside)
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.right() && p.y >= self.y && p.y <= self.bottom()
    }

    /// Grow the rectangle by `margin` on every side
    pub fn inflate(&self, margin: f32) -> Rect {
        Rect::new(
            self.x - margin,
            self.y - margin,
            self.width + margin * 2.0,
            self.height + margin * 2.0,
        )
    }

    /// Corners in winding order: top-left, top-right, bottom-right, bottom-left
    pub fn corners(&self) -> [Vec2; 4] {
        [
            Vec2::new(self.x, self.y),
            Vec2::new(self.right(), self.y),
            Vec2::new(self.right(), self.bottom()),
            Vec2::new(self.x, self.bottom()),
        ]
    }
}

/// Does the player's square with top-left at `pos` overlap any desk?
pub fn check_collision(pos: Vec2, desks: &[Desk]) -> bool {
    let player = Rect::new(pos.x, pos.y, PLAYER_SIZE, PLAYER_SIZE);
    desks.iter().any(|d| player.overlaps(&d.bounds))
}

/// Does an NPC square of `size` centered at `center` overlap any desk?
pub fn check_entity_collision(center: Vec2, size: f32, desks: &[Desk]) -> bool {
    let rect = Rect::centered(center, size);
    desks.iter().any(|d| rect.overlaps(&d.bounds))
}

#[inline]
fn ccw(a: Vec2, b: Vec2, c: Vec2) -> bool {
    (c.y - a.y) * (b.x - a.x) > (b.y - a.y) * (c.x - a.x)
}

/// Proper intersection of segments `ab` and `cd` (orientation test)
pub fn segments_intersect(a: Vec2, b: Vec2, c: Vec2, d: Vec2) -> bool {
    ccw(a, c, d) != ccw(b, c, d) && ccw(a, b, c) != ccw(a, b, d)
}

/// Does segment `ab` touch the rectangle (either endpoint inside, or crossing an edge)?
pub fn segment_intersects_rect(a: Vec2, b: Vec2, rect: &Rect) -> bool {
    if rect.contains_point(a) || rect.contains_point(b) {
        return true;
    }
    let [r1, r2, r3, r4] = rect.corners();
    segments_intersect(a, b, r1, r2)
        || segments_intersect(a, b, r2, r3)
        || segments_intersect(a, b, r3, r4)
        || segments_intersect(a, b, r4, r1)
}

pub fn segment_intersects_any(a: Vec2, b: Vec2, obstacles: &[Rect]) -> bool {
    obstacles.iter().any(|r| segment_intersects_rect(a, b, r))
}

/// Line of sight from a boss position to the player's center.
///
/// `player_pos` is the player's top-left corner, as stored on `Player`.
pub fn has_line_of_sight(boss_pos: Vec2, player_pos: Vec2, desks: &[Desk]) -> bool {
    let eye = player_pos + Vec2::splat(PLAYER_SIZE / 2.0);
    !desks
        .iter()
        .any(|d| segment_intersects_rect(boss_pos, eye, &d.bounds))
}
