//! Waypoint-graph patrol shared by bosses and coworkers
//!
//! Nodes are the intersections of the walkway lines. A leg is only valid if
//! the straight segment to the next node misses every (inflated) desk.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::{Rect, segment_intersects_any};
use super::office::Walkways;
use super::rng::RandomSource;

/// Probability of taking a diagonal leg when one is available
pub const DIAGONAL_PREFERENCE: f32 = 0.9;
/// Probability of switching axis relative to the previous leg
pub const AXIS_SWITCH_PREFERENCE: f32 = 0.9;
/// Final pick is uniform among this many closest candidates
pub const CLOSEST_CANDIDATES: usize = 3;

/// Direction of a patrol leg
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    Horizontal,
    Vertical,
    Diagonal,
}

impl Axis {
    pub fn of(from: Vec2, to: Vec2) -> Axis {
        if from.y == to.y {
            Axis::Horizontal
        } else if from.x == to.x {
            Axis::Vertical
        } else {
            Axis::Diagonal
        }
    }
}

/// Inputs for choosing the next waypoint
#[derive(Debug, Clone, Copy)]
pub struct PatrolQuery {
    pub from: Vec2,
    /// Previous waypoint (avoid immediate backtracking)
    pub avoid: Option<Vec2>,
    pub last_axis: Option<Axis>,
    /// Candidates are ranked by distance to this point instead of `from`
    pub bias_target: Option<Vec2>,
    pub allow_diagonal: bool,
}

impl PatrolQuery {
    pub fn at(from: Vec2) -> Self {
        Self {
            from,
            avoid: None,
            last_axis: None,
            bias_target: None,
            allow_diagonal: true,
        }
    }
}

/// Choose the next waypoint.
///
/// Returns `query.from` when no node is reachable.
pub fn pick_next_target(
    query: &PatrolQuery,
    walkways: &Walkways,
    rng: &mut impl RandomSource,
) -> Vec2 {
    let from = query.from;
    let mut reachable: Vec<Vec2> = walkways
        .intersections()
        .filter(|&p| p != from && !segment_intersects_any(from, p, &walkways.obstacles))
        .collect();

    if !query.allow_diagonal {
        let straight: Vec<Vec2> = reachable
            .iter()
            .copied()
            .filter(|&p| Axis::of(from, p) != Axis::Diagonal)
            .collect();
        // Off-grid positions may only reach nodes diagonally
        if !straight.is_empty() {
            reachable = straight;
        }
    }

    let mut candidates: Vec<Vec2> = reachable
        .iter()
        .copied()
        .filter(|&p| Some(p) != query.avoid)
        .collect();
    if candidates.is_empty() {
        candidates = reachable;
    }
    if candidates.is_empty() {
        return from;
    }

    let (diagonal, straight): (Vec<Vec2>, Vec<Vec2>) = candidates
        .into_iter()
        .partition(|&p| Axis::of(from, p) == Axis::Diagonal);

    let mut pool = if !diagonal.is_empty()
        && (straight.is_empty() || rng.chance(DIAGONAL_PREFERENCE))
    {
        diagonal
    } else {
        pick_axis_pool(from, straight, query.last_axis, rng)
    };

    let anchor = query.bias_target.unwrap_or(from);
    pool.sort_by(|a, b| a.distance(anchor).total_cmp(&b.distance(anchor)));
    pool.truncate(CLOSEST_CANDIDATES);
    pool[rng.index(pool.len())]
}

/// Prefer switching axis relative to the previous leg
fn pick_axis_pool(
    from: Vec2,
    straight: Vec<Vec2>,
    last_axis: Option<Axis>,
    rng: &mut impl RandomSource,
) -> Vec<Vec2> {
    let preferred = match last_axis {
        Some(Axis::Horizontal) => Axis::Vertical,
        Some(Axis::Vertical) => Axis::Horizontal,
        _ => return straight,
    };
    let (switched, same): (Vec<Vec2>, Vec<Vec2>) = straight
        .into_iter()
        .partition(|&p| Axis::of(from, p) == preferred);

    let (first, second) = if rng.chance(AXIS_SWITCH_PREFERENCE) {
        (switched, same)
    } else {
        (same, switched)
    };
    if first.is_empty() { second } else { first }
}

/// Replace a diagonal target with one of its axis-aligned corners.
///
/// Keeps `to` if it is already straight or neither corner leg is clear.
pub fn coerce_to_straight_target(
    from: Vec2,
    to: Vec2,
    obstacles: &[Rect],
    rng: &mut impl RandomSource,
) -> Vec2 {
    if from.x == to.x || from.y == to.y {
        return to;
    }
    let options: Vec<Vec2> = [Vec2::new(from.x, to.y), Vec2::new(to.x, from.y)]
        .into_iter()
        .filter(|&corner| !segment_intersects_any(from, corner, obstacles))
        .collect();
    if options.is_empty() {
        return to;
    }
    options[rng.index(options.len())]
}
