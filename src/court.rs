//! Court geometry and side bookkeeping
//!
//! Court space: x runs sideline to sideline, y runs baseline to baseline with
//! the net at y = 0. The near side owns y < 0, the far side owns y > 0.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::constants::*;

/// One half of the court (and the competitor standing on it)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Near,
    Far,
}

impl Side {
    pub const BOTH: [Side; 2] = [Side::Near, Side::Far];

    pub fn opponent(self) -> Side {
        match self {
            Side::Near => Side::Far,
            Side::Far => Side::Near,
        }
    }

    /// +1.0 for the far side, -1.0 for the near side (sign of y on this half)
    pub fn sign(self) -> f32 {
        match self {
            Side::Near => -1.0,
            Side::Far => 1.0,
        }
    }

    /// Which half a court-space point lies on. The net line belongs to neither,
    /// callers treat y == 0 as the far half.
    pub fn of_point(point: Vec2) -> Side {
        if point.y < 0.0 { Side::Near } else { Side::Far }
    }

    pub fn index(self) -> usize {
        match self {
            Side::Near => 0,
            Side::Far => 1,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Near => "near",
            Side::Far => "far",
        }
    }
}

impl std::fmt::Display for Side {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Is the point inside the court lines (lines are in)?
pub fn in_bounds(point: Vec2) -> bool {
    point.x.abs() <= COURT_HALF_WIDTH && point.y.abs() <= COURT_HALF_LENGTH
}

/// Is the point inside either non-volley zone? The kitchen line counts as kitchen.
pub fn in_kitchen(point: Vec2) -> bool {
    point.y.abs() <= KITCHEN_DEPTH && point.x.abs() <= COURT_HALF_WIDTH
}

/// Has the ball travelled far enough past the lines to be dead?
pub fn beyond_play(point: Vec2) -> bool {
    point.x.abs() > COURT_HALF_WIDTH + OUT_OF_PLAY_MARGIN
        || point.y.abs() > COURT_HALF_LENGTH + OUT_OF_PLAY_MARGIN
}

/// Ready position for a side at a given depth from the net
pub fn ready_position(side: Side, depth: f32) -> Vec2 {
    Vec2::new(0.0, side.sign() * depth)
}

/// Serving position: behind the baseline, right-hand court on an even score
pub fn serve_position(side: Side, server_score: u32) -> Vec2 {
    let lateral = if server_score % 2 == 0 { 2.5 } else { -2.5 };
    // The far side faces the other way, so its right hand is at -x
    Vec2::new(lateral * -side.sign(), side.sign() * SERVE_DEPTH)
}
