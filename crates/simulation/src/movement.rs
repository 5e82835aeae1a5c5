//! Shared moving-entity behavior: propose a delta, test it against the map,
//! commit or reject.
//!
//! Two flavors exist and the distinction is deliberate:
//! - [`try_move`] is all-or-nothing. Vehicles and pedestrians use it; hitting
//!   a wall rejects the whole delta.
//! - [`slide_move`] tests the X and Y components independently and commits
//!   whichever axis is clear. Only the player uses it, which is what makes
//!   walking along walls feel right while cars hard-stop.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::city_map::CityMap;
use crate::geometry::Rect;

/// World-space position shared by every simulated actor.
#[derive(Component, Debug, Clone, Copy)]
pub struct Position {
    pub x: f32,
    pub y: f32,
}

impl Position {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Cardinal facing used for sprite selection and bullet/exit offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Unit offset in screen coordinates (y grows downward).
    pub fn offset(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }

    /// Facing from a movement vector, picking the dominant axis.
    pub fn from_delta(dx: f32, dy: f32) -> Self {
        if dx.abs() >= dy.abs() {
            if dx >= 0.0 {
                Direction::Right
            } else {
                Direction::Left
            }
        } else if dy >= 0.0 {
            Direction::Down
        } else {
            Direction::Up
        }
    }

    /// Nearest cardinal facing for a rotation in degrees (0 = +X).
    pub fn from_rotation(deg: f32) -> Self {
        let deg = crate::geometry::normalize_angle(deg);
        if !(45.0..315.0).contains(&deg) {
            Direction::Right
        } else if deg < 135.0 {
            Direction::Down
        } else if deg < 225.0 {
            Direction::Left
        } else {
            Direction::Up
        }
    }
}

/// All-or-nothing movement: the new center if the whole delta is clear of
/// walls, `None` if it collides. A zero delta is trivially accepted.
pub fn try_move(
    map: &CityMap,
    x: f32,
    y: f32,
    half: f32,
    dx: f32,
    dy: f32,
) -> Option<(f32, f32)> {
    if dx == 0.0 && dy == 0.0 {
        return Some((x, y));
    }
    let candidate = Rect::centered(x + dx, y + dy, half);
    if map.collides_wall(&candidate) {
        None
    } else {
        Some((x + dx, y + dy))
    }
}

/// Per-axis movement: commits each axis independently, so a diagonal input
/// against a wall slides along it instead of stopping dead.
pub fn slide_move(map: &CityMap, x: f32, y: f32, half: f32, dx: f32, dy: f32) -> (f32, f32) {
    let mut nx = x;
    let ny;
    if dx != 0.0 && !map.collides_wall(&Rect::centered(x + dx, y, half)) {
        nx = x + dx;
    }
    if dy != 0.0 && !map.collides_wall(&Rect::centered(nx, y + dy, half)) {
        ny = y + dy;
    } else {
        ny = y;
    }
    (nx, ny)
}
