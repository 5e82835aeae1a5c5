//! Static city geometry: walls and roads.
//!
//! The map is produced once at startup (by the external generator, or by
//! [`CityMap::grid_layout`] for the default city) and never mutated by
//! gameplay. Every entity update borrows it read-only for collision and
//! road-alignment queries.

use bevy::prelude::*;
use rand::Rng;

use crate::config::{BLOCK_SIZE, ROAD_WIDTH, SPAWN_RETRY_LIMIT, WALL_THICKNESS};
use crate::geometry::Rect;

/// A drivable strip. `horizontal` is a navigation hint for patrol AI; it does
/// not affect collision (roads are never solid).
#[derive(Debug, Clone)]
pub struct Road {
    pub rect: Rect,
    pub horizontal: bool,
}

#[derive(Resource)]
pub struct CityMap {
    pub walls: Vec<Rect>,
    pub roads: Vec<Road>,
    pub width: f32,
    pub height: f32,
}

impl CityMap {
    /// An empty map with only perimeter walls. Used by tests and as a base
    /// for custom layouts.
    pub fn open(width: f32, height: f32) -> Self {
        let t = WALL_THICKNESS;
        let walls = vec![
            Rect::new(0.0, 0.0, width, t),
            Rect::new(0.0, height - t, width, t),
            Rect::new(0.0, 0.0, t, height),
            Rect::new(width - t, 0.0, t, height),
        ];
        Self {
            walls,
            roads: Vec::new(),
            width,
            height,
        }
    }

    /// Default city: a regular grid of roads every [`BLOCK_SIZE`] units with
    /// building blocks filling the gaps between them.
    pub fn grid_layout(width: f32, height: f32) -> Self {
        let mut map = Self::open(width, height);
        let half_road = ROAD_WIDTH * 0.5;

        let mut y = half_road;
        while y < height - half_road {
            map.roads.push(Road {
                rect: Rect::new(0.0, y - half_road, width, ROAD_WIDTH),
                horizontal: true,
            });
            y += BLOCK_SIZE;
        }
        let mut x = half_road;
        while x < width - half_road {
            map.roads.push(Road {
                rect: Rect::new(x - half_road, 0.0, ROAD_WIDTH, height),
                horizontal: false,
            });
            x += BLOCK_SIZE;
        }

        // Buildings occupy the interior of each block, inset from the road
        // edges so sidewalks stay walkable.
        let inset = 10.0;
        let block_interior = BLOCK_SIZE - ROAD_WIDTH - inset * 2.0;
        let mut by = ROAD_WIDTH + inset;
        while by + block_interior < height {
            let mut bx = ROAD_WIDTH + inset;
            while bx + block_interior < width {
                map.walls
                    .push(Rect::new(bx, by, block_interior, block_interior));
                bx += BLOCK_SIZE;
            }
            by += BLOCK_SIZE;
        }
        map
    }

    pub fn in_bounds(&self, x: f32, y: f32) -> bool {
        x >= 0.0 && x < self.width && y >= 0.0 && y < self.height
    }

    pub fn collides_wall(&self, rect: &Rect) -> bool {
        self.walls.iter().any(|w| w.intersects(rect))
    }

    /// The first road whose rect contains the point, if any.
    pub fn road_at(&self, x: f32, y: f32) -> Option<&Road> {
        self.roads.iter().find(|r| r.rect.contains_point(x, y))
    }

    /// Random wall-clear position anywhere in bounds. Gives up after
    /// [`SPAWN_RETRY_LIMIT`] attempts rather than looping indefinitely.
    pub fn find_clear_spot<R: Rng>(&self, rng: &mut R, half: f32) -> Option<(f32, f32)> {
        for _ in 0..SPAWN_RETRY_LIMIT {
            let x = rng.gen_range(half..self.width - half);
            let y = rng.gen_range(half..self.height - half);
            if !self.collides_wall(&Rect::centered(x, y, half)) {
                return Some((x, y));
            }
        }
        None
    }

    /// Random wall-clear position in the annulus `[min_r, max_r]` around
    /// `(cx, cy)`, clamped into bounds. Same bounded-retry policy.
    pub fn find_clear_spot_near<R: Rng>(
        &self,
        rng: &mut R,
        cx: f32,
        cy: f32,
        min_r: f32,
        max_r: f32,
        half: f32,
    ) -> Option<(f32, f32)> {
        for _ in 0..SPAWN_RETRY_LIMIT {
            let angle = rng.gen_range(0.0..std::f32::consts::TAU);
            let radius = rng.gen_range(min_r..max_r.max(min_r + f32::EPSILON));
            let x = (cx + angle.cos() * radius).clamp(half, self.width - half);
            let y = (cy + angle.sin() * radius).clamp(half, self.height - half);
            if !self.collides_wall(&Rect::centered(x, y, half)) {
                return Some((x, y));
            }
        }
        None
    }
}
