//! District typing for the escalating-event scheduler.
//!
//! The city is divided into a coarse grid of square regions, each assigned a
//! type by hashing its cell coordinates. Hashing (rather than drawing from
//! the simulation RNG) makes region types a pure function of position: the
//! same cell is always the same district, across runs and across saves.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use xxhash_rust::xxh32::xxh32;

use crate::city_map::CityMap;
use crate::config::REGION_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegionType {
    StreetCorner,
    Intersection,
    Alley,
    Park,
    Plaza,
    Bank,
    PoliceStation,
    DarkArea,
    HighValue,
    BadNeighborhood,
    Highway,
    Road,
    Forest,
}

/// Weighted draw table. Banks and police stations are deliberately rare.
const REGION_WEIGHTS: &[(RegionType, u32)] = &[
    (RegionType::StreetCorner, 10),
    (RegionType::Intersection, 10),
    (RegionType::Alley, 8),
    (RegionType::Park, 6),
    (RegionType::Plaza, 5),
    (RegionType::Bank, 2),
    (RegionType::PoliceStation, 2),
    (RegionType::DarkArea, 7),
    (RegionType::HighValue, 3),
    (RegionType::BadNeighborhood, 5),
    (RegionType::Highway, 4),
    (RegionType::Road, 10),
    (RegionType::Forest, 3),
];

/// The district type of grid cell `(col, row)`, as a pure function of the
/// cell coordinates.
pub fn type_for_cell(col: u32, row: u32) -> RegionType {
    let mut key = [0u8; 8];
    key[..4].copy_from_slice(&col.to_le_bytes());
    key[4..].copy_from_slice(&row.to_le_bytes());
    let total: u32 = REGION_WEIGHTS.iter().map(|(_, w)| w).sum();
    let mut roll = xxh32(&key, 0) % total;
    for (ty, weight) in REGION_WEIGHTS {
        if roll < *weight {
            return *ty;
        }
        roll -= weight;
    }
    unreachable!("roll is bounded by the weight total")
}

#[derive(Resource, Debug, Clone, Default)]
pub struct RegionGrid {
    pub cols: u32,
    pub rows: u32,
    pub size: f32,
    pub types: Vec<RegionType>,
}

impl RegionGrid {
    pub fn from_map(map: &CityMap) -> Self {
        let cols = (map.width / REGION_SIZE).ceil() as u32;
        let rows = (map.height / REGION_SIZE).ceil() as u32;
        let types = (0..rows)
            .flat_map(|row| (0..cols).map(move |col| type_for_cell(col, row)))
            .collect();
        Self {
            cols,
            rows,
            size: REGION_SIZE,
            types,
        }
    }

    /// Flat index of the region containing a world position, if in bounds.
    pub fn index_at(&self, x: f32, y: f32) -> Option<usize> {
        if x < 0.0 || y < 0.0 || self.size <= 0.0 {
            return None;
        }
        let col = (x / self.size) as u32;
        let row = (y / self.size) as u32;
        (col < self.cols && row < self.rows).then(|| (row * self.cols + col) as usize)
    }

    pub fn region_type(&self, index: usize) -> Option<RegionType> {
        self.types.get(index).copied()
    }

    /// Center of a region in world coordinates.
    pub fn center_of(&self, index: usize) -> (f32, f32) {
        let col = index as u32 % self.cols;
        let row = index as u32 / self.cols;
        (
            (col as f32 + 0.5) * self.size,
            (row as f32 + 0.5) * self.size,
        )
    }
}
