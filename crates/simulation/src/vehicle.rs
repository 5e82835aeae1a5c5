//! Vehicle physics: a signed speed scalar along a heading, with turning
//! authority that degrades as speed rises.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::city_map::CityMap;
use crate::config::{VEHICLE_ACCEL, VEHICLE_DECEL, VEHICLE_HALF_SIZE, VEHICLE_MAX_SPEED, VEHICLE_TURN_RATE};
use crate::geometry::normalize_angle;
use crate::movement::{try_move, Position};

#[derive(Component, Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    /// Signed speed scalar, clamped to `[-max_speed, max_speed]`.
    pub velocity: f32,
    /// Heading in degrees, always normalized into `[0, 360)`.
    pub rotation: f32,
    pub max_speed: f32,
    pub acceleration: f32,
    pub turn_rate: f32,
    pub stolen: bool,
    pub half_size: f32,
}

impl Default for Vehicle {
    fn default() -> Self {
        Self {
            velocity: 0.0,
            rotation: 0.0,
            max_speed: VEHICLE_MAX_SPEED,
            acceleration: VEHICLE_ACCEL,
            turn_rate: VEHICLE_TURN_RATE,
            stolen: false,
            half_size: VEHICLE_HALF_SIZE,
        }
    }
}

/// Per-tick driving inputs, written by the player controller or police AI
/// and consumed by [`vehicle_physics`]. `forward` is throttle and cruise cap
/// in one: the vehicle converges on `forward * max_speed`, which is how
/// patrol cars hold a cruising speed below pursuit speed. Magnitudes past
/// 1.0 (aggressive AI) accelerate harder; top speed stays clamped.
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct VehicleControls {
    pub forward: f32,
    pub turn: f32,
}

/// Advance one vehicle by one tick. Split out of the system so physics
/// properties can be tested without an `App`.
pub fn integrate(vehicle: &mut Vehicle, pos: &mut Position, controls: VehicleControls, map: &CityMap) {
    if controls.forward != 0.0 {
        // Throttle doubles as a cruise cap: half throttle converges on half
        // of top speed. Magnitude above 1.0 only speeds up the approach.
        let target = (controls.forward * vehicle.max_speed)
            .clamp(-vehicle.max_speed, vehicle.max_speed);
        let rate = vehicle.acceleration * controls.forward.abs();
        vehicle.velocity = if vehicle.velocity < target {
            (vehicle.velocity + rate).min(target)
        } else {
            (vehicle.velocity - rate).max(target)
        };
    } else if vehicle.velocity > 0.0 {
        vehicle.velocity = (vehicle.velocity - VEHICLE_DECEL).max(0.0);
    } else if vehicle.velocity < 0.0 {
        vehicle.velocity = (vehicle.velocity + VEHICLE_DECEL).min(0.0);
    }

    if controls.turn != 0.0 {
        // Turning authority fades to half at top speed.
        let authority =
            vehicle.turn_rate * (1.0 - 0.5 * vehicle.velocity.abs() / vehicle.max_speed);
        vehicle.rotation = normalize_angle(vehicle.rotation + controls.turn * authority);
    }

    let rad = vehicle.rotation.to_radians();
    let dx = rad.cos() * vehicle.velocity;
    let dy = rad.sin() * vehicle.velocity;
    match try_move(map, pos.x, pos.y, vehicle.half_size, dx, dy) {
        Some((nx, ny)) => {
            pos.x = nx;
            pos.y = ny;
        }
        // Hard stop, no bounce.
        None => vehicle.velocity = 0.0,
    }
}

pub fn vehicle_physics(
    map: Res<CityMap>,
    mut vehicles: Query<(&mut Vehicle, &mut Position, &VehicleControls)>,
) {
    for (mut vehicle, mut pos, controls) in vehicles.iter_mut() {
        integrate(&mut vehicle, &mut pos, *controls, &map);
    }
}
