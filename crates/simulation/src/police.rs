//! Police driver AI: patrol the road grid, chase the player when there is
//! cause, with hysteresis so the pursuit state never flickers at the range
//! boundary.

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::city_map::CityMap;
use crate::config::{
    CHASE_ENTER_RANGE, CHASE_EXIT_RANGE, CHASE_TURN_DEADZONE, OFFROAD_THROTTLE,
    PATROL_STEER_THROTTLE, PATROL_THROTTLE, SIREN_PHASE_TICKS, SWAT_AGGRESSION,
    SWAT_SPEED_MULTIPLIER, VEHICLE_MAX_SPEED,
};
use crate::geometry::{angle_delta, distance};
use crate::movement::Position;
use crate::player::Player;
use crate::sim_rng::SimRng;
use crate::vehicle::{Vehicle, VehicleControls};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PursuitState {
    Patrol,
    Chase,
}

/// Marker plus AI state for a police vehicle. Lives alongside [`Vehicle`];
/// the physics system does not know the difference.
#[derive(Component, Debug, Clone)]
pub struct Police {
    pub state: PursuitState,
    pub siren_active: bool,
    /// Alternates every [`SIREN_PHASE_TICKS`] while the siren runs; the
    /// renderer maps it to red/blue.
    pub siren_phase: bool,
    pub siren_timer: u32,
    /// Steering preference while patrolling, re-rolled periodically so
    /// patrol cars spread out instead of orbiting one block.
    pub patrol_bias: f32,
    pub patrol_timer: u32,
    /// Chase throttle multiplier. SWAT units push past 1.0.
    pub aggression: f32,
}

impl Default for Police {
    fn default() -> Self {
        Self {
            state: PursuitState::Patrol,
            siren_active: false,
            siren_phase: false,
            siren_timer: 0,
            patrol_bias: 0.0,
            patrol_timer: 0,
            aggression: 1.0,
        }
    }
}

/// Bundle for a standard patrol unit.
pub fn patrol_unit(x: f32, y: f32) -> (Police, Vehicle, VehicleControls, Position) {
    (
        Police::default(),
        Vehicle::default(),
        VehicleControls::default(),
        Position::new(x, y),
    )
}

/// Bundle for a SWAT unit: faster and far more insistent.
pub fn swat_unit(x: f32, y: f32) -> (Police, Vehicle, VehicleControls, Position) {
    (
        Police {
            aggression: SWAT_AGGRESSION,
            ..Default::default()
        },
        Vehicle {
            max_speed: VEHICLE_MAX_SPEED * SWAT_SPEED_MULTIPLIER,
            ..Default::default()
        },
        VehicleControls::default(),
        Position::new(x, y),
    )
}

/// Whether this player currently gives the police cause to chase.
fn has_cause(player: &Player, held_vehicle_stolen: bool) -> bool {
    player.wanted_level > 0.0 || (player.in_vehicle() && held_vehicle_stolen)
}

/// Decides pursuit state and writes driving controls for every police car.
/// Runs before vehicle physics so its controls apply the same tick.
pub fn police_ai(
    map: Res<CityMap>,
    mut rng: ResMut<SimRng>,
    players: Query<(&Player, &Position), Without<Police>>,
    civilian_cars: Query<&Vehicle, Without<Police>>,
    mut cars: Query<(Entity, &mut Police, &Vehicle, &Position, &mut VehicleControls), Without<Player>>,
) {
    let player = players.get_single().ok();
    let held = player.and_then(|(p, _)| p.vehicle);
    let held_stolen = held
        .and_then(|ent| civilian_cars.get(ent).ok())
        .map(|v| v.stolen)
        .unwrap_or(false);
    let cause = player.map(|(p, _)| has_cause(p, held_stolen));

    for (entity, mut police, vehicle, pos, mut controls) in cars.iter_mut() {
        // A commandeered cruiser answers to the player, not the AI.
        if held == Some(entity) {
            continue;
        }
        let target = player.map(|(_, ppos)| {
            (
                ppos.x,
                ppos.y,
                distance(pos.x, pos.y, ppos.x, ppos.y),
            )
        });

        // Hysteresis band: enter close, exit far, hold in between.
        let next_state = match (police.state, target, cause) {
            (PursuitState::Patrol, Some((_, _, d)), Some(true)) if d < CHASE_ENTER_RANGE => {
                PursuitState::Chase
            }
            (PursuitState::Chase, Some((_, _, d)), Some(true)) if d <= CHASE_EXIT_RANGE => {
                PursuitState::Chase
            }
            (PursuitState::Chase, _, _) => PursuitState::Patrol,
            (state, _, _) => state,
        };
        if next_state != police.state {
            police.state = next_state;
            police.siren_active = next_state == PursuitState::Chase;
            police.siren_phase = false;
            police.siren_timer = 0;
        }

        if police.siren_active {
            police.siren_timer += 1;
            if police.siren_timer >= SIREN_PHASE_TICKS {
                police.siren_timer = 0;
                police.siren_phase = !police.siren_phase;
            }
        }

        match police.state {
            PursuitState::Chase => {
                let (tx, ty, _) = target.unwrap_or((pos.x, pos.y, 0.0));
                let desired = (ty - pos.y).atan2(tx - pos.x).to_degrees();
                let delta = angle_delta(vehicle.rotation, desired);
                controls.turn = if delta.abs() <= CHASE_TURN_DEADZONE {
                    0.0
                } else {
                    delta.signum()
                };
                // Aggression over 1.0 overdrives the throttle; top speed is
                // still clamped by the vehicle, it just gets there sooner.
                controls.forward = police.aggression;
            }
            PursuitState::Patrol => {
                patrol(&map, &mut rng, &mut police, vehicle, pos, &mut controls);
            }
        }
    }
}

/// Cruise the road grid: keep to road direction, steer gently with a
/// per-car bias, slow right down off-road until back on a road.
fn patrol(
    map: &CityMap,
    rng: &mut SimRng,
    police: &mut Police,
    vehicle: &Vehicle,
    pos: &Position,
    controls: &mut VehicleControls,
) {
    police.patrol_timer = police.patrol_timer.saturating_sub(1);
    if police.patrol_timer == 0 {
        police.patrol_bias = if rng.0.gen_bool(0.5) { 1.0 } else { -1.0 };
        police.patrol_timer = rng.0.gen_range(50..150);
    }

    match map.road_at(pos.x, pos.y) {
        Some(road) => {
            // Align with the road axis, picking whichever of the two
            // directions is the smaller turn.
            let axis = if road.horizontal { 0.0 } else { 90.0 };
            let fwd = angle_delta(vehicle.rotation, axis);
            let back = angle_delta(vehicle.rotation, axis + 180.0);
            let delta = if fwd.abs() <= back.abs() { fwd } else { back };
            if delta.abs() > CHASE_TURN_DEADZONE {
                controls.turn = delta.signum() * PATROL_STEER_THROTTLE;
                controls.forward = PATROL_STEER_THROTTLE;
            } else {
                controls.turn = police.patrol_bias * 0.1;
                controls.forward = PATROL_THROTTLE;
            }
        }
        None => {
            // Off the grid: creep and swing back toward a road.
            controls.turn = police.patrol_bias;
            controls.forward = OFFROAD_THROTTLE;
        }
    }
}
