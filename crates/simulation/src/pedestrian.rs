//! Pedestrian crowd simulation.
//!
//! Every pedestrian runs a small state machine (wander, wait, flee, plus the
//! aggressive and erratic behaviors used by event spawns). Death is final:
//! a dead pedestrian never acts again, lies around as a corpse for a while,
//! then despawns. A background spawner keeps the live population above a
//! floor so the city never empties out.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::city_map::CityMap;
use crate::config::{
    BULLET_HALF_SIZE, FLEE_ESCAPE_CHANCE, FLEE_PLAYER_RANGE, FLEE_VEHICLE_RANGE, FLEE_VEHICLE_SPEED,
    LETHAL_VEHICLE_SPEED, PED_CORPSE_TICKS, PED_FLEE_MULTIPLIER, PED_HALF_SIZE,
    PED_POPULATION_FLOOR, PED_REDIRECT_CHANCE, PED_WANDER_SPEED, WANTED_PED_SHOT,
    WANTED_RUN_OVER,
};
use crate::geometry::{distance, normalize, Rect};
use crate::movement::{try_move, Direction, Position};
use crate::notifications::GameMessage;
use crate::player::Player;
use crate::sim_rng::SimRng;
use crate::vehicle::Vehicle;

/// Flat sprite colors, body then accent.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Palette {
    pub body: [u8; 3],
    pub accent: [u8; 3],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedKind {
    Civilian,
    Cultist,
    Mime,
    GangRed,
    GangBlue,
    AngryDriver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PedState {
    Wander,
    Wait,
    Flee,
    /// Walks straight at the player. Never flees.
    Aggressive,
    /// Re-rolls direction constantly. Never flees.
    Erratic,
}

#[derive(Component, Debug, Clone)]
pub struct Pedestrian {
    pub kind: PedKind,
    pub state: PedState,
    pub wander_speed: f32,
    /// Current unit movement direction (zero while waiting).
    pub dir: (f32, f32),
    /// Ticks until the current state re-rolls.
    pub timer: u32,
    /// The threat being fled from, re-resolved to its current position
    /// every tick so a pursuing threat is actually evaded.
    pub flee_from: Option<Entity>,
    pub dead: bool,
    pub death_timer: u32,
    pub palette: Palette,
}

impl Pedestrian {
    pub fn of_kind(kind: PedKind) -> Self {
        let (state, wander_speed, palette) = match kind {
            PedKind::Civilian => (
                PedState::Wander,
                PED_WANDER_SPEED,
                Palette { body: [180, 160, 140], accent: [60, 60, 80] },
            ),
            PedKind::Cultist => (
                PedState::Aggressive,
                1.2,
                Palette { body: [70, 30, 90], accent: [40, 10, 50] },
            ),
            PedKind::Mime => (
                PedState::Erratic,
                PED_WANDER_SPEED,
                Palette { body: [240, 240, 240], accent: [20, 20, 20] },
            ),
            PedKind::GangRed => (
                PedState::Aggressive,
                1.2,
                Palette { body: [180, 40, 40], accent: [90, 20, 20] },
            ),
            PedKind::GangBlue => (
                PedState::Aggressive,
                1.2,
                Palette { body: [40, 60, 180], accent: [20, 30, 90] },
            ),
            PedKind::AngryDriver => (
                PedState::Aggressive,
                1.4,
                Palette { body: [220, 120, 30], accent: [120, 60, 10] },
            ),
        };
        Self {
            kind,
            state,
            wander_speed,
            dir: (0.0, 0.0),
            timer: 0,
            flee_from: None,
            dead: false,
            death_timer: 0,
            palette,
        }
    }

    /// Only ordinary crowd behavior can be scared into fleeing.
    fn can_flee(&self) -> bool {
        matches!(self.state, PedState::Wander | PedState::Wait)
    }
}

fn random_cardinal<R: Rng>(rng: &mut R) -> (f32, f32) {
    match rng.gen_range(0..4u8) {
        0 => Direction::Up.offset(),
        1 => Direction::Down.offset(),
        2 => Direction::Left.offset(),
        _ => Direction::Right.offset(),
    }
}

/// Rotate a direction 90 degrees, either way.
fn perpendicular<R: Rng>(rng: &mut R, dir: (f32, f32)) -> (f32, f32) {
    if rng.gen_bool(0.5) {
        (-dir.1, dir.0)
    } else {
        (dir.1, -dir.0)
    }
}

/// Drives every live pedestrian one tick.
pub fn pedestrian_ai(
    map: Res<CityMap>,
    mut rng: ResMut<SimRng>,
    players: Query<(Entity, &Player, &Position), Without<Pedestrian>>,
    vehicles: Query<(Entity, &Vehicle, &Position), (Without<Pedestrian>, Without<Player>)>,
    mut peds: Query<(Entity, &mut Pedestrian, &mut Position)>,
) {
    let player = players.get_single().ok();

    // Threat scan inputs, read once up front.
    let armed_player = player.and_then(|(ent, p, pos)| {
        (p.weapon.armed && !p.in_vehicle()).then_some((ent, pos.x, pos.y))
    });
    let player_target = player.map(|(_, _, pos)| (pos.x, pos.y));
    let fast_vehicles: Vec<(Entity, f32, f32)> = vehicles
        .iter()
        .filter(|(_, v, _)| v.velocity.abs() > FLEE_VEHICLE_SPEED)
        .map(|(ent, _, pos)| (ent, pos.x, pos.y))
        .collect();
    // Current positions of everything a pedestrian might be fleeing from.
    let threat_positions: HashMap<Entity, (f32, f32)> = vehicles
        .iter()
        .map(|(ent, _, pos)| (ent, (pos.x, pos.y)))
        .chain(player.map(|(ent, _, pos)| (ent, (pos.x, pos.y))))
        .collect();

    // Snapshot of live pedestrian positions for crowd avoidance; reading the
    // query again inside the mutable loop would alias.
    let crowd: Vec<(Entity, f32, f32)> = peds
        .iter()
        .filter(|(_, p, _)| !p.dead)
        .map(|(e, _, pos)| (e, pos.x, pos.y))
        .collect();

    for (entity, mut ped, mut pos) in peds.iter_mut() {
        if ped.dead {
            continue;
        }

        // Fear check: armed player on foot, or any vehicle moving fast. The
        // player scares for longer than a passing car does.
        if ped.can_flee() {
            let mut threat = None;
            if let Some((ent, tx, ty)) = armed_player {
                if distance(pos.x, pos.y, tx, ty) < FLEE_PLAYER_RANGE {
                    threat = Some((ent, rng.0.gen_range(40..80u32)));
                }
            }
            if threat.is_none() {
                threat = fast_vehicles
                    .iter()
                    .find(|(_, vx, vy)| distance(pos.x, pos.y, *vx, *vy) < FLEE_VEHICLE_RANGE)
                    .map(|&(ent, _, _)| (ent, rng.0.gen_range(30..60u32)));
            }
            if let Some((ent, timer)) = threat {
                ped.state = PedState::Flee;
                ped.flee_from = Some(ent);
                ped.timer = timer;
            }
        }

        // State upkeep and direction selection.
        ped.timer = ped.timer.saturating_sub(1);
        match ped.state {
            PedState::Wander => {
                if ped.timer == 0 {
                    if rng.0.gen::<f32>() < 0.75 {
                        ped.dir = random_cardinal(&mut rng.0);
                        ped.timer = rng.0.gen_range(30..120);
                    } else {
                        ped.state = PedState::Wait;
                        ped.dir = (0.0, 0.0);
                        ped.timer = rng.0.gen_range(30..120);
                    }
                }
            }
            PedState::Wait => {
                if ped.timer == 0 {
                    ped.state = PedState::Wander;
                    ped.dir = random_cardinal(&mut rng.0);
                    ped.timer = rng.0.gen_range(30..120);
                }
            }
            PedState::Flee => {
                // A despawned threat leaves the last direction in place.
                if let Some((fx, fy)) =
                    ped.flee_from.and_then(|e| threat_positions.get(&e).copied())
                {
                    ped.dir = normalize(pos.x - fx, pos.y - fy);
                }
                if ped.timer == 0 {
                    if rng.0.gen::<f32>() < FLEE_ESCAPE_CHANCE {
                        ped.state = PedState::Wander;
                        ped.flee_from = None;
                        ped.dir = random_cardinal(&mut rng.0);
                        ped.timer = rng.0.gen_range(30..120);
                    } else {
                        ped.timer = rng.0.gen_range(20..60);
                    }
                }
            }
            PedState::Aggressive => {
                if let Some((tx, ty)) = player_target {
                    ped.dir = normalize(tx - pos.x, ty - pos.y);
                }
            }
            PedState::Erratic => {
                if ped.timer == 0 {
                    ped.dir = random_cardinal(&mut rng.0);
                    ped.timer = rng.0.gen_range(5..20);
                }
            }
        }

        // Crowd avoidance while wandering: sometimes re-roll away from a
        // nearby pedestrian rather than shoving through.
        if ped.state == PedState::Wander {
            let crowded = crowd.iter().any(|&(other, ox, oy)| {
                other != entity && distance(pos.x, pos.y, ox, oy) < PED_HALF_SIZE * 2.0
            });
            if crowded && rng.0.gen::<f32>() < PED_REDIRECT_CHANCE {
                ped.dir = random_cardinal(&mut rng.0);
            }
        }

        // Commit movement.
        let speed = if ped.state == PedState::Flee {
            ped.wander_speed * PED_FLEE_MULTIPLIER
        } else {
            ped.wander_speed
        };
        let (dx, dy) = (ped.dir.0 * speed, ped.dir.1 * speed);
        match try_move(&map, pos.x, pos.y, PED_HALF_SIZE, dx, dy) {
            Some((nx, ny)) => {
                pos.x = nx;
                pos.y = ny;
            }
            None => {
                // Blocked by a wall. Fleeing pedestrians sidestep so they
                // track along buildings away from the threat; everyone else
                // just picks a new direction.
                ped.dir = if ped.state == PedState::Flee {
                    perpendicular(&mut rng.0, ped.dir)
                } else {
                    random_cardinal(&mut rng.0)
                };
            }
        }
    }
}

/// Resolves lethal contacts: player bullets and fast vehicles.
pub fn pedestrian_deaths(
    mut players: Query<&mut Player, Without<Pedestrian>>,
    vehicles: Query<(Entity, &Vehicle, &Position), (Without<Pedestrian>, Without<Player>)>,
    mut peds: Query<(&mut Pedestrian, &Position)>,
    mut messages: EventWriter<GameMessage>,
) {
    let mut player = players.get_single_mut().ok();
    let held = player.as_ref().and_then(|p| p.vehicle);

    for (mut ped, pos) in peds.iter_mut() {
        if ped.dead {
            continue;
        }
        let body = Rect::centered(pos.x, pos.y, PED_HALF_SIZE);

        // Bullets kill instantly and are consumed by the hit.
        if let Some(player) = player.as_mut() {
            let mut hit = false;
            player.weapon.bullets.retain(|b| {
                if !hit && Rect::centered(b.x, b.y, BULLET_HALF_SIZE).intersects(&body) {
                    hit = true;
                    false
                } else {
                    true
                }
            });
            if hit {
                ped.dead = true;
                player.raise_wanted(WANTED_PED_SHOT);
                messages.send(GameMessage::new("Pedestrian down!"));
                continue;
            }
        }

        // Any vehicle at speed is lethal; only the player's is a crime.
        for (ent, vehicle, vpos) in vehicles.iter() {
            if vehicle.velocity.abs() <= LETHAL_VEHICLE_SPEED {
                continue;
            }
            let hull = Rect::centered(vpos.x, vpos.y, vehicle.half_size);
            if hull.intersects(&body) {
                ped.dead = true;
                if held == Some(ent) {
                    if let Some(player) = player.as_mut() {
                        player.raise_wanted(WANTED_RUN_OVER);
                        messages.send(GameMessage::new("Hit and run!"));
                    }
                }
                break;
            }
        }
    }
}

/// Ages corpses and removes them once they have lain around long enough.
pub fn despawn_dead(mut commands: Commands, mut peds: Query<(Entity, &mut Pedestrian)>) {
    let mut gone = Vec::new();
    for (entity, mut ped) in peds.iter_mut() {
        if !ped.dead {
            continue;
        }
        ped.death_timer += 1;
        if ped.death_timer > PED_CORPSE_TICKS {
            gone.push(entity);
        }
    }
    for entity in gone {
        commands.entity(entity).despawn();
    }
}

/// Tops the live population back up, one pedestrian per tick.
pub fn maintain_population(
    mut commands: Commands,
    map: Res<CityMap>,
    mut rng: ResMut<SimRng>,
    peds: Query<&Pedestrian>,
) {
    let live = peds.iter().filter(|p| !p.dead).count();
    if live >= PED_POPULATION_FLOOR {
        return;
    }
    if let Some((x, y)) = map.find_clear_spot(&mut rng.0, PED_HALF_SIZE) {
        commands.spawn((Pedestrian::of_kind(PedKind::Civilian), Position::new(x, y)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_kind_seeds_state_and_speed() {
        assert_eq!(Pedestrian::of_kind(PedKind::Civilian).state, PedState::Wander);
        assert_eq!(Pedestrian::of_kind(PedKind::Cultist).state, PedState::Aggressive);
        assert_eq!(Pedestrian::of_kind(PedKind::Mime).state, PedState::Erratic);
        assert!(Pedestrian::of_kind(PedKind::Cultist).wander_speed > PED_WANDER_SPEED);
    }

    #[test]
    fn test_aggressive_and_erratic_never_flee() {
        assert!(Pedestrian::of_kind(PedKind::Civilian).can_flee());
        assert!(!Pedestrian::of_kind(PedKind::Cultist).can_flee());
        assert!(!Pedestrian::of_kind(PedKind::Mime).can_flee());
    }

    #[test]
    fn test_perpendicular_preserves_magnitude() {
        let mut rng = ChaCha8Rng::seed_from_u64(3);
        let dir = (1.0, 0.0);
        let (px, py) = perpendicular(&mut rng, dir);
        assert!((px * px + py * py - 1.0).abs() < 1e-6);
        assert!(px.abs() < 1e-6);
    }

    #[test]
    fn test_random_cardinal_is_unit_axis() {
        let mut rng = ChaCha8Rng::seed_from_u64(9);
        for _ in 0..20 {
            let (dx, dy) = random_cardinal(&mut rng);
            assert_eq!(dx.abs() + dy.abs(), 1.0);
        }
    }
}
