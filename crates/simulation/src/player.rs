//! Player state and control: on-foot movement, vehicle entry/exit, the
//! weapon, and the wanted meter.
//!
//! Input arrives through the [`PlayerIntent`] resource so the simulation
//! stays headless; whatever frontend exists translates raw input into an
//! intent each tick. `enter_exit` and `shoot` are edge-triggered and
//! consumed when read.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::city_map::CityMap;
use crate::config::{
    BULLET_HALF_SIZE, BULLET_LIFE, BULLET_SPAWN_OFFSET, BULLET_SPEED, PLAYER_HALF_SIZE,
    PLAYER_SPEED, SHOOT_COOLDOWN, VEHICLE_ENTRY_RANGE, VEHICLE_EXIT_OFFSET,
    VEHICLE_REENTRY_COOLDOWN, WALK_CYCLE_FRAMES, WALK_CYCLE_PERIOD, WANTED_DECAY_DELAY,
    WANTED_DECAY_RATE, WANTED_GUNSHOT, WANTED_THEFT,
};
use crate::geometry::{distance, Rect};
use crate::movement::{slide_move, Direction, Position};
use crate::notifications::GameMessage;
use crate::police::Police;
use crate::vehicle::{Vehicle, VehicleControls};

/// A live projectile. Bullets belong to the weapon that fired them rather
/// than being entities of their own; there are never more than a handful.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bullet {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Weapon {
    pub armed: bool,
    pub cooldown: u32,
    pub bullets: Vec<Bullet>,
}

#[derive(Component, Debug, Clone)]
pub struct Player {
    pub speed: f32,
    pub moving: bool,
    pub facing: Direction,
    pub anim_counter: u32,
    pub anim_frame: u32,
    /// The vehicle currently driven, if any. While set, the player has no
    /// collision body of its own; position mirrors the vehicle.
    pub vehicle: Option<Entity>,
    pub vehicle_cooldown: u32,
    pub weapon: Weapon,
    pub wanted_level: f32,
    pub wanted_decay_cooldown: u32,
}

impl Default for Player {
    fn default() -> Self {
        Self {
            speed: PLAYER_SPEED,
            moving: false,
            facing: Direction::Down,
            anim_counter: 0,
            anim_frame: 0,
            vehicle: None,
            vehicle_cooldown: 0,
            weapon: Weapon::default(),
            wanted_level: 0.0,
            wanted_decay_cooldown: 0,
        }
    }
}

impl Player {
    /// Raise the wanted level and push the decay delay back out. Every crime
    /// goes through here so decay never runs concurrently with fresh heat.
    pub fn raise_wanted(&mut self, amount: f32) {
        self.wanted_level += amount;
        self.wanted_decay_cooldown = WANTED_DECAY_DELAY;
    }

    pub fn in_vehicle(&self) -> bool {
        self.vehicle.is_some()
    }
}

/// Per-tick player input. Movement axes are in `[-1, 1]` (screen
/// coordinates, y down); the action flags are consumed by [`player_control`].
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct PlayerIntent {
    pub move_x: f32,
    pub move_y: f32,
    pub enter_exit: bool,
    pub shoot: bool,
}

/// Applies this tick's [`PlayerIntent`]: walk or steer, handle vehicle
/// entry/exit, fire the weapon.
pub fn player_control(
    map: Res<CityMap>,
    mut intent: ResMut<PlayerIntent>,
    mut players: Query<(&mut Player, &mut Position)>,
    mut vehicles: Query<
        (Entity, &Position, &mut Vehicle, &mut VehicleControls, Option<&Police>),
        Without<Player>,
    >,
    mut messages: EventWriter<GameMessage>,
) {
    let Ok((mut player, mut pos)) = players.get_single_mut() else {
        return;
    };

    let enter_exit = std::mem::take(&mut intent.enter_exit);
    let shoot = std::mem::take(&mut intent.shoot);

    if enter_exit {
        if let Some(vehicle_ent) = player.vehicle {
            // Exit: step out along the vehicle's heading and let go of the
            // controls so the car coasts to a stop.
            if let Ok((_, vpos, vehicle, mut controls, _)) = vehicles.get_mut(vehicle_ent) {
                let rad = vehicle.rotation.to_radians();
                pos.x = vpos.x + rad.cos() * VEHICLE_EXIT_OFFSET;
                pos.y = vpos.y + rad.sin() * VEHICLE_EXIT_OFFSET;
                *controls = VehicleControls::default();
            }
            player.vehicle = None;
            player.vehicle_cooldown = VEHICLE_REENTRY_COOLDOWN;
        } else if player.vehicle_cooldown == 0 {
            if let Some(target) = nearest_vehicle(&pos, &vehicles) {
                let Ok((_, _, mut vehicle, _, police)) = vehicles.get_mut(target) else {
                    return;
                };
                // Stealing a civilian car is a crime exactly once per car.
                if police.is_none() && !vehicle.stolen {
                    vehicle.stolen = true;
                    player.raise_wanted(WANTED_THEFT);
                    messages.send(GameMessage::new("Vehicle stolen!"));
                }
                player.vehicle = Some(target);
                player.vehicle_cooldown = VEHICLE_REENTRY_COOLDOWN;
            }
        }
    }

    if let Some(vehicle_ent) = player.vehicle {
        if let Ok((_, _, _, mut controls, _)) = vehicles.get_mut(vehicle_ent) {
            // Up on the stick is throttle; screen y grows downward.
            controls.forward = (-intent.move_y).clamp(-1.0, 1.0);
            controls.turn = intent.move_x.clamp(-1.0, 1.0);
        }
        player.moving = false;
        return;
    }

    let dx = intent.move_x * player.speed;
    let dy = intent.move_y * player.speed;
    if dx != 0.0 || dy != 0.0 {
        player.facing = Direction::from_delta(dx, dy);
        player.moving = true;
        player.anim_counter += 1;
        if player.anim_counter % WALK_CYCLE_PERIOD == 0 {
            player.anim_frame = (player.anim_frame + 1) % WALK_CYCLE_FRAMES;
        }
        let (nx, ny) = slide_move(&map, pos.x, pos.y, PLAYER_HALF_SIZE, dx, dy);
        pos.x = nx;
        pos.y = ny;
    } else {
        player.moving = false;
    }

    if shoot {
        fire(&mut player, &pos);
    }
}

fn nearest_vehicle(
    pos: &Position,
    vehicles: &Query<
        (Entity, &Position, &mut Vehicle, &mut VehicleControls, Option<&Police>),
        Without<Player>,
    >,
) -> Option<Entity> {
    let mut best: Option<(Entity, f32)> = None;
    for (ent, vpos, _, _, _) in vehicles.iter() {
        let d = distance(pos.x, pos.y, vpos.x, vpos.y);
        if d <= VEHICLE_ENTRY_RANGE && best.map_or(true, |(_, bd)| d < bd) {
            best = Some((ent, d));
        }
    }
    best.map(|(ent, _)| ent)
}

fn fire(player: &mut Player, pos: &Position) {
    if !player.weapon.armed || player.weapon.cooldown > 0 {
        return;
    }
    let (fx, fy) = player.facing.offset();
    player.weapon.bullets.push(Bullet {
        x: pos.x + fx * BULLET_SPAWN_OFFSET,
        y: pos.y + fy * BULLET_SPAWN_OFFSET,
        vx: fx * BULLET_SPEED,
        vy: fy * BULLET_SPEED,
        life: BULLET_LIFE,
    });
    player.weapon.cooldown = SHOOT_COOLDOWN;
    player.raise_wanted(WANTED_GUNSHOT);
}

/// Per-tick player bookkeeping: cooldowns, bullet flight, wanted decay.
pub fn update_player(map: Res<CityMap>, mut players: Query<&mut Player>) {
    let Ok(mut player) = players.get_single_mut() else {
        return;
    };

    if player.vehicle_cooldown > 0 {
        player.vehicle_cooldown -= 1;
    }
    if player.weapon.cooldown > 0 {
        player.weapon.cooldown -= 1;
    }

    player.weapon.bullets.retain_mut(|b| {
        b.x += b.vx;
        b.y += b.vy;
        b.life = b.life.saturating_sub(1);
        b.life > 0 && !map.collides_wall(&Rect::centered(b.x, b.y, BULLET_HALF_SIZE))
    });

    if player.wanted_level > 0.0 {
        if player.wanted_decay_cooldown > 0 {
            player.wanted_decay_cooldown -= 1;
        } else {
            player.wanted_level = (player.wanted_level - WANTED_DECAY_RATE).max(0.0);
        }
    }
}

/// While driving, the player's position and facing mirror the vehicle. Runs
/// after physics so the mirror sees this tick's movement.
pub fn sync_player_to_vehicle(
    mut players: Query<(&mut Player, &mut Position)>,
    vehicles: Query<(&Vehicle, &Position), Without<Player>>,
) {
    let Ok((mut player, mut pos)) = players.get_single_mut() else {
        return;
    };
    let Some(vehicle_ent) = player.vehicle else {
        return;
    };
    match vehicles.get(vehicle_ent) {
        Ok((vehicle, vpos)) => {
            pos.x = vpos.x;
            pos.y = vpos.y;
            player.facing = Direction::from_rotation(vehicle.rotation);
        }
        // Vehicle despawned out from under us.
        Err(_) => player.vehicle = None,
    }
}

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<PlayerIntent>();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raise_wanted_resets_decay_delay() {
        let mut player = Player::default();
        player.wanted_decay_cooldown = 5;
        player.raise_wanted(1.0);
        assert_eq!(player.wanted_level, 1.0);
        assert_eq!(player.wanted_decay_cooldown, WANTED_DECAY_DELAY);
    }

    #[test]
    fn test_fire_requires_arming_and_cooldown() {
        let pos = Position::new(100.0, 100.0);
        let mut player = Player::default();
        fire(&mut player, &pos);
        assert!(player.weapon.bullets.is_empty());

        player.weapon.armed = true;
        fire(&mut player, &pos);
        assert_eq!(player.weapon.bullets.len(), 1);
        assert_eq!(player.weapon.cooldown, SHOOT_COOLDOWN);

        // Still cooling down: no second bullet.
        fire(&mut player, &pos);
        assert_eq!(player.weapon.bullets.len(), 1);
    }

    #[test]
    fn test_fire_spawns_bullet_along_facing() {
        let pos = Position::new(100.0, 100.0);
        let mut player = Player {
            facing: Direction::Up,
            ..Default::default()
        };
        player.weapon.armed = true;
        fire(&mut player, &pos);
        let b = &player.weapon.bullets[0];
        assert_eq!((b.x, b.y), (100.0, 100.0 - BULLET_SPAWN_OFFSET));
        assert_eq!((b.vx, b.vy), (0.0, -BULLET_SPEED));
        assert_eq!(b.life, BULLET_LIFE);
    }
}
