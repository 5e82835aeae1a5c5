//! Read-only world snapshot for frontends.
//!
//! The renderer, HUD, and any remote viewer consume one [`WorldSnapshot`]
//! per frame instead of poking at ECS internals. Everything here is plain
//! serializable data.

use bevy::prelude::*;
use serde::Serialize;

use crate::events::ActiveEffects;
use crate::movement::{Direction, Position};
use crate::notifications::MessageLog;
use crate::pedestrian::{Palette, PedKind, PedState, Pedestrian};
use crate::player::{Bullet, Player};
use crate::police::{Police, PursuitState};
use crate::vehicle::Vehicle;
use crate::TickCounter;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub facing: Direction,
    pub moving: bool,
    pub anim_frame: u32,
    pub in_vehicle: bool,
    pub armed: bool,
    pub wanted_level: f32,
    pub bullets: Vec<Bullet>,
}

#[derive(Debug, Clone, Serialize)]
pub struct VehicleView {
    pub x: f32,
    pub y: f32,
    pub rotation: f32,
    pub velocity: f32,
    pub stolen: bool,
    /// Present for police units only.
    pub pursuit: Option<PursuitView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PursuitView {
    pub state: PursuitState,
    pub siren_active: bool,
    pub siren_phase: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PedestrianView {
    pub x: f32,
    pub y: f32,
    pub kind: PedKind,
    pub state: PedState,
    pub dead: bool,
    pub palette: Palette,
}

#[derive(Debug, Clone, Serialize)]
pub struct WorldSnapshot {
    pub tick: u64,
    pub player: Option<PlayerView>,
    pub vehicles: Vec<VehicleView>,
    pub pedestrians: Vec<PedestrianView>,
    pub strange_lights: bool,
    pub honking: bool,
    pub messages: Vec<String>,
}

/// Capture the current frame. Takes `&mut World` only for query construction;
/// nothing is mutated.
pub fn capture(world: &mut World) -> WorldSnapshot {
    let tick = world.resource::<TickCounter>().0;
    let effects = *world.resource::<ActiveEffects>();
    let messages = world.resource::<MessageLog>().active_texts();

    let player = world
        .query::<(&Player, &Position)>()
        .get_single(world)
        .ok()
        .map(|(p, pos)| PlayerView {
            x: pos.x,
            y: pos.y,
            facing: p.facing,
            moving: p.moving,
            anim_frame: p.anim_frame,
            in_vehicle: p.in_vehicle(),
            armed: p.weapon.armed,
            wanted_level: p.wanted_level,
            bullets: p.weapon.bullets.clone(),
        });

    let vehicles = world
        .query::<(&Vehicle, &Position, Option<&Police>)>()
        .iter(world)
        .map(|(v, pos, police)| VehicleView {
            x: pos.x,
            y: pos.y,
            rotation: v.rotation,
            velocity: v.velocity,
            stolen: v.stolen,
            pursuit: police.map(|p| PursuitView {
                state: p.state,
                siren_active: p.siren_active,
                siren_phase: p.siren_phase,
            }),
        })
        .collect();

    let pedestrians = world
        .query::<(&Pedestrian, &Position)>()
        .iter(world)
        .map(|(ped, pos)| PedestrianView {
            x: pos.x,
            y: pos.y,
            kind: ped.kind,
            state: ped.state,
            dead: ped.dead,
            palette: ped.palette,
        })
        .collect();

    WorldSnapshot {
        tick,
        player,
        vehicles,
        pedestrians,
        strange_lights: effects.strange_lights > 0,
        honking: effects.honking > 0,
        messages,
    }
}
