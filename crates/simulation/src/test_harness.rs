//! # TestCity — headless integration test harness
//!
//! Wraps `bevy::app::App` + `SimulationPlugin` for driving the simulation in
//! tests without a window or renderer. The default scene is an open map with
//! perimeter walls, a region grid, and one player; tests spawn everything
//! else themselves.

use bevy::app::App;
use bevy::prelude::*;

use crate::city_map::CityMap;
use crate::config::{WORLD_HEIGHT, WORLD_WIDTH};
use crate::events::{ActiveEvents, EventScheduler};
use crate::movement::Position;
use crate::notifications::MessageLog;
use crate::pedestrian::{PedKind, Pedestrian};
use crate::player::{Player, PlayerIntent};
use crate::police::{patrol_unit, swat_unit, Police};
use crate::regions::{RegionGrid, RegionType};
use crate::vehicle::{Vehicle, VehicleControls};
use crate::world_init::SkipWorldInit;
use crate::SimulationPlugin;

pub struct TestCity {
    pub app: App,
}

impl Default for TestCity {
    fn default() -> Self {
        Self::new()
    }
}

impl TestCity {
    /// An open city (perimeter walls only, no roads or buildings) with a
    /// player standing at the center.
    pub fn new() -> Self {
        let mut city = Self::empty();
        city.app
            .world_mut()
            .spawn((Player::default(), Position::new(WORLD_WIDTH / 2.0, WORLD_HEIGHT / 2.0)));
        city
    }

    /// Same scene without a player, for tests that build their own.
    pub fn empty() -> Self {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        // Insert the marker BEFORE SimulationPlugin so init_world skips.
        app.insert_resource(SkipWorldInit);
        app.add_plugins(SimulationPlugin);
        let map = CityMap::open(WORLD_WIDTH, WORLD_HEIGHT);
        app.insert_resource(RegionGrid::from_map(&map));
        app.insert_resource(map);
        // Run one update so Startup systems execute (init_world will no-op).
        app.update();
        Self { app }
    }

    // -----------------------------------------------------------------------
    // Simulation
    // -----------------------------------------------------------------------

    /// Run N fixed-update ticks by executing the `FixedUpdate` schedule
    /// directly, sidestepping the time system entirely.
    pub fn tick(&mut self, n: u32) {
        for _ in 0..n {
            self.app.world_mut().run_schedule(FixedUpdate);
        }
    }

    pub fn world_mut(&mut self) -> &mut World {
        self.app.world_mut()
    }

    pub fn resource<T: Resource>(&self) -> &T {
        self.app.world().resource::<T>()
    }

    pub fn resource_mut<T: Resource>(&mut self) -> Mut<'_, T> {
        self.app.world_mut().resource_mut::<T>()
    }

    // -----------------------------------------------------------------------
    // Scene building
    // -----------------------------------------------------------------------

    pub fn spawn_vehicle(&mut self, x: f32, y: f32) -> Entity {
        self.app
            .world_mut()
            .spawn((Vehicle::default(), VehicleControls::default(), Position::new(x, y)))
            .id()
    }

    pub fn spawn_police(&mut self, x: f32, y: f32) -> Entity {
        self.app.world_mut().spawn(patrol_unit(x, y)).id()
    }

    pub fn spawn_swat(&mut self, x: f32, y: f32) -> Entity {
        self.app.world_mut().spawn(swat_unit(x, y)).id()
    }

    pub fn spawn_pedestrian(&mut self, kind: PedKind, x: f32, y: f32) -> Entity {
        self.app
            .world_mut()
            .spawn((Pedestrian::of_kind(kind), Position::new(x, y)))
            .id()
    }

    /// Paint every region cell with one district type, so dwell tests know
    /// exactly which templates are eligible.
    pub fn set_all_regions(&mut self, ty: RegionType) {
        let mut grid = self.resource_mut::<RegionGrid>();
        for slot in grid.types.iter_mut() {
            *slot = ty;
        }
    }

    // -----------------------------------------------------------------------
    // Input
    // -----------------------------------------------------------------------

    pub fn set_move(&mut self, x: f32, y: f32) {
        let mut intent = self.resource_mut::<PlayerIntent>();
        intent.move_x = x;
        intent.move_y = y;
    }

    pub fn press_enter_exit(&mut self) {
        self.resource_mut::<PlayerIntent>().enter_exit = true;
    }

    pub fn press_shoot(&mut self) {
        self.resource_mut::<PlayerIntent>().shoot = true;
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    pub fn player(&mut self) -> Player {
        let world = self.app.world_mut();
        world
            .query::<&Player>()
            .get_single(world)
            .expect("scene has a player")
            .clone()
    }

    pub fn player_entity(&mut self) -> Entity {
        let world = self.app.world_mut();
        world
            .query_filtered::<Entity, With<Player>>()
            .get_single(world)
            .expect("scene has a player")
    }

    pub fn player_pos(&mut self) -> (f32, f32) {
        let world = self.app.world_mut();
        let pos = world
            .query_filtered::<&Position, With<Player>>()
            .get_single(world)
            .expect("scene has a player");
        (pos.x, pos.y)
    }

    pub fn set_player_pos(&mut self, x: f32, y: f32) {
        let world = self.app.world_mut();
        let mut pos = world
            .query_filtered::<&mut Position, With<Player>>()
            .get_single_mut(world)
            .expect("scene has a player");
        pos.x = x;
        pos.y = y;
    }

    pub fn edit_player(&mut self, edit: impl FnOnce(&mut Player)) {
        let world = self.app.world_mut();
        let mut player = world
            .query::<&mut Player>()
            .get_single_mut(world)
            .expect("scene has a player");
        edit(&mut player);
    }

    pub fn vehicle(&mut self, entity: Entity) -> Vehicle {
        self.app
            .world()
            .get::<Vehicle>(entity)
            .expect("entity has a Vehicle")
            .clone()
    }

    pub fn police(&mut self, entity: Entity) -> Police {
        self.app
            .world()
            .get::<Police>(entity)
            .expect("entity has a Police")
            .clone()
    }

    pub fn pedestrian(&mut self, entity: Entity) -> Option<Pedestrian> {
        self.app.world().get::<Pedestrian>(entity).cloned()
    }

    pub fn position(&mut self, entity: Entity) -> (f32, f32) {
        let pos = self
            .app
            .world()
            .get::<Position>(entity)
            .expect("entity has a Position");
        (pos.x, pos.y)
    }

    pub fn live_pedestrian_count(&mut self) -> usize {
        let world = self.app.world_mut();
        world
            .query::<&Pedestrian>()
            .iter(world)
            .filter(|p| !p.dead)
            .count()
    }

    pub fn active_event_count(&self) -> usize {
        self.resource::<ActiveEvents>().0.len()
    }

    pub fn event_cooldown(&self) -> u32 {
        self.resource::<EventScheduler>().cooldown
    }

    pub fn messages(&self) -> Vec<String> {
        self.resource::<MessageLog>().active_texts()
    }
}
