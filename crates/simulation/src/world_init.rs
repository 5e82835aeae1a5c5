//! Default world setup: the grid city, the player, and some starting
//! traffic. Tests insert [`SkipWorldInit`] and build their own scenes.

use bevy::prelude::*;
use rand::Rng;

use crate::city_map::CityMap;
use crate::config::{
    PED_HALF_SIZE, PED_POPULATION_FLOOR, PLAYER_HALF_SIZE, VEHICLE_HALF_SIZE, WORLD_HEIGHT,
    WORLD_WIDTH,
};
use crate::movement::Position;
use crate::pedestrian::{PedKind, Pedestrian};
use crate::player::Player;
use crate::police::patrol_unit;
use crate::regions::RegionGrid;
use crate::sim_rng::SimRng;
use crate::vehicle::{Vehicle, VehicleControls};

/// Marker resource: when present, [`init_world`] does nothing.
#[derive(Resource, Default)]
pub struct SkipWorldInit;

const STARTING_VEHICLES: usize = 6;
const STARTING_POLICE: usize = 2;

pub fn init_world(
    mut commands: Commands,
    mut rng: ResMut<SimRng>,
    skip: Option<Res<SkipWorldInit>>,
    existing_map: Option<Res<CityMap>>,
) {
    if skip.is_some() {
        return;
    }
    match existing_map {
        // An externally supplied map (a frontend with its own generator)
        // wins, but region typing and the starting cast still derive from
        // it; otherwise the event scheduler has no districts to read.
        Some(map) => {
            commands.insert_resource(RegionGrid::from_map(&map));
            let spot = map
                .find_clear_spot(&mut rng.0, PLAYER_HALF_SIZE)
                .unwrap_or((map.width * 0.5, map.height * 0.5));
            spawn_starting_actors(&mut commands, &map, &mut rng, spot);
        }
        None => {
            let map = CityMap::grid_layout(WORLD_WIDTH, WORLD_HEIGHT);
            commands.insert_resource(RegionGrid::from_map(&map));
            // The road strip near the middle of town.
            spawn_starting_actors(&mut commands, &map, &mut rng, (1020.0, 900.0));
            commands.insert_resource(map);
        }
    }
}

fn spawn_starting_actors(
    commands: &mut Commands,
    map: &CityMap,
    rng: &mut SimRng,
    player_spot: (f32, f32),
) {
    commands.spawn((Player::default(), Position::new(player_spot.0, player_spot.1)));

    for _ in 0..STARTING_VEHICLES {
        if let Some((x, y)) = map.find_clear_spot(&mut rng.0, VEHICLE_HALF_SIZE) {
            let rotation = if rng.0.gen_bool(0.5) { 0.0 } else { 90.0 };
            commands.spawn((
                Vehicle {
                    rotation,
                    ..Default::default()
                },
                VehicleControls::default(),
                Position::new(x, y),
            ));
        }
    }

    for _ in 0..STARTING_POLICE {
        if let Some((x, y)) = map.find_clear_spot(&mut rng.0, VEHICLE_HALF_SIZE) {
            commands.spawn(patrol_unit(x, y));
        }
    }

    for _ in 0..PED_POPULATION_FLOOR {
        if let Some((x, y)) = map.find_clear_spot(&mut rng.0, PED_HALF_SIZE) {
            commands.spawn((Pedestrian::of_kind(PedKind::Civilian), Position::new(x, y)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Rect;
    use crate::SimulationPlugin;

    #[test]
    fn test_player_start_is_clear_of_walls() {
        let map = CityMap::grid_layout(WORLD_WIDTH, WORLD_HEIGHT);
        let body = Rect::centered(1020.0, 900.0, PLAYER_HALF_SIZE);
        assert!(!map.collides_wall(&body));
    }

    #[test]
    fn test_external_map_still_gets_regions_and_actors() {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins);
        app.insert_resource(CityMap::open(900.0, 900.0));
        app.add_plugins(SimulationPlugin);
        app.update();

        let grid = app.world().resource::<RegionGrid>();
        assert_eq!((grid.cols, grid.rows), (3, 3));
        let world = app.world_mut();
        assert_eq!(world.query::<&Player>().iter(world).count(), 1);
        assert!(world.query::<&Pedestrian>().iter(world).count() > 0);
    }
}
