use bevy::prelude::*;

pub mod city_map;
pub mod config;
pub mod events;
pub mod geometry;
pub mod movement;
pub mod notifications;
pub mod pedestrian;
pub mod player;
pub mod police;
pub mod regions;
pub mod sim_rng;
pub mod snapshot;
pub mod vehicle;
pub mod world_init;

#[cfg(test)]
pub mod test_harness;

use config::TICK_HZ;

/// Global tick counter incremented each FixedUpdate. All gameplay timers
/// count in these ticks.
#[derive(Resource, Default)]
pub struct TickCounter(pub u64);

fn advance_tick(mut tick: ResMut<TickCounter>) {
    tick.0 += 1;
}

pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .init_resource::<TickCounter>()
            .init_resource::<regions::RegionGrid>()
            .add_plugins((
                sim_rng::SimRngPlugin,
                player::PlayerPlugin,
                notifications::NotificationsPlugin,
                events::EventsPlugin,
            ))
            .add_systems(Startup, world_init::init_world)
            // One tick, in a fixed order. The player resolves first so every
            // AI system observes a fully-updated player; police write their
            // driving controls before physics so they apply the same tick.
            .add_systems(
                FixedUpdate,
                (
                    advance_tick,
                    player::player_control,
                    player::update_player,
                    police::police_ai,
                    vehicle::vehicle_physics,
                    player::sync_player_to_vehicle,
                    pedestrian::pedestrian_ai,
                    pedestrian::pedestrian_deaths,
                    pedestrian::despawn_dead,
                    pedestrian::maintain_population,
                    events::update_event_scheduler,
                    events::tick_effects,
                    notifications::collect_messages,
                    notifications::expire_messages,
                )
                    .chain(),
            );
    }
}
