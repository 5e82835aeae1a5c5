//! Escalating events: the world reacts to the player lingering.
//!
//! Each tick the scheduler accumulates a dwell counter for the region the
//! player occupies. Crossing the dwell threshold (with the global cooldown
//! clear and a free event slot) picks a random template matching the
//! region's district type and starts a staged encounter at the player's
//! position. Stages run on timers and fire their actions the moment they
//! begin; the event is gone once its last stage times out.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use crate::city_map::CityMap;
use crate::config::{
    DWELL_THRESHOLD, EVENT_COOLDOWN, MAX_ACTIVE_EVENTS, PED_HALF_SIZE, VEHICLE_HALF_SIZE,
};
use crate::movement::Position;
use crate::notifications::GameMessage;
use crate::pedestrian::{PedKind, PedState, Pedestrian};
use crate::police::{patrol_unit, swat_unit};
use crate::player::Player;
use crate::regions::{RegionGrid, RegionType};
use crate::sim_rng::SimRng;
use crate::vehicle::{Vehicle, VehicleControls};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnKind {
    Police,
    Swat,
    Vehicle,
    Cultist,
    Mime,
    GangMember,
    RivalGang,
    AngryDriver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectKind {
    StrangeLights,
    MimeRage,
    Honking,
}

/// One thing a stage does when it begins.
#[derive(Debug, Clone)]
pub enum StageAction {
    Spawn {
        kind: SpawnKind,
        count: u32,
        /// Outer spawn radius; units land in the annulus `[0.5d, d]`.
        distance: f32,
    },
    Message(&'static str),
    Effect { kind: EffectKind, duration: u32 },
}

#[derive(Debug, Clone)]
pub struct Stage {
    pub description: &'static str,
    pub duration: u32,
    pub actions: Vec<StageAction>,
}

#[derive(Debug, Clone)]
pub struct EventTemplate {
    pub name: &'static str,
    pub trigger_regions: Vec<RegionType>,
    pub stages: Vec<Stage>,
}

/// The fixed set of encounter templates.
#[derive(Resource)]
pub struct EventCatalog {
    pub templates: Vec<EventTemplate>,
}

impl Default for EventCatalog {
    fn default() -> Self {
        default_catalog()
    }
}

/// Dwell bookkeeping and the global trigger cooldown. Dwell counters for
/// regions the player has left keep their value until the player returns.
#[derive(Resource, Default)]
pub struct EventScheduler {
    pub dwell: HashMap<usize, u32>,
    pub cooldown: u32,
}

#[derive(Debug, Clone)]
pub struct ActiveEvent {
    pub template_index: usize,
    pub stage: usize,
    pub remaining: u32,
    pub x: f32,
    pub y: f32,
}

#[derive(Resource, Default)]
pub struct ActiveEvents(pub Vec<ActiveEvent>);

/// Remaining ticks of the global ambience effects. `MimeRage` has no timer
/// here: it rewires the mimes once and they stay enraged.
#[derive(Resource, Default, Debug, Clone, Copy)]
pub struct ActiveEffects {
    pub strange_lights: u32,
    pub honking: u32,
}

pub fn default_catalog() -> EventCatalog {
    use EffectKind::*;
    use RegionType::*;
    use SpawnKind::*;
    use StageAction::*;

    let templates = vec![
        EventTemplate {
            name: "Police Escalation",
            trigger_regions: vec![Bank, PoliceStation, HighValue],
            stages: vec![
                Stage {
                    description: "Suspicious Activity Reported",
                    duration: 600,
                    actions: vec![
                        Spawn { kind: Police, count: 1, distance: 300.0 },
                        Message("Someone reported suspicious activity, eh!"),
                    ],
                },
                Stage {
                    description: "Police Investigation",
                    duration: 900,
                    actions: vec![
                        Spawn { kind: Police, count: 2, distance: 250.0 },
                        Message("The Mounties are investigating the area!"),
                    ],
                },
                Stage {
                    description: "SWAT Team Deployed",
                    duration: 1200,
                    actions: vec![
                        Spawn { kind: Police, count: 4, distance: 200.0 },
                        Spawn { kind: Swat, count: 2, distance: 350.0 },
                        Message("SWAT team has been deployed, buddy!"),
                    ],
                },
            ],
        },
        EventTemplate {
            name: "Cult Gathering",
            trigger_regions: vec![Alley, DarkArea, Forest],
            stages: vec![
                Stage {
                    description: "Strange Chanting",
                    duration: 600,
                    actions: vec![
                        Spawn { kind: Cultist, count: 3, distance: 200.0 },
                        Message("You hear strange chanting nearby..."),
                    ],
                },
                Stage {
                    description: "Cult Ritual",
                    duration: 900,
                    actions: vec![
                        Spawn { kind: Cultist, count: 5, distance: 180.0 },
                        Effect { kind: StrangeLights, duration: 900 },
                        Message("The cultists are performing some kind of ritual!"),
                    ],
                },
                Stage {
                    description: "Cult Hunt",
                    duration: 1200,
                    actions: vec![
                        Spawn { kind: Cultist, count: 8, distance: 150.0 },
                        Effect { kind: StrangeLights, duration: 1200 },
                        Message("The cultists have spotted you! They're coming for you, guy!"),
                    ],
                },
            ],
        },
        EventTemplate {
            name: "Mime Riot",
            trigger_regions: vec![Park, StreetCorner, Plaza],
            stages: vec![
                Stage {
                    description: "Street Performers",
                    duration: 600,
                    actions: vec![
                        Spawn { kind: Mime, count: 2, distance: 150.0 },
                        Message("Street performers are doing their thing..."),
                    ],
                },
                Stage {
                    description: "Mime Congregation",
                    duration: 900,
                    actions: vec![
                        Spawn { kind: Mime, count: 5, distance: 130.0 },
                        Message("More mimes are silently gathering..."),
                    ],
                },
                Stage {
                    description: "Silent Riot",
                    duration: 1200,
                    actions: vec![
                        Spawn { kind: Mime, count: 10, distance: 100.0 },
                        Effect { kind: MimeRage, duration: 1200 },
                        Message("The mimes are rioting! Silently but deadly!"),
                    ],
                },
            ],
        },
        EventTemplate {
            name: "Road Rage",
            trigger_regions: vec![Intersection, Highway, Road],
            stages: vec![
                Stage {
                    description: "Traffic Jam",
                    duration: 600,
                    actions: vec![
                        Spawn { kind: Vehicle, count: 4, distance: 200.0 },
                        Message("Traffic is backing up..."),
                    ],
                },
                Stage {
                    description: "Angry Drivers",
                    duration: 900,
                    actions: vec![
                        Spawn { kind: Vehicle, count: 6, distance: 180.0 },
                        Effect { kind: Honking, duration: 900 },
                        Message("Drivers are getting angry, friend!"),
                    ],
                },
                Stage {
                    description: "Road Rage Chaos",
                    duration: 1200,
                    actions: vec![
                        Spawn { kind: AngryDriver, count: 4, distance: 150.0 },
                        Spawn { kind: Vehicle, count: 8, distance: 130.0 },
                        Effect { kind: Honking, duration: 1200 },
                        Message("Full-on road rage! Cars are going crazy, guy!"),
                    ],
                },
            ],
        },
        EventTemplate {
            name: "Gang Activity",
            trigger_regions: vec![Alley, DarkArea, BadNeighborhood],
            stages: vec![
                Stage {
                    description: "Gang Members Appear",
                    duration: 600,
                    actions: vec![
                        Spawn { kind: GangMember, count: 3, distance: 200.0 },
                        Message("Some suspicious characters have spotted you..."),
                    ],
                },
                Stage {
                    description: "Gang Confrontation",
                    duration: 900,
                    actions: vec![
                        Spawn { kind: GangMember, count: 5, distance: 150.0 },
                        Message("The gang members are confronting you, buddy!"),
                    ],
                },
                Stage {
                    description: "Gang War",
                    duration: 1200,
                    actions: vec![
                        Spawn { kind: GangMember, count: 8, distance: 130.0 },
                        Spawn { kind: RivalGang, count: 6, distance: 200.0 },
                        Message("A full-on gang war has erupted!"),
                    ],
                },
            ],
        },
    ];
    EventCatalog { templates }
}

/// Advances active events, tracks player dwell, and triggers new encounters.
#[allow(clippy::too_many_arguments)]
pub fn update_event_scheduler(
    mut commands: Commands,
    map: Res<CityMap>,
    grid: Res<RegionGrid>,
    catalog: Res<EventCatalog>,
    mut scheduler: ResMut<EventScheduler>,
    mut active: ResMut<ActiveEvents>,
    mut effects: ResMut<ActiveEffects>,
    mut rng: ResMut<SimRng>,
    players: Query<&Position, With<Player>>,
    mut peds: Query<&mut Pedestrian>,
    mut messages: EventWriter<GameMessage>,
) {
    scheduler.cooldown = scheduler.cooldown.saturating_sub(1);

    // Advance running events; removals are applied after the pass.
    let mut finished = Vec::new();
    for (i, event) in active.0.iter_mut().enumerate() {
        event.remaining = event.remaining.saturating_sub(1);
        if event.remaining > 0 {
            continue;
        }
        let template = &catalog.templates[event.template_index];
        if event.stage + 1 < template.stages.len() {
            event.stage += 1;
            let stage = &template.stages[event.stage];
            event.remaining = stage.duration;
            execute_stage(
                stage, event.x, event.y, &mut commands, &map, &mut rng, &mut peds,
                &mut effects, &mut messages,
            );
        } else {
            finished.push(i);
        }
    }
    for i in finished.into_iter().rev() {
        active.0.remove(i);
    }

    // Dwell tracking for the player's current region.
    let Ok(pos) = players.get_single() else {
        return;
    };
    let Some(index) = grid.index_at(pos.x, pos.y) else {
        return;
    };
    let dwell = {
        let counter = scheduler.dwell.entry(index).or_insert(0);
        *counter += 1;
        *counter
    };

    if dwell < DWELL_THRESHOLD
        || scheduler.cooldown > 0
        || active.0.len() >= MAX_ACTIVE_EVENTS
    {
        return;
    }
    let Some(region_type) = grid.region_type(index) else {
        return;
    };
    let eligible: Vec<usize> = catalog
        .templates
        .iter()
        .enumerate()
        .filter(|(_, t)| t.trigger_regions.contains(&region_type))
        .map(|(i, _)| i)
        .collect();
    // No template fits this district: silent no-op, dwell keeps counting.
    if eligible.is_empty() {
        return;
    }

    let template_index = eligible[rng.0.gen_range(0..eligible.len())];
    let template = &catalog.templates[template_index];
    let stage = &template.stages[0];
    let event = ActiveEvent {
        template_index,
        stage: 0,
        remaining: stage.duration,
        x: pos.x,
        y: pos.y,
    };
    execute_stage(
        stage, event.x, event.y, &mut commands, &map, &mut rng, &mut peds, &mut effects,
        &mut messages,
    );
    active.0.push(event);
    scheduler.cooldown = EVENT_COOLDOWN;
    scheduler.dwell.insert(index, 0);
}

#[allow(clippy::too_many_arguments)]
fn execute_stage(
    stage: &Stage,
    x: f32,
    y: f32,
    commands: &mut Commands,
    map: &CityMap,
    rng: &mut SimRng,
    peds: &mut Query<&mut Pedestrian>,
    effects: &mut ActiveEffects,
    messages: &mut EventWriter<GameMessage>,
) {
    for action in &stage.actions {
        match action {
            StageAction::Spawn { kind, count, distance } => {
                for _ in 0..*count {
                    spawn_unit(commands, map, rng, *kind, x, y, *distance);
                }
            }
            StageAction::Message(text) => {
                messages.send(GameMessage::new(*text));
            }
            StageAction::Effect { kind, duration } => match kind {
                EffectKind::StrangeLights => {
                    effects.strange_lights = effects.strange_lights.max(*duration);
                }
                EffectKind::Honking => {
                    effects.honking = effects.honking.max(*duration);
                }
                EffectKind::MimeRage => {
                    for mut ped in peds.iter_mut() {
                        if ped.kind == PedKind::Mime && !ped.dead {
                            ped.state = PedState::Aggressive;
                            ped.wander_speed *= 1.5;
                        }
                    }
                }
            },
        }
    }
}

/// Place one unit in the annulus around the event origin. Placement is
/// bounded-retry; a crowded spot just skips the spawn.
fn spawn_unit(
    commands: &mut Commands,
    map: &CityMap,
    rng: &mut SimRng,
    kind: SpawnKind,
    x: f32,
    y: f32,
    distance: f32,
) {
    let half = match kind {
        SpawnKind::Police | SpawnKind::Swat | SpawnKind::Vehicle => VEHICLE_HALF_SIZE,
        _ => PED_HALF_SIZE,
    };
    let Some((sx, sy)) = map.find_clear_spot_near(&mut rng.0, x, y, distance * 0.5, distance, half)
    else {
        return;
    };
    match kind {
        SpawnKind::Police => {
            commands.spawn(patrol_unit(sx, sy));
        }
        SpawnKind::Swat => {
            commands.spawn(swat_unit(sx, sy));
        }
        SpawnKind::Vehicle => {
            commands.spawn((
                Vehicle::default(),
                VehicleControls::default(),
                Position::new(sx, sy),
            ));
        }
        SpawnKind::Cultist => {
            commands.spawn((Pedestrian::of_kind(PedKind::Cultist), Position::new(sx, sy)));
        }
        SpawnKind::Mime => {
            commands.spawn((Pedestrian::of_kind(PedKind::Mime), Position::new(sx, sy)));
        }
        SpawnKind::GangMember => {
            commands.spawn((Pedestrian::of_kind(PedKind::GangRed), Position::new(sx, sy)));
        }
        SpawnKind::RivalGang => {
            commands.spawn((Pedestrian::of_kind(PedKind::GangBlue), Position::new(sx, sy)));
        }
        SpawnKind::AngryDriver => {
            commands.spawn((
                Pedestrian::of_kind(PedKind::AngryDriver),
                Position::new(sx, sy),
            ));
        }
    }
}

/// Counts down the timed ambience effects.
pub fn tick_effects(mut effects: ResMut<ActiveEffects>) {
    effects.strange_lights = effects.strange_lights.saturating_sub(1);
    effects.honking = effects.honking.saturating_sub(1);
}

pub struct EventsPlugin;

impl Plugin for EventsPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<EventCatalog>()
            .init_resource::<EventScheduler>()
            .init_resource::<ActiveEvents>()
            .init_resource::<ActiveEffects>();
    }
}
