//! Simulation tuning constants.
//!
//! All distances are in world units (pixels in the original art scale), all
//! times in fixed-update ticks at [`TICK_HZ`].

pub const TICK_HZ: f64 = 60.0;

pub const WORLD_WIDTH: f32 = 2400.0;
pub const WORLD_HEIGHT: f32 = 1800.0;

// City block layout used by the default map: roads every BLOCK_SIZE units,
// ROAD_WIDTH wide, buildings filling the space between.
pub const BLOCK_SIZE: f32 = 320.0;
pub const ROAD_WIDTH: f32 = 120.0;
pub const WALL_THICKNESS: f32 = 20.0;

// Player
pub const PLAYER_SPEED: f32 = 3.0;
pub const PLAYER_HALF_SIZE: f32 = 15.0;
pub const WALK_CYCLE_FRAMES: u32 = 4;
pub const WALK_CYCLE_PERIOD: u32 = 10;

// Vehicles
pub const VEHICLE_HALF_SIZE: f32 = 22.0;
pub const VEHICLE_MAX_SPEED: f32 = 8.0;
pub const VEHICLE_ACCEL: f32 = 0.2;
pub const VEHICLE_DECEL: f32 = 0.15;
pub const VEHICLE_TURN_RATE: f32 = 4.0;
pub const VEHICLE_ENTRY_RANGE: f32 = 50.0;
pub const VEHICLE_REENTRY_COOLDOWN: u32 = 30;
pub const VEHICLE_EXIT_OFFSET: f32 = 48.0;

// SWAT overrides (event spawns)
pub const SWAT_SPEED_MULTIPLIER: f32 = 1.3;
pub const SWAT_AGGRESSION: f32 = 2.0;

// Weapon
pub const SHOOT_COOLDOWN: u32 = 20;
pub const BULLET_SPEED: f32 = 12.0;
pub const BULLET_LIFE: u32 = 45;
pub const BULLET_SPAWN_OFFSET: f32 = 20.0;
pub const BULLET_HALF_SIZE: f32 = 3.0;

// Wanted level
pub const WANTED_THEFT: f32 = 1.0;
pub const WANTED_GUNSHOT: f32 = 0.2;
pub const WANTED_PED_SHOT: f32 = 2.0;
pub const WANTED_RUN_OVER: f32 = 1.0;
pub const WANTED_DECAY_RATE: f32 = 0.01;
pub const WANTED_DECAY_DELAY: u32 = 300;

// Pedestrians
pub const PED_HALF_SIZE: f32 = 12.0;
pub const PED_WANDER_SPEED: f32 = 1.0;
pub const PED_FLEE_MULTIPLIER: f32 = 1.5;
pub const PED_POPULATION_FLOOR: usize = 30;
pub const PED_CORPSE_TICKS: u32 = 600;
pub const FLEE_PLAYER_RANGE: f32 = 150.0;
pub const FLEE_VEHICLE_RANGE: f32 = 80.0;
pub const FLEE_VEHICLE_SPEED: f32 = 3.0;
pub const LETHAL_VEHICLE_SPEED: f32 = 2.0;
pub const PED_REDIRECT_CHANCE: f32 = 0.3;
pub const FLEE_ESCAPE_CHANCE: f32 = 0.2;

// Police
pub const CHASE_ENTER_RANGE: f32 = 500.0;
pub const CHASE_EXIT_RANGE: f32 = 800.0;
pub const SIREN_PHASE_TICKS: u32 = 15;
pub const CHASE_TURN_DEADZONE: f32 = 10.0;
pub const PATROL_THROTTLE: f32 = 0.5;
pub const PATROL_STEER_THROTTLE: f32 = 0.35;
pub const OFFROAD_THROTTLE: f32 = 0.25;

// Escalating events
pub const REGION_SIZE: f32 = 300.0;
pub const DWELL_THRESHOLD: u32 = 300;
pub const EVENT_COOLDOWN: u32 = 600;
pub const MAX_ACTIVE_EVENTS: usize = 3;

// Bounded retry for spawn placement; exhausted retries skip the spawn.
pub const SPAWN_RETRY_LIMIT: u32 = 10;

// Notifications
pub const MESSAGE_TICKS: u32 = 180;
