//! Headless demo driver: runs the simulation for a minute of game time with
//! a scripted player, printing notifications and periodic world summaries.

use bevy::prelude::*;

use simulation::notifications::MessageLog;
use simulation::player::PlayerIntent;
use simulation::snapshot;
use simulation::SimulationPlugin;

const DEMO_TICKS: u32 = 3600; // one minute at 60 Hz
const SUMMARY_INTERVAL: u32 = 600;

fn main() {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins).add_plugins(SimulationPlugin);
    app.finish();
    app.cleanup();
    // First update runs Startup and lays out the city.
    app.update();

    let mut shown: Vec<String> = Vec::new();
    for tick in 1..=DEMO_TICKS {
        script_player(&mut app, tick);
        app.world_mut().run_schedule(FixedUpdate);

        let active = app.world().resource::<MessageLog>().active_texts();
        for text in &active {
            if !shown.contains(text) {
                println!("[{tick:>5}] {text}");
            }
        }
        shown = active;

        if tick % SUMMARY_INTERVAL == 0 {
            print_summary(&mut app);
        }
    }

    let snap = snapshot::capture(app.world_mut());
    match serde_json::to_string_pretty(&snap) {
        Ok(json) => println!("{json}"),
        Err(err) => eprintln!("snapshot serialization failed: {err}"),
    }
}

/// A loose script: loiter to bait the event scheduler, stroll, loiter again.
fn script_player(app: &mut App, tick: u32) {
    let mut intent = app.world_mut().resource_mut::<PlayerIntent>();
    match tick {
        0..=400 => {
            intent.move_x = 0.0;
            intent.move_y = 0.0;
        }
        401..=700 => {
            intent.move_x = 1.0;
            intent.move_y = 0.0;
        }
        701..=1000 => {
            intent.move_x = 0.0;
            intent.move_y = 1.0;
        }
        _ => {
            intent.move_x = 0.0;
            intent.move_y = 0.0;
        }
    }
    // Try the nearest car once while out on the stroll.
    if tick == 650 {
        intent.enter_exit = true;
    }
}

fn print_summary(app: &mut App) {
    let snap = snapshot::capture(app.world_mut());
    let (px, py, wanted) = snap
        .player
        .as_ref()
        .map(|p| (p.x, p.y, p.wanted_level))
        .unwrap_or_default();
    let live = snap.pedestrians.iter().filter(|p| !p.dead).count();
    let chasing = snap
        .vehicles
        .iter()
        .filter(|v| v.pursuit.as_ref().is_some_and(|p| p.siren_active))
        .count();
    println!(
        "[{:>5}] player ({px:.0}, {py:.0}) wanted {wanted:.2} | {} vehicles ({chasing} in pursuit) | {live} pedestrians",
        snap.tick,
        snap.vehicles.len(),
    );
}
