//! Vehicle entry/exit and driving through the full tick.

use crate::config::{VEHICLE_EXIT_OFFSET, VEHICLE_REENTRY_COOLDOWN};
use crate::test_harness::TestCity;

#[test]
fn stealing_and_driving_moves_player_with_vehicle() {
    let mut city = TestCity::new();
    let (px, py) = city.player_pos();
    let car = city.spawn_vehicle(px + 30.0, py);

    city.press_enter_exit();
    city.tick(1);
    let player = city.player();
    assert_eq!(player.vehicle, Some(car));
    assert!(city.vehicle(car).stolen);

    // Hold the throttle; rotation 0 means +X.
    city.set_move(0.0, -1.0);
    city.tick(30);
    let (cx, cy) = city.position(car);
    assert!(cx > px + 50.0, "vehicle barely moved: {cx}");
    assert_eq!(cy, py);
    assert_eq!(city.player_pos(), (cx, cy));
}

#[test]
fn exiting_steps_out_along_heading_and_starts_cooldown() {
    let mut city = TestCity::new();
    let (px, py) = city.player_pos();
    let car = city.spawn_vehicle(px + 30.0, py);
    city.press_enter_exit();
    city.tick(1);

    city.press_enter_exit();
    city.tick(1);
    let player = city.player();
    assert_eq!(player.vehicle, None);
    let (cx, cy) = city.position(car);
    let (x, y) = city.player_pos();
    assert!((x - (cx + VEHICLE_EXIT_OFFSET)).abs() < 1e-3);
    assert_eq!(y, cy);
    // One tick has already elapsed since the cooldown was set.
    assert_eq!(player.vehicle_cooldown, VEHICLE_REENTRY_COOLDOWN - 1);
}

#[test]
fn reentry_blocked_until_cooldown_elapses() {
    let mut city = TestCity::new();
    let (px, py) = city.player_pos();
    city.spawn_vehicle(px + 30.0, py);
    city.press_enter_exit();
    city.tick(1);
    city.press_enter_exit();
    city.tick(1);

    // Still cooling down: the press is swallowed.
    city.press_enter_exit();
    city.tick(1);
    assert_eq!(city.player().vehicle, None);

    city.tick(VEHICLE_REENTRY_COOLDOWN);
    city.press_enter_exit();
    city.tick(1);
    assert!(city.player().vehicle.is_some());
}

#[test]
fn police_cars_cannot_be_stolen() {
    let mut city = TestCity::new();
    let (px, py) = city.player_pos();
    let cruiser = city.spawn_police(px + 30.0, py);

    city.press_enter_exit();
    city.tick(1);
    let player = city.player();
    // The player can commandeer the cruiser, but it is no crime.
    assert_eq!(player.vehicle, Some(cruiser));
    assert!(!city.vehicle(cruiser).stolen);
    assert_eq!(player.wanted_level, 0.0);
}

#[test]
fn stealing_again_is_not_a_second_crime() {
    let mut city = TestCity::new();
    let (px, py) = city.player_pos();
    city.spawn_vehicle(px + 30.0, py);
    city.press_enter_exit();
    city.tick(1);
    assert_eq!(city.player().wanted_level, 1.0);

    city.press_enter_exit();
    city.tick(1);
    city.tick(VEHICLE_REENTRY_COOLDOWN);
    city.press_enter_exit();
    city.tick(1);
    let player = city.player();
    assert!(player.vehicle.is_some());
    assert_eq!(player.wanted_level, 1.0);
}
