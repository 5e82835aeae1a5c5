//! Wanted-level accumulation and decay.

use crate::config::{WANTED_DECAY_DELAY, WANTED_GUNSHOT};
use crate::test_harness::TestCity;

#[test]
fn theft_flow_raises_wanted_and_announces() {
    let mut city = TestCity::new();
    let (px, py) = city.player_pos();
    let car = city.spawn_vehicle(px + 40.0, py);

    assert_eq!(city.player().wanted_level, 0.0);
    city.press_enter_exit();
    city.tick(1);

    let player = city.player();
    assert_eq!(player.vehicle, Some(car));
    assert!(city.vehicle(car).stolen);
    assert_eq!(player.wanted_level, 1.0);
    assert!(city
        .messages()
        .iter()
        .any(|m| m.contains("stolen")));
}

#[test]
fn shooting_raises_wanted_a_little() {
    let mut city = TestCity::new();
    city.edit_player(|p| p.weapon.armed = true);
    city.press_shoot();
    city.tick(1);
    let player = city.player();
    assert!((player.wanted_level - WANTED_GUNSHOT).abs() < 1e-6);
    assert_eq!(player.wanted_decay_cooldown, WANTED_DECAY_DELAY - 1);
}

#[test]
fn wanted_holds_through_decay_delay_then_drains_to_zero() {
    let mut city = TestCity::new();
    city.edit_player(|p| p.raise_wanted(0.5));

    city.tick(WANTED_DECAY_DELAY);
    assert_eq!(city.player().wanted_level, 0.5);

    // Strictly decreasing once the delay has elapsed.
    let mut last = 0.5;
    for _ in 0..49 {
        city.tick(1);
        let now = city.player().wanted_level;
        assert!(now < last, "decay stalled at {now}");
        last = now;
    }

    city.tick(10);
    assert_eq!(city.player().wanted_level, 0.0);
    city.tick(10);
    assert_eq!(city.player().wanted_level, 0.0);
}

#[test]
fn fresh_crime_pauses_decay() {
    let mut city = TestCity::new();
    city.edit_player(|p| p.raise_wanted(0.5));
    city.tick(WANTED_DECAY_DELAY + 10);
    let decayed = city.player().wanted_level;
    assert!(decayed < 0.5);

    city.edit_player(|p| p.raise_wanted(1.0));
    city.tick(50);
    // Well inside the new delay window: nothing drains.
    let player = city.player();
    assert!((player.wanted_level - (decayed + 1.0)).abs() < 1e-5);
}
