//! Collision soundness under randomized layouts, plus on-foot movement
//! through the full tick.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::city_map::CityMap;
use crate::geometry::Rect;
use crate::movement::{slide_move, try_move, Direction};
use crate::test_harness::TestCity;

/// Random city, random walk: no sequence of accepted moves may ever leave an
/// entity overlapping a wall.
#[test]
fn random_walks_never_end_inside_walls() {
    let mut rng = ChaCha8Rng::seed_from_u64(1234);
    for _ in 0..20 {
        let mut map = CityMap::open(1000.0, 1000.0);
        for _ in 0..rng.gen_range(3..12) {
            map.walls.push(Rect::new(
                rng.gen_range(50.0..900.0),
                rng.gen_range(50.0..900.0),
                rng.gen_range(20.0..150.0),
                rng.gen_range(20.0..150.0),
            ));
        }

        let half = rng.gen_range(5.0..25.0);
        let Some((mut x, mut y)) = map.find_clear_spot(&mut rng, half) else {
            continue;
        };
        for _ in 0..200 {
            let dx = rng.gen_range(-10.0..10.0);
            let dy = rng.gen_range(-10.0..10.0);
            if rng.gen_bool(0.5) {
                if let Some((nx, ny)) = try_move(&map, x, y, half, dx, dy) {
                    x = nx;
                    y = ny;
                }
            } else {
                let (nx, ny) = slide_move(&map, x, y, half, dx, dy);
                x = nx;
                y = ny;
            }
            assert!(
                !map.collides_wall(&Rect::centered(x, y, half)),
                "entity at ({x}, {y}) half {half} overlaps a wall"
            );
        }
    }
}

#[test]
fn walking_moves_player_and_drives_animation() {
    let mut city = TestCity::new();
    let (x0, y0) = city.player_pos();
    city.set_move(1.0, 0.0);
    city.tick(10);

    let (x1, y1) = city.player_pos();
    assert!((x1 - x0 - 30.0).abs() < 1e-3);
    assert_eq!(y1, y0);
    let player = city.player();
    assert!(player.moving);
    assert_eq!(player.facing, Direction::Right);
    assert_eq!(player.anim_frame, 1);
}

#[test]
fn idle_player_stops_animating() {
    let mut city = TestCity::new();
    city.set_move(0.0, 1.0);
    city.tick(5);
    city.set_move(0.0, 0.0);
    city.tick(1);
    let player = city.player();
    assert!(!player.moving);
    // Facing is retained from the last movement.
    assert_eq!(player.facing, Direction::Down);
}

#[test]
fn player_slides_along_perimeter_wall() {
    let mut city = TestCity::new();
    city.set_player_pos(40.0, 500.0);
    // Push diagonally into the left wall; the Y component still commits.
    city.set_move(-1.0, 1.0);
    city.tick(10);
    let (x, y) = city.player_pos();
    assert!(x >= 35.0, "player pushed through the wall to x={x}");
    assert!(y > 520.0, "player failed to slide along the wall, y={y}");
}
