use std::time::{Duration, Instant};

use mosquito_raid::assets::AssetCategory;
use mosquito_raid::compute::*;
use mosquito_raid::config::FieldConfig;
use mosquito_raid::entities::*;
use mosquito_raid::registry::EntityId;
use mosquito_raid::state::GameState;

fn floor(category: AssetCategory, height: f32) -> Floor {
    Floor {
        category,
        variant: format!("{category}"),
        height,
        handle: "#".to_string(),
    }
}

/// Basement + body floors + roof adding up to `height`.
fn building(height: f32) -> Building {
    Building::new(vec![
        floor(AssetCategory::Basement, height / 3.0),
        floor(AssetCategory::Floor, height / 3.0),
        floor(AssetCategory::Roof, height / 3.0),
    ])
}

fn scenery_of(heights: &[f32]) -> Scenery {
    let mut s = Scenery::new();
    for &h in heights {
        s.push(building(h));
    }
    s
}

fn state_of(heights: &[f32]) -> GameState {
    let mut state = GameState::new(FieldConfig::default());
    for &h in heights {
        state.add_building(building(h));
    }
    state
}

fn step(t0: Instant, n: u32) -> Instant {
    t0 + Duration::from_millis(20) * n
}

// ── column_index / resolve ────────────────────────────────────────────────────

#[test]
fn column_index_is_floor_division() {
    assert_eq!(column_index(0.0, 42.0), Some(0));
    assert_eq!(column_index(41.9, 42.0), Some(0));
    assert_eq!(column_index(42.0, 42.0), Some(1));
    assert_eq!(column_index(799.0, 42.0), Some(19));
    assert_eq!(column_index(-0.1, 42.0), None);
}

#[test]
fn resolve_below_field_is_ground() {
    let s = scenery_of(&[90.0; 19]);
    assert_eq!(resolve(100.0, 432.0, &s, &FieldConfig::default()), Impact::Ground);
}

#[test]
fn resolve_inside_building_reports_column() {
    let s = scenery_of(&[90.0, 120.0, 90.0]);
    let field = FieldConfig::default();
    // column 1 top is at 431 - 120 = 311
    assert_eq!(resolve(50.0, 311.5, &s, &field), Impact::Building(1));
    assert_eq!(resolve(50.0, 311.0, &s, &field), Impact::None);
}

#[test]
fn resolve_past_last_building_is_open_sky() {
    let s = scenery_of(&[90.0, 90.0]);
    assert_eq!(resolve(200.0, 400.0, &s, &FieldConfig::default()), Impact::None);
}

#[test]
fn razed_building_is_hit_only_at_ground_level() {
    let mut s = scenery_of(&[90.0]);
    for _ in 0..3 {
        s.remove_top_floor(0);
    }
    let field = FieldConfig::default();
    assert_eq!(resolve(10.0, 430.0, &s, &field), Impact::None);
    assert_eq!(building_hit(10.0, 431.5, &s, &field), Some(0));
}

// ── Cloud motion ──────────────────────────────────────────────────────────────

#[test]
fn cloud_drifts_at_hundred_units_per_second() {
    let mut state = state_of(&[30.0; 19]);
    let mut cloud = CloudMotion::at(&state, 100.0, 0.0);
    assert_eq!(cloud.advance(500.0, &mut state), CloudEvent::Drifted);
    assert_eq!(cloud.x, 150.0);
    assert_eq!(state.cloud().x, 150.0);
}

#[test]
fn cloud_wraps_and_refills_budget_once() {
    let mut state = state_of(&[30.0; 19]);
    while state.use_drop() {}
    assert_eq!(state.drops_left(), 0);

    let mut cloud = CloudMotion::at(&state, 760.0, 0.0);
    assert_eq!(cloud.advance(500.0, &mut state), CloudEvent::Drifted);
    assert_eq!(cloud.x, 810.0);
    assert_eq!(state.drops_left(), 0);

    assert_eq!(cloud.advance(500.0, &mut state), CloudEvent::Wrapped);
    assert_eq!((cloud.x, cloud.y), (-80.0, 40.0));
    assert_eq!(state.drops_left(), 5);
    assert_eq!(state.pass(), 2);

    // Spend one, keep flying: no second refill
    assert!(state.use_drop());
    assert_eq!(cloud.advance(500.0, &mut state), CloudEvent::Drifted);
    assert_eq!(cloud.x, -30.0);
    assert_eq!(state.drops_left(), 4);
}

#[test]
fn cloud_crashes_into_tall_building() {
    let mut state = state_of(&[400.0; 19]);
    let mut cloud = CloudMotion::at(&state, 100.0, 0.0);
    assert_eq!(cloud.advance(0.0, &mut state), CloudEvent::Crashed);
    assert!(!state.cloud().alive);

    let booms: Vec<_> = state.explosions().iter().collect();
    assert_eq!(booms.len(), 1);
    assert_eq!(booms[0].kind, ExplosionKind::Explosion2);
    assert_eq!((booms[0].x, booms[0].y), (100.0, 0.0));

    // A destroyed cloud stays put
    assert_eq!(cloud.advance(500.0, &mut state), CloudEvent::Idle);
    assert_eq!(state.explosions().len(), 1);
}

#[test]
fn cloud_probe_uses_trailing_edge() {
    // Only column 3 is tall; probe x = cloud.x + 80 - 21
    let mut heights = [30.0; 19];
    heights[3] = 400.0;
    let mut state = state_of(&heights);

    // probe = 40 + 59 = 99 → column 2, safe
    let mut cloud = CloudMotion::at(&state, 40.0, 0.0);
    assert_eq!(cloud.advance(0.0, &mut state), CloudEvent::Drifted);
    // probe = 70 + 59 = 129 → column 3, crash
    assert_eq!(cloud.advance(300.0, &mut state), CloudEvent::Crashed);
}

#[test]
fn paused_cloud_does_not_move() {
    let mut state = state_of(&[30.0; 19]);
    state.toggle_pause();
    let mut cloud = CloudMotion::at(&state, 200.0, 80.0);
    assert_eq!(cloud.advance(500.0, &mut state), CloudEvent::Idle);
    assert_eq!((cloud.x, cloud.y), (200.0, 80.0));
    assert!(state.cloud().alive);
}

#[test]
fn reset_generation_reinitialises_cached_position() {
    let mut state = state_of(&[30.0; 19]);
    let mut cloud = CloudMotion::at(&state, 500.0, 120.0);
    state.reset_game();
    cloud.advance(0.0, &mut state);
    assert_eq!((cloud.x, cloud.y), (-80.0, 0.0));
    assert_eq!((state.cloud().x, state.cloud().y), (-80.0, 0.0));
}

#[test]
fn cloud_idles_until_scene_is_built() {
    let mut state = GameState::new(FieldConfig::default());
    let mut cloud = CloudMotion::new(&state);
    assert_eq!(cloud.advance(500.0, &mut state), CloudEvent::Idle);
    assert_eq!(cloud.x, -80.0);
}

// ── Drop motion ───────────────────────────────────────────────────────────────

#[test]
fn drop_speed_and_height_never_decrease() {
    let t0 = Instant::now();
    let mut drop = WaterDrop::new(EntityId(1), DropKind::Water1, 100.0, 0.0, t0);
    let (mut speed, mut y) = (drop.speed, drop.y);
    for n in 1..=100 {
        advance_drop(&mut drop, step(t0, n));
        assert!(drop.speed >= speed);
        assert!(drop.y >= y);
        assert_eq!(drop.x, 100.0);
        assert_eq!(drop.rotation, 0.0);
        speed = drop.speed;
        y = drop.y;
    }
}

#[test]
fn drop_first_step_uses_initial_speed() {
    let t0 = Instant::now();
    let mut drop = WaterDrop::new(EntityId(1), DropKind::Water1, 0.0, 0.0, t0);
    advance_drop(&mut drop, t0 + Duration::from_millis(100));
    // speed = 80 + 10 * 0.1² / 2 = 80.05; y = 80.05 * 0.1
    assert!((drop.speed - 80.05).abs() < 1e-4);
    assert!((drop.y - 8.005).abs() < 1e-4);
    assert!((drop.flight_time - 0.1).abs() < 1e-6);
}

#[test]
fn drop_hitbox_uses_half_width() {
    let s = scenery_of(&[30.0, 120.0]);
    let field = FieldConfig::default();
    let t0 = Instant::now();
    // x + 10 = 42 → column 1
    let mut drop = WaterDrop::new(EntityId(1), DropKind::Water1, 32.0, 320.0, t0);
    assert_eq!(drop_impact(&drop, &s, &field), Impact::Building(1));
    drop.x = 31.0;
    assert_eq!(drop_impact(&drop, &s, &field), Impact::None);
}

#[test]
fn drop_lands_on_building_and_removes_floor() {
    let t0 = Instant::now();
    let mut state = state_of(&[30.0, 30.0, 120.0]);
    // release point = (x + 40, y + 40) = (100, 0)
    state.place_cloud(60.0, -40.0);
    let id = state.request_drop(t0).expect("drop released");
    assert_eq!(state.drops().get(id).map(|d| (d.x, d.y)), Some((100.0, 0.0)));

    let mut landed = Vec::new();
    for n in 1..1000 {
        landed = advance_drops(&mut state, step(t0, n));
        if !landed.is_empty() {
            break;
        }
    }

    assert_eq!(landed, vec![(id, Impact::Building(2))]);
    assert!(state.drops().is_empty());
    assert_eq!(state.scenery().get(2).map(Building::len), Some(2));

    let booms: Vec<_> = state.explosions().iter().collect();
    assert_eq!(booms.len(), 1);
    assert_eq!(booms[0].kind, ExplosionKind::Explosion1);
    assert!(booms[0].y > 311.0 && booms[0].y <= 431.0);
    assert_eq!(booms[0].x, 100.0);
}

#[test]
fn drop_over_open_sky_hits_ground() {
    let t0 = Instant::now();
    let mut state = state_of(&[30.0]);
    state.add_drop(WaterDrop::new(EntityId(77), DropKind::Water2, 600.0, 0.0, t0));

    let mut landed = Vec::new();
    for n in 1..2000 {
        landed = advance_drops(&mut state, step(t0, n));
        if !landed.is_empty() {
            break;
        }
    }
    assert_eq!(landed, vec![(EntityId(77), Impact::Ground)]);
    assert_eq!(state.scenery().get(0).map(Building::len), Some(3));
    assert_eq!(state.explosions().len(), 1);
}

#[test]
fn paused_drops_do_not_jump_on_resume() {
    let t0 = Instant::now();
    let mut state = state_of(&[30.0]);
    state.add_drop(WaterDrop::new(EntityId(1), DropKind::Water1, 600.0, 0.0, t0));

    state.toggle_pause();
    advance_drops(&mut state, t0 + Duration::from_secs(10));
    state.toggle_pause();
    advance_drops(&mut state, t0 + Duration::from_secs(10) + Duration::from_millis(20));

    let drop = state.drops().get(EntityId(1)).expect("still falling");
    assert!(drop.y < 2.0, "drop moved {} units", drop.y);
}
