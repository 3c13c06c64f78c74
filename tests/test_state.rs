use std::time::Instant;

use mosquito_raid::assets::{Asset, AssetCatalog, AssetCategory};
use mosquito_raid::config::FieldConfig;
use mosquito_raid::entities::*;
use mosquito_raid::registry::EntityId;
use mosquito_raid::state::GameState;
use mosquito_raid::GameError;

use rand::rngs::StdRng;
use rand::SeedableRng;

fn floor(category: AssetCategory, height: f32) -> Floor {
    Floor {
        category,
        variant: format!("{category}"),
        height,
        handle: "#".to_string(),
    }
}

fn building(cap: AssetCategory) -> Building {
    Building::new(vec![
        floor(AssetCategory::Basement, 30.0),
        floor(AssetCategory::Floor, 20.0),
        floor(cap, 25.0),
    ])
}

fn make_state(caps: &[AssetCategory]) -> GameState {
    let mut state = GameState::new(FieldConfig::default());
    for &cap in caps {
        state.add_building(building(cap));
    }
    state
}

fn seeded_rng() -> StdRng {
    StdRng::seed_from_u64(42)
}

// ── Construction & build_scene ────────────────────────────────────────────────

#[test]
fn new_state_is_loading_with_full_budget() {
    let s = GameState::default();
    assert_eq!(s.status(), GameStatus::Loading);
    assert!(s.scenery().is_empty());
    assert!(s.drops().is_empty());
    assert!(s.explosions().is_empty());
    assert!(s.cloud().alive);
    assert_eq!(s.drops_left(), 5);
    assert_eq!(s.max_drops(), 5);
    assert_eq!(s.reset_generation(), 0);
    assert_eq!(s.pass(), 1);
}

#[test]
fn build_scene_populates_every_column() {
    let mut s = GameState::default();
    s.build_scene(&AssetCatalog::builtin(), &mut seeded_rng()).expect("scene");
    assert_eq!(s.scenery().len(), 19);
    assert_eq!(s.status(), GameStatus::Playing);
}

#[test]
fn build_scene_replaces_previous_skyline() {
    let mut s = make_state(&[AssetCategory::Roof; 3]);
    s.build_scene(&AssetCatalog::builtin(), &mut seeded_rng()).expect("scene");
    assert_eq!(s.scenery().len(), 19);
}

#[test]
fn build_scene_with_incomplete_catalog_keeps_state() {
    let mut s = make_state(&[AssetCategory::Roof]);
    let err = s.build_scene(&AssetCatalog::new(), &mut seeded_rng()).unwrap_err();
    assert!(matches!(err, GameError::MissingAssets { .. }));
    assert_eq!(s.scenery().len(), 1);
}

// ── Buildings & floors ────────────────────────────────────────────────────────

#[test]
fn remove_floor_counts_down_to_zero_and_stops() {
    let mut s = make_state(&[AssetCategory::Roof]);
    for expected in [2, 1, 0, 0, 0] {
        s.remove_floor(0);
        assert_eq!(s.scenery().get(0).map(Building::len), Some(expected));
    }
    assert_eq!(s.stats().floors_destroyed, 3);
}

#[test]
fn remove_floor_on_missing_column_is_noop() {
    let mut s = make_state(&[AssetCategory::Roof]);
    assert!(s.remove_floor(4).is_none());
    assert_eq!(s.stats().floors_destroyed, 0);
}

#[test]
fn remove_building_out_of_range_is_none() {
    let mut s = make_state(&[AssetCategory::Roof, AssetCategory::MosquitoCap]);
    assert!(s.remove_building(9).is_none());
    assert!(s.remove_building(0).is_some());
    assert_eq!(s.scenery().len(), 1);
}

// ── Drop budget ───────────────────────────────────────────────────────────────

#[test]
fn five_drops_then_denied() {
    let mut s = GameState::default();
    for _ in 0..5 {
        assert!(s.use_drop());
    }
    assert!(!s.use_drop());
    assert_eq!(s.drops_left(), 0);
}

#[test]
fn reset_drops_counter_restores_exactly_max() {
    let mut s = GameState::default();
    s.use_drop();
    s.use_drop();
    s.reset_drops_counter();
    assert_eq!(s.drops_left(), 5);
    s.reset_drops_counter();
    assert_eq!(s.drops_left(), 5);
}

#[test]
fn request_drop_spawns_at_cloud_release_point() {
    let mut s = make_state(&[AssetCategory::Roof]);
    s.place_cloud(200.0, 40.0);
    let id = s.request_drop(Instant::now()).expect("released");
    let drop = s.drops().get(id).expect("registered");
    assert_eq!((drop.x, drop.y), (240.0, 80.0));
    assert_eq!(drop.kind, DropKind::Water1);
    assert_eq!(s.drops_left(), 4);
    assert_eq!(s.stats().drops_released, 1);
}

#[test]
fn request_drop_respects_budget() {
    let mut s = make_state(&[AssetCategory::Roof]);
    let now = Instant::now();
    let released = (0..8).filter_map(|_| s.request_drop(now)).count();
    assert_eq!(released, 5);
    assert_eq!(s.drops().len(), 5);
}

#[test]
fn request_drop_denied_without_consuming_budget() {
    let now = Instant::now();

    let mut paused = make_state(&[AssetCategory::Roof]);
    paused.toggle_pause();
    assert!(paused.request_drop(now).is_none());
    assert_eq!(paused.drops_left(), 5);

    let mut crashed = make_state(&[AssetCategory::Roof]);
    crashed.destroy_cloud();
    assert!(crashed.request_drop(now).is_none());
    assert_eq!(crashed.drops_left(), 5);

    let mut loading = GameState::default();
    assert!(loading.request_drop(now).is_none());
}

#[test]
fn drop_ids_are_unique() {
    let mut s = make_state(&[AssetCategory::Roof]);
    let now = Instant::now();
    let a = s.request_drop(now).expect("a");
    let b = s.request_drop(now).expect("b");
    assert_ne!(a, b);
    assert!(s.remove_drop(a).is_some());
    assert!(s.remove_drop(a).is_none());
    assert!(s.drops().contains(b));
}

// ── Explosions ────────────────────────────────────────────────────────────────

#[test]
fn explosion_removes_itself_after_its_frames() {
    let mut s = GameState::default();
    let id = s.spawn_explosion(ExplosionKind::Explosion1, 10.0, 20.0);
    for _ in 0..43 {
        s.advance_explosions();
    }
    assert_eq!(s.explosions().get(id).map(|e| e.frame), Some(43));
    s.advance_explosions();
    assert!(s.explosions().is_empty());
}

#[test]
fn explosion_length_comes_from_catalog() {
    let catalog = AssetCatalog::builtin().with(
        AssetCategory::Explosion,
        "EXPLOSION_1",
        Asset::animated(100, 5, "*"),
    );
    let mut s = GameState::default();
    s.build_scene(&catalog, &mut seeded_rng()).unwrap();
    assert_eq!(s.explosion_frames(ExplosionKind::Explosion1), 5);
    assert_eq!(s.explosion_frames(ExplosionKind::Explosion2), 41);

    let id = s.spawn_explosion(ExplosionKind::Explosion1, 0.0, 0.0);
    for _ in 0..5 {
        s.advance_explosions();
    }
    assert!(s.explosions().contains(id));
    s.advance_explosions();
    assert!(!s.explosions().contains(id));
}

#[test]
fn missing_explosion_sprite_blocks_scene() {
    let mut catalog = AssetCatalog::new();
    for (category, variant, asset) in [
        (AssetCategory::Basement, "B", Asset::still(50, "#")),
        (AssetCategory::Floor, "F", Asset::still(40, "#")),
        (AssetCategory::Roof, "R", Asset::still(30, "^")),
        (AssetCategory::MosquitoCap, "M", Asset::still(30, "x")),
        (AssetCategory::Cloud, "CLOUD", Asset::still(50, "~")),
        (AssetCategory::Explosion, "EXPLOSION_1", Asset::animated(100, 43, "*")),
        (AssetCategory::WaterDrop, "WATER_1", Asset::still(28, "o")),
    ] {
        catalog.insert(category, variant, asset);
    }
    let mut s = GameState::default();
    let err = s.build_scene(&catalog, &mut seeded_rng()).unwrap_err();
    assert!(matches!(
        err,
        GameError::MissingVariant { category: AssetCategory::Explosion, .. }
    ));
    assert!(s.scenery().is_empty());
}

#[test]
fn explosions_can_be_removed_by_id() {
    let mut s = GameState::default();
    s.add_explosion(Explosion::new(EntityId(500), ExplosionKind::Explosion3, 0.0, 0.0, 43));
    assert!(s.remove_explosion(EntityId(500)).is_some());
    assert!(s.explosions().is_empty());
}

// ── Win condition ─────────────────────────────────────────────────────────────

#[test]
fn no_win_while_any_mosquito_stands() {
    let mut s = make_state(&[AssetCategory::Roof, AssetCategory::MosquitoCap]);
    assert!(!s.check_win());
    assert!(!s.is_won());
    assert!(!s.is_paused());
}

#[test]
fn removing_last_mosquito_wins_and_pauses() {
    let mut s = make_state(&[
        AssetCategory::MosquitoCap,
        AssetCategory::Roof,
        AssetCategory::MosquitoCap,
    ]);
    s.remove_floor(0);
    assert!(!s.check_win());
    s.remove_floor(2);
    assert!(s.check_win());
    assert!(s.is_won());
    assert!(s.is_paused());
    assert_eq!(s.status(), GameStatus::Won);
    assert_eq!(s.stats().mosquitoes_destroyed, 2);
}

#[test]
fn razed_building_satisfies_win() {
    let mut s = make_state(&[AssetCategory::MosquitoCap]);
    for _ in 0..3 {
        s.remove_floor(0);
    }
    assert!(s.check_win());
}

#[test]
fn won_game_stays_paused() {
    let mut s = make_state(&[AssetCategory::Roof]);
    assert!(s.check_win());
    assert!(s.toggle_pause());
    assert!(s.is_paused());
}

#[test]
fn crash_outranks_win() {
    let mut s = make_state(&[AssetCategory::Roof]);
    s.destroy_cloud();
    s.check_win();
    assert_eq!(s.status(), GameStatus::Lost);
}

// ── Pause ─────────────────────────────────────────────────────────────────────

#[test]
fn toggle_pause_flips_status() {
    let mut s = make_state(&[AssetCategory::MosquitoCap]);
    assert!(s.toggle_pause());
    assert_eq!(s.status(), GameStatus::Paused);
    assert!(!s.toggle_pause());
    assert_eq!(s.status(), GameStatus::Playing);
}

// ── reset_game ────────────────────────────────────────────────────────────────

#[test]
fn reset_clears_transients_and_bumps_generation() {
    let mut s = make_state(&[AssetCategory::MosquitoCap]);
    let now = Instant::now();
    s.request_drop(now);
    s.spawn_explosion(ExplosionKind::Explosion1, 0.0, 0.0);
    s.place_cloud(300.0, 120.0);
    s.destroy_cloud();
    s.begin_pass();

    s.reset_game();

    assert!(s.drops().is_empty());
    assert!(s.explosions().is_empty());
    assert_eq!(*s.cloud(), Cloud::default());
    assert_eq!(s.drops_left(), 5);
    assert_eq!(s.pass(), 1);
    assert_eq!(s.stats(), SessionStats::default());
    assert!(!s.is_won() && !s.is_paused());
    assert_eq!(s.reset_generation(), 1);
    assert_eq!(s.scenery().len(), 1);
}

#[test]
fn ids_are_not_reused_after_reset() {
    let mut s = make_state(&[AssetCategory::Roof]);
    let before = s.request_drop(Instant::now()).expect("before");
    s.reset_game();
    let after = s.request_drop(Instant::now()).expect("after");
    assert!(after > before);
}
