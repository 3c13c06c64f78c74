/// The game state machine: single owner of every piece of mutable world data.
///
/// Input handlers and the tick driver both mutate the world only through the
/// operations below, and each operation leaves the state consistent on return.

use std::collections::BTreeMap;
use std::time::Instant;

use rand::Rng;
use tracing::{debug, info, warn};

use crate::assets::{self, AssetCategory, AssetProvider};
use crate::config::{FieldConfig, MAX_DROPS_PER_PASS};
use crate::entities::{
    Building, Cloud, DropKind, Explosion, ExplosionKind, Floor, GameStatus, Scenery,
    SessionStats, WaterDrop,
};
use crate::error::GameResult;
use crate::registry::{EntityId, IdAllocator, Registry};
use crate::scenery::generate_scenery;

#[derive(Clone, Debug)]
pub struct GameState {
    pub field: FieldConfig,
    scenery: Scenery,
    drops: Registry<WaterDrop>,
    explosions: Registry<Explosion>,
    cloud: Cloud,
    won: bool,
    paused: bool,
    drops_left: u32,
    max_drops: u32,
    /// Bumped by every reset so position caches outside the state reinitialise.
    generation: u64,
    pass: u32,
    stats: SessionStats,
    ids: IdAllocator,
    /// Explosion sprite lengths resolved from the catalog by `build_scene`.
    explosion_frames: BTreeMap<ExplosionKind, u32>,
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(FieldConfig::default())
    }
}

impl GameState {
    pub fn new(field: FieldConfig) -> Self {
        Self {
            field,
            scenery: Scenery::new(),
            drops: Registry::new(),
            explosions: Registry::new(),
            cloud: Cloud::default(),
            won: false,
            paused: false,
            drops_left: MAX_DROPS_PER_PASS,
            max_drops: MAX_DROPS_PER_PASS,
            generation: 0,
            pass: 1,
            stats: SessionStats::default(),
            ids: IdAllocator::default(),
            explosion_frames: BTreeMap::new(),
        }
    }

    // ── Accessors ─────────────────────────────────────────────────────────────

    pub fn scenery(&self) -> &Scenery {
        &self.scenery
    }

    pub fn drops(&self) -> &Registry<WaterDrop> {
        &self.drops
    }

    pub fn drops_mut(&mut self) -> &mut Registry<WaterDrop> {
        &mut self.drops
    }

    pub fn explosions(&self) -> &Registry<Explosion> {
        &self.explosions
    }

    pub fn cloud(&self) -> &Cloud {
        &self.cloud
    }

    pub fn is_won(&self) -> bool {
        self.won
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn is_lost(&self) -> bool {
        !self.cloud.alive
    }

    pub fn drops_left(&self) -> u32 {
        self.drops_left
    }

    pub fn max_drops(&self) -> u32 {
        self.max_drops
    }

    pub fn reset_generation(&self) -> u64 {
        self.generation
    }

    pub fn pass(&self) -> u32 {
        self.pass
    }

    pub fn stats(&self) -> SessionStats {
        self.stats
    }

    /// Frames an explosion of `kind` plays before removing itself. Falls back
    /// to the stock sprite until a catalog has been applied.
    pub fn explosion_frames(&self, kind: ExplosionKind) -> u32 {
        self.explosion_frames
            .get(&kind)
            .copied()
            .unwrap_or_else(|| kind.default_frame_count())
    }

    /// Lost outranks Won: a crash ends the session even if a drop still in
    /// the air takes out the last mosquito.
    pub fn status(&self) -> GameStatus {
        if self.is_lost() {
            GameStatus::Lost
        } else if self.won {
            GameStatus::Won
        } else if self.scenery.is_empty() {
            GameStatus::Loading
        } else if self.paused {
            GameStatus::Paused
        } else {
            GameStatus::Playing
        }
    }

    // ── Scenery ───────────────────────────────────────────────────────────────

    /// Replaces the skyline with a freshly generated one. The catalog must be
    /// complete; on any error the current skyline is left untouched.
    pub fn build_scene(
        &mut self,
        provider: &dyn AssetProvider,
        rng: &mut impl Rng,
    ) -> GameResult<()> {
        assets::validate(provider)?;
        let frames = ExplosionKind::ALL
            .into_iter()
            .map(|kind| {
                assets::lookup(provider, AssetCategory::Explosion, kind.asset_name())
                    .map(|asset| (kind, asset.frame_count))
            })
            .collect::<GameResult<BTreeMap<_, _>>>()?;
        let buildings = generate_scenery(&self.field, provider, rng)?;
        self.explosion_frames = frames;
        self.scenery.clear();
        for building in buildings {
            self.add_building(building);
        }
        info!(
            columns = self.scenery.len(),
            mosquitoes = self.scenery.mosquito_count(),
            difficulty = self.field.difficulty,
            "scene built"
        );
        Ok(())
    }

    pub fn add_building(&mut self, building: Building) {
        self.scenery.push(building);
    }

    pub fn remove_building(&mut self, index: usize) -> Option<Building> {
        let removed = self.scenery.remove(index);
        if removed.is_none() {
            warn!(index, columns = self.scenery.len(), "remove_building out of range");
        }
        removed
    }

    /// Knocks the topmost floor off the building in `index`. No-op on a razed
    /// building or a missing column.
    pub fn remove_floor(&mut self, index: usize) -> Option<Floor> {
        let floor = self.scenery.remove_top_floor(index)?;
        self.stats.floors_destroyed += 1;
        if floor.is_mosquito() {
            self.stats.mosquitoes_destroyed += 1;
        }
        debug!(index, variant = %floor.variant, "floor removed");
        Some(floor)
    }

    // ── Drops ─────────────────────────────────────────────────────────────────

    pub fn add_drop(&mut self, drop: WaterDrop) {
        self.drops.insert(drop);
    }

    pub fn remove_drop(&mut self, id: EntityId) -> Option<WaterDrop> {
        self.drops.remove(id)
    }

    /// Consumes one drop from the pass budget. Denied, with no change, at zero.
    pub fn use_drop(&mut self) -> bool {
        if self.drops_left == 0 {
            return false;
        }
        self.drops_left -= 1;
        true
    }

    pub fn reset_drops_counter(&mut self) {
        self.drops_left = self.max_drops;
    }

    /// Player request to release water. Every input device goes through here.
    pub fn request_drop(&mut self, now: Instant) -> Option<EntityId> {
        if !self.cloud.alive || self.paused || self.won || self.scenery.is_empty() {
            return None;
        }
        if !self.use_drop() {
            debug!("drop denied, pass budget exhausted");
            return None;
        }
        let (x, y) = self.cloud.release_point();
        let id = self.ids.next_id();
        self.add_drop(WaterDrop::new(id, DropKind::Water1, x, y, now));
        self.stats.drops_released += 1;
        debug!(%id, x, y, left = self.drops_left, "drop released");
        Some(id)
    }

    // ── Explosions ────────────────────────────────────────────────────────────

    pub fn add_explosion(&mut self, explosion: Explosion) {
        self.explosions.insert(explosion);
    }

    pub fn remove_explosion(&mut self, id: EntityId) -> Option<Explosion> {
        self.explosions.remove(id)
    }

    pub fn spawn_explosion(&mut self, kind: ExplosionKind, x: f32, y: f32) -> EntityId {
        let id = self.ids.next_id();
        let frames = self.explosion_frames(kind);
        self.add_explosion(Explosion::new(id, kind, x, y, frames));
        id
    }

    /// One render's worth of animation; finished explosions remove themselves.
    pub fn advance_explosions(&mut self) {
        for explosion in self.explosions.iter_mut() {
            explosion.frame += 1;
        }
        self.explosions.retain(|e| !e.is_finished());
    }

    // ── Cloud ─────────────────────────────────────────────────────────────────

    pub fn place_cloud(&mut self, x: f32, y: f32) {
        self.cloud.x = x;
        self.cloud.y = y;
    }

    pub fn destroy_cloud(&mut self) {
        self.cloud.alive = false;
    }

    pub fn begin_pass(&mut self) {
        self.pass += 1;
    }

    // ── Session ───────────────────────────────────────────────────────────────

    /// Win iff no floor anywhere is a mosquito. Winning also pauses.
    pub fn check_win(&mut self) -> bool {
        if self.scenery.has_mosquito() {
            return false;
        }
        if !self.won {
            info!(pass = self.pass, drops = self.stats.drops_released, "all mosquitoes destroyed");
        }
        self.won = true;
        self.paused = true;
        true
    }

    /// Flips the pause flag and returns the new value. A won game stays paused.
    pub fn toggle_pause(&mut self) -> bool {
        if !self.won {
            self.paused = !self.paused;
        }
        self.paused
    }

    /// Clears transient entities and flags, restores the cloud and the drop
    /// budget, and bumps the reset generation. The skyline is kept; callers
    /// wanting a new one call [`GameState::build_scene`] afterwards.
    pub fn reset_game(&mut self) {
        self.drops.clear();
        self.explosions.clear();
        self.cloud = Cloud::default();
        self.won = false;
        self.paused = false;
        self.drops_left = self.max_drops;
        self.pass = 1;
        self.stats = SessionStats::default();
        self.generation += 1;
        info!(generation = self.generation, "game reset");
    }
}
