/// Game entity types. Pure data, no simulation logic.

use std::time::Instant;

use crate::assets::AssetCategory;
use crate::config::{CLOUD_HEIGHT, CLOUD_WIDTH, DROP_INITIAL_SPEED, DROP_RELEASE_OFFSET_Y};
use crate::registry::{EntityId, Keyed};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    /// No skyline yet; assets are still being resolved.
    Loading,
    Playing,
    Paused,
    Won,
    Lost,
}

// ── Skyline ───────────────────────────────────────────────────────────────────

/// One stacked segment of a building.
#[derive(Clone, Debug, PartialEq)]
pub struct Floor {
    pub category: AssetCategory,
    /// Variant name inside the category, e.g. `FLOOR_ROOF_A`.
    pub variant: String,
    /// Rendered height in field units, always > 0.
    pub height: f32,
    /// Render handle copied from the asset.
    pub handle: String,
}

impl Floor {
    pub fn is_mosquito(&self) -> bool {
        self.category == AssetCategory::MosquitoCap
    }
}

/// Floors ordered bottom to top: basement, body floors, cap.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Building {
    floors: Vec<Floor>,
}

impl Building {
    pub fn new(floors: Vec<Floor>) -> Self {
        Self { floors }
    }

    pub fn floors(&self) -> &[Floor] {
        &self.floors
    }

    pub fn len(&self) -> usize {
        self.floors.len()
    }

    /// A building with no floors is a razed column.
    pub fn is_empty(&self) -> bool {
        self.floors.is_empty()
    }

    pub fn height(&self) -> f32 {
        self.floors.iter().map(|f| f.height).sum()
    }

    pub fn cap(&self) -> Option<&Floor> {
        self.floors.last()
    }

    pub fn has_mosquito(&self) -> bool {
        self.floors.iter().any(Floor::is_mosquito)
    }

    /// Removes the topmost floor; a razed building stays razed.
    pub fn remove_top(&mut self) -> Option<Floor> {
        self.floors.pop()
    }
}

/// Buildings indexed by column, left to right.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scenery {
    buildings: Vec<Building>,
}

impl Scenery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, building: Building) {
        self.buildings.push(building);
    }

    /// Removes a whole column; columns to its right shift left by one.
    pub fn remove(&mut self, index: usize) -> Option<Building> {
        (index < self.buildings.len()).then(|| self.buildings.remove(index))
    }

    pub fn clear(&mut self) {
        self.buildings.clear();
    }

    pub fn get(&self, index: usize) -> Option<&Building> {
        self.buildings.get(index)
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Building> {
        self.buildings.iter()
    }

    pub fn height_at(&self, index: usize) -> Option<f32> {
        self.get(index).map(Building::height)
    }

    pub fn remove_top_floor(&mut self, index: usize) -> Option<Floor> {
        self.buildings.get_mut(index).and_then(Building::remove_top)
    }

    pub fn has_mosquito(&self) -> bool {
        self.buildings.iter().any(Building::has_mosquito)
    }

    pub fn mosquito_count(&self) -> usize {
        self.buildings
            .iter()
            .flat_map(|b| b.floors().iter())
            .filter(|f| f.is_mosquito())
            .count()
    }
}

// ── Cloud ─────────────────────────────────────────────────────────────────────

/// The single player-controlled cloud. Destruction flips `alive`; the cloud
/// is never removed.
#[derive(Clone, Debug, PartialEq)]
pub struct Cloud {
    pub x: f32,
    pub y: f32,
    pub alive: bool,
}

impl Default for Cloud {
    fn default() -> Self {
        Self {
            x: -CLOUD_WIDTH,
            y: 0.0,
            alive: true,
        }
    }
}

impl Cloud {
    /// Where a released drop starts: horizontally centred, slightly below the top.
    pub fn release_point(&self) -> (f32, f32) {
        (self.x + CLOUD_WIDTH / 2.0, self.y + DROP_RELEASE_OFFSET_Y)
    }

    /// Pointer hit-test against the cloud sprite.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x <= self.x + CLOUD_WIDTH && y >= self.y && y <= self.y + CLOUD_HEIGHT
    }
}

// ── Projectiles ───────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DropKind {
    Water1,
    Water2,
    Water3,
}

impl DropKind {
    pub fn asset_name(self) -> &'static str {
        match self {
            DropKind::Water1 => "WATER_1",
            DropKind::Water2 => "WATER_2",
            DropKind::Water3 => "WATER_3",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct WaterDrop {
    pub id: EntityId,
    pub kind: DropKind,
    pub spawn_x: f32,
    pub spawn_y: f32,
    pub x: f32,
    pub y: f32,
    /// Current fall speed in units per second.
    pub speed: f32,
    /// Seconds spent falling so far.
    pub flight_time: f32,
    /// Reserved for a visual tumble; stays at 0.
    pub rotation: f32,
    /// Wall-clock instant of this drop's last advance.
    pub last_update: Instant,
}

impl WaterDrop {
    pub fn new(id: EntityId, kind: DropKind, x: f32, y: f32, now: Instant) -> Self {
        Self {
            id,
            kind,
            spawn_x: x,
            spawn_y: y,
            x,
            y,
            speed: DROP_INITIAL_SPEED,
            flight_time: 0.0,
            rotation: 0.0,
            last_update: now,
        }
    }
}

impl Keyed for WaterDrop {
    fn id(&self) -> EntityId {
        self.id
    }
}

// ── Explosions ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ExplosionKind {
    /// Water splash where a drop lands.
    Explosion1,
    /// Cloud crashing into a roof.
    Explosion2,
    Explosion3,
}

impl ExplosionKind {
    pub const ALL: [ExplosionKind; 3] = [
        ExplosionKind::Explosion1,
        ExplosionKind::Explosion2,
        ExplosionKind::Explosion3,
    ];

    /// Frames in the stock sprite sheet, used until a catalog supplies its own.
    pub fn default_frame_count(self) -> u32 {
        match self {
            ExplosionKind::Explosion1 => 43,
            ExplosionKind::Explosion2 => 41,
            ExplosionKind::Explosion3 => 43,
        }
    }

    pub fn asset_name(self) -> &'static str {
        match self {
            ExplosionKind::Explosion1 => "EXPLOSION_1",
            ExplosionKind::Explosion2 => "EXPLOSION_2",
            ExplosionKind::Explosion3 => "EXPLOSION_3",
        }
    }
}

/// Visual-only burst; carries no physics.
#[derive(Clone, Debug, PartialEq)]
pub struct Explosion {
    pub id: EntityId,
    pub kind: ExplosionKind,
    pub x: f32,
    pub y: f32,
    /// Sprite frame shown on the next render.
    pub frame: u32,
    /// Frame count of the sprite this burst plays.
    pub frames: u32,
}

impl Explosion {
    pub fn new(id: EntityId, kind: ExplosionKind, x: f32, y: f32, frames: u32) -> Self {
        Self {
            id,
            kind,
            x,
            y,
            frame: 0,
            frames,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.frame > self.frames
    }
}

impl Keyed for Explosion {
    fn id(&self) -> EntityId {
        self.id
    }
}

// ── Session statistics ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SessionStats {
    pub drops_released: u32,
    pub floors_destroyed: u32,
    pub mosquitoes_destroyed: u32,
}
