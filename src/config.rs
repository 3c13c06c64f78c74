/// Gameplay tunables and the play-field configuration.
///
/// Distances are field units (one unit per source pixel), times are
/// milliseconds or seconds as the name says.

use std::time::Duration;

use crate::error::{GameError, GameResult};

// ── Play field ────────────────────────────────────────────────────────────────

pub const FIELD_WIDTH: f32 = 800.0;
pub const FIELD_HEIGHT: f32 = 431.0;
/// Width of one skyline column, shared by the generator and every hitbox.
pub const COLUMN_WIDTH: f32 = 42.0;
/// Width the building sprites were drawn at; floors scale by
/// `COLUMN_WIDTH / DEFAULT_BUILDING_WIDTH`.
pub const DEFAULT_BUILDING_WIDTH: f32 = 84.0;
pub const DEFAULT_DIFFICULTY: u32 = 3;

// ── Cloud ─────────────────────────────────────────────────────────────────────

/// Horizontal drift in units per second.
pub const CLOUD_SPEED: f32 = 100.0;
pub const CLOUD_WIDTH: f32 = 80.0;
pub const CLOUD_HEIGHT: f32 = 50.0;
/// Vertical step taken at each wrap.
pub const CLOUD_DOWN_STEP: f32 = 40.0;

// ── Water drops ───────────────────────────────────────────────────────────────

/// Units per second squared.
pub const DROP_ACCELERATION: f32 = 10.0;
pub const DROP_INITIAL_SPEED: f32 = 80.0;
pub const DROP_WIDTH: f32 = 20.0;
/// Drops are released this far below the cloud's top edge.
pub const DROP_RELEASE_OFFSET_Y: f32 = 40.0;
pub const MAX_DROPS_PER_PASS: u32 = 5;

// ── Scenery ───────────────────────────────────────────────────────────────────

pub const MOSQUITO_PROBABILITY: f64 = 0.3;

// ── Scheduling ────────────────────────────────────────────────────────────────

pub const TICK_PERIOD: Duration = Duration::from_millis(20);

// ── Difficulty ────────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Level {
    Easy,
    Medium,
    Hard,
}

impl Level {
    /// Upper bound on repeated body floors per building.
    pub fn difficulty(self) -> u32 {
        match self {
            Level::Easy => 2,
            Level::Medium => DEFAULT_DIFFICULTY,
            Level::Hard => 5,
        }
    }
}

// ── Field configuration ───────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldConfig {
    pub width: f32,
    pub height: f32,
    pub column_width: f32,
    pub difficulty: u32,
}

impl Default for FieldConfig {
    fn default() -> Self {
        Self {
            width: FIELD_WIDTH,
            height: FIELD_HEIGHT,
            column_width: COLUMN_WIDTH,
            difficulty: DEFAULT_DIFFICULTY,
        }
    }
}

impl FieldConfig {
    pub fn with_level(level: Level) -> Self {
        Self {
            difficulty: level.difficulty(),
            ..Self::default()
        }
    }

    /// Number of skyline columns: `floor(width / column_width)`.
    pub fn column_count(&self) -> usize {
        (self.width / self.column_width).floor() as usize
    }

    /// Multiplier applied to source sprite heights.
    pub fn scale_factor(&self) -> f32 {
        self.column_width / DEFAULT_BUILDING_WIDTH
    }

    pub fn validate(&self) -> GameResult<()> {
        if !(self.column_width > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "column width must be positive, got {}",
                self.column_width
            )));
        }
        if self.width < self.column_width {
            return Err(GameError::InvalidConfig(format!(
                "field width {} is narrower than one column ({})",
                self.width, self.column_width
            )));
        }
        if !(self.height > 0.0) {
            return Err(GameError::InvalidConfig(format!(
                "field height must be positive, got {}",
                self.height
            )));
        }
        if self.difficulty == 0 {
            return Err(GameError::InvalidConfig("difficulty must be at least 1".into()));
        }
        Ok(())
    }
}
