/// Game-logic functions: impact resolution and the motion controllers.
///
/// The resolver is pure. The controllers read and write a `GameState` only
/// through its public operations, so the input path and the tick path share
/// the same invariants.

use std::time::Instant;

use tracing::{debug, info};

use crate::config::{
    FieldConfig, CLOUD_DOWN_STEP, CLOUD_HEIGHT, CLOUD_SPEED, CLOUD_WIDTH, DROP_ACCELERATION,
    DROP_WIDTH,
};
use crate::entities::{ExplosionKind, Scenery, WaterDrop};
use crate::registry::EntityId;
use crate::state::GameState;

// ── Impact resolution ─────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Impact {
    None,
    Ground,
    /// Hit the building standing in this column.
    Building(usize),
}

/// Column under field position `x`; `None` left of the field.
pub fn column_index(x: f32, column_width: f32) -> Option<usize> {
    if x < 0.0 || column_width <= 0.0 {
        return None;
    }
    Some((x / column_width).floor() as usize)
}

/// Column whose building reaches down to `y`. Columns past the last building
/// are open sky; a razed building still counts, with height 0.
pub fn building_hit(x: f32, y: f32, scenery: &Scenery, field: &FieldConfig) -> Option<usize> {
    let index = column_index(x, field.column_width)?;
    let height = scenery.height_at(index)?;
    (y > field.height - height).then_some(index)
}

/// Classifies an already offset point: below the field is ground, otherwise
/// whichever building it has sunk into.
pub fn resolve(x: f32, y: f32, scenery: &Scenery, field: &FieldConfig) -> Impact {
    if y > field.height {
        return Impact::Ground;
    }
    match building_hit(x, y, scenery, field) {
        Some(index) => Impact::Building(index),
        None => Impact::None,
    }
}

// ── Cloud motion ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CloudEvent {
    /// Nothing moved: destroyed, loading or paused.
    Idle,
    Drifted,
    /// Left the right edge and re-entered one step lower.
    Wrapped,
    Crashed,
}

/// Position cache carried between ticks.
#[derive(Clone, Debug, PartialEq)]
pub struct CloudMotion {
    pub x: f32,
    pub y: f32,
    generation: u64,
    /// Armed while the cloud sits past the right edge; the budget refill
    /// fires only on the transition into that state.
    wrap_latched: bool,
}

impl CloudMotion {
    pub fn new(state: &GameState) -> Self {
        Self {
            x: -CLOUD_WIDTH,
            y: 0.0,
            generation: state.reset_generation(),
            wrap_latched: false,
        }
    }

    /// Resumes from an explicit position, bound to the state's current generation.
    pub fn at(state: &GameState, x: f32, y: f32) -> Self {
        Self {
            x,
            y,
            ..Self::new(state)
        }
    }

    pub fn advance(&mut self, elapsed_ms: f32, state: &mut GameState) -> CloudEvent {
        if self.generation != state.reset_generation() {
            debug!(generation = state.reset_generation(), "cloud motion reinitialised");
            *self = Self::new(state);
            state.place_cloud(self.x, self.y);
        }
        if !state.cloud().alive || state.scenery().is_empty() {
            return CloudEvent::Idle;
        }

        let field = state.field;
        let mut event = CloudEvent::Idle;
        if !state.is_paused() {
            if self.x > field.width {
                if !self.wrap_latched {
                    self.wrap_latched = true;
                    state.reset_drops_counter();
                    state.begin_pass();
                }
                self.y += CLOUD_DOWN_STEP;
                self.x = -CLOUD_WIDTH;
                event = CloudEvent::Wrapped;
                debug!(pass = state.pass(), y = self.y, "cloud wrapped");
            } else {
                self.wrap_latched = false;
                self.x += elapsed_ms / 1000.0 * CLOUD_SPEED;
                event = CloudEvent::Drifted;
            }
            state.place_cloud(self.x, self.y);
        }

        // Trailing edge of the sprite, nudged half a column back.
        let probe_x = self.x + CLOUD_WIDTH - field.column_width / 2.0;
        if let Some(column) = building_hit(probe_x, self.y + CLOUD_HEIGHT, state.scenery(), &field) {
            info!(column, x = self.x, y = self.y, "cloud crashed into the skyline");
            state.destroy_cloud();
            state.spawn_explosion(ExplosionKind::Explosion2, self.x, self.y);
            return CloudEvent::Crashed;
        }
        event
    }
}

// ── Drop motion ───────────────────────────────────────────────────────────────

/// Accelerating fall driven by the drop's own wall clock. `x` never changes.
pub fn advance_drop(drop: &mut WaterDrop, now: Instant) {
    let elapsed = now.saturating_duration_since(drop.last_update).as_secs_f32();
    drop.last_update = now;
    drop.flight_time += elapsed;
    drop.speed += DROP_ACCELERATION * drop.flight_time.powi(2) / 2.0;
    drop.y += drop.speed * elapsed;
}

/// The drop's hitbox is its horizontal centre.
pub fn drop_impact(drop: &WaterDrop, scenery: &Scenery, field: &FieldConfig) -> Impact {
    resolve(drop.x + DROP_WIDTH / 2.0, drop.y, scenery, field)
}

/// Advances every in-flight drop and applies its impact, if any. While paused
/// the drops only re-anchor their clocks, so resuming doesn't teleport them.
pub fn advance_drops(state: &mut GameState, now: Instant) -> Vec<(EntityId, Impact)> {
    if state.is_paused() {
        state.drops_mut().iter_mut().for_each(|d| d.last_update = now);
        return Vec::new();
    }

    let field = state.field;
    let mut impacts = Vec::new();
    for id in state.drops().ids() {
        let Some(drop) = state.drops_mut().get_mut(id) else {
            continue;
        };
        advance_drop(drop, now);
        let (x, y) = (drop.x, drop.y);

        let impact = match state.drops().get(id) {
            Some(drop) => drop_impact(drop, state.scenery(), &field),
            None => continue,
        };
        if impact == Impact::None {
            continue;
        }

        debug!(%id, ?impact, x, y, "drop landed");
        state.remove_drop(id);
        state.spawn_explosion(ExplosionKind::Explosion1, x, y);
        if let Impact::Building(column) = impact {
            state.remove_floor(column);
            state.check_win();
        }
        impacts.push((id, impact));
    }
    impacts
}
