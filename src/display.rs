/// Rendering layer. All terminal I/O lives here.
///
/// `TerminalSink` receives one snapshot per tick and translates it into
/// terminal commands. No game logic is performed; field units are mapped onto
/// the character grid by `Viewport`.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use mosquito_raid::assets::{self, AssetCatalog, AssetCategory};
use mosquito_raid::config::{FieldConfig, Level, CLOUD_HEIGHT, CLOUD_WIDTH};
use mosquito_raid::driver::{RenderSink, Snapshot};
use mosquito_raid::entities::{Building, Cloud, Explosion, GameStatus, WaterDrop};
use tracing::warn;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_HUD_DROPS: Color = Color::Cyan;
const C_HUD_PASS: Color = Color::White;
const C_HUD_TARGETS: Color = Color::Red;
const C_BASEMENT: Color = Color::DarkGrey;
const C_FLOOR: Color = Color::Grey;
const C_ROOF: Color = Color::DarkYellow;
const C_MOSQUITO: Color = Color::Red;
const C_CLOUD: Color = Color::White;
const C_DROP: Color = Color::Blue;
const C_EXPLOSION: Color = Color::Yellow;
const C_HINT: Color = Color::DarkGrey;

const HINT: &str = "SPACE / click cloud : Drop   P : Pause   R : Restart   Q : Quit";

// ── Field ↔ terminal mapping ──────────────────────────────────────────────────

/// Row 0 holds the HUD and the last row the controls hint; the field is
/// stretched over the rows in between.
#[derive(Clone, Copy, Debug)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    field_width: f32,
    field_height: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, field: &FieldConfig) -> Self {
        Self {
            cols,
            rows,
            field_width: field.width,
            field_height: field.height,
        }
    }

    pub fn current(field: &FieldConfig) -> std::io::Result<Self> {
        let (cols, rows) = terminal::size()?;
        Ok(Self::new(cols, rows, field))
    }

    fn play_rows(&self) -> f32 {
        self.rows.saturating_sub(2).max(1) as f32
    }

    fn col(&self, x: f32) -> i32 {
        (x / self.field_width * self.cols as f32).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        1 + (y / self.field_height * self.play_rows()).floor() as i32
    }

    fn visible(&self, col: i32, row: i32) -> bool {
        col >= 0 && col < self.cols as i32 && row >= 1 && row < self.rows as i32 - 1
    }

    /// Inverse mapping for pointer events.
    pub fn to_field(&self, col: u16, row: u16) -> (f32, f32) {
        let x = (col as f32 + 0.5) / self.cols.max(1) as f32 * self.field_width;
        let y = (row.saturating_sub(1) as f32 + 0.5) / self.play_rows() * self.field_height;
        (x, y)
    }
}

// ── Render sink ───────────────────────────────────────────────────────────────

pub struct TerminalSink<'a, W: Write> {
    out: &'a mut W,
    catalog: &'a AssetCatalog,
    level: Level,
    error: Option<std::io::Error>,
}

impl<'a, W: Write> TerminalSink<'a, W> {
    pub fn new(out: &'a mut W, catalog: &'a AssetCatalog, level: Level) -> Self {
        Self {
            out,
            catalog,
            level,
            error: None,
        }
    }

    /// First I/O failure seen since the last call, if any.
    pub fn take_error(&mut self) -> Option<std::io::Error> {
        self.error.take()
    }

    fn glyph(&self, category: AssetCategory, variant: &str) -> &str {
        match assets::lookup(self.catalog, category, variant) {
            Ok(asset) => &asset.handle,
            Err(err) => {
                warn!(%err, "sprite lookup failed");
                "?"
            }
        }
    }

    fn draw(&mut self, snap: &Snapshot<'_>) -> std::io::Result<()> {
        let view = Viewport::current(snap.field)?;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;

        draw_hud(self.out, snap, &view, self.level)?;
        for (index, building) in snap.scenery.iter().enumerate() {
            draw_building(self.out, building, index, snap.field, &view)?;
        }
        if snap.cloud.alive {
            let glyph = self.glyph(AssetCategory::Cloud, "CLOUD").to_string();
            draw_cloud(self.out, snap.cloud, &glyph, &view)?;
        }
        for drop in snap.drops.iter() {
            let glyph = self.glyph(AssetCategory::WaterDrop, drop.kind.asset_name()).to_string();
            draw_drop(self.out, drop, &glyph, &view)?;
        }
        for explosion in snap.explosions.iter() {
            let glyph = self
                .glyph(AssetCategory::Explosion, explosion.kind.asset_name())
                .to_string();
            draw_explosion(self.out, explosion, &glyph, &view)?;
        }
        draw_controls_hint(self.out, &view)?;

        match snap.status {
            GameStatus::Won => draw_banner(
                self.out,
                &view,
                &["ALL MOSQUITOES DOWN!", "R - Play Again  Q - Quit"],
                Color::Green,
            )?,
            GameStatus::Lost => draw_banner(
                self.out,
                &view,
                &["THE CLOUD CRASHED", "R - Play Again  Q - Quit"],
                Color::Red,
            )?,
            GameStatus::Paused => draw_banner(self.out, &view, &["PAUSED", "P - Resume"], Color::Yellow)?,
            GameStatus::Loading => draw_banner(self.out, &view, &["Loading..."], Color::DarkGrey)?,
            GameStatus::Playing => {}
        }

        // Park cursor in a harmless spot and flush
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
        self.out.flush()
    }
}

impl<W: Write> RenderSink for TerminalSink<'_, W> {
    fn render(&mut self, snapshot: &Snapshot<'_>) {
        if let Err(err) = self.draw(snapshot) {
            self.error.get_or_insert(err);
        }
    }
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(
    out: &mut W,
    snap: &Snapshot<'_>,
    view: &Viewport,
    level: Level,
) -> std::io::Result<()> {
    let left = snap.drops_left.min(snap.max_drops) as usize;
    let spent = snap.max_drops as usize - left;
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_DROPS))?;
    out.queue(Print(format!("Drops:{}{}", "●".repeat(left), "○".repeat(spent))))?;

    out.queue(style::SetForegroundColor(C_HUD_PASS))?;
    out.queue(Print(format!("  Pass:{}", snap.pass)))?;

    let level_str = match level {
        Level::Easy => "[ EASY ]",
        Level::Medium => "[ MEDIUM ]",
        Level::Hard => "[ HARD ]",
    };
    let level_color = match level {
        Level::Easy => Color::Green,
        Level::Medium => Color::Yellow,
        Level::Hard => Color::Red,
    };
    let lx = (view.cols / 2).saturating_sub(level_str.len() as u16 / 2);
    out.queue(cursor::MoveTo(lx, 0))?;
    out.queue(style::SetForegroundColor(level_color))?;
    out.queue(Print(level_str))?;

    let right = format!(
        "Mosquitoes:{}  Hit:{}  Floors:{}",
        snap.scenery.mosquito_count(),
        snap.stats.mosquitoes_destroyed,
        snap.stats.floors_destroyed
    );
    let rx = view.cols.saturating_sub(right.chars().count() as u16 + 1);
    out.queue(cursor::MoveTo(rx, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_TARGETS))?;
    out.queue(Print(&right))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_building<W: Write>(
    out: &mut W,
    building: &Building,
    index: usize,
    field: &FieldConfig,
    view: &Viewport,
) -> std::io::Result<()> {
    let left = view.col(index as f32 * field.column_width);
    // Leave a one-cell gap between neighbours when there is room for it
    let right = view.col((index + 1) as f32 * field.column_width);
    let width = (right - left - 1).max(1) as usize;

    let mut base = 0.0;
    for floor in building.floors() {
        let top_row = view.row(field.height - base - floor.height);
        let bottom_row = view.row(field.height - base).min(view.rows as i32 - 2);
        base += floor.height;

        let color = match floor.category {
            AssetCategory::Basement => C_BASEMENT,
            AssetCategory::MosquitoCap => C_MOSQUITO,
            AssetCategory::Roof => C_ROOF,
            _ => C_FLOOR,
        };
        out.queue(style::SetForegroundColor(color))?;
        let fill = floor.handle.repeat(width);
        for row in top_row..=bottom_row {
            if view.visible(left, row) {
                out.queue(cursor::MoveTo(left as u16, row as u16))?;
                out.queue(Print(&fill))?;
            }
        }
    }
    Ok(())
}

fn draw_cloud<W: Write>(
    out: &mut W,
    cloud: &Cloud,
    glyph: &str,
    view: &Viewport,
) -> std::io::Result<()> {
    let left = view.col(cloud.x);
    let width = (view.col(cloud.x + CLOUD_WIDTH) - left).max(1);
    let top = view.row(cloud.y);
    let bottom = view.row(cloud.y + CLOUD_HEIGHT).max(top);

    out.queue(style::SetForegroundColor(C_CLOUD))?;
    for row in top..=bottom {
        for col in left..left + width {
            if view.visible(col, row) {
                out.queue(cursor::MoveTo(col as u16, row as u16))?;
                out.queue(Print(glyph))?;
            }
        }
    }
    Ok(())
}

fn draw_drop<W: Write>(
    out: &mut W,
    drop: &WaterDrop,
    glyph: &str,
    view: &Viewport,
) -> std::io::Result<()> {
    let (col, row) = (view.col(drop.x), view.row(drop.y));
    if view.visible(col, row) {
        out.queue(cursor::MoveTo(col as u16, row as u16))?;
        out.queue(style::SetForegroundColor(C_DROP))?;
        out.queue(Print(glyph))?;
    }
    Ok(())
}

/// A burst that shrinks as its frames run out:
///   \ | /
///   - ✶ -
///   / | \
fn draw_explosion<W: Write>(
    out: &mut W,
    explosion: &Explosion,
    glyph: &str,
    view: &Viewport,
) -> std::io::Result<()> {
    let (cx, cy) = (view.col(explosion.x), view.row(explosion.y));
    let remaining = explosion.frames.saturating_sub(explosion.frame);
    let ring: &[(i32, i32, &str)] = if remaining * 2 > explosion.frames {
        &[(-1, -1, "\\"), (0, -1, "|"), (1, -1, "/"), (-1, 0, "-"), (1, 0, "-"), (-1, 1, "/"), (0, 1, "|"), (1, 1, "\\")]
    } else {
        &[]
    };

    out.queue(style::SetForegroundColor(C_EXPLOSION))?;
    for (dx, dy, piece) in ring.iter().copied().chain(std::iter::once((0, 0, glyph))) {
        let (col, row) = (cx + dx, cy + dy);
        if view.visible(col, row) {
            out.queue(cursor::MoveTo(col as u16, row as u16))?;
            out.queue(Print(piece))?;
        }
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(HINT))?;
    Ok(())
}

// ── Overlays ──────────────────────────────────────────────────────────────────

fn draw_banner<W: Write>(
    out: &mut W,
    view: &Viewport,
    lines: &[&str],
    color: Color,
) -> std::io::Result<()> {
    let inner = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) + 4;
    let top = format!("╔{}╗", "═".repeat(inner));
    let bottom = format!("╚{}╝", "═".repeat(inner));
    let mut rows = vec![top];
    rows.extend(lines.iter().map(|l| format!("║{:^width$}║", l, width = inner)));
    rows.push(bottom);

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(rows.len() as u16 / 2);
    out.queue(style::SetForegroundColor(color))?;
    for (i, line) in rows.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(Print(line))?;
    }
    Ok(())
}
