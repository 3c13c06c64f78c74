/// Asset catalog handed to the core by the presentation layer.
///
/// The core never decodes images. It only needs, per semantic category, the
/// available variant names, their pixel size and an opaque handle the render
/// sink understands.

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{GameError, GameResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum AssetCategory {
    Basement,
    Floor,
    Roof,
    MosquitoCap,
    Cloud,
    Explosion,
    WaterDrop,
}

impl AssetCategory {
    pub const ALL: [AssetCategory; 7] = [
        AssetCategory::Basement,
        AssetCategory::Floor,
        AssetCategory::Roof,
        AssetCategory::MosquitoCap,
        AssetCategory::Cloud,
        AssetCategory::Explosion,
        AssetCategory::WaterDrop,
    ];

    /// Categories whose variants become building floors.
    pub fn is_floor_part(self) -> bool {
        matches!(
            self,
            AssetCategory::Basement
                | AssetCategory::Floor
                | AssetCategory::Roof
                | AssetCategory::MosquitoCap
        )
    }
}

impl fmt::Display for AssetCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AssetCategory::Basement => "basement",
            AssetCategory::Floor => "floor",
            AssetCategory::Roof => "roof",
            AssetCategory::MosquitoCap => "mosquito-cap",
            AssetCategory::Cloud => "cloud-sprite",
            AssetCategory::Explosion => "explosion-sprite",
            AssetCategory::WaterDrop => "water-drop-sprite",
        };
        f.write_str(name)
    }
}

/// One decoded sprite, as far as the simulation cares.
#[derive(Clone, Debug, PartialEq)]
pub struct Asset {
    pub pixel_height: u32,
    /// Frames in the sprite sheet; 1 for still images.
    pub frame_count: u32,
    /// Renderer-defined handle (a texture key, a glyph string, ...).
    pub handle: String,
}

impl Asset {
    pub fn still(pixel_height: u32, handle: impl Into<String>) -> Self {
        Self {
            pixel_height,
            frame_count: 1,
            handle: handle.into(),
        }
    }

    pub fn animated(pixel_height: u32, frame_count: u32, handle: impl Into<String>) -> Self {
        Self {
            pixel_height,
            frame_count,
            handle: handle.into(),
        }
    }
}

pub type Variants = BTreeMap<String, Asset>;

/// External collaborator: every image must be fully resolved before the
/// provider is handed to [`crate::state::GameState::build_scene`].
pub trait AssetProvider {
    fn assets(&self, category: AssetCategory) -> Option<&Variants>;
}

/// Variants of `category`, or [`GameError::MissingAssets`] when there are none.
pub fn variants(provider: &dyn AssetProvider, category: AssetCategory) -> GameResult<&Variants> {
    match provider.assets(category) {
        Some(found) if !found.is_empty() => Ok(found),
        _ => Err(GameError::MissingAssets { category }),
    }
}

pub fn lookup<'a>(
    provider: &'a dyn AssetProvider,
    category: AssetCategory,
    variant: &str,
) -> GameResult<&'a Asset> {
    variants(provider, category)?
        .get(variant)
        .ok_or_else(|| GameError::MissingVariant {
            category,
            variant: variant.to_string(),
        })
}

/// Checks the startup precondition: every category present, no flat floors.
pub fn validate(provider: &dyn AssetProvider) -> GameResult<()> {
    for category in AssetCategory::ALL {
        let found = variants(provider, category)?;
        if category.is_floor_part() {
            if let Some((name, _)) = found.iter().find(|(_, asset)| asset.pixel_height == 0) {
                return Err(GameError::InvalidAsset {
                    category,
                    variant: name.clone(),
                });
            }
        }
    }
    Ok(())
}

// ── In-memory catalog ─────────────────────────────────────────────────────────

#[derive(Clone, Debug, Default)]
pub struct AssetCatalog {
    categories: BTreeMap<AssetCategory, Variants>,
}

impl AssetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, category: AssetCategory, variant: impl Into<String>, asset: Asset) {
        self.categories
            .entry(category)
            .or_default()
            .insert(variant.into(), asset);
    }

    pub fn with(mut self, category: AssetCategory, variant: impl Into<String>, asset: Asset) -> Self {
        self.insert(category, variant, asset);
        self
    }

    /// The stock sprite set. Handles are the glyphs the terminal front-end
    /// paints for each variant.
    pub fn builtin() -> Self {
        use AssetCategory::*;

        Self::new()
            .with(Basement, "FLOOR_BASEMENT_A", Asset::still(56, "▓"))
            .with(Basement, "FLOOR_BASEMENT_B", Asset::still(52, "▒"))
            .with(Basement, "FLOOR_BASEMENT_C", Asset::still(60, "█"))
            .with(Basement, "FLOOR_BASEMENT_D", Asset::still(48, "▓"))
            .with(Basement, "FLOOR_BASEMENT_E", Asset::still(56, "▒"))
            .with(Floor, "FLOOR_A", Asset::still(40, "▤"))
            .with(Floor, "FLOOR_B", Asset::still(36, "▦"))
            .with(Floor, "FLOOR_C", Asset::still(44, "▥"))
            .with(Floor, "FLOOR_D", Asset::still(38, "▧"))
            .with(Roof, "FLOOR_ROOF_A", Asset::still(30, "▲"))
            .with(Roof, "FLOOR_ROOF_E", Asset::still(26, "▀"))
            .with(Roof, "FLOOR_ROOF_F", Asset::still(34, "◢"))
            .with(MosquitoCap, "MOSQUITO_A", Asset::still(52, "Ж"))
            .with(MosquitoCap, "MOSQUITO_B", Asset::still(48, "ж"))
            .with(MosquitoCap, "MOSQUITO_C", Asset::still(56, "Ѫ"))
            .with(Cloud, "CLOUD", Asset::still(50, "☁"))
            .with(Explosion, "EXPLOSION_1", Asset::animated(100, 43, "✶"))
            .with(Explosion, "EXPLOSION_2", Asset::animated(100, 41, "✹"))
            .with(Explosion, "EXPLOSION_3", Asset::animated(100, 43, "✸"))
            .with(WaterDrop, "WATER_1", Asset::still(28, "●"))
            .with(WaterDrop, "WATER_2", Asset::still(28, "o"))
            .with(WaterDrop, "WATER_3", Asset::still(28, "°"))
    }
}

impl AssetProvider for AssetCatalog {
    fn assets(&self, category: AssetCategory) -> Option<&Variants> {
        self.categories.get(&category)
    }
}
