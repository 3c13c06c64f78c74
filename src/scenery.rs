/// Procedural skyline.
///
/// Every column gets one basement, `1..=difficulty` copies of a single body
/// floor and a cap. With probability [`MOSQUITO_PROBABILITY`] the cap is a
/// mosquito, which makes the column a target.

use rand::Rng;

use crate::assets::{self, AssetCategory, AssetProvider};
use crate::config::{FieldConfig, MOSQUITO_PROBABILITY};
use crate::entities::{Building, Floor};
use crate::error::GameResult;

/// One building per column across the field. All randomness comes through
/// `rng` so a seeded RNG reproduces the same skyline.
pub fn generate_scenery(
    field: &FieldConfig,
    provider: &dyn AssetProvider,
    rng: &mut impl Rng,
) -> GameResult<Vec<Building>> {
    field.validate()?;
    let factor = field.scale_factor();
    (0..field.column_count())
        .map(|_| random_building(field.difficulty, factor, provider, rng))
        .collect()
}

pub fn random_building(
    difficulty: u32,
    factor: f32,
    provider: &dyn AssetProvider,
    rng: &mut impl Rng,
) -> GameResult<Building> {
    let basement = random_floor(AssetCategory::Basement, factor, provider, rng)?;
    // The same body floor is repeated; columns are rows of identical storeys.
    let body = random_floor(AssetCategory::Floor, factor, provider, rng)?;
    let cap_category = if rng.gen_bool(MOSQUITO_PROBABILITY) {
        AssetCategory::MosquitoCap
    } else {
        AssetCategory::Roof
    };
    let cap = random_floor(cap_category, factor, provider, rng)?;

    let body_count = rng.gen_range(0..difficulty.max(1)) as usize + 1;
    let mut floors = Vec::with_capacity(body_count + 2);
    floors.push(basement);
    floors.extend(std::iter::repeat(body).take(body_count));
    floors.push(cap);
    Ok(Building::new(floors))
}

/// Uniform pick over the category's variants, scaled to the column width.
pub fn random_floor(
    category: AssetCategory,
    factor: f32,
    provider: &dyn AssetProvider,
    rng: &mut impl Rng,
) -> GameResult<Floor> {
    let variants = assets::variants(provider, category)?;
    let index = rng.gen_range(0..variants.len());
    // `variants` is non-empty, so `index` is always in range.
    let (name, asset) = variants
        .iter()
        .nth(index)
        .ok_or(crate::GameError::MissingAssets { category })?;
    Ok(Floor {
        category,
        variant: name.clone(),
        height: asset.pixel_height as f32 * factor,
        handle: asset.handle.clone(),
    })
}
