use crate::assets::AssetCategory;

/// Failures outside the simulation proper: startup preconditions and I/O.
#[derive(thiserror::Error, Debug)]
pub enum GameError {
    /// The asset catalog has no variant at all for a category.
    #[error("asset catalog has no {category} variants")]
    MissingAssets { category: AssetCategory },

    /// A named sprite was asked for but is not in the catalog.
    #[error("asset catalog has no {category} variant named {variant:?}")]
    MissingVariant {
        category: AssetCategory,
        variant: String,
    },

    /// Floors must have a positive height.
    #[error("{category} variant {variant:?} has zero pixel height")]
    InvalidAsset {
        category: AssetCategory,
        variant: String,
    },

    #[error("invalid field configuration: {0}")]
    InvalidConfig(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type GameResult<T> = Result<T, GameError>;
