//! Simulation core for a cloud-versus-mosquito arcade game.
//!
//! A cloud drifts across the skyline dropping water; every building capped
//! with a mosquito must be destroyed before the cloud sinks into the roofs.
//! Presentation, asset decoding and input devices live outside this crate and
//! talk to it through [`assets::AssetProvider`], [`driver::RenderSink`] and the
//! [`state::GameState`] operations.

pub mod assets;
pub mod compute;
pub mod config;
pub mod driver;
pub mod entities;
pub mod error;
pub mod registry;
pub mod scenery;
pub mod state;

pub use error::{GameError, GameResult};
