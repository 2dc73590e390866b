//! screen_reveal: scroll-driven dolly through a procedural TV into a card helix.
//!
//! Engine-agnostic core. The Bevy side lives in `bevy_screen_reveal`; this
//! crate only produces blueprints and per-tick [`Frame`]s from scroll input
//! and elapsed time.

pub mod data;
pub mod director;
pub mod error;
pub mod model;
pub mod motion;
pub mod state;
pub mod util;

use std::path::Path;

use anyhow::Result;

pub use crate::data::carousel::CarouselItem;
pub use crate::data::config::SceneConfig;
pub use crate::director::{CardFrame, Director, Frame, IntroFrame, SceneEvent};
pub use crate::error::SceneError;
pub use crate::model::{SceneBlueprint, SceneBuilder};
pub use crate::state::scroll::{Direction, InputOutcome, Mode};
pub use crate::state::transition::{Layer, Phase};

use crate::data::carousel::{default_carousel, load_carousel, load_carousel_from_bytes};
use crate::model::{CardBlueprint, build_cards};

/// Config plus carousel content: everything needed to stand a scene up.
#[derive(Debug, Clone, PartialEq)]
pub struct ScenePackage {
    pub config: SceneConfig,
    pub items: Vec<CarouselItem>,
}

impl Default for ScenePackage {
    fn default() -> Self {
        Self {
            config: SceneConfig::default(),
            items: default_carousel(),
        }
    }
}

impl ScenePackage {
    /// Load config + carousel JSON from disk.
    pub fn from_paths(
        config_path: impl AsRef<Path>,
        carousel_path: impl AsRef<Path>,
    ) -> Result<Self> {
        Ok(Self {
            config: SceneConfig::from_path(config_path)?,
            items: load_carousel(carousel_path)?,
        })
    }

    /// Load from in-memory bytes (useful for wasm).
    pub fn from_bytes(config_bytes: &[u8], carousel_bytes: &[u8]) -> Result<Self> {
        Ok(Self {
            config: SceneConfig::from_bytes(config_bytes)?,
            items: load_carousel_from_bytes(carousel_bytes)?,
        })
    }

    pub fn blueprint(&self) -> Result<SceneBlueprint> {
        SceneBuilder::new(&self.config).build()
    }

    pub fn cards(&self) -> Result<Vec<CardBlueprint>> {
        build_cards(&self.items, &self.config.helix)
    }

    pub fn director(&self) -> Result<Director> {
        Director::new(self.config.clone(), self.items.clone())
    }
}
