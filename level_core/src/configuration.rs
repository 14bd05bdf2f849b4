use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning knobs for level construction and the reveal timeline. Every field has a default,
/// so an empty TOML document is a valid configuration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct LevelConfiguration {
    /// Whole-pass attempts at randomized placement before accepting a partial result.
    pub placement_attempts: u32,
    pub flip_duration_ms: u64,
    /// Delay between consecutive tiles of a small batch.
    pub flip_stagger_ms: u64,
    /// Delay between consecutive rows of a large batch.
    pub row_stagger_ms: u64,
    /// Batches larger than this flip row by row instead of tile by tile.
    pub row_batch_threshold: usize,
    pub door_highlight_radius: f32,
    /// Used when the authored map does not specify tile dimensions.
    pub tile_width: u32,
    pub tile_height: u32,
    pub pickups: PickupConfiguration,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct PickupConfiguration {
    pub level_count: usize,
    /// Every `fixed_interval`-th level gets the fixed UPGRADE/ALERT pair.
    pub fixed_interval: usize,
}

impl Default for LevelConfiguration {
    fn default() -> Self {
        LevelConfiguration {
            placement_attempts: 3,
            flip_duration_ms: 300,
            flip_stagger_ms: 40,
            row_stagger_ms: 80,
            row_batch_threshold: 9,
            door_highlight_radius: 1.5,
            tile_width: 32,
            tile_height: 32,
            pickups: PickupConfiguration::default(),
        }
    }
}

impl Default for PickupConfiguration {
    fn default() -> Self {
        PickupConfiguration {
            level_count: 12,
            fixed_interval: 3,
        }
    }
}

impl LevelConfiguration {
    pub fn from_toml_str(toml_str: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(toml_str)?)
    }

    pub fn flip_duration(&self) -> Duration {
        Duration::from_millis(self.flip_duration_ms)
    }

    pub fn flip_stagger(&self) -> Duration {
        Duration::from_millis(self.flip_stagger_ms)
    }

    pub fn row_stagger(&self) -> Duration {
        Duration::from_millis(self.row_stagger_ms)
    }
}
