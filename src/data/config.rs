//! Generation configuration
//!
//! Loads tuning values from a RON file, falling back to built-in defaults
//! when the file is missing.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::enemies::EncounterRules;
use super::rewards::RewardTable;

/// Errors raised while loading or writing configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] ron::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}

/// How Start and Boss rooms are wired to their neighbors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpecialRoomLinks {
    /// Link to every occupied neighbor, like any other room
    #[default]
    AllNeighbors,
    /// Link to a single neighbor, making the room a dead end where possible
    SingleNeighbor,
}

/// Room type assignment odds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoomChances {
    pub treasure_chance: f64,
    pub shop_chance: f64,
    /// Fraction of the target room count (inclusive) where the boss is placed
    pub boss_window: (f64, f64),
}

impl Default for RoomChances {
    fn default() -> Self {
        Self {
            treasure_chance: 0.15,
            shop_chance: 0.10,
            boss_window: (0.7, 0.8),
        }
    }
}

/// Physical room layout used for teleport anchors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutSettings {
    /// Width/height of a room in world units
    pub room_extent: f32,
    /// Distance kept between a teleport anchor and the wall it enters through
    pub door_margin: f32,
    pub special_room_links: SpecialRoomLinks,
}

impl Default for LayoutSettings {
    fn default() -> Self {
        Self {
            room_extent: 20.0,
            door_margin: 1.0,
            special_room_links: SpecialRoomLinks::AllNeighbors,
        }
    }
}

/// All generation and lifecycle tuning
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DungeonConfig {
    pub chances: RoomChances,
    pub layout: LayoutSettings,
    pub encounters: EncounterRules,
    pub rewards: RewardTable,
}

impl DungeonConfig {
    /// Load from a RON file, using defaults if the file does not exist
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::warn!("Config {:?} not found, using defaults", path);
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_ron(&content)?;
        log::info!("Loaded dungeon config from {:?}", path);
        Ok(config)
    }

    /// Parse and validate a RON document
    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: DungeonConfig = ron::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_ron(&self) -> Result<String, ConfigError> {
        Ok(ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())?)
    }

    /// Check value ranges
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.chances;
        for (name, value) in [("treasure_chance", c.treasure_chance), ("shop_chance", c.shop_chance)] {
            if !(0.0..=1.0).contains(&value) {
                return Err(ConfigError::Invalid(format!("{} must be in [0, 1], got {}", name, value)));
            }
        }
        let (lo, hi) = c.boss_window;
        if !(0.0..=1.0).contains(&lo) || !(0.0..=1.0).contains(&hi) || lo > hi {
            return Err(ConfigError::Invalid(format!("boss_window ({}, {}) is not a sub-range of [0, 1]", lo, hi)));
        }

        let l = &self.layout;
        if !l.room_extent.is_finite() || l.room_extent <= 0.0 {
            return Err(ConfigError::Invalid(format!("room_extent must be positive, got {}", l.room_extent)));
        }
        if !l.door_margin.is_finite() || l.door_margin < 0.0 || l.door_margin > l.room_extent / 2.0 {
            return Err(ConfigError::Invalid(format!(
                "door_margin {} must lie within half the room extent ({})",
                l.door_margin,
                l.room_extent / 2.0
            )));
        }

        for rule in &self.encounters.rules {
            if rule.count.0 > rule.count.1 {
                return Err(ConfigError::Invalid(format!("{:?} enemy count range is inverted", rule.room_type)));
            }
            if rule.count.1 > 0 && rule.pool.is_empty() {
                return Err(ConfigError::Invalid(format!("{:?} spawns enemies from an empty pool", rule.room_type)));
            }
        }
        let scatter = self.rewards.scatter;
        if !scatter.is_finite() || !(0.0..=l.room_extent / 2.0).contains(&scatter) {
            return Err(ConfigError::Invalid(format!(
                "reward scatter {} must lie within half the room extent ({})",
                scatter,
                l.room_extent / 2.0
            )));
        }

        for entry in &self.rewards.entries {
            if entry.value.0 > entry.value.1 {
                return Err(ConfigError::Invalid(format!("{:?} reward value range is inverted", entry.kind)));
            }
        }
        Ok(())
    }
}

/// Write the default config as RON
pub fn export_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }
    let content = DungeonConfig::default().to_ron()?;
    fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(DungeonConfig::default().validate().is_ok());
    }

    #[test]
    fn test_ron_round_trip_of_defaults() {
        let config = DungeonConfig::default();
        let text = config.to_ron().expect("serialize defaults");
        let parsed = DungeonConfig::from_ron(&text).expect("parse defaults");
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_rejects_out_of_range_chance() {
        let mut config = DungeonConfig::default();
        config.chances.shop_chance = 1.5;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_oversized_margin() {
        let mut config = DungeonConfig::default();
        config.layout.door_margin = 15.0;
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_unbounded_reward_scatter() {
        let mut config = DungeonConfig::default();
        config.rewards.scatter = 3.0e38;
        let text = config.to_ron().expect("serialize");
        assert!(matches!(DungeonConfig::from_ron(&text), Err(ConfigError::Invalid(_))));

        for scatter in [f32::NAN, f32::INFINITY, -1.0, 10.5] {
            config.rewards.scatter = scatter;
            assert!(
                matches!(config.validate(), Err(ConfigError::Invalid(_))),
                "scatter {} accepted",
                scatter
            );
        }

        config.rewards.scatter = 10.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() {
        let config = DungeonConfig::load(Path::new("definitely/not/here.ron")).expect("defaults");
        assert_eq!(config, DungeonConfig::default());
    }

    #[test]
    fn test_export_and_load() {
        let path = std::env::temp_dir().join(format!("deepgrid-config-{}.ron", std::process::id()));
        export_default_config(&path).expect("export");
        let loaded = DungeonConfig::load(&path).expect("load");
        assert_eq!(loaded, DungeonConfig::default());
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_parse_error_surfaces() {
        assert!(matches!(DungeonConfig::from_ron("(chances: oops"), Err(ConfigError::Parse(_))));
    }
}
