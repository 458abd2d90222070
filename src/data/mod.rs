//! Data-driven tuning
//!
//! Generation chances, layout, encounter manifests and reward tables, all
//! loadable from a single RON file.

pub mod config;
pub mod enemies;
pub mod rewards;

pub use config::{export_default_config, ConfigError, DungeonConfig, LayoutSettings, RoomChances, SpecialRoomLinks};
pub use enemies::{default_encounter_rules, EncounterRules, ManifestRule};
pub use rewards::{RewardDrop, RewardEntry, RewardKind, RewardTable};
