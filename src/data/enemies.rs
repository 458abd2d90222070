//! Enemy manifest rules
//!
//! Which enemy archetypes a room hands to the spawner, by room type.

use serde::{Deserialize, Serialize};

use crate::world::RoomType;

/// How many enemies a room type rolls, and from which pool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ManifestRule {
    pub room_type: RoomType,
    /// Inclusive count range
    pub count: (u32, u32),
    /// Archetype ids to draw from (uniformly, with replacement)
    pub pool: Vec<String>,
}

/// Collection of manifest rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EncounterRules {
    pub rules: Vec<ManifestRule>,
}

impl EncounterRules {
    /// Find the rule for a room type
    pub fn for_room(&self, room_type: RoomType) -> Option<&ManifestRule> {
        self.rules.iter().find(|r| r.room_type == room_type)
    }
}

impl Default for EncounterRules {
    fn default() -> Self {
        default_encounter_rules()
    }
}

/// Stock encounter table: skeletons and slimes, a lone boss
pub fn default_encounter_rules() -> EncounterRules {
    let common = vec!["skeleton".to_string(), "slime".to_string()];
    EncounterRules {
        rules: vec![
            ManifestRule {
                room_type: RoomType::Normal,
                count: (2, 3),
                pool: common.clone(),
            },
            ManifestRule {
                room_type: RoomType::Treasure,
                count: (1, 2),
                pool: common,
            },
            ManifestRule {
                room_type: RoomType::Boss,
                count: (1, 1),
                pool: vec!["boss".to_string()],
            },
        ],
    }
}
