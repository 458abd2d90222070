//! Reward drop definitions
//!
//! Cleared rooms drop a handful of rewards around their reward anchor. The
//! count comes from the room type; the kind and value come from this table.

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::world::LocalPoint;

/// Kind of dropped reward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RewardKind {
    Coin,
    Health,
}

/// Value range for one reward kind
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardEntry {
    pub kind: RewardKind,
    /// Inclusive value range
    pub value: (u32, u32),
}

/// Reward table used for every drop
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardTable {
    pub entries: Vec<RewardEntry>,
    /// Max scatter around the reward anchor on each axis
    pub scatter: f32,
}

impl Default for RewardTable {
    fn default() -> Self {
        Self {
            entries: vec![
                RewardEntry { kind: RewardKind::Coin, value: (5, 20) },
                RewardEntry { kind: RewardKind::Health, value: (10, 25) },
            ],
            scatter: 1.0,
        }
    }
}

/// A single reward placed in a cleared room
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RewardDrop {
    pub kind: RewardKind,
    pub value: u32,
    /// Room-local drop position
    pub position: LocalPoint,
}

impl RewardTable {
    /// Roll `count` drops scattered around `anchor`
    pub fn roll(&self, count: u32, anchor: LocalPoint, rng: &mut impl Rng) -> Vec<RewardDrop> {
        if self.entries.is_empty() {
            return Vec::new();
        }

        (0..count)
            .map(|_| {
                let entry = &self.entries[rng.gen_range(0..self.entries.len())];
                let (min, max) = entry.value;
                let value = rng.gen_range(min..=max.max(min));
                let position = if self.scatter > 0.0 {
                    let dx = (rng.gen::<f32>() * 2.0 - 1.0) * self.scatter;
                    let dy = (rng.gen::<f32>() * 2.0 - 1.0) * self.scatter;
                    anchor.offset(dx, dy)
                } else {
                    anchor
                };
                RewardDrop { kind: entry.kind, value, position }
            })
            .collect()
    }
}
