//! Room events
//!
//! Lifecycle transitions are reported as events so the host can spawn
//! enemies, play effects and update its UI without polling every room.

use crate::data::RewardDrop;
use crate::world::{GridCoordinate, LocalPoint, RoomType};

#[derive(Debug, Clone, PartialEq)]
pub enum RoomEvent {
    /// The player entered a room
    Entered { coord: GridCoordinate, room_type: RoomType },
    /// First entry into a hostile room; the host should spawn these
    SpawnEnemies {
        coord: GridCoordinate,
        manifest: Vec<String>,
        spawn_points: Vec<LocalPoint>,
    },
    DoorsLocked { coord: GridCoordinate },
    DoorsUnlocked { coord: GridCoordinate },
    Cleared { coord: GridCoordinate, room_type: RoomType },
    RewardsSpawned { coord: GridCoordinate, drops: Vec<RewardDrop> },
    /// Clearing `from` made the neighbor at `coord` visible on the minimap
    NeighborRevealed { from: GridCoordinate, coord: GridCoordinate },
    BossDefeated { coord: GridCoordinate },
}

impl RoomEvent {
    /// Room the event happened in
    pub fn coord(&self) -> GridCoordinate {
        match self {
            RoomEvent::Entered { coord, .. }
            | RoomEvent::SpawnEnemies { coord, .. }
            | RoomEvent::DoorsLocked { coord }
            | RoomEvent::DoorsUnlocked { coord }
            | RoomEvent::Cleared { coord, .. }
            | RoomEvent::RewardsSpawned { coord, .. }
            | RoomEvent::BossDefeated { coord } => *coord,
            RoomEvent::NeighborRevealed { from, .. } => *from,
        }
    }
}
