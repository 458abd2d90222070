//! Doors and weak room handles
//!
//! A door belongs to exactly one room. It owns the teleport anchor where a
//! traveller lands and refers to the room on the other side through a
//! [`RoomHandle`], which only resolves against the directory that issued it.

use serde::{Deserialize, Serialize};

use super::grid::{Direction, GridCoordinate, LocalPoint};

/// Weak reference to a room: directory epoch plus grid cell.
///
/// Handles never keep a room alive. Resolving a handle against a directory
/// with a different epoch yields nothing, so handles that outlive a
/// regeneration cannot reach into the new layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RoomHandle {
    pub epoch: u64,
    pub coord: GridCoordinate,
}

impl RoomHandle {
    pub fn new(epoch: u64, coord: GridCoordinate) -> Self {
        Self { epoch, coord }
    }
}

/// Door access state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DoorState {
    Open,
    #[default]
    Closed,
    /// Sealed while the owning room is in combat
    Locked,
}

/// Landing point inside the target room, in the target room's local space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TeleportAnchor {
    pub position: LocalPoint,
}

impl TeleportAnchor {
    /// Anchor for a door leading `direction` out of its owner.
    ///
    /// The traveller enters the target through the wall facing back toward the
    /// owner, so the anchor sits on that side, pulled inward by `margin`.
    pub fn for_door(direction: Direction, room_extent: f32, margin: f32) -> Self {
        let inset = (room_extent / 2.0 - margin).max(0.0);
        Self {
            position: LocalPoint::toward(direction.opposite(), inset),
        }
    }
}

/// A door in one of a room's four wall slots
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Door {
    direction: Direction,
    state: DoorState,
    target: RoomHandle,
    anchor: TeleportAnchor,
}

impl Door {
    pub fn new(direction: Direction, target: RoomHandle, anchor: TeleportAnchor) -> Self {
        Self {
            direction,
            state: DoorState::Closed,
            target,
            anchor,
        }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn state(&self) -> DoorState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DoorState::Open
    }

    pub fn set_state(&mut self, state: DoorState) {
        self.state = state;
    }

    /// Weak handle to the room on the other side
    pub fn target(&self) -> RoomHandle {
        self.target
    }

    pub fn anchor(&self) -> &TeleportAnchor {
        &self.anchor
    }
}
