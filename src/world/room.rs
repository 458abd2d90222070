//! Room data
//!
//! A room is identified by its grid cell. It owns its doors, the enemy
//! manifest handed to the spawner, and the spawn points supplied by the
//! content collaborator.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::door::{Door, DoorState, RoomHandle};
use super::grid::{Direction, GridCoordinate, LocalPoint};

/// Structural role of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoomType {
    Start,
    #[default]
    Normal,
    Boss,
    Treasure,
    Shop,
}

impl RoomType {
    /// Inclusive reward count range rolled when the room is cleared
    pub fn reward_range(&self) -> (u32, u32) {
        match self {
            RoomType::Boss => (2, 3),
            RoomType::Treasure => (3, 4),
            RoomType::Normal => (1, 2),
            _ => (1, 1),
        }
    }

    /// Roll a reward count for this room type
    pub fn roll_reward_count(&self, rng: &mut impl Rng) -> u32 {
        let (min, max) = self.reward_range();
        rng.gen_range(min..=max)
    }

    /// Whether rooms of this type ever spawn hostiles
    pub fn has_hostile_manifest(&self) -> bool {
        !matches!(self, RoomType::Start | RoomType::Shop)
    }

    /// Special rooms the linker may restrict to a single neighbor
    pub fn is_dead_end_candidate(&self) -> bool {
        matches!(self, RoomType::Start | RoomType::Boss)
    }

    pub fn name(&self) -> &'static str {
        match self {
            RoomType::Start => "Start",
            RoomType::Normal => "Normal",
            RoomType::Boss => "Boss",
            RoomType::Treasure => "Treasure",
            RoomType::Shop => "Shop",
        }
    }

    /// Minimap glyph
    pub fn glyph(&self) -> char {
        match self {
            RoomType::Start => 'S',
            RoomType::Normal => 'o',
            RoomType::Boss => 'B',
            RoomType::Treasure => 'T',
            RoomType::Shop => '$',
        }
    }
}

/// Gameplay progress of a room
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LifecycleState {
    #[default]
    Unvisited,
    Visited,
    Cleared,
}

/// A room in the dungeon graph
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    coord: GridCoordinate,
    room_type: RoomType,
    state: LifecycleState,
    /// Door slots indexed by [`Direction::index`]
    doors: [Option<Door>; 4],
    /// Weak references to linked rooms, in link order
    connected: Vec<RoomHandle>,
    /// Enemy archetype ids spawned on first entry
    enemy_manifest: Vec<String>,
    /// Room-local spawn positions from the content populator
    spawn_points: Vec<LocalPoint>,
    /// Where rewards drop when the room is cleared
    reward_anchor: LocalPoint,
    /// Reward count rolled on clearing
    reward_count: Option<u32>,
    /// Live hostiles as reported by the enemy collaborator
    hostiles: u32,
    /// A cleared neighbor has made this room reachable
    revealed: bool,
}

impl Room {
    /// Create an unvisited room. Start rooms begin cleared.
    pub fn new(coord: GridCoordinate, room_type: RoomType) -> Self {
        let state = if room_type == RoomType::Start {
            LifecycleState::Cleared
        } else {
            LifecycleState::Unvisited
        };
        Self {
            coord,
            room_type,
            state,
            doors: [None, None, None, None],
            connected: Vec::new(),
            enemy_manifest: Vec::new(),
            spawn_points: Vec::new(),
            reward_anchor: LocalPoint::ORIGIN,
            reward_count: None,
            hostiles: 0,
            revealed: room_type == RoomType::Start,
        }
    }

    pub fn coord(&self) -> GridCoordinate {
        self.coord
    }

    pub fn room_type(&self) -> RoomType {
        self.room_type
    }

    /// Retype a room. Only generation repairs should call this.
    pub(crate) fn set_room_type(&mut self, room_type: RoomType) {
        self.room_type = room_type;
    }

    pub fn state(&self) -> LifecycleState {
        self.state
    }

    pub(crate) fn set_state(&mut self, state: LifecycleState) {
        self.state = state;
    }

    pub fn is_visited(&self) -> bool {
        self.state != LifecycleState::Unvisited
    }

    pub fn is_cleared(&self) -> bool {
        self.state == LifecycleState::Cleared
    }

    pub fn is_revealed(&self) -> bool {
        self.revealed
    }

    pub(crate) fn reveal(&mut self) -> bool {
        let was_hidden = !self.revealed;
        self.revealed = true;
        was_hidden
    }

    pub fn door(&self, direction: Direction) -> Option<&Door> {
        self.doors[direction.index()].as_ref()
    }

    /// Existing doors in slot order
    pub fn doors(&self) -> impl Iterator<Item = &Door> {
        self.doors.iter().flatten()
    }

    /// Directions that hold a door
    pub fn door_directions(&self) -> Vec<Direction> {
        self.doors().map(|d| d.direction()).collect()
    }

    pub fn door_count(&self) -> usize {
        self.doors().count()
    }

    pub fn connected(&self) -> &[RoomHandle] {
        &self.connected
    }

    pub fn is_connected_to(&self, coord: GridCoordinate) -> bool {
        self.connected.iter().any(|h| h.coord == coord)
    }

    /// Install a door and record the link. Refuses occupied slots and repeat links.
    pub(crate) fn attach_door(&mut self, door: Door) -> bool {
        let slot = door.direction().index();
        if self.doors[slot].is_some() || self.is_connected_to(door.target().coord) {
            return false;
        }
        self.connected.push(door.target());
        self.doors[slot] = Some(door);
        true
    }

    /// Door state this room's progress allows.
    ///
    /// Doors open only once the room is cleared (Start rooms always are).
    /// A visited room with enemies to fight keeps them locked; otherwise closed.
    pub fn permitted_door_state(&self) -> DoorState {
        match self.state {
            LifecycleState::Cleared => DoorState::Open,
            _ if self.room_type == RoomType::Start => DoorState::Open,
            LifecycleState::Visited if !self.enemy_manifest.is_empty() => DoorState::Locked,
            _ => DoorState::Closed,
        }
    }

    /// Bring every door in line with [`Room::permitted_door_state`].
    ///
    /// Returns the new state if any door changed.
    pub(crate) fn refresh_doors(&mut self) -> Option<DoorState> {
        let state = self.permitted_door_state();
        let mut changed = false;
        for door in self.doors.iter_mut().flatten() {
            if door.state() != state {
                door.set_state(state);
                changed = true;
            }
        }
        changed.then_some(state)
    }

    pub fn enemy_manifest(&self) -> &[String] {
        &self.enemy_manifest
    }

    pub fn set_enemy_manifest(&mut self, manifest: Vec<String>) {
        self.enemy_manifest = manifest;
    }

    pub fn spawn_points(&self) -> &[LocalPoint] {
        &self.spawn_points
    }

    pub fn set_spawn_points(&mut self, points: Vec<LocalPoint>) {
        self.spawn_points = points;
    }

    pub fn reward_anchor(&self) -> LocalPoint {
        self.reward_anchor
    }

    pub fn set_reward_anchor(&mut self, anchor: LocalPoint) {
        self.reward_anchor = anchor;
    }

    pub fn hostiles(&self) -> u32 {
        self.hostiles
    }

    pub fn has_hostiles(&self) -> bool {
        self.hostiles > 0
    }

    pub(crate) fn set_hostiles(&mut self, count: u32) {
        self.hostiles = count;
    }

    /// Inclusive reward count range for this room's type
    pub fn reward_range(&self) -> (u32, u32) {
        self.room_type.reward_range()
    }

    /// Rewards granted when the room was cleared, if it has been
    pub fn reward_count(&self) -> Option<u32> {
        self.reward_count
    }

    pub(crate) fn set_reward_count(&mut self, count: u32) {
        self.reward_count = Some(count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::door::TeleportAnchor;

    #[test]
    fn test_start_room_begins_cleared() {
        let start = Room::new(GridCoordinate::new(2, 2), RoomType::Start);
        assert!(start.is_cleared());
        assert!(start.is_revealed());

        let normal = Room::new(GridCoordinate::new(2, 3), RoomType::Normal);
        assert_eq!(normal.state(), LifecycleState::Unvisited);
        assert!(!normal.is_revealed());
    }

    #[test]
    fn test_reward_ranges() {
        assert_eq!(RoomType::Boss.reward_range(), (2, 3));
        assert_eq!(RoomType::Treasure.reward_range(), (3, 4));
        assert_eq!(RoomType::Normal.reward_range(), (1, 2));
        assert_eq!(RoomType::Shop.reward_range(), (1, 1));
        assert_eq!(RoomType::Start.reward_range(), (1, 1));
    }

    #[test]
    fn test_permitted_door_state_follows_progress() {
        let mut room = Room::new(GridCoordinate::new(1, 1), RoomType::Normal);
        assert_eq!(room.permitted_door_state(), DoorState::Closed);
        room.set_state(LifecycleState::Visited);
        // Nothing to fight, nothing to lock in
        assert_eq!(room.permitted_door_state(), DoorState::Closed);
        room.set_enemy_manifest(vec!["slime".to_string()]);
        assert_eq!(room.permitted_door_state(), DoorState::Locked);
        room.set_state(LifecycleState::Cleared);
        assert_eq!(room.permitted_door_state(), DoorState::Open);

        let start = Room::new(GridCoordinate::new(2, 2), RoomType::Start);
        assert_eq!(start.permitted_door_state(), DoorState::Open);
    }

    #[test]
    fn test_attach_door_refuses_duplicates() {
        let mut room = Room::new(GridCoordinate::new(0, 0), RoomType::Normal);
        let target = RoomHandle::new(1, GridCoordinate::new(1, 0));
        let anchor = TeleportAnchor::for_door(Direction::East, 20.0, 1.0);

        assert!(room.attach_door(Door::new(Direction::East, target, anchor)));
        assert!(!room.attach_door(Door::new(Direction::East, target, anchor)));
        assert_eq!(room.door_count(), 1);
        assert_eq!(room.connected().len(), 1);
        assert!(room.is_connected_to(GridCoordinate::new(1, 0)));
    }
}
