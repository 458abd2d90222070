//! Room graph directory
//!
//! Sparse map from grid cell to room. The directory is the sole owner of every
//! room in a session; everything else refers to rooms by coordinate or by
//! [`RoomHandle`].

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::door::RoomHandle;
use super::grid::{Direction, GridCoordinate};
use super::room::{Room, RoomType};

/// What the room-content populator needs to build a room's presentation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoomBlueprint {
    pub room_type: RoomType,
    pub coord: GridCoordinate,
    pub doors: Vec<Direction>,
}

/// Process-wide epoch source, so no two directories ever share an epoch
static NEXT_EPOCH: AtomicU64 = AtomicU64::new(1);

/// Owns all rooms of one generated layout
#[derive(Debug, Clone)]
pub struct RoomGraphDirectory {
    epoch: u64,
    grid_size: i32,
    rooms: HashMap<GridCoordinate, Room>,
    /// Placement order, used for every deterministic walk
    order: Vec<GridCoordinate>,
    start: Option<GridCoordinate>,
    boss: Option<GridCoordinate>,
}

impl RoomGraphDirectory {
    /// Empty directory with a fresh epoch
    pub fn new(grid_size: i32) -> Self {
        Self {
            epoch: NEXT_EPOCH.fetch_add(1, Ordering::Relaxed),
            grid_size,
            rooms: HashMap::new(),
            order: Vec::new(),
            start: None,
            boss: None,
        }
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn grid_size(&self) -> i32 {
        self.grid_size
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Insert a room. Rejects out-of-bounds cells, occupied cells and a second Start.
    pub fn insert(&mut self, room: Room) -> bool {
        let coord = room.coord();
        if !coord.in_bounds(self.grid_size) {
            log::warn!("Refusing room at {} outside {}x{} grid", coord, self.grid_size, self.grid_size);
            return false;
        }
        if self.rooms.contains_key(&coord) {
            log::warn!("Refusing room at {}: cell already occupied", coord);
            return false;
        }
        match room.room_type() {
            RoomType::Start if self.start.is_some() => {
                log::warn!("Refusing second start room at {}", coord);
                return false;
            }
            RoomType::Boss if self.boss.is_some() => {
                log::warn!("Refusing second boss room at {}", coord);
                return false;
            }
            RoomType::Start => self.start = Some(coord),
            RoomType::Boss => self.boss = Some(coord),
            _ => {}
        }
        self.rooms.insert(coord, room);
        self.order.push(coord);
        true
    }

    /// Change a room's type, keeping the start/boss caches in sync.
    ///
    /// Start rooms cannot be retyped and nothing can become a second Start or Boss.
    pub(crate) fn retype(&mut self, coord: GridCoordinate, room_type: RoomType) -> bool {
        let current = match self.rooms.get(&coord) {
            Some(room) => room.room_type(),
            None => return false,
        };
        if current == RoomType::Start || room_type == RoomType::Start {
            return false;
        }
        if room_type == RoomType::Boss && self.boss.is_some_and(|b| b != coord) {
            return false;
        }
        if current == RoomType::Boss {
            self.boss = None;
        }
        if room_type == RoomType::Boss {
            self.boss = Some(coord);
        }
        if let Some(room) = self.rooms.get_mut(&coord) {
            room.set_room_type(room_type);
        }
        true
    }

    pub fn contains(&self, coord: GridCoordinate) -> bool {
        self.rooms.contains_key(&coord)
    }

    pub fn room_at(&self, coord: GridCoordinate) -> Option<&Room> {
        self.rooms.get(&coord)
    }

    pub fn room_at_mut(&mut self, coord: GridCoordinate) -> Option<&mut Room> {
        self.rooms.get_mut(&coord)
    }

    /// Weak handle for a room in this directory
    pub fn handle(&self, coord: GridCoordinate) -> Option<RoomHandle> {
        self.contains(coord).then(|| RoomHandle::new(self.epoch, coord))
    }

    /// Resolve a weak handle. Handles from another directory never resolve.
    pub fn resolve(&self, handle: RoomHandle) -> Option<&Room> {
        if handle.epoch != self.epoch {
            return None;
        }
        self.rooms.get(&handle.coord)
    }

    /// Rooms in placement order
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.order.iter().filter_map(|c| self.rooms.get(c))
    }

    /// Coordinates in placement order
    pub fn coords(&self) -> &[GridCoordinate] {
        &self.order
    }

    pub fn start_coord(&self) -> Option<GridCoordinate> {
        self.start
    }

    pub fn boss_coord(&self) -> Option<GridCoordinate> {
        self.boss
    }

    pub fn start_room(&self) -> Option<&Room> {
        self.start.and_then(|c| self.rooms.get(&c))
    }

    pub fn boss_room(&self) -> Option<&Room> {
        self.boss.and_then(|c| self.rooms.get(&c))
    }

    pub fn count_of_type(&self, room_type: RoomType) -> usize {
        self.rooms().filter(|r| r.room_type() == room_type).count()
    }

    pub fn has_room_of_type(&self, room_type: RoomType) -> bool {
        self.rooms().any(|r| r.room_type() == room_type)
    }

    /// Occupied orthogonal neighbors of a cell, in slot order
    pub fn occupied_neighbors(&self, coord: GridCoordinate) -> Vec<(Direction, GridCoordinate)> {
        Direction::ALL
            .into_iter()
            .map(|d| (d, coord.step(d)))
            .filter(|(_, n)| self.contains(*n))
            .collect()
    }

    /// Rooms reachable from Start by following doors
    pub fn reachable_from_start(&self) -> HashSet<GridCoordinate> {
        let mut visited = HashSet::new();
        let Some(start) = self.start else {
            return visited;
        };

        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);

        while let Some(coord) = queue.pop_front() {
            let Some(room) = self.rooms.get(&coord) else {
                continue;
            };
            for door in room.doors() {
                if let Some(target) = self.resolve(door.target()) {
                    if visited.insert(target.coord()) {
                        queue.push_back(target.coord());
                    }
                }
            }
        }

        visited
    }

    /// Presentation requests for the room-content populator
    pub fn blueprints(&self) -> Vec<RoomBlueprint> {
        self.rooms()
            .map(|room| RoomBlueprint {
                room_type: room.room_type(),
                coord: room.coord(),
                doors: room.door_directions(),
            })
            .collect()
    }
}
