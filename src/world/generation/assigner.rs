//! Room type assignment and repair passes
//!
//! Types are decided as rooms are placed. Two repair passes run afterward:
//! one guarantees a boss room, the other tries to guarantee a shop and a
//! treasure room without using up the last normal rooms.

use rand::Rng;

use super::GenerationError;
use crate::data::RoomChances;
use crate::world::{GridCoordinate, RoomGraphDirectory, RoomType};

/// Slack for float comparisons at the edges of the boss window
const WINDOW_EPSILON: f64 = 1e-9;

/// Which one-off room types have been handed out so far
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TypeTally {
    pub boss: bool,
    pub treasure: bool,
    pub shop: bool,
}

impl TypeTally {
    pub fn record(&mut self, room_type: RoomType) {
        match room_type {
            RoomType::Boss => self.boss = true,
            RoomType::Treasure => self.treasure = true,
            RoomType::Shop => self.shop = true,
            RoomType::Start | RoomType::Normal => {}
        }
    }
}

/// Per-room type policy
#[derive(Debug, Clone)]
pub struct RoomTypeAssigner {
    chances: RoomChances,
}

impl RoomTypeAssigner {
    pub fn new(chances: RoomChances) -> Self {
        Self { chances }
    }

    /// Decide the type of the next non-start room.
    ///
    /// `placed_count` is the number of rooms already placed, start included.
    pub fn assign_type(
        &self,
        placed_count: usize,
        target_count: usize,
        tally: &TypeTally,
        rng: &mut impl Rng,
    ) -> RoomType {
        if !tally.boss && self.in_boss_window(placed_count, target_count) {
            return RoomType::Boss;
        }

        let roll: f64 = rng.gen();
        if roll < self.chances.treasure_chance && !tally.treasure {
            RoomType::Treasure
        } else if roll < self.chances.treasure_chance + self.chances.shop_chance && !tally.shop {
            RoomType::Shop
        } else {
            RoomType::Normal
        }
    }

    fn in_boss_window(&self, placed_count: usize, target_count: usize) -> bool {
        let (lo, hi) = self.chances.boss_window;
        let placed = placed_count as f64;
        let target = target_count as f64;
        placed + WINDOW_EPSILON >= lo * target && placed - WINDOW_EPSILON <= hi * target
    }
}

/// Promote the room farthest from Start to Boss if placement never made one.
///
/// Distance is Euclidean; the earliest placed room wins ties. Returns the
/// promoted cell, or `None` if a boss already existed.
pub fn ensure_boss(directory: &mut RoomGraphDirectory) -> Result<Option<GridCoordinate>, GenerationError> {
    if directory.boss_coord().is_some() {
        return Ok(None);
    }

    let insufficient = GenerationError::InsufficientSpace {
        grid_size: directory.grid_size(),
        placed: directory.len(),
    };
    let Some(start) = directory.start_coord() else {
        return Err(insufficient);
    };

    let mut farthest: Option<(GridCoordinate, i32)> = None;
    for room in directory.rooms() {
        if room.room_type() == RoomType::Start {
            continue;
        }
        let distance = room.coord().distance_squared(&start);
        if farthest.map_or(true, |(_, best)| distance > best) {
            farthest = Some((room.coord(), distance));
        }
    }

    let Some((coord, _)) = farthest else {
        return Err(insufficient);
    };

    if !directory.retype(coord, RoomType::Boss) {
        return Err(insufficient);
    }
    log::info!("No boss placed during expansion; promoted farthest room {} to Boss", coord);
    Ok(Some(coord))
}

/// Outcome of the special room pass
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SpecialRoomRepair {
    /// Normal rooms converted, in conversion order
    pub converted: Vec<(GridCoordinate, RoomType)>,
    /// Types still absent because too few normal rooms were left
    pub missing: Vec<RoomType>,
}

/// Make sure a Shop and a Treasure room exist, converting Normal rooms.
///
/// Conversions only happen when enough Normal rooms exist to cover every
/// missing type at once.
pub fn ensure_special_rooms(directory: &mut RoomGraphDirectory) -> SpecialRoomRepair {
    let needed: Vec<RoomType> = [RoomType::Shop, RoomType::Treasure]
        .into_iter()
        .filter(|t| !directory.has_room_of_type(*t))
        .collect();

    let mut repair = SpecialRoomRepair::default();
    if needed.is_empty() {
        return repair;
    }

    let normals: Vec<GridCoordinate> = directory
        .rooms()
        .filter(|r| r.room_type() == RoomType::Normal)
        .map(|r| r.coord())
        .collect();

    if normals.len() < needed.len() {
        log::warn!(
            "Not enough normal rooms ({}) to create special rooms ({}); {:?} will be absent",
            normals.len(),
            needed.len(),
            needed
        );
        repair.missing = needed;
        return repair;
    }

    for (room_type, coord) in needed.into_iter().zip(normals) {
        if directory.retype(coord, room_type) {
            log::debug!("Converted normal room {} to {}", coord, room_type.name());
            repair.converted.push((coord, room_type));
        }
    }
    repair
}
