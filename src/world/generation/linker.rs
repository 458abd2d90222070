//! Door linking between adjacent rooms
//!
//! Every link is a pair of doors, one in each room, facing each other. Each
//! door's teleport anchor lands the traveller just inside the wall of the
//! target room that the traveller walks in through.

use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::{LayoutSettings, SpecialRoomLinks};
use crate::world::{Direction, Door, GridCoordinate, RoomGraphDirectory, RoomType, TeleportAnchor};

/// Result of a single link request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Linked,
    AlreadyLinked,
    NotAdjacent,
    MissingRoom,
}

/// Counts from a full linking pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkSummary {
    /// Door pairs created
    pub links: usize,
    /// Links added to reconnect rooms the dead-end policy cut off
    pub reachability_repairs: usize,
}

/// Builds the door graph over a directory
#[derive(Debug, Clone)]
pub struct ConnectivityLinker {
    room_extent: f32,
    door_margin: f32,
    policy: SpecialRoomLinks,
}

impl ConnectivityLinker {
    pub fn new(room_extent: f32, door_margin: f32, policy: SpecialRoomLinks) -> Self {
        Self { room_extent, door_margin, policy }
    }

    pub fn from_layout(layout: &LayoutSettings) -> Self {
        Self::new(layout.room_extent, layout.door_margin, layout.special_room_links)
    }

    /// Link two orthogonally adjacent rooms with a pair of doors.
    ///
    /// Non-adjacent pairs and pairs that are already linked are rejected as
    /// logged no-ops.
    pub fn connect(&self, directory: &mut RoomGraphDirectory, from: GridCoordinate, to: GridCoordinate) -> LinkOutcome {
        let Some(direction) = from.direction_to(&to) else {
            log::warn!("Ignoring link request between non-adjacent rooms {} and {}", from, to);
            return LinkOutcome::NotAdjacent;
        };

        let (Some(from_handle), Some(to_handle)) = (directory.handle(from), directory.handle(to)) else {
            log::warn!("Ignoring link request {} -> {}: room missing", from, to);
            return LinkOutcome::MissingRoom;
        };

        let already = directory.room_at(from).is_some_and(|r| r.is_connected_to(to))
            || directory.room_at(to).is_some_and(|r| r.is_connected_to(from));
        if already {
            log::debug!("Rooms {} and {} are already linked", from, to);
            return LinkOutcome::AlreadyLinked;
        }

        let forward = Door::new(direction, to_handle, self.anchor(direction));
        let back = Door::new(direction.opposite(), from_handle, self.anchor(direction.opposite()));

        if let Some(room) = directory.room_at_mut(from) {
            room.attach_door(forward);
            room.refresh_doors();
        }
        if let Some(room) = directory.room_at_mut(to) {
            room.attach_door(back);
            room.refresh_doors();
        }

        log::debug!("Linked {} -> {} ({})", from, to, direction.name());
        LinkOutcome::Linked
    }

    fn anchor(&self, direction: Direction) -> TeleportAnchor {
        TeleportAnchor::for_door(direction, self.room_extent, self.door_margin)
    }

    /// Link every pair of occupied neighbors the policy allows. Idempotent.
    pub fn link_all(&self, directory: &mut RoomGraphDirectory, rng: &mut impl Rng) -> LinkSummary {
        let mut summary = LinkSummary::default();
        let coords = directory.coords().to_vec();

        match self.policy {
            SpecialRoomLinks::AllNeighbors => {
                for &coord in &coords {
                    summary.links += self.link_neighbors(directory, coord, |_| true);
                }
            }
            SpecialRoomLinks::SingleNeighbor => {
                // Dead-end rooms first, each to one randomly chosen neighbor
                for &coord in &coords {
                    let is_special = directory
                        .room_at(coord)
                        .is_some_and(|r| r.room_type().is_dead_end_candidate() && r.connected().is_empty());
                    if !is_special {
                        continue;
                    }
                    let mut directions = Direction::ALL;
                    directions.shuffle(rng);
                    for direction in directions {
                        let neighbor = coord.step(direction);
                        if directory.contains(neighbor)
                            && self.connect(directory, coord, neighbor) == LinkOutcome::Linked
                        {
                            summary.links += 1;
                            break;
                        }
                    }
                }

                for &coord in &coords {
                    let is_special = directory
                        .room_at(coord)
                        .is_some_and(|r| r.room_type().is_dead_end_candidate());
                    if is_special {
                        continue;
                    }
                    summary.links += self.link_neighbors(directory, coord, |room_type| {
                        !room_type.is_dead_end_candidate()
                    });
                }
            }
        }

        summary.reachability_repairs = self.repair_reachability(directory);
        summary.links += summary.reachability_repairs;
        summary
    }

    /// Link a room to each occupied neighbor whose type passes `accept`
    fn link_neighbors(
        &self,
        directory: &mut RoomGraphDirectory,
        coord: GridCoordinate,
        accept: impl Fn(RoomType) -> bool,
    ) -> usize {
        let mut links = 0;
        for (_, neighbor) in directory.occupied_neighbors(coord) {
            let allowed = directory
                .room_at(neighbor)
                .is_some_and(|r| accept(r.room_type()) && !r.is_connected_to(coord));
            if allowed && self.connect(directory, coord, neighbor) == LinkOutcome::Linked {
                links += 1;
            }
        }
        links
    }

    /// Link any room unreachable from Start to an adjacent reachable room
    fn repair_reachability(&self, directory: &mut RoomGraphDirectory) -> usize {
        let mut repairs = 0;
        loop {
            let reachable = directory.reachable_from_start();
            if reachable.len() == directory.len() {
                return repairs;
            }

            let bridge = directory
                .coords()
                .iter()
                .filter(|c| !reachable.contains(*c))
                .find_map(|&c| {
                    directory
                        .occupied_neighbors(c)
                        .into_iter()
                        .find(|(_, n)| reachable.contains(n))
                        .map(|(_, n)| (n, c))
                });

            let Some((from, to)) = bridge else {
                log::warn!(
                    "{} rooms are unreachable from start and have no reachable neighbor",
                    directory.len() - reachable.len()
                );
                return repairs;
            };

            log::warn!("Room {} was cut off from start; linking it through {}", to, from);
            if self.connect(directory, from, to) != LinkOutcome::Linked {
                return repairs;
            }
            repairs += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::world::{DoorState, Room, RoomType};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn linker(policy: SpecialRoomLinks) -> ConnectivityLinker {
        ConnectivityLinker::new(20.0, 1.0, policy)
    }

    /// Plus shape around (2, 2) with Boss to the north
    fn plus_directory() -> RoomGraphDirectory {
        let mut dir = RoomGraphDirectory::new(5);
        dir.insert(Room::new(GridCoordinate::new(2, 2), RoomType::Start));
        dir.insert(Room::new(GridCoordinate::new(2, 3), RoomType::Boss));
        dir.insert(Room::new(GridCoordinate::new(3, 2), RoomType::Normal));
        dir.insert(Room::new(GridCoordinate::new(2, 1), RoomType::Normal));
        dir.insert(Room::new(GridCoordinate::new(1, 2), RoomType::Normal));
        dir.insert(Room::new(GridCoordinate::new(3, 3), RoomType::Normal));
        dir
    }

    fn assert_symmetric(dir: &RoomGraphDirectory) {
        for room in dir.rooms() {
            for door in room.doors() {
                let target = dir.resolve(door.target()).expect("door target resolves");
                let back = target.door(door.direction().opposite()).expect("reciprocal door");
                assert_eq!(back.target().coord, room.coord());
            }
        }
    }

    #[test]
    fn test_connect_creates_reciprocal_doors_with_anchors() {
        let mut dir = plus_directory();
        let l = linker(SpecialRoomLinks::AllNeighbors);
        let a = GridCoordinate::new(2, 2);
        let b = GridCoordinate::new(3, 2);

        assert_eq!(l.connect(&mut dir, a, b), LinkOutcome::Linked);
        let east = dir.room_at(a).unwrap().door(Direction::East).unwrap();
        assert_eq!(east.target().coord, b);
        // Lands inside b, just off b's west wall
        assert_eq!(east.anchor().position.x, -9.0);

        let west = dir.room_at(b).unwrap().door(Direction::West).unwrap();
        assert_eq!(west.target().coord, a);
        assert_eq!(west.anchor().position.x, 9.0);
    }

    #[test]
    fn test_connect_rejects_bad_requests() {
        let mut dir = plus_directory();
        let l = linker(SpecialRoomLinks::AllNeighbors);
        let a = GridCoordinate::new(2, 2);

        assert_eq!(l.connect(&mut dir, a, GridCoordinate::new(3, 3)), LinkOutcome::NotAdjacent);
        assert_eq!(l.connect(&mut dir, a, GridCoordinate::new(2, 2)), LinkOutcome::NotAdjacent);
        assert_eq!(l.connect(&mut dir, GridCoordinate::new(0, 0), GridCoordinate::new(0, 1)), LinkOutcome::MissingRoom);

        assert_eq!(l.connect(&mut dir, a, GridCoordinate::new(2, 1)), LinkOutcome::Linked);
        assert_eq!(l.connect(&mut dir, GridCoordinate::new(2, 1), a), LinkOutcome::AlreadyLinked);
        assert_eq!(dir.room_at(a).unwrap().door_count(), 1);
    }

    #[test]
    fn test_link_all_connects_every_neighbor_and_is_idempotent() {
        let mut dir = plus_directory();
        let l = linker(SpecialRoomLinks::AllNeighbors);
        let mut rng = StdRng::seed_from_u64(5);

        let first = l.link_all(&mut dir, &mut rng);
        // 4 spokes + (2,3)-(3,3) + (3,2)-(3,3)
        assert_eq!(first.links, 6);
        assert_eq!(first.reachability_repairs, 0);
        assert_eq!(dir.room_at(GridCoordinate::new(2, 2)).unwrap().door_count(), 4);

        let second = l.link_all(&mut dir, &mut rng);
        assert_eq!(second.links, 0);
        assert_symmetric(&dir);
        assert_eq!(dir.reachable_from_start().len(), dir.len());
    }

    #[test]
    fn test_single_neighbor_policy_keeps_everything_reachable() {
        for seed in 0..20 {
            let mut dir = plus_directory();
            let l = linker(SpecialRoomLinks::SingleNeighbor);
            let mut rng = StdRng::seed_from_u64(seed);
            l.link_all(&mut dir, &mut rng);

            assert_symmetric(&dir);
            assert_eq!(dir.reachable_from_start().len(), dir.len(), "seed {}", seed);
        }
    }

    #[test]
    fn test_start_doors_open_others_closed() {
        let mut dir = plus_directory();
        let l = linker(SpecialRoomLinks::AllNeighbors);
        l.link_all(&mut dir, &mut StdRng::seed_from_u64(1));

        for door in dir.room_at(GridCoordinate::new(2, 2)).unwrap().doors() {
            assert_eq!(door.state(), DoorState::Open);
        }
        for door in dir.room_at(GridCoordinate::new(3, 2)).unwrap().doors() {
            assert_eq!(door.state(), DoorState::Closed);
        }
    }
}
