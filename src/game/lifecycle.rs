//! Room lifecycle
//!
//! Drives each room through Unvisited -> Visited -> Cleared and keeps its
//! doors in line with that progress. Every transition is safe to trigger
//! more than once.

use rand::Rng;

use crate::data::RewardTable;
use crate::world::{DoorState, GridCoordinate, LifecycleState, RoomGraphDirectory, RoomType};

use super::events::RoomEvent;

/// Result of a lifecycle trigger
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleOutcome {
    /// The room changed state
    Transitioned,
    /// Nothing to do, the room was already past this point
    Unchanged,
    /// The trigger is not allowed yet (hostiles alive, room never entered)
    Refused,
    /// No room at that coordinate
    UnknownRoom,
}

/// Applies lifecycle triggers to rooms of a directory
#[derive(Debug, Clone, Default)]
pub struct RoomLifecycleController {
    rewards: RewardTable,
}

impl RoomLifecycleController {
    pub fn new(rewards: RewardTable) -> Self {
        Self { rewards }
    }

    /// Player entered the room at `coord`.
    ///
    /// First entry marks the room visited and hands its manifest to the
    /// spawner. Rooms with nothing to fight clear themselves immediately.
    pub fn enter_room(
        &self,
        directory: &mut RoomGraphDirectory,
        coord: GridCoordinate,
        rng: &mut impl Rng,
        events: &mut Vec<RoomEvent>,
    ) -> LifecycleOutcome {
        let Some(room) = directory.room_at_mut(coord) else {
            log::warn!("Enter requested for unknown room {}", coord);
            return LifecycleOutcome::UnknownRoom;
        };

        events.push(RoomEvent::Entered {
            coord,
            room_type: room.room_type(),
        });

        if room.state() != LifecycleState::Unvisited {
            // Re-entry only re-checks the doors
            push_door_event(coord, room.refresh_doors(), events);
            return LifecycleOutcome::Unchanged;
        }

        room.set_state(LifecycleState::Visited);
        let peaceful = !room.room_type().has_hostile_manifest() || room.enemy_manifest().is_empty();
        if !peaceful {
            log::debug!(
                "Room {} visited, spawning {} enemies",
                coord,
                room.enemy_manifest().len()
            );
            events.push(RoomEvent::SpawnEnemies {
                coord,
                manifest: room.enemy_manifest().to_vec(),
                spawn_points: room.spawn_points().to_vec(),
            });
        }
        push_door_event(coord, room.refresh_doors(), events);

        if peaceful {
            self.clear_room(directory, coord, rng, events);
        }
        LifecycleOutcome::Transitioned
    }

    /// Mark the room cleared: roll rewards, reveal neighbors, open doors.
    ///
    /// Refused while the enemy collaborator still reports hostiles, or if
    /// the room was never entered.
    pub fn clear_room(
        &self,
        directory: &mut RoomGraphDirectory,
        coord: GridCoordinate,
        rng: &mut impl Rng,
        events: &mut Vec<RoomEvent>,
    ) -> LifecycleOutcome {
        let Some(room) = directory.room_at_mut(coord) else {
            log::warn!("Clear requested for unknown room {}", coord);
            return LifecycleOutcome::UnknownRoom;
        };

        match room.state() {
            LifecycleState::Cleared => return LifecycleOutcome::Unchanged,
            LifecycleState::Unvisited => {
                log::debug!("Ignoring clear for unvisited room {}", coord);
                return LifecycleOutcome::Refused;
            }
            LifecycleState::Visited => {}
        }
        if room.has_hostiles() {
            log::debug!("Room {} still has {} hostiles", coord, room.hostiles());
            return LifecycleOutcome::Refused;
        }

        room.set_state(LifecycleState::Cleared);
        let room_type = room.room_type();
        let count = room_type.roll_reward_count(rng);
        room.set_reward_count(count);
        let drops = self.rewards.roll(count, room.reward_anchor(), rng);
        let neighbors = room.connected().to_vec();

        events.push(RoomEvent::Cleared { coord, room_type });
        events.push(RoomEvent::RewardsSpawned { coord, drops });
        if room_type == RoomType::Boss {
            log::info!("Boss room {} cleared", coord);
            events.push(RoomEvent::BossDefeated { coord });
        }
        push_door_event(coord, room.refresh_doors(), events);

        for handle in neighbors {
            if handle.epoch != directory.epoch() {
                log::warn!("Skipping stale neighbor handle {:?}", handle);
                continue;
            }
            if let Some(neighbor) = directory.room_at_mut(handle.coord) {
                if neighbor.reveal() {
                    events.push(RoomEvent::NeighborRevealed {
                        from: coord,
                        coord: handle.coord,
                    });
                }
            }
        }

        log::debug!("Room {} ({}) cleared with {} rewards", coord, room_type.name(), count);
        LifecycleOutcome::Transitioned
    }

    /// Set the live hostile count reported by the enemy collaborator
    pub fn report_hostiles(&self, directory: &mut RoomGraphDirectory, coord: GridCoordinate, count: u32) -> bool {
        match directory.room_at_mut(coord) {
            Some(room) if !room.is_cleared() => {
                room.set_hostiles(count);
                true
            }
            Some(_) => false,
            None => {
                log::warn!("Hostile report for unknown room {}", coord);
                false
            }
        }
    }

    /// One hostile died. Clears the room when the last one goes.
    pub fn hostile_defeated(
        &self,
        directory: &mut RoomGraphDirectory,
        coord: GridCoordinate,
        rng: &mut impl Rng,
        events: &mut Vec<RoomEvent>,
    ) -> LifecycleOutcome {
        let Some(room) = directory.room_at_mut(coord) else {
            log::warn!("Hostile defeat reported for unknown room {}", coord);
            return LifecycleOutcome::UnknownRoom;
        };
        if room.is_cleared() {
            return LifecycleOutcome::Unchanged;
        }

        let remaining = room.hostiles().saturating_sub(1);
        room.set_hostiles(remaining);
        if remaining == 0 {
            self.clear_room(directory, coord, rng, events)
        } else {
            LifecycleOutcome::Unchanged
        }
    }
}

fn push_door_event(coord: GridCoordinate, changed: Option<DoorState>, events: &mut Vec<RoomEvent>) {
    match changed {
        Some(DoorState::Open) => events.push(RoomEvent::DoorsUnlocked { coord }),
        Some(DoorState::Locked) => events.push(RoomEvent::DoorsLocked { coord }),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DungeonConfig;
    use crate::world::generation::{generate, GeneratedDungeon};
    use crate::world::Room;

    fn dungeon(seed: u64) -> GeneratedDungeon {
        generate(&DungeonConfig::default(), seed, 5, 12).unwrap()
    }

    fn first_of(dir: &RoomGraphDirectory, room_type: RoomType) -> GridCoordinate {
        dir.rooms().find(|r| r.room_type() == room_type).unwrap().coord()
    }

    fn doors_all(room: &Room, state: DoorState) -> bool {
        room.door_count() > 0 && room.doors().all(|d| d.state() == state)
    }

    #[test]
    fn test_normal_room_doors_open_after_clear() {
        let mut d = dungeon(21);
        let controller = RoomLifecycleController::default();
        let mut events = Vec::new();
        let coord = first_of(&d.directory, RoomType::Normal);

        assert!(doors_all(d.directory.room_at(coord).unwrap(), DoorState::Closed));

        let entered = controller.enter_room(&mut d.directory, coord, &mut d.rng, &mut events);
        assert_eq!(entered, LifecycleOutcome::Transitioned);
        assert!(doors_all(d.directory.room_at(coord).unwrap(), DoorState::Locked));
        assert!(events.iter().any(|e| matches!(e, RoomEvent::SpawnEnemies { .. })));

        let cleared = controller.clear_room(&mut d.directory, coord, &mut d.rng, &mut events);
        assert_eq!(cleared, LifecycleOutcome::Transitioned);
        let room = d.directory.room_at(coord).unwrap();
        assert!(room.is_cleared());
        assert!(doors_all(room, DoorState::Open));
        assert!(events.contains(&RoomEvent::DoorsUnlocked { coord }));
    }

    #[test]
    fn test_triggers_are_idempotent() {
        let mut d = dungeon(4);
        let controller = RoomLifecycleController::default();
        let mut events = Vec::new();
        let coord = first_of(&d.directory, RoomType::Normal);

        controller.enter_room(&mut d.directory, coord, &mut d.rng, &mut events);
        let again = controller.enter_room(&mut d.directory, coord, &mut d.rng, &mut events);
        assert_eq!(again, LifecycleOutcome::Unchanged);
        let spawns = events.iter().filter(|e| matches!(e, RoomEvent::SpawnEnemies { .. })).count();
        assert_eq!(spawns, 1);

        controller.clear_room(&mut d.directory, coord, &mut d.rng, &mut events);
        let rewards = d.directory.room_at(coord).unwrap().reward_count();
        let again = controller.clear_room(&mut d.directory, coord, &mut d.rng, &mut events);
        assert_eq!(again, LifecycleOutcome::Unchanged);
        assert_eq!(d.directory.room_at(coord).unwrap().reward_count(), rewards);
        let clears = events.iter().filter(|e| matches!(e, RoomEvent::Cleared { .. })).count();
        assert_eq!(clears, 1);
    }

    #[test]
    fn test_clear_refused_while_hostiles_remain() {
        let mut d = dungeon(8);
        let controller = RoomLifecycleController::default();
        let mut events = Vec::new();
        let coord = first_of(&d.directory, RoomType::Normal);

        assert_eq!(
            controller.clear_room(&mut d.directory, coord, &mut d.rng, &mut events),
            LifecycleOutcome::Refused
        );

        controller.enter_room(&mut d.directory, coord, &mut d.rng, &mut events);
        assert!(controller.report_hostiles(&mut d.directory, coord, 2));
        assert_eq!(
            controller.clear_room(&mut d.directory, coord, &mut d.rng, &mut events),
            LifecycleOutcome::Refused
        );
        assert!(doors_all(d.directory.room_at(coord).unwrap(), DoorState::Locked));

        assert_eq!(
            controller.hostile_defeated(&mut d.directory, coord, &mut d.rng, &mut events),
            LifecycleOutcome::Unchanged
        );
        assert_eq!(
            controller.hostile_defeated(&mut d.directory, coord, &mut d.rng, &mut events),
            LifecycleOutcome::Transitioned
        );
        assert!(d.directory.room_at(coord).unwrap().is_cleared());
    }

    #[test]
    fn test_reward_counts_follow_room_type() {
        let controller = RoomLifecycleController::default();
        for seed in 0..40 {
            let mut d = dungeon(seed);
            let mut events = Vec::new();
            let coords = d.directory.coords().to_vec();
            for coord in coords {
                controller.enter_room(&mut d.directory, coord, &mut d.rng, &mut events);
                controller.clear_room(&mut d.directory, coord, &mut d.rng, &mut events);
                let room = d.directory.room_at(coord).unwrap();
                if room.room_type() == RoomType::Start {
                    continue;
                }
                let (min, max) = room.reward_range();
                let count = room.reward_count().unwrap();
                assert!((min..=max).contains(&count), "{:?} rolled {}", room.room_type(), count);
            }
            let drops: usize = events
                .iter()
                .map(|e| match e {
                    RoomEvent::RewardsSpawned { drops, .. } => drops.len(),
                    _ => 0,
                })
                .sum();
            let expected: u32 = d.directory.rooms().filter_map(|r| r.reward_count()).sum();
            assert_eq!(drops, expected as usize);
        }
    }

    #[test]
    fn test_shop_clears_on_entry_and_reveals_neighbors() {
        let mut d = dungeon(2);
        let controller = RoomLifecycleController::default();
        let mut events = Vec::new();
        let coord = first_of(&d.directory, RoomType::Shop);

        controller.enter_room(&mut d.directory, coord, &mut d.rng, &mut events);
        let room = d.directory.room_at(coord).unwrap();
        assert!(room.is_cleared());
        assert_eq!(room.reward_count(), Some(1));
        assert!(!events.iter().any(|e| matches!(e, RoomEvent::SpawnEnemies { .. })));
        assert!(!events.contains(&RoomEvent::DoorsLocked { coord }));
        assert!(events.contains(&RoomEvent::DoorsUnlocked { coord }));

        let neighbors: Vec<_> = room.connected().iter().map(|h| h.coord).collect();
        for n in neighbors {
            assert!(d.directory.room_at(n).unwrap().is_revealed());
        }
    }

    #[test]
    fn test_boss_clear_emits_defeat() {
        let mut d = dungeon(13);
        let controller = RoomLifecycleController::default();
        let mut events = Vec::new();
        let coord = d.directory.boss_coord().unwrap();

        controller.enter_room(&mut d.directory, coord, &mut d.rng, &mut events);
        controller.clear_room(&mut d.directory, coord, &mut d.rng, &mut events);
        assert!(events.contains(&RoomEvent::BossDefeated { coord }));
    }
}
