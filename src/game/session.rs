//! Dungeon session
//!
//! Owns the live room graph for one level. Regeneration always tears the
//! previous graph down before the next one is built. Every directory carries
//! a process-wide unique epoch, so handles into an old level (or another
//! session's level) never resolve.

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::data::DungeonConfig;
use crate::world::generation::{self, GeneratedDungeon, GenerationError, GenerationReport, GenerationRun};
use crate::world::{
    Direction, DoorState, GridCoordinate, LocalPoint, MinimapSnapshot, Room, RoomBlueprint, RoomGraphDirectory,
    RoomHandle,
};

use super::events::RoomEvent;
use super::lifecycle::{LifecycleOutcome, RoomLifecycleController};

/// Why a door could not be used
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraverseError {
    #[error("no dungeon has been generated")]
    NoDungeon,
    #[error("no room at {0}")]
    UnknownRoom(GridCoordinate),
    #[error("room {coord} has no door to the {direction}")]
    NoDoor { coord: GridCoordinate, direction: &'static str },
    #[error("door is {state:?}")]
    DoorClosed { state: DoorState },
    #[error("door target {0:?} no longer exists")]
    DanglingTarget(RoomHandle),
}

/// A completed door traversal
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Traversal {
    pub from: GridCoordinate,
    pub to: GridCoordinate,
    pub direction: Direction,
    /// Where the traveller lands in the target room
    pub landing: LocalPoint,
    /// What entering the target room did
    pub entry: LifecycleOutcome,
}

/// One play session over a sequence of generated levels
#[derive(Debug)]
pub struct DungeonSession {
    config: DungeonConfig,
    directory: Option<RoomGraphDirectory>,
    lifecycle: RoomLifecycleController,
    /// Continues the generation stream once a level is installed
    rng: StdRng,
    /// Epoch of the staged run that may still be installed
    pending: Option<u64>,
    level: u32,
    current: Option<GridCoordinate>,
    events: Vec<RoomEvent>,
    report: Option<GenerationReport>,
}

impl Default for DungeonSession {
    fn default() -> Self {
        Self::new(DungeonConfig::default())
    }
}

impl DungeonSession {
    pub fn new(config: DungeonConfig) -> Self {
        let lifecycle = RoomLifecycleController::new(config.rewards.clone());
        Self {
            config,
            directory: None,
            lifecycle,
            rng: StdRng::seed_from_u64(0),
            pending: None,
            level: 0,
            current: None,
            events: Vec::new(),
            report: None,
        }
    }

    pub fn config(&self) -> &DungeonConfig {
        &self.config
    }

    /// Generate a level and make it live.
    ///
    /// The previous level is released first, even if generation then fails.
    pub fn generate(
        &mut self,
        seed: u64,
        grid_size: i32,
        target_room_count: usize,
    ) -> Result<&RoomGraphDirectory, GenerationError> {
        let level = self.level.max(1);
        self.build_level(seed, grid_size, target_room_count, level)
    }

    /// Move to the next level with a new seed. The level counter only
    /// advances if generation succeeds.
    pub fn advance_level(
        &mut self,
        seed: u64,
        grid_size: i32,
        target_room_count: usize,
    ) -> Result<&RoomGraphDirectory, GenerationError> {
        let level = self.level + 1;
        log::info!("Advancing to level {}", level);
        self.build_level(seed, grid_size, target_room_count, level)
    }

    fn build_level(
        &mut self,
        seed: u64,
        grid_size: i32,
        target_room_count: usize,
        level: u32,
    ) -> Result<&RoomGraphDirectory, GenerationError> {
        self.clear();
        let dungeon = generation::generate(&self.config, seed, grid_size, target_room_count)?;
        Ok(self.install_generated(dungeon, level))
    }

    /// Release the current level and start a staged run for the next one.
    ///
    /// Step the run, then pass its result to [`DungeonSession::install`].
    pub fn begin_generation(
        &mut self,
        seed: u64,
        grid_size: i32,
        target_room_count: usize,
    ) -> Result<GenerationRun<'_>, GenerationError> {
        self.clear();
        let run = GenerationRun::new(&self.config, seed, grid_size, target_room_count)?;
        self.pending = Some(run.epoch());
        Ok(run)
    }

    /// Make a staged run's result live. Results from superseded runs are rejected.
    pub fn install(&mut self, dungeon: GeneratedDungeon) -> bool {
        let epoch = dungeon.directory.epoch();
        if self.pending != Some(epoch) || self.directory.is_some() {
            log::warn!("Rejecting dungeon from epoch {} (expected {:?})", epoch, self.pending);
            return false;
        }
        let level = self.level.max(1);
        self.install_generated(dungeon, level);
        true
    }

    fn install_generated(&mut self, dungeon: GeneratedDungeon, level: u32) -> &RoomGraphDirectory {
        let GeneratedDungeon {
            mut directory,
            mut rng,
            report,
        } = dungeon;

        self.pending = None;
        self.level = level;
        self.current = directory.start_coord();
        if let Some(start) = self.current {
            self.lifecycle.enter_room(&mut directory, start, &mut rng, &mut self.events);
        }
        log::info!("Level {} ready (epoch {})", level, directory.epoch());

        self.rng = rng;
        self.report = Some(report);
        self.directory.insert(directory)
    }

    /// Tear down the current level
    pub fn clear(&mut self) {
        if let Some(directory) = self.directory.take() {
            log::debug!("Releasing {} rooms from epoch {}", directory.len(), directory.epoch());
        }
        self.pending = None;
        self.current = None;
        self.events.clear();
        self.report = None;
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    /// Epoch of the live level's directory
    pub fn epoch(&self) -> Option<u64> {
        self.directory.as_ref().map(|d| d.epoch())
    }

    pub fn is_generated(&self) -> bool {
        self.directory.is_some()
    }

    pub fn directory(&self) -> Option<&RoomGraphDirectory> {
        self.directory.as_ref()
    }

    pub fn last_report(&self) -> Option<&GenerationReport> {
        self.report.as_ref()
    }

    pub fn room_at(&self, coord: GridCoordinate) -> Option<&Room> {
        self.directory.as_ref()?.room_at(coord)
    }

    /// All rooms in placement order
    pub fn rooms(&self) -> impl Iterator<Item = &Room> {
        self.directory.iter().flat_map(|d| d.rooms())
    }

    pub fn start_room(&self) -> Option<&Room> {
        self.directory.as_ref()?.start_room()
    }

    pub fn boss_room(&self) -> Option<&Room> {
        self.directory.as_ref()?.boss_room()
    }

    /// Resolve a weak handle against the live level
    pub fn resolve(&self, handle: RoomHandle) -> Option<&Room> {
        self.directory.as_ref()?.resolve(handle)
    }

    pub fn current_room(&self) -> Option<&Room> {
        self.room_at(self.current?)
    }

    pub fn current_coord(&self) -> Option<GridCoordinate> {
        self.current
    }

    /// Player entered a room. The room becomes the current one.
    pub fn enter_room(&mut self, coord: GridCoordinate) -> LifecycleOutcome {
        let Some(directory) = self.directory.as_mut() else {
            return LifecycleOutcome::UnknownRoom;
        };
        let outcome = self.lifecycle.enter_room(directory, coord, &mut self.rng, &mut self.events);
        if outcome != LifecycleOutcome::UnknownRoom {
            self.current = Some(coord);
        }
        outcome
    }

    pub fn clear_room(&mut self, coord: GridCoordinate) -> LifecycleOutcome {
        let Some(directory) = self.directory.as_mut() else {
            return LifecycleOutcome::UnknownRoom;
        };
        self.lifecycle.clear_room(directory, coord, &mut self.rng, &mut self.events)
    }

    /// Record how many hostiles the spawner put into a room
    pub fn report_hostiles(&mut self, coord: GridCoordinate, count: u32) -> bool {
        match self.directory.as_mut() {
            Some(directory) => self.lifecycle.report_hostiles(directory, coord, count),
            None => false,
        }
    }

    pub fn hostile_defeated(&mut self, coord: GridCoordinate) -> LifecycleOutcome {
        let Some(directory) = self.directory.as_mut() else {
            return LifecycleOutcome::UnknownRoom;
        };
        self.lifecycle.hostile_defeated(directory, coord, &mut self.rng, &mut self.events)
    }

    pub fn has_hostiles(&self, coord: GridCoordinate) -> bool {
        self.room_at(coord).is_some_and(|r| r.has_hostiles())
    }

    /// Walk through a door. Only open doors with a live target can be used.
    pub fn traverse_door(&mut self, from: GridCoordinate, direction: Direction) -> Result<Traversal, TraverseError> {
        let directory = self.directory.as_ref().ok_or(TraverseError::NoDungeon)?;
        let room = directory.room_at(from).ok_or(TraverseError::UnknownRoom(from))?;
        let door = room.door(direction).ok_or(TraverseError::NoDoor {
            coord: from,
            direction: direction.name(),
        })?;
        if door.state() != DoorState::Open {
            return Err(TraverseError::DoorClosed { state: door.state() });
        }

        let target = door.target();
        let landing = door.anchor().position;
        if directory.resolve(target).is_none() {
            log::warn!("Door {} {} points at a missing room", from, direction.name());
            return Err(TraverseError::DanglingTarget(target));
        }

        let entry = self.enter_room(target.coord);
        Ok(Traversal {
            from,
            to: target.coord,
            direction,
            landing,
            entry,
        })
    }

    /// Hand the queued room events to the host
    pub fn drain_events(&mut self) -> Vec<RoomEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn minimap(&self) -> Option<MinimapSnapshot> {
        self.directory
            .as_ref()
            .map(|d| MinimapSnapshot::capture(d, self.current))
    }

    /// What the room-content populator needs for every room
    pub fn blueprints(&self) -> Vec<RoomBlueprint> {
        self.directory.as_ref().map(|d| d.blueprints()).unwrap_or_default()
    }

    /// Spawn points supplied by the room-content populator
    pub fn set_spawn_points(&mut self, coord: GridCoordinate, points: Vec<LocalPoint>) -> bool {
        match self.directory.as_mut().and_then(|d| d.room_at_mut(coord)) {
            Some(room) => {
                room.set_spawn_points(points);
                true
            }
            None => false,
        }
    }

    /// Where the reward system should drop a room's rewards
    pub fn set_reward_anchor(&mut self, coord: GridCoordinate, anchor: LocalPoint) -> bool {
        match self.directory.as_mut().and_then(|d| d.room_at_mut(coord)) {
            Some(room) => {
                room.set_reward_anchor(anchor);
                true
            }
            None => false,
        }
    }
}
