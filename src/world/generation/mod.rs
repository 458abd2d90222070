//! Procedural dungeon generation
//!
//! A run goes through four stages: placement, repair, linking and
//! population. [`GenerationRun`] exposes them one step at a time so a host can
//! spread the work across frames; nothing is published until the run
//! completes.

pub mod assigner;
pub mod linker;
pub mod planner;
pub mod populate;

pub use assigner::{ensure_boss, ensure_special_rooms, RoomTypeAssigner, SpecialRoomRepair, TypeTally};
pub use linker::{ConnectivityLinker, LinkOutcome, LinkSummary};
pub use planner::{GridPlanner, Placement};
pub use populate::populate_encounters;

use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::data::DungeonConfig;
use crate::world::{GridCoordinate, Room, RoomGraphDirectory, RoomType};

/// Fatal generation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("grid size must be at least 1")]
    EmptyGrid,
    #[error("{grid_size}x{grid_size} grid left no room besides start for a boss ({placed} placed); retry with a larger grid")]
    InsufficientSpace { grid_size: i32, placed: usize },
}

/// Stage a run is currently in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStage {
    Placing,
    Repairing,
    Linking,
    Populating,
    Complete,
}

impl GenerationStage {
    pub fn label(&self) -> &'static str {
        match self {
            GenerationStage::Placing => "Placing rooms",
            GenerationStage::Repairing => "Assigning special rooms",
            GenerationStage::Linking => "Linking doors",
            GenerationStage::Populating => "Populating encounters",
            GenerationStage::Complete => "Complete",
        }
    }
}

/// Progress snapshot after a step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenerationProgress {
    pub stage: GenerationStage,
    /// 0.0 to 1.0
    pub fraction: f32,
    pub rooms_placed: usize,
    pub target: usize,
}

/// What a completed run did, for logging and diagnostics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GenerationReport {
    pub seed: u64,
    pub requested: usize,
    pub placed: usize,
    /// Frontier ran out before the requested room count
    pub exhausted: bool,
    /// Cell promoted to Boss by the repair pass
    pub boss_promoted: Option<GridCoordinate>,
    pub specials: SpecialRoomRepair,
    pub links: LinkSummary,
    pub enemies: usize,
}

/// Output of a finished run
#[derive(Debug)]
pub struct GeneratedDungeon {
    pub directory: RoomGraphDirectory,
    /// The run's random stream, to be reused for runtime rolls
    pub rng: StdRng,
    pub report: GenerationReport,
}

/// A single generation run, advanced with [`GenerationRun::step`]
#[derive(Debug)]
pub struct GenerationRun<'a> {
    config: &'a DungeonConfig,
    rng: StdRng,
    planner: GridPlanner,
    assigner: RoomTypeAssigner,
    directory: RoomGraphDirectory,
    stage: GenerationStage,
    report: GenerationReport,
}

impl<'a> GenerationRun<'a> {
    /// Prepare a run. The start room is placed immediately.
    pub fn new(
        config: &'a DungeonConfig,
        seed: u64,
        grid_size: i32,
        target_room_count: usize,
    ) -> Result<Self, GenerationError> {
        let planner = GridPlanner::new(grid_size, target_room_count)?;
        let mut directory = RoomGraphDirectory::new(grid_size);
        for placement in planner.placements() {
            directory.insert(Room::new(placement.coord, placement.room_type));
        }

        Ok(Self {
            config,
            rng: StdRng::seed_from_u64(seed),
            planner,
            assigner: RoomTypeAssigner::new(config.chances.clone()),
            directory,
            stage: GenerationStage::Placing,
            report: GenerationReport {
                seed,
                requested: target_room_count,
                ..Default::default()
            },
        })
    }

    pub fn stage(&self) -> GenerationStage {
        self.stage
    }

    /// Epoch of the directory this run is building
    pub fn epoch(&self) -> u64 {
        self.directory.epoch()
    }

    pub fn is_complete(&self) -> bool {
        self.stage == GenerationStage::Complete
    }

    /// Advance by one unit of work: one room during placement, one whole
    /// stage afterward.
    pub fn step(&mut self) -> Result<GenerationProgress, GenerationError> {
        let before = self.stage;
        match self.stage {
            GenerationStage::Placing => {
                match self.planner.step(&self.assigner, &mut self.rng) {
                    Some(placement) => {
                        self.directory.insert(Room::new(placement.coord, placement.room_type));
                    }
                    None => {
                        self.report.placed = self.planner.placed();
                        if self.planner.is_exhausted() || self.planner.placed() < self.report.requested {
                            self.report.exhausted = true;
                            log::warn!(
                                "Grid exhausted: placed {} of {} requested rooms",
                                self.planner.placed(),
                                self.report.requested
                            );
                        }
                        self.stage = GenerationStage::Repairing;
                    }
                }
            }
            GenerationStage::Repairing => {
                self.report.boss_promoted = ensure_boss(&mut self.directory)?;
                self.report.specials = ensure_special_rooms(&mut self.directory);
                self.stage = GenerationStage::Linking;
            }
            GenerationStage::Linking => {
                let linker = ConnectivityLinker::from_layout(&self.config.layout);
                self.report.links = linker.link_all(&mut self.directory, &mut self.rng);
                self.stage = GenerationStage::Populating;
            }
            GenerationStage::Populating => {
                self.report.enemies = populate_encounters(&mut self.directory, &self.config.encounters, &mut self.rng);
                self.stage = GenerationStage::Complete;
            }
            GenerationStage::Complete => {}
        }
        if self.stage != before {
            log::debug!("Generation stage: {}", self.stage.label());
        }
        Ok(self.progress())
    }

    pub fn progress(&self) -> GenerationProgress {
        let fraction = match self.stage {
            GenerationStage::Placing => {
                let target = self.planner.target().max(1) as f32;
                0.1 + 0.3 * (self.planner.placed() as f32 / target)
            }
            GenerationStage::Repairing => 0.4,
            GenerationStage::Linking => 0.7,
            GenerationStage::Populating => 0.9,
            GenerationStage::Complete => 1.0,
        };
        GenerationProgress {
            stage: self.stage,
            fraction,
            rooms_placed: self.planner.placed(),
            target: self.planner.target(),
        }
    }

    /// Step until complete and hand over the result
    pub fn run_to_completion(mut self) -> Result<GeneratedDungeon, GenerationError> {
        while !self.is_complete() {
            self.step()?;
        }
        Ok(self.finish())
    }

    fn finish(self) -> GeneratedDungeon {
        let dir = &self.directory;
        log::info!(
            "Generated dungeon (seed {}): {} rooms, boss at {:?}, {} shop, {} treasure, {} links",
            self.report.seed,
            dir.len(),
            dir.boss_coord(),
            dir.count_of_type(RoomType::Shop),
            dir.count_of_type(RoomType::Treasure),
            self.report.links.links
        );
        GeneratedDungeon {
            directory: self.directory,
            rng: self.rng,
            report: self.report,
        }
    }

    /// Take the finished result. Returns the run back if it is not complete.
    pub fn into_result(self) -> Result<GeneratedDungeon, Self> {
        if self.is_complete() {
            Ok(self.finish())
        } else {
            Err(self)
        }
    }
}

/// Generate a dungeon in one call
pub fn generate(
    config: &DungeonConfig,
    seed: u64,
    grid_size: i32,
    target_room_count: usize,
) -> Result<GeneratedDungeon, GenerationError> {
    GenerationRun::new(config, seed, grid_size, target_room_count)?.run_to_completion()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SpecialRoomLinks;
    use std::collections::HashMap;

    fn type_map(dir: &RoomGraphDirectory) -> HashMap<GridCoordinate, RoomType> {
        dir.rooms().map(|r| (r.coord(), r.room_type())).collect()
    }

    fn assert_invariants(dir: &RoomGraphDirectory) {
        assert_eq!(dir.count_of_type(RoomType::Start), 1);
        assert_eq!(dir.count_of_type(RoomType::Boss), 1);
        assert_eq!(dir.reachable_from_start().len(), dir.len());
        for room in dir.rooms() {
            for door in room.doors() {
                let target = dir.resolve(door.target()).expect("target resolves");
                assert_eq!(room.coord().step(door.direction()), target.coord());
                let back = target.door(door.direction().opposite()).expect("reciprocal door");
                assert_eq!(back.target().coord, room.coord());
            }
            let open = room.doors().any(|d| d.is_open());
            if open {
                assert!(room.is_cleared() || room.room_type() == RoomType::Start);
            }
        }
    }

    #[test]
    fn test_invariants_over_many_seeds() {
        let config = DungeonConfig::default();
        for seed in 0..200 {
            for (grid, rooms) in [(3, 6), (5, 12), (7, 20), (4, 16)] {
                let dungeon = generate(&config, seed, grid, rooms).unwrap();
                assert_invariants(&dungeon.directory);
            }
        }
    }

    #[test]
    fn test_invariants_with_dead_end_specials() {
        let mut config = DungeonConfig::default();
        config.layout.special_room_links = SpecialRoomLinks::SingleNeighbor;
        for seed in 0..200 {
            let dungeon = generate(&config, seed, 5, 12).unwrap();
            assert_invariants(&dungeon.directory);
        }
    }

    #[test]
    fn test_deterministic_for_seed() {
        let config = DungeonConfig::default();
        let a = generate(&config, 42, 5, 12).unwrap();
        let b = generate(&config, 42, 5, 12).unwrap();
        assert_eq!(type_map(&a.directory), type_map(&b.directory));
        assert_eq!(a.directory.coords(), b.directory.coords());
        assert_eq!(a.directory.blueprints(), b.directory.blueprints());
    }

    #[test]
    fn test_seven_seed_scenario() {
        let config = DungeonConfig::default();
        let dungeon = generate(&config, 7, 5, 12).unwrap();
        let dir = &dungeon.directory;

        assert_eq!(dir.len(), 12);
        assert!(!dungeon.report.exhausted);
        assert_eq!(dir.start_coord(), Some(GridCoordinate::new(2, 2)));
        assert_eq!(dir.count_of_type(RoomType::Boss), 1);

        // 70-80% of 12 only admits placed_count 9, so the boss is the tenth room
        assert_eq!(dungeon.report.boss_promoted, None);
        assert_eq!(dir.coords()[9], dir.boss_coord().unwrap());
    }

    #[test]
    fn test_staged_progress_is_monotonic() {
        let config = DungeonConfig::default();
        let mut run = GenerationRun::new(&config, 3, 5, 12).unwrap();
        let mut last = run.progress().fraction;
        let mut steps = 0;
        while !run.is_complete() {
            let progress = run.step().unwrap();
            assert!(progress.fraction >= last);
            last = progress.fraction;
            steps += 1;
        }
        assert_eq!(last, 1.0);
        // 11 placements + the exhausted check + 3 post stages
        assert_eq!(steps, 15);
        let dungeon = run.into_result().expect("complete run");
        assert_eq!(dungeon.directory.len(), 12);
    }

    #[test]
    fn test_incomplete_run_is_not_published() {
        let config = DungeonConfig::default();
        let mut run = GenerationRun::new(&config, 3, 5, 12).unwrap();
        run.step().unwrap();
        assert!(run.into_result().is_err());
    }

    #[test]
    fn test_single_cell_grid_has_no_space_for_boss() {
        let config = DungeonConfig::default();
        assert_eq!(
            generate(&config, 1, 1, 5).unwrap_err(),
            GenerationError::InsufficientSpace { grid_size: 1, placed: 1 }
        );
        assert_eq!(generate(&config, 1, 0, 5).unwrap_err(), GenerationError::EmptyGrid);
    }

    #[test]
    fn test_small_grid_exhaustion_reported() {
        let config = DungeonConfig::default();
        let dungeon = generate(&config, 9, 3, 30).unwrap();
        assert_eq!(dungeon.directory.len(), 9);
        assert!(dungeon.report.exhausted);
        assert_invariants(&dungeon.directory);
    }
}
