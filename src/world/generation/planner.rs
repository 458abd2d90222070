//! Frontier-expansion room placement
//!
//! Rooms grow outward from a start room at the grid center. Each placement
//! picks a random frontier cell and a random free side of it, so the layout is
//! always a single connected blob of cells.

use rand::Rng;

use super::assigner::{RoomTypeAssigner, TypeTally};
use super::GenerationError;
use crate::world::{Direction, GridCoordinate, RoomType};

/// A room chosen by the planner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub coord: GridCoordinate,
    pub room_type: RoomType,
}

/// Resumable placement state
#[derive(Debug, Clone)]
pub struct GridPlanner {
    grid_size: i32,
    target: usize,
    /// Placed cells that may still have a free neighbor
    frontier: Vec<GridCoordinate>,
    placements: Vec<Placement>,
    tally: TypeTally,
}

impl GridPlanner {
    /// Start a plan with the start room at the grid center
    pub fn new(grid_size: i32, target_room_count: usize) -> Result<Self, GenerationError> {
        if grid_size <= 0 {
            return Err(GenerationError::EmptyGrid);
        }

        let capacity = (grid_size as usize) * (grid_size as usize);
        let target = target_room_count.clamp(1, capacity);
        if target < target_room_count {
            log::debug!("Clamped target room count {} to grid capacity {}", target_room_count, target);
        }

        let start = GridCoordinate::center(grid_size);
        Ok(Self {
            grid_size,
            target,
            frontier: vec![start],
            placements: vec![Placement { coord: start, room_type: RoomType::Start }],
            tally: TypeTally::default(),
        })
    }

    /// Run placement to completion
    pub fn place(
        grid_size: i32,
        target_room_count: usize,
        assigner: &RoomTypeAssigner,
        rng: &mut impl Rng,
    ) -> Result<Vec<Placement>, GenerationError> {
        let mut planner = Self::new(grid_size, target_room_count)?;
        while planner.step(assigner, rng).is_some() {}
        Ok(planner.into_placements())
    }

    /// Place the next room, pruning dead frontier cells along the way.
    ///
    /// Returns `None` once the target is met or the frontier is exhausted.
    pub fn step(&mut self, assigner: &RoomTypeAssigner, rng: &mut impl Rng) -> Option<Placement> {
        while self.placements.len() < self.target && !self.frontier.is_empty() {
            let index = rng.gen_range(0..self.frontier.len());
            let cell = self.frontier[index];

            let free = self.free_directions(cell);
            if free.is_empty() {
                self.frontier.remove(index);
                continue;
            }

            let direction = free[rng.gen_range(0..free.len())];
            let coord = cell.step(direction);
            let room_type = assigner.assign_type(self.placements.len(), self.target, &self.tally, rng);

            let placement = Placement { coord, room_type };
            self.tally.record(room_type);
            self.placements.push(placement);
            self.frontier.push(coord);
            return Some(placement);
        }
        None
    }

    /// In-bounds, unoccupied neighbors of a cell, in slot order
    fn free_directions(&self, cell: GridCoordinate) -> Vec<Direction> {
        Direction::ALL
            .into_iter()
            .filter(|d| {
                let n = cell.step(*d);
                n.in_bounds(self.grid_size) && !self.is_occupied(n)
            })
            .collect()
    }

    fn is_occupied(&self, coord: GridCoordinate) -> bool {
        self.placements.iter().any(|p| p.coord == coord)
    }

    pub fn is_finished(&self) -> bool {
        self.placements.len() >= self.target || self.frontier.is_empty()
    }

    /// Frontier ran dry before the target was met
    pub fn is_exhausted(&self) -> bool {
        self.placements.len() < self.target && self.frontier.is_empty()
    }

    pub fn target(&self) -> usize {
        self.target
    }

    pub fn placed(&self) -> usize {
        self.placements.len()
    }

    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }

    pub fn into_placements(self) -> Vec<Placement> {
        self.placements
    }
}
