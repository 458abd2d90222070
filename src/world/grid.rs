//! Grid coordinates and orthogonal directions
//!
//! The dungeon lives on a square grid of room cells. North is +y.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A room cell on the dungeon grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridCoordinate {
    pub x: i32,
    pub y: i32,
}

impl GridCoordinate {
    pub fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Center cell of a square grid
    pub fn center(grid_size: i32) -> Self {
        Self::new(grid_size / 2, grid_size / 2)
    }

    /// Neighboring cell in a direction (may be out of bounds)
    pub fn step(&self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }

    /// Check if this cell lies inside a square grid
    #[inline]
    pub fn in_bounds(&self, grid_size: i32) -> bool {
        self.x >= 0 && self.x < grid_size && self.y >= 0 && self.y < grid_size
    }

    /// Squared Euclidean distance (keeps comparisons in integers)
    pub fn distance_squared(&self, other: &GridCoordinate) -> i32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Manhattan distance to another cell
    pub fn manhattan(&self, other: &GridCoordinate) -> i32 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    /// Direction from this cell to an orthogonally adjacent cell
    pub fn direction_to(&self, other: &GridCoordinate) -> Option<Direction> {
        Direction::ALL.into_iter().find(|d| self.step(*d) == *other)
    }
}

impl fmt::Display for GridCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Orthogonal direction, also used as the door slot index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    East,
    South,
    West,
}

impl Direction {
    /// All directions in slot order
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::East,
        Direction::South,
        Direction::West,
    ];

    /// Grid offset (dx, dy)
    pub fn offset(&self) -> (i32, i32) {
        match self {
            Direction::North => (0, 1),
            Direction::East => (1, 0),
            Direction::South => (0, -1),
            Direction::West => (-1, 0),
        }
    }

    pub fn opposite(&self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::East => Direction::West,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
        }
    }

    /// Door slot index (0..4)
    pub fn index(&self) -> usize {
        match self {
            Direction::North => 0,
            Direction::East => 1,
            Direction::South => 2,
            Direction::West => 3,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Direction::North => "north",
            Direction::East => "east",
            Direction::South => "south",
            Direction::West => "west",
        }
    }
}

/// A point in a room's local space, origin at the room center
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LocalPoint {
    pub x: f32,
    pub y: f32,
}

impl LocalPoint {
    pub const ORIGIN: LocalPoint = LocalPoint { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Point `distance` units from the origin toward a direction
    pub fn toward(direction: Direction, distance: f32) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(dx as f32 * distance, dy as f32 * distance)
    }

    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }
}
