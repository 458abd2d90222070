//! Deepgrid - procedural room-graph dungeons
//!
//! Rooms are placed on a square grid, typed, linked with symmetric doors and
//! then driven through their lifecycle as the player explores.

pub mod data;
pub mod game;
pub mod world;

// Re-export commonly used types
pub use data::{ConfigError, DungeonConfig};
pub use game::{DungeonSession, LifecycleOutcome, RoomEvent, TraverseError};
pub use world::generation::{generate, GenerationError, GenerationRun};
pub use world::{Direction, GridCoordinate, Room, RoomGraphDirectory, RoomType};
