//! World module
//!
//! Room graph data structures and procedural generation.

pub mod directory;
pub mod door;
pub mod generation;
pub mod grid;
pub mod minimap;
pub mod room;

pub use directory::{RoomBlueprint, RoomGraphDirectory};
pub use door::{Door, DoorState, RoomHandle, TeleportAnchor};
pub use grid::{Direction, GridCoordinate, LocalPoint};
pub use minimap::{MinimapCell, MinimapSnapshot};
pub use room::{LifecycleState, Room, RoomType};
