//! Game module - runtime room lifecycle and session management

mod events;
mod lifecycle;
mod session;

pub use events::RoomEvent;
pub use lifecycle::{LifecycleOutcome, RoomLifecycleController};
pub use session::{DungeonSession, Traversal, TraverseError};
