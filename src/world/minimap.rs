//! Read-only minimap snapshot
//!
//! A flattened copy of the room graph for UI consumers: which cells hold
//! rooms, their types and progress, and which doors exist.

use serde::{Deserialize, Serialize};

use super::directory::RoomGraphDirectory;
use super::grid::{Direction, GridCoordinate};
use super::room::RoomType;

/// One room as seen by the minimap
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimapCell {
    pub coord: GridCoordinate,
    pub room_type: RoomType,
    pub visited: bool,
    pub cleared: bool,
    pub revealed: bool,
    pub doors: Vec<Direction>,
    pub open_doors: Vec<Direction>,
}

/// Snapshot of a whole directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinimapSnapshot {
    pub grid_size: i32,
    pub cells: Vec<MinimapCell>,
    pub current: Option<GridCoordinate>,
}

impl MinimapSnapshot {
    pub fn capture(directory: &RoomGraphDirectory, current: Option<GridCoordinate>) -> Self {
        let cells = directory
            .rooms()
            .map(|room| MinimapCell {
                coord: room.coord(),
                room_type: room.room_type(),
                visited: room.is_visited(),
                cleared: room.is_cleared(),
                revealed: room.is_revealed(),
                doors: room.door_directions(),
                open_doors: room.doors().filter(|d| d.is_open()).map(|d| d.direction()).collect(),
            })
            .collect();

        Self {
            grid_size: directory.grid_size(),
            cells,
            current,
        }
    }

    pub fn cell(&self, coord: GridCoordinate) -> Option<&MinimapCell> {
        self.cells.iter().find(|c| c.coord == coord)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Text rendering, north at the top.
    ///
    /// Each cell is drawn as its type glyph (`@` for the current room) with
    /// `-` and `|` marking doors between neighbors.
    pub fn render_ascii(&self) -> String {
        let size = self.grid_size.max(0);
        let mut out = String::new();

        for y in (0..size).rev() {
            let mut row = String::new();
            let mut links_below = String::new();

            for x in 0..size {
                let coord = GridCoordinate::new(x, y);
                match self.cell(coord) {
                    Some(cell) => {
                        let glyph = if self.current == Some(coord) { '@' } else { cell.room_type.glyph() };
                        row.push(glyph);
                        row.push(if cell.doors.contains(&Direction::East) { '-' } else { ' ' });
                        links_below.push(if cell.doors.contains(&Direction::South) { '|' } else { ' ' });
                        links_below.push(' ');
                    }
                    None => {
                        row.push_str(". ");
                        links_below.push_str("  ");
                    }
                }
            }

            out.push_str(row.trim_end());
            out.push('\n');
            if y > 0 {
                out.push_str(links_below.trim_end());
                out.push('\n');
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::DungeonConfig;
    use crate::world::generation::generate;

    #[test]
    fn test_snapshot_matches_directory() {
        let dungeon = generate(&DungeonConfig::default(), 5, 5, 10).unwrap();
        let snapshot = MinimapSnapshot::capture(&dungeon.directory, dungeon.directory.start_coord());

        assert_eq!(snapshot.cells.len(), dungeon.directory.len());
        let start = snapshot.cell(GridCoordinate::new(2, 2)).unwrap();
        assert_eq!(start.room_type, RoomType::Start);
        assert!(start.cleared);
        assert_eq!(start.doors, start.open_doors);
    }

    #[test]
    fn test_ascii_layout() {
        let dungeon = generate(&DungeonConfig::default(), 5, 5, 10).unwrap();
        let snapshot = MinimapSnapshot::capture(&dungeon.directory, None);
        let text = snapshot.render_ascii();

        // 5 room rows plus 4 link rows
        assert_eq!(text.lines().count(), 9);
        assert_eq!(text.matches('S').count(), 1);
        assert_eq!(text.matches('B').count(), 1);
    }

    #[test]
    fn test_json_export() {
        let dungeon = generate(&DungeonConfig::default(), 5, 5, 10).unwrap();
        let snapshot = MinimapSnapshot::capture(&dungeon.directory, None);
        let json = snapshot.to_json().unwrap();
        let parsed: MinimapSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, snapshot);
    }
}
