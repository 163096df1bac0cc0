//! Hex board geometry with axial coordinates

use serde::{Deserialize, Serialize};

/// Board radius (distance from center to edge)
pub const BOARD_RADIUS: i8 = 4;

/// Axial hex coordinates; the third coordinate is `s = -x - y`
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub x: i8,
    pub y: i8,
}

impl Position {
    pub const fn new(x: i8, y: i8) -> Self {
        Self { x, y }
    }

    /// Check if this cell is on the board
    pub fn is_on_board(&self) -> bool {
        let (x, y) = (self.x as i16, self.y as i16);
        let radius = BOARD_RADIUS as i16;
        x.abs().max(y.abs()).max((x + y).abs()) <= radius
    }

    /// Distance from center (0,0)
    pub fn distance_to_center(&self) -> i8 {
        self.distance_to(Position::new(0, 0))
    }

    /// Distance between two cells
    pub fn distance_to(&self, other: Position) -> i8 {
        let dx = (self.x as i16 - other.x as i16).abs();
        let dy = (self.y as i16 - other.y as i16).abs();
        let ds = ((self.x as i16 + self.y as i16) - (other.x as i16 + other.y as i16)).abs();
        ((dx + dy + ds) / 2).min(i8::MAX as i16) as i8
    }

    /// Cell at `self + k * (dx, dy)`, or `None` if the coordinates overflow
    pub fn offset(&self, (dx, dy): (i8, i8), k: i8) -> Option<Position> {
        let x = self.x.checked_add(dx.checked_mul(k)?)?;
        let y = self.y.checked_add(dy.checked_mul(k)?)?;
        Some(Position::new(x, y))
    }

    /// On-board cells adjacent to this one
    pub fn neighbors(&self) -> impl Iterator<Item = Position> + '_ {
        DIRECTIONS
            .iter()
            .filter_map(move |&dir| self.offset(dir, 1))
            .filter(Position::is_on_board)
    }

    pub fn is_adjacent(&self, other: Position) -> bool {
        self.neighbors().any(|n| n == other)
    }
}

/// Unit direction vectors in axial coordinates (dx, dy)
/// Index: 0=E, 1=SE, 2=SW, 3=W, 4=NW, 5=NE
pub const DIRECTIONS: [(i8, i8); 6] = [
    (1, 0),   // E
    (0, 1),   // SE
    (-1, 1),  // SW
    (-1, 0),  // W
    (0, -1),  // NW
    (1, -1),  // NE
];

/// Undirected axes along which pieces slide.
/// The three hex axes plus the (1,1) diagonal.
pub const LINE_AXES: [(i8, i8); 4] = [
    (1, 0),
    (0, 1),
    (1, -1),
    (1, 1),
];

/// Exact coordinate comparison
pub fn positions_equal(a: Position, b: Position) -> bool {
    a.x == b.x && a.y == b.y
}

/// Every on-board cell, row by row
pub fn all_positions() -> Vec<Position> {
    let mut cells = Vec::new();
    for y in -BOARD_RADIUS..=BOARD_RADIUS {
        for x in -BOARD_RADIUS..=BOARD_RADIUS {
            let pos = Position::new(x, y);
            if pos.is_on_board() {
                cells.push(pos);
            }
        }
    }
    cells
}

/// Maximal on-board run along `axis` containing `pos`, ordered along the axis.
///
/// The board is convex, so the run is contiguous. Returns an empty line
/// when `pos` itself is off the board.
pub fn line_through(pos: Position, axis: (i8, i8)) -> Vec<Position> {
    if !pos.is_on_board() {
        return Vec::new();
    }
    let span = BOARD_RADIUS * 2;
    (-span..=span)
        .filter_map(|k| pos.offset(axis, k))
        .filter(Position::is_on_board)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_validity() {
        assert!(Position::new(0, 0).is_on_board());
        assert!(Position::new(4, 0).is_on_board());
        assert!(Position::new(0, -4).is_on_board());
        assert!(Position::new(4, -4).is_on_board());
        assert!(!Position::new(5, 0).is_on_board());
        assert!(!Position::new(3, 3).is_on_board()); // x + y = 6 > 4
        assert!(!Position::new(i8::MIN, i8::MAX).is_on_board());
    }

    #[test]
    fn test_cell_count() {
        // 3R(R+1) + 1
        assert_eq!(all_positions().len(), 61);
    }

    #[test]
    fn test_rotation_symmetry() {
        // (x, y) -> (-y, x + y) rotates the axial grid by 60 degrees
        for x in -6i8..=6 {
            for y in -6i8..=6 {
                let p = Position::new(x, y);
                let rotated = Position::new(-y, x + y);
                assert_eq!(p.is_on_board(), rotated.is_on_board(), "{:?}", p);
            }
        }
        for (i, &(dx, dy)) in DIRECTIONS.iter().enumerate() {
            assert_eq!(DIRECTIONS[(i + 1) % 6], (-dy, dx + dy));
        }
    }

    #[test]
    fn test_neighbors() {
        assert_eq!(Position::new(0, 0).neighbors().count(), 6);
        // Corner cell only keeps three
        assert_eq!(Position::new(4, 0).neighbors().count(), 3);
        assert_eq!(Position::new(120, 0).neighbors().count(), 0);
        assert_eq!(Position::new(i8::MAX, i8::MAX).neighbors().count(), 0);
    }

    #[test]
    fn test_distance() {
        assert_eq!(Position::new(0, 0).distance_to_center(), 0);
        assert_eq!(Position::new(1, 0).distance_to_center(), 1);
        assert_eq!(Position::new(2, -2).distance_to_center(), 2);
        assert_eq!(Position::new(4, -4).distance_to_center(), 4);
        assert_eq!(Position::new(1, 1).distance_to(Position::new(-1, -1)), 4);
    }

    #[test]
    fn test_lines() {
        let line = line_through(Position::new(0, 0), (1, 0));
        assert_eq!(line.len(), 9);
        assert_eq!(line.first(), Some(&Position::new(-4, 0)));

        // The diagonal through the center only reaches (2,2) and (-2,-2)
        let diag = line_through(Position::new(0, 0), (1, 1));
        assert_eq!(diag.len(), 5);

        let edge = line_through(Position::new(4, -2), (1, -1));
        assert!(edge.contains(&Position::new(4, -2)));
        assert!(edge.iter().all(Position::is_on_board));

        assert!(line_through(Position::new(9, 9), (1, 0)).is_empty());
    }

    #[test]
    fn test_positions_equal() {
        assert!(positions_equal(Position::new(1, -2), Position::new(1, -2)));
        assert!(!positions_equal(Position::new(1, -2), Position::new(-2, 1)));
    }
}
