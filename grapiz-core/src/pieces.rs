//! Sides, pieces, moves and the starting layout

use crate::board::{Position, BOARD_RADIUS, DIRECTIONS};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player color. Blue is side A and moves first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Blue,
    Red,
}

impl Side {
    pub fn opponent(self) -> Self {
        match self {
            Side::Blue => Side::Red,
            Side::Red => Side::Blue,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Blue => write!(f, "blue"),
            Side::Red => write!(f, "red"),
        }
    }
}

/// Stable piece identifier, assigned once at game start
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PieceId(pub u8);

impl fmt::Display for PieceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A piece on the board
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Piece {
    pub id: PieceId,
    pub owner: Side,
    pub position: Position,
}

/// One piece transition
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub piece_id: PieceId,
    pub from: Position,
    pub to: Position,
}

/// Number of pieces in the starting layout
pub const STARTING_PIECES: usize = 18;

/// Six trios, one per board corner.
///
/// Each trio is the corner cell plus its two rim neighbours. Even corners
/// hold a Blue corner piece flanked by Red, odd corners the reverse.
pub fn starting_layout() -> Vec<Piece> {
    let mut pieces = Vec::with_capacity(STARTING_PIECES);
    let mut next_id = 1u8;

    for i in 0..6 {
        let corner = Position::new(DIRECTIONS[i].0 * BOARD_RADIUS, DIRECTIONS[i].1 * BOARD_RADIUS);
        let (center_side, flank_side) = if i % 2 == 0 {
            (Side::Blue, Side::Red)
        } else {
            (Side::Red, Side::Blue)
        };
        let flanks = [DIRECTIONS[(i + 2) % 6], DIRECTIONS[(i + 4) % 6]];

        pieces.push(Piece { id: PieceId(next_id), owner: center_side, position: corner });
        next_id += 1;
        for dir in flanks {
            let position = Position::new(corner.x + dir.0, corner.y + dir.1);
            pieces.push(Piece { id: PieceId(next_id), owner: flank_side, position });
            next_id += 1;
        }
    }

    pieces
}

/// Find a piece by id
pub fn find_piece(pieces: &[Piece], id: PieceId) -> Option<&Piece> {
    pieces.iter().find(|p| p.id == id)
}

/// Piece occupying a cell
pub fn piece_at(pieces: &[Piece], pos: Position) -> Option<&Piece> {
    pieces.iter().find(|p| p.position == pos)
}

/// Pieces owned by `side`, in collection order
pub fn side_pieces(pieces: &[Piece], side: Side) -> impl Iterator<Item = &Piece> {
    pieces.iter().filter(move |p| p.owner == side)
}

/// Apply a move: capture whatever enemy stands on the destination, then relocate.
///
/// Does not check legality. An unknown piece id leaves the set unchanged.
pub fn apply_move(pieces: &[Piece], mv: &Move) -> Vec<Piece> {
    let mover = match find_piece(pieces, mv.piece_id) {
        Some(p) => *p,
        None => return pieces.to_vec(),
    };

    pieces
        .iter()
        .filter(|p| !(p.position == mv.to && p.owner != mover.owner))
        .map(|p| {
            if p.id == mv.piece_id {
                Piece { position: mv.to, ..*p }
            } else {
                *p
            }
        })
        .collect()
}
