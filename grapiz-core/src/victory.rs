//! Connectivity-based victory check
//!
//! A side wins when all of its pieces form a single group under hex
//! adjacency. Both sides connected at once is a draw.

use crate::pieces::{Piece, Side};
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};

/// Outcome of a position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameResult {
    Ongoing,
    BlueWins,
    RedWins,
    Draw,
}

impl GameResult {
    pub fn winner(self) -> Option<Side> {
        match self {
            GameResult::BlueWins => Some(Side::Blue),
            GameResult::RedWins => Some(Side::Red),
            GameResult::Ongoing | GameResult::Draw => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        self != GameResult::Ongoing
    }

    fn win_for(side: Side) -> Self {
        match side {
            Side::Blue => GameResult::BlueWins,
            Side::Red => GameResult::RedWins,
        }
    }
}

/// Resolve the position
pub fn evaluate_victory(pieces: &[Piece]) -> GameResult {
    let blue = is_connected(pieces, Side::Blue);
    let red = is_connected(pieces, Side::Red);

    match (blue, red) {
        (true, true) => GameResult::Draw,
        (true, false) => GameResult::win_for(Side::Blue),
        (false, true) => GameResult::win_for(Side::Red),
        (false, false) => GameResult::Ongoing,
    }
}

/// True if every piece of `side` belongs to one group. A side with no pieces is never connected.
pub fn is_connected(pieces: &[Piece], side: Side) -> bool {
    let mut own = pieces.iter().filter(|p| p.owner == side);
    let Some(seed) = own.next() else {
        return false;
    };
    let total = 1 + own.count();
    group_size(pieces, seed) == total
}

/// Size of the group containing `seed`, by iterative flood fill
pub fn group_size(pieces: &[Piece], seed: &Piece) -> usize {
    let occupied: FxHashSet<_> = pieces
        .iter()
        .filter(|p| p.owner == seed.owner)
        .map(|p| p.position)
        .collect();

    let mut visited = FxHashSet::default();
    let mut stack = vec![seed.position];

    while let Some(pos) = stack.pop() {
        if !visited.insert(pos) {
            continue;
        }
        stack.extend(
            pos.neighbors()
                .filter(|n| occupied.contains(n) && !visited.contains(n)),
        );
    }

    visited.len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Position;
    use crate::pieces::{starting_layout, PieceId};

    fn piece(id: u8, owner: Side, x: i8, y: i8) -> Piece {
        Piece { id: PieceId(id), owner, position: Position::new(x, y) }
    }

    fn mirrored(pieces: &[Piece]) -> Vec<Piece> {
        pieces
            .iter()
            .map(|p| Piece { owner: p.owner.opponent(), ..*p })
            .collect()
    }

    #[test]
    fn test_opening_is_ongoing() {
        assert_eq!(evaluate_victory(&starting_layout()), GameResult::Ongoing);
    }

    #[test]
    fn test_one_side_connected_wins() {
        let pieces = vec![
            piece(1, Side::Blue, 0, 0),
            piece(2, Side::Blue, 1, 0),
            piece(3, Side::Blue, 0, 1),
            piece(4, Side::Red, 3, -3),
            piece(5, Side::Red, -3, 3),
        ];
        assert_eq!(evaluate_victory(&pieces), GameResult::BlueWins);
        assert_eq!(evaluate_victory(&mirrored(&pieces)), GameResult::RedWins);
    }

    #[test]
    fn test_both_connected_is_draw() {
        let pieces = vec![
            piece(1, Side::Blue, 0, 0),
            piece(2, Side::Blue, 1, 0),
            piece(3, Side::Red, -3, 0),
            piece(4, Side::Red, -3, 1),
        ];
        assert_eq!(evaluate_victory(&pieces), GameResult::Draw);
    }

    #[test]
    fn test_single_piece_is_connected() {
        let pieces = vec![piece(1, Side::Blue, 0, 0), piece(2, Side::Red, 2, 0), piece(3, Side::Red, -2, 0)];
        assert!(is_connected(&pieces, Side::Blue));
        assert!(!is_connected(&pieces, Side::Red));
    }

    #[test]
    fn test_empty_side_never_connected() {
        let pieces = vec![piece(1, Side::Red, 2, 0), piece(2, Side::Red, -2, 0)];
        assert!(!is_connected(&pieces, Side::Blue));
        assert_eq!(evaluate_victory(&pieces), GameResult::Ongoing);
    }

    #[test]
    fn test_fill_independent_of_seed() {
        let pieces = starting_layout();
        for side in [Side::Blue, Side::Red] {
            let own: Vec<_> = pieces.iter().filter(|p| p.owner == side).collect();
            for seed in &own {
                // No two same-side pieces touch in the opening
                assert_eq!(group_size(&pieces, seed), 1, "{:?}", seed);
            }
        }

        let chain = vec![
            piece(1, Side::Blue, -2, 0),
            piece(2, Side::Blue, -1, 0),
            piece(3, Side::Blue, 0, 0),
            piece(4, Side::Blue, 0, 1),
        ];
        let sizes: Vec<_> = chain.iter().map(|seed| group_size(&chain, seed)).collect();
        assert!(sizes.iter().all(|&s| s == 4));
    }

    #[test]
    fn test_idempotent() {
        let pieces = starting_layout();
        assert_eq!(evaluate_victory(&pieces), evaluate_victory(&pieces));
    }

    #[test]
    fn test_mirror_symmetry_on_opening() {
        let pieces = starting_layout();
        assert_eq!(evaluate_victory(&mirrored(&pieces)), GameResult::Ongoing);
    }
}
