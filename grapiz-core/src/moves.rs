//! Move generation
//!
//! A piece slides along one of the four line axes through its cell. The
//! distance is fixed: exactly as many steps as there are pieces (of either
//! side, itself included) anywhere on that line. It may pass over its own
//! pieces but never over an enemy, and it may not land on its own piece.
//! Landing on an enemy captures it.

use crate::board::{line_through, Position, LINE_AXES};
use crate::pieces::{find_piece, piece_at, side_pieces, Move, Piece, PieceId, Side};

/// Legal destinations for `piece`, in discovery order with duplicates removed
pub fn legal_moves(piece: &Piece, pieces: &[Piece]) -> Vec<Position> {
    let mut destinations = Vec::new();

    for axis in LINE_AXES {
        let line = line_through(piece.position, axis);
        let Some(origin) = line.iter().position(|&cell| cell == piece.position) else {
            continue;
        };

        let distance = line
            .iter()
            .filter(|&&cell| piece_at(pieces, cell).is_some())
            .count();

        for target in [origin.checked_add(distance), origin.checked_sub(distance)] {
            let Some(target) = target.filter(|&t| t < line.len()) else {
                continue;
            };
            if is_blocked(&line, origin, target, piece.owner, pieces) {
                continue;
            }
            let dest = line[target];
            if piece_at(pieces, dest).is_some_and(|p| p.owner == piece.owner) {
                continue;
            }
            if !destinations.contains(&dest) {
                destinations.push(dest);
            }
        }
    }

    destinations
}

/// Legal destinations for a piece looked up by id; empty if the id is unknown
pub fn legal_moves_for(id: PieceId, pieces: &[Piece]) -> Vec<Position> {
    find_piece(pieces, id)
        .map(|piece| legal_moves(piece, pieces))
        .unwrap_or_default()
}

/// Every legal move for `side`, grouped by piece in collection order
pub fn all_legal_moves(pieces: &[Piece], side: Side) -> Vec<Move> {
    side_pieces(pieces, side)
        .flat_map(|piece| {
            legal_moves(piece, pieces).into_iter().map(move |to| Move {
                piece_id: piece.id,
                from: piece.position,
                to,
            })
        })
        .collect()
}

/// True if `side` has at least one legal move
pub fn has_legal_move(pieces: &[Piece], side: Side) -> bool {
    side_pieces(pieces, side).any(|piece| !legal_moves(piece, pieces).is_empty())
}

/// True if the move lands on an enemy piece
pub fn is_capture(mv: &Move, pieces: &[Piece]) -> bool {
    match (find_piece(pieces, mv.piece_id), piece_at(pieces, mv.to)) {
        (Some(mover), Some(target)) => mover.owner != target.owner,
        _ => false,
    }
}

/// An enemy piece strictly between the two line indices blocks the slide
fn is_blocked(line: &[Position], from: usize, to: usize, side: Side, pieces: &[Piece]) -> bool {
    let (lo, hi) = if from < to { (from, to) } else { (to, from) };
    line[lo + 1..hi]
        .iter()
        .any(|&cell| piece_at(pieces, cell).is_some_and(|p| p.owner != side))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pieces::starting_layout;

    fn piece(id: u8, owner: Side, x: i8, y: i8) -> Piece {
        Piece { id: PieceId(id), owner, position: Position::new(x, y) }
    }

    #[test]
    fn test_lone_piece_moves_one_step() {
        let pieces = vec![piece(1, Side::Blue, 0, 0)];
        let moves = legal_moves(&pieces[0], &pieces);
        // Four axes, two directions each
        assert_eq!(moves.len(), 8);
        for dest in &moves {
            let (dx, dy) = (dest.x.abs(), dest.y.abs());
            assert!(matches!((dx, dy), (1, 0) | (0, 1) | (1, 1)), "{:?}", dest);
        }
        assert!(moves.contains(&Position::new(1, 1)));
        assert!(moves.contains(&Position::new(-1, 1)));
    }

    #[test]
    fn test_distance_counts_whole_line() {
        // Three pieces on the horizontal line: slide exactly three steps
        let pieces = vec![
            piece(1, Side::Blue, 0, 0),
            piece(2, Side::Blue, 1, 0),
            piece(3, Side::Red, -3, 0),
        ];
        let moves = legal_moves(&pieces[0], &pieces);
        assert!(moves.contains(&Position::new(3, 0)));
        assert!(moves.contains(&Position::new(-3, 0)));
        assert!(!moves.contains(&Position::new(2, 0)));
        assert!(!moves.contains(&Position::new(-1, 0)));
        assert!(!moves.contains(&Position::new(-2, 0)));
    }

    #[test]
    fn test_capture_at_second_step() {
        // Line occupancy 2, enemy exactly two steps away, nothing between
        let pieces = vec![piece(1, Side::Blue, 0, 0), piece(2, Side::Red, 2, 0)];
        let moves = legal_moves(&pieces[0], &pieces);
        assert!(moves.contains(&Position::new(2, 0)));
        let mv = Move { piece_id: PieceId(1), from: Position::new(0, 0), to: Position::new(2, 0) };
        assert!(is_capture(&mv, &pieces));
    }

    #[test]
    fn test_enemy_blocks_slide() {
        // Enemy on the intermediate step: line count 3, capture at step 3 blocked
        let pieces = vec![
            piece(1, Side::Blue, 0, 0),
            piece(2, Side::Red, 1, 0),
            piece(3, Side::Red, 3, 0),
        ];
        let moves = legal_moves(&pieces[0], &pieces);
        assert!(!moves.contains(&Position::new(3, 0)));

        // Same idea at distance 2: enemy at step 1 and empty step 2
        let pieces = vec![piece(1, Side::Blue, 0, 0), piece(2, Side::Red, 1, 0)];
        let moves = legal_moves(&pieces[0], &pieces);
        assert!(!moves.contains(&Position::new(2, 0)));
        assert!(moves.contains(&Position::new(-2, 0)));
    }

    #[test]
    fn test_may_jump_own_pieces() {
        let pieces = vec![piece(1, Side::Blue, 0, 0), piece(2, Side::Blue, 1, 0)];
        let moves = legal_moves(&pieces[0], &pieces);
        assert!(moves.contains(&Position::new(2, 0)));
    }

    #[test]
    fn test_cannot_land_on_own_piece() {
        let pieces = vec![piece(1, Side::Blue, 0, 0), piece(2, Side::Blue, 2, 0)];
        let moves = legal_moves(&pieces[0], &pieces);
        assert!(!moves.contains(&Position::new(2, 0)));
        assert!(moves.contains(&Position::new(-2, 0)));
    }

    #[test]
    fn test_move_off_board_rejected() {
        // Corner piece with two pieces on its row cannot leave the board
        let pieces = vec![piece(1, Side::Blue, 4, 0), piece(2, Side::Red, -4, 0)];
        let moves = legal_moves(&pieces[0], &pieces);
        assert!(moves.iter().all(Position::is_on_board));
        assert!(moves.contains(&Position::new(2, 0)));
    }

    #[test]
    fn test_unknown_piece_has_no_moves() {
        let pieces = starting_layout();
        assert!(legal_moves_for(PieceId(200), &pieces).is_empty());
        assert!(!legal_moves_for(PieceId(1), &pieces).is_empty());
    }

    #[test]
    fn test_opening_has_moves_for_both_sides() {
        let pieces = starting_layout();
        assert!(has_legal_move(&pieces, Side::Blue));
        assert!(has_legal_move(&pieces, Side::Red));
        let blue = all_legal_moves(&pieces, Side::Blue);
        assert!(blue.iter().all(|mv| find_piece(&pieces, mv.piece_id).unwrap().owner == Side::Blue));
    }

    #[test]
    fn test_capture_legal_iff_path_clear() {
        // Exhaustive check on one line: a capture is offered exactly when no enemy sits between
        let setups = [
            vec![piece(1, Side::Blue, -2, 0), piece(2, Side::Red, 0, 0), piece(3, Side::Red, 1, 0)],
            vec![piece(1, Side::Blue, -2, 0), piece(2, Side::Blue, -1, 0), piece(3, Side::Red, 1, 0)],
        ];
        for pieces in setups {
            let target = Position::new(1, 0);
            let clear = !pieces
                .iter()
                .any(|p| p.owner == Side::Red && p.position.y == 0 && p.position.x > -2 && p.position.x < 1);
            let moves = legal_moves(&pieces[0], &pieces);
            assert_eq!(moves.contains(&target), clear);
        }
    }
}
