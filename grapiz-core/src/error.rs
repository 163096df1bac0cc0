//! Errors raised when a move is refused

use crate::board::Position;
use crate::pieces::{PieceId, Side};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MoveError {
    #[error("game is not in progress")]
    GameNotActive,

    #[error("it is {expected}'s turn")]
    NotYourTurn { expected: Side },

    #[error("unknown piece {0}")]
    UnknownPiece(PieceId),

    #[error("piece {piece} belongs to {owner}")]
    WrongOwner { piece: PieceId, owner: Side },

    #[error("piece {piece} is on ({}, {}), not ({}, {})", .actual.x, .actual.y, .claimed.x, .claimed.y)]
    StaleOrigin { piece: PieceId, actual: Position, claimed: Position },

    #[error("piece {piece} cannot reach ({}, {})", .to.x, .to.y)]
    IllegalDestination { piece: PieceId, to: Position },

    #[error("no piece selected")]
    NothingSelected,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_display_messages() {
        let err = MoveError::IllegalDestination { piece: PieceId(4), to: Position::new(2, -1) };
        assert_eq!(err.to_string(), "piece 4 cannot reach (2, -1)");
        assert_eq!(MoveError::NotYourTurn { expected: Side::Red }.to_string(), "it is red's turn");
    }
}
