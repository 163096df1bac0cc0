//! Grapiz Core - Rules engine and AI
//!
//! This crate provides the core game logic for Grapiz:
//! - Board geometry (hex grid with axial coordinates)
//! - Pieces, starting layout and line-sliding move generation
//! - Connectivity-based victory check
//! - Client game state machine (selection, clocks, chat, forfeit)
//! - Position evaluation and minimax/alpha-beta AI

pub mod board;
pub mod pieces;
pub mod moves;
pub mod victory;
pub mod error;
pub mod game;
pub mod eval;
pub mod ai;

// Re-exports for convenient access
pub use board::{all_positions, line_through, positions_equal, Position, BOARD_RADIUS, DIRECTIONS, LINE_AXES};
pub use pieces::{apply_move, starting_layout, Move, Piece, PieceId, Side};
pub use moves::{all_legal_moves, legal_moves, legal_moves_for};
pub use victory::{evaluate_victory, GameResult};
pub use error::MoveError;
pub use game::{ChatMessage, Clocks, GameEvent, GameMode, GameState, GameStatus, INITIAL_CLOCK_SECS};
pub use eval::{evaluate, Weights, WIN_VALUE};
pub use ai::{choose_move, AiConfig, AiLevel, AiPlayer};
