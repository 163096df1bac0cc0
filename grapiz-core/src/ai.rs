//! Computer opponents
//!
//! Two strengths: an easy one-ply heuristic that rotates through pieces,
//! and a depth-bounded minimax with alpha-beta pruning.

use crate::board::{Position, BOARD_RADIUS};
use crate::eval::{evaluate, evaluate_placement, evaluate_with_depth, terminal_score, Weights};
use crate::moves::{is_capture, legal_moves};
use crate::pieces::{apply_move, side_pieces, Move, Piece, PieceId, Side};
use crate::victory::evaluate_victory;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::VecDeque;
use std::time::Duration;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default search depth for the hard tier, in plies
pub const DEFAULT_DEPTH: u32 = 3;

/// Pieces moved within this many turns are skipped by the easy tier
pub const RECENT_WINDOW: usize = 3;

/// Pause before the AI replies
pub const THINKING_DELAY: Duration = Duration::from_secs(2);

// ============================================================================
// CONFIGURATION
// ============================================================================

/// AI strength
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiLevel {
    Easy,
    Hard,
}

#[derive(Clone, Debug)]
pub struct AiConfig {
    pub level: AiLevel,
    /// Search depth for the hard tier
    pub depth: u32,
    /// Pacing delay applied by the caller before playing the move
    pub thinking_delay: Duration,
    pub weights: Weights,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            level: AiLevel::Hard,
            depth: DEFAULT_DEPTH,
            thinking_delay: THINKING_DELAY,
            weights: Weights::default(),
        }
    }
}

impl AiConfig {
    pub fn with_level(level: AiLevel) -> Self {
        Self { level, ..Self::default() }
    }
}

// ============================================================================
// AI PLAYER
// ============================================================================

/// AI player with a short memory of which pieces it moved last
pub struct AiPlayer {
    pub config: AiConfig,
    recent: VecDeque<PieceId>,
}

impl AiPlayer {
    pub fn new(config: AiConfig) -> Self {
        Self {
            config,
            recent: VecDeque::with_capacity(RECENT_WINDOW + 1),
        }
    }

    /// Pick a move for `side`, or `None` if it has no legal move
    pub fn choose_move(&mut self, pieces: &[Piece], side: Side) -> Option<Move> {
        let mv = match self.config.level {
            AiLevel::Easy => heuristic_move(pieces, side, &self.recent, &self.config.weights),
            AiLevel::Hard => search_move(pieces, side, self.config.depth, &self.config.weights),
        }?;
        self.remember(mv.piece_id);
        Some(mv)
    }

    /// Piece ids moved most recently, oldest first
    pub fn recent(&self) -> impl Iterator<Item = PieceId> + '_ {
        self.recent.iter().copied()
    }

    fn remember(&mut self, id: PieceId) {
        self.recent.push_back(id);
        while self.recent.len() > RECENT_WINDOW {
            self.recent.pop_front();
        }
    }
}

/// Stateless entry point with default weights and depth
pub fn choose_move(pieces: &[Piece], side: Side, level: AiLevel) -> Option<Move> {
    AiPlayer::new(AiConfig::with_level(level)).choose_move(pieces, side)
}

// ============================================================================
// EASY TIER
// ============================================================================

/// One-ply greedy choice: captures first, then closeness to center.
///
/// Pieces in `recent` are skipped unless every movable piece is recent.
pub fn heuristic_move(
    pieces: &[Piece],
    side: Side,
    recent: &VecDeque<PieceId>,
    weights: &Weights,
) -> Option<Move> {
    let movable: Vec<(&Piece, Vec<Position>)> = side_pieces(pieces, side)
        .map(|p| (p, legal_moves(p, pieces)))
        .filter(|(_, destinations)| !destinations.is_empty())
        .collect();
    let fresh: Vec<&(&Piece, Vec<Position>)> = movable
        .iter()
        .filter(|(p, _)| !recent.contains(&p.id))
        .collect();
    let candidates: Vec<&(&Piece, Vec<Position>)> = if fresh.is_empty() {
        movable.iter().collect()
    } else {
        fresh
    };

    let mut best: Option<(f32, Move)> = None;

    for (piece, destinations) in candidates {
        for &to in destinations {
            let mv = Move { piece_id: piece.id, from: piece.position, to };
            let score = heuristic_score(&mv, pieces, weights);
            if best.map_or(true, |(s, _)| score > s) {
                best = Some((score, mv));
            }
        }
    }

    best.map(|(_, mv)| mv)
}

fn heuristic_score(mv: &Move, pieces: &[Piece], weights: &Weights) -> f32 {
    let mut score = 0.0;
    if is_capture(mv, pieces) {
        score += weights.easy_capture_bonus;
    }
    let to_dist = mv.to.distance_to_center();
    let from_dist = mv.from.distance_to_center();
    score += (BOARD_RADIUS - to_dist) as f32 * weights.easy_center_weight;
    if to_dist > from_dist {
        score -= weights.easy_retreat_penalty;
    }
    score
}

// ============================================================================
// MOVE ORDERING
// ============================================================================

/// Moves for `side`, piece by piece, each piece's destinations sorted by placement score.
///
/// The sort is stable so equal scores keep discovery order.
fn ordered_moves(pieces: &[Piece], side: Side, weights: &Weights) -> Vec<Move> {
    let mut moves = Vec::new();
    for piece in side_pieces(pieces, side) {
        let mut scored: Vec<(f32, Move)> = legal_moves(piece, pieces)
            .into_iter()
            .map(|to| {
                let mv = Move { piece_id: piece.id, from: piece.position, to };
                (ordering_score(&mv, pieces, piece, weights), mv)
            })
            .collect();
        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
        moves.extend(scored.into_iter().map(|(_, mv)| mv));
    }
    moves
}

/// Placement score, or the terminal score for `piece`'s side when the move decides the game
fn ordering_score(mv: &Move, pieces: &[Piece], piece: &Piece, weights: &Weights) -> f32 {
    let after = apply_move(pieces, mv);
    match terminal_score(evaluate_victory(&after), piece.owner) {
        Some(score) if score != 0.0 => score,
        _ => evaluate_placement(mv.to, pieces, piece, weights),
    }
}

// ============================================================================
// MINIMAX WITH ALPHA-BETA
// ============================================================================

/// Scores are always from `root`'s point of view
fn minimax(
    pieces: &[Piece],
    depth: i32,
    mut alpha: f32,
    mut beta: f32,
    to_move: Side,
    root: Side,
    weights: &Weights,
) -> f32 {
    if depth <= 0 {
        return evaluate(pieces, root, weights);
    }

    let moves = ordered_moves(pieces, to_move, weights);
    if moves.is_empty() {
        return evaluate(pieces, root, weights);
    }

    let maximizing = to_move == root;
    let mut best = if maximizing { f32::NEG_INFINITY } else { f32::INFINITY };

    for mv in &moves {
        let score = score_child(pieces, mv, depth, alpha, beta, to_move, root, weights);

        if maximizing {
            best = best.max(score);
            alpha = alpha.max(score);
        } else {
            best = best.min(score);
            beta = beta.min(score);
        }

        if alpha >= beta {
            break;
        }
    }

    best
}

/// Apply `mv` and score the result; decided positions stop the search
#[allow(clippy::too_many_arguments)]
fn score_child(
    pieces: &[Piece],
    mv: &Move,
    depth: i32,
    alpha: f32,
    beta: f32,
    to_move: Side,
    root: Side,
    weights: &Weights,
) -> f32 {
    let child = apply_move(pieces, mv);
    if evaluate_victory(&child).is_terminal() {
        return evaluate_with_depth(&child, root, weights, depth);
    }
    minimax(&child, depth - 1, alpha, beta, to_move.opponent(), root, weights)
}

/// Best move for `side` at the given depth, or `None` if it has no legal move
pub fn search_move(pieces: &[Piece], side: Side, depth: u32, weights: &Weights) -> Option<Move> {
    let moves = ordered_moves(pieces, side, weights);
    if moves.len() <= 1 {
        return moves.first().copied();
    }

    let depth = depth.max(1) as i32;
    let mut alpha = f32::NEG_INFINITY;
    let mut best: Option<(f32, Move)> = None;

    for mv in moves {
        let score = score_child(pieces, &mv, depth, alpha, f32::INFINITY, side, side, weights);
        if best.map_or(true, |(s, _)| score > s) {
            best = Some((score, mv));
        }
        alpha = alpha.max(score);
    }

    best.map(|(_, mv)| mv)
}

// ============================================================================
// TESTS
// ============================================================================
