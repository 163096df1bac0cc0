//! Position evaluation

use crate::board::{Position, BOARD_RADIUS};
use crate::pieces::{Piece, Side};
use crate::victory::{evaluate_victory, GameResult};
use anyhow::Context;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Win value (effectively infinite)
pub const WIN_VALUE: f32 = 100000.0;

/// Heuristic weights for position evaluation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    /// Per step of closeness to the center
    pub center_position: f32,
    /// Flat bonus inside the central zone
    pub central_control: f32,
    /// Radius of the central zone
    pub central_zone: i8,
    /// Per adjacent allied piece
    pub connected_allies: f32,
    /// Multiplier on allied chain value
    pub chain_formation: f32,
    /// Base capture bonus (scaled by `lone_capture_factor` for lone targets)
    pub capture_bonus: f32,
    pub lone_capture_factor: f32,
    /// Multiplier on the strength of a broken enemy chain
    pub break_chain_bonus: f32,
    /// Bonus when an ally is touched by two or more enemies
    pub protection_bonus: f32,
    /// Fraction of `center_position` granted for moving inward
    pub inward_factor: f32,
    /// Chain DFS decay bases: value += (distance_base - d) * (depth_base - depth)
    pub chain_distance_base: i32,
    pub chain_depth_base: i32,
    pub enemy_chain_depth_base: i32,
    /// Extra chain multiplier for own pieces in a chain
    pub own_chain_factor: f32,
    /// Weight of the opponent's evaluation relative to ours
    pub opponent_factor: f32,

    /// Easy tier: capture, per-step center, and retreat terms
    pub easy_capture_bonus: f32,
    pub easy_center_weight: f32,
    pub easy_retreat_penalty: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            center_position: 150.0,
            central_control: 130.0,
            central_zone: 2,
            connected_allies: 100.0,
            chain_formation: 120.0,
            capture_bonus: 200.0,
            lone_capture_factor: 0.3,
            break_chain_bonus: 250.0,
            protection_bonus: 90.0,
            inward_factor: 0.5,
            chain_distance_base: 5,
            chain_depth_base: 5,
            enemy_chain_depth_base: 4,
            own_chain_factor: 1.5,
            opponent_factor: 0.8,
            easy_capture_bonus: 1000.0,
            easy_center_weight: 200.0,
            easy_retreat_penalty: 100.0,
        }
    }
}

impl Weights {
    /// Load from a JSON file; missing fields keep their defaults
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading weights from {}", path.display()))?;
        serde_json::from_str(&content).with_context(|| format!("parsing weights in {}", path.display()))
    }

    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Closeness to center, `BOARD_RADIUS - distance`
fn centrality(pos: Position) -> f32 {
    (BOARD_RADIUS - pos.distance_to_center()) as f32
}

/// Score for `piece` standing on `position` (its own cell, or a candidate destination).
///
/// Enemy on `position` counts as a capture.
pub fn evaluate_placement(position: Position, pieces: &[Piece], piece: &Piece, weights: &Weights) -> f32 {
    let allies: Vec<Piece> = pieces
        .iter()
        .filter(|p| p.owner == piece.owner && p.id != piece.id)
        .copied()
        .collect();
    let enemies: Vec<Piece> = pieces.iter().filter(|p| p.owner != piece.owner).copied().collect();

    let mut score = 0.0f32;
    let distance = position.distance_to_center();

    score += centrality(position) * weights.center_position;
    if distance <= weights.central_zone {
        score += weights.central_control;
    }

    let connected = allies.iter().filter(|a| a.position.is_adjacent(position)).count();
    score += connected as f32 * weights.connected_allies;
    if connected >= 2 {
        score += chain_value(position, &allies, weights) * weights.chain_formation;
    }

    if let Some(target) = enemies.iter().find(|e| e.position == position) {
        if is_part_of_chain(target, &enemies) {
            score += enemy_chain_strength(position, &enemies, weights) * weights.break_chain_bonus;
        } else {
            score += weights.capture_bonus * weights.lone_capture_factor;
        }
    }

    let threatened = allies.iter().chain(std::iter::once(piece)).any(|ally| {
        enemies.iter().filter(|e| e.position.is_adjacent(ally.position)).count() >= 2
    });
    if threatened {
        score += weights.protection_bonus;
    }

    if distance < piece.position.distance_to_center() {
        score += weights.center_position * weights.inward_factor;
    }

    score
}

/// Static evaluation of the whole position from `side`'s point of view
pub fn evaluate(pieces: &[Piece], side: Side, weights: &Weights) -> f32 {
    match terminal_score(evaluate_victory(pieces), side) {
        Some(score) => score,
        None => evaluate_material(pieces, side, weights),
    }
}

/// Terminal score with depth bonus, so that sooner wins rank higher
pub fn evaluate_with_depth(pieces: &[Piece], side: Side, weights: &Weights, depth: i32) -> f32 {
    let result = evaluate_victory(pieces);
    match terminal_score(result, side) {
        Some(base) if base > 0.0 => base + depth as f32,
        Some(base) if base < 0.0 => base - depth as f32,
        Some(base) => base,
        None => evaluate_material(pieces, side, weights),
    }
}

/// `±WIN_VALUE` for decided positions, 0 for a draw, `None` while ongoing
pub fn terminal_score(result: GameResult, side: Side) -> Option<f32> {
    match result {
        GameResult::Ongoing => None,
        GameResult::Draw => Some(0.0),
        other if other.winner() == Some(side) => Some(WIN_VALUE),
        _ => Some(-WIN_VALUE),
    }
}

fn evaluate_material(pieces: &[Piece], side: Side, weights: &Weights) -> f32 {
    let own: Vec<Piece> = pieces.iter().filter(|p| p.owner == side).copied().collect();
    let theirs: Vec<Piece> = pieces.iter().filter(|p| p.owner != side).copied().collect();

    let mut score = 0.0f32;

    for piece in &own {
        score += evaluate_placement(piece.position, pieces, piece, weights);
        if is_part_of_chain(piece, &own) {
            score += chain_value(piece.position, &own, weights) * weights.own_chain_factor;
        }
    }

    for piece in &theirs {
        score -= evaluate_placement(piece.position, pieces, piece, weights) * weights.opponent_factor;
        if is_part_of_chain(piece, &theirs) {
            score -= chain_value(piece.position, &theirs, weights);
        }
    }

    score
}

// ============================================================================
// CHAINS
// ============================================================================

/// Weighted DFS over allied adjacency starting at `start`.
///
/// Each visited cell adds `(distance_base - d) * (depth_base - depth)`,
/// clamped at zero, so value decays with depth and grows toward the center.
pub fn chain_value(start: Position, allies: &[Piece], weights: &Weights) -> f32 {
    let occupied: FxHashSet<Position> = allies.iter().map(|p| p.position).collect();
    let mut visited = FxHashSet::default();
    weighted_dfs(start, 1, &occupied, &mut visited, weights.chain_distance_base, weights.chain_depth_base)
}

/// Strength of the enemy chain around a capture square; zero unless two or more enemies touch it
pub fn enemy_chain_strength(position: Position, enemies: &[Piece], weights: &Weights) -> f32 {
    let touching: Vec<Position> = enemies
        .iter()
        .map(|e| e.position)
        .filter(|p| p.is_adjacent(position))
        .collect();
    if touching.len() < 2 {
        return 0.0;
    }

    let occupied: FxHashSet<Position> = enemies.iter().map(|p| p.position).collect();
    let mut visited = FxHashSet::default();
    touching
        .into_iter()
        .map(|start| {
            weighted_dfs(
                start,
                1,
                &occupied,
                &mut visited,
                weights.chain_distance_base,
                weights.enemy_chain_depth_base,
            )
        })
        .sum()
}

fn weighted_dfs(
    pos: Position,
    depth: i32,
    occupied: &FxHashSet<Position>,
    visited: &mut FxHashSet<Position>,
    distance_base: i32,
    depth_base: i32,
) -> f32 {
    if !visited.insert(pos) {
        return 0.0;
    }
    let closeness = (distance_base - pos.distance_to_center() as i32).max(0);
    let decay = (depth_base - depth).max(0);
    let mut value = (closeness * decay) as f32;

    for neighbor in pos.neighbors() {
        if occupied.contains(&neighbor) {
            value += weighted_dfs(neighbor, depth + 1, occupied, visited, distance_base, depth_base);
        }
    }
    value
}

/// True if `piece` touches two same-side pieces that also touch each other
pub fn is_part_of_chain(piece: &Piece, pieces: &[Piece]) -> bool {
    let touching: Vec<Position> = pieces
        .iter()
        .filter(|p| p.id != piece.id && p.owner == piece.owner && p.position.is_adjacent(piece.position))
        .map(|p| p.position)
        .collect();

    touching
        .iter()
        .enumerate()
        .any(|(i, a)| touching[i + 1..].iter().any(|b| a.is_adjacent(*b)))
}
