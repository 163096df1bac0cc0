//! Board geometry endpoint

use axum::Json;
use grapiz_core::{all_positions, starting_layout, Piece, BOARD_RADIUS, DIRECTIONS, LINE_AXES};
use serde::Serialize;

#[derive(Serialize)]
pub struct BoardInfo {
    pub radius: i8,
    pub hexes: Vec<[i8; 2]>,
    pub directions: Vec<[i8; 2]>,
    pub line_axes: Vec<[i8; 2]>,
    pub starting_layout: Vec<Piece>,
}

/// Get board geometry and the opening position
pub async fn get_board() -> Json<BoardInfo> {
    Json(BoardInfo {
        radius: BOARD_RADIUS,
        hexes: all_positions().into_iter().map(|p| [p.x, p.y]).collect(),
        directions: DIRECTIONS.iter().map(|&(dx, dy)| [dx, dy]).collect(),
        line_axes: LINE_AXES.iter().map(|&(dx, dy)| [dx, dy]).collect(),
        starting_layout: starting_layout(),
    })
}
