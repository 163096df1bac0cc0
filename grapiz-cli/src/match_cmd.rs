//! Match command - play games between two AI levels
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: play_match(), report_results()
//! - Level 3: play_single_game(), compute_match_statistics()
//! - Level 4: formatting utilities

use anyhow::Result;
use clap::Args;

use grapiz_core::{AiConfig, AiPlayer, GameResult, GameState, Move, Side};

use crate::play_cmd::LevelArg;

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Args)]
pub struct MatchArgs {
    /// Level of the first player (blue in odd games)
    #[arg(long, value_enum, default_value = "hard")]
    pub blue: LevelArg,

    /// Level of the second player (red in odd games)
    #[arg(long, value_enum, default_value = "easy")]
    pub red: LevelArg,

    /// Number of games to play (will alternate colors)
    #[arg(long, default_value = "10")]
    pub games: usize,

    /// Search depth for hard players
    #[arg(long, default_value_t = grapiz_core::ai::DEFAULT_DEPTH)]
    pub depth: u32,

    /// Moves after which an undecided game counts as a draw
    #[arg(long, default_value = "200")]
    pub max_plies: usize,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,
}

/// Result of a single game
#[derive(Clone, Debug)]
struct GameRecord {
    game_number: usize,
    result: GameResult,
    plies: usize,
    /// True when the first player held red
    swapped: bool,
    #[allow(dead_code)] // Kept for replay
    moves: Vec<Move>,
}

/// Aggregated match results, credited to the players rather than colours
#[derive(Clone, Debug)]
struct MatchResults {
    games: Vec<GameRecord>,
    first_wins: usize,
    second_wins: usize,
    draws: usize,
    blue_wins: usize,
    avg_plies: f32,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run match command
///
/// 1. Play the match (multiple games)
/// 2. Report results
pub fn run(args: MatchArgs) -> Result<()> {
    tracing::info!(
        "Starting match: {:?} vs {:?} ({} games, depth={})",
        args.blue,
        args.red,
        args.games,
        args.depth
    );

    let results = play_match(&args);

    report_results(&results, &args)
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

/// Play all games in the match
fn play_match(args: &MatchArgs) -> MatchResults {
    let mut games = Vec::with_capacity(args.games);

    for game_num in 0..args.games {
        // Alternate colors for fairness
        let swapped = game_num % 2 == 1;
        let (blue, red) = if swapped {
            (args.red, args.blue)
        } else {
            (args.blue, args.red)
        };

        let record = play_single_game(blue, red, game_num + 1, swapped, args);

        tracing::info!(
            "Game {}: {:?} ({} plies)",
            record.game_number,
            record.result,
            record.plies
        );

        games.push(record);
    }

    compute_match_statistics(games)
}

/// Report match results
fn report_results(results: &MatchResults, args: &MatchArgs) -> Result<()> {
    if args.json {
        print_json_results(results, args)
    } else {
        print_text_results(results, args);
        Ok(())
    }
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Play one game to completion or the ply limit
fn play_single_game(
    blue: LevelArg,
    red: LevelArg,
    game_number: usize,
    swapped: bool,
    args: &MatchArgs,
) -> GameRecord {
    let player = |level: LevelArg| {
        AiPlayer::new(AiConfig {
            depth: args.depth,
            ..AiConfig::with_level(level.into())
        })
    };
    let mut blue_ai = player(blue);
    let mut red_ai = player(red);

    let mut state = GameState::new_local();
    let mut moves = Vec::new();

    while !state.is_over() && moves.len() < args.max_plies {
        let side = state.side_to_move();
        let ai = match side {
            Side::Blue => &mut blue_ai,
            Side::Red => &mut red_ai,
        };
        let Some(mv) = ai.choose_move(state.pieces(), side) else {
            break;
        };
        match state.try_move(&mv) {
            Ok(next) => {
                state = next;
                moves.push(mv);
            }
            Err(err) => {
                tracing::error!("AI produced an illegal move: {}", err);
                break;
            }
        }
    }

    GameRecord {
        game_number,
        result: state.result(),
        plies: moves.len(),
        swapped,
        moves,
    }
}

/// Compute aggregate statistics from game records
fn compute_match_statistics(games: Vec<GameRecord>) -> MatchResults {
    let winner_is_first = |g: &GameRecord| match g.result.winner() {
        Some(Side::Blue) => Some(!g.swapped),
        Some(Side::Red) => Some(g.swapped),
        None => None,
    };

    let first_wins = games.iter().filter(|g| winner_is_first(g) == Some(true)).count();
    let second_wins = games.iter().filter(|g| winner_is_first(g) == Some(false)).count();
    // Unfinished games count as draws
    let draws = games.len() - first_wins - second_wins;
    let blue_wins = games
        .iter()
        .filter(|g| g.result == GameResult::BlueWins)
        .count();

    let total_plies: usize = games.iter().map(|g| g.plies).sum();
    let avg_plies = if games.is_empty() {
        0.0
    } else {
        total_plies as f32 / games.len() as f32
    };

    MatchResults {
        games,
        first_wins,
        second_wins,
        draws,
        blue_wins,
        avg_plies,
    }
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

fn rate(count: usize, total: usize) -> f32 {
    if total > 0 {
        count as f32 / total as f32
    } else {
        0.0
    }
}

/// Print results as JSON
fn print_json_results(results: &MatchResults, args: &MatchArgs) -> Result<()> {
    #[derive(serde::Serialize)]
    struct JsonGame {
        game_number: usize,
        result: String,
        plies: usize,
        swapped: bool,
    }

    #[derive(serde::Serialize)]
    struct JsonOutput {
        first: String,
        second: String,
        total_games: usize,
        first_wins: usize,
        second_wins: usize,
        draws: usize,
        blue_win_rate: f32,
        avg_plies: f32,
        games: Vec<JsonGame>,
    }

    let total = results.games.len();
    let output = JsonOutput {
        first: format!("{:?}", args.blue).to_lowercase(),
        second: format!("{:?}", args.red).to_lowercase(),
        total_games: total,
        first_wins: results.first_wins,
        second_wins: results.second_wins,
        draws: results.draws,
        blue_win_rate: rate(results.blue_wins, total),
        avg_plies: results.avg_plies,
        games: results
            .games
            .iter()
            .map(|g| JsonGame {
                game_number: g.game_number,
                result: format!("{:?}", g.result),
                plies: g.plies,
                swapped: g.swapped,
            })
            .collect(),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

/// Print results as text
fn print_text_results(results: &MatchResults, args: &MatchArgs) {
    let total = results.games.len();

    println!("\n=== Match Results ===");
    println!("Total games: {}", total);
    println!(
        "{:<12} {} ({:.1}%)",
        format!("{:?} wins:", args.blue),
        results.first_wins,
        rate(results.first_wins, total) * 100.0
    );
    println!(
        "{:<12} {} ({:.1}%)",
        format!("{:?} wins:", args.red),
        results.second_wins,
        rate(results.second_wins, total) * 100.0
    );
    println!(
        "Draws:       {} ({:.1}%)",
        results.draws,
        rate(results.draws, total) * 100.0
    );
    println!("Blue won:    {:.1}%", rate(results.blue_wins, total) * 100.0);
    println!("Avg plies:   {:.1}", results.avg_plies);

    println!("\nGame details:");
    for game in &results.games {
        println!(
            "  Game {}: {:?} in {} plies",
            game.game_number, game.result, game.plies
        );
    }
}

// ============================================================================
// TESTS
// ============================================================================
