//! Play command - a game in the terminal
//!
//! ## Architecture (4-layer granularity)
//!
//! - Level 1: run() - orchestration
//! - Level 2: configure_game(), game_loop()
//! - Level 3: human_turn(), ai_turn()
//! - Level 4: input parsing and board rendering

use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};

use grapiz_core::pieces::piece_at;
use grapiz_core::{
    all_positions, AiConfig, AiLevel, AiPlayer, GameEvent, GameState, GameStatus, PieceId,
    Piece, Position, Side, Weights, BOARD_RADIUS,
};

// ============================================================================
// COMMAND ARGUMENTS (Level 4 - Configuration)
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LevelArg {
    Easy,
    Hard,
}

impl From<LevelArg> for AiLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Easy => AiLevel::Easy,
            LevelArg::Hard => AiLevel::Hard,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum AiSideArg {
    Blue,
    Red,
    /// Hot-seat, no AI
    None,
}

#[derive(Args)]
pub struct PlayArgs {
    /// AI strength
    #[arg(long, value_enum, default_value = "hard")]
    pub level: LevelArg,

    /// Search depth for the hard AI
    #[arg(long, default_value_t = grapiz_core::ai::DEFAULT_DEPTH)]
    pub depth: u32,

    /// Side played by the AI
    #[arg(long, value_enum, default_value = "red")]
    pub ai_side: AiSideArg,

    /// Pause before each AI move, in milliseconds
    #[arg(long, default_value_t = 2000)]
    pub think_ms: u64,

    /// Evaluator weights JSON file
    #[arg(long, value_name = "FILE")]
    pub weights: Option<PathBuf>,
}

/// One line of player input
#[derive(Clone, Debug, PartialEq, Eq)]
enum Command {
    Move { piece: PieceId, to: Position },
    Forfeit,
    Help,
    Quit,
}

// ============================================================================
// LEVEL 1 - ORCHESTRATION
// ============================================================================

/// Run play command
///
/// 1. Build the game and the AI
/// 2. Alternate turns until the game ends
/// 3. Announce the result
pub fn run(args: PlayArgs) -> Result<()> {
    let (state, ai) = configure_game(&args)?;

    tracing::info!(
        "Starting game: level={:?}, depth={}, ai_side={:?}",
        args.level,
        args.depth,
        args.ai_side
    );

    let stdin = io::stdin();
    let final_state = game_loop(state, ai, &mut stdin.lock())?;

    println!("{}", render_board(final_state.pieces()));
    println!("{}", describe_outcome(&final_state));
    Ok(())
}

// ============================================================================
// LEVEL 2 - PHASES
// ============================================================================

fn configure_game(args: &PlayArgs) -> Result<(GameState, Option<AiPlayer>)> {
    let weights = match &args.weights {
        Some(path) => Weights::load(path).context("Failed to load evaluator weights")?,
        None => Weights::default(),
    };

    let ai_side = match args.ai_side {
        AiSideArg::Blue => Some(Side::Blue),
        AiSideArg::Red => Some(Side::Red),
        AiSideArg::None => None,
    };

    let state = match ai_side {
        Some(side) => GameState::new_vs_ai(side),
        None => GameState::new_local(),
    };
    let ai = ai_side.map(|_| {
        AiPlayer::new(AiConfig {
            level: args.level.into(),
            depth: args.depth,
            thinking_delay: Duration::from_millis(args.think_ms),
            weights,
        })
    });

    Ok((state, ai))
}

/// Alternate turns until the game is decided or the player quits
fn game_loop(mut state: GameState, mut ai: Option<AiPlayer>, input: &mut impl BufRead) -> Result<GameState> {
    print_help();

    while state.status() == GameStatus::Active {
        let turn_start = Instant::now();

        let next = match ai.as_mut() {
            Some(ai) if state.ai_to_move() => Some(ai_turn(&state, ai)),
            _ => {
                println!("{}", render_board(state.pieces()));
                human_turn(&state, input)?
            }
        };
        let Some(next) = next else {
            println!("Quitting.");
            break;
        };

        let elapsed = turn_start.elapsed().as_secs() as u32;
        state = if next.status() == GameStatus::Active && elapsed > 0 {
            charge_clock(next, state.side_to_move(), elapsed)
        } else {
            next
        };
    }

    Ok(state)
}

// ============================================================================
// LEVEL 3 - STEPS
// ============================================================================

/// Read commands until one produces a new state; `None` means quit
fn human_turn(state: &GameState, input: &mut impl BufRead) -> Result<Option<GameState>> {
    let side = state.side_to_move();
    loop {
        print!(
            "{} to move ({}s left) > ",
            side,
            state.clocks().remaining(side)
        );
        io::stdout().flush()?;

        let mut line = String::new();
        if input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        match parse_command(&line) {
            Ok(Command::Move { piece, to }) => {
                let attempt = state.select(piece).and_then(|s| s.choose_destination(to));
                match attempt {
                    Ok(next) => return Ok(Some(next)),
                    Err(err) => println!("Illegal move: {}", err),
                }
            }
            Ok(Command::Forfeit) => return Ok(Some(state.apply(&GameEvent::Forfeit { side }))),
            Ok(Command::Help) => print_help(),
            Ok(Command::Quit) => return Ok(None),
            Err(msg) => println!("{}", msg),
        }
    }
}

fn ai_turn(state: &GameState, ai: &mut AiPlayer) -> GameState {
    let side = state.side_to_move();
    std::thread::sleep(ai.config.thinking_delay);

    match ai.choose_move(state.pieces(), side) {
        Some(mv) => {
            println!(
                "AI ({}) moves piece {} from ({}, {}) to ({}, {})",
                side, mv.piece_id, mv.from.x, mv.from.y, mv.to.x, mv.to.y
            );
            state.apply(&GameEvent::OpponentMove(mv))
        }
        None => {
            // Only when the side has no legal move at all
            tracing::warn!("AI has no legal move; forfeiting");
            state.apply(&GameEvent::Forfeit { side })
        }
    }
}

/// Drain `seconds` from the side that just moved
fn charge_clock(state: GameState, side: Side, seconds: u32) -> GameState {
    let clocks = state.clocks();
    let remaining = clocks.remaining(side).saturating_sub(seconds);
    if remaining == 0 {
        // Out of time ends the game just like a forfeit
        return state.apply(&GameEvent::Forfeit { side });
    }
    let (blue, red) = match side {
        Side::Blue => (remaining, clocks.red),
        Side::Red => (clocks.blue, remaining),
    };
    state.apply(&GameEvent::TimeSync { blue, red })
}

// ============================================================================
// LEVEL 4 - UTILITIES
// ============================================================================

/// Parse `<piece-id> <x> <y>` or a word command
fn parse_command(line: &str) -> std::result::Result<Command, String> {
    let words: Vec<&str> = line.split_whitespace().collect();
    match words.as_slice() {
        ["quit"] | ["q"] | ["exit"] => Ok(Command::Quit),
        ["forfeit"] | ["resign"] => Ok(Command::Forfeit),
        ["help"] | ["?"] | [] => Ok(Command::Help),
        [id, x, y] => {
            let piece = id.parse::<u8>().map_err(|_| format!("Bad piece id: {}", id))?;
            let x = x.parse::<i8>().map_err(|_| format!("Bad x coordinate: {}", x))?;
            let y = y.parse::<i8>().map_err(|_| format!("Bad y coordinate: {}", y))?;
            Ok(Command::Move { piece: PieceId(piece), to: Position::new(x, y) })
        }
        _ => Err(format!("Unrecognised input: {}", line.trim())),
    }
}

fn print_help() {
    println!("Enter moves as `<piece-id> <x> <y>`, e.g. `4 1 2`.");
    println!("Other commands: help, forfeit, quit.");
}

/// Text board, one row per y; cells show owner and piece id
fn render_board(pieces: &[Piece]) -> String {
    let mut out = String::new();
    let mut cells = all_positions().into_iter().peekable();

    while let Some(first) = cells.peek().copied() {
        let indent = first.y.unsigned_abs() as usize * 2;
        out.push_str(&format!("{:>3} ", first.y));
        out.push_str(&" ".repeat(indent));
        while let Some(pos) = cells.next_if(|p| p.y == first.y) {
            let cell = match piece_at(pieces, pos) {
                Some(p) => format!("{}{:02}", side_letter(p.owner), p.id.0),
                None => " . ".to_string(),
            };
            out.push_str(&cell);
            out.push(' ');
        }
        out.push('\n');
    }

    out.push_str(&format!("    x runs -{0}..{0} left to right on each row\n", BOARD_RADIUS));
    out
}

fn side_letter(side: Side) -> char {
    match side {
        Side::Blue => 'B',
        Side::Red => 'R',
    }
}

fn describe_outcome(state: &GameState) -> String {
    match (state.status(), state.winner()) {
        (GameStatus::Draw, _) => "Game drawn.".to_string(),
        (GameStatus::Finished, Some(side)) => format!("{} wins after {} moves.", side, state.history().len()),
        _ => "Game abandoned.".to_string(),
    }
}

// ============================================================================
// TESTS
// ============================================================================
