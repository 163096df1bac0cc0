//! Client-side game state machine
//!
//! `GameState::apply` is a pure transition: it takes an event and returns the
//! next state. Events that do not fit the current state (a click out of turn,
//! an illegal destination, a move after the game ended) return the state
//! unchanged.

use crate::board::Position;
use crate::error::MoveError;
use crate::moves::{has_legal_move, legal_moves};
use crate::pieces::{apply_move, find_piece, starting_layout, Move, Piece, PieceId, Side};
use crate::victory::{evaluate_victory, GameResult};
use serde::{Deserialize, Serialize};

// ============================================================================
// CONSTANTS
// ============================================================================

/// Seconds on each clock at game start
pub const INITIAL_CLOCK_SECS: u32 = 360;

// ============================================================================
// CORE TYPES
// ============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameStatus {
    Waiting,
    Active,
    Finished,
    Draw,
}

/// Our seat in an online session
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Seat {
    pub session_id: String,
    pub side: Side,
}

/// Who controls which side
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameMode {
    /// Hot-seat: both sides played from this client
    Local,
    VsAi { ai_side: Side },
    /// `None` until the relay pairs us
    Online(Option<Seat>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: String,
    pub side: Side,
    pub text: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: i64,
}

/// Remaining seconds per side
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Clocks {
    pub blue: u32,
    pub red: u32,
}

impl Clocks {
    pub fn new(seconds: u32) -> Self {
        Self { blue: seconds, red: seconds }
    }

    pub fn remaining(&self, side: Side) -> u32 {
        match side {
            Side::Blue => self.blue,
            Side::Red => self.red,
        }
    }

    fn remaining_mut(&mut self, side: Side) -> &mut u32 {
        match side {
            Side::Blue => &mut self.blue,
            Side::Red => &mut self.red,
        }
    }
}

impl Default for Clocks {
    fn default() -> Self {
        Self::new(INITIAL_CLOCK_SECS)
    }
}

/// Everything that can happen to a game
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    MatchFound { session_id: String, side: Side },
    SelectPiece(PieceId),
    ChooseDestination(Position),
    /// Move played by the AI or relayed from the peer
    OpponentMove(Move),
    ClockTick { seconds: u32 },
    TimeSync { blue: u32, red: u32 },
    ChatReceived(ChatMessage),
    Forfeit { side: Side },
    OpponentForfeit,
    OpponentDisconnected,
}

// ============================================================================
// GAME STATE
// ============================================================================

/// Game state (clone to mutate)
#[derive(Clone, Debug)]
pub struct GameState {
    pieces: Vec<Piece>,
    side_to_move: Side,
    selected: Option<PieceId>,
    legal_destinations: Vec<Position>,
    status: GameStatus,
    winner: Option<Side>,
    clocks: Clocks,
    chat: Vec<ChatMessage>,
    history: Vec<Move>,
    mode: GameMode,
}

impl GameState {
    // ========================================================================
    // CONSTRUCTORS
    // ========================================================================

    fn with_mode(mode: GameMode, status: GameStatus) -> Self {
        Self {
            pieces: starting_layout(),
            side_to_move: Side::Blue,
            selected: None,
            legal_destinations: Vec::new(),
            status,
            winner: None,
            clocks: Clocks::default(),
            chat: Vec::new(),
            history: Vec::new(),
            mode,
        }
    }

    /// Hot-seat game, already running
    pub fn new_local() -> Self {
        Self::with_mode(GameMode::Local, GameStatus::Active)
    }

    pub fn new_vs_ai(ai_side: Side) -> Self {
        Self::with_mode(GameMode::VsAi { ai_side }, GameStatus::Active)
    }

    /// Online game waiting for a match
    pub fn new_online() -> Self {
        Self::with_mode(GameMode::Online(None), GameStatus::Waiting)
    }

    /// Start from an arbitrary piece set, mainly for analysis and tests
    pub fn from_pieces(pieces: Vec<Piece>, side_to_move: Side, mode: GameMode) -> Self {
        Self {
            pieces,
            side_to_move,
            ..Self::with_mode(mode, GameStatus::Active)
        }
    }

    // ========================================================================
    // ACCESSORS
    // ========================================================================

    pub fn pieces(&self) -> &[Piece] {
        &self.pieces
    }

    pub fn side_to_move(&self) -> Side {
        self.side_to_move
    }

    pub fn selected(&self) -> Option<PieceId> {
        self.selected
    }

    pub fn legal_destinations(&self) -> &[Position] {
        &self.legal_destinations
    }

    pub fn status(&self) -> GameStatus {
        self.status
    }

    pub fn winner(&self) -> Option<Side> {
        self.winner
    }

    pub fn clocks(&self) -> Clocks {
        self.clocks
    }

    pub fn chat(&self) -> &[ChatMessage] {
        &self.chat
    }

    pub fn history(&self) -> &[Move] {
        &self.history
    }

    pub fn mode(&self) -> &GameMode {
        &self.mode
    }

    /// Result in victory-engine terms
    pub fn result(&self) -> GameResult {
        match (self.status, self.winner) {
            (GameStatus::Draw, _) => GameResult::Draw,
            (GameStatus::Finished, Some(Side::Blue)) => GameResult::BlueWins,
            (GameStatus::Finished, Some(Side::Red)) => GameResult::RedWins,
            _ => GameResult::Ongoing,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self.status, GameStatus::Finished | GameStatus::Draw)
    }

    /// True if input for `side` comes from this client
    pub fn controls(&self, side: Side) -> bool {
        match &self.mode {
            GameMode::Local => true,
            GameMode::VsAi { ai_side } => side != *ai_side,
            GameMode::Online(seat) => seat.as_ref().is_some_and(|s| s.side == side),
        }
    }

    /// True when the AI should play next
    pub fn ai_to_move(&self) -> bool {
        self.status == GameStatus::Active
            && matches!(self.mode, GameMode::VsAi { ai_side } if ai_side == self.side_to_move)
    }

    // ========================================================================
    // TRANSITIONS
    // ========================================================================

    /// Pure transition; inapplicable events leave the state unchanged
    pub fn apply(&self, event: &GameEvent) -> GameState {
        match event {
            GameEvent::MatchFound { session_id, side } => self.match_found(session_id, *side),
            GameEvent::SelectPiece(id) => self.select(*id).unwrap_or_else(|_| self.clone()),
            GameEvent::ChooseDestination(to) => {
                self.choose_destination(*to).unwrap_or_else(|_| self.clone())
            }
            GameEvent::OpponentMove(mv) => {
                if self.controls(self.side_to_move) {
                    return self.clone();
                }
                self.try_move(mv).unwrap_or_else(|_| self.clone())
            }
            GameEvent::ClockTick { seconds } => self.tick(*seconds),
            GameEvent::TimeSync { blue, red } => {
                let mut next = self.clone();
                next.clocks = Clocks { blue: *blue, red: *red };
                next
            }
            GameEvent::ChatReceived(message) => {
                let mut next = self.clone();
                next.chat.push(message.clone());
                next
            }
            GameEvent::Forfeit { side } => self.finish_if_active(side.opponent()),
            GameEvent::OpponentForfeit | GameEvent::OpponentDisconnected => match &self.mode {
                GameMode::Online(Some(seat)) => self.finish_if_active(seat.side),
                _ => self.clone(),
            },
        }
    }

    /// Select one of our pieces and compute where it can go
    pub fn select(&self, id: PieceId) -> Result<GameState, MoveError> {
        self.ensure_active()?;
        let piece = find_piece(&self.pieces, id).ok_or(MoveError::UnknownPiece(id))?;
        if piece.owner != self.side_to_move {
            return Err(MoveError::WrongOwner { piece: id, owner: piece.owner });
        }
        if !self.controls(self.side_to_move) {
            return Err(MoveError::NotYourTurn { expected: self.side_to_move });
        }

        let mut next = self.clone();
        next.selected = Some(id);
        next.legal_destinations = legal_moves(piece, &self.pieces);
        Ok(next)
    }

    /// Move the selected piece to `to`
    pub fn choose_destination(&self, to: Position) -> Result<GameState, MoveError> {
        let id = self.selected.ok_or(MoveError::NothingSelected)?;
        let piece = find_piece(&self.pieces, id).ok_or(MoveError::UnknownPiece(id))?;
        if !self.legal_destinations.contains(&to) {
            return Err(MoveError::IllegalDestination { piece: id, to });
        }
        self.try_move(&Move { piece_id: id, from: piece.position, to })
    }

    /// Validate and apply a complete move, then resolve the outcome
    pub fn try_move(&self, mv: &Move) -> Result<GameState, MoveError> {
        self.ensure_active()?;
        let piece = find_piece(&self.pieces, mv.piece_id).ok_or(MoveError::UnknownPiece(mv.piece_id))?;
        if piece.owner != self.side_to_move {
            return Err(MoveError::NotYourTurn { expected: self.side_to_move });
        }
        if piece.position != mv.from {
            return Err(MoveError::StaleOrigin {
                piece: mv.piece_id,
                actual: piece.position,
                claimed: mv.from,
            });
        }
        if !legal_moves(piece, &self.pieces).contains(&mv.to) {
            return Err(MoveError::IllegalDestination { piece: mv.piece_id, to: mv.to });
        }

        let mut next = self.clone();
        next.pieces = apply_move(&self.pieces, mv);
        next.history.push(*mv);
        next.selected = None;
        next.legal_destinations.clear();
        next.side_to_move = self.side_to_move.opponent();
        next.resolve_outcome(self.side_to_move);
        Ok(next)
    }

    fn ensure_active(&self) -> Result<(), MoveError> {
        if self.status == GameStatus::Active {
            Ok(())
        } else {
            Err(MoveError::GameNotActive)
        }
    }

    /// Victory check, then stalemate handling: a side without moves passes,
    /// and if neither side can move the game is drawn.
    fn resolve_outcome(&mut self, mover: Side) {
        match evaluate_victory(&self.pieces) {
            GameResult::Ongoing => {}
            GameResult::Draw => {
                self.status = GameStatus::Draw;
                return;
            }
            decided => {
                self.status = GameStatus::Finished;
                self.winner = decided.winner();
                return;
            }
        }

        if !has_legal_move(&self.pieces, self.side_to_move) {
            if has_legal_move(&self.pieces, mover) {
                self.side_to_move = mover;
            } else {
                self.status = GameStatus::Draw;
            }
        }
    }

    fn match_found(&self, session_id: &str, side: Side) -> GameState {
        let waiting = matches!(self.mode, GameMode::Online(_)) && self.status == GameStatus::Waiting;
        if !waiting {
            return self.clone();
        }
        let seat = Seat { session_id: session_id.to_string(), side };
        GameState {
            chat: self.chat.clone(),
            ..Self::with_mode(GameMode::Online(Some(seat)), GameStatus::Active)
        }
    }

    fn tick(&self, seconds: u32) -> GameState {
        if self.status != GameStatus::Active {
            return self.clone();
        }
        let mut next = self.clone();
        let clock = next.clocks.remaining_mut(self.side_to_move);
        *clock = clock.saturating_sub(seconds);
        if *clock == 0 {
            next.status = GameStatus::Finished;
            next.winner = Some(self.side_to_move.opponent());
            next.selected = None;
            next.legal_destinations.clear();
        }
        next
    }

    fn finish_if_active(&self, winner: Side) -> GameState {
        if self.status != GameStatus::Active {
            return self.clone();
        }
        let mut next = self.clone();
        next.status = GameStatus::Finished;
        next.winner = Some(winner);
        next.selected = None;
        next.legal_destinations.clear();
        next
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::moves::all_legal_moves;

    fn piece(id: u8, owner: Side, x: i8, y: i8) -> Piece {
        Piece { id: PieceId(id), owner, position: Position::new(x, y) }
    }

    fn first_move(state: &GameState) -> Move {
        all_legal_moves(state.pieces(), state.side_to_move())[0]
    }

    #[test]
    fn test_game_creation() {
        let game = GameState::new_local();
        assert_eq!(game.side_to_move(), Side::Blue);
        assert_eq!(game.status(), GameStatus::Active);
        assert_eq!(game.result(), GameResult::Ongoing);
        assert_eq!(game.clocks(), Clocks::new(INITIAL_CLOCK_SECS));
        assert_eq!(game.pieces().len(), 18);
    }

    #[test]
    fn test_select_then_move() {
        let game = GameState::new_local();
        let mv = first_move(&game);
        let selected = game.apply(&GameEvent::SelectPiece(mv.piece_id));
        assert_eq!(selected.selected(), Some(mv.piece_id));
        assert!(selected.legal_destinations().contains(&mv.to));

        let moved = selected.apply(&GameEvent::ChooseDestination(mv.to));
        assert_eq!(moved.side_to_move(), Side::Red);
        assert_eq!(moved.history(), &[mv]);
        assert!(moved.selected().is_none());
        assert!(moved.legal_destinations().is_empty());
    }

    #[test]
    fn test_illegal_destination_is_ignored() {
        let game = GameState::new_local();
        let mv = first_move(&game);
        let selected = game.apply(&GameEvent::SelectPiece(mv.piece_id));
        let after = selected.apply(&GameEvent::ChooseDestination(Position::new(0, 0)));
        assert_eq!(after.side_to_move(), Side::Blue);
        assert!(after.history().is_empty());
        assert_eq!(
            selected.choose_destination(Position::new(0, 0)).unwrap_err(),
            MoveError::IllegalDestination { piece: mv.piece_id, to: Position::new(0, 0) }
        );
    }

    #[test]
    fn test_cannot_select_enemy_piece() {
        let game = GameState::new_local();
        let red = game.pieces().iter().find(|p| p.owner == Side::Red).unwrap().id;
        assert!(matches!(game.select(red), Err(MoveError::WrongOwner { .. })));
        assert!(game.apply(&GameEvent::SelectPiece(red)).selected().is_none());
    }

    #[test]
    fn test_winning_move_finishes_game() {
        let pieces = vec![
            piece(1, Side::Red, 0, 0),
            piece(2, Side::Red, 1, 0),
            piece(3, Side::Red, 3, -1),
            piece(4, Side::Blue, -3, 3),
            piece(5, Side::Blue, -3, -1),
        ];
        let game = GameState::from_pieces(pieces, Side::Red, GameMode::Local);
        assert_eq!(game.status(), GameStatus::Active);
        let mv = Move { piece_id: PieceId(3), from: Position::new(3, -1), to: Position::new(1, -1) };
        let after = game.try_move(&mv).unwrap();
        assert_eq!(after.status(), GameStatus::Finished);
        assert_eq!(after.winner(), Some(Side::Red));
        assert_eq!(after.try_move(&mv).unwrap_err(), MoveError::GameNotActive);
    }

    #[test]
    fn test_stalemated_side_passes() {
        // Both blue corner pieces have an adjacent red blocker on every line
        let pieces = vec![
            piece(1, Side::Red, 0, -3),
            piece(2, Side::Blue, 4, 0),
            piece(3, Side::Red, 3, 0),
            piece(4, Side::Red, 4, -1),
            piece(5, Side::Red, 3, 1),
            piece(6, Side::Red, 3, -1),
            piece(7, Side::Blue, -4, 4),
            piece(8, Side::Red, -3, 4),
            piece(9, Side::Red, -4, 3),
            piece(10, Side::Red, -3, 3),
        ];
        let game = GameState::from_pieces(pieces, Side::Red, GameMode::Local);
        assert!(!has_legal_move(game.pieces(), Side::Blue));

        let mv = first_move(&game);
        assert_eq!(mv.piece_id, PieceId(1));
        let after = game.try_move(&mv).unwrap();
        assert_eq!(after.status(), GameStatus::Active);
        assert_eq!(after.side_to_move(), Side::Red);
    }

    #[test]
    fn test_clock_expiry() {
        let game = GameState::new_local();
        let ticked = game.apply(&GameEvent::ClockTick { seconds: 10 });
        assert_eq!(ticked.clocks().blue, INITIAL_CLOCK_SECS - 10);
        assert_eq!(ticked.clocks().red, INITIAL_CLOCK_SECS);

        let expired = ticked.apply(&GameEvent::ClockTick { seconds: 1000 });
        assert_eq!(expired.status(), GameStatus::Finished);
        assert_eq!(expired.winner(), Some(Side::Red));
        assert_eq!(expired.clocks().blue, 0);
    }

    #[test]
    fn test_forfeit() {
        let game = GameState::new_local();
        let after = game.apply(&GameEvent::Forfeit { side: Side::Blue });
        assert_eq!(after.winner(), Some(Side::Red));
        assert_eq!(after.result(), GameResult::RedWins);
    }

    #[test]
    fn test_online_flow() {
        let game = GameState::new_online();
        assert_eq!(game.status(), GameStatus::Waiting);
        // Nothing is playable before the match
        let mv = all_legal_moves(game.pieces(), Side::Blue)[0];
        assert_eq!(game.try_move(&mv).unwrap_err(), MoveError::GameNotActive);

        let game = game.apply(&GameEvent::MatchFound { session_id: "abc1234".into(), side: Side::Red });
        assert_eq!(game.status(), GameStatus::Active);
        assert!(game.controls(Side::Red));
        assert!(!game.controls(Side::Blue));

        // Blue is remote: local selection refused, relayed move accepted
        assert!(game.select(mv.piece_id).is_err());
        let game = game.apply(&GameEvent::OpponentMove(mv));
        assert_eq!(game.side_to_move(), Side::Red);

        // Relayed moves for our own side are ignored
        let own = first_move(&game);
        assert_eq!(game.apply(&GameEvent::OpponentMove(own)).side_to_move(), Side::Red);

        let game = game.apply(&GameEvent::TimeSync { blue: 100, red: 200 });
        assert_eq!(game.clocks(), Clocks { blue: 100, red: 200 });

        let game = game.apply(&GameEvent::OpponentDisconnected);
        assert_eq!(game.status(), GameStatus::Finished);
        assert_eq!(game.winner(), Some(Side::Red));
    }

    #[test]
    fn test_vs_ai_turns() {
        let game = GameState::new_vs_ai(Side::Red);
        assert!(!game.ai_to_move());
        let mv = first_move(&game);
        let game = game.try_move(&mv).unwrap();
        assert!(game.ai_to_move());
        let reply = first_move(&game);
        let game = game.apply(&GameEvent::OpponentMove(reply));
        assert_eq!(game.history().len(), 2);
    }

    #[test]
    fn test_chat_is_kept() {
        let message = ChatMessage {
            id: "m1".into(),
            side: Side::Blue,
            text: "gl hf".into(),
            timestamp: 1_700_000_000_000,
        };
        let game = GameState::new_local().apply(&GameEvent::ChatReceived(message.clone()));
        assert_eq!(game.chat(), &[message]);
    }
}
