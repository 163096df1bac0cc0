//! Matchmaking and session relay
//!
//! `Relay` owns the waiting pool and the session table. Each method handles
//! one connection event to completion and returns the events to deliver, so
//! the caller can run it inside a single task without locks.
//!
//! The relay knows nothing about the rules. It checks that a sender belongs to
//! the session it names and forwards the payload; turn order and move
//! legality are left to the two clients.

use crate::protocol::{ClientEvent, ConnectionId, ServerEvent};
use grapiz_core::{ChatMessage, Clocks, Move, Side, INITIAL_CLOCK_SECS};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::VecDeque;

/// Length of generated session ids
const SESSION_ID_LEN: usize = 7;
/// Length of generated chat message ids
const MESSAGE_ID_LEN: usize = 12;
const BASE36: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RelayError {
    #[error("unknown connection {0}")]
    UnknownConnection(ConnectionId),

    #[error("connection {0} is already registered")]
    DuplicateConnection(ConnectionId),

    #[error("connection {0} is already waiting for a match")]
    AlreadyWaiting(ConnectionId),

    #[error("connection {0} is already in a session")]
    AlreadyPaired(ConnectionId),

    #[error("connection {connection} is not part of session {session_id}")]
    NotInSession { connection: ConnectionId, session_id: String },
}

/// Where a connection is in its lifecycle
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionState {
    Connected,
    Waiting,
    Paired(String),
}

/// Two paired connections and what they have exchanged
#[derive(Clone, Debug)]
pub struct Session {
    pub id: String,
    pub blue: ConnectionId,
    pub red: ConnectionId,
    /// Moves in relay order, kept for audit only
    pub moves: Vec<Move>,
    /// Last clock values reported by the clients
    pub clocks: Clocks,
}

impl Session {
    pub fn side_of(&self, connection: ConnectionId) -> Option<Side> {
        if connection == self.blue {
            Some(Side::Blue)
        } else if connection == self.red {
            Some(Side::Red)
        } else {
            None
        }
    }

    pub fn peer_of(&self, connection: ConnectionId) -> Option<ConnectionId> {
        match self.side_of(connection)? {
            Side::Blue => Some(self.red),
            Side::Red => Some(self.blue),
        }
    }

    fn time_sync(&self) -> ServerEvent {
        ServerEvent::TimeSync {
            blue_remaining: self.clocks.blue,
            red_remaining: self.clocks.red,
        }
    }
}

/// An event addressed to one connection
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Outbound {
    pub to: ConnectionId,
    pub event: ServerEvent,
}

impl Outbound {
    fn new(to: ConnectionId, event: ServerEvent) -> Self {
        Self { to, event }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct RelayStats {
    pub connections: usize,
    pub waiting: usize,
    pub sessions: usize,
}

#[derive(Clone, Debug)]
pub struct RelayConfig {
    /// Clock handed to both players at pairing
    pub initial_clock_secs: u32,
    /// Fixed seed for id generation (None = from entropy)
    pub seed: Option<u64>,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            initial_clock_secs: INITIAL_CLOCK_SECS,
            seed: None,
        }
    }
}

// ============================================================================
// RELAY
// ============================================================================

pub struct Relay {
    connections: FxHashMap<ConnectionId, ConnectionState>,
    waiting: VecDeque<ConnectionId>,
    sessions: FxHashMap<String, Session>,
    initial_clock_secs: u32,
    rng: ChaCha8Rng,
}

impl Relay {
    pub fn new(config: RelayConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };
        Self {
            connections: FxHashMap::default(),
            waiting: VecDeque::new(),
            sessions: FxHashMap::default(),
            initial_clock_secs: config.initial_clock_secs,
            rng,
        }
    }

    pub fn stats(&self) -> RelayStats {
        RelayStats {
            connections: self.connections.len(),
            waiting: self.waiting.len(),
            sessions: self.sessions.len(),
        }
    }

    pub fn state_of(&self, connection: ConnectionId) -> Option<&ConnectionState> {
        self.connections.get(&connection)
    }

    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.get(session_id)
    }

    /// Register a new connection and broadcast the head count
    pub fn connect(&mut self, connection: ConnectionId) -> Result<Vec<Outbound>, RelayError> {
        if self.connections.contains_key(&connection) {
            return Err(RelayError::DuplicateConnection(connection));
        }
        self.connections.insert(connection, ConnectionState::Connected);
        Ok(self.broadcast_count())
    }

    /// Handle one client event
    pub fn handle(&mut self, from: ConnectionId, event: ClientEvent) -> Result<Vec<Outbound>, RelayError> {
        let state = self
            .connections
            .get(&from)
            .ok_or(RelayError::UnknownConnection(from))?;

        if let ClientEvent::FindGame = event {
            return match state {
                ConnectionState::Connected => Ok(self.find_game(from)),
                ConnectionState::Waiting => Err(RelayError::AlreadyWaiting(from)),
                ConnectionState::Paired(_) => Err(RelayError::AlreadyPaired(from)),
            };
        }

        let session_id = event.session_id().unwrap_or_default().to_string();
        let session = match state {
            ConnectionState::Paired(id) if *id == session_id => self.sessions.get_mut(&session_id),
            _ => None,
        }
        .ok_or_else(|| RelayError::NotInSession { connection: from, session_id: session_id.clone() })?;

        let (side, peer) = match (session.side_of(from), session.peer_of(from)) {
            (Some(side), Some(peer)) => (side, peer),
            _ => return Err(RelayError::NotInSession { connection: from, session_id }),
        };

        let out = match event {
            ClientEvent::FindGame => Vec::new(),
            ClientEvent::Move { mv, .. } => {
                session.moves.push(mv);
                vec![Outbound::new(peer, ServerEvent::OpponentMove(mv))]
            }
            ClientEvent::TimeUpdate { side: clock_side, remaining_seconds, .. } => {
                match clock_side {
                    Side::Blue => session.clocks.blue = remaining_seconds,
                    Side::Red => session.clocks.red = remaining_seconds,
                }
                vec![Outbound::new(peer, session.time_sync())]
            }
            ClientEvent::Chat { text, .. } => {
                let message = ChatMessage {
                    id: random_id(&mut self.rng, MESSAGE_ID_LEN),
                    side,
                    text,
                    timestamp: chrono::Utc::now().timestamp_millis(),
                };
                vec![
                    Outbound::new(peer, ServerEvent::ChatMessage(message.clone())),
                    Outbound::new(from, ServerEvent::ChatMessage(message)),
                ]
            }
            ClientEvent::Forfeit { .. } => {
                self.close_session(&session_id);
                vec![Outbound::new(peer, ServerEvent::OpponentForfeit)]
            }
        };

        Ok(out)
    }

    /// Drop a connection, tearing down whatever it was part of
    pub fn disconnect(&mut self, connection: ConnectionId) -> Vec<Outbound> {
        let Some(state) = self.connections.remove(&connection) else {
            return Vec::new();
        };

        let mut out = Vec::new();
        match state {
            ConnectionState::Connected => {}
            ConnectionState::Waiting => self.waiting.retain(|&c| c != connection),
            ConnectionState::Paired(session_id) => {
                let peer = self
                    .sessions
                    .get(&session_id)
                    .and_then(|s| s.peer_of(connection));
                self.close_session(&session_id);
                if let Some(peer) = peer {
                    out.push(Outbound::new(peer, ServerEvent::OpponentDisconnected));
                }
            }
        }

        out.extend(self.broadcast_count());
        out
    }

    fn find_game(&mut self, from: ConnectionId) -> Vec<Outbound> {
        let Some(opponent) = self.waiting.pop_front() else {
            self.waiting.push_back(from);
            self.connections.insert(from, ConnectionState::Waiting);
            return vec![Outbound::new(from, ServerEvent::Waiting)];
        };

        let session_id = self.new_session_id();
        let session = Session {
            id: session_id.clone(),
            blue: opponent,
            red: from,
            moves: Vec::new(),
            clocks: Clocks::new(self.initial_clock_secs),
        };
        let sync = session.time_sync();
        self.sessions.insert(session_id.clone(), session);
        self.connections.insert(opponent, ConnectionState::Paired(session_id.clone()));
        self.connections.insert(from, ConnectionState::Paired(session_id.clone()));

        vec![
            Outbound::new(opponent, ServerEvent::MatchFound { session_id: session_id.clone(), side: Side::Blue }),
            Outbound::new(from, ServerEvent::MatchFound { session_id, side: Side::Red }),
            Outbound::new(opponent, sync.clone()),
            Outbound::new(from, sync),
        ]
    }

    /// Remove a session and free both of its connections
    fn close_session(&mut self, session_id: &str) {
        let Some(session) = self.sessions.remove(session_id) else {
            return;
        };
        for connection in [session.blue, session.red] {
            if let Some(state) = self.connections.get_mut(&connection) {
                *state = ConnectionState::Connected;
            }
        }
    }

    fn broadcast_count(&self) -> Vec<Outbound> {
        let count = self.connections.len();
        let mut ids: Vec<ConnectionId> = self.connections.keys().copied().collect();
        ids.sort();
        ids.into_iter()
            .map(|id| Outbound::new(id, ServerEvent::ConnectedCount(count)))
            .collect()
    }

    fn new_session_id(&mut self) -> String {
        loop {
            let id = random_id(&mut self.rng, SESSION_ID_LEN);
            if !self.sessions.contains_key(&id) {
                return id;
            }
        }
    }
}

fn random_id(rng: &mut ChaCha8Rng, len: usize) -> String {
    (0..len)
        .map(|_| BASE36[rng.gen_range(0..BASE36.len())] as char)
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================
