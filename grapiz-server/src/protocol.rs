//! Relay wire protocol
//!
//! Every frame is a JSON text message of the form
//! `{"type": "<kebab-case-name>", "payload": {...}}`; events without data
//! omit `payload`.

use grapiz_core::{ChatMessage, GameEvent, Move, Side};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Server-assigned connection identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionId(pub u64);

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "conn-{}", self.0)
    }
}

/// Client to server
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ClientEvent {
    FindGame,
    Move {
        session_id: String,
        #[serde(rename = "move")]
        mv: Move,
    },
    Chat {
        session_id: String,
        text: String,
    },
    TimeUpdate {
        session_id: String,
        side: Side,
        remaining_seconds: u32,
    },
    Forfeit {
        session_id: String,
    },
}

impl ClientEvent {
    pub fn session_id(&self) -> Option<&str> {
        match self {
            ClientEvent::FindGame => None,
            ClientEvent::Move { session_id, .. }
            | ClientEvent::Chat { session_id, .. }
            | ClientEvent::TimeUpdate { session_id, .. }
            | ClientEvent::Forfeit { session_id } => Some(session_id),
        }
    }
}

/// Server to client
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "kebab-case")]
pub enum ServerEvent {
    Waiting,
    MatchFound {
        session_id: String,
        side: Side,
    },
    TimeSync {
        blue_remaining: u32,
        red_remaining: u32,
    },
    OpponentMove(Move),
    ChatMessage(ChatMessage),
    OpponentForfeit,
    OpponentDisconnected,
    /// Informational only
    ConnectedCount(usize),
}

impl ServerEvent {
    /// The client state-machine event this frame maps to, if any
    pub fn into_game_event(self) -> Option<GameEvent> {
        match self {
            ServerEvent::MatchFound { session_id, side } => Some(GameEvent::MatchFound { session_id, side }),
            ServerEvent::TimeSync { blue_remaining, red_remaining } => Some(GameEvent::TimeSync {
                blue: blue_remaining,
                red: red_remaining,
            }),
            ServerEvent::OpponentMove(mv) => Some(GameEvent::OpponentMove(mv)),
            ServerEvent::ChatMessage(message) => Some(GameEvent::ChatReceived(message)),
            ServerEvent::OpponentForfeit => Some(GameEvent::OpponentForfeit),
            ServerEvent::OpponentDisconnected => Some(GameEvent::OpponentDisconnected),
            ServerEvent::Waiting | ServerEvent::ConnectedCount(_) => None,
        }
    }
}
