//! Wire protocol and the transport seam.
//!
//! `ClientMessage` and `ServerEvent` define the event vocabulary spoken with
//! clients. The [`Transport`] trait is the only surface the manager touches;
//! the real server binds it to a socket layer, tests use
//! [`RecordingTransport`].

use crate::state::ai::Difficulty;
use crate::state::board::Outcome;
use crate::state::session::{SessionId, SessionSnapshot};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Identifier of one live client connection. Connections are ephemeral;
/// player identity is the durable `PlayerId`.
pub type ConnectionId = String;

/// Messages clients send, tagged by `type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ClientMessage {
    /// Join the matchmaking queue.
    #[serde(rename = "findGame")]
    FindGame,

    /// Start a session against the built-in opponent.
    #[serde(rename = "startAIGame")]
    StartAiGame {
        #[serde(default)]
        difficulty: Difficulty,
    },

    /// Place a mark.
    #[serde(rename = "move")]
    Move {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
        #[serde(rename = "subBoardIndex")]
        sub_board_index: usize,
        #[serde(rename = "cellIndex")]
        cell_index: usize,
    },

    /// Rejoin an existing session after a dropped connection.
    #[serde(rename = "reconnect")]
    Reconnect {
        #[serde(rename = "sessionId")]
        session_id: SessionId,
    },
}

/// Events the engine emits to clients.
#[derive(Debug, Clone, PartialEq)]
pub enum ServerEvent {
    /// Queued; an opponent will arrive or the client can start an AI game.
    Waiting,

    /// A session began. Sent individually so each player learns their mark.
    GameStart {
        session_id: SessionId,
        symbol: crate::state::board::Mark,
        opponent: String,
    },

    /// Full session snapshot, sent after every accepted move and on
    /// reconnect. Clients render from this alone.
    GameState { snapshot: SessionSnapshot },

    /// The session concluded.
    GameOver { winner: Outcome },

    /// A request was rejected. `kind` is a stable machine tag.
    Error { kind: &'static str, message: String },

    /// The opponent left a two-human session.
    PlayerLeft,
}

impl ServerEvent {
    /// Wire name of the event.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Waiting => "waiting",
            Self::GameStart { .. } => "gameStart",
            Self::GameState { .. } => "gameState",
            Self::GameOver { .. } => "gameOver",
            Self::Error { .. } => "error",
            Self::PlayerLeft => "playerLeft",
        }
    }

    /// JSON payload of the event. Nameless events carry `null`.
    pub fn payload(&self) -> Value {
        match self {
            Self::Waiting | Self::PlayerLeft => Value::Null,
            Self::GameStart {
                session_id,
                symbol,
                opponent,
            } => json!({
                "sessionId": session_id,
                "symbol": symbol,
                "opponent": opponent,
            }),
            Self::GameState { snapshot } => {
                serde_json::to_value(snapshot).unwrap_or(Value::Null)
            }
            Self::GameOver { winner } => json!({ "winner": winner }),
            Self::Error { kind, message } => json!({
                "kind": kind,
                "message": message,
            }),
        }
    }
}

/// Outbound delivery seam.
///
/// Rooms are keyed by session id; both seats of a session join its room and
/// `broadcast` reaches whoever is currently connected. Delivery is
/// best-effort: a send to a gone connection is not an error.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send an event to one connection.
    async fn emit(&self, conn: &ConnectionId, event: ServerEvent);

    /// Send an event to every connection in a session's room.
    async fn broadcast(&self, session_id: &SessionId, event: ServerEvent);

    /// Add a connection to a session's room. Idempotent.
    async fn join(&self, conn: &ConnectionId, session_id: &SessionId);
}

#[derive(Debug, Default)]
struct RecordingInner {
    rooms: HashMap<SessionId, Vec<ConnectionId>>,
    log: Vec<(String, ServerEvent)>,
}

/// In-memory transport that records every delivery, for tests and local
/// tooling. The log keys direct sends by connection id and broadcasts by
/// each room member's connection id, in delivery order.
#[derive(Debug, Default)]
pub struct RecordingTransport {
    inner: Mutex<RecordingInner>,
}

impl RecordingTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Events delivered to a connection, in order.
    pub async fn events_for(&self, conn: &ConnectionId) -> Vec<ServerEvent> {
        self.inner
            .lock()
            .await
            .log
            .iter()
            .filter(|(target, _)| target == conn)
            .map(|(_, event)| event.clone())
            .collect()
    }

    /// Current members of a session's room.
    pub async fn room_members(&self, session_id: &SessionId) -> Vec<ConnectionId> {
        self.inner
            .lock()
            .await
            .rooms
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for RecordingTransport {
    async fn emit(&self, conn: &ConnectionId, event: ServerEvent) {
        let mut inner = self.inner.lock().await;
        inner.log.push((conn.clone(), event));
    }

    async fn broadcast(&self, session_id: &SessionId, event: ServerEvent) {
        let mut inner = self.inner.lock().await;
        let members = inner.rooms.get(session_id).cloned().unwrap_or_default();
        for conn in members {
            inner.log.push((conn, event.clone()));
        }
    }

    async fn join(&self, conn: &ConnectionId, session_id: &SessionId) {
        let mut inner = self.inner.lock().await;
        let members = inner.rooms.entry(session_id.clone()).or_default();
        if !members.contains(conn) {
            members.push(conn.clone());
        }
    }
}
