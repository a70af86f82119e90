//! Session orchestration.
//!
//! `SessionManager` ties the pieces together: matchmaking, move submission
//! with the AI reply loop, reconnect, and disconnect handling. Concurrency
//! is per session: each live session sits behind its own mutex, held across
//! apply, persist, and broadcast, so a session's timeline is serial while
//! unrelated sessions never contend.
//!
//! Persistence is write-behind from the engine's point of view: a gateway
//! failure is logged and play continues from memory.

use crate::gateway::PersistenceGateway;
use crate::state::ai::{select_move, Difficulty};
use crate::state::board::{Mark, Outcome};
use crate::state::session::{
    Move, MoveError, MoveOutcome, PlayerId, Session, SessionId, SessionSnapshot, AI_SENTINEL,
};
use crate::store::SessionStore;
use crate::transport::{ClientMessage, ConnectionId, ServerEvent, Transport};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{error, info, warn};

/// What happens to a human-vs-AI session when its human disconnects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisconnectPolicy {
    /// Keep the session live for reconnect.
    #[default]
    Suspend,
    /// Conclude the session in the AI's favor immediately.
    Forfeit,
}

/// Why a request against a session was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("Session not found: {0}")]
    NotFound(SessionId),
    #[error(transparent)]
    Rejected(#[from] MoveError),
}

impl SessionError {
    /// Stable kind tag for the wire `error` event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::Rejected(err) => err.kind(),
        }
    }
}

/// Result of a matchmaking request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MatchOutcome {
    /// No opponent available; the player is queued.
    Waiting,
    /// Paired with the longest-waiting opponent.
    Paired { session_id: SessionId },
}

/// A session id resolved to either a live handle or a finished snapshot.
/// Finished sessions are never re-admitted to the store.
enum Resolved {
    Live(Arc<Mutex<Session>>),
    Finished(SessionSnapshot),
}

/// Orchestrates sessions over a persistence gateway and a transport.
pub struct SessionManager<P, T> {
    store: SessionStore,
    gateway: Arc<P>,
    transport: Arc<T>,
    ai_disconnect_policy: DisconnectPolicy,
}

impl<P: PersistenceGateway, T: Transport> SessionManager<P, T> {
    pub fn new(gateway: Arc<P>, transport: Arc<T>) -> Self {
        Self {
            store: SessionStore::new(),
            gateway,
            transport,
            ai_disconnect_policy: DisconnectPolicy::default(),
        }
    }

    pub fn with_ai_disconnect_policy(mut self, policy: DisconnectPolicy) -> Self {
        self.ai_disconnect_policy = policy;
        self
    }

    /// Route one client message, reporting failures as `error` events on
    /// the requesting connection.
    pub async fn dispatch(&self, player: &PlayerId, conn: &ConnectionId, message: ClientMessage) {
        let result = match message {
            ClientMessage::FindGame => {
                self.request_match(player.clone(), conn.clone()).await;
                Ok(())
            }
            ClientMessage::StartAiGame { difficulty } => {
                self.start_ai_game(player.clone(), conn.clone(), difficulty)
                    .await;
                Ok(())
            }
            ClientMessage::Move {
                session_id,
                sub_board_index,
                cell_index,
            } => self
                .submit_move(player, &session_id, sub_board_index, cell_index)
                .await
                .map(|_| ()),
            ClientMessage::Reconnect { session_id } => {
                self.reconnect(player, conn, &session_id).await
            }
        };

        if let Err(err) = result {
            warn!(player = %player, kind = err.kind(), "request rejected: {err}");
            self.transport
                .emit(
                    conn,
                    ServerEvent::Error {
                        kind: err.kind(),
                        message: err.to_string(),
                    },
                )
                .await;
        }
    }

    /// Pair the player with the longest-waiting opponent, or queue them.
    /// The waiter takes X and moves first; the requester takes O.
    pub async fn request_match(&self, player: PlayerId, conn: ConnectionId) -> MatchOutcome {
        let Some(waiter) = self.store.pair_for(&player).await else {
            self.store.enqueue(player.clone(), conn.clone()).await;
            self.transport.emit(&conn, ServerEvent::Waiting).await;
            info!(player = %player, "queued for matchmaking");
            return MatchOutcome::Waiting;
        };

        let id = uuid::Uuid::new_v4().to_string();
        let handle = self
            .store
            .admit(Session::new_versus(
                id.clone(),
                waiter.player.clone(),
                player.clone(),
            ))
            .await;
        let session = handle.lock().await;
        self.persist(&session).await;

        self.transport.join(&waiter.conn, &id).await;
        self.transport.join(&conn, &id).await;
        self.transport
            .emit(
                &waiter.conn,
                ServerEvent::GameStart {
                    session_id: id.clone(),
                    symbol: Mark::X,
                    opponent: player.clone(),
                },
            )
            .await;
        self.transport
            .emit(
                &conn,
                ServerEvent::GameStart {
                    session_id: id.clone(),
                    symbol: Mark::O,
                    opponent: waiter.player.clone(),
                },
            )
            .await;
        self.transport
            .broadcast(
                &id,
                ServerEvent::GameState {
                    snapshot: session.snapshot(),
                },
            )
            .await;

        info!(session_id = %id, x = %waiter.player, o = %player, "paired into session");
        MatchOutcome::Paired { session_id: id }
    }

    /// Start a session against the built-in opponent. The human takes X and
    /// moves first; any pending matchmaking entry is withdrawn.
    pub async fn start_ai_game(
        &self,
        player: PlayerId,
        conn: ConnectionId,
        difficulty: Difficulty,
    ) -> SessionId {
        self.store.remove_waiting(&player).await;

        let id = uuid::Uuid::new_v4().to_string();
        let handle = self
            .store
            .admit(Session::new_vs_ai(id.clone(), player.clone(), difficulty))
            .await;
        let session = handle.lock().await;
        self.persist(&session).await;

        self.transport.join(&conn, &id).await;
        self.transport
            .emit(
                &conn,
                ServerEvent::GameStart {
                    session_id: id.clone(),
                    symbol: Mark::X,
                    opponent: AI_SENTINEL.to_string(),
                },
            )
            .await;
        self.transport
            .emit(
                &conn,
                ServerEvent::GameState {
                    snapshot: session.snapshot(),
                },
            )
            .await;

        info!(session_id = %id, player = %player, %difficulty, "started AI session");
        id
    }

    /// Apply a player's move, then let the AI seat reply until it is a
    /// human's turn or the session is over. Returns the outcome of the
    /// player's own move.
    pub async fn submit_move(
        &self,
        player: &PlayerId,
        session_id: &SessionId,
        sub_board_index: usize,
        cell_index: usize,
    ) -> Result<MoveOutcome, SessionError> {
        let handle = match self.resolve(session_id).await? {
            Resolved::Live(handle) => handle,
            Resolved::Finished(_) => {
                return Err(SessionError::Rejected(MoveError::GameAlreadyOver))
            }
        };

        let mut session = handle.lock().await;
        let mark = session
            .mark_of(player)
            .ok_or(SessionError::Rejected(MoveError::NotCurrentTurn))?;
        let outcome = self
            .advance(
                &mut session,
                Move {
                    sub_board: sub_board_index,
                    cell: cell_index,
                    mark,
                },
            )
            .await?;
        info!(
            session_id = %session.id, player = %player,
            sub_board = sub_board_index, cell = cell_index,
            "move accepted"
        );

        while !session.is_over() && session.current_seat().is_ai() {
            let difficulty = session.ai_difficulty().unwrap_or_default();
            let reply = match select_move(&session, difficulty) {
                Ok(reply) => reply,
                Err(err) => {
                    error!(session_id = %session.id, "AI found no legal move: {err}");
                    self.fail_session(&mut session).await;
                    break;
                }
            };
            if let Err(err) = self.advance(&mut session, reply).await {
                error!(session_id = %session.id, "AI selected an illegal move: {err}");
                self.fail_session(&mut session).await;
                break;
            }
        }

        let finished = session.is_over();
        drop(session);
        if finished {
            self.store.remove(session_id).await;
        }
        Ok(outcome)
    }

    /// Re-attach a connection to its session and resend the current state.
    /// Safe to repeat: the same request yields the same events.
    pub async fn reconnect(
        &self,
        player: &PlayerId,
        conn: &ConnectionId,
        session_id: &SessionId,
    ) -> Result<(), SessionError> {
        match self.resolve(session_id).await? {
            Resolved::Live(handle) => {
                let session = handle.lock().await;
                if session.mark_of(player).is_none() {
                    return Err(SessionError::NotFound(session_id.clone()));
                }
                self.transport.join(conn, session_id).await;
                self.transport
                    .emit(
                        conn,
                        ServerEvent::GameState {
                            snapshot: session.snapshot(),
                        },
                    )
                    .await;
                if let Some(winner) = session.winner() {
                    self.transport
                        .emit(conn, ServerEvent::GameOver { winner })
                        .await;
                }
                info!(session_id = %session_id, player = %player, "reconnected");
                Ok(())
            }
            Resolved::Finished(snapshot) => {
                let seated = snapshot.players.x.player_id() == Some(player)
                    || snapshot.players.o.player_id() == Some(player);
                if !seated {
                    return Err(SessionError::NotFound(session_id.clone()));
                }
                self.transport.join(conn, session_id).await;
                let winner = snapshot.winner;
                self.transport
                    .emit(conn, ServerEvent::GameState { snapshot })
                    .await;
                if let Some(winner) = winner {
                    self.transport
                        .emit(conn, ServerEvent::GameOver { winner })
                        .await;
                }
                Ok(())
            }
        }
    }

    /// React to a dropped connection: withdraw any matchmaking entry, then
    /// handle the player's live session. A two-human session is forfeited
    /// to the remaining player; an AI session follows the configured policy.
    pub async fn handle_disconnect(&self, player: &PlayerId) {
        if self.store.remove_waiting(player).await {
            info!(player = %player, "withdrawn from matchmaking on disconnect");
        }

        let Some(handle) = self.store.session_for_player(player).await else {
            return;
        };
        let mut session = handle.lock().await;
        if session.is_over() {
            return;
        }

        if session.is_vs_ai() && self.ai_disconnect_policy == DisconnectPolicy::Suspend {
            info!(session_id = %session.id, player = %player, "suspended for reconnect");
            return;
        }

        let Some(mark) = session.mark_of(player) else {
            return;
        };
        session.conclude(mark.opponent().into());
        self.persist(&session).await;
        self.transport
            .broadcast(&session.id, ServerEvent::PlayerLeft)
            .await;

        let id = session.id.clone();
        drop(session);
        self.store.remove(&id).await;
        info!(session_id = %id, player = %player, "forfeited on disconnect");
    }

    /// Number of live sessions in memory.
    pub async fn live_sessions(&self) -> usize {
        self.store.live_count().await
    }

    /// Resolve a session id to a live handle, reloading a playable snapshot
    /// from the gateway when the session is not in memory. Finished
    /// snapshots stay read-only.
    async fn resolve(&self, session_id: &SessionId) -> Result<Resolved, SessionError> {
        if let Some(handle) = self.store.get(session_id).await {
            return Ok(Resolved::Live(handle));
        }

        let snapshot = match self.gateway.load(session_id).await {
            Ok(Some(snapshot)) => snapshot,
            Ok(None) => return Err(SessionError::NotFound(session_id.clone())),
            Err(err) => {
                error!(session_id = %session_id, "failed to load session: {err}");
                return Err(SessionError::NotFound(session_id.clone()));
            }
        };

        if snapshot.status.is_over() || snapshot.winner.is_some() {
            return Ok(Resolved::Finished(snapshot));
        }
        match Session::from_snapshot(snapshot) {
            Ok(session) => {
                info!(session_id = %session_id, "restored session from gateway");
                Ok(Resolved::Live(self.store.admit(session).await))
            }
            Err(err) => {
                error!(session_id = %session_id, "persisted snapshot is malformed: {err}");
                Err(SessionError::NotFound(session_id.clone()))
            }
        }
    }

    /// Apply one move, persist, and broadcast the resulting state. Emits
    /// `gameOver` when the move concluded the match.
    async fn advance(&self, session: &mut Session, mv: Move) -> Result<MoveOutcome, MoveError> {
        let outcome = session.apply_move(mv)?;
        self.persist(session).await;
        self.transport
            .broadcast(
                &session.id,
                ServerEvent::GameState {
                    snapshot: session.snapshot(),
                },
            )
            .await;

        if outcome.is_terminal() {
            if let Some(winner) = session.winner() {
                self.transport
                    .broadcast(&session.id, ServerEvent::GameOver { winner })
                    .await;
                info!(session_id = %session.id, %winner, "session concluded");
            }
        }
        Ok(outcome)
    }

    /// Conclude a session the engine can no longer advance. Recorded as a
    /// draw; the fault is the engine's, not either player's.
    async fn fail_session(&self, session: &mut Session) {
        session.conclude(Outcome::Draw);
        self.persist(session).await;
        self.transport
            .broadcast(
                &session.id,
                ServerEvent::GameState {
                    snapshot: session.snapshot(),
                },
            )
            .await;
        self.transport
            .broadcast(
                &session.id,
                ServerEvent::GameOver {
                    winner: Outcome::Draw,
                },
            )
            .await;
    }

    /// Write the snapshot through the gateway. Failures are logged and
    /// swallowed; they never interrupt play.
    async fn persist(&self, session: &Session) {
        if let Err(err) = self.gateway.save(&session.id, &session.snapshot()).await {
            error!(session_id = %session.id, "failed to persist session: {err}");
        }
    }
}
