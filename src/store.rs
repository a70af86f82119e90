//! In-memory session registry.
//!
//! One `Arc<Mutex<Session>>` per live session; the per-session mutex is what
//! serializes moves, so two sessions never contend on a shared lock. The
//! store also indexes which session each player is seated in and owns the
//! matchmaking queue.

use crate::state::matchmaking::MatchQueue;
use crate::state::session::{PlayerId, Session, SessionId};
use crate::transport::ConnectionId;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Registry of live sessions plus the matchmaking queue.
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: RwLock<HashMap<SessionId, Arc<Mutex<Session>>>>,
    player_index: RwLock<HashMap<PlayerId, SessionId>>,
    queue: Mutex<MatchQueue>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a session, indexing its human seats. When the id is already
    /// live the existing handle wins, so there is never more than one live
    /// instance per id.
    pub async fn admit(&self, session: Session) -> Arc<Mutex<Session>> {
        let id = session.id.clone();
        let seats: Vec<PlayerId> = [crate::state::board::Mark::X, crate::state::board::Mark::O]
            .iter()
            .filter_map(|&mark| session.seat(mark).player_id().cloned())
            .collect();

        let mut sessions = self.sessions.write().await;
        let handle = sessions
            .entry(id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(session)))
            .clone();
        drop(sessions);

        let mut index = self.player_index.write().await;
        for player in seats {
            index.insert(player, id.clone());
        }
        handle
    }

    pub async fn get(&self, id: &SessionId) -> Option<Arc<Mutex<Session>>> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Drop a session handle and its player index entries. Safe to call
    /// when absent.
    pub async fn remove(&self, id: &SessionId) {
        self.sessions.write().await.remove(id);
        self.player_index
            .write()
            .await
            .retain(|_, session_id| session_id != id);
    }

    /// The live session a player is seated in, if any.
    pub async fn session_for_player(&self, player: &PlayerId) -> Option<Arc<Mutex<Session>>> {
        let id = self.player_index.read().await.get(player).cloned()?;
        self.get(&id).await
    }

    pub async fn live_count(&self) -> usize {
        self.sessions.read().await.len()
    }

    /// Enqueue a player for matchmaking. Returns false if already waiting.
    pub async fn enqueue(&self, player: PlayerId, conn: ConnectionId) -> bool {
        self.queue.lock().await.enqueue(player, conn)
    }

    /// Dequeue an opponent for `player`, never their own entry.
    pub async fn pair_for(&self, player: &PlayerId) -> Option<crate::state::matchmaking::QueueEntry> {
        self.queue.lock().await.pair_for(player)
    }

    /// Drop a player's queue entry, if present.
    pub async fn remove_waiting(&self, player: &PlayerId) -> bool {
        self.queue.lock().await.remove(player).is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::ai::Difficulty;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_admit_indexes_players() {
        let store = SessionStore::new();
        let session =
            Session::new_versus("game-1".to_string(), "alice".to_string(), "bob".to_string());
        store.admit(session).await;

        assert!(store.get(&"game-1".to_string()).await.is_some());
        assert!(store
            .session_for_player(&"alice".to_string())
            .await
            .is_some());
        assert!(store.session_for_player(&"bob".to_string()).await.is_some());
        assert!(store
            .session_for_player(&"carol".to_string())
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_admit_same_id_returns_existing_handle() {
        let store = SessionStore::new();
        let first = store
            .admit(Session::new_vs_ai(
                "game-1".to_string(),
                "alice".to_string(),
                Difficulty::Easy,
            ))
            .await;
        let second = store
            .admit(Session::new_vs_ai(
                "game-1".to_string(),
                "alice".to_string(),
                Difficulty::Hard,
            ))
            .await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(store.live_count().await, 1);
        assert_eq!(first.lock().await.ai_difficulty(), Some(Difficulty::Easy));
    }

    #[tokio::test]
    async fn test_remove_clears_player_index() {
        let store = SessionStore::new();
        store
            .admit(Session::new_versus(
                "game-1".to_string(),
                "alice".to_string(),
                "bob".to_string(),
            ))
            .await;

        store.remove(&"game-1".to_string()).await;
        assert_eq!(store.live_count().await, 0);
        assert!(store
            .session_for_player(&"alice".to_string())
            .await
            .is_none());

        // Idempotent.
        store.remove(&"game-1".to_string()).await;
    }

    #[tokio::test]
    async fn test_queue_passthrough() {
        let store = SessionStore::new();
        assert!(store.enqueue("alice".to_string(), "conn-a".to_string()).await);
        assert!(!store.enqueue("alice".to_string(), "conn-a2".to_string()).await);

        assert!(store.pair_for(&"alice".to_string()).await.is_none());
        let entry = store.pair_for(&"bob".to_string()).await.unwrap();
        assert_eq!(entry.player, "alice");
        assert!(!store.remove_waiting(&"alice".to_string()).await);
    }
}
