//! Persistence seam.
//!
//! Sessions are written through a [`PersistenceGateway`] after every
//! accepted move and on every lifecycle transition. A gateway failure is an
//! operational event: the manager logs it and play continues from memory,
//! so implementations never surface errors to players.

use crate::state::session::{SessionId, SessionSnapshot};
use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;

/// A save or load failed inside the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Persistence gateway failure: {message}")]
pub struct PersistenceError {
    pub message: String,
}

impl PersistenceError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Durable storage for session snapshots.
#[async_trait]
pub trait PersistenceGateway: Send + Sync {
    /// Write the snapshot, replacing any prior document for the id.
    async fn save(&self, id: &SessionId, snapshot: &SessionSnapshot)
        -> Result<(), PersistenceError>;

    /// Read the snapshot for the id; `Ok(None)` when it was never saved.
    async fn load(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, PersistenceError>;
}

/// In-memory gateway, for tests and single-process deployments.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    documents: RwLock<HashMap<SessionId, SessionSnapshot>>,
}

impl MemoryGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored snapshots.
    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[async_trait]
impl PersistenceGateway for MemoryGateway {
    async fn save(
        &self,
        id: &SessionId,
        snapshot: &SessionSnapshot,
    ) -> Result<(), PersistenceError> {
        self.documents
            .write()
            .await
            .insert(id.clone(), snapshot.clone());
        Ok(())
    }

    async fn load(&self, id: &SessionId) -> Result<Option<SessionSnapshot>, PersistenceError> {
        Ok(self.documents.read().await.get(id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::session::Session;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_save_load_replace() {
        let gateway = MemoryGateway::new();
        let id = "game-1".to_string();
        assert_eq!(gateway.load(&id).await.unwrap(), None);

        let mut session =
            Session::new_versus(id.clone(), "alice".to_string(), "bob".to_string());
        gateway.save(&id, &session.snapshot()).await.unwrap();
        assert_eq!(gateway.load(&id).await.unwrap(), Some(session.snapshot()));

        session
            .apply_move(crate::state::session::Move {
                sub_board: 4,
                cell: 4,
                mark: crate::state::board::Mark::X,
            })
            .unwrap();
        gateway.save(&id, &session.snapshot()).await.unwrap();

        let loaded = gateway.load(&id).await.unwrap().unwrap();
        assert_eq!(loaded, session.snapshot());
        assert_eq!(gateway.len().await, 1);
    }
}
