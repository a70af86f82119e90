//! Matchmaking queue.
//!
//! A FIFO queue of players waiting for a human opponent. An entry is the
//! only place "waiting" exists: paired sessions start directly in Playing.
//! There is currently no bound on queue residency; entries leave only by
//! pairing or disconnect.

use crate::state::session::PlayerId;
use crate::transport::ConnectionId;
use std::collections::VecDeque;

/// A player waiting to be paired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueEntry {
    /// Durable player identity.
    pub player: PlayerId,

    /// The connection to notify when a match is found.
    pub conn: ConnectionId,

    /// When the player joined the queue.
    pub enqueued_at: chrono::DateTime<chrono::Utc>,
}

/// FIFO matchmaking queue.
#[derive(Debug, Default)]
pub struct MatchQueue {
    entries: VecDeque<QueueEntry>,
}

impl MatchQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueue a player. Returns false if they are already waiting; the
    /// existing entry keeps its place.
    pub fn enqueue(&mut self, player: PlayerId, conn: ConnectionId) -> bool {
        if self.contains(&player) {
            return false;
        }
        self.entries.push_back(QueueEntry {
            player,
            conn,
            enqueued_at: chrono::Utc::now(),
        });
        true
    }

    /// Dequeue the longest-waiting entry that is not `player` themselves,
    /// so a repeated request never pairs a player with their own entry.
    pub fn pair_for(&mut self, player: &PlayerId) -> Option<QueueEntry> {
        let index = self.entries.iter().position(|e| e.player != *player)?;
        self.entries.remove(index)
    }

    /// Remove a player's entry. Safe to call when absent.
    pub fn remove(&mut self, player: &PlayerId) -> Option<QueueEntry> {
        let index = self.entries.iter().position(|e| e.player == *player)?;
        self.entries.remove(index)
    }

    pub fn contains(&self, player: &PlayerId) -> bool {
        self.entries.iter().any(|e| e.player == *player)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
