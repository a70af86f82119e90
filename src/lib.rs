//! Supertac Engine
//!
//! Realtime session engine for Super Tic-Tac-Toe: rules, an AI opponent,
//! matchmaking, and session orchestration.
//!
//! # Overview
//!
//! The crate splits into a pure core and a service layer:
//!
//! - **Rules** (`state::board`, `state::session`) - The full Super
//!   Tic-Tac-Toe rule set: forced sub-boards, sub-board and super-board
//!   scoring, and a single legality definition shared by every caller.
//!
//! - **AI** (`state::ai`) - Four difficulty tiers built on the engine's own
//!   `legal_moves`; the hard and expert tiers are pure functions of the
//!   position.
//!
//! - **Matchmaking** (`state::matchmaking`) - A FIFO queue pairing players
//!   into two-human sessions.
//!
//! - **Orchestration** (`store`, `manager`) - Live-session registry with
//!   per-session locking, the AI reply loop, reconnect, and disconnect
//!   handling, over pluggable persistence (`gateway`) and delivery
//!   (`transport`) seams.
//!
//! # Design Principles
//!
//! 1. **One legality definition** - `Session::validate_move` backs both the
//!    engine and the AI; nothing re-derives the rules.
//!
//! 2. **Per-session serialization** - Each live session has its own lock,
//!    held across apply, persist, and broadcast. Sessions never contend
//!    with each other.
//!
//! 3. **Persistence never blocks play** - Gateway failures are logged and
//!    play continues from memory.
//!
//! 4. **Durable identity** - Players are keyed by `PlayerId`; connections
//!    come and go and reconnect re-attaches them.
//!
//! # Example
//!
//! ```rust
//! use supertac_engine::state::{Difficulty, Mark, Move, MoveOutcome, Session};
//!
//! let mut session = Session::new_vs_ai(
//!     "game-1".to_string(),
//!     "alice".to_string(),
//!     Difficulty::Hard,
//! );
//!
//! // The first move may go anywhere; it forces the reply into the
//! // sub-board matching its cell index.
//! let outcome = session
//!     .apply_move(Move { sub_board: 4, cell: 7, mark: Mark::X })
//!     .unwrap();
//! assert_eq!(outcome, MoveOutcome::Continue);
//! assert_eq!(session.forced_board(), Some(7));
//!
//! let reply = supertac_engine::state::select_move(&session, Difficulty::Hard).unwrap();
//! assert_eq!(reply.sub_board, 7);
//! ```

pub mod gateway;
pub mod manager;
pub mod state;
pub mod store;
pub mod transport;

pub use gateway::{MemoryGateway, PersistenceError, PersistenceGateway};
pub use manager::{DisconnectPolicy, MatchOutcome, SessionError, SessionManager};
pub use state::*;
pub use store::SessionStore;
pub use transport::{ClientMessage, ConnectionId, ServerEvent, Transport};
