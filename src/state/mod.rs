//! Pure game and session state.
//!
//! This module is the rules core: no I/O, no networking, no clocks beyond
//! timestamps. The service layer (`store`, `manager`) drives it.
//!
//! - `board` - marks, outcomes, and the shared line-pattern evaluation
//! - `session` - one match instance; `validate_move` is the single legality
//!   definition and `apply_move` the only mutation path
//! - `matchmaking` - the FIFO queue of players waiting for an opponent
//! - `ai` - move selection per difficulty tier, built on `legal_moves`

pub mod ai;
pub mod board;
pub mod matchmaking;
pub mod session;

// Re-export commonly used types
pub use ai::{select_move, select_move_with, Difficulty, NoLegalMoves};
pub use board::{
    evaluate_sub_board, evaluate_super_board, sub_board_won_by, BoardWinners, Mark, Outcome,
    SubBoard, BOARD_CELLS, LINE_PATTERNS,
};
pub use matchmaking::{MatchQueue, QueueEntry};
pub use session::{
    LastMove, MalformedSnapshot, Move, MoveError, MoveOutcome, PlayerId, Players, Seat, Session,
    SessionId, SessionSnapshot, Status, AI_SENTINEL,
};
