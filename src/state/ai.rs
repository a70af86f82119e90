//! AI move selection.
//!
//! Every tier draws from [`Session::legal_moves`]; the rules live in one
//! place and the selector never re-derives legality. The hard and expert
//! tiers are pure functions of the session snapshot, so replaying the same
//! position always yields the same move.

use crate::state::board::{evaluate_super_board, sub_board_won_by, Mark};
use crate::state::session::{Move, Session, SessionId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Difficulty tier for the AI seat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Easy => "easy",
            Self::Medium => "medium",
            Self::Hard => "hard",
            Self::Expert => "expert",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The tier used when a client starts an AI game without naming one.
impl Default for Difficulty {
    fn default() -> Self {
        Self::Medium
    }
}

/// Probability that the medium tier plays the hard policy.
const MEDIUM_HARD_BIAS: f64 = 0.7;

/// Positional preference for the hard tier: center, corners, edges.
const PREFERRED_CELLS: [usize; 9] = [4, 0, 2, 6, 8, 1, 3, 5, 7];

/// The AI found no legal move in a session that is not flagged over.
///
/// The engine concludes finished games itself, so this can only mean a
/// corrupted session; it is fatal to that session, not to the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoLegalMoves {
    pub session_id: SessionId,
}

impl fmt::Display for NoLegalMoves {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "No legal moves in unfinished session {}",
            self.session_id
        )
    }
}

impl std::error::Error for NoLegalMoves {}

/// Pick a move for the current player.
///
/// Easy and medium draw their randomness from the thread RNG; see
/// [`select_move_with`] to supply one.
pub fn select_move(session: &Session, difficulty: Difficulty) -> Result<Move, NoLegalMoves> {
    select_move_with(session, difficulty, &mut rand::thread_rng())
}

/// Pick a move using the given RNG for the easy and medium tiers. Hard and
/// expert never consult it.
pub fn select_move_with<R: Rng>(
    session: &Session,
    difficulty: Difficulty,
    rng: &mut R,
) -> Result<Move, NoLegalMoves> {
    let moves = session.legal_moves();
    if moves.is_empty() {
        return Err(NoLegalMoves {
            session_id: session.id.clone(),
        });
    }

    Ok(match difficulty {
        Difficulty::Easy => uniform(&moves, rng),
        Difficulty::Medium => {
            if rng.gen_bool(MEDIUM_HARD_BIAS) {
                hard(session, &moves)
            } else {
                uniform(&moves, rng)
            }
        }
        Difficulty::Hard => hard(session, &moves),
        Difficulty::Expert => expert(session, &moves),
    })
}

fn uniform<R: Rng>(moves: &[Move], rng: &mut R) -> Move {
    moves[rng.gen_range(0..moves.len())]
}

/// Hard policy, in strict priority order: win the target sub-board, block
/// the opponent's sub-board win, then positional preference.
fn hard(session: &Session, moves: &[Move]) -> Move {
    let me = session.current_player();

    for mv in moves {
        if wins_sub_board(session, mv, me) {
            return *mv;
        }
    }
    for mv in moves {
        if wins_sub_board(session, mv, me.opponent()) {
            return *mv;
        }
    }
    for cell in PREFERRED_CELLS {
        if let Some(mv) = moves.iter().find(|m| m.cell == cell) {
            return *mv;
        }
    }

    // The preference list covers every cell index, so this is unreachable
    // for well-formed moves; seeded from the position to stay a pure
    // function of the snapshot.
    let mut rng = StdRng::seed_from_u64(position_seed(session));
    uniform(moves, &mut rng)
}

/// Expert policy: take or deny an outright super-board win, else hard.
fn expert(session: &Session, moves: &[Move]) -> Move {
    let me = session.current_player();

    for mv in moves {
        if wins_super_board(session, mv, me) {
            return *mv;
        }
    }
    for mv in moves {
        if wins_super_board(session, mv, me.opponent()) {
            return *mv;
        }
    }

    hard(session, moves)
}

/// Would placing `mark` at the move's cell complete the sub-board?
fn wins_sub_board(session: &Session, mv: &Move, mark: Mark) -> bool {
    let mut sub = *session.sub_board(mv.sub_board);
    sub[mv.cell] = Some(mark);
    sub_board_won_by(&sub, mark)
}

/// Would placing `mark` win the sub-board and, through it, the super-board?
fn wins_super_board(session: &Session, mv: &Move, mark: Mark) -> bool {
    if !wins_sub_board(session, mv, mark) {
        return false;
    }
    let mut winners = *session.board_winners();
    winners[mv.sub_board] = Some(mark.into());
    evaluate_super_board(&winners).and_then(|o| o.mark()) == Some(mark)
}

/// Stable seed derived from the visible position.
fn position_seed(session: &Session) -> u64 {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut hasher = DefaultHasher::new();
    for index in 0..9 {
        session.sub_board(index).hash(&mut hasher);
    }
    session.board_winners().hash(&mut hasher);
    session.last_move().hash(&mut hasher);
    session.current_player().hash(&mut hasher);
    hasher.finish()
}
