//! Session state and the rules engine.
//!
//! A `Session` is one match instance, human-vs-human or human-vs-AI. All
//! mutation flows through [`Session::apply_move`], and
//! [`Session::legal_moves`] is the single source of truth for legality -
//! the AI selector builds on it rather than reimplementing the rules.

use crate::state::ai::Difficulty;
use crate::state::board::{
    evaluate_sub_board, evaluate_super_board, BoardWinners, Mark, Outcome, SubBoard, BOARD_CELLS,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a session.
pub type SessionId = String;

/// Durable identifier for a human player, decoupled from any live connection.
pub type PlayerId = String;

/// Sentinel occupying the seat of the built-in opponent.
pub const AI_SENTINEL: &str = "AI";

/// Occupant of a seat: a durable human identity or the built-in AI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Seat {
    Human(PlayerId),
    Ai,
}

impl Seat {
    pub fn is_ai(&self) -> bool {
        matches!(self, Self::Ai)
    }

    /// The player id, for human seats.
    pub fn player_id(&self) -> Option<&PlayerId> {
        match self {
            Self::Human(id) => Some(id),
            Self::Ai => None,
        }
    }
}

impl From<String> for Seat {
    fn from(value: String) -> Self {
        if value == AI_SENTINEL {
            Self::Ai
        } else {
            Self::Human(value)
        }
    }
}

impl From<Seat> for String {
    fn from(seat: Seat) -> Self {
        match seat {
            Seat::Human(id) => id,
            Seat::Ai => AI_SENTINEL.to_string(),
        }
    }
}

/// A placed or proposed move. Immutable once accepted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Move {
    #[serde(rename = "subBoardIndex")]
    pub sub_board: usize,
    #[serde(rename = "cellIndex")]
    pub cell: usize,
    #[serde(rename = "symbol")]
    pub mark: Mark,
}

/// Session lifecycle status.
///
/// Matchmaking "waiting" is a queue entry, not a session state: a paired
/// session starts directly in `Playing`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Status {
    Playing,
    GameOver,
}

impl Status {
    pub fn is_over(&self) -> bool {
        matches!(self, Self::GameOver)
    }
}

/// Why a move was rejected. State is unchanged on every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveError {
    OutOfRange,
    CellOccupied,
    SubBoardConcluded,
    WrongForcedBoard,
    NotCurrentTurn,
    GameAlreadyOver,
}

impl MoveError {
    /// Stable kind tag for the wire `error` event.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::OutOfRange => "OutOfRange",
            Self::CellOccupied => "CellOccupied",
            Self::SubBoardConcluded => "SubBoardConcluded",
            Self::WrongForcedBoard => "WrongForcedBoard",
            Self::NotCurrentTurn => "NotCurrentTurn",
            Self::GameAlreadyOver => "GameAlreadyOver",
        }
    }
}

impl fmt::Display for MoveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OutOfRange => write!(f, "Board or cell index out of range"),
            Self::CellOccupied => write!(f, "Cell is already occupied"),
            Self::SubBoardConcluded => write!(f, "Sub-board has already concluded"),
            Self::WrongForcedBoard => write!(f, "Must play in the forced sub-board"),
            Self::NotCurrentTurn => write!(f, "It's not your turn"),
            Self::GameAlreadyOver => write!(f, "Game is already over"),
        }
    }
}

impl std::error::Error for MoveError {}

/// What an accepted move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Play continues; the turn passed to the opponent.
    Continue,
    /// The acting sub-board concluded, but the match continues.
    SubBoardConcluded,
    /// The move won the match.
    GameWon(Mark),
    /// The move filled the last sub-board without a super-board line.
    GameDraw,
}

impl MoveOutcome {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameWon(_) | Self::GameDraw)
    }
}

/// A persisted snapshot failed to reconstruct a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MalformedSnapshot {
    pub reason: &'static str,
}

impl fmt::Display for MalformedSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Malformed session snapshot: {}", self.reason)
    }
}

impl std::error::Error for MalformedSnapshot {}

/// The two seats of a session, keyed by mark.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Players {
    #[serde(rename = "X")]
    pub x: Seat,
    #[serde(rename = "O")]
    pub o: Seat,
}

/// The last accepted move, as mirrored to clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastMove {
    pub sub_board_index: usize,
    pub cell_index: usize,
}

/// Wire and persistence form of a session. Field names follow the client
/// protocol; the save/load contract and the `gameState` payload carry the
/// same document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub id: SessionId,
    pub board: Vec<Vec<Option<Mark>>>,
    pub board_winners: Vec<Option<Outcome>>,
    pub current_player: Mark,
    pub last_move: Option<LastMove>,
    pub players: Players,
    pub status: Status,
    pub winner: Option<Outcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_difficulty: Option<Difficulty>,
    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

/// One match instance.
#[derive(Debug, Clone)]
pub struct Session {
    /// Unique session ID.
    pub id: SessionId,

    /// 9 sub-boards of 9 cells each.
    board: [SubBoard; BOARD_CELLS],

    /// Recorded sub-board outcomes; set at most once, never cleared.
    board_winners: BoardWinners,

    /// Whose turn it is.
    current_player: Mark,

    /// Last accepted move as (sub-board, cell), `None` only at game start.
    last_move: Option<(usize, usize)>,

    /// Seat X (the matchmaking waiter, or the human in an AI game).
    player_x: Seat,

    /// Seat O (the matchmaking requester, or the AI).
    player_o: Seat,

    status: Status,

    winner: Option<Outcome>,

    /// Present only when one seat is AI-controlled.
    ai_difficulty: Option<Difficulty>,

    pub created_at: chrono::DateTime<chrono::Utc>,
    pub updated_at: chrono::DateTime<chrono::Utc>,
}

impl Session {
    /// Create a two-human session. The first player is X and moves first.
    pub fn new_versus(id: SessionId, player_x: PlayerId, player_o: PlayerId) -> Self {
        Self::with_seats(id, Seat::Human(player_x), Seat::Human(player_o), None)
    }

    /// Create a human-vs-AI session. The human is X and moves first.
    pub fn new_vs_ai(id: SessionId, player: PlayerId, difficulty: Difficulty) -> Self {
        Self::with_seats(id, Seat::Human(player), Seat::Ai, Some(difficulty))
    }

    fn with_seats(
        id: SessionId,
        player_x: Seat,
        player_o: Seat,
        ai_difficulty: Option<Difficulty>,
    ) -> Self {
        let now = chrono::Utc::now();
        Self {
            id,
            board: [[None; BOARD_CELLS]; BOARD_CELLS],
            board_winners: [None; BOARD_CELLS],
            current_player: Mark::X,
            last_move: None,
            player_x,
            player_o,
            status: Status::Playing,
            winner: None,
            ai_difficulty,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_over(&self) -> bool {
        self.status.is_over() || self.winner.is_some()
    }

    /// Final outcome; meaningful only once the session is over.
    pub fn winner(&self) -> Option<Outcome> {
        self.winner
    }

    pub fn current_player(&self) -> Mark {
        self.current_player
    }

    pub fn last_move(&self) -> Option<(usize, usize)> {
        self.last_move
    }

    pub fn seat(&self, mark: Mark) -> &Seat {
        match mark {
            Mark::X => &self.player_x,
            Mark::O => &self.player_o,
        }
    }

    /// The seat whose turn it is.
    pub fn current_seat(&self) -> &Seat {
        self.seat(self.current_player)
    }

    /// The mark held by a human player, if they are seated here.
    pub fn mark_of(&self, player: &PlayerId) -> Option<Mark> {
        if self.player_x.player_id() == Some(player) {
            Some(Mark::X)
        } else if self.player_o.player_id() == Some(player) {
            Some(Mark::O)
        } else {
            None
        }
    }

    pub fn is_vs_ai(&self) -> bool {
        self.player_x.is_ai() || self.player_o.is_ai()
    }

    pub fn ai_difficulty(&self) -> Option<Difficulty> {
        self.ai_difficulty
    }

    pub fn sub_board(&self, index: usize) -> &SubBoard {
        &self.board[index]
    }

    pub fn cell(&self, sub_board: usize, cell: usize) -> Option<Mark> {
        self.board[sub_board][cell]
    }

    pub fn board_winners(&self) -> &BoardWinners {
        &self.board_winners
    }

    /// The sub-board the next move is confined to, if the forced-board rule
    /// is in effect: the cell index of the last move, unless that sub-board
    /// has concluded.
    pub fn forced_board(&self) -> Option<usize> {
        self.last_move
            .map(|(_, cell)| cell)
            .filter(|&target| self.board_winners[target].is_none())
    }

    /// Validate a move without applying it. Checks run in a fixed order so
    /// callers see stable error kinds.
    pub fn validate_move(&self, mv: Move) -> Result<(), MoveError> {
        if self.is_over() {
            return Err(MoveError::GameAlreadyOver);
        }
        if mv.sub_board >= BOARD_CELLS || mv.cell >= BOARD_CELLS {
            return Err(MoveError::OutOfRange);
        }
        if mv.mark != self.current_player {
            return Err(MoveError::NotCurrentTurn);
        }
        if self.board_winners[mv.sub_board].is_some() {
            return Err(MoveError::SubBoardConcluded);
        }
        if self.board[mv.sub_board][mv.cell].is_some() {
            return Err(MoveError::CellOccupied);
        }
        if let Some(forced) = self.forced_board() {
            if mv.sub_board != forced {
                return Err(MoveError::WrongForcedBoard);
            }
        }
        Ok(())
    }

    /// Every move the current player may make. Built on `validate_move`, so
    /// legality has exactly one definition.
    pub fn legal_moves(&self) -> Vec<Move> {
        let mut moves = Vec::new();
        for sub_board in 0..BOARD_CELLS {
            for cell in 0..BOARD_CELLS {
                let mv = Move {
                    sub_board,
                    cell,
                    mark: self.current_player,
                };
                if self.validate_move(mv).is_ok() {
                    moves.push(mv);
                }
            }
        }
        moves
    }

    /// Validate and apply a move. On failure the session is unchanged.
    ///
    /// On success: the cell is written, the acting sub-board is evaluated
    /// (win for the mover, or draw when full), then the super-board is
    /// evaluated over recorded outcomes. The turn toggles only when the
    /// match continues.
    pub fn apply_move(&mut self, mv: Move) -> Result<MoveOutcome, MoveError> {
        self.validate_move(mv)?;

        self.board[mv.sub_board][mv.cell] = Some(mv.mark);
        self.last_move = Some((mv.sub_board, mv.cell));
        self.updated_at = chrono::Utc::now();

        let concluded = match evaluate_sub_board(&self.board[mv.sub_board]) {
            Some(outcome) => {
                self.board_winners[mv.sub_board] = Some(outcome);
                true
            }
            None => false,
        };

        if let Some(outcome) = evaluate_super_board(&self.board_winners) {
            self.status = Status::GameOver;
            self.winner = Some(outcome);
            return Ok(match outcome.mark() {
                Some(mark) => MoveOutcome::GameWon(mark),
                None => MoveOutcome::GameDraw,
            });
        }

        self.current_player = self.current_player.opponent();
        Ok(if concluded {
            MoveOutcome::SubBoardConcluded
        } else {
            MoveOutcome::Continue
        })
    }

    /// Force the session over with the given outcome, outside the normal
    /// apply path (forfeits, unrecoverable AI failures). No-op when the
    /// session already concluded.
    pub fn conclude(&mut self, outcome: Outcome) {
        if self.is_over() {
            return;
        }
        self.status = Status::GameOver;
        self.winner = Some(outcome);
        self.updated_at = chrono::Utc::now();
    }

    /// Snapshot for persistence and the `gameState` broadcast.
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            id: self.id.clone(),
            board: self.board.iter().map(|sub| sub.to_vec()).collect(),
            board_winners: self.board_winners.to_vec(),
            current_player: self.current_player,
            last_move: self.last_move.map(|(sub_board_index, cell_index)| LastMove {
                sub_board_index,
                cell_index,
            }),
            players: Players {
                x: self.player_x.clone(),
                o: self.player_o.clone(),
            },
            status: self.status,
            winner: self.winner,
            ai_difficulty: self.ai_difficulty,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    /// Reconstruct a session from a persisted snapshot, including the AI
    /// seat and difficulty.
    pub fn from_snapshot(snapshot: SessionSnapshot) -> Result<Self, MalformedSnapshot> {
        if snapshot.board.len() != BOARD_CELLS
            || snapshot.board.iter().any(|sub| sub.len() != BOARD_CELLS)
        {
            return Err(MalformedSnapshot {
                reason: "board must be 9 sub-boards of 9 cells",
            });
        }
        if snapshot.board_winners.len() != BOARD_CELLS {
            return Err(MalformedSnapshot {
                reason: "boardWinners must have 9 entries",
            });
        }
        if let Some(last) = snapshot.last_move {
            if last.sub_board_index >= BOARD_CELLS || last.cell_index >= BOARD_CELLS {
                return Err(MalformedSnapshot {
                    reason: "lastMove indices out of range",
                });
            }
        }

        let mut board = [[None; BOARD_CELLS]; BOARD_CELLS];
        for (sub, cells) in board.iter_mut().zip(snapshot.board.iter()) {
            for (slot, cell) in sub.iter_mut().zip(cells.iter()) {
                *slot = *cell;
            }
        }

        let mut board_winners = [None; BOARD_CELLS];
        for (slot, winner) in board_winners.iter_mut().zip(snapshot.board_winners.iter()) {
            *slot = *winner;
        }

        Ok(Self {
            id: snapshot.id,
            board,
            board_winners,
            current_player: snapshot.current_player,
            last_move: snapshot
                .last_move
                .map(|last| (last.sub_board_index, last.cell_index)),
            player_x: snapshot.players.x,
            player_o: snapshot.players.o,
            status: snapshot.status,
            winner: snapshot.winner,
            ai_difficulty: snapshot.ai_difficulty,
            created_at: snapshot.created_at,
            updated_at: snapshot.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn make_session() -> Session {
        Session::new_versus("game-1".to_string(), "alice".to_string(), "bob".to_string())
    }

    fn mv(sub_board: usize, cell: usize, mark: Mark) -> Move {
        Move {
            sub_board,
            cell,
            mark,
        }
    }

    #[test]
    fn test_new_session() {
        let session = make_session();
        assert_eq!(session.status(), Status::Playing);
        assert_eq!(session.current_player(), Mark::X);
        assert_eq!(session.last_move(), None);
        assert_eq!(session.winner(), None);
        assert_eq!(session.mark_of(&"alice".to_string()), Some(Mark::X));
        assert_eq!(session.mark_of(&"bob".to_string()), Some(Mark::O));
        assert!(!session.is_vs_ai());
    }

    #[test]
    fn test_first_move_may_go_anywhere() {
        let session = make_session();
        assert_eq!(session.forced_board(), None);
        assert_eq!(session.legal_moves().len(), 81);
    }

    #[test]
    fn test_forced_board_follows_cell_index() {
        // Scenario A: X plays (4, 4); every legal reply is in sub-board 4.
        let mut session = make_session();
        let outcome = session.apply_move(mv(4, 4, Mark::X)).unwrap();
        assert_eq!(outcome, MoveOutcome::Continue);
        assert_eq!(session.last_move(), Some((4, 4)));
        assert_eq!(session.forced_board(), Some(4));

        let moves = session.legal_moves();
        assert_eq!(moves.len(), 8);
        assert!(moves.iter().all(|m| m.sub_board == 4));

        let err = session.apply_move(mv(0, 0, Mark::O)).unwrap_err();
        assert_eq!(err, MoveError::WrongForcedBoard);
    }

    #[test]
    fn test_concluded_sub_board_rejects_moves() {
        // O completes the middle row of sub-board 0 while X keeps playing
        // cell 0, bouncing the forced board back to 0 each turn.
        let mut session = make_session();
        session.apply_move(mv(0, 0, Mark::X)).unwrap();
        session.apply_move(mv(0, 3, Mark::O)).unwrap();
        session.apply_move(mv(3, 0, Mark::X)).unwrap();
        session.apply_move(mv(0, 4, Mark::O)).unwrap();
        session.apply_move(mv(4, 0, Mark::X)).unwrap();
        session.apply_move(mv(0, 5, Mark::O)).unwrap();
        assert_eq!(session.board_winners()[0], Some(Outcome::O));

        // X was sent to sub-board 5; playing cell 0 points back at the
        // concluded board, which opens play up.
        session.apply_move(mv(5, 0, Mark::X)).unwrap();
        assert_eq!(session.forced_board(), None);

        // Scenario B: the concluded sub-board itself rejects moves.
        let err = session.apply_move(mv(0, 1, Mark::O)).unwrap_err();
        assert_eq!(err, MoveError::SubBoardConcluded);
        let moves = session.legal_moves();
        assert!(moves.iter().all(|m| m.sub_board != 0));
        // 8 open sub-boards, minus the three cells X already took.
        assert_eq!(moves.len(), 69);
    }

    #[test]
    fn test_validation_errors() {
        let mut session = make_session();
        assert_eq!(
            session.apply_move(mv(9, 0, Mark::X)).unwrap_err(),
            MoveError::OutOfRange
        );
        assert_eq!(
            session.apply_move(mv(0, 9, Mark::X)).unwrap_err(),
            MoveError::OutOfRange
        );
        assert_eq!(
            session.apply_move(mv(0, 0, Mark::O)).unwrap_err(),
            MoveError::NotCurrentTurn
        );

        session.apply_move(mv(0, 0, Mark::X)).unwrap();
        assert_eq!(
            session.apply_move(mv(0, 0, Mark::O)).unwrap_err(),
            MoveError::CellOccupied
        );
    }

    #[test]
    fn test_rejected_move_leaves_state_unchanged() {
        let mut session = make_session();
        session.apply_move(mv(4, 4, Mark::X)).unwrap();
        let before = session.snapshot();

        assert!(session.apply_move(mv(0, 0, Mark::O)).is_err());
        assert_eq!(session.snapshot(), before);
    }

    #[test]
    fn test_super_board_win_checks_rows_first() {
        // Scenario C: X holds the top row, O is about to complete the
        // bottom row; the row scan finds X's line first.
        let mut snapshot = make_session().snapshot();
        snapshot.board_winners = vec![
            Some(Outcome::X),
            Some(Outcome::X),
            Some(Outcome::X),
            Some(Outcome::Draw),
            Some(Outcome::Draw),
            Some(Outcome::Draw),
            Some(Outcome::O),
            Some(Outcome::O),
            None,
        ];
        snapshot.board[8][0] = Some(Mark::O);
        snapshot.board[8][1] = Some(Mark::O);
        snapshot.current_player = Mark::O;
        let mut session = Session::from_snapshot(snapshot).unwrap();

        let outcome = session.apply_move(mv(8, 2, Mark::O)).unwrap();
        assert_eq!(session.board_winners()[8], Some(Outcome::O));
        assert_eq!(outcome, MoveOutcome::GameWon(Mark::X));
        assert_eq!(session.winner(), Some(Outcome::X));
        assert_eq!(session.status(), Status::GameOver);
    }

    #[test]
    fn test_full_super_board_without_line_is_draw() {
        // Scenario D: the last sub-board concludes with no super-board line.
        let mut snapshot = make_session().snapshot();
        snapshot.board_winners = vec![
            Some(Outcome::X),
            Some(Outcome::O),
            Some(Outcome::X),
            Some(Outcome::X),
            Some(Outcome::O),
            Some(Outcome::O),
            Some(Outcome::O),
            Some(Outcome::X),
            None,
        ];
        snapshot.board[8][0] = Some(Mark::X);
        snapshot.board[8][4] = Some(Mark::X);
        let mut session = Session::from_snapshot(snapshot).unwrap();

        let outcome = session.apply_move(mv(8, 8, Mark::X)).unwrap();
        assert_eq!(session.board_winners()[8], Some(Outcome::X));
        assert_eq!(outcome, MoveOutcome::GameDraw);
        assert_eq!(session.winner(), Some(Outcome::Draw));
        assert!(session.is_over());
    }

    #[test]
    fn test_no_moves_after_game_over() {
        let mut session = make_session();
        session.conclude(Outcome::O);
        assert_eq!(
            session.apply_move(mv(0, 0, Mark::X)).unwrap_err(),
            MoveError::GameAlreadyOver
        );
        assert!(session.legal_moves().is_empty());
    }

    #[test]
    fn test_conclude_is_idempotent() {
        let mut session = make_session();
        session.conclude(Outcome::X);
        session.conclude(Outcome::O);
        assert_eq!(session.winner(), Some(Outcome::X));
    }

    #[test]
    fn test_sub_board_conclusion_outcome_tag() {
        let mut session = make_session();
        session.apply_move(mv(0, 0, Mark::X)).unwrap();
        session.apply_move(mv(0, 3, Mark::O)).unwrap();
        session.apply_move(mv(3, 0, Mark::X)).unwrap();
        session.apply_move(mv(0, 4, Mark::O)).unwrap();
        session.apply_move(mv(4, 0, Mark::X)).unwrap();
        // O completes the middle row of sub-board 0; the match continues.
        let outcome = session.apply_move(mv(0, 5, Mark::O)).unwrap();
        assert_eq!(outcome, MoveOutcome::SubBoardConcluded);
        assert_eq!(session.board_winners()[0], Some(Outcome::O));
        assert!(!session.is_over());
        assert_eq!(session.current_player(), Mark::X);
    }

    #[test]
    fn test_snapshot_round_trip() {
        let mut session = Session::new_vs_ai(
            "game-ai".to_string(),
            "alice".to_string(),
            Difficulty::Hard,
        );
        session.apply_move(mv(4, 4, Mark::X)).unwrap();

        let snapshot = session.snapshot();
        let restored = Session::from_snapshot(snapshot.clone()).unwrap();
        assert_eq!(restored.snapshot(), snapshot);
        assert_eq!(restored.ai_difficulty(), Some(Difficulty::Hard));
        assert!(restored.is_vs_ai());
        assert_eq!(restored.forced_board(), Some(4));
    }

    #[test]
    fn test_snapshot_wire_shape() {
        let session = Session::new_vs_ai(
            "game-ai".to_string(),
            "alice".to_string(),
            Difficulty::Easy,
        );
        let value = serde_json::to_value(session.snapshot()).unwrap();
        assert_eq!(value["players"]["X"], "alice");
        assert_eq!(value["players"]["O"], "AI");
        assert_eq!(value["currentPlayer"], "X");
        assert_eq!(value["status"], "playing");
        assert_eq!(value["aiDifficulty"], "easy");
        assert_eq!(value["lastMove"], serde_json::Value::Null);
        assert_eq!(value["boardWinners"].as_array().unwrap().len(), 9);
    }

    #[test]
    fn test_malformed_snapshot_rejected() {
        let mut snapshot = make_session().snapshot();
        snapshot.board_winners.pop();
        assert!(Session::from_snapshot(snapshot).is_err());

        let mut snapshot = make_session().snapshot();
        snapshot.board[3].pop();
        assert!(Session::from_snapshot(snapshot).is_err());
    }
}
