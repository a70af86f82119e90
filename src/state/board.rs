//! Board primitives for Super Tic-Tac-Toe.
//!
//! A match is played on 9 sub-boards arranged in a 3x3 super-board. Both
//! levels are scored with the same 8 line patterns; the super-board is
//! evaluated over recorded sub-board outcomes, where a drawn sub-board is a
//! sentinel that blocks the line without ever winning it.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Cells per sub-board, and sub-boards per super-board.
pub const BOARD_CELLS: usize = 9;

/// The 8 standard 3-in-a-row patterns: rows, then columns, then diagonals.
/// The first matching pattern in this order decides.
pub const LINE_PATTERNS: [[usize; 3]; 8] = [
    [0, 1, 2],
    [3, 4, 5],
    [6, 7, 8],
    [0, 3, 6],
    [1, 4, 7],
    [2, 5, 8],
    [0, 4, 8],
    [2, 4, 6],
];

/// A player's mark. An empty cell is `None`; there is no empty-mark variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Mark {
    X,
    O,
}

impl Mark {
    /// The other mark.
    pub fn opponent(&self) -> Mark {
        match self {
            Self::X => Self::O,
            Self::O => Self::X,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a concluded sub-board, or of the whole match.
///
/// Set at most once per sub-board and never cleared; a concluded sub-board
/// accepts no further moves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Outcome {
    X,
    O,
    #[serde(rename = "draw")]
    Draw,
}

impl Outcome {
    /// The winning mark, if this outcome is a win.
    pub fn mark(&self) -> Option<Mark> {
        match self {
            Self::X => Some(Mark::X),
            Self::O => Some(Mark::O),
            Self::Draw => None,
        }
    }

    pub fn is_draw(&self) -> bool {
        matches!(self, Self::Draw)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::X => "X",
            Self::O => "O",
            Self::Draw => "draw",
        }
    }
}

impl From<Mark> for Outcome {
    fn from(mark: Mark) -> Self {
        match mark {
            Mark::X => Self::X,
            Mark::O => Self::O,
        }
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One 3x3 sub-board.
pub type SubBoard = [Option<Mark>; BOARD_CELLS];

/// Recorded outcomes of the 9 sub-boards.
pub type BoardWinners = [Option<Outcome>; BOARD_CELLS];

/// Check whether `mark` holds a completed line on the sub-board.
pub fn sub_board_won_by(board: &SubBoard, mark: Mark) -> bool {
    LINE_PATTERNS
        .iter()
        .any(|pattern| pattern.iter().all(|&pos| board[pos] == Some(mark)))
}

/// Evaluate a sub-board: a win for either mark, a draw when full, else `None`.
pub fn evaluate_sub_board(board: &SubBoard) -> Option<Outcome> {
    for pattern in &LINE_PATTERNS {
        if let Some(mark) = board[pattern[0]] {
            if board[pattern[1]] == Some(mark) && board[pattern[2]] == Some(mark) {
                return Some(mark.into());
            }
        }
    }

    if board.iter().all(|cell| cell.is_some()) {
        Some(Outcome::Draw)
    } else {
        None
    }
}

/// Evaluate the super-board over recorded sub-board outcomes.
///
/// Only player marks form lines; three `Draw` sentinels never win. When no
/// line matches and every sub-board is concluded, the match is a draw.
pub fn evaluate_super_board(winners: &BoardWinners) -> Option<Outcome> {
    for pattern in &LINE_PATTERNS {
        if let Some(mark) = winners[pattern[0]].and_then(|w| w.mark()) {
            if winners[pattern[1]] == Some(mark.into()) && winners[pattern[2]] == Some(mark.into())
            {
                return Some(mark.into());
            }
        }
    }

    if winners.iter().all(|w| w.is_some()) {
        Some(Outcome::Draw)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board_with(cells: &[(usize, Mark)]) -> SubBoard {
        let mut board: SubBoard = [None; BOARD_CELLS];
        for &(pos, mark) in cells {
            board[pos] = Some(mark);
        }
        board
    }

    #[test]
    fn test_sub_board_row_win() {
        let board = board_with(&[(0, Mark::X), (1, Mark::X), (2, Mark::X)]);
        assert!(sub_board_won_by(&board, Mark::X));
        assert!(!sub_board_won_by(&board, Mark::O));
        assert_eq!(evaluate_sub_board(&board), Some(Outcome::X));
    }

    #[test]
    fn test_sub_board_column_and_diagonal_wins() {
        let column = board_with(&[(1, Mark::O), (4, Mark::O), (7, Mark::O)]);
        assert_eq!(evaluate_sub_board(&column), Some(Outcome::O));

        let diagonal = board_with(&[(2, Mark::X), (4, Mark::X), (6, Mark::X)]);
        assert_eq!(evaluate_sub_board(&diagonal), Some(Outcome::X));
    }

    #[test]
    fn test_sub_board_in_progress() {
        let board = board_with(&[(0, Mark::X), (1, Mark::O)]);
        assert_eq!(evaluate_sub_board(&board), None);
    }

    #[test]
    fn test_sub_board_draw_when_full() {
        // X O X / X O O / O X X - full, no line
        let board = board_with(&[
            (0, Mark::X),
            (1, Mark::O),
            (2, Mark::X),
            (3, Mark::X),
            (4, Mark::O),
            (5, Mark::O),
            (6, Mark::O),
            (7, Mark::X),
            (8, Mark::X),
        ]);
        assert_eq!(evaluate_sub_board(&board), Some(Outcome::Draw));
    }

    #[test]
    fn test_super_board_win() {
        let mut winners: BoardWinners = [None; BOARD_CELLS];
        winners[0] = Some(Outcome::O);
        winners[3] = Some(Outcome::O);
        winners[6] = Some(Outcome::O);
        assert_eq!(evaluate_super_board(&winners), Some(Outcome::O));
    }

    #[test]
    fn test_super_board_draw_sentinels_never_win() {
        let mut winners: BoardWinners = [None; BOARD_CELLS];
        winners[0] = Some(Outcome::Draw);
        winners[1] = Some(Outcome::Draw);
        winners[2] = Some(Outcome::Draw);
        assert_eq!(evaluate_super_board(&winners), None);
    }

    #[test]
    fn test_super_board_first_pattern_in_order_decides() {
        // Rows are checked before the bottom row, so X's top row wins even
        // though O also holds a completed line.
        let winners: BoardWinners = [
            Some(Outcome::X),
            Some(Outcome::X),
            Some(Outcome::X),
            Some(Outcome::Draw),
            Some(Outcome::Draw),
            Some(Outcome::Draw),
            Some(Outcome::O),
            Some(Outcome::O),
            Some(Outcome::O),
        ];
        assert_eq!(evaluate_super_board(&winners), Some(Outcome::X));
    }

    #[test]
    fn test_super_board_draw_when_all_concluded() {
        let winners: BoardWinners = [
            Some(Outcome::X),
            Some(Outcome::O),
            Some(Outcome::X),
            Some(Outcome::X),
            Some(Outcome::O),
            Some(Outcome::O),
            Some(Outcome::O),
            Some(Outcome::X),
            Some(Outcome::X),
        ];
        assert_eq!(evaluate_super_board(&winners), Some(Outcome::Draw));
    }

    #[test]
    fn test_super_board_incomplete_is_open() {
        let mut winners: BoardWinners = [None; BOARD_CELLS];
        winners[0] = Some(Outcome::X);
        winners[4] = Some(Outcome::Draw);
        assert_eq!(evaluate_super_board(&winners), None);
    }

    #[test]
    fn test_outcome_serializes_as_wire_strings() {
        assert_eq!(serde_json::to_string(&Outcome::X).unwrap(), "\"X\"");
        assert_eq!(serde_json::to_string(&Outcome::Draw).unwrap(), "\"draw\"");
        assert_eq!(serde_json::to_string(&Mark::O).unwrap(), "\"O\"");
    }
}
