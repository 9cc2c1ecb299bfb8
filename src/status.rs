//! Check detection and game status
//!
//! Attacks are answered by the movement pattern test itself: a piece attacks a square
//! when its pattern lets it move there. Pawns are the one exception, they only move
//! diagonally onto occupied squares but attack those squares regardless.

use std::fmt::{Display, Formatter};

use crate::board::Board;
use crate::move_generator::{follows_pattern, has_legal_move};
use crate::piece::{Color, PieceType};
use crate::square::{self, Square};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameStatus {
    Check,
    Checkmate { winner: Color },
    Stalemate,
}

impl GameStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GameStatus::Check)
    }
}

impl Display for GameStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            GameStatus::Check => write!(f, "check"),
            GameStatus::Checkmate { winner } => write!(f, "checkmate:{}", winner.name()),
            GameStatus::Stalemate => write!(f, "stalemate"),
        }
    }
}

/// Whether any piece of `by` attacks the given square
pub fn is_square_attacked(board: &Board, target: Square, by: Color) -> bool {
    board.pieces().any(|(origin, piece)| {
        if piece.color != by {
            return false;
        }
        if piece.piece_type == PieceType::Pawn {
            let forward = by.forward();
            [-1, 1]
                .iter()
                .any(|&side| square::offset(origin, forward, side) == Some(target))
        } else {
            follows_pattern(board, origin, target)
        }
    })
}

pub fn is_in_check(board: &Board, color: Color) -> bool {
    is_square_attacked(board, board.king_square(color), color.opposite())
}

/// Status of the side to move, `None` while the game simply goes on
pub fn game_status(board: &mut Board) -> Option<GameStatus> {
    let side = board.side_to_move();
    let in_check = is_in_check(board, side);
    match (has_legal_move(board), in_check) {
        (true, true) => Some(GameStatus::Check),
        (true, false) => None,
        (false, true) => Some(GameStatus::Checkmate { winner: side.opposite() }),
        (false, false) => Some(GameStatus::Stalemate),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::square::parse_square;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    #[test]
    fn initial_position_is_quiet() {
        let mut board = Board::new();
        assert!(!is_in_check(&board, Color::White));
        assert!(!is_in_check(&board, Color::Black));
        assert_eq!(game_status(&mut board), None);
    }

    #[test]
    fn pawns_attack_empty_squares_diagonally() {
        let board = Board::from_fen("4k3/8/8/8/8/8/4p3/4K3 w - -").unwrap();
        assert!(is_square_attacked(&board, sq("d1"), Color::Black));
        assert!(is_square_attacked(&board, sq("f1"), Color::Black));
        assert!(!is_square_attacked(&board, sq("e1"), Color::Black));
        assert!(!is_in_check(&board, Color::White));
    }

    #[test]
    fn sliders_are_blocked() {
        let board = Board::from_fen("4k3/8/8/8/8/4r3/4P3/4K3 w - -").unwrap();
        assert!(!is_in_check(&board, Color::White));
        let board = Board::from_fen("4k3/8/8/8/8/4r3/8/4K3 w - -").unwrap();
        assert!(is_in_check(&board, Color::White));
    }

    #[test]
    fn back_rank_mate() {
        let mut board = Board::from_fen("R5k1/5ppp/8/8/8/8/8/6K1 b - -").unwrap();
        assert_eq!(
            game_status(&mut board),
            Some(GameStatus::Checkmate { winner: Color::White })
        );
        assert_eq!(game_status(&mut board).unwrap().to_string(), "checkmate:white");
    }

    #[test]
    fn check_with_an_escape() {
        let mut board = Board::from_fen("R5k1/5pp1/8/8/8/8/8/6K1 b - -").unwrap();
        assert_eq!(game_status(&mut board), Some(GameStatus::Check));
        assert!(!GameStatus::Check.is_terminal());
    }

    #[test]
    fn stalemate() {
        let mut board = Board::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - -").unwrap();
        assert_eq!(game_status(&mut board), Some(GameStatus::Stalemate));
        assert_eq!(GameStatus::Stalemate.to_string(), "stalemate");
    }
}
