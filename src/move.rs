use crate::castling::CastlingRights;
use crate::piece::{Piece, PieceType};
use crate::square::{self, square_representation, Square};
use std::fmt::{Display, Formatter};

/// Everything `Board::apply_move` changed, and everything `Board::undo_move` needs
/// to put it back. The record holds the literal prior contents of the squares it
/// touched, so undoing never has to guess where a piece came from.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Move {
    pub origin: Square,
    pub target: Square,
    pub moved: Piece,
    pub captured: Option<Piece>,
    pub promotion: Option<PieceType>,
    pub kind: MoveKind,
    pub castling_rights: CastlingRights,
    pub ep_target: Option<Square>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum MoveKind {
    Normal,
    DoublePush,
    EnPassant,
    KingSideCastle,
    QueenSideCastle,
}

impl Move {
    pub fn is_capture(&self) -> bool {
        self.captured.is_some()
    }

    /// Square the captured piece stood on, which differs from the target only for en passant
    pub fn capture_square(&self) -> Square {
        match self.kind {
            MoveKind::EnPassant => 8 * square::rank_of(self.origin) + square::file_of(self.target),
            _ => self.target,
        }
    }

    /// The entry appended to the move log: long algebraic, with a trailing `x` on captures
    pub fn notation(&self) -> String {
        if self.is_capture() {
            format!("{}x", self)
        } else {
            self.to_string()
        }
    }

    /// Parses a move formatted in long algebraic notation (`e2e4`).
    /// Only origin and target are extracted, promotions always go to a queen.
    pub fn parse(mv: &str) -> Option<(Square, Square)> {
        if mv.len() != 4 || !mv.is_ascii() {
            return None;
        }
        let origin = square::parse_square(&mv[0..2])?;
        let target = square::parse_square(&mv[2..4])?;
        Some((origin, target))
    }
}

impl Display for Move {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let o = square_representation(self.origin).unwrap_or_else(|| String::from("**"));
        let t = square_representation(self.target).unwrap_or_else(|| String::from("**"));
        if let Some(p) = self.promotion {
            write!(f, "{}{}{}", o, t, p)
        } else {
            write!(f, "{}{}", o, t)
        }
    }
}
