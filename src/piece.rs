use crate::piece::Color::{Black, White};
use crate::piece::PieceType::{Bishop, King, Knight, Pawn, Queen, Rook};
use std::fmt::{Display, Formatter};

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub struct Piece {
    pub piece_type: PieceType,
    pub color: Color,
}
#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum PieceType {
    Pawn,
    Knight,
    Bishop,
    Rook,
    Queen,
    King,
}
impl PieceType {
    /// Moves along diagonals
    pub fn is_bishop_like(&self) -> bool {
        matches!(self, Bishop | Queen)
    }
    /// Moves along ranks and files
    pub fn is_rook_like(&self) -> bool {
        matches!(self, Queen | Rook)
    }
}
impl Display for PieceType {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Pawn => "p",
                Knight => "n",
                Bishop => "b",
                Rook => "r",
                Queen => "q",
                King => "k",
            }
        )
    }
}

#[derive(Debug, Copy, Clone, PartialOrd, PartialEq, Eq, Hash)]
pub enum Color {
    Black,
    White,
}
impl Color {
    pub fn opposite(&self) -> Color {
        match self {
            White => Black,
            Black => White,
        }
    }

    /// +1 for white, -1 for black: the sign a score takes from this side's point of view
    pub fn sign(&self) -> i32 {
        match self {
            White => 1,
            Black => -1,
        }
    }

    /// Rank direction pawns of this color advance in
    pub fn forward(&self) -> i32 {
        self.sign()
    }

    pub fn name(&self) -> &'static str {
        match self {
            White => "white",
            Black => "black",
        }
    }

    pub fn parse(s: &str) -> Option<Color> {
        match s {
            "w" | "white" => Some(White),
            "b" | "black" => Some(Black),
            _ => None,
        }
    }
}
impl Display for Color {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", if self == &Black { "b" } else { "w" })
    }
}

impl Piece {
    pub fn new(piece_type: PieceType, color: Color) -> Piece {
        Piece { piece_type, color }
    }

    pub fn from_char(c: char) -> Option<Piece> {
        let piece_type = match c.to_ascii_lowercase() {
            'p' => Pawn,
            'n' => Knight,
            'b' => Bishop,
            'r' => Rook,
            'q' => Queen,
            'k' => King,
            _ => return None,
        };
        let color = if c.is_ascii_lowercase() { Black } else { White };
        Some(Piece { piece_type, color })
    }

    /// Unicode figurine, only meant for display purposes
    pub fn glyph(&self) -> char {
        match (self.color, self.piece_type) {
            (White, Pawn) => '♙',
            (White, Knight) => '♘',
            (White, Bishop) => '♗',
            (White, Rook) => '♖',
            (White, Queen) => '♕',
            (White, King) => '♔',
            (Black, Pawn) => '♟',
            (Black, Knight) => '♞',
            (Black, Bishop) => '♝',
            (Black, Rook) => '♜',
            (Black, Queen) => '♛',
            (Black, King) => '♚',
        }
    }
}

impl Display for Piece {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let s = self.piece_type.to_string();
        write!(
            f,
            "{}",
            if self.color == White {
                s.to_uppercase()
            } else {
                s
            }
        )
    }
}
