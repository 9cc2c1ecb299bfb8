use crate::board::Board;
use crate::move_generator::has_legal_move;
use crate::piece::{Color, Piece, PieceType};
use crate::square::{vertical_symmetry, Square};
use crate::status::is_in_check;

pub type Score = i32;

// Piece-square tables, in centipawns, laid out as seen from white's side of the board:
// the first row is the 8th rank. Only pawns are mirrored for black.
#[rustfmt::skip]
const KNIGHT_TABLE: [Score; 64] = [
     0, 10, 20, 20, 20, 20, 10,  0,
    10, 30, 50, 50, 50, 50, 30, 10,
    20, 50, 60, 65, 65, 60, 50, 20,
    20, 55, 65, 70, 70, 65, 55, 20,
    20, 50, 65, 70, 70, 65, 50, 20,
    20, 55, 60, 65, 65, 60, 55, 20,
    10, 30, 50, 55, 55, 50, 30, 10,
     0, 10, 20, 20, 20, 20, 10,  0,
];
#[rustfmt::skip]
const BISHOP_TABLE: [Score; 64] = [
     0, 20, 20, 20, 20, 20, 20,  0,
    20, 40, 40, 40, 40, 40, 40, 20,
    20, 40, 50, 60, 60, 50, 40, 20,
    20, 50, 50, 60, 60, 50, 50, 20,
    20, 40, 60, 60, 60, 60, 40, 20,
    20, 60, 60, 60, 60, 60, 60, 20,
    20, 50, 40, 40, 40, 40, 50, 20,
     0, 20, 20, 20, 20, 20, 20,  0,
];
#[rustfmt::skip]
const PAWN_TABLE: [Score; 64] = [
    80, 80, 80, 80, 80, 80, 80, 80,
    70, 70, 70, 70, 70, 70, 70, 70,
    30, 30, 40, 50, 50, 40, 30, 30,
    25, 25, 30, 45, 45, 30, 25, 25,
    20, 20, 20, 40, 40, 20, 20, 20,
    25, 15, 10, 20, 20, 10, 15, 25,
    25, 30, 30,  0,  0, 30, 30, 25,
    20, 20, 20, 20, 20, 20, 20, 20,
];
#[rustfmt::skip]
const QUEEN_TABLE: [Score; 64] = [
     0, 20, 20, 30, 30, 20, 20,  0,
    20, 40, 40, 40, 40, 40, 40, 20,
    20, 40, 50, 50, 50, 50, 40, 20,
    30, 40, 50, 50, 50, 50, 40, 30,
    40, 40, 50, 50, 50, 50, 40, 30,
    20, 50, 50, 50, 50, 50, 40, 20,
    20, 40, 50, 40, 40, 40, 40, 20,
     0, 20, 20, 30, 30, 20, 20,  0,
];
#[rustfmt::skip]
const ROOK_TABLE: [Score; 64] = [
    25, 25, 25, 25, 25, 25, 25, 25,
    50, 75, 75, 75, 75, 75, 75, 50,
     0, 25, 25, 25, 25, 25, 25,  0,
     0, 25, 25, 25, 25, 25, 25,  0,
     0, 25, 25, 25, 25, 25, 25,  0,
     0, 25, 25, 25, 25, 25, 25,  0,
     0, 25, 25, 25, 25, 25, 25,  0,
    25, 25, 25, 50, 50, 25, 25, 25,
];

/// Scores are integer centipawns, pawn units scaled by 100: a pawn is worth 100
/// and a mate 100 000, the same as 1 and 1000 in pawn units.
pub struct Evaluation;

impl Evaluation {
    /// Indexed by `PieceType as usize`
    pub const PIECE_TYPE_VALUE: [Score; 6] = [100, 300, 300, 500, 900, 0];
    pub const MATE_SCORE: Score = 100_000;
    pub const DRAW_SCORE: Score = 0;

    /// Scores a position from white's point of view, in centipawns.
    /// Checkmates and stalemates override the material count.
    pub fn evaluate(board: &mut Board) -> Score {
        if !has_legal_move(board) {
            return if is_in_check(board, board.side_to_move()) {
                -board.side_to_move().sign() * Self::MATE_SCORE
            } else {
                Self::DRAW_SCORE
            };
        }
        Self::material(board)
    }

    /// Material and piece-square bonus only, with no regard for the game being over
    pub fn material(board: &Board) -> Score {
        board
            .pieces()
            .map(|(sq, piece)| {
                piece.color.sign() * (Self::PIECE_TYPE_VALUE[piece.piece_type as usize] + Self::positional_bonus(piece, sq))
            })
            .sum()
    }

    pub fn positional_bonus(piece: Piece, sq: Square) -> Score {
        // The tables are written with the 8th rank first
        let index = vertical_symmetry(sq);
        match piece.piece_type {
            PieceType::Knight => KNIGHT_TABLE[index],
            PieceType::Bishop => BISHOP_TABLE[index],
            PieceType::Queen => QUEEN_TABLE[index],
            PieceType::Rook => ROOK_TABLE[index],
            PieceType::Pawn if piece.color == Color::White => PAWN_TABLE[index],
            PieceType::Pawn => PAWN_TABLE[sq],
            PieceType::King => 0,
        }
    }
}
