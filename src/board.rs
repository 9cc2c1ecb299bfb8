use std::fmt::{Display, Formatter};
use crate::castling::CastlingRights;
use crate::error::{ChessError, ChessResult};
use crate::history::MoveLog;
use crate::piece::{Color, Piece, PieceType};
use crate::piece::Color::{Black, White};
use crate::r#move::{Move, MoveKind};
use crate::square::{self, parse_square, Square, square_representation};
use crate::status::is_in_check;

pub const STARTING_FEN: &str = "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq - 0 1";

// Rook corners, used to revoke castling rights
const WHITE_KINGSIDE_ROOK: Square = 7;
const WHITE_QUEENSIDE_ROOK: Square = 0;
const BLACK_KINGSIDE_ROOK: Square = 63;
const BLACK_QUEENSIDE_ROOK: Square = 56;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    pieces: [Option<Piece>; 64],
    side_to_move: Color,
    castling_rights: CastlingRights,
    ep_target: Option<Square>,
    // Indexed by color
    king_squares: [Square; 2],

    move_log: MoveLog,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    /// Creates a board set up in the initial position
    pub fn new() -> Board {
        let mut b = Board::empty();
        for (file, piece_type) in BACK_RANK.iter().enumerate() {
            b.add_piece(Piece::new(*piece_type, White), file);
            b.add_piece(Piece::new(PieceType::Pawn, White), 8 + file);
            b.add_piece(Piece::new(PieceType::Pawn, Black), 48 + file);
            b.add_piece(Piece::new(*piece_type, Black), 56 + file);
        }
        b
    }

    fn empty() -> Board {
        Board {
            pieces: [None; 64],
            side_to_move: White,
            castling_rights: CastlingRights::new(),
            ep_target: None,
            king_squares: [60, 4],
            move_log: MoveLog::default(),
        }
    }

    /// Creates a new board given its FEN representation. Only the first four fields are
    /// used, the move clocks are optional.
    pub fn from_fen(fen: &str) -> ChessResult<Board> {
        let invalid = |reason: &str| ChessError::InvalidFen(format!("{} ({})", fen, reason));
        let mut sections = fen.split_whitespace();
        let piece_placement = sections.next().ok_or_else(|| invalid("empty"))?;
        let side = sections.next().unwrap_or("w");
        let castling = sections.next().unwrap_or("-");
        let ep_target = sections.next().unwrap_or("-");

        let mut b = Board::empty();
        b.side_to_move = Color::parse(side).ok_or_else(|| invalid("bad side to move"))?;
        b.castling_rights = CastlingRights::from_str(castling);
        b.ep_target = match ep_target {
            "-" => None,
            s => Some(parse_square(s).ok_or_else(|| invalid("bad en passant square"))?),
        };

        let ranks: Vec<&str> = piece_placement.split('/').collect();
        if ranks.len() != 8 {
            return Err(invalid("expected 8 ranks"));
        }
        let mut kings = [0usize; 2];
        for (i, rank_str) in ranks.iter().enumerate() {
            let rank = 7 - i;
            let mut file = 0usize;
            for c in rank_str.chars() {
                if let Some(d) = c.to_digit(10) {
                    file += d as usize;
                    continue;
                }
                let piece = Piece::from_char(c).ok_or_else(|| invalid("unknown piece"))?;
                let sq = square::from_coords(rank, file).ok_or_else(|| invalid("rank overflow"))?;
                if piece.piece_type == PieceType::King {
                    kings[piece.color as usize] += 1;
                }
                b.add_piece(piece, sq);
                file += 1;
            }
            if file != 8 {
                return Err(invalid("rank does not cover 8 files"));
            }
        }
        if kings != [1, 1] {
            return Err(invalid("each side needs exactly one king"));
        }
        if is_in_check(&b, b.side_to_move.opposite()) {
            return Err(invalid("the side not on move is in check"));
        }
        if let Some(ep) = b.ep_target {
            if !b.en_passant_is_consistent(ep) {
                return Err(invalid("no double push matches the en passant square"));
            }
        }
        Ok(b)
    }

    /// The en passant square must be empty, on the rank a double push skips, with the
    /// enemy pawn that just made that push right past it
    fn en_passant_is_consistent(&self, ep: Square) -> bool {
        let pusher = self.side_to_move.opposite();
        let skipped_rank = if pusher == White { 2 } else { 5 };
        let pushed_pawn = square::offset(ep, pusher.forward(), 0).and_then(|sq| self.pieces[sq]);
        self.pieces[ep].is_none()
            && square::rank_of(ep) == skipped_rank
            && pushed_pawn == Some(Piece::new(PieceType::Pawn, pusher))
    }

    /// Makes a move on the board, returning the record needed to take it back.
    /// Pawns reaching the last rank become queens.
    ///
    /// # Panics
    /// The move is expected to have been validated beforehand, there must be a piece
    /// on the origin square.
    pub fn apply_move(&mut self, origin: Square, target: Square) -> Move {
        let moved = self.pieces[origin].expect("apply_move called without a piece on the origin square");
        let kind = self.classify(moved, origin, target);

        let mut mv = Move {
            origin,
            target,
            moved,
            captured: None,
            promotion: None,
            kind,
            castling_rights: self.castling_rights,
            ep_target: self.ep_target,
        };
        mv.captured = self.remove_piece(mv.capture_square());

        self.remove_piece(origin);
        let last_rank = if moved.color == White { 7 } else { 0 };
        if moved.piece_type == PieceType::Pawn && square::rank_of(target) == last_rank {
            mv.promotion = Some(PieceType::Queen);
            self.add_piece(Piece::new(PieceType::Queen, moved.color), target);
        } else {
            self.add_piece(moved, target);
        }

        match kind {
            MoveKind::KingSideCastle => self.shift_rook(origin + 3, origin + 1),
            MoveKind::QueenSideCastle => self.shift_rook(origin - 4, origin - 1),
            _ => (),
        }

        if moved.piece_type == PieceType::King {
            self.castling_rights.uncastle(moved.color);
        }
        for sq in [origin, target] {
            match sq {
                WHITE_KINGSIDE_ROOK => self.castling_rights.uncastle_kingside(White),
                WHITE_QUEENSIDE_ROOK => self.castling_rights.uncastle_queenside(White),
                BLACK_KINGSIDE_ROOK => self.castling_rights.uncastle_kingside(Black),
                BLACK_QUEENSIDE_ROOK => self.castling_rights.uncastle_queenside(Black),
                _ => (),
            }
        }

        self.ep_target = if kind == MoveKind::DoublePush {
            Some((origin + target) / 2)
        } else {
            None
        };
        self.side_to_move = self.side_to_move.opposite();
        self.move_log.push(mv.notation());
        mv
    }

    /// Takes back a move previously returned by `apply_move`. Moves must be undone
    /// in the reverse order they were applied.
    pub fn undo_move(&mut self, mv: &Move) {
        self.move_log.pop();
        self.side_to_move = self.side_to_move.opposite();
        self.ep_target = mv.ep_target;
        self.castling_rights = mv.castling_rights;

        match mv.kind {
            MoveKind::KingSideCastle => self.shift_rook(mv.origin + 1, mv.origin + 3),
            MoveKind::QueenSideCastle => self.shift_rook(mv.origin - 1, mv.origin - 4),
            _ => (),
        }

        self.remove_piece(mv.target);
        self.add_piece(mv.moved, mv.origin);
        if let Some(captured) = mv.captured {
            self.add_piece(captured, mv.capture_square());
        }
    }

    fn classify(&self, moved: Piece, origin: Square, target: Square) -> MoveKind {
        let file_delta = square::file_of(target) as i32 - square::file_of(origin) as i32;
        let rank_delta = square::rank_of(target) as i32 - square::rank_of(origin) as i32;
        match moved.piece_type {
            PieceType::Pawn if rank_delta.abs() == 2 => MoveKind::DoublePush,
            PieceType::Pawn if file_delta != 0 && self.pieces[target].is_none() => MoveKind::EnPassant,
            PieceType::King if file_delta == 2 => MoveKind::KingSideCastle,
            PieceType::King if file_delta == -2 => MoveKind::QueenSideCastle,
            _ => MoveKind::Normal,
        }
    }

    fn shift_rook(&mut self, from: Square, to: Square) {
        if let Some(rook) = self.remove_piece(from) {
            self.add_piece(rook, to)
        }
    }

    /// Places a new piece on a given square
    pub(crate) fn add_piece(&mut self, piece: Piece, sq: Square) {
        self.pieces[sq] = Some(piece);
        if piece.piece_type == PieceType::King {
            self.king_squares[piece.color as usize] = sq;
        }
    }

    /// Clears the given square, returning the piece that has been removed if any
    fn remove_piece(&mut self, sq: Square) -> Option<Piece> {
        self.pieces[sq].take()
    }

    /*
    INTERESTING GETTERS
     */
    pub fn side_to_move(&self) -> Color { self.side_to_move }

    pub fn en_passant_target(&self) -> Option<Square> {
        self.ep_target
    }

    pub fn castling_rights(&self) -> CastlingRights {
        self.castling_rights
    }

    pub fn king_square(&self, color: Color) -> Square {
        self.king_squares[color as usize]
    }

    pub fn piece_on(&self, sq: Square) -> Option<Piece> {
        self.pieces[sq]
    }

    pub fn piece_type_on(&self, sq: Square) -> Option<PieceType> {
        self.pieces[sq].map(|p| p.piece_type)
    }

    pub fn color_on(&self, sq: Square) -> Option<Color> {
        self.pieces[sq].map(|p| p.color)
    }

    pub fn move_log(&self) -> &MoveLog {
        &self.move_log
    }

    /// Iterates over occupied squares along with their piece
    pub fn pieces(&self) -> impl Iterator<Item = (Square, Piece)> + '_ {
        self.pieces
            .iter()
            .enumerate()
            .filter_map(|(sq, p)| p.map(|p| (sq, p)))
    }

    /*
    FEN STRING OPERATIONS
     */
    pub fn get_fen(&self) -> String {
        let mut fen = String::new();

        for rank in (0..8).rev() {
            let mut empty_counter = 0;
            for file in 0..8 {
                match self.pieces[rank * 8 + file] {
                    Some(p) => {
                        if empty_counter != 0 { fen.push_str(&empty_counter.to_string()) }
                        empty_counter = 0;
                        fen.push_str(&p.to_string())
                    }
                    None => empty_counter += 1
                }
            }
            if empty_counter != 0 { fen.push_str(&empty_counter.to_string()) }
            if rank != 0 { fen.push('/') }
        }

        fen.push_str(if self.side_to_move == White { " w " } else { " b " });
        fen.push_str(&self.castling_rights.to_string());
        match self.ep_target.and_then(square_representation) {
            Some(sq) => fen.push_str(&format!(" {}", sq)),
            None => fen.push_str(" -")
        }
        fen
    }
}

const BACK_RANK: [PieceType; 8] = [
    PieceType::Rook,
    PieceType::Knight,
    PieceType::Bishop,
    PieceType::Queen,
    PieceType::King,
    PieceType::Bishop,
    PieceType::Knight,
    PieceType::Rook,
];

impl Display for Board {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        const FILES: &str = "    a   b   c   d   e   f   g   h";
        const SEPARATOR: &str = "  +---+---+---+---+---+---+---+---+";
        writeln!(f, "{}", FILES)?;
        writeln!(f, "{}", SEPARATOR)?;
        for rank in (0..8).rev() {
            let cells: Vec<String> = (0..8)
                .map(|file| match self.pieces[rank * 8 + file] {
                    Some(p) => p.glyph().to_string(),
                    None => String::from("."),
                })
                .collect();
            writeln!(f, "{} | {} | {}", rank + 1, cells.join(" | "), rank + 1)?;
            writeln!(f, "{}", SEPARATOR)?;
        }
        writeln!(f, "{}", FILES)?;
        write!(f, "\n{} to move", if self.side_to_move == White { "White" } else { "Black" })?;
        if let Some(last) = self.move_log.last() {
            write!(f, "\nLast move: {}", last)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::move_generator::generate;
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    #[test]
    fn initial_position_matches_fen() {
        assert_eq!(Board::new(), Board::from_fen(STARTING_FEN).unwrap());
        assert_eq!(Board::new().get_fen(), "rnbqkbnr/pppppppp/8/8/8/8/PPPPPPPP/RNBQKBNR w KQkq -");
        assert_eq!(Board::new().king_square(White), sq("e1"));
        assert_eq!(Board::new().king_square(Black), sq("e8"));
    }

    #[test]
    fn fen_requires_one_king_per_side() {
        assert!(Board::from_fen("8/8/8/8/8/8/8/4K3 w - -").is_err());
        assert!(Board::from_fen("4kk2/8/8/8/8/8/8/4K3 w - -").is_err());
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 w - -").is_ok());
        assert!(Board::from_fen("4k3/8/8/8/8/8/4K3 w - -").is_err());
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4K3 x - -").is_err());
    }

    #[test]
    fn fen_rejects_a_capturable_king() {
        // White to move could take the black king on e8
        assert!(matches!(
            Board::from_fen("4k3/8/8/8/8/8/8/4R1K1 w - -"),
            Err(ChessError::InvalidFen(_))
        ));
        assert!(Board::from_fen("4k3/8/8/8/8/8/8/4R1K1 b - -").is_ok());
    }

    #[test]
    fn fen_rejects_inconsistent_en_passant_squares() {
        // Occupied by a white knight
        assert!(Board::from_fen("4k3/8/3N4/3pP3/8/8/8/4K3 w - d6").is_err());
        // Wrong rank for white to move
        assert!(Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d3").is_err());
        // No black pawn past the square
        assert!(Board::from_fen("4k3/8/8/4P3/8/8/8/4K3 w - d6").is_err());
        assert!(Board::from_fen("4k3/8/8/3pP3/8/8/8/4K3 w - d6").is_ok());
        assert!(Board::from_fen("4k3/8/8/8/3Pp3/8/8/4K3 b - d3").is_ok());
    }

    #[test]
    fn double_push_sets_en_passant_marker() {
        let mut board = Board::new();
        let mv = board.apply_move(sq("e2"), sq("e4"));
        assert_eq!(mv.kind, MoveKind::DoublePush);
        assert_eq!(board.en_passant_target(), Some(sq("e3")));
        assert_eq!(board.side_to_move(), Black);
        assert_eq!(board.move_log().last(), Some("e2e4"));

        board.apply_move(sq("g8"), sq("f6"));
        assert_eq!(board.en_passant_target(), None);
    }

    #[test]
    fn promotion_undo_restores_the_pawn() {
        let mut board = Board::from_fen("1r2k3/P7/8/8/8/8/8/4K3 w - -").unwrap();
        let before = board.clone();
        let mv = board.apply_move(sq("a7"), sq("b8"));
        assert_eq!(mv.promotion, Some(PieceType::Queen));
        assert_eq!(mv.captured, Some(Piece::new(PieceType::Rook, Black)));
        assert_eq!(board.piece_on(sq("b8")), Some(Piece::new(PieceType::Queen, White)));
        assert_eq!(board.move_log().last(), Some("a7b8qx"));
        board.undo_move(&mv);
        assert_eq!(board, before);
    }

    #[test]
    fn undo_with_duplicate_pieces_restores_the_right_one() {
        // Either rook could have landed on e1, the record must know which one did
        let mut board = Board::from_fen("4k3/8/8/8/8/8/8/R2K3R w - -").unwrap();
        let before = board.clone();
        let mv = board.apply_move(sq("h1"), sq("e1"));
        board.undo_move(&mv);
        assert_eq!(board, before);
        assert_eq!(board.piece_on(sq("a1")), Some(Piece::new(PieceType::Rook, White)));
        assert_eq!(board.piece_on(sq("h1")), Some(Piece::new(PieceType::Rook, White)));
    }

    #[test]
    fn castling_moves_the_rook_and_clears_rights() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").unwrap();
        let before = board.clone();
        let mv = board.apply_move(sq("e1"), sq("g1"));
        assert_eq!(mv.kind, MoveKind::KingSideCastle);
        assert_eq!(board.piece_type_on(sq("f1")), Some(PieceType::Rook));
        assert_eq!(board.piece_on(sq("h1")), None);
        assert_eq!(board.king_square(White), sq("g1"));
        assert_eq!(board.castling_rights().get(White), (false, false));
        assert_eq!(board.castling_rights().get(Black), (true, true));
        board.undo_move(&mv);
        assert_eq!(board, before);

        // Played out of turn, undo still hands the move back to white
        let mv = board.apply_move(sq("e8"), sq("c8"));
        assert_eq!(mv.kind, MoveKind::QueenSideCastle);
        assert_eq!(board.piece_type_on(sq("d8")), Some(PieceType::Rook));
        board.undo_move(&mv);
        assert_eq!(board, before);
    }

    #[test]
    fn capturing_a_corner_rook_revokes_its_right() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").unwrap();
        board.apply_move(sq("a1"), sq("a8"));
        assert_eq!(board.castling_rights().to_string(), "Kk");
    }

    #[test]
    fn en_passant_capture_and_undo() {
        let mut board = Board::from_fen("4k3/8/8/3Pp3/8/8/8/4K3 w - e6").unwrap();
        let before = board.clone();
        let mv = board.apply_move(sq("d5"), sq("e6"));
        assert_eq!(mv.kind, MoveKind::EnPassant);
        assert_eq!(mv.captured, Some(Piece::new(PieceType::Pawn, Black)));
        assert_eq!(board.piece_on(sq("e5")), None);
        board.undo_move(&mv);
        assert_eq!(board, before);
    }

    #[test]
    fn random_playouts_undo_to_identical_states() {
        let mut rng = StdRng::seed_from_u64(0xC0FFEE);
        for fen in [STARTING_FEN, "r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -"] {
            let mut board = Board::from_fen(fen).unwrap();
            let mut stack = vec![];
            for _ in 0..60 {
                let moves = generate(&mut board);
                let Some(&(origin, target)) = moves.choose(&mut rng) else { break };
                let snapshot = board.clone();
                let mv = board.apply_move(origin, target);
                stack.push((snapshot, mv));
            }
            while let Some((snapshot, mv)) = stack.pop() {
                board.undo_move(&mv);
                assert_eq!(board, snapshot, "undoing {} did not restore the position", mv);
            }
            assert_eq!(board, Board::from_fen(fen).unwrap());
        }
    }
}
