use crate::{
    board::Board,
    piece::{Color, PieceType},
    r#move::MoveKind,
    square::{self, Square},
    status,
};

/// An (origin, target) pair proposed for the side to move
pub type Candidate = (Square, Square);

/// Checks whether the piece on `origin` can go to `target` under its own movement rules:
/// geometry, occupancy of the target, and a clear path for sliders.
///
/// The mover's king safety is *not* considered, which is what makes this function usable
/// as an attack test: a piece attacks a square exactly when it could move onto it.
/// Castling and en passant are not movement patterns, see `is_special_move`.
pub fn follows_pattern(board: &Board, origin: Square, target: Square) -> bool {
    let piece = match board.piece_on(origin) {
        Some(p) => p,
        None => return false,
    };
    if origin == target || board.color_on(target) == Some(piece.color) {
        return false;
    }

    let rank_delta = square::rank_of(target) as i32 - square::rank_of(origin) as i32;
    let file_delta = square::file_of(target) as i32 - square::file_of(origin) as i32;

    match piece.piece_type {
        PieceType::Pawn => pawn_pattern(board, piece.color, origin, target, rank_delta, file_delta),
        PieceType::Knight => {
            let (r, f) = (rank_delta.abs(), file_delta.abs());
            (r == 2 && f == 1) || (r == 1 && f == 2)
        }
        PieceType::King => rank_delta.abs() <= 1 && file_delta.abs() <= 1,
        slider => {
            let on_line = (slider.is_bishop_like() && is_diagonal(rank_delta, file_delta))
                || (slider.is_rook_like() && is_straight(rank_delta, file_delta));
            on_line && path_is_clear(board, origin, target)
        }
    }
}

fn pawn_pattern(
    board: &Board,
    color: Color,
    origin: Square,
    target: Square,
    rank_delta: i32,
    file_delta: i32,
) -> bool {
    let forward = color.forward();
    let start_rank = if color == Color::White { 1 } else { 6 };
    let target_empty = board.piece_on(target).is_none();

    if file_delta == 0 && rank_delta == forward {
        return target_empty;
    }
    if file_delta == 0 && rank_delta == 2 * forward && square::rank_of(origin) == start_rank {
        let skipped = square::offset(origin, forward, 0);
        return target_empty && skipped.map_or(false, |sq| board.piece_on(sq).is_none());
    }
    file_delta.abs() == 1 && rank_delta == forward && !target_empty
}

fn is_diagonal(rank_delta: i32, file_delta: i32) -> bool {
    rank_delta.abs() == file_delta.abs()
}

fn is_straight(rank_delta: i32, file_delta: i32) -> bool {
    rank_delta == 0 || file_delta == 0
}

/// Walks from origin towards target by unit steps, every square strictly between
/// the two must be empty
fn path_is_clear(board: &Board, origin: Square, target: Square) -> bool {
    let rank_step = (square::rank_of(target) as i32 - square::rank_of(origin) as i32).signum();
    let file_step = (square::file_of(target) as i32 - square::file_of(origin) as i32).signum();

    let mut current = square::offset(origin, rank_step, file_step);
    while let Some(sq) = current {
        if sq == target {
            return true;
        }
        if board.piece_on(sq).is_some() {
            return false;
        }
        current = square::offset(sq, rank_step, file_step);
    }
    false
}

/// Recognizes castling and en passant captures, the two moves no movement pattern covers
pub fn is_special_move(board: &Board, origin: Square, target: Square) -> Option<MoveKind> {
    let piece = board.piece_on(origin)?;
    if piece.color != board.side_to_move() {
        return None;
    }
    match piece.piece_type {
        PieceType::Pawn => {
            let ep = board.en_passant_target()?;
            let rank_delta = square::rank_of(target) as i32 - square::rank_of(origin) as i32;
            let file_delta = square::file_of(target) as i32 - square::file_of(origin) as i32;
            let captured_square = 8 * square::rank_of(origin) + square::file_of(target);
            let captured = board.piece_on(captured_square)?;
            let is_ep = target == ep
                && board.piece_on(target).is_none()
                && rank_delta == piece.color.forward()
                && file_delta.abs() == 1
                && captured.piece_type == PieceType::Pawn
                && captured.color != piece.color;
            is_ep.then_some(MoveKind::EnPassant)
        }
        PieceType::King => castling_kind(board, piece.color, origin, target),
        _ => None,
    }
}

fn castling_kind(board: &Board, color: Color, origin: Square, target: Square) -> Option<MoveKind> {
    let home = if color == Color::White { 4 } else { 60 };
    if origin != home {
        return None;
    }
    let (kingside, queenside) = board.castling_rights().get(color);
    let (kind, rook_square, between) = if target == home + 2 && kingside {
        (MoveKind::KingSideCastle, home + 3, home + 1..home + 3)
    } else if target + 2 == home && queenside {
        (MoveKind::QueenSideCastle, home - 4, home - 3..home)
    } else {
        return None;
    };

    let rook_in_place = board
        .piece_on(rook_square)
        .map_or(false, |p| p.piece_type == PieceType::Rook && p.color == color);
    if !rook_in_place || between.into_iter().any(|sq| board.piece_on(sq).is_some()) {
        return None;
    }
    // The king may not castle out of check, nor through an attacked square
    let crossed = (origin + target) / 2;
    let enemy = color.opposite();
    if status::is_square_attacked(board, home, enemy) || status::is_square_attacked(board, crossed, enemy) {
        return None;
    }
    Some(kind)
}

/// Movement pattern or special move, without regard for the mover's king
pub fn is_pseudo_legal(board: &Board, origin: Square, target: Square) -> bool {
    follows_pattern(board, origin, target) || is_special_move(board, origin, target).is_some()
}

/// A move is legal when the piece belongs to the side to move, the move is pseudo legal,
/// and the mover's king is not attacked once it has been played
pub fn is_legal(board: &mut Board, origin: Square, target: Square) -> bool {
    if board.color_on(origin) != Some(board.side_to_move()) {
        return false;
    }
    is_pseudo_legal(board, origin, target) && !leaves_king_in_check(board, origin, target)
}

/// Plays the move, checks the mover's king and takes the move back
pub fn leaves_king_in_check(board: &mut Board, origin: Square, target: Square) -> bool {
    let mover = board.side_to_move();
    let mv = board.apply_move(origin, target);
    let exposed = status::is_in_check(board, mover);
    board.undo_move(&mv);
    exposed
}

/// Generates every legal move for the side to move, scanning all origin/target pairs
pub fn generate(board: &mut Board) -> Vec<Candidate> {
    let mut moves = Vec::with_capacity(64);
    let side = board.side_to_move();
    for origin in 0..64 {
        if board.color_on(origin) != Some(side) {
            continue;
        }
        for target in 0..64 {
            if is_pseudo_legal(board, origin, target) && !leaves_king_in_check(board, origin, target) {
                moves.push((origin, target))
            }
        }
    }
    moves
}

/// Same scan as `generate`, stopping at the first legal move found
pub fn has_legal_move(board: &mut Board) -> bool {
    let side = board.side_to_move();
    for origin in 0..64 {
        if board.color_on(origin) != Some(side) {
            continue;
        }
        for target in 0..64 {
            if is_pseudo_legal(board, origin, target) && !leaves_king_in_check(board, origin, target) {
                return true;
            }
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::Board;
    use crate::perft_count;
    use crate::piece::Piece;
    use crate::square::parse_square;

    fn sq(s: &str) -> Square {
        parse_square(s).unwrap()
    }

    #[test]
    fn twenty_moves_from_the_initial_position() {
        let mut board = Board::new();
        let moves = generate(&mut board);
        assert_eq!(moves.len(), 20);
        let knight_moves = moves
            .iter()
            .filter(|(o, _)| board.piece_type_on(*o) == Some(PieceType::Knight))
            .count();
        assert_eq!(knight_moves, 4);
    }

    #[test]
    fn pawn_patterns() {
        let board = Board::from_fen("4k3/8/8/8/3p4/2P5/P7/4K3 w - -").unwrap();
        assert!(follows_pattern(&board, sq("a2"), sq("a3")));
        assert!(follows_pattern(&board, sq("a2"), sq("a4")));
        assert!(!follows_pattern(&board, sq("a2"), sq("a5")));
        assert!(!follows_pattern(&board, sq("a2"), sq("b3")));
        assert!(follows_pattern(&board, sq("c3"), sq("d4")));
        assert!(!follows_pattern(&board, sq("c3"), sq("c5")));
        assert!(follows_pattern(&board, sq("d4"), sq("c3")));
        assert!(!follows_pattern(&board, sq("d4"), sq("d5")));
    }

    #[test]
    fn double_push_needs_both_squares_empty() {
        let board = Board::from_fen("4k3/8/8/8/8/n7/P7/4K3 w - -").unwrap();
        assert!(!follows_pattern(&board, sq("a2"), sq("a4")));
        assert!(!follows_pattern(&board, sq("a2"), sq("a3")));
    }

    #[test]
    fn sliders_need_a_clear_path() {
        let board = Board::new();
        assert!(!follows_pattern(&board, sq("a1"), sq("a3")));
        assert!(!follows_pattern(&board, sq("c1"), sq("e3")));
        assert!(!follows_pattern(&board, sq("d1"), sq("d3")));
        assert!(follows_pattern(&board, sq("g1"), sq("f3")));

        let board = Board::from_fen("4k3/8/8/8/8/8/8/R3K2B w - -").unwrap();
        assert!(follows_pattern(&board, sq("a1"), sq("a8")));
        assert!(follows_pattern(&board, sq("a1"), sq("d1")));
        assert!(!follows_pattern(&board, sq("a1"), sq("f1")));
        assert!(follows_pattern(&board, sq("h1"), sq("a8")));
        assert!(!follows_pattern(&board, sq("h1"), sq("h2")));

        let board = Board::from_fen("4k3/8/8/8/3Q4/8/8/4K3 w - -").unwrap();
        assert!(follows_pattern(&board, sq("d4"), sq("h8")));
        assert!(follows_pattern(&board, sq("d4"), sq("d8")));
        assert!(!follows_pattern(&board, sq("d4"), sq("e6")));
    }

    #[test]
    fn own_pieces_block_the_target() {
        let board = Board::new();
        assert!(!follows_pattern(&board, sq("e1"), sq("e2")));
        assert!(!follows_pattern(&board, sq("b1"), sq("d2")));
    }

    #[test]
    fn castling_requires_safe_empty_path() {
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w KQkq -").unwrap();
        assert!(is_legal(&mut board, sq("e1"), sq("g1")));
        assert!(is_legal(&mut board, sq("e1"), sq("c1")));

        // f1 is attacked by the rook on f8
        let mut board = Board::from_fen("r3kr2/8/8/8/8/8/8/R3K2R w KQq -").unwrap();
        assert!(!is_legal(&mut board, sq("e1"), sq("g1")));
        assert!(is_legal(&mut board, sq("e1"), sq("c1")));

        // b1 occupied
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/RN2K2R w KQkq -").unwrap();
        assert!(!is_legal(&mut board, sq("e1"), sq("c1")));

        // no right
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/8/R3K2R w Qkq -").unwrap();
        assert!(!is_legal(&mut board, sq("e1"), sq("g1")));

        // in check
        let mut board = Board::from_fen("r3k2r/8/8/8/8/8/4r3/R3K2R w KQkq -").unwrap();
        assert!(!is_legal(&mut board, sq("e1"), sq("g1")));
    }

    #[test]
    fn en_passant_only_right_after_the_double_push() {
        let mut board = Board::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - -").unwrap();
        board.apply_move(sq("d7"), sq("d5"));
        assert!(is_legal(&mut board, sq("e5"), sq("d6")));
        assert!(!follows_pattern(&board, sq("e5"), sq("d6")));

        board.apply_move(sq("e1"), sq("e2"));
        board.apply_move(sq("e8"), sq("e7"));
        assert!(!is_legal(&mut board, sq("e5"), sq("d6")));
    }

    #[test]
    fn en_passant_never_lands_on_a_piece() {
        let mut board = Board::from_fen("4k3/3p4/8/4P3/8/8/8/4K3 b - -").unwrap();
        board.apply_move(sq("d7"), sq("d5"));
        assert_eq!(is_special_move(&board, sq("e5"), sq("d6")), Some(MoveKind::EnPassant));

        // A white knight now stands on the marker square
        board.add_piece(Piece::new(PieceType::Knight, Color::White), sq("d6"));
        assert_eq!(is_special_move(&board, sq("e5"), sq("d6")), None);
        assert!(!is_legal(&mut board, sq("e5"), sq("d6")));
        assert!(!generate(&mut board).contains(&(sq("e5"), sq("d6"))));
    }

    #[test]
    fn pinned_piece_cannot_move() {
        let mut board = Board::from_fen("4r1k1/8/8/8/8/8/4N3/4K3 w - -").unwrap();
        assert!(follows_pattern(&board, sq("e2"), sq("c3")));
        assert!(!is_legal(&mut board, sq("e2"), sq("c3")));
    }

    #[test]
    fn perft_counts() {
        let mut board = Board::new();
        assert_eq!(perft_count(&mut board, 1), 20);
        assert_eq!(perft_count(&mut board, 2), 400);
        assert_eq!(perft_count(&mut board, 3), 8902);

        // Kiwipete exercises castling, en passant and promotions
        let mut board =
            Board::from_fen("r3k2r/p1ppqpb1/bn2pnp1/3PN3/1p2P3/2N2Q1p/PPPBBPPP/R3K2R w KQkq -").unwrap();
        assert_eq!(perft_count(&mut board, 1), 48);
        assert_eq!(perft_count(&mut board, 2), 2039);
    }
}
