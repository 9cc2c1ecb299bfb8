/// Squares are indexed from a1 (0) to h8 (63), rank-major.
pub type Square = usize;

pub fn rank_of(sq: Square) -> usize {
    sq / 8
}
pub fn file_of(sq: Square) -> usize {
    sq % 8
}
pub fn vertical_symmetry(sq: Square) -> Square {
    8 * (7 - rank_of(sq)) + file_of(sq)
}

/// Builds a square from its rank and file, both in 0..8
pub fn from_coords(rank: usize, file: usize) -> Option<Square> {
    if rank < 8 && file < 8 {
        Some(rank * 8 + file)
    } else {
        None
    }
}

/// Moves a square by a signed rank/file delta, returning None when it falls off the board
/// ```
/// use chessbot::square::offset;
/// assert_eq!(offset(12, 2, 0), Some(28));
/// assert_eq!(offset(7, 0, 1), None);
/// ```
pub fn offset(sq: Square, rank_delta: i32, file_delta: i32) -> Option<Square> {
    let rank = rank_of(sq) as i32 + rank_delta;
    let file = file_of(sq) as i32 + file_delta;
    if (0..8).contains(&rank) && (0..8).contains(&file) {
        Some((rank * 8 + file) as Square)
    } else {
        None
    }
}

/// Parses a square from a string slice made of exactly a file letter and a rank digit
/// ```
/// use chessbot::square::parse_square;
/// assert_eq!(parse_square("e4"), Some(28));
/// assert_eq!(parse_square("d2"), Some(11));
/// assert_eq!(parse_square("d2d4"), None);
/// assert_eq!(parse_square("k9"), None);
/// ```
pub fn parse_square(s: &str) -> Option<Square> {
    let mut chars_iter = s.chars();
    let file = match chars_iter.next()? {
        c @ 'a'..='h' => c as usize - 'a' as usize,
        _ => return None,
    };
    let rank = match chars_iter.next()?.to_digit(10) {
        Some(i) if (1..=8).contains(&i) => i as usize - 1,
        _ => return None,
    };
    if chars_iter.next().is_some() {
        return None;
    }
    from_coords(rank, file)
}

/// Returns the string representation of a square
/// ```
/// use chessbot::square::square_representation;
/// assert_eq!(square_representation(28), Some(String::from("e4")));
/// assert_eq!(square_representation(11), Some(String::from("d2")));
/// assert_eq!(square_representation(65), None);
/// ```
pub fn square_representation(sq: Square) -> Option<String> {
    if !is_valid(sq) {
        return None;
    }
    let rank = ('1'..='8').nth(rank_of(sq))?;
    let file = ('a'..='h').nth(file_of(sq))?;
    let mut repr = file.to_string();
    repr.push(rank);
    Some(repr)
}

/// Checks whether a given square is in bounds (0..64) or not
/// ```
/// use chessbot::square::is_valid;
/// assert!(is_valid(12));
/// assert!(!is_valid(64));
/// ```
pub fn is_valid(sq: Square) -> bool {
    sq < 64
}
