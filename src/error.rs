//! Error types for the rules engine and the session layer
//!
//! Every rejection leaves the board untouched; the `Display` text of a variant
//! is the reason reported back to the player.

use thiserror::Error;

/// Errors that can occur while driving a game
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChessError {
    /// The move text is not two squares in `e2e4` form
    #[error("Invalid notation {0:?}, use the format like 'e2e4'")]
    MalformedNotation(String),

    /// No piece at source square
    #[error("No piece at source square {0}")]
    EmptySource(String),

    /// The piece belongs to the side not on move
    #[error("It's {}'s turn", capitalize(.to_move))]
    WrongSideToMove { to_move: &'static str },

    /// The piece cannot reach the target under its movement rules
    #[error("Invalid move for this piece: {from}{to}")]
    IllegalMovePattern { from: String, to: String },

    /// The move would leave the mover's own king attacked
    #[error("Illegal move {from}{to}: your king would be in check")]
    LeavesKingInCheck { from: String, to: String },

    /// The game has already ended
    #[error("The game is over")]
    GameOver,

    /// No game is registered for this session
    #[error("No game in progress for session {0}")]
    UnknownSession(String),

    /// A game is already running for this session
    #[error("A game is already in progress for session {0}")]
    SessionExists(String),

    /// The FEN string could not be parsed into a sound position
    #[error("Invalid FEN: {0}")]
    InvalidFen(String),
}

/// Result type alias for engine and session operations
pub type ChessResult<T> = Result<T, ChessError>;

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) => c.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reasons_are_human_readable() {
        assert_eq!(
            ChessError::WrongSideToMove { to_move: "white" }.to_string(),
            "It's White's turn"
        );
        assert_eq!(
            ChessError::EmptySource("e3".to_string()).to_string(),
            "No piece at source square e3"
        );
    }
}
