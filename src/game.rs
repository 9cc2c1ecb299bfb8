//! One game from start to finish: turn sequencing, move requests and the engine's replies

use tracing::{debug, info};

use crate::board::Board;
use crate::error::{ChessError, ChessResult};
use crate::move_generator::{is_pseudo_legal, leaves_king_in_check};
use crate::piece::Color;
use crate::r#move::Move;
use crate::search::{Search, SearchOptions, Searcher};
use crate::square::{parse_square, Square};
use crate::status::{game_status, GameStatus};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameMode {
    PlayerVsPlayer,
    VersusEngine { engine: Color },
}

impl Default for GameMode {
    /// The engine answers as black
    fn default() -> Self {
        GameMode::VersusEngine { engine: Color::Black }
    }
}

/// Why a game stopped accepting moves
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GameEnd {
    Checkmate { winner: Color },
    Stalemate,
    Resignation { winner: Color },
}

/// What a successful move request produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveOutcome {
    pub played: Move,
    pub status: Option<GameStatus>,
    /// The engine is expected to answer next
    pub engine_turn: bool,
}

pub struct Game {
    board: Board,
    mode: GameMode,
    searcher: Searcher,
    status: Option<GameStatus>,
    end: Option<GameEnd>,
}

impl Game {
    pub fn new(mode: GameMode, options: SearchOptions) -> Game {
        Self::from_board(Board::new(), mode, options)
    }

    /// Starts a game from an arbitrary position, its status is derived right away
    pub fn from_board(mut board: Board, mode: GameMode, options: SearchOptions) -> Game {
        let status = game_status(&mut board);
        let mut game = Game {
            board,
            mode,
            searcher: Searcher::new(options),
            status: None,
            end: None,
        };
        game.record_status(status);
        game
    }

    pub fn board(&self) -> &Board {
        &self.board
    }
    pub fn mode(&self) -> GameMode {
        self.mode
    }
    pub fn status(&self) -> Option<GameStatus> {
        self.status
    }
    pub fn end(&self) -> Option<GameEnd> {
        self.end
    }
    pub fn is_over(&self) -> bool {
        self.end.is_some()
    }

    /// Whether the side to move is played by the engine
    pub fn is_engine_turn(&self) -> bool {
        !self.is_over()
            && matches!(self.mode, GameMode::VersusEngine { engine } if engine == self.board.side_to_move())
    }

    /// Validates then plays a move given in square notation. Nothing is written to the
    /// board unless every check passes.
    pub fn play(&mut self, from: &str, to: &str) -> ChessResult<MoveOutcome> {
        let (origin, target) = Self::parse_squares(from, to)?;
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        if let Err(e) = self.validate(origin, target, from, to) {
            debug!("rejected {}{}: {}", from, to, e);
            return Err(e);
        }

        let played = self.board.apply_move(origin, target);
        let status = game_status(&mut self.board);
        self.record_status(status);
        debug!("played {} ({})", played, status.map_or_else(String::new, |s| s.to_string()));
        Ok(MoveOutcome {
            played,
            status,
            engine_turn: self.is_engine_turn(),
        })
    }

    fn parse_squares(from: &str, to: &str) -> ChessResult<(Square, Square)> {
        let malformed = || ChessError::MalformedNotation(format!("{}{}", from, to));
        let origin = parse_square(from).ok_or_else(malformed)?;
        let target = parse_square(to).ok_or_else(malformed)?;
        Ok((origin, target))
    }

    fn validate(&mut self, origin: Square, target: Square, from: &str, to: &str) -> ChessResult<()> {
        let piece = self
            .board
            .piece_on(origin)
            .ok_or_else(|| ChessError::EmptySource(from.to_string()))?;
        let side = self.board.side_to_move();
        if piece.color != side {
            return Err(ChessError::WrongSideToMove { to_move: side.name() });
        }
        let pair = || (from.to_string(), to.to_string());
        if !is_pseudo_legal(&self.board, origin, target) {
            let (from, to) = pair();
            return Err(ChessError::IllegalMovePattern { from, to });
        }
        if leaves_king_in_check(&mut self.board, origin, target) {
            let (from, to) = pair();
            return Err(ChessError::LeavesKingInCheck { from, to });
        }
        Ok(())
    }

    /// Lets the engine pick and play a move for the side to move.
    /// Returns `None` when the game is over or no legal move exists.
    pub fn engine_move(&mut self) -> Option<(Move, Search)> {
        if self.is_over() {
            return None;
        }
        let search = self.searcher.find_best_move(&mut self.board);
        let chosen = search.best_move?;
        let played = self.board.apply_move(chosen.origin, chosen.target);
        let status = game_status(&mut self.board);
        self.record_status(status);
        info!("engine played {} ({})", played, search);
        Some((played, search))
    }

    /// The side to move gives up
    pub fn resign(&mut self) -> ChessResult<Color> {
        if self.is_over() {
            return Err(ChessError::GameOver);
        }
        let winner = self.board.side_to_move().opposite();
        self.end = Some(GameEnd::Resignation { winner });
        Ok(winner)
    }

    fn record_status(&mut self, status: Option<GameStatus>) {
        self.status = status;
        self.end = match status {
            Some(GameStatus::Checkmate { winner }) => Some(GameEnd::Checkmate { winner }),
            Some(GameStatus::Stalemate) => Some(GameEnd::Stalemate),
            _ => None,
        };
        if let Some(end) = self.end {
            info!("game over: {:?}", end);
        }
    }

    pub fn help(&self) -> String {
        let mut help = String::from(
            "Chess commands:\n\
             move <from><to>   move a piece (e.g. move e2e4)\n\
             <from><to>        quick move (e.g. e2e4)\n\
             board             show the current board\n\
             resign            resign the game\n\
             stop              stop the game\n",
        );
        match self.mode {
            GameMode::PlayerVsPlayer => help.push_str("\nGame mode: player vs player"),
            GameMode::VersusEngine { engine } => help.push_str(&format!(
                "\nGame mode: vs engine\nThe engine plays {}, you play {}.",
                engine.name(),
                engine.opposite().name()
            )),
        }
        help
    }
}
