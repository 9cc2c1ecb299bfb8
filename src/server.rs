//! In-memory registry of running games, one per session id

use std::collections::HashMap;

use tracing::{debug, info};

use crate::error::{ChessError, ChessResult};
use crate::game::{Game, GameMode};
use crate::piece::Color;
use crate::r#move::Move;
use crate::search::SearchOptions;
use crate::status::GameStatus;

pub type SessionId = String;

/// Answer to a move request, rejections included
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MoveReply {
    pub success: bool,
    pub message: String,
    pub status: Option<GameStatus>,
    /// The engine should be asked for a move next
    pub engine_turn: bool,
}

impl MoveReply {
    fn rejected(error: &ChessError) -> Self {
        MoveReply {
            success: false,
            message: error.to_string(),
            status: None,
            engine_turn: false,
        }
    }
}

#[derive(Default)]
pub struct GameServer {
    sessions: HashMap<SessionId, Game>,
    options: SearchOptions,
}

impl GameServer {
    pub fn new(options: SearchOptions) -> Self {
        GameServer {
            sessions: HashMap::new(),
            options,
        }
    }

    /// Search settings handed to every game started from now on
    pub fn options_mut(&mut self) -> &mut SearchOptions {
        &mut self.options
    }

    /// Registers a fresh game. A finished game under the same id is replaced.
    pub fn start_game(&mut self, id: &str, mode: GameMode) -> ChessResult<&Game> {
        self.start_with(id, Game::new(mode, self.options.clone()))
    }

    /// Like `start_game`, for a game already set up on a custom position
    pub fn start_with(&mut self, id: &str, game: Game) -> ChessResult<&Game> {
        if self.sessions.get(id).map_or(false, |g| !g.is_over()) {
            return Err(ChessError::SessionExists(id.to_string()));
        }
        info!("session {}: new game ({:?})", id, game.mode());
        self.sessions.insert(id.to_string(), game);
        self.game(id)
    }

    pub fn game(&self, id: &str) -> ChessResult<&Game> {
        self.sessions
            .get(id)
            .ok_or_else(|| ChessError::UnknownSession(id.to_string()))
    }

    fn game_mut(&mut self, id: &str) -> ChessResult<&mut Game> {
        self.sessions
            .get_mut(id)
            .ok_or_else(|| ChessError::UnknownSession(id.to_string()))
    }

    /// Plays a player's move; every failure is reported in the reply rather than as an error
    pub fn request_move(&mut self, id: &str, from: &str, to: &str) -> MoveReply {
        let outcome = self.game_mut(id).and_then(|game| game.play(from, to));
        match outcome {
            Ok(outcome) => MoveReply {
                success: true,
                message: format!("Moved {}", outcome.played.notation()),
                status: outcome.status,
                engine_turn: outcome.engine_turn,
            },
            Err(e) => {
                debug!("session {}: {}", id, e);
                MoveReply::rejected(&e)
            }
        }
    }

    /// Has the engine play when the side to move is the engine's. `None` for an unknown
    /// session, a player's turn, a finished game or a position without legal moves.
    pub fn request_ai_move(&mut self, id: &str) -> Option<Move> {
        let game = self.sessions.get_mut(id)?;
        if !game.is_engine_turn() {
            debug!("session {}: not the engine's turn", id);
            return None;
        }
        game.engine_move().map(|(mv, _)| mv)
    }

    /// Has the engine play for the side to move whoever controls it, used to ask the
    /// engine for a move in player vs player games or on a player's turn
    pub fn force_engine_move(&mut self, id: &str) -> Option<Move> {
        let game = self.sessions.get_mut(id)?;
        game.engine_move().map(|(mv, _)| mv)
    }

    /// The side to move resigns and the session is closed
    pub fn resign(&mut self, id: &str) -> ChessResult<Color> {
        let winner = self.game_mut(id)?.resign()?;
        self.sessions.remove(id);
        info!("session {}: {} wins by resignation", id, winner.name());
        Ok(winner)
    }

    pub fn stop(&mut self, id: &str) -> ChessResult<()> {
        self.sessions
            .remove(id)
            .map(|_| info!("session {}: stopped", id))
            .ok_or_else(|| ChessError::UnknownSession(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }
    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
