use std::fmt::Display;
use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::debug;

use crate::board::Board;
use crate::evaluation::{Evaluation, Score};
use crate::move_generator::generate;
use crate::r#move::Move;
use crate::status::is_in_check;

pub const DEFAULT_DEPTH: u32 = 3;
pub const MAX_DEPTH: u32 = 6;
/// Wider than any reachable score, so that it can be negated safely
pub const INFINITY: Score = Evaluation::MATE_SCORE * 10;

/// A struct to group together every search option.
/// Budgets are optional, without them the search always runs to full depth.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchOptions {
    pub depth: u32,
    pub max_nodes: Option<u64>,
    pub max_time: Option<Duration>,
    pub seed: Option<u64>,
}
impl Default for SearchOptions {
    fn default() -> Self {
        SearchOptions {
            depth: DEFAULT_DEPTH,
            max_nodes: None,
            max_time: None,
            seed: None,
        }
    }
}
impl SearchOptions {
    pub fn set_depth(&mut self, value: u32) -> &mut Self {
        self.depth = value.clamp(1, MAX_DEPTH);
        self
    }
    pub fn set_nodes_to_search(&mut self, value: Option<u64>) -> &mut Self {
        self.max_nodes = value;
        self
    }
    pub fn set_time(&mut self, value: Option<Duration>) -> &mut Self {
        self.max_time = value;
        self
    }
    pub fn set_seed(&mut self, value: Option<u64>) -> &mut Self {
        self.seed = value;
        self
    }
}

/// Outcome of a root search
#[derive(Clone, Debug)]
pub struct Search {
    pub best_move: Option<Move>,
    pub score: Score,
    pub time: Duration,
    pub depth: u32,
    pub nodes_searched: u64,
    /// Set when a budget ran out before every root move was probed
    pub interrupted: bool,
}
impl Display for Search {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mate_score = self.score.abs() >= Evaluation::MATE_SCORE;
        write!(
            f,
            "depth {} time {} nodes {} nps {} pv {} score {} {}{}",
            self.depth,
            self.time.as_millis(),
            self.nodes_searched,
            ((self.nodes_searched as f64) / self.time.as_secs_f64().max(1e-9)) as u64,
            self.best_move.map_or_else(|| String::from("(none)"), |m| m.to_string()),
            if mate_score { "mate" } else { "cp" },
            if mate_score { self.score.signum() } else { self.score },
            if self.interrupted { " (interrupted)" } else { "" }
        )
    }
}

/// Node and time accounting shared by every node of one search
struct SearchContext {
    start: Instant,
    nodes_searched: u64,
    max_nodes: Option<u64>,
    max_time: Option<Duration>,
}
impl SearchContext {
    fn new(options: &SearchOptions) -> Self {
        SearchContext {
            start: Instant::now(),
            nodes_searched: 0,
            max_nodes: options.max_nodes,
            max_time: options.max_time,
        }
    }

    fn unbounded() -> Self {
        SearchContext {
            start: Instant::now(),
            nodes_searched: 0,
            max_nodes: None,
            max_time: None,
        }
    }

    fn should_stop(&self) -> bool {
        if let Some(mn) = self.max_nodes {
            if self.nodes_searched >= mn {
                return true;
            }
        }
        if let Some(duration) = self.max_time {
            if self.start.elapsed() >= duration {
                return true;
            }
        }
        false
    }
}

/// Picks moves for the automated side. Owns its random generator so that
/// root shuffles are reproducible when a seed is given.
pub struct Searcher {
    options: SearchOptions,
    rng: StdRng,
}

impl Searcher {
    pub fn new(options: SearchOptions) -> Searcher {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Searcher { options, rng }
    }

    /// Root of the search: every legal move is probed once with an open window, in a
    /// shuffled order, and the first move reaching the highest value wins.
    /// The board is handed back in the state it was received.
    pub fn find_best_move(&mut self, board: &mut Board) -> Search {
        let mut context = SearchContext::new(&self.options);
        let depth = self.options.depth.max(1);

        let mut root_moves = generate(board);
        root_moves.shuffle(&mut self.rng);

        // After a root move it is the opponent's turn, hence the negated color
        let color = -board.side_to_move().sign();
        let mut best_move = None;
        let mut best_score = -INFINITY;
        let mut interrupted = false;
        for (origin, target) in root_moves {
            if best_move.is_some() && context.should_stop() {
                interrupted = true;
                debug!("search budget spent after {} nodes", context.nodes_searched);
                break;
            }
            let mv = board.apply_move(origin, target);
            let score = -negamax_with(board, depth - 1, -INFINITY, INFINITY, color, &mut context);
            board.undo_move(&mv);
            if score > best_score {
                best_score = score;
                best_move = Some(mv);
            }
        }

        let search = Search {
            best_move,
            score: if best_move.is_some() { best_score } else { 0 },
            time: context.start.elapsed(),
            depth,
            nodes_searched: context.nodes_searched,
            interrupted,
        };
        debug!("{}", search);
        search
    }
}

/// Negamax with alpha beta pruning. `color` is +1 when the side to move is white and
/// -1 otherwise, so that leaves are scored from the side to move's point of view.
pub fn negamax(board: &mut Board, depth: u32, alpha: Score, beta: Score, color: Score) -> Score {
    negamax_with(board, depth, alpha, beta, color, &mut SearchContext::unbounded())
}

fn negamax_with(
    board: &mut Board,
    depth: u32,
    mut alpha: Score,
    beta: Score,
    color: Score,
    context: &mut SearchContext,
) -> Score {
    context.nodes_searched += 1;
    if depth == 0 || context.should_stop() {
        return color * Evaluation::evaluate(board);
    }

    let moves = generate(board);
    if moves.is_empty() {
        return if is_in_check(board, board.side_to_move()) {
            -Evaluation::MATE_SCORE
        } else {
            Evaluation::DRAW_SCORE
        };
    }

    let mut best_score = -INFINITY;
    for (origin, target) in moves {
        let mv = board.apply_move(origin, target);
        let score = -negamax_with(board, depth - 1, -beta, -alpha, -color, context);
        board.undo_move(&mv);

        best_score = best_score.max(score);
        alpha = alpha.max(score);
        if alpha >= beta {
            break;
        }
    }
    best_score
}
