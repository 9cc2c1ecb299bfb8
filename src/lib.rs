use std::time::Instant;

use crate::board::Board;
use crate::error::ChessResult;
use crate::move_generator::generate;

pub mod board;
pub mod castling;
pub mod error;
pub mod evaluation;
pub mod game;
pub mod history;
pub mod move_generator;
pub mod piece;
pub mod r#move;
pub mod search;
pub mod server;
pub mod shell;
pub mod square;
pub mod status;

/// Prints the node count of every depth up to `depth`, from the given position
/// or the starting one
pub fn perft(depth: u32, fen: Option<String>) -> ChessResult<()> {
    println!("perft");
    let mut board = match fen {
        None => Board::new(),
        Some(f) => Board::from_fen(&f)?,
    };
    println!("{}\n", board);
    println!("depth nodes\n--------");
    for d in 0..depth + 1 {
        let start = Instant::now();
        let nodes = perft_count(&mut board, d);
        let elapsed = start.elapsed();
        println!(
            "{}     {} ({}s, {} nps)",
            d,
            nodes,
            elapsed.as_secs_f32(),
            nodes as f32 / elapsed.as_secs_f32()
        );
    }
    Ok(())
}

/// Number of leaf positions reachable in exactly `depth` legal moves
pub fn perft_count(board: &mut Board, depth: u32) -> u64 {
    if depth == 0 {
        return 1;
    }
    let moves = generate(board);
    if depth == 1 {
        return moves.len() as u64;
    }
    let mut nodes = 0;
    for (origin, target) in moves {
        let mv = board.apply_move(origin, target);
        nodes += perft_count(board, depth - 1);
        board.undo_move(&mv);
    }
    nodes
}
