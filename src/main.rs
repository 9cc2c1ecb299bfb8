use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    println!("chessbot v{}, by {}", env!("CARGO_PKG_VERSION"), env!("CARGO_PKG_AUTHORS"));

    let args: Vec<String> = std::env::args().collect();

    // Launches a perft test
    if args.get(1).map(String::as_str) == Some("perft") {
        let expected_format = "Expected : perft <depth> [<FEN>]";
        let Some(depth) = args.get(2).and_then(|d| d.parse::<u32>().ok()) else {
            eprintln!("{}", expected_format);
            return ExitCode::FAILURE;
        };
        let fen = (args.len() > 3).then(|| args[3..].join(" "));

        if let Err(e) = chessbot::perft(depth, fen) {
            eprintln!("{}", e);
            return ExitCode::FAILURE;
        }
    } else {
        chessbot::shell::Shell::default().run()
    }
    ExitCode::SUCCESS
}
