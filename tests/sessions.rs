use chessbot::error::ChessError;
use chessbot::game::{GameEnd, GameMode};
use chessbot::move_generator::is_legal;
use chessbot::piece::{Color, PieceType};
use chessbot::search::SearchOptions;
use chessbot::server::GameServer;
use chessbot::square::parse_square;
use chessbot::status::GameStatus;

fn server() -> GameServer {
    let mut options = SearchOptions::default();
    options.set_depth(2).set_seed(Some(42));
    GameServer::new(options)
}

#[test]
fn opening_pawn_push() {
    let mut server = server();
    server.start_game("chan", GameMode::PlayerVsPlayer).unwrap();
    let reply = server.request_move("chan", "e2", "e4");
    assert!(reply.success, "{}", reply.message);
    assert_eq!(reply.status, None);

    let board = server.game("chan").unwrap().board();
    assert_eq!(board.piece_on(parse_square("e2").unwrap()), None);
    let pawn = board.piece_on(parse_square("e4").unwrap()).unwrap();
    assert_eq!((pawn.piece_type, pawn.color), (PieceType::Pawn, Color::White));
    assert_eq!(board.side_to_move(), Color::Black);
}

#[test]
fn rejected_moves_change_nothing() {
    let mut server = server();
    server.start_game("chan", GameMode::PlayerVsPlayer).unwrap();
    let before = server.game("chan").unwrap().board().clone();

    let reply = server.request_move("chan", "e2", "e5");
    assert!(!reply.success);
    assert_eq!(
        reply.message,
        ChessError::IllegalMovePattern { from: "e2".into(), to: "e5".into() }.to_string()
    );

    let reply = server.request_move("chan", "e7", "e5");
    assert!(!reply.success);
    assert_eq!(reply.message, "It's White's turn");

    let reply = server.request_move("chan", "z2", "e4");
    assert!(!reply.success);
    assert_eq!(reply.message, ChessError::MalformedNotation("z2e4".into()).to_string());

    assert_eq!(server.game("chan").unwrap().board(), &before);
}

#[test]
fn fools_mate() {
    let mut server = server();
    server.start_game("chan", GameMode::PlayerVsPlayer).unwrap();
    for (from, to) in [("f2", "f3"), ("e7", "e5"), ("g2", "g4")] {
        let reply = server.request_move("chan", from, to);
        assert!(reply.success, "{}", reply.message);
    }
    let reply = server.request_move("chan", "d8", "h4");
    assert!(reply.success);
    assert_eq!(reply.status, Some(GameStatus::Checkmate { winner: Color::Black }));
    assert_eq!(reply.status.unwrap().to_string(), "checkmate:black");

    let game = server.game("chan").unwrap();
    assert_eq!(game.end(), Some(GameEnd::Checkmate { winner: Color::Black }));
    assert_eq!(game.board().move_log().to_string(), "f2f3 e7e5 g2g4 d8h4");

    let reply = server.request_move("chan", "a2", "a3");
    assert!(!reply.success);
    assert_eq!(reply.message, ChessError::GameOver.to_string());
    assert!(server.request_ai_move("chan").is_none());

    // A finished game can be replaced by a new one
    assert!(server.start_game("chan", GameMode::PlayerVsPlayer).is_ok());
}

#[test]
fn engine_plays_legal_replies() {
    let mut server = server();
    server.start_game("chan", GameMode::default()).unwrap();
    for (from, to) in [("e2", "e4"), ("g1", "f3"), ("f1", "c4")] {
        let reply = server.request_move("chan", from, to);
        if !reply.success {
            // The engine may have blocked or taken the square, stop the scripted line
            break;
        }
        assert!(reply.engine_turn);

        let mut board = server.game("chan").unwrap().board().clone();
        let mv = server.request_ai_move("chan").unwrap();
        assert_eq!(mv.moved.color, Color::Black);
        assert!(is_legal(&mut board, mv.origin, mv.target));
        assert_eq!(server.game("chan").unwrap().board().side_to_move(), Color::White);
    }
}

#[test]
fn engine_takes_the_hanging_queen() {
    let mut server = server();
    // Player vs player keeps the line fixed, the engine is then made to play black's move
    server.start_game("chan", GameMode::PlayerVsPlayer).unwrap();
    for (from, to) in [("e2", "e4"), ("g8", "f6"), ("d1", "h5")] {
        assert!(server.request_move("chan", from, to).success);
    }
    assert!(server.request_ai_move("chan").is_none());
    let mv = server.force_engine_move("chan").unwrap();
    assert_eq!(mv.to_string(), "f6h5");
    assert!(mv.is_capture());
}
