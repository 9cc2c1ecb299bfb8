use crate::board::Board;
use crate::error::ChessError;
use crate::game::{Game, GameMode};
use crate::piece::Color;
use crate::r#move::Move;
use crate::search::{SearchOptions, DEFAULT_DEPTH, MAX_DEPTH};
use crate::server::{GameServer, MoveReply, SessionId};

use regex::Regex;
use rustyline::config::Configurer;
use rustyline::Editor;
use std::collections::BTreeMap;
use std::fmt::{Display, Error, Formatter};
use std::time::Duration;
use tracing::{debug, warn};

const DEFAULT_SESSION: &str = "local";

/// Interactive front end. Every command acts on the current session of an
/// in-process `GameServer`.
pub struct Shell {
    server: GameServer,
    session: SessionId,
    options: BTreeMap<String, ShellOption>,
    args_regex: Regex,
}
impl Default for Shell {
    fn default() -> Self {
        let options = BTreeMap::from([
            (
                "depth".to_string(),
                ShellOption::IntValue {
                    name: "Depth".to_string(),
                    value: DEFAULT_DEPTH as i32,
                    default: DEFAULT_DEPTH as i32,
                    min: 1,
                    max: MAX_DEPTH as i32,
                },
            ),
            (
                "nodes".to_string(),
                ShellOption::IntValue {
                    name: "Nodes".to_string(),
                    value: 0,
                    default: 0,
                    min: 0,
                    max: i32::MAX,
                },
            ),
            (
                "movetime".to_string(),
                ShellOption::IntValue {
                    name: "MoveTime".to_string(),
                    value: 0,
                    default: 0,
                    min: 0,
                    max: 600_000,
                },
            ),
            (
                "seed".to_string(),
                ShellOption::IntValue {
                    name: "Seed".to_string(),
                    value: -1,
                    default: -1,
                    min: -1,
                    max: i32::MAX,
                },
            ),
            (
                "mode".to_string(),
                ShellOption::StringChoice {
                    name: "Mode".to_string(),
                    value: "ai".to_string(),
                    default: "ai".to_string(),
                    possible_values: vec!["pvp".to_string(), "ai".to_string()],
                },
            ),
            (
                "enginecolor".to_string(),
                ShellOption::StringChoice {
                    name: "EngineColor".to_string(),
                    value: "black".to_string(),
                    default: "black".to_string(),
                    possible_values: vec!["white".to_string(), "black".to_string()],
                },
            ),
        ]);
        let mut shell = Shell {
            server: GameServer::default(),
            session: DEFAULT_SESSION.to_string(),
            options,
            args_regex: Regex::new(r#"(".*?"|[^"\s]+)"#).expect("the argument pattern is valid"),
        };
        shell.sync_options();
        shell
    }
}

impl Shell {
    pub fn run(&mut self) {
        let mut editor = Editor::<()>::new();
        editor.set_auto_add_history(true);
        editor.set_check_cursor_position(true);
        println!("Type 'new' to start a game, 'help' for the list of commands");

        while let Ok(line) = editor.readline(&format!("{}> ", self.session)) {
            match self.handle_command(&line) {
                Ok(ShellOkCode::ShouldQuit) => break,
                Ok(ShellOkCode::Output(text)) => println!("{}", text),
                Err(ShellErrCode::NoCommand) => (),
                Err(e) => eprintln!("{}", e),
            }
        }
    }

    pub fn handle_command(&mut self, line: &str) -> Result<ShellOkCode, ShellErrCode> {
        let args_regex = self.args_regex.clone();
        let mut args = args_regex.find_iter(line).map(|m| m.as_str().trim_matches('"'));
        let cmd = args.next().ok_or(ShellErrCode::NoCommand)?;
        debug!("shell command: {}", line.trim());

        let output = match cmd.to_lowercase().as_str() {
            "new" => {
                let mut mode = self.default_mode();
                for arg in args {
                    match arg {
                        "pvp" => mode = GameMode::PlayerVsPlayer,
                        "ai" => mode = self.engine_mode(),
                        color => {
                            let engine = Color::parse(color).ok_or_else(|| ShellErrCode::BadArg(color.to_string()))?;
                            mode = GameMode::VersusEngine { engine };
                        }
                    }
                }
                self.server.start_game(&self.session, mode).map_err(ShellErrCode::Rejected)?;
                let mut text = format!("New game started\n{}", self.board()?);
                if self.server.game(&self.session).map_or(false, |g| g.is_engine_turn()) {
                    text.push_str(&self.engine_reply(false));
                }
                text
            }
            "session" => {
                let id = args.next().ok_or_else(|| ShellErrCode::MissingArg("<id>".to_string()))?;
                self.session = id.to_string();
                format!("Switched to session {}", id)
            }
            "move" => {
                let mv = args.next().ok_or_else(|| ShellErrCode::MissingArg("<from><to>".to_string()))?;
                self.player_move(mv)?
            }
            "go" => self.engine_reply(true).trim_start().to_string(),
            "board" | "show" => self.board()?.to_string(),
            "fen" => self.board()?.get_fen(),
            "position" => {
                let rest: Vec<&str> = args.collect();
                let board = match rest.as_slice() {
                    [] => return Err(ShellErrCode::MissingArg("<startpos | fen>".to_string())),
                    ["startpos"] => Board::new(),
                    fen => Board::from_fen(&fen.join(" ")).map_err(ShellErrCode::Rejected)?,
                };
                let mode = self
                    .server
                    .game(&self.session)
                    .map_or_else(|_| self.default_mode(), |g| g.mode());
                match self.server.stop(&self.session) {
                    Ok(()) | Err(ChessError::UnknownSession(_)) => (),
                    Err(e) => return Err(ShellErrCode::Rejected(e)),
                }
                let game = Game::from_board(board, mode, self.search_options());
                self.server.start_with(&self.session, game).map_err(ShellErrCode::Rejected)?;
                self.board()?.to_string()
            }
            "resign" => {
                let winner = self.server.resign(&self.session).map_err(ShellErrCode::Rejected)?;
                format!("Game resigned, {} wins", winner.name())
            }
            "stop" => {
                self.server.stop(&self.session).map_err(ShellErrCode::Rejected)?;
                "Game stopped".to_string()
            }
            "set" => {
                let name = args.next().ok_or_else(|| ShellErrCode::MissingArg("<option>".to_string()))?;
                let value = args.next().ok_or_else(|| ShellErrCode::MissingArg("<value>".to_string()))?;
                let option = self
                    .options
                    .get_mut(&name.to_lowercase())
                    .ok_or_else(|| ShellErrCode::BadArg(name.to_string()))?;
                option.set_value(value);
                let text = format!("{}", option);
                self.sync_options();
                text
            }
            "options" => self
                .options
                .values()
                .map(|o| format!("option {}", o))
                .collect::<Vec<_>>()
                .join("\n"),
            "help" => self.help(),
            "quit" | "exit" => return Ok(ShellOkCode::ShouldQuit),
            // A bare move such as e2e4
            other if Move::parse(other).is_some() => self.player_move(other)?,
            _ => return Err(ShellErrCode::BadCommand(cmd.to_string())),
        };
        Ok(ShellOkCode::Output(output))
    }

    pub fn server(&self) -> &GameServer {
        &self.server
    }

    fn board(&self) -> Result<&Board, ShellErrCode> {
        self.server
            .game(&self.session)
            .map(|g| g.board())
            .map_err(ShellErrCode::Rejected)
    }

    fn player_move(&mut self, notation: &str) -> Result<String, ShellErrCode> {
        if notation.len() != 4 || !notation.is_char_boundary(2) {
            return Err(ShellErrCode::BadMove(notation.to_string()));
        }
        let (from, to) = notation.split_at(2);
        let reply = self.server.request_move(&self.session, from, to);
        if !reply.success {
            return Err(ShellErrCode::BadMove(reply.message));
        }
        let mut text = Self::describe(&reply);
        text.push_str(&format!("\n{}", self.board()?));
        if reply.engine_turn {
            text.push_str(&self.engine_reply(false));
        }
        Ok(text)
    }

    fn describe(reply: &MoveReply) -> String {
        match reply.status {
            Some(status) => format!("{} ({})", reply.message, status),
            None => reply.message.clone(),
        }
    }

    /// Lets the engine move on its own turn, or for whichever side is to move when forced
    fn engine_reply(&mut self, forced: bool) -> String {
        let played = if forced {
            self.server.force_engine_move(&self.session)
        } else {
            self.server.request_ai_move(&self.session)
        };
        match played {
            Some(mv) => {
                let mut text = format!("\nEngine plays {}", mv.notation());
                if let Ok(game) = self.server.game(&self.session) {
                    if let Some(status) = game.status() {
                        text.push_str(&format!(" ({})", status));
                    }
                    text.push_str(&format!("\n{}", game.board()));
                }
                text
            }
            None => {
                warn!("no engine move available in session {}", self.session);
                "\nThe engine has no move to play".to_string()
            }
        }
    }

    fn help(&self) -> String {
        let general = "Shell commands:\n\
                       new [pvp|ai] [white|black]   start a game, the color is the engine's\n\
                       session <id>                 switch to another session\n\
                       go                           let the engine play the side to move\n\
                       fen                          print the position as FEN\n\
                       position <fen|startpos>      set up a position\n\
                       set <option> <value>         change an option\n\
                       options                      list the options\n\
                       quit                         leave";
        match self.server.game(&self.session) {
            Ok(game) => format!("{}\n\n{}", game.help(), general),
            Err(_) => general.to_string(),
        }
    }

    fn int_option(&self, key: &str) -> i32 {
        match self.options.get(key) {
            Some(ShellOption::IntValue { value, .. }) => *value,
            _ => 0,
        }
    }

    fn choice_option(&self, key: &str) -> &str {
        match self.options.get(key) {
            Some(ShellOption::StringChoice { value, .. }) => value.as_str(),
            _ => "",
        }
    }

    fn engine_mode(&self) -> GameMode {
        let engine = Color::parse(self.choice_option("enginecolor")).unwrap_or(Color::Black);
        GameMode::VersusEngine { engine }
    }

    fn default_mode(&self) -> GameMode {
        match self.choice_option("mode") {
            "pvp" => GameMode::PlayerVsPlayer,
            _ => self.engine_mode(),
        }
    }

    fn search_options(&self) -> SearchOptions {
        let positive = |v: i32| if v > 0 { Some(v as u64) } else { None };
        let mut options = SearchOptions::default();
        options
            .set_depth(self.int_option("depth") as u32)
            .set_nodes_to_search(positive(self.int_option("nodes")))
            .set_time(positive(self.int_option("movetime")).map(Duration::from_millis))
            .set_seed(u64::try_from(self.int_option("seed")).ok());
        options
    }

    /// Search options only reach games started after the change
    fn sync_options(&mut self) {
        *self.server.options_mut() = self.search_options();
    }
}

#[derive(Debug, PartialEq, Eq)]
pub enum ShellOkCode {
    Output(String),
    ShouldQuit,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ShellErrCode {
    NoCommand,
    MissingArg(String),
    BadArg(String),
    BadCommand(String),
    BadMove(String),
    Rejected(ChessError),
}
impl Display for ShellErrCode {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Self::NoCommand => write!(f, "No command given"),
            Self::MissingArg(arg) => write!(f, "Missing an argument: {}", arg),
            Self::BadArg(arg) => write!(f, "Unexpected argument: {}", arg),
            Self::BadCommand(cmd) => write!(f, "Unknown command: {}, try 'help'", cmd),
            Self::BadMove(reason) => write!(f, "{}", reason),
            Self::Rejected(e) => write!(f, "{}", e),
        }
    }
}

pub enum ShellOption {
    IntValue {
        name: String,
        value: i32,
        default: i32,
        min: i32,
        max: i32,
    },
    StringChoice {
        name: String,
        value: String,
        default: String,
        possible_values: Vec<String>,
    },
}
impl ShellOption {
    /// Values out of range are clamped, unknown choices are ignored
    pub fn set_value(&mut self, v: &str) {
        match self {
            Self::IntValue { value, min, max, .. } => {
                let parsed = v.parse::<i32>().unwrap_or(*value);
                *value = parsed.clamp(*min, *max)
            }
            Self::StringChoice {
                value, possible_values, ..
            } => {
                if let Some(choice) = possible_values.iter().find(|x| x.eq_ignore_ascii_case(v)) {
                    *value = choice.clone();
                }
            }
        }
    }
}
impl Display for ShellOption {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), Error> {
        match self {
            Self::IntValue {
                name,
                value,
                default,
                min,
                max,
            } => write!(
                f,
                "name {} type spin value {} default {} min {} max {}",
                name, value, default, min, max
            ),
            Self::StringChoice {
                name,
                value,
                default,
                possible_values,
            } => write!(
                f,
                "name {} type combo value {} default {}{}",
                name,
                value,
                default,
                possible_values
                    .iter()
                    .fold(String::new(), |acc, x| format!("{} var {}", acc, x))
            ),
        }
    }
}
