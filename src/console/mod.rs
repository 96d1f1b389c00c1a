//! Console front-end
//!
//! A line-based stand-in for the graphical client: typed commands become
//! outgoing game events, and incoming events are printed.

use std::io::BufRead;
use std::sync::mpsc;
use std::thread;

use thiserror::Error;

use crate::protocol::{GameEvent, MoveKind, MoveMessage, PromotionKind, Side, Square};
use crate::session::{host_side_for, GameEventHandler};

/// Command parse errors
#[derive(Error, Debug, PartialEq, Eq)]
pub enum CommandError {
    #[error("Empty command")]
    Empty,

    #[error("Unknown command '{0}' (try 'help')")]
    Unknown(String),

    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),

    #[error("Invalid move '{0}', expected e.g. e2e4 or e7e8q")]
    InvalidMove(String),

    #[error("Unknown move flag '{0}', expected capture, castle or ep")]
    UnknownFlag(String),
}

/// A parsed console command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleCommand {
    /// Send an event to the peer
    Send(GameEvent),
    Status,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  move <from><to>[q|r|b|n] [capture|castle|ep]   e.g. move e2e4, move e7e8q
  resign                                          give up the game
  draw                                            offer a draw
  rematch                                         ask for a rematch
  accept                                          accept a rematch
  status                                          show connection status
  quit                                            disconnect and exit";

/// Parse one input line
pub fn parse_command(line: &str) -> Result<ConsoleCommand, CommandError> {
    let mut words = line.split_whitespace();
    let command = words.next().ok_or(CommandError::Empty)?;
    let args: Vec<&str> = words.collect();

    let parsed = match command.to_ascii_lowercase().as_str() {
        "move" | "m" => ConsoleCommand::Send(GameEvent::Move(parse_move(&args)?)),
        "resign" => ConsoleCommand::Send(GameEvent::Resign),
        "draw" => ConsoleCommand::Send(GameEvent::DrawOffer),
        "rematch" => ConsoleCommand::Send(GameEvent::RematchRequest),
        "accept" => ConsoleCommand::Send(GameEvent::RematchAccept),
        "status" => ConsoleCommand::Status,
        "help" | "?" => ConsoleCommand::Help,
        "quit" | "exit" => ConsoleCommand::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };
    Ok(parsed)
}

fn parse_move(args: &[&str]) -> Result<MoveMessage, CommandError> {
    let text = *args.first().ok_or(CommandError::MissingArgument("move"))?;
    let invalid = || CommandError::InvalidMove(text.to_string());
    if !text.is_ascii() || !(4..=5).contains(&text.len()) {
        return Err(invalid());
    }

    let from = Square::parse(&text[0..2]).ok_or_else(invalid)?;
    let to = Square::parse(&text[2..4]).ok_or_else(invalid)?;
    let promotion = match &text[4..] {
        "" => PromotionKind::None,
        "q" => PromotionKind::Queen,
        "r" => PromotionKind::Rook,
        "b" => PromotionKind::Bishop,
        "n" => PromotionKind::Knight,
        _ => return Err(invalid()),
    };

    let promoting = promotion != PromotionKind::None;
    let kind = match (promoting, args.get(1).copied()) {
        (false, None) => MoveKind::Normal,
        (false, Some("capture")) => MoveKind::Capture,
        (false, Some("castle")) => MoveKind::Castle,
        (false, Some("ep")) => MoveKind::EnPassant,
        (true, None) => MoveKind::Promotion,
        (true, Some("capture")) => MoveKind::PromotionCapture,
        (_, Some(flag)) => return Err(CommandError::UnknownFlag(flag.to_string())),
    };

    Ok(MoveMessage { from, to, promotion, kind })
}

/// Read stdin lines on a helper thread.
///
/// The thread only forwards text; it never touches the connection. The
/// channel disconnects when stdin reaches end of file.
pub fn spawn_stdin_reader() -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            if tx.send(line).is_err() {
                break;
            }
        }
    });
    rx
}

/// Prints incoming events and tracks the little game state the console needs
#[derive(Debug)]
pub struct ConsolePlayer {
    side: Option<Side>,
    game_over: bool,
    rematch_offered: bool,
    peer_lost: bool,
}

impl ConsolePlayer {
    /// A guest knows its side up front; a host learns it from `WhichSide`
    pub fn new(side: Option<Side>) -> Self {
        Self {
            side,
            game_over: false,
            rematch_offered: false,
            peer_lost: false,
        }
    }

    pub fn side(&self) -> Option<Side> {
        self.side
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    /// The peer asked for a rematch that has not been accepted yet
    pub fn rematch_offered(&self) -> bool {
        self.rematch_offered
    }

    pub fn peer_lost(&self) -> bool {
        self.peer_lost
    }

    /// Record an event the local player just sent
    pub fn on_sent(&mut self, event: &GameEvent) {
        match event {
            GameEvent::Resign => {
                self.game_over = true;
                println!("You resigned.");
            }
            GameEvent::RematchAccept => self.start_rematch(),
            GameEvent::Move(mv) => println!("You played {}{}", mv.from, mv.to),
            GameEvent::DrawOffer => println!("Draw offered."),
            GameEvent::RematchRequest => println!("Rematch requested."),
            GameEvent::WhichSide { .. } => {}
        }
    }

    fn start_rematch(&mut self) {
        self.game_over = false;
        self.rematch_offered = false;
        self.side = self.side.map(Side::opposite);
        if let Some(side) = self.side {
            println!("Rematch started. You play {side}.");
        }
    }
}

impl GameEventHandler for ConsolePlayer {
    fn on_event(&mut self, event: GameEvent) {
        match event {
            GameEvent::WhichSide { side } => {
                let mine = host_side_for(side);
                self.side = Some(mine);
                println!("Opponent plays {side}. You play {mine}.");
            }
            GameEvent::Move(mv) => {
                let promotion = match mv.promotion {
                    PromotionKind::None => "",
                    PromotionKind::Queen => "=Q",
                    PromotionKind::Rook => "=R",
                    PromotionKind::Bishop => "=B",
                    PromotionKind::Knight => "=N",
                };
                println!("Opponent played {}{}{} ({:?})", mv.from, mv.to, promotion, mv.kind);
            }
            GameEvent::Resign => {
                self.game_over = true;
                println!("Opponent resigned. You win!");
            }
            GameEvent::DrawOffer => println!("Opponent offers a draw."),
            GameEvent::RematchRequest => {
                self.rematch_offered = true;
                println!("Opponent wants a rematch. Type 'accept' to play again.");
            }
            GameEvent::RematchAccept => self.start_rematch(),
        }
    }

    fn on_peer_lost(&mut self) {
        self.peer_lost = true;
        println!("Opponent disconnected.");
    }
}
