//! Terminal commands typed at the mood board prompt.

use shared::domain::{Identity, Mood, MoodParseError};
use thiserror::Error;

pub const HELP: &str = "\
commands:
  connect <address>   connect a wallet account
  disconnect          drop the connected account
  vote <mood>         vote good, neutral or bad (or 0, 1, 2)
  tally               show local vote counts
  board               show the board and call target
  help                show this help
  quit                exit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Connect(Identity),
    Disconnect,
    Vote(Mood),
    Tally,
    Board,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("unknown command '{0}'; type 'help'")]
    Unknown(String),
    #[error("'{0}' needs an argument")]
    MissingArgument(&'static str),
    #[error(transparent)]
    InvalidMood(#[from] MoodParseError),
}

/// Blank lines parse to `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, CommandError> {
    let mut words = line.split_whitespace();
    let Some(head) = words.next() else {
        return Ok(None);
    };
    let arg = words.next();

    let command = match head.to_ascii_lowercase().as_str() {
        "connect" => Command::Connect(Identity::new(
            arg.ok_or(CommandError::MissingArgument("connect"))?,
        )),
        "disconnect" => Command::Disconnect,
        "vote" => Command::Vote(arg.ok_or(CommandError::MissingArgument("vote"))?.parse()?),
        "tally" => Command::Tally,
        "board" => Command::Board,
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(CommandError::Unknown(other.to_string())),
    };

    Ok(Some(command))
}
