//! Parsing of inbound chat commands
//!
//! Only texts whose first token is a recognized activation command are processed.
//! Telegram appends the bot username to commands sent in groups (`/start@my_bot`),
//! that suffix is ignored.

use crate::record::ActivationCode;

/// Result of inspecting an inbound message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedCommand {
    /// A recognized command followed by a non-empty activation code.
    Activate(ActivationCode),
    /// A recognized command without an argument.
    MissingArgument { command: String },
    /// Anything else.
    NotACommand,
}

pub fn parse_command<S: AsRef<str>>(text: &str, commands: &[S]) -> ParsedCommand {
    let mut tokens = text.split_whitespace();
    let Some(first) = tokens.next() else {
        return ParsedCommand::NotACommand;
    };

    let command = first.split_once('@').map_or(first, |(name, _bot)| name);
    let recognized = commands
        .iter()
        .any(|known| known.as_ref().eq_ignore_ascii_case(command));
    if !recognized {
        return ParsedCommand::NotACommand;
    }

    match tokens.next().map(ActivationCode::parse) {
        Some(Ok(code)) => ParsedCommand::Activate(code),
        _ => ParsedCommand::MissingArgument {
            command: command.to_lowercase(),
        },
    }
}
