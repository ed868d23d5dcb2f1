//!
//! Error taxonomy for the command-execution engine.
//!

use std::fmt;

/// All error kinds a command handler or the dispatcher itself can raise.
///
/// Every variant maps to one wire error convention; see
/// [`RedliteError::wire_message`].
#[derive(Debug)]
pub enum RedliteError {
    /// Frame could not be decoded off the wire.
    Protocol(String),
    /// Wrong number of arguments for a known command.
    Arity { cmd: String },
    /// An argument that must parse as an integer did not.
    NotAnInteger,
    /// Command run against a key holding a different value variant.
    WrongType,
    /// A command-specific semantic error (index out of range, nested MULTI, ...).
    Syntax(String),
    /// Unknown command name.
    UnknownCommand(String),
    /// Persistence read/write failure. Reported on the triggering command.
    Io(std::io::Error),
    /// Persistence payload could not be parsed.
    Serde(serde_json::Error),
}

impl From<std::io::Error> for RedliteError {
    fn from(e: std::io::Error) -> Self {
        RedliteError::Io(e)
    }
}

impl From<serde_json::Error> for RedliteError {
    fn from(e: serde_json::Error) -> Self {
        RedliteError::Serde(e)
    }
}

impl std::error::Error for RedliteError {}

impl fmt::Display for RedliteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.wire_message())
    }
}

impl RedliteError {
    /// Renders the `-ERR ...` / `-WRONGTYPE ...` text the client sees.
    pub fn wire_message(&self) -> String {
        match self {
            RedliteError::Protocol(_) => "ERR syntax error".to_string(),
            RedliteError::Arity { cmd } => {
                format!("ERR wrong number of arguments for '{}' command", cmd.to_lowercase())
            }
            RedliteError::NotAnInteger => "ERR value is not an integer or out of range".to_string(),
            RedliteError::WrongType => {
                "WRONGTYPE Operation against a key holding the wrong kind of value".to_string()
            }
            RedliteError::Syntax(msg) => format!("ERR {msg}"),
            RedliteError::UnknownCommand(name) => format!("ERR unknown command '{name}'"),
            RedliteError::Io(e) => format!("ERR {e}"),
            RedliteError::Serde(e) => format!("ERR {e}"),
        }
    }

    pub fn arity(cmd: &str) -> Self {
        RedliteError::Arity { cmd: cmd.to_string() }
    }
}

pub type Result<T> = std::result::Result<T, RedliteError>;
