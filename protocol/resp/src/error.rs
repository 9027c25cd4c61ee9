//! Protocol and command construction errors.

use std::fmt;

/// Errors from RESP frame parsing.
///
/// `Incomplete` means more bytes are needed and is the only recoverable
/// variant; everything else indicates a malformed stream and should close
/// the connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// More data is needed to complete the frame.
    Incomplete,
    /// The stream violates RESP framing.
    Protocol(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Incomplete => write!(f, "incomplete frame"),
            Self::Protocol(msg) => write!(f, "protocol error: {msg}"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Errors from turning a well-framed argument vector into a command.
///
/// These are reply-level: the frame was consumed, the connection stays up,
/// and the client gets an error string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandError {
    /// Command name is not recognized.
    Unknown(String),
    /// Known command, wrong number of arguments. Carries the lowercase
    /// command name for the error message.
    WrongArity(&'static str),
    /// Structurally malformed invocation (e.g. surplus arguments where the
    /// original replies a syntax error rather than an arity error).
    Syntax,
}

impl fmt::Display for CommandError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unknown(name) => write!(f, "unknown command '{name}'"),
            Self::WrongArity(name) => {
                write!(f, "wrong number of arguments for '{name}' command")
            }
            Self::Syntax => write!(f, "syntax error"),
        }
    }
}

impl std::error::Error for CommandError {}
