//! Fatal, parser-level failures.
//!
//! These are distinct from [`crate::event::Event::ParserWarn`], which is data
//! flowing through the normal event bus and never stops parsing. A
//! `ParseError` is "sticky": once the façade records one, every subsequent
//! `parse_next_frame` call returns it immediately and no further events are
//! emitted.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ParseError {
    #[error("malformed demo stream: {0}")]
    MalformedStream(String),

    #[error("unexpected team name: {0}")]
    UnknownTeamName(String),

    #[error("failed to unmarshal net message {message}: {reason}")]
    NetMessageUnmarshal { message: String, reason: String },

    #[error("inconsistent encrypted-message framing")]
    EncryptedFraming,

    #[error("I/O error: {0}")]
    Io(String),
}
