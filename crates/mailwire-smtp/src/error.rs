//! Error types for SMTP operations.

use std::fmt;
use std::io;
use std::time::Duration;

use crate::types::{Category, ReplyCode};

/// Result type alias for SMTP operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A negative (or otherwise unusable) reply, as the server sent it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplyError {
    /// Reply code (e.g., 550).
    pub code: ReplyCode,
    /// Server message text, verbatim.
    pub message: String,
}

impl ReplyError {
    /// Creates a reply error from a code and the server's message.
    #[must_use]
    pub fn new(code: ReplyCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl fmt::Display for ReplyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.code, self.code.reason(), self.message)
    }
}

/// SMTP error types.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Reply line could not be framed (bad code, bad separator).
    #[error("Malformed reply: {0}")]
    MalformedReply(String),

    /// A continuation line carried a different code than the first line.
    #[error("Reply code changed mid-reply: expected {expected}, got {found}")]
    CodeMismatch {
        /// Code of the first line.
        expected: u16,
        /// Code of the offending line.
        found: u16,
    },

    /// Stream reached EOF before a complete reply was read.
    #[error("Connection closed by server")]
    ConnectionClosed,

    /// Transport operation exceeded the configured timeout.
    #[error("Timed out after {0:?}")]
    Timeout(Duration),

    /// Server greeting was not a positive reply.
    #[error("Server rejected connection: {0}")]
    Connect(ReplyError),

    /// 4xx reply; the whole transaction may be retried later.
    #[error("Transient failure: {0}")]
    Transient(ReplyError),

    /// 5xx reply; do not retry unmodified.
    #[error("Permanent failure: {0}")]
    Permanent(ReplyError),

    /// Positive reply, but not the one this step requires.
    #[error("Unexpected reply (expected {expected}): {reply}")]
    UnexpectedReply {
        /// Code the step was waiting for.
        expected: ReplyCode,
        /// What the server sent instead.
        reply: ReplyError,
    },

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Caller input that cannot be put on the wire.
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl Error {
    /// Builds the classified error for a negative reply.
    ///
    /// Non-negative codes yield [`Error::UnexpectedReply`] against `expected`.
    #[must_use]
    pub fn from_reply(expected: ReplyCode, code: ReplyCode, message: impl Into<String>) -> Self {
        let reply = ReplyError::new(code, message);
        match code.category() {
            Category::TransientFailure => Self::Transient(reply),
            Category::PermanentFailure => Self::Permanent(reply),
            Category::Informational | Category::Success => Self::UnexpectedReply { expected, reply },
        }
    }

    /// Returns the server reply carried by this error, if any.
    #[must_use]
    pub const fn reply(&self) -> Option<&ReplyError> {
        match self {
            Self::Connect(reply) | Self::Transient(reply) | Self::Permanent(reply) => Some(reply),
            Self::UnexpectedReply { reply, .. } => Some(reply),
            _ => None,
        }
    }

    /// Returns the reply code carried by this error, if any.
    #[must_use]
    pub fn reply_code(&self) -> Option<ReplyCode> {
        self.reply().map(|reply| reply.code)
    }

    /// Returns the server's message text, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        self.reply().map(|reply| reply.message.as_str())
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub fn is_permanent(&self) -> bool {
        self.reply_code()
            .is_some_and(|code| code.category() == Category::PermanentFailure)
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub fn is_transient(&self) -> bool {
        self.reply_code()
            .is_some_and(|code| code.category() == Category::TransientFailure)
    }

    /// Returns true if the server rejected the command order (503).
    #[must_use]
    pub fn is_bad_sequence(&self) -> bool {
        self.reply_code() == Some(ReplyCode::BadSequence)
    }

    /// Returns true for stream and framing failures.
    ///
    /// After one of these the session should be considered unusable.
    #[must_use]
    pub const fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Io(_)
                | Self::MalformedReply(_)
                | Self::CodeMismatch { .. }
                | Self::ConnectionClosed
                | Self::Timeout(_)
        )
    }
}
