//! SMTP reply types.
//!
//! Reply codes follow RFC 5321 §4.2: three digits, the first of which
//! decides whether the reply is positive or negative.

use std::fmt;

/// Outcome class of a reply code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// 1xx and 3xx: positive, but more is expected (e.g. 354).
    Informational,
    /// 2xx: requested action completed.
    Success,
    /// 4xx: action not taken, the transaction may be retried later.
    TransientFailure,
    /// 5xx: action not taken, do not retry unmodified.
    PermanentFailure,
}

impl Category {
    /// Returns true for the negative classes (4xx, 5xx).
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::TransientFailure | Self::PermanentFailure)
    }
}

/// Classifies a numeric reply code by its leading digit.
///
/// Total over `u16`; anything at or above 600 is treated as permanent.
#[must_use]
pub const fn classify(code: u16) -> Category {
    match code / 100 {
        0 | 1 | 3 => Category::Informational,
        2 => Category::Success,
        4 => Category::TransientFailure,
        _ => Category::PermanentFailure,
    }
}

/// SMTP reply code.
///
/// Well-known codes have their own variant; everything else is kept in
/// [`ReplyCode::Other`]. Build values with [`ReplyCode::from_u16`] so a
/// known code never ends up in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReplyCode {
    /// 211 System status, or system help reply
    SystemStatus,
    /// 214 Help message
    HelpMessage,
    /// 220 Service ready
    ServiceReady,
    /// 221 Service closing transmission channel
    ServiceClosing,
    /// 250 Requested mail action okay, completed
    Ok,
    /// 251 User not local; will forward
    UserNotLocalWillForward,
    /// 252 Cannot VRFY user, but will accept message and attempt delivery
    CannotVerify,
    /// 354 Start mail input; end with `<CRLF>.<CRLF>`
    StartMailInput,
    /// 421 Service not available, closing transmission channel
    ServiceNotAvailable,
    /// 450 Mailbox unavailable (busy or temporarily blocked)
    MailboxBusy,
    /// 451 Local error in processing
    LocalError,
    /// 452 Insufficient system storage
    InsufficientStorage,
    /// 455 Server unable to accommodate parameters
    UnableToAccommodate,
    /// 500 Syntax error, command unrecognized
    SyntaxError,
    /// 501 Syntax error in parameters or arguments
    ParameterSyntaxError,
    /// 502 Command not implemented
    NotImplemented,
    /// 503 Bad sequence of commands
    BadSequence,
    /// 504 Command parameter not implemented
    ParameterNotImplemented,
    /// 550 Mailbox unavailable (not found, no access, policy)
    MailboxUnavailable,
    /// 551 User not local; please try forward-path
    UserNotLocal,
    /// 552 Exceeded storage allocation
    ExceededStorage,
    /// 553 Mailbox name not allowed
    MailboxNameNotAllowed,
    /// 554 Transaction failed
    TransactionFailed,
    /// 555 MAIL FROM/RCPT TO parameters not recognized or not implemented
    ParametersNotRecognized,
    /// Any code without a dedicated variant.
    Other(u16),
}

impl ReplyCode {
    /// Maps a numeric code to its variant.
    #[must_use]
    pub const fn from_u16(code: u16) -> Self {
        match code {
            211 => Self::SystemStatus,
            214 => Self::HelpMessage,
            220 => Self::ServiceReady,
            221 => Self::ServiceClosing,
            250 => Self::Ok,
            251 => Self::UserNotLocalWillForward,
            252 => Self::CannotVerify,
            354 => Self::StartMailInput,
            421 => Self::ServiceNotAvailable,
            450 => Self::MailboxBusy,
            451 => Self::LocalError,
            452 => Self::InsufficientStorage,
            455 => Self::UnableToAccommodate,
            500 => Self::SyntaxError,
            501 => Self::ParameterSyntaxError,
            502 => Self::NotImplemented,
            503 => Self::BadSequence,
            504 => Self::ParameterNotImplemented,
            550 => Self::MailboxUnavailable,
            551 => Self::UserNotLocal,
            552 => Self::ExceededStorage,
            553 => Self::MailboxNameNotAllowed,
            554 => Self::TransactionFailed,
            555 => Self::ParametersNotRecognized,
            other => Self::Other(other),
        }
    }

    /// Returns the numeric code.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::SystemStatus => 211,
            Self::HelpMessage => 214,
            Self::ServiceReady => 220,
            Self::ServiceClosing => 221,
            Self::Ok => 250,
            Self::UserNotLocalWillForward => 251,
            Self::CannotVerify => 252,
            Self::StartMailInput => 354,
            Self::ServiceNotAvailable => 421,
            Self::MailboxBusy => 450,
            Self::LocalError => 451,
            Self::InsufficientStorage => 452,
            Self::UnableToAccommodate => 455,
            Self::SyntaxError => 500,
            Self::ParameterSyntaxError => 501,
            Self::NotImplemented => 502,
            Self::BadSequence => 503,
            Self::ParameterNotImplemented => 504,
            Self::MailboxUnavailable => 550,
            Self::UserNotLocal => 551,
            Self::ExceededStorage => 552,
            Self::MailboxNameNotAllowed => 553,
            Self::TransactionFailed => 554,
            Self::ParametersNotRecognized => 555,
            Self::Other(code) => code,
        }
    }

    /// Returns the outcome class of this code.
    #[must_use]
    pub const fn category(self) -> Category {
        classify(self.as_u16())
    }

    /// Returns true if this is a negative code (4xx, 5xx).
    #[must_use]
    pub const fn is_error(self) -> bool {
        self.category().is_error()
    }

    /// Returns true if this is a success code (2xx).
    #[must_use]
    pub const fn is_success(self) -> bool {
        matches!(self.category(), Category::Success)
    }

    /// Returns true if this is a transient error (4xx).
    #[must_use]
    pub const fn is_transient(self) -> bool {
        matches!(self.category(), Category::TransientFailure)
    }

    /// Returns true if this is a permanent error (5xx).
    #[must_use]
    pub const fn is_permanent(self) -> bool {
        matches!(self.category(), Category::PermanentFailure)
    }

    /// Human-readable reason used when reporting this code.
    #[must_use]
    pub const fn reason(self) -> &'static str {
        match self {
            Self::SystemStatus => "system status",
            Self::HelpMessage => "help message",
            Self::ServiceReady => "service ready",
            Self::ServiceClosing => "service closing transmission channel",
            Self::Ok => "requested mail action okay, completed",
            Self::UserNotLocalWillForward => "user not local; will forward",
            Self::CannotVerify => {
                "cannot verify user, but will accept message and attempt delivery"
            }
            Self::StartMailInput => "start mail input",
            Self::ServiceNotAvailable => "service not available",
            Self::MailboxBusy => "requested mail action not taken: mailbox unavailable",
            Self::LocalError => "requested action aborted: local error in processing",
            Self::InsufficientStorage => "requested action not taken: insufficient system storage",
            Self::UnableToAccommodate => "server unable to accommodate parameters",
            Self::SyntaxError => "syntax error, command unrecognized",
            Self::ParameterSyntaxError => "syntax error in parameters or arguments",
            Self::NotImplemented => "command not implemented",
            Self::BadSequence => "bad sequence of commands",
            Self::ParameterNotImplemented => "command parameter not implemented",
            Self::MailboxUnavailable => "requested action not taken: mailbox unavailable",
            Self::UserNotLocal => "user not local; please try <forward-path>",
            Self::ExceededStorage => "requested mail action aborted: exceeded storage allocation",
            Self::MailboxNameNotAllowed => "requested action not taken: mailbox name not allowed",
            Self::TransactionFailed => "transaction failed",
            Self::ParametersNotRecognized => {
                "MAIL FROM/RCPT TO parameters not recognized or not implemented"
            }
            Self::Other(code) => match classify(code) {
                Category::Informational => "positive intermediate reply",
                Category::Success => "positive completion",
                Category::TransientFailure => "transient negative completion",
                Category::PermanentFailure => "permanent negative completion",
            },
        }
    }
}

impl From<u16> for ReplyCode {
    fn from(code: u16) -> Self {
        Self::from_u16(code)
    }
}

impl fmt::Display for ReplyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// SMTP reply from server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    /// Reply code (e.g., 250).
    pub code: ReplyCode,
    /// Text of each line, separator stripped.
    pub lines: Vec<String>,
}

impl Reply {
    /// Creates a new reply.
    #[must_use]
    #[allow(clippy::missing_const_for_fn)] // Vec is not const-compatible
    pub fn new(code: ReplyCode, lines: Vec<String>) -> Self {
        Self { code, lines }
    }

    /// Returns the outcome class of this reply.
    #[must_use]
    pub const fn category(&self) -> Category {
        self.code.category()
    }

    /// Returns true if this is a negative reply (4xx, 5xx).
    #[must_use]
    pub const fn is_error(&self) -> bool {
        self.code.is_error()
    }

    /// Returns the message as a single line.
    ///
    /// Line texts are trimmed, empty ones dropped, and the rest joined
    /// with one space.
    #[must_use]
    pub fn message(&self) -> String {
        self.lines
            .iter()
            .map(|line| line.trim())
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code, self.message())
    }
}
