//! SMTP command builder.
//!
//! Commands render without the trailing CRLF; the line writer adds it.

use std::fmt;

use crate::types::Address;

/// SMTP command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// HELO - Simple greeting
    Helo {
        /// Client domain
        domain: String,
    },
    /// EHLO - Extended greeting
    Ehlo {
        /// Client domain
        domain: String,
    },
    /// MAIL FROM - Start mail transaction
    MailFrom {
        /// Reverse-path
        from: Address,
    },
    /// RCPT TO - Add recipient
    RcptTo {
        /// Forward-path
        to: Address,
    },
    /// DATA - Begin message data
    Data,
    /// RSET - Reset transaction
    Rset,
    /// VRFY - Verify address
    Vrfy {
        /// User name or mailbox to verify
        address: String,
    },
    /// NOOP - No operation
    Noop,
    /// QUIT - Close connection
    Quit,
}

impl Command {
    /// Returns the command verb.
    #[must_use]
    pub const fn verb(&self) -> &'static str {
        match self {
            Self::Helo { .. } => "HELO",
            Self::Ehlo { .. } => "EHLO",
            Self::MailFrom { .. } => "MAIL",
            Self::RcptTo { .. } => "RCPT",
            Self::Data => "DATA",
            Self::Rset => "RSET",
            Self::Vrfy { .. } => "VRFY",
            Self::Noop => "NOOP",
            Self::Quit => "QUIT",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Helo { domain } | Self::Ehlo { domain } => {
                write!(f, "{} {domain}", self.verb())
            }
            Self::MailFrom { from } => write!(f, "MAIL FROM: <{from}>"),
            Self::RcptTo { to } => write!(f, "RCPT TO: <{to}>"),
            Self::Vrfy { address } => write!(f, "VRFY {address}"),
            Self::Data | Self::Rset | Self::Noop | Self::Quit => f.write_str(self.verb()),
        }
    }
}
