//! RFC 5322 message composition.
//!
//! A [`Message`] renders to a header block plus body. It does not apply
//! DATA-phase transparency; [`crate::codec::encode_data`] does that when
//! the message is transmitted.

use std::fmt::Write as _;

use chrono::{DateTime, FixedOffset, Local, TimeZone};

use crate::error::{Error, Result};
use crate::types::Address;

/// RFC 5322 date-time with a numeric zone, e.g. `Mon, 02 Jan 2006 15:04:05 -0700`.
const DATE_FORMAT: &str = "%a, %d %b %Y %H:%M:%S %z";

/// A single-recipient email message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    from: Address,
    to: Address,
    subject: String,
    date: DateTime<FixedOffset>,
    message_id: Option<String>,
    body: String,
}

impl Message {
    /// Starts building a message between two mailboxes.
    #[must_use]
    pub fn builder(from: Address, to: Address) -> MessageBuilder {
        MessageBuilder::new(from, to)
    }

    /// Returns the `From` mailbox.
    #[must_use]
    pub const fn sender(&self) -> &Address {
        &self.from
    }

    /// Returns the `To` mailbox.
    #[must_use]
    pub const fn recipient(&self) -> &Address {
        &self.to
    }

    /// Returns the subject.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the origination date.
    #[must_use]
    pub const fn date(&self) -> &DateTime<FixedOffset> {
        &self.date
    }

    /// Returns the message id, without angle brackets.
    #[must_use]
    pub fn message_id(&self) -> Option<&str> {
        self.message_id.as_deref()
    }

    /// Returns the body.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Renders the header block, a blank line, and the body verbatim.
    #[must_use]
    pub fn render(&self) -> String {
        let mut out = String::with_capacity(self.body.len() + 256);

        // Writing to a String cannot fail.
        let _ = write!(out, "From: <{}>\r\n", self.from);
        let _ = write!(out, "To: <{}>\r\n", self.to);
        let _ = write!(out, "Subject: {}\r\n", self.subject);
        let _ = write!(out, "Date: {}\r\n", self.date.format(DATE_FORMAT));
        if let Some(id) = &self.message_id {
            let _ = write!(out, "Message-ID: <{id}>\r\n");
        }
        out.push_str("\r\n");
        out.push_str(&self.body);

        out
    }
}

/// Builder for [`Message`].
#[derive(Debug, Clone)]
pub struct MessageBuilder {
    from: Address,
    to: Address,
    subject: String,
    date: Option<DateTime<FixedOffset>>,
    message_id: Option<String>,
    body: String,
}

impl MessageBuilder {
    /// Creates a builder with an empty subject and body.
    #[must_use]
    pub const fn new(from: Address, to: Address) -> Self {
        Self {
            from,
            to,
            subject: String::new(),
            date: None,
            message_id: None,
            body: String::new(),
        }
    }

    /// Sets the subject.
    #[must_use]
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the date; defaults to the current local time.
    #[must_use]
    pub fn date<Tz: TimeZone>(mut self, date: DateTime<Tz>) -> Self {
        self.date = Some(date.fixed_offset());
        self
    }

    /// Sets the message id. Surrounding angle brackets are optional.
    #[must_use]
    pub fn message_id(mut self, id: impl Into<String>) -> Self {
        let id = id.into();
        let id = id.trim();
        let id = id.strip_prefix('<').unwrap_or(id);
        let id = id.strip_suffix('>').unwrap_or(id);
        self.message_id = Some(id.to_string());
        self
    }

    /// Sets the body.
    #[must_use]
    pub fn body(mut self, body: impl Into<String>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the message.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if the subject or message id contains
    /// a line break, or the message id is empty or contains angle brackets
    /// or whitespace.
    pub fn build(self) -> Result<Message> {
        if self.subject.contains(['\r', '\n']) {
            return Err(Error::InvalidInput("Subject contains a line break".into()));
        }

        if let Some(id) = &self.message_id {
            if id.is_empty()
                || id
                    .chars()
                    .any(|c| c.is_whitespace() || c.is_control() || matches!(c, '<' | '>'))
            {
                return Err(Error::InvalidInput(format!("Invalid message id: {id:?}")));
            }
        }

        Ok(Message {
            from: self.from,
            to: self.to,
            subject: self.subject,
            date: self.date.unwrap_or_else(|| Local::now().fixed_offset()),
            message_id: self.message_id,
            body: self.body,
        })
    }
}
