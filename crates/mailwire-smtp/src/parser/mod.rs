//! SMTP reply parser.
//!
//! Replies are single-line or multi-line (RFC 5321 §4.2.1):
//! - Single: `250 OK\r\n`
//! - Multi: `250-First line\r\n250-Second line\r\n250 Last line\r\n`
//!
//! Every line of a multi-line reply must repeat the same code.

use crate::error::{Error, Result};
use crate::types::{Reply, ReplyCode};

/// Maximum number of lines accepted in one reply.
const MAX_REPLY_LINES: usize = 1024;

/// One framed reply line, CRLF already removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReplyLine<'a> {
    /// Numeric code, in `100..=599`.
    pub code: u16,
    /// False when the line used the `-` continuation marker.
    pub is_last: bool,
    /// Text after the separator.
    pub text: &'a str,
}

/// Frames a single reply line.
///
/// # Errors
///
/// Returns [`Error::MalformedReply`] if the line does not start with three
/// digits in `100..=599`, or the fourth character is neither `-` nor a space.
pub fn parse_reply_line(line: &str) -> Result<ReplyLine<'_>> {
    let bytes = line.as_bytes();
    if bytes.len() < 3 {
        return Err(Error::MalformedReply(format!("Reply too short: {line:?}")));
    }

    if !bytes[..3].iter().all(u8::is_ascii_digit) {
        return Err(Error::MalformedReply(format!("Invalid reply code: {line:?}")));
    }

    let code = bytes[..3]
        .iter()
        .fold(0u16, |acc, digit| acc * 10 + u16::from(digit - b'0'));
    if !(100..=599).contains(&code) {
        return Err(Error::MalformedReply(format!("Reply code out of range: {code}")));
    }

    match bytes.get(3) {
        None => Ok(ReplyLine {
            code,
            is_last: true,
            text: "",
        }),
        Some(b' ') => Ok(ReplyLine {
            code,
            is_last: true,
            text: &line[4..],
        }),
        Some(b'-') => Ok(ReplyLine {
            code,
            is_last: false,
            text: &line[4..],
        }),
        Some(_) => Err(Error::MalformedReply(format!(
            "Invalid separator after code: {line:?}"
        ))),
    }
}

/// Collects the lines of one logical reply.
#[derive(Debug, Default)]
pub struct ReplyAccumulator {
    code: Option<u16>,
    lines: Vec<String>,
}

impl ReplyAccumulator {
    /// Creates an empty accumulator.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feeds one line (without CRLF).
    ///
    /// Returns the complete reply once the final line has been pushed,
    /// after which the accumulator is empty again.
    ///
    /// # Errors
    ///
    /// Returns an error if the line is malformed, its code differs from
    /// the first line of the reply, or the reply grows past its line
    /// limit. The partial reply is discarded.
    pub fn push(&mut self, line: &str) -> Result<Option<Reply>> {
        let result = self.push_line(line);
        if result.is_err() {
            self.code = None;
            self.lines.clear();
        }
        result
    }

    fn push_line(&mut self, line: &str) -> Result<Option<Reply>> {
        let parsed = parse_reply_line(line)?;

        if self.lines.len() >= MAX_REPLY_LINES {
            return Err(Error::MalformedReply(format!(
                "Reply exceeds {MAX_REPLY_LINES} lines"
            )));
        }

        match self.code {
            Some(expected) if expected != parsed.code => {
                return Err(Error::CodeMismatch {
                    expected,
                    found: parsed.code,
                });
            }
            Some(_) => {}
            None => self.code = Some(parsed.code),
        }

        self.lines.push(parsed.text.trim().to_string());

        if !parsed.is_last {
            return Ok(None);
        }

        let code = ReplyCode::from_u16(parsed.code);
        self.code = None;
        Ok(Some(Reply::new(code, std::mem::take(&mut self.lines))))
    }

    /// Returns true if no line of a reply has been pushed yet.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.code.is_none()
    }
}

/// Parses an SMTP reply from already-split response lines.
///
/// # Errors
///
/// Returns an error if the reply is malformed, incomplete, or followed by
/// extra lines.
pub fn parse_reply<S: AsRef<str>>(lines: &[S]) -> Result<Reply> {
    let mut accumulator = ReplyAccumulator::new();
    let mut lines = lines.iter();

    while let Some(line) = lines.next() {
        if let Some(reply) = accumulator.push(line.as_ref())? {
            if lines.next().is_some() {
                return Err(Error::MalformedReply(
                    "Lines after final reply line".into(),
                ));
            }
            return Ok(reply);
        }
    }

    Err(Error::MalformedReply("Incomplete reply".into()))
}
