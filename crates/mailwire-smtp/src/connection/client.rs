//! SMTP client session.
//!
//! Each operation writes one command and waits for its reply before
//! returning. The session keeps no transaction state: command order is
//! the caller's responsibility and the server's 503 reply is the
//! authoritative signal when it is violated.

use tokio::io::{AsyncRead, AsyncWrite};

use super::{NetStream, ServerInfo, SmtpStream};
use crate::codec::encode_data;
use crate::command::Command;
use crate::error::{Error, ReplyError, Result};
use crate::message::Message;
use crate::types::{Address, Extension, Reply, ReplyCode};

/// Outcome of a VRFY command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verification {
    /// 250: the server vouches for the mailbox.
    Verified(Reply),
    /// 251: user not local; the server will forward.
    WillForward(Reply),
    /// 252 (or any other positive code): the server declined to verify
    /// but will attempt delivery. This is not proof that the mailbox
    /// exists.
    Unverified(Reply),
}

impl Verification {
    /// Returns the underlying reply.
    #[must_use]
    pub const fn reply(&self) -> &Reply {
        match self {
            Self::Verified(reply) | Self::WillForward(reply) | Self::Unverified(reply) => reply,
        }
    }

    /// Returns true only when the server confirmed the mailbox (250/251).
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Verified(_) | Self::WillForward(_))
    }
}

/// SMTP client bound to one connected stream.
#[derive(Debug)]
pub struct Client<S = NetStream> {
    stream: SmtpStream<S>,
    greeting: Reply,
    server_info: ServerInfo,
}

impl<S: AsyncRead + AsyncWrite + Unpin> Client<S> {
    /// Wraps a raw stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// See [`Client::from_stream`].
    pub async fn new(stream: S) -> Result<Self> {
        Self::from_stream(SmtpStream::new(stream)).await
    }

    /// Creates a client from a stream and reads the server greeting.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Connect`] if the greeting is a negative reply, or a
    /// transport error if it cannot be read.
    pub async fn from_stream(mut stream: SmtpStream<S>) -> Result<Self> {
        let greeting = stream.read_reply().await?;
        if greeting.is_error() {
            tracing::warn!(code = %greeting.code, "Server rejected connection");
            return Err(Error::Connect(ReplyError::new(
                greeting.code,
                greeting.message(),
            )));
        }

        // Extract hostname from greeting (first word after code)
        let hostname = greeting
            .lines
            .first()
            .and_then(|msg| msg.split_whitespace().next())
            .unwrap_or("unknown")
            .to_string();
        tracing::info!(%hostname, code = %greeting.code, "SMTP session opened");

        Ok(Self {
            stream,
            greeting,
            server_info: ServerInfo {
                hostname,
                ..ServerInfo::default()
            },
        })
    }

    /// Returns the greeting reply.
    #[must_use]
    pub const fn greeting(&self) -> &Reply {
        &self.greeting
    }

    /// Returns the server information.
    #[must_use]
    pub const fn server_info(&self) -> &ServerInfo {
        &self.server_info
    }

    /// Returns the underlying stream, e.g. to close it.
    pub fn into_inner(self) -> S {
        self.stream.into_inner()
    }

    /// Sends EHLO and records the advertised extensions.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects the command.
    pub async fn ehlo(&mut self, domain: &str) -> Result<Reply> {
        let cmd = Command::Ehlo {
            domain: domain.to_string(),
        };
        let reply = self.command(&cmd, ReplyCode::Ok).await?;

        // First line is the server's greeting text, the rest are keywords
        self.server_info.extensions = reply
            .lines
            .iter()
            .skip(1)
            .map(|line| Extension::parse(line))
            .collect();

        Ok(reply)
    }

    /// Sends HELO. Clears any extensions learned from an earlier EHLO.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects the command.
    pub async fn helo(&mut self, domain: &str) -> Result<Reply> {
        let cmd = Command::Helo {
            domain: domain.to_string(),
        };
        let reply = self.command(&cmd, ReplyCode::Ok).await?;
        self.server_info.extensions.clear();
        Ok(reply)
    }

    /// Starts a mail transaction.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects the sender.
    pub async fn mail_from(&mut self, from: &Address) -> Result<Reply> {
        let cmd = Command::MailFrom { from: from.clone() };
        self.command(&cmd, ReplyCode::Ok).await
    }

    /// Adds a recipient to the transaction.
    ///
    /// 251 and 252 are accepted as well as 250.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects the recipient.
    pub async fn rcpt_to(&mut self, to: &Address) -> Result<Reply> {
        let cmd = Command::RcptTo { to: to.clone() };
        self.command(&cmd, ReplyCode::Ok).await
    }

    /// Sends DATA, then the message, then the end-of-data line.
    ///
    /// The message is dot-stuffed and its line endings normalized to CRLF.
    /// It is only transmitted after the server's 354.
    ///
    /// # Errors
    ///
    /// Returns a classified error if either reply is negative, or
    /// [`Error::UnexpectedReply`] if DATA is answered with something other
    /// than 354.
    pub async fn data(&mut self, message: &[u8]) -> Result<Reply> {
        self.stream.send_line(&Command::Data.to_string()).await?;
        let reply = self.stream.read_reply().await?;
        tracing::debug!(code = %reply.code, "DATA reply");
        if reply.code != ReplyCode::StartMailInput {
            return Err(Self::reject(&Command::Data, ReplyCode::StartMailInput, &reply));
        }

        let payload = encode_data(message);
        tracing::debug!(bytes = payload.len(), "C: <message data>");
        self.stream.write_all(&payload).await?;

        let reply = self.stream.read_reply().await?;
        Self::check(&Command::Data, ReplyCode::Ok, reply)
    }

    /// Resets the current transaction.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects the command.
    pub async fn reset(&mut self) -> Result<Reply> {
        self.command(&Command::Rset, ReplyCode::Ok).await
    }

    /// Sends NOOP.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects the command.
    pub async fn noop(&mut self) -> Result<Reply> {
        self.command(&Command::Noop, ReplyCode::Ok).await
    }

    /// Asks the server to verify a user name or mailbox.
    ///
    /// Only [`Verification::Verified`] and [`Verification::WillForward`]
    /// confirm the mailbox; a 252 reply comes back as
    /// [`Verification::Unverified`].
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects the command.
    pub async fn vrfy(&mut self, address: &str) -> Result<Verification> {
        let cmd = Command::Vrfy {
            address: address.to_string(),
        };
        let reply = self.command(&cmd, ReplyCode::Ok).await?;

        Ok(match reply.code {
            ReplyCode::Ok => Verification::Verified(reply),
            ReplyCode::UserNotLocalWillForward => Verification::WillForward(reply),
            _ => Verification::Unverified(reply),
        })
    }

    /// Runs one complete transaction: MAIL FROM, RCPT TO, DATA.
    ///
    /// Stops at the first failing step; later commands are not sent.
    ///
    /// # Errors
    ///
    /// Returns the error of the first step that fails.
    pub async fn send_mail(
        &mut self,
        from: &Address,
        to: &Address,
        message: &Message,
    ) -> Result<Reply> {
        self.mail_from(from).await?;
        self.rcpt_to(to).await?;
        let reply = self.data(message.render().as_bytes()).await?;
        tracing::info!(%from, %to, "Message accepted");
        Ok(reply)
    }

    /// Sends QUIT and ends the session.
    ///
    /// # Errors
    ///
    /// Returns a classified error if the server rejects QUIT.
    pub async fn quit(mut self) -> Result<Reply> {
        let reply = self.command(&Command::Quit, ReplyCode::ServiceClosing).await?;
        tracing::info!(hostname = %self.server_info.hostname, "SMTP session closed");
        Ok(reply)
    }

    async fn command(&mut self, cmd: &Command, expected: ReplyCode) -> Result<Reply> {
        self.stream.send_line(&cmd.to_string()).await?;
        let reply = self.stream.read_reply().await?;
        Self::check(cmd, expected, reply)
    }

    /// Accepts any 2xx reply; 1xx/3xx become [`Error::UnexpectedReply`].
    fn check(cmd: &Command, expected: ReplyCode, reply: Reply) -> Result<Reply> {
        if reply.code.is_success() {
            Ok(reply)
        } else {
            Err(Self::reject(cmd, expected, &reply))
        }
    }

    fn reject(cmd: &Command, expected: ReplyCode, reply: &Reply) -> Error {
        let message = reply.message();
        tracing::warn!(
            command = cmd.verb(),
            code = %reply.code,
            message = %message,
            "Command rejected"
        );
        Error::from_reply(expected, reply.code, message)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::{Builder, Mock};

    async fn client(mock: Mock) -> Client<Mock> {
        Client::new(mock).await.unwrap()
    }

    fn addr(s: &str) -> Address {
        Address::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_greeting() {
        let mock = Builder::new()
            .read(b"220-mx.example.com ESMTP\r\n220 ready\r\n")
            .build();
        let client = client(mock).await;
        assert_eq!(client.greeting().code, ReplyCode::ServiceReady);
        assert_eq!(client.greeting().message(), "mx.example.com ESMTP ready");
        assert_eq!(client.server_info().hostname, "mx.example.com");
    }

    #[tokio::test]
    async fn test_greeting_rejected() {
        let mock = Builder::new().read(b"554 no SMTP service here\r\n").build();
        let err = Client::new(mock).await.unwrap_err();
        match err {
            Error::Connect(reply) => {
                assert_eq!(reply.code, ReplyCode::TransactionFailed);
                assert_eq!(reply.message, "no SMTP service here");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn test_greeting_eof() {
        let mock = Builder::new().build();
        assert!(matches!(
            Client::new(mock).await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_ehlo_parses_extensions() {
        let mock = Builder::new()
            .read(b"220 mx ready\r\n")
            .write(b"EHLO client.example.com\r\n")
            .read(b"250-mx greets client\r\n250-SIZE 1000\r\n250-8BITMIME\r\n250 STARTTLS\r\n")
            .build();
        let mut client = client(mock).await;
        let reply = client.ehlo("client.example.com").await.unwrap();
        assert_eq!(reply.code, ReplyCode::Ok);

        let info = client.server_info();
        assert_eq!(info.max_message_size(), Some(1000));
        assert!(info.supports(&Extension::EightBitMime));
        assert!(info.supports(&Extension::StartTls));
        assert_eq!(info.extensions.len(), 3);
    }

    #[tokio::test]
    async fn test_helo() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"HELO example.com\r\n")
            .read(b"250 hello\r\n")
            .build();
        let mut client = client(mock).await;
        let reply = client.helo("example.com").await.unwrap();
        assert_eq!(reply.message(), "hello");
        assert!(client.server_info().extensions.is_empty());
    }

    #[tokio::test]
    async fn test_ehlo_injection_rejected_before_write() {
        let mock = Builder::new().read(b"220 ok\r\n").build();
        let mut client = client(mock).await;
        assert!(matches!(
            client.ehlo("evil\r\nMAIL FROM:<x@y>").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test]
    async fn test_rcpt_accepts_forward() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"RCPT TO: <user@remote.example>\r\n")
            .read(b"251 User not local; will forward\r\n")
            .build();
        let mut client = client(mock).await;
        let reply = client.rcpt_to(&addr("user@remote.example")).await.unwrap();
        assert_eq!(reply.code, ReplyCode::UserNotLocalWillForward);
    }

    #[tokio::test]
    async fn test_rcpt_transient_failure() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"RCPT TO: <a@b.com>\r\n")
            .read(b"450 mailbox busy\r\n")
            .build();
        let mut client = client(mock).await;
        let err = client.rcpt_to(&addr("a@b.com")).await.unwrap_err();
        assert!(err.is_transient());
        assert_eq!(err.reply_code(), Some(ReplyCode::MailboxBusy));
        assert_eq!(err.server_message(), Some("mailbox busy"));
    }

    #[tokio::test]
    async fn test_bad_sequence_is_surfaced() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"RCPT TO: <a@b.com>\r\n")
            .read(b"503 5.5.1 need MAIL before RCPT\r\n")
            .build();
        let mut client = client(mock).await;
        let err = client.rcpt_to(&addr("a@b.com")).await.unwrap_err();
        assert!(err.is_bad_sequence());
        assert!(matches!(err, Error::Permanent(_)));
    }

    #[tokio::test]
    async fn test_data_stuffs_and_terminates() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"DATA\r\n")
            .read(b"354 go ahead\r\n")
            .write(b"line one\r\n..\r\n..dots\r\n.\r\n")
            .read(b"250 queued as 1234\r\n")
            .build();
        let mut client = client(mock).await;
        let reply = client.data(b"line one\n.\n.dots\n").await.unwrap();
        assert_eq!(reply.message(), "queued as 1234");
    }

    #[tokio::test]
    async fn test_data_rejected_before_body() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"DATA\r\n")
            .read(b"554 no valid recipients\r\n")
            .build();
        let mut client = client(mock).await;
        let err = client.data(b"body").await.unwrap_err();
        assert!(err.is_permanent());
        assert_eq!(err.reply_code(), Some(ReplyCode::TransactionFailed));
    }

    #[tokio::test]
    async fn test_data_requires_354() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"DATA\r\n")
            .read(b"250 ok\r\n")
            .build();
        let mut client = client(mock).await;
        assert!(matches!(
            client.data(b"body").await,
            Err(Error::UnexpectedReply {
                expected: ReplyCode::StartMailInput,
                ..
            })
        ));
    }

    #[tokio::test]
    async fn test_data_rejected_after_body() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"DATA\r\n")
            .read(b"354 go ahead\r\n")
            .write(b"body\r\n.\r\n")
            .read(b"552 too big\r\n")
            .build();
        let mut client = client(mock).await;
        let err = client.data(b"body").await.unwrap_err();
        assert_eq!(err.reply_code(), Some(ReplyCode::ExceededStorage));
    }

    #[tokio::test]
    async fn test_reset_and_noop() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"RSET\r\n")
            .read(b"250 flushed\r\n")
            .write(b"NOOP\r\n")
            .read(b"250 ok\r\n")
            .build();
        let mut client = client(mock).await;
        client.reset().await.unwrap();
        client.noop().await.unwrap();
    }

    #[tokio::test]
    async fn test_vrfy_outcomes() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"VRFY alice\r\n")
            .read(b"250 Alice <alice@example.com>\r\n")
            .write(b"VRFY dave\r\n")
            .read(b"251 User not local; will forward to <dave@remote.example>\r\n")
            .write(b"VRFY bob\r\n")
            .read(b"252 cannot verify, will attempt delivery\r\n")
            .write(b"VRFY carol\r\n")
            .read(b"550 no such user\r\n")
            .build();
        let mut client = client(mock).await;

        let verified = client.vrfy("alice").await.unwrap();
        assert!(verified.is_confirmed());
        assert!(matches!(verified, Verification::Verified(_)));

        let forwarded = client.vrfy("dave").await.unwrap();
        assert!(forwarded.is_confirmed());
        assert!(matches!(forwarded, Verification::WillForward(_)));
        assert_eq!(
            forwarded.reply().code,
            ReplyCode::UserNotLocalWillForward
        );

        let unverified = client.vrfy("bob").await.unwrap();
        assert!(!unverified.is_confirmed());
        assert_eq!(unverified.reply().code, ReplyCode::CannotVerify);

        let err = client.vrfy("carol").await.unwrap_err();
        assert!(err.is_permanent());
    }

    #[tokio::test]
    async fn test_quit() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"QUIT\r\n")
            .read(b"221 bye\r\n")
            .build();
        let client = client(mock).await;
        let reply = client.quit().await.unwrap();
        assert_eq!(reply.code, ReplyCode::ServiceClosing);
    }

    #[tokio::test]
    async fn test_connection_closed_mid_command() {
        let mock = Builder::new()
            .read(b"220 ok\r\n")
            .write(b"NOOP\r\n")
            .build();
        let mut client = client(mock).await;
        let err = client.noop().await.unwrap_err();
        assert!(err.is_transport());
    }
}
