//! # mailwire-smtp
//!
//! An SMTP client protocol engine implementing RFC 5321 message submission.
//!
//! ## Features
//!
//! - **Reply parsing**: single and multi-line replies, with code consistency
//!   checks across continuation lines
//! - **Reply classification**: every code maps to success, informational,
//!   transient failure or permanent failure
//! - **Transactions**: EHLO/HELO, MAIL FROM, RCPT TO, DATA (with
//!   dot-stuffing), RSET, NOOP, VRFY, QUIT
//! - **Messages**: RFC 5322 header block rendering
//! - **Transport**: any tokio stream, or plain TCP / implicit TLS via [`connect`]
//!
//! ## Quick Start
//!
//! ```ignore
//! use mailwire_smtp::{Address, Client, Config, Message, connect};
//!
//! #[tokio::main]
//! async fn main() -> mailwire_smtp::Result<()> {
//!     let config = Config::new("smtp.example.com");
//!     let stream = connect(&config).await?;
//!     let mut client = Client::from_stream(stream).await?;
//!
//!     client.ehlo(&config.hello_name).await?;
//!
//!     let from = Address::new("sender@example.com")?;
//!     let to = Address::new("recipient@example.com")?;
//!     let message = Message::builder(from.clone(), to.clone())
//!         .subject("Test")
//!         .body("Hello, World!\r\n")
//!         .build()?;
//!
//!     client.send_mail(&from, &to, &message).await?;
//!     client.quit().await?;
//!     Ok(())
//! }
//! ```
//!
//! ## Transaction order
//!
//! ```text
//! Idle ── mail_from() ──→ HaveSender ── rcpt_to() ──→ HaveRecipient ── data() ──→ Idle
//!   ↑                                                                    │
//!   └──────────────────────────── reset() ───────────────────────────────┘
//! ```
//!
//! The client does not track this state. Out-of-order commands are sent
//! as-is and the server's 503 reply comes back as [`Error::Permanent`]
//! (see [`Error::is_bad_sequence`]).
//!
//! ## Modules
//!
//! - [`codec`]: DATA-phase transparency
//! - [`command`]: SMTP command builders
//! - [`connection`]: Client session, stream and configuration
//! - [`message`]: RFC 5322 message rendering
//! - [`parser`]: Reply parser
//! - [`types`]: Core SMTP types (addresses, extensions, replies)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod codec;
pub mod command;
pub mod connection;
mod error;
pub mod message;
pub mod parser;
pub mod types;

pub use connection::{
    Client, Config, ConfigBuilder, NetStream, Security, ServerInfo, SmtpStream, Verification,
    connect,
};
pub use error::{Error, ReplyError, Result};
pub use message::{Message, MessageBuilder};
pub use types::{Address, Category, Extension, Reply, ReplyCode, classify};
