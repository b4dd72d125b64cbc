#![allow(clippy::doc_markdown)]
//! Example: Send one message through an SMTP server
//!
//! ## Running
//!
//! ```bash
//! RUST_LOG=mailwire_smtp=debug \
//!     cargo run --package mailwire-smtp --example send -- \
//!     localhost 25 from@example.com to@example.com
//! ```
//!
//! Port 465 connects with implicit TLS, any other port with plain TCP.

use std::time::Duration;

use anyhow::{Context, bail};
use mailwire_smtp::{Address, Client, Config, Extension, Message, Security, connect};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "mailwire_smtp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let [host, port, from, to] = args.as_slice() else {
        bail!("usage: send <host> <port> <from> <to>");
    };

    let port: u16 = port.parse().context("invalid port")?;
    let security = if port == Security::Implicit.default_port() {
        Security::Implicit
    } else {
        Security::None
    };
    let config = Config::builder(host.as_str())
        .port(port)
        .security(security)
        .io_timeout(Duration::from_secs(60))
        .build();

    let from: Address = from.parse()?;
    let to: Address = to.parse()?;

    let stream = connect(&config).await?;
    let mut client = Client::from_stream(stream).await?;
    println!("Connected: {}", client.greeting());

    client.ehlo(&config.hello_name).await?;
    let info = client.server_info();
    if let Some(size) = info.max_message_size() {
        println!("Server accepts messages up to {size} bytes");
    }
    if info.supports(&Extension::StartTls) {
        println!("Server offers STARTTLS (not used)");
    }

    let message = Message::builder(from.clone(), to.clone())
        .subject("mailwire-smtp test message")
        .body("Hello from mailwire-smtp.\r\n")
        .build()?;

    let reply = client.send_mail(&from, &to, &message).await?;
    println!("Accepted: {reply}");

    client.quit().await?;
    Ok(())
}
