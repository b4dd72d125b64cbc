//! Low-level SMTP stream handling.

use std::future::Future;
use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use std::time::Duration;

use rustls::pki_types::ServerName;
use tokio::io::{
    AsyncBufReadExt, AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt, BufReader, ReadBuf,
};
use tokio::net::TcpStream;
use tokio_rustls::{
    TlsConnector,
    client::TlsStream,
    rustls::{ClientConfig, RootCertStore},
};

use super::{Config, Security};
use crate::error::{Error, Result};
use crate::parser::ReplyAccumulator;
use crate::types::Reply;

/// Maximum reply line length in bytes, terminator included.
const MAX_LINE_LENGTH: usize = 64 * 1024;

/// Line-framed SMTP stream over any byte stream.
///
/// Reads are buffered; every write is flushed before returning, so a
/// command is on the wire before its reply is awaited.
#[derive(Debug)]
pub struct SmtpStream<S> {
    inner: BufReader<S>,
    timeout: Option<Duration>,
}

impl<S: AsyncRead + AsyncWrite + Unpin> SmtpStream<S> {
    /// Wraps an already-connected stream.
    pub fn new(stream: S) -> Self {
        Self {
            inner: BufReader::new(stream),
            timeout: None,
        }
    }

    /// Sets a limit for each line read and each write.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns a reference to the underlying stream.
    pub fn get_ref(&self) -> &S {
        self.inner.get_ref()
    }

    /// Returns the underlying stream. Buffered, unread input is lost.
    pub fn into_inner(self) -> S {
        self.inner.into_inner()
    }

    /// Reads one line, without its line terminator.
    ///
    /// Returns `None` on a clean EOF.
    ///
    /// # Errors
    ///
    /// Returns an error if the read fails, times out, the line is longer
    /// than the line limit, or the stream ends in the middle of a line.
    pub async fn read_line(&mut self) -> Result<Option<String>> {
        let timeout = self.timeout;
        let mut buf = Vec::new();
        let mut limited = (&mut self.inner).take(MAX_LINE_LENGTH as u64);
        let read = timed(timeout, limited.read_until(b'\n', &mut buf)).await?;
        if read == 0 {
            return Ok(None);
        }

        if buf.pop() != Some(b'\n') {
            if read >= MAX_LINE_LENGTH {
                return Err(Error::MalformedReply(format!(
                    "Reply line exceeds {MAX_LINE_LENGTH} bytes"
                )));
            }
            return Err(Error::ConnectionClosed);
        }
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }

        Ok(Some(String::from_utf8_lossy(&buf).into_owned()))
    }

    /// Reads one complete, possibly multi-line, reply.
    ///
    /// # Errors
    ///
    /// Returns an error if the stream closes before the final line, or a
    /// line is malformed or carries a different code than the first.
    pub async fn read_reply(&mut self) -> Result<Reply> {
        let mut accumulator = ReplyAccumulator::new();
        loop {
            let Some(line) = self.read_line().await? else {
                return Err(Error::ConnectionClosed);
            };
            tracing::debug!("S: {line}");

            if let Some(reply) = accumulator.push(&line)? {
                return Ok(reply);
            }
        }
    }

    /// Writes one command line followed by CRLF and flushes.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidInput`] if `line` contains CR or LF, or an
    /// error if the write fails.
    pub async fn send_line(&mut self, line: &str) -> Result<()> {
        if line.contains(['\r', '\n']) {
            return Err(Error::InvalidInput(format!(
                "Command line contains CR or LF: {line:?}"
            )));
        }

        tracing::debug!("C: {line}");
        let mut data = Vec::with_capacity(line.len() + 2);
        data.extend_from_slice(line.as_bytes());
        data.extend_from_slice(b"\r\n");
        self.write_all(&data).await
    }

    /// Writes raw bytes and flushes.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails or times out.
    pub async fn write_all(&mut self, data: &[u8]) -> Result<()> {
        let timeout = self.timeout;
        let stream = self.inner.get_mut();
        timed(timeout, async {
            stream.write_all(data).await?;
            stream.flush().await
        })
        .await
    }
}

async fn timed<T>(
    timeout: Option<Duration>,
    fut: impl Future<Output = io::Result<T>>,
) -> Result<T> {
    match timeout {
        Some(limit) => tokio::time::timeout(limit, fut)
            .await
            .map_err(|_| Error::Timeout(limit))?
            .map_err(Error::from),
        None => fut.await.map_err(Error::from),
    }
}

/// Network stream (TCP or TLS).
#[derive(Debug)]
pub enum NetStream {
    /// Plain TCP connection.
    Tcp(TcpStream),
    /// TLS-encrypted connection (boxed to reduce enum size).
    Tls(Box<TlsStream<TcpStream>>),
}

impl NetStream {
    /// Returns true if the stream is TLS-encrypted.
    #[must_use]
    pub const fn is_tls(&self) -> bool {
        matches!(self, Self::Tls(_))
    }
}

impl AsyncRead for NetStream {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_read(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_read(cx, buf),
        }
    }
}

impl AsyncWrite for NetStream {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_write(cx, buf),
            Self::Tls(stream) => Pin::new(stream).poll_write(cx, buf),
        }
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_flush(cx),
            Self::Tls(stream) => Pin::new(stream).poll_flush(cx),
        }
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        match self.get_mut() {
            Self::Tcp(stream) => Pin::new(stream).poll_shutdown(cx),
            Self::Tls(stream) => Pin::new(stream).poll_shutdown(cx),
        }
    }
}

/// Connects to an SMTP server as described by `config`.
///
/// # Errors
///
/// Returns an error if the connection or TLS handshake fails or exceeds
/// the connect timeout.
pub async fn connect(config: &Config) -> Result<SmtpStream<NetStream>> {
    let addr = format!("{}:{}", config.host, config.port);
    let limit = Some(config.connect_timeout);
    let tcp_stream = timed(limit, TcpStream::connect(&addr)).await?;

    let stream = match config.security {
        Security::None => NetStream::Tcp(tcp_stream),
        Security::Implicit => {
            let connector = create_tls_connector();
            let server_name = ServerName::try_from(config.host.clone())
                .map_err(|_| Error::InvalidInput(format!("Invalid hostname: {}", config.host)))?;
            let tls_stream = timed(limit, connector.connect(server_name, tcp_stream)).await?;
            NetStream::Tls(Box::new(tls_stream))
        }
    };

    tracing::info!(%addr, tls = stream.is_tls(), "Connected to SMTP server");
    Ok(SmtpStream::new(stream).with_timeout(config.io_timeout))
}

/// Creates a TLS connector with the webpki root certificates.
fn create_tls_connector() -> TlsConnector {
    let root_store = RootCertStore {
        roots: webpki_roots::TLS_SERVER_ROOTS.to_vec(),
    };

    let config = ClientConfig::builder()
        .with_root_certificates(root_store)
        .with_no_client_auth();

    TlsConnector::from(Arc::new(config))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[tokio::test]
    async fn test_read_line_strips_crlf() {
        let mock = Builder::new().read(b"250 ok\r\n220 bare\n").build();
        let mut stream = SmtpStream::new(mock);
        assert_eq!(stream.read_line().await.unwrap().as_deref(), Some("250 ok"));
        assert_eq!(stream.read_line().await.unwrap().as_deref(), Some("220 bare"));
        assert_eq!(stream.read_line().await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_read_line_eof_mid_line() {
        let mock = Builder::new().read(b"250 partial").build();
        let mut stream = SmtpStream::new(mock);
        assert!(matches!(
            stream.read_line().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_line_length_limit() {
        let long_line = format!("250 {}", "A".repeat(MAX_LINE_LENGTH - 4));
        let mock = Builder::new().read(long_line.as_bytes()).build();
        let mut stream = SmtpStream::new(mock);

        let err = stream.read_reply().await.unwrap_err();
        assert!(matches!(err, Error::MalformedReply(_)));
        assert!(err.to_string().contains("exceeds"));
    }

    #[tokio::test]
    async fn test_line_at_length_limit() {
        let line = format!("250 {}\r\n", "A".repeat(MAX_LINE_LENGTH - 6));
        let mock = Builder::new().read(line.as_bytes()).build();
        let mut stream = SmtpStream::new(mock);

        let reply = stream.read_reply().await.unwrap();
        assert_eq!(reply.message().len(), MAX_LINE_LENGTH - 6);
    }

    #[tokio::test]
    async fn test_read_multi_line_reply() {
        let mock = Builder::new()
            .read(b"250-first\r\n250-second\r\n250 third\r\n")
            .build();
        let mut stream = SmtpStream::new(mock);
        let reply = stream.read_reply().await.unwrap();
        assert_eq!(reply.code.as_u16(), 250);
        assert_eq!(reply.message(), "first second third");
    }

    #[tokio::test]
    async fn test_read_reply_split_across_reads() {
        let mock = Builder::new()
            .read(b"250-fir")
            .read(b"st\r\n250 se")
            .read(b"cond\r\n")
            .build();
        let mut stream = SmtpStream::new(mock);
        let reply = stream.read_reply().await.unwrap();
        assert_eq!(reply.message(), "first second");
    }

    #[tokio::test]
    async fn test_read_reply_code_mismatch() {
        let mock = Builder::new().read(b"250-first\r\n251 second\r\n").build();
        let mut stream = SmtpStream::new(mock);
        assert!(matches!(
            stream.read_reply().await,
            Err(Error::CodeMismatch {
                expected: 250,
                found: 251
            })
        ));
    }

    #[tokio::test]
    async fn test_read_reply_eof_mid_reply() {
        let mock = Builder::new().read(b"250-first\r\n").build();
        let mut stream = SmtpStream::new(mock);
        assert!(matches!(
            stream.read_reply().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_read_reply_eof_before_reply() {
        let mock = Builder::new().build();
        let mut stream = SmtpStream::new(mock);
        assert!(matches!(
            stream.read_reply().await,
            Err(Error::ConnectionClosed)
        ));
    }

    #[tokio::test]
    async fn test_read_reply_malformed() {
        let mock = Builder::new().read(b"hello there\r\n").build();
        let mut stream = SmtpStream::new(mock);
        assert!(matches!(
            stream.read_reply().await,
            Err(Error::MalformedReply(_))
        ));
    }

    #[tokio::test]
    async fn test_read_reply_io_error() {
        let mock = Builder::new()
            .read_error(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
            .build();
        let mut stream = SmtpStream::new(mock);
        assert!(matches!(stream.read_reply().await, Err(Error::Io(_))));
    }

    #[tokio::test]
    async fn test_send_line_appends_crlf() {
        let mock = Builder::new().write(b"NOOP\r\n").build();
        let mut stream = SmtpStream::new(mock);
        stream.send_line("NOOP").await.unwrap();
    }

    #[tokio::test]
    async fn test_send_line_rejects_line_breaks() {
        let mock = Builder::new().build();
        let mut stream = SmtpStream::new(mock);
        assert!(matches!(
            stream.send_line("EHLO a\r\nRSET").await,
            Err(Error::InvalidInput(_))
        ));
        assert!(matches!(
            stream.send_line("EHLO a\n").await,
            Err(Error::InvalidInput(_))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_times_out() {
        let mock = Builder::new().wait(Duration::from_secs(10)).build();
        let mut stream = SmtpStream::new(mock).with_timeout(Some(Duration::from_secs(1)));
        assert!(matches!(
            stream.read_reply().await,
            Err(Error::Timeout(limit)) if limit == Duration::from_secs(1)
        ));
    }
}
