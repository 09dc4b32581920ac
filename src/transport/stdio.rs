//! transport::stdio
//!
//! Line-oriented transport over stdin/stdout.
//!
//! Each stdin line is one text message. A leading `name: ` attributes the
//! message to `name`; otherwise it is attributed to the logged-in bot user.
//! Bytes that are not valid UTF-8 are replaced with U+FFFD rather than
//! ending the session.
//! Replies are written to stdout as `[team#topic] text`.
//!
//! ```text
//! alice: !storage put cfg retries 3
//! [acme#general] retries is now at revision 1.
//! ```

use async_trait::async_trait;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Stdin};
use tracing::{debug, warn};

use super::traits::{ChannelId, InboundMessage, SendAck, Transport, TransportError};

/// Transport reading stdin and writing stdout.
pub struct StdioTransport<W = tokio::io::Stdout, R = BufReader<Stdin>> {
    input: Option<R>,
    out: W,
    default_sender: String,
    sent: u64,
    closed: bool,
}

impl StdioTransport {
    /// Open a session on the process's stdin/stdout.
    ///
    /// Unattributed lines are credited to `default_sender`.
    pub fn new(default_sender: impl Into<String>) -> Self {
        Self {
            input: Some(BufReader::new(tokio::io::stdin())),
            out: tokio::io::stdout(),
            default_sender: default_sender.into(),
            sent: 0,
            closed: false,
        }
    }
}

/// Split an input line into sender and body.
///
/// The sender prefix must be a single token followed by `": "` and must not
/// itself look like a command, so values containing colons stay intact.
pub fn split_sender<'a>(line: &'a str, default_sender: &'a str) -> (&'a str, &'a str) {
    if let Some((name, body)) = line.split_once(": ") {
        let name = name.trim();
        if !name.is_empty() && !name.starts_with('!') && !name.contains(char::is_whitespace) {
            return (name, body);
        }
    }
    (default_sender, line)
}

/// Decode one raw input line, dropping the line terminator.
///
/// Invalid UTF-8 sequences become U+FFFD.
fn decode_line(raw: &[u8]) -> String {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8_lossy(raw).into_owned()
}

fn render_reply(channel: &ChannelId, text: &str) -> String {
    format!("[{}] {}\n", channel, text)
}

#[async_trait]
impl<W, R> Transport for StdioTransport<W, R>
where
    W: AsyncWrite + Unpin + Send,
    R: AsyncBufRead + Unpin + Send,
{
    fn name(&self) -> &'static str {
        "stdio"
    }

    async fn receive(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        let Some(input) = self.input.as_mut() else {
            return Ok(None);
        };
        let mut raw = Vec::new();
        let read = input
            .read_until(b'\n', &mut raw)
            .await
            .map_err(|e| TransportError::ReceiveFailed(e.to_string()))?;
        if read == 0 {
            return Ok(None);
        }

        let line = decode_line(&raw);
        if std::str::from_utf8(&raw).is_err() {
            warn!(bytes = read, "stdin line is not valid UTF-8, decoded lossily");
        }
        let (sender, body) = split_sender(&line, &self.default_sender);
        debug!(sender, "stdin message");
        Ok(Some(InboundMessage::text(sender, body)))
    }

    async fn send(&mut self, channel: &ChannelId, text: &str) -> Result<SendAck, TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.out
            .write_all(render_reply(channel, text).as_bytes())
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        self.out
            .flush()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))?;
        self.sent += 1;
        Ok(SendAck {
            message_id: self.sent,
        })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        if self.closed {
            return Err(TransportError::Closed);
        }
        self.closed = true;
        self.input = None;
        self.out
            .flush()
            .await
            .map_err(|e| TransportError::SendFailed(e.to_string()))
    }
}
