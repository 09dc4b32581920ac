//! transport::traits
//!
//! Chat transport contract.
//!
//! # Design
//!
//! A transport is a session with a chat backend: it delivers inbound
//! messages one at a time and accepts text replies for a channel. The
//! service owns exactly one transport for its lifetime and releases it with
//! [`Transport::close`] exactly once.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from transport operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    /// The session could not be established.
    #[error("failed to connect: {0}")]
    ConnectFailed(String),

    /// Reading the inbound stream failed.
    #[error("failed to receive message: {0}")]
    ReceiveFailed(String),

    /// A reply could not be delivered.
    #[error("failed to send message: {0}")]
    SendFailed(String),

    /// The session was already released.
    #[error("transport session is closed")]
    Closed,

    /// The transport is not available in this build or configuration.
    #[error("transport not available: {0}")]
    NotAvailable(String),
}

/// Address of the conversation the bot listens on and replies to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ChannelId {
    /// Team name.
    pub team: String,
    /// Conversation membership kind; always "team" for team channels.
    pub members_type: String,
    /// Channel (topic) within the team.
    pub topic: String,
}

impl ChannelId {
    /// A channel within a team.
    pub fn team_channel(team: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            team: team.into(),
            members_type: "team".into(),
            topic: topic.into(),
        }
    }
}

impl std::fmt::Display for ChannelId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}#{}", self.team, self.topic)
    }
}

/// Content of an inbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageContent {
    /// Plain text body.
    Text(String),
    /// Any other kind (reaction, attachment, edit, ...), named by the transport.
    Other(String),
}

/// One message delivered by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Sender username. Empty when the transport could not attribute the message.
    pub sender: String,
    pub content: MessageContent,
}

impl InboundMessage {
    /// A text message from `sender`.
    pub fn text(sender: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            sender: sender.into(),
            content: MessageContent::Text(body.into()),
        }
    }
}

/// Acknowledgement for a delivered reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendAck {
    /// Transport-assigned message id.
    pub message_id: u64,
}

/// A session with a chat backend.
///
/// Methods take `&mut self`: the service drives a single transport from a
/// single task and never issues two calls at once.
#[async_trait]
pub trait Transport: Send {
    /// Transport name (e.g., "stdio").
    fn name(&self) -> &'static str;

    /// Wait for the next inbound message.
    ///
    /// Returns `Ok(None)` when the stream has ended.
    async fn receive(&mut self) -> Result<Option<InboundMessage>, TransportError>;

    /// Send a text reply to a channel.
    async fn send(&mut self, channel: &ChannelId, text: &str) -> Result<SendAck, TransportError>;

    /// Release the session. Later calls fail with [`TransportError::Closed`].
    async fn close(&mut self) -> Result<(), TransportError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_display() {
        let channel = ChannelId::team_channel("acme", "general");
        assert_eq!(channel.to_string(), "acme#general");
        assert_eq!(channel.members_type, "team");
    }

    #[test]
    fn error_display_formatting() {
        assert!(TransportError::SendFailed("timeout".into())
            .to_string()
            .contains("send"));
        assert!(TransportError::Closed.to_string().contains("closed"));
    }
}
