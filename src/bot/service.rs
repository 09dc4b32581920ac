//! bot::service
//!
//! The receive, handle, reply loop.
//!
//! # Lifecycle
//!
//! A [`Service`] owns one transport session for its whole life. Messages are
//! handled strictly one at a time. The session is closed exactly once:
//! either by an acknowledged shutdown command or when the inbound stream
//! ends.

use tracing::{debug, error, info, warn};

use super::dispatcher::{DispatchError, Dispatcher, Outcome};
use crate::transport::{ChannelId, InboundMessage, MessageContent, Transport, TransportError};

/// What the loop should do after one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Step {
    Continue,
    /// The session has been closed after a shutdown by `requested_by`.
    Shutdown { requested_by: String },
}

/// Why [`Service::run`] returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Exit {
    /// A shutdown command was acknowledged.
    Shutdown { requested_by: String },
    /// The transport delivered no more messages.
    StreamEnded,
}

pub struct Service {
    transport: Box<dyn Transport>,
    dispatcher: Dispatcher,
    channel: ChannelId,
    closed: bool,
}

impl Service {
    pub fn new(transport: Box<dyn Transport>, dispatcher: Dispatcher, channel: ChannelId) -> Self {
        info!(
            transport = transport.name(),
            store = dispatcher.store_name(),
            channel = %channel,
            "Created runner"
        );
        Self {
            transport,
            dispatcher,
            channel,
            closed: false,
        }
    }

    pub fn channel(&self) -> &ChannelId {
        &self.channel
    }

    /// Run until shutdown or end of stream.
    ///
    /// Faults from individual messages are logged and the loop continues.
    ///
    /// # Errors
    ///
    /// Returns the transport error if receiving fails. The session is
    /// closed before returning.
    pub async fn run(mut self) -> Result<Exit, TransportError> {
        info!(channel = %self.channel, "Listening");

        loop {
            let message = match self.transport.receive().await {
                Ok(Some(message)) => message,
                Ok(None) => {
                    info!("inbound stream ended");
                    self.release().await;
                    return Ok(Exit::StreamEnded);
                }
                Err(err) => {
                    error!(error = %err, "receive failed");
                    self.release().await;
                    return Err(err);
                }
            };

            match self.process(message).await {
                Ok(Step::Continue) => {}
                Ok(Step::Shutdown { requested_by }) => {
                    return Ok(Exit::Shutdown { requested_by });
                }
                Err(err) => error!(error = %err, "command failed"),
            }
        }
    }

    /// Handle one inbound message.
    ///
    /// # Errors
    ///
    /// Returns a [`DispatchError`] for faults that are not reported to the
    /// channel (unknown verb, anonymous shutdown).
    pub async fn process(&mut self, message: InboundMessage) -> Result<Step, DispatchError> {
        let body = match &message.content {
            MessageContent::Text(body) => body,
            MessageContent::Other(kind) => {
                warn!(kind = %kind, sender = %message.sender, "ignoring non-text message");
                return Ok(Step::Continue);
            }
        };
        if body.trim().is_empty() {
            debug!(sender = %message.sender, "ignoring empty message");
            return Ok(Step::Continue);
        }

        info!("Request: {} from {}", body, message.sender);

        let outcome = self.dispatcher.handle_text(body, &message.sender).await?;
        match outcome {
            None => Ok(Step::Continue),
            Some(Outcome::Reply(text)) => {
                self.reply(&text).await;
                Ok(Step::Continue)
            }
            Some(Outcome::Shutdown { ack, requested_by }) => {
                match self.shutdown(&ack).await {
                    Ok(()) => Ok(Step::Shutdown { requested_by }),
                    Err(err) => {
                        error!(error = %err, "shutdown failed");
                        self.reply(&err.to_string()).await;
                        Ok(Step::Continue)
                    }
                }
            }
        }
    }

    async fn reply(&mut self, text: &str) {
        if let Err(err) = self.transport.send(&self.channel, text).await {
            error!(error = %err, channel = %self.channel, "failed to send reply");
        }
    }

    async fn shutdown(&mut self, ack: &str) -> Result<(), TransportError> {
        self.transport.send(&self.channel, ack).await?;
        info!("Shutting down...");
        self.transport.close().await?;
        self.closed = true;
        Ok(())
    }

    async fn release(&mut self) {
        if self.closed {
            return;
        }
        match self.transport.close().await {
            Ok(()) => self.closed = true,
            Err(err) => warn!(error = %err, "failed to close transport"),
        }
    }
}
