//! transport::mock
//!
//! Scripted transport for deterministic testing.
//!
//! # Design
//!
//! Inbound messages are queued up front; the stream ends when the queue is
//! empty. Replies are recorded. Clones share state, so a test can keep a
//! handle while the service owns the boxed transport.
//!
//! # Example
//!
//! ```
//! use teamkv::transport::mock::MockTransport;
//! use teamkv::transport::{ChannelId, InboundMessage, Transport};
//!
//! # tokio_test::block_on(async {
//! let mut transport = MockTransport::new(vec![InboundMessage::text("alice", "hi")]);
//! let handle = transport.clone();
//!
//! assert!(transport.receive().await.unwrap().is_some());
//! assert!(transport.receive().await.unwrap().is_none());
//!
//! let channel = ChannelId::team_channel("acme", "general");
//! transport.send(&channel, "hello").await.unwrap();
//! assert_eq!(handle.sent_texts(), vec!["hello".to_string()]);
//! # });
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use super::traits::{ChannelId, InboundMessage, SendAck, Transport, TransportError};

/// Mock transport. Thread-safe via internal `Arc<Mutex<...>>`.
#[derive(Debug, Clone, Default)]
pub struct MockTransport {
    inner: Arc<Mutex<MockTransportInner>>,
}

#[derive(Debug, Default)]
struct MockTransportInner {
    inbound: VecDeque<InboundMessage>,
    sent: Vec<(ChannelId, String)>,
    close_count: usize,
    closed: bool,
    fail_on: Option<FailOn>,
}

/// Configuration for which operation should fail.
#[derive(Debug, Clone)]
pub enum FailOn {
    /// Fail every send with the given error.
    Send(TransportError),
    /// Fail sends whose text contains the given fragment.
    SendContaining(String, TransportError),
    Receive(TransportError),
    Close(TransportError),
}

impl MockTransport {
    /// Create a transport that will deliver `inbound` in order.
    pub fn new(inbound: Vec<InboundMessage>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(MockTransportInner {
                inbound: inbound.into(),
                ..Default::default()
            })),
        }
    }

    /// Configure the transport to fail on a specific operation.
    pub fn fail_on(self, fail_on: FailOn) -> Self {
        self.lock().fail_on = Some(fail_on);
        self
    }

    /// All replies sent so far, with their channels.
    pub fn sent(&self) -> Vec<(ChannelId, String)> {
        self.lock().sent.clone()
    }

    /// Reply texts sent so far.
    pub fn sent_texts(&self) -> Vec<String> {
        self.lock().sent.iter().map(|(_, text)| text.clone()).collect()
    }

    /// Number of successful `close` calls.
    pub fn close_count(&self) -> usize {
        self.lock().close_count
    }

    /// Whether the session has been released.
    pub fn is_closed(&self) -> bool {
        self.lock().closed
    }

    /// Messages still queued.
    pub fn pending(&self) -> usize {
        self.lock().inbound.len()
    }

    fn lock(&self) -> MutexGuard<'_, MockTransportInner> {
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[async_trait]
impl Transport for MockTransport {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn receive(&mut self) -> Result<Option<InboundMessage>, TransportError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(TransportError::Closed);
        }
        if let Some(FailOn::Receive(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        Ok(inner.inbound.pop_front())
    }

    async fn send(&mut self, channel: &ChannelId, text: &str) -> Result<SendAck, TransportError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(TransportError::Closed);
        }
        match &inner.fail_on {
            Some(FailOn::Send(e)) => return Err(e.clone()),
            Some(FailOn::SendContaining(fragment, e)) if text.contains(fragment.as_str()) => {
                return Err(e.clone())
            }
            _ => {}
        }
        inner.sent.push((channel.clone(), text.to_string()));
        Ok(SendAck {
            message_id: inner.sent.len() as u64,
        })
    }

    async fn close(&mut self) -> Result<(), TransportError> {
        let mut inner = self.lock();
        if inner.closed {
            return Err(TransportError::Closed);
        }
        if let Some(FailOn::Close(e)) = &inner.fail_on {
            return Err(e.clone());
        }
        inner.closed = true;
        inner.close_count += 1;
        Ok(())
    }
}
