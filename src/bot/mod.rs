//! bot
//!
//! The chat bot: command dispatch and the service loop.
//!
//! # Modules
//!
//! - [`dispatcher`] - One command in, one outcome out
//! - [`render`] - Reply wording
//! - [`service`] - Owns the transport and drives the loop
//!
//! # Example
//!
//! ```
//! use teamkv::bot::{Dispatcher, Exit, Service};
//! use teamkv::store::MemoryStore;
//! use teamkv::transport::mock::MockTransport;
//! use teamkv::transport::{ChannelId, InboundMessage};
//!
//! # tokio_test::block_on(async {
//! let transport = MockTransport::new(vec![
//!     InboundMessage::text("alice", "!storage put cfg retries 3"),
//! ]);
//! let dispatcher = Dispatcher::new(Box::new(MemoryStore::new()), "acme");
//! let channel = ChannelId::team_channel("acme", "general");
//! let service = Service::new(Box::new(transport.clone()), dispatcher, channel);
//!
//! assert_eq!(service.run().await, Ok(Exit::StreamEnded));
//! assert_eq!(transport.sent_texts(), vec!["retries is now at revision 1."]);
//! # });
//! ```

pub mod dispatcher;
pub mod render;
pub mod service;

pub use dispatcher::{DispatchError, Dispatcher, Outcome};
pub use service::{Exit, Service, Step};
