//! transport
//!
//! Chat transport abstraction.
//!
//! # Architecture
//!
//! The service talks to the chat backend only through the [`Transport`]
//! trait: receive one message, send one reply, close the session once.
//! Implementations:
//!
//! - [`StdioTransport`]: one message per stdin line, replies on stdout
//! - [`mock::MockTransport`]: scripted transport for tests
//!
//! Use [`create_transport`] to select one by name.

pub mod mock;
mod stdio;
mod traits;

pub use stdio::{split_sender, StdioTransport};
pub use traits::*;

use tracing::{info, warn};

use crate::core::config::Credentials;

/// Valid transport provider names.
pub fn valid_transport_names() -> &'static [&'static str] {
    &["stdio"]
}

/// The default transport provider name.
pub const DEFAULT_PROVIDER: &str = "stdio";

/// Open a transport session by provider name.
///
/// # Errors
///
/// - `NotAvailable` for unknown providers
pub fn create_transport(
    provider: &str,
    credentials: &Credentials,
) -> Result<Box<dyn Transport>, TransportError> {
    match provider {
        "stdio" => {
            if credentials.has_paper_key() {
                warn!("stdio transport does not log in; ignoring KB_PAPERKEY");
            }
            info!(username = %credentials.username, "opening stdio session");
            Ok(Box::new(StdioTransport::new(credentials.username.clone())))
        }
        other => Err(TransportError::NotAvailable(format!(
            "unknown transport provider: '{}' (valid: {})",
            other,
            valid_transport_names().join(", ")
        ))),
    }
}
