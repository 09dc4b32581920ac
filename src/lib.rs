//! teamkv - a revisioned key-value store for team chat
//!
//! teamkv is a chat bot that listens on one team channel and answers
//! `!storage` commands against a namespaced key-value store. Every entry
//! carries a revision so concurrent writers can use optimistic concurrency:
//! a write that names a stale revision is rejected instead of applied.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, wires the bot)
//! - [`bot`] - Dispatcher and service loop
//! - [`command`] - Message grammar; a leaf with no I/O
//! - [`store`] - Storage contract and backends (memory, file)
//! - [`transport`] - Chat transport contract and backends (stdio, mock)
//! - [`core`] - Domain types and configuration
//! - [`ui`] - Terminal output
//!
//! # Correctness Invariants
//!
//! teamkv maintains the following invariants:
//!
//! 1. Revisions of one entry increase by exactly one on every accepted write
//!    and are never reused, across delete and re-put cycles
//! 2. A conditional write applies only when its revision is current; on
//!    conflict the entry is unchanged
//! 3. Delete leaves a tombstone; entries are never physically removed
//! 4. One message is handled at a time and the chat session is released
//!    exactly once

pub mod bot;
pub mod cli;
pub mod command;
pub mod core;
pub mod store;
pub mod transport;
pub mod ui;
