//! command
//!
//! Chat command grammar.
//!
//! # Grammar
//!
//! ```text
//! !storage help
//! !storage list [<namespace>]
//! !storage get <namespace> <key>
//! !storage put <namespace> <key> <value> [<revision>]
//! !storage delete <namespace> <key> [<revision>]
//! !storage shutdown
//! ```
//!
//! Tokens are separated by whitespace. Messages that do not start with
//! [`COMMAND_PREFIX`] are not addressed to the bot and parse to `Ok(None)`.
//!
//! This module is a leaf: it depends on nothing but [`crate::core::types`].

mod parse;

pub use parse::{parse, ParseError};

use crate::core::types::{EntryKey, Namespace, Revision};

/// Prefix every bot command starts with.
pub const COMMAND_PREFIX: &str = "!storage";

/// A parsed chat command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show usage text.
    Help,
    /// List the team's namespaces.
    ListNamespaces,
    /// List live keys in a namespace.
    ListKeys(Namespace),
    /// Read one entry.
    Get(Namespace, EntryKey),
    /// Write a value, optionally conditional on the current revision.
    Put {
        namespace: Namespace,
        key: EntryKey,
        value: String,
        revision: Option<Revision>,
    },
    /// Tombstone an entry, optionally conditional on the current revision.
    Delete {
        namespace: Namespace,
        key: EntryKey,
        revision: Option<Revision>,
    },
    /// Stop the bot.
    Shutdown,
    /// Addressed to the bot but the verb is not recognized. Holds the raw text.
    Unknown(String),
}

impl Command {
    /// Verb name used in logs.
    pub fn verb(&self) -> &'static str {
        match self {
            Command::Help => "help",
            Command::ListNamespaces | Command::ListKeys(_) => "list",
            Command::Get(..) => "get",
            Command::Put { .. } => "put",
            Command::Delete { .. } => "delete",
            Command::Shutdown => "shutdown",
            Command::Unknown(_) => "unknown",
        }
    }
}
