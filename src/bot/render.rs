//! bot::render
//!
//! Reply text for command outcomes.
//!
//! All user-visible wording lives here so the dispatcher only decides
//! *which* message to send.

use crate::command::{ParseError, COMMAND_PREFIX};
use crate::core::types::{Entry, EntryState, Namespace};
use crate::store::{EntryKeyRow, WriteResult};

/// Usage text returned by `help`.
pub const HELP_TEXT: &str = "Available commands:\n\
`!storage put <namespace> <key> <value> (<revision>)`\n\
`!storage get <namespace> <key>`\n\
`!storage delete <namespace> <key> (<revision>)`\n\
`!storage list`  // list namespaces\n\
`!storage list <namespace>`  // list entries in namespace";

pub const NO_NAMESPACES: &str = "There are no namespaces.";

pub const NO_ENTRY_KEYS: &str = "There are no entryKeys in this namespace.";

pub fn help() -> &'static str {
    HELP_TEXT
}

pub fn namespaces(namespaces: &[Namespace]) -> String {
    if namespaces.is_empty() {
        return NO_NAMESPACES.to_string();
    }
    namespaces
        .iter()
        .map(Namespace::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

pub fn entry_keys(rows: &[EntryKeyRow]) -> String {
    if rows.is_empty() {
        return NO_ENTRY_KEYS.to_string();
    }
    rows.iter()
        .map(|row| row.entry_key.as_str())
        .collect::<Vec<_>>()
        .join(",")
}

pub fn entry(entry: &Entry) -> String {
    let path = format!("{}/{}", entry.namespace, entry.entry_key);
    match &entry.state {
        EntryState::Present { value, revision } => {
            format!("{}: {} at revision {}.", path, value, revision)
        }
        EntryState::Deleted { revision } => format!("{} was deleted in revision {}.", path, revision),
        EntryState::Absent => format!("{} does not exist.", path),
    }
}

pub fn put(result: &WriteResult) -> String {
    format!(
        "{} is now at revision {}.",
        result.entry_key, result.revision
    )
}

pub fn delete(result: &WriteResult) -> String {
    format!(
        "{} has been deleted, new revision {}.",
        result.entry_key, result.revision
    )
}

pub fn shutdown_ack(sender: &str) -> String {
    format!("Bot shutting down by {}'s command.", sender)
}

/// Apology for malformed arguments, with the verb's usage line when known.
pub fn parse_failure(err: &ParseError) -> String {
    let mut message = format!("Sorry, I couldn't understand that: {}.", err);
    if let Some(usage) = err.verb().and_then(usage_line) {
        message.push_str("\nUsage: ");
        message.push_str(usage);
    }
    message
}

/// The help line(s) describing `verb`.
fn usage_line(verb: &str) -> Option<&'static str> {
    let needle = format!("`{} {} ", COMMAND_PREFIX, verb);
    let exact = format!("`{} {}`", COMMAND_PREFIX, verb);
    HELP_TEXT
        .lines()
        .find(|line| line.starts_with(&needle) || line.starts_with(&exact))
}
