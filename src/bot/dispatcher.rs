//! bot::dispatcher
//!
//! Maps parsed commands to storage calls and renders the result.
//!
//! # Failure boundary
//!
//! Every [`Dispatcher::handle`] call is its own failure boundary. Storage
//! errors are rendered into the reply; only faults that must not reach the
//! channel come back as [`DispatchError`].

use thiserror::Error;
use tracing::{debug, warn};

use super::render;
use crate::command::{self, Command};
use crate::store::{KvStore, StoreError};

/// Faults raised by the dispatcher instead of being rendered to the channel.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchError {
    /// Addressed to the bot with a verb it does not know.
    #[error("Unknown command {0}.")]
    UnknownCommand(String),

    /// Shutdown requested by a message with no attributable sender.
    #[error("null username")]
    AnonymousShutdown,
}

/// Result of handling one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to post back to the channel.
    Reply(String),
    /// The bot should acknowledge and stop.
    Shutdown { ack: String, requested_by: String },
}

/// Routes commands for one team to a storage backend.
pub struct Dispatcher {
    store: Box<dyn KvStore>,
    team: String,
}

impl Dispatcher {
    pub fn new(store: Box<dyn KvStore>, team: impl Into<String>) -> Self {
        Self {
            store,
            team: team.into(),
        }
    }

    pub fn team(&self) -> &str {
        &self.team
    }

    pub fn store_name(&self) -> &'static str {
        self.store.name()
    }

    /// Parse and handle a raw message body.
    ///
    /// Returns `Ok(None)` when the message is not addressed to the bot.
    /// Malformed arguments produce an apology reply rather than an error.
    pub async fn handle_text(
        &self,
        body: &str,
        sender: &str,
    ) -> Result<Option<Outcome>, DispatchError> {
        match command::parse(body) {
            Ok(None) => Ok(None),
            Ok(Some(command)) => self.handle(&command, sender).await.map(Some),
            Err(err) => {
                debug!(error = %err, "malformed command");
                Ok(Some(Outcome::Reply(render::parse_failure(&err))))
            }
        }
    }

    /// Handle one parsed command on behalf of `sender`.
    ///
    /// # Errors
    ///
    /// - `UnknownCommand` for an unrecognized verb
    /// - `AnonymousShutdown` when `sender` is empty on shutdown
    pub async fn handle(&self, command: &Command, sender: &str) -> Result<Outcome, DispatchError> {
        let team = self.team.as_str();
        let store = self.store.as_ref();
        debug!(verb = command.verb(), store = store.name(), team, "dispatching");

        let result = match command {
            Command::Unknown(raw) => return Err(DispatchError::UnknownCommand(raw.clone())),
            Command::Shutdown => return shutdown(sender),
            Command::Help => Ok(render::help().to_string()),
            Command::ListNamespaces => store
                .list_namespaces(team)
                .await
                .map(|namespaces| render::namespaces(&namespaces)),
            Command::ListKeys(namespace) => store
                .list_entry_keys(team, namespace)
                .await
                .map(|rows| render::entry_keys(&rows)),
            Command::Get(namespace, key) => store
                .get(team, namespace, key)
                .await
                .map(|entry| render::entry(&entry)),
            Command::Put {
                namespace,
                key,
                value,
                revision,
            } => store
                .put(team, namespace, key, value, *revision)
                .await
                .map(|result| render::put(&result)),
            Command::Delete {
                namespace,
                key,
                revision,
            } => store
                .delete(team, namespace, key, *revision)
                .await
                .map(|result| render::delete(&result)),
        };

        Ok(Outcome::Reply(result.unwrap_or_else(|err: StoreError| {
            warn!(verb = command.verb(), error = %err, "storage call failed");
            err.to_string()
        })))
    }
}

fn shutdown(sender: &str) -> Result<Outcome, DispatchError> {
    if sender.trim().is_empty() {
        return Err(DispatchError::AnonymousShutdown);
    }
    Ok(Outcome::Shutdown {
        ack: render::shutdown_ack(sender),
        requested_by: sender.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::{EntryKey, Namespace, Revision};
    use crate::store::{FailOn, MemoryStore, StoreOperation};

    fn dispatcher() -> (Dispatcher, MemoryStore) {
        let store = MemoryStore::new();
        (Dispatcher::new(Box::new(store.clone()), "acme"), store)
    }

    async fn reply(dispatcher: &Dispatcher, body: &str) -> String {
        match dispatcher.handle_text(body, "alice").await {
            Ok(Some(Outcome::Reply(text))) => text,
            other => panic!("expected a reply to {:?}, got {:?}", body, other),
        }
    }

    #[tokio::test]
    async fn help_makes_no_storage_call() {
        let (dispatcher, store) = dispatcher();
        assert_eq!(reply(&dispatcher, "!storage help").await, render::HELP_TEXT);
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn unaddressed_message_is_ignored() {
        let (dispatcher, store) = dispatcher();
        assert_eq!(dispatcher.handle_text("lunch?", "alice").await, Ok(None));
        assert_eq!(dispatcher.handle_text("", "alice").await, Ok(None));
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn put_get_delete_cycle() {
        let (dispatcher, _) = dispatcher();

        assert_eq!(
            reply(&dispatcher, "!storage put cfg retries 3").await,
            "retries is now at revision 1."
        );
        assert_eq!(
            reply(&dispatcher, "!storage get cfg retries").await,
            "cfg/retries: 3 at revision 1."
        );
        assert_eq!(
            reply(&dispatcher, "!storage put cfg retries 5 1").await,
            "retries is now at revision 2."
        );
        assert_eq!(
            reply(&dispatcher, "!storage delete cfg retries").await,
            "retries has been deleted, new revision 3."
        );
        assert_eq!(
            reply(&dispatcher, "!storage get cfg retries").await,
            "cfg/retries was deleted in revision 3."
        );
    }

    #[tokio::test]
    async fn stale_revision_renders_conflict() {
        let (dispatcher, store) = dispatcher();
        reply(&dispatcher, "!storage put cfg retries 3").await;

        let text = reply(&dispatcher, "!storage put cfg retries 4 0").await;
        assert!(text.contains("revision conflict"), "{}", text);

        let entry = store
            .get(
                "acme",
                &Namespace::new("cfg").unwrap(),
                &EntryKey::new("retries").unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(entry.state.revision(), Revision::new(1));
    }

    #[tokio::test]
    async fn delete_of_absent_entry_renders_error() {
        let (dispatcher, _) = dispatcher();
        let text = reply(&dispatcher, "!storage delete cfg missing").await;
        assert_eq!(text, "cfg/missing does not exist");
    }

    #[tokio::test]
    async fn listings() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(
            reply(&dispatcher, "!storage list").await,
            "There are no namespaces."
        );
        assert_eq!(
            reply(&dispatcher, "!storage list cfg").await,
            "There are no entryKeys in this namespace."
        );

        reply(&dispatcher, "!storage put cfg retries 3").await;
        reply(&dispatcher, "!storage put cfg timeout 30").await;
        reply(&dispatcher, "!storage put app name kv").await;

        assert_eq!(reply(&dispatcher, "!storage list").await, "app, cfg");
        assert_eq!(
            reply(&dispatcher, "!storage list cfg").await,
            "retries,timeout"
        );
    }

    #[tokio::test]
    async fn commands_are_scoped_to_team() {
        let (dispatcher, store) = dispatcher();
        reply(&dispatcher, "!storage list").await;
        assert_eq!(
            store.operations(),
            vec![StoreOperation::ListNamespaces {
                team: "acme".into()
            }]
        );
    }

    #[tokio::test]
    async fn malformed_revision_is_an_apology() {
        let (dispatcher, store) = dispatcher();
        let text = reply(&dispatcher, "!storage put ns k v notanumber").await;
        assert!(text.starts_with("Sorry"));
        assert!(text.contains("notanumber"));
        assert!(store.operations().is_empty());
    }

    #[tokio::test]
    async fn unknown_verb_is_raised() {
        let (dispatcher, _) = dispatcher();
        let err = dispatcher
            .handle_text("!storage frobnicate x", "alice")
            .await
            .unwrap_err();
        assert_eq!(
            err,
            DispatchError::UnknownCommand("!storage frobnicate x".into())
        );
        assert_eq!(err.to_string(), "Unknown command !storage frobnicate x.");
    }

    #[tokio::test]
    async fn shutdown_requires_sender() {
        let (dispatcher, _) = dispatcher();
        assert_eq!(
            dispatcher.handle(&Command::Shutdown, "").await,
            Err(DispatchError::AnonymousShutdown)
        );
        assert_eq!(
            dispatcher.handle(&Command::Shutdown, "alice").await,
            Ok(Outcome::Shutdown {
                ack: "Bot shutting down by alice's command.".into(),
                requested_by: "alice".into(),
            })
        );
    }

    #[tokio::test]
    async fn storage_failure_is_rendered() {
        let store = MemoryStore::new().fail_on(FailOn::All(StoreError::Unavailable(
            "disk on fire".into(),
        )));
        let dispatcher = Dispatcher::new(Box::new(store), "acme");
        let text = reply(&dispatcher, "!storage list").await;
        assert_eq!(text, "storage unavailable: disk on fire");
    }
}
