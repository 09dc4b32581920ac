//! Integration tests for the bot service.
//!
//! These tests drive a full conversation through `Service` with a scripted
//! `MockTransport` and a `MemoryStore`, and check what lands in the channel
//! and in the store.

use teamkv::bot::{Dispatcher, Exit, Service};
use teamkv::core::types::{EntryKey, EntryState, Namespace, Revision};
use teamkv::store::{KvStore, MemoryStore};
use teamkv::transport::mock::MockTransport;
use teamkv::transport::{ChannelId, InboundMessage};

// =============================================================================
// Test Fixtures
// =============================================================================

/// A service wired to shared handles on its store and transport.
struct Harness {
    store: MemoryStore,
    transport: MockTransport,
    service: Service,
}

impl Harness {
    fn new(team: &str, messages: &[(&str, &str)]) -> Self {
        let store = MemoryStore::new();
        let transport = MockTransport::new(
            messages
                .iter()
                .map(|(sender, body)| InboundMessage::text(*sender, *body))
                .collect(),
        );
        let service = Service::new(
            Box::new(transport.clone()),
            Dispatcher::new(Box::new(store.clone()), team),
            ChannelId::team_channel(team, "general"),
        );
        Self {
            store,
            transport,
            service,
        }
    }
}

fn ns(name: &str) -> Namespace {
    Namespace::new(name).unwrap()
}

fn key(name: &str) -> EntryKey {
    EntryKey::new(name).unwrap()
}

// =============================================================================
// Conversations
// =============================================================================

#[tokio::test]
async fn revisioned_edit_conversation() {
    let Harness {
        store,
        transport,
        service,
    } = Harness::new(
        "acme",
        &[
            ("alice", "!storage put cfg retries 3"),
            ("bob", "!storage put cfg retries 5 1"),
            ("alice", "!storage put cfg retries 7 1"),
            ("bob", "!storage delete cfg retries 2"),
            ("alice", "!storage get cfg retries"),
        ],
    );

    assert_eq!(service.run().await, Ok(Exit::StreamEnded));

    let replies = transport.sent_texts();
    assert_eq!(replies.len(), 5);
    assert_eq!(replies[0], "retries is now at revision 1.");
    assert_eq!(replies[1], "retries is now at revision 2.");
    assert!(replies[2].contains("revision conflict"), "{}", replies[2]);
    assert!(replies[2].contains("expected revision 1"), "{}", replies[2]);
    assert!(replies[2].contains("current revision is 2"), "{}", replies[2]);
    assert_eq!(replies[3], "retries has been deleted, new revision 3.");
    assert_eq!(replies[4], "cfg/retries was deleted in revision 3.");

    let entry = store.get("acme", &ns("cfg"), &key("retries")).await.unwrap();
    assert_eq!(
        entry.state,
        EntryState::Deleted {
            revision: Revision::new(3)
        }
    );
    assert!(transport.is_closed());
}

#[tokio::test]
async fn reput_after_delete_continues_revisions() {
    let Harness {
        transport, service, ..
    } = Harness::new(
        "acme",
        &[
            ("alice", "!storage put cfg retries 3"),
            ("alice", "!storage delete cfg retries"),
            ("alice", "!storage delete cfg retries"),
            ("alice", "!storage put cfg retries 4"),
            ("alice", "!storage list cfg"),
        ],
    );

    service.run().await.unwrap();

    let replies = transport.sent_texts();
    assert_eq!(replies[0], "retries is now at revision 1.");
    assert_eq!(replies[1], "retries has been deleted, new revision 2.");
    assert!(replies[2].contains("already deleted"), "{}", replies[2]);
    assert_eq!(replies[3], "retries is now at revision 3.");
    assert_eq!(replies[4], "retries");
}

#[tokio::test]
async fn tombstoned_namespace_is_not_listed() {
    let Harness {
        transport, service, ..
    } = Harness::new(
        "acme",
        &[
            ("alice", "!storage put tmp scratch 1"),
            ("alice", "!storage put cfg retries 3"),
            ("alice", "!storage list"),
            ("alice", "!storage delete tmp scratch"),
            ("alice", "!storage list"),
            ("alice", "!storage list tmp"),
        ],
    );

    service.run().await.unwrap();

    let replies = transport.sent_texts();
    assert_eq!(replies[2], "cfg, tmp");
    assert_eq!(replies[4], "cfg");
    assert_eq!(replies[5], "There are no entryKeys in this namespace.");
}

#[tokio::test]
async fn chatter_and_faults_do_not_interrupt() {
    let Harness {
        transport, service, ..
    } = Harness::new(
        "acme",
        &[
            ("alice", "good morning"),
            ("alice", "!storage"),
            ("alice", "!storage get cfg"),
            ("", "!storage shutdown"),
            ("alice", "!storage get cfg retries"),
        ],
    );

    assert_eq!(service.run().await, Ok(Exit::StreamEnded));

    let replies = transport.sent_texts();
    assert_eq!(replies.len(), 2);
    assert!(replies[0].starts_with("Sorry"));
    assert_eq!(replies[1], "cfg/retries does not exist.");
    assert_eq!(transport.close_count(), 1);
}

#[tokio::test]
async fn shutdown_stops_processing() {
    let Harness {
        store,
        transport,
        service,
    } = Harness::new(
        "acme",
        &[
            ("alice", "!storage put cfg retries 3"),
            ("carol", "!storage shutdown now please"),
            ("alice", "!storage put cfg retries 4"),
        ],
    );

    assert_eq!(
        service.run().await,
        Ok(Exit::Shutdown {
            requested_by: "carol".into()
        })
    );

    assert_eq!(
        transport.sent_texts(),
        vec![
            "retries is now at revision 1.".to_string(),
            "Bot shutting down by carol's command.".to_string(),
        ]
    );
    assert_eq!(transport.close_count(), 1);
    assert_eq!(transport.pending(), 1);

    let entry = store.get("acme", &ns("cfg"), &key("retries")).await.unwrap();
    assert_eq!(entry.state.revision(), Revision::new(1));
}

#[tokio::test]
async fn teams_are_isolated() {
    let store = MemoryStore::new();
    store
        .put("other", &ns("cfg"), &key("retries"), "9", None)
        .await
        .unwrap();

    let transport = MockTransport::new(vec![
        InboundMessage::text("alice", "!storage list"),
        InboundMessage::text("alice", "!storage get cfg retries"),
    ]);
    let service = Service::new(
        Box::new(transport.clone()),
        Dispatcher::new(Box::new(store.clone()), "acme"),
        ChannelId::team_channel("acme", "general"),
    );
    service.run().await.unwrap();

    assert_eq!(
        transport.sent_texts(),
        vec![
            "There are no namespaces.".to_string(),
            "cfg/retries does not exist.".to_string(),
        ]
    );
}
