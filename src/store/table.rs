//! store::table
//!
//! In-process entry table shared by the bundled backends.
//!
//! # Layout
//!
//! `team -> namespace -> key -> EntryState`. Only `Present` and `Deleted`
//! states are stored; a missing key is `Absent`. Maps are ordered so
//! listings come out sorted without an extra pass.
//!
//! The table is plain data (serde) so the file backend can persist it as
//! JSON; all revision checks live here so every backend agrees on them.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::traits::{EntryKeyRow, StoreError, WriteResult};
use crate::core::types::{Entry, EntryKey, EntryState, Namespace, Revision};

type Entries = BTreeMap<EntryKey, EntryState>;

/// All entries for all teams.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Table {
    teams: BTreeMap<String, BTreeMap<Namespace, Entries>>,
}

impl Table {
    pub fn new() -> Self {
        Self::default()
    }

    fn entries(&self, team: &str, namespace: &Namespace) -> Option<&Entries> {
        self.teams.get(team).and_then(|ns| ns.get(namespace))
    }

    fn state(&self, team: &str, namespace: &Namespace, key: &EntryKey) -> EntryState {
        self.entries(team, namespace)
            .and_then(|entries| entries.get(key))
            .cloned()
            .unwrap_or(EntryState::Absent)
    }

    fn set_state(&mut self, team: &str, namespace: &Namespace, key: &EntryKey, state: EntryState) {
        self.teams
            .entry(team.to_string())
            .or_default()
            .entry(namespace.clone())
            .or_default()
            .insert(key.clone(), state);
    }

    pub fn list_namespaces(&self, team: &str) -> Vec<Namespace> {
        let Some(namespaces) = self.teams.get(team) else {
            return Vec::new();
        };
        namespaces
            .iter()
            .filter(|(_, entries)| entries.values().any(EntryState::is_present))
            .map(|(ns, _)| ns.clone())
            .collect()
    }

    pub fn list_entry_keys(&self, team: &str, namespace: &Namespace) -> Vec<EntryKeyRow> {
        let Some(entries) = self.entries(team, namespace) else {
            return Vec::new();
        };
        entries
            .iter()
            .filter(|(_, state)| state.is_present())
            .map(|(key, state)| EntryKeyRow {
                entry_key: key.clone(),
                revision: state.revision(),
            })
            .collect()
    }

    pub fn get(&self, team: &str, namespace: &Namespace, key: &EntryKey) -> Entry {
        Entry {
            namespace: namespace.clone(),
            entry_key: key.clone(),
            state: self.state(team, namespace, key),
        }
    }

    pub fn put(
        &mut self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        value: &str,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError> {
        let current = self.state(team, namespace, key).revision();
        check_revision(namespace, key, revision, current)?;

        let next = next_revision(namespace, key, current)?;
        self.set_state(
            team,
            namespace,
            key,
            EntryState::Present {
                value: value.to_string(),
                revision: next,
            },
        );
        Ok(WriteResult {
            entry_key: key.clone(),
            revision: next,
        })
    }

    pub fn delete(
        &mut self,
        team: &str,
        namespace: &Namespace,
        key: &EntryKey,
        revision: Option<Revision>,
    ) -> Result<WriteResult, StoreError> {
        let current = match self.state(team, namespace, key) {
            EntryState::Present { revision, .. } => revision,
            EntryState::Deleted { revision } => {
                return Err(StoreError::AlreadyDeleted {
                    namespace: namespace.clone(),
                    key: key.clone(),
                    revision,
                })
            }
            EntryState::Absent => {
                return Err(StoreError::EntryNotFound {
                    namespace: namespace.clone(),
                    key: key.clone(),
                })
            }
        };
        check_revision(namespace, key, revision, current)?;

        let next = next_revision(namespace, key, current)?;
        self.set_state(team, namespace, key, EntryState::Deleted { revision: next });
        Ok(WriteResult {
            entry_key: key.clone(),
            revision: next,
        })
    }
}

fn next_revision(
    namespace: &Namespace,
    key: &EntryKey,
    current: Revision,
) -> Result<Revision, StoreError> {
    current.next().ok_or_else(|| StoreError::RevisionExhausted {
        namespace: namespace.clone(),
        key: key.clone(),
        revision: current,
    })
}

fn check_revision(
    namespace: &Namespace,
    key: &EntryKey,
    expected: Option<Revision>,
    current: Revision,
) -> Result<(), StoreError> {
    match expected {
        Some(expected) if expected != current => Err(StoreError::RevisionConflict {
            namespace: namespace.clone(),
            key: key.clone(),
            expected,
            current,
        }),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEAM: &str = "acme";

    fn ns(s: &str) -> Namespace {
        Namespace::new(s).unwrap()
    }

    fn key(s: &str) -> EntryKey {
        EntryKey::new(s).unwrap()
    }

    #[test]
    fn first_put_starts_at_revision_one() {
        let mut table = Table::new();
        let res = table
            .put(TEAM, &ns("cfg"), &key("retries"), "3", None)
            .unwrap();
        assert_eq!(res.revision, Revision::FIRST);
        assert_eq!(res.entry_key, key("retries"));
    }

    #[test]
    fn unconditional_puts_increment_even_without_change() {
        let mut table = Table::new();
        for expected in 1..=4 {
            let res = table.put(TEAM, &ns("cfg"), &key("k"), "same", None).unwrap();
            assert_eq!(res.revision, Revision::new(expected));
        }
    }

    #[test]
    fn conditional_put_on_absent_entry_requires_zero() {
        let mut table = Table::new();
        let err = table
            .put(TEAM, &ns("cfg"), &key("k"), "v", Some(Revision::FIRST))
            .unwrap_err();
        assert!(matches!(
            err,
            StoreError::RevisionConflict { current, .. } if current == Revision::ABSENT
        ));

        let res = table
            .put(TEAM, &ns("cfg"), &key("k"), "v", Some(Revision::ABSENT))
            .unwrap();
        assert_eq!(res.revision, Revision::FIRST);
    }

    #[test]
    fn conflict_leaves_entry_unchanged() {
        let mut table = Table::new();
        table.put(TEAM, &ns("cfg"), &key("k"), "a", None).unwrap();
        table.put(TEAM, &ns("cfg"), &key("k"), "b", None).unwrap();
        let before = table.clone();

        let err = table
            .put(TEAM, &ns("cfg"), &key("k"), "c", Some(Revision::new(1)))
            .unwrap_err();
        assert_eq!(
            err,
            StoreError::RevisionConflict {
                namespace: ns("cfg"),
                key: key("k"),
                expected: Revision::new(1),
                current: Revision::new(2),
            }
        );
        assert_eq!(table, before);
    }

    #[test]
    fn delete_leaves_tombstone_and_reput_continues() {
        let mut table = Table::new();
        table.put(TEAM, &ns("cfg"), &key("k"), "a", None).unwrap();
        let del = table.delete(TEAM, &ns("cfg"), &key("k"), None).unwrap();
        assert_eq!(del.revision, Revision::new(2));
        assert_eq!(
            table.get(TEAM, &ns("cfg"), &key("k")).state,
            EntryState::Deleted {
                revision: Revision::new(2)
            }
        );

        let put = table.put(TEAM, &ns("cfg"), &key("k"), "b", None).unwrap();
        assert_eq!(put.revision, Revision::new(3));
    }

    #[test]
    fn conditional_put_on_tombstone_uses_tombstone_revision() {
        let mut table = Table::new();
        table.put(TEAM, &ns("cfg"), &key("k"), "a", None).unwrap();
        table.delete(TEAM, &ns("cfg"), &key("k"), None).unwrap();
        let res = table
            .put(TEAM, &ns("cfg"), &key("k"), "b", Some(Revision::new(2)))
            .unwrap();
        assert_eq!(res.revision, Revision::new(3));
    }

    #[test]
    fn delete_absent_fails() {
        let mut table = Table::new();
        let err = table.delete(TEAM, &ns("cfg"), &key("k"), None).unwrap_err();
        assert!(matches!(err, StoreError::EntryNotFound { .. }));
    }

    #[test]
    fn delete_tombstone_fails_even_with_matching_revision() {
        let mut table = Table::new();
        table.put(TEAM, &ns("cfg"), &key("k"), "a", None).unwrap();
        table.delete(TEAM, &ns("cfg"), &key("k"), None).unwrap();

        let err = table
            .delete(TEAM, &ns("cfg"), &key("k"), Some(Revision::new(2)))
            .unwrap_err();
        assert!(matches!(err, StoreError::AlreadyDeleted { revision, .. } if revision == Revision::new(2)));
    }

    #[test]
    fn conditional_delete_checks_revision() {
        let mut table = Table::new();
        table.put(TEAM, &ns("cfg"), &key("k"), "a", None).unwrap();
        let err = table
            .delete(TEAM, &ns("cfg"), &key("k"), Some(Revision::new(7)))
            .unwrap_err();
        assert!(matches!(err, StoreError::RevisionConflict { .. }));
        assert!(table.get(TEAM, &ns("cfg"), &key("k")).state.is_present());
    }

    #[test]
    fn listings_skip_tombstones_and_other_teams() {
        let mut table = Table::new();
        table.put(TEAM, &ns("cfg"), &key("b"), "1", None).unwrap();
        table.put(TEAM, &ns("cfg"), &key("a"), "1", None).unwrap();
        table.put(TEAM, &ns("old"), &key("gone"), "1", None).unwrap();
        table.delete(TEAM, &ns("old"), &key("gone"), None).unwrap();
        table.put("other", &ns("secret"), &key("x"), "1", None).unwrap();

        assert_eq!(table.list_namespaces(TEAM), vec![ns("cfg")]);
        let keys: Vec<_> = table
            .list_entry_keys(TEAM, &ns("cfg"))
            .into_iter()
            .map(|row| row.entry_key)
            .collect();
        assert_eq!(keys, vec![key("a"), key("b")]);
        assert!(table.list_entry_keys(TEAM, &ns("old")).is_empty());
        assert!(table.list_entry_keys(TEAM, &ns("nope")).is_empty());
        assert!(table.list_namespaces("nobody").is_empty());
    }

    #[test]
    fn writes_past_last_revision_are_rejected() {
        let mut table = Table::new();
        let last = Revision::new(u64::MAX);
        table.set_state(
            TEAM,
            &ns("cfg"),
            &key("k"),
            EntryState::Present {
                value: "v".into(),
                revision: last,
            },
        );
        let before = table.clone();
        let exhausted = StoreError::RevisionExhausted {
            namespace: ns("cfg"),
            key: key("k"),
            revision: last,
        };

        assert_eq!(
            table.put(TEAM, &ns("cfg"), &key("k"), "w", None),
            Err(exhausted.clone())
        );
        assert_eq!(
            table.delete(TEAM, &ns("cfg"), &key("k"), Some(last)),
            Err(exhausted)
        );
        assert_eq!(table, before);
    }

    #[test]
    fn table_round_trips_through_json() {
        let mut table = Table::new();
        table.put(TEAM, &ns("cfg"), &key("k"), "v", None).unwrap();
        table.delete(TEAM, &ns("cfg"), &key("k"), None).unwrap();

        let json = serde_json::to_string(&table).unwrap();
        let parsed: Table = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, table);
    }
}
