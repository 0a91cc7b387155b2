//! Session store atomicity against instrumented and file-backed storage.

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

use pipo_console_core::routing::resolve_path;
use pipo_console_core::storage::{ACCESS_KEY, REFRESH_KEY, SlotWrite, USER_KEY};
use pipo_console_core::{FileStorage, Navigation, Screen, SessionError, SessionStore};
use pipo_console_testing::{FailingStorage, RecordingStorage, fixtures};

#[test]
fn test_set_session_is_one_batch() {
    let storage = RecordingStorage::new();
    let store = SessionStore::new(storage.clone());
    store
        .set_session("a1", "r1", &fixtures::resident("Anna Smirnova", "12"))
        .unwrap();

    let batches = storage.batches();
    assert_eq!(batches.len(), 1);
    let keys: Vec<&str> = batches[0]
        .iter()
        .map(|write| match write {
            SlotWrite::Set { key, .. } => *key,
            SlotWrite::Remove { key } => panic!("unexpected remove of {key}"),
        })
        .collect();
    assert_eq!(keys, [ACCESS_KEY, REFRESH_KEY, USER_KEY]);
}

#[test]
fn test_set_tokens_touches_only_tokens() {
    let storage = RecordingStorage::new();
    let store = SessionStore::new(storage.clone());
    store.set_tokens("a2", "r2").unwrap();

    assert_eq!(
        storage.batches(),
        vec![vec![SlotWrite::set(ACCESS_KEY, "a2"), SlotWrite::set(REFRESH_KEY, "r2")]]
    );
}

#[test]
fn test_clear_removes_every_slot_at_once() {
    let storage = RecordingStorage::new();
    let store = SessionStore::new(storage.clone());
    store.set_session("a1", "r1", &fixtures::guard("Ivan")).unwrap();
    store.clear().unwrap();

    assert_eq!(storage.batch_count(), 2);
    assert_eq!(
        storage.batches()[1],
        vec![
            SlotWrite::remove(ACCESS_KEY),
            SlotWrite::remove(REFRESH_KEY),
            SlotWrite::remove(USER_KEY)
        ]
    );
    assert_eq!(storage.slot_count(), 0);
    assert!(store.snapshot().is_none());
}

#[test]
fn test_failed_write_leaves_previous_session() {
    let storage = FailingStorage::default();
    let store = SessionStore::new(storage.clone());
    let guard = fixtures::guard("Ivan");
    store.set_session("a1", "r1", &guard).unwrap();

    storage.set_failing(true);
    let err = store.set_tokens("a2", "r2").unwrap_err();
    assert!(matches!(err, SessionError::Io(_)));

    let snapshot = store.snapshot().unwrap();
    assert_eq!(snapshot.access_token, "a1");
    assert_eq!(snapshot.refresh_token, "r1");
    assert_eq!(snapshot.user, guard);
}

#[test]
fn test_file_session_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("session.json");
    let resident = fixtures::resident("Anna Smirnova", "12");

    {
        let store = SessionStore::new(FileStorage::new(&path));
        store.set_session("a1", "r1", &resident).unwrap();
    }

    let reopened = SessionStore::new(FileStorage::new(&path));
    assert_eq!(reopened.access_token().as_deref(), Some("a1"));
    assert_eq!(reopened.user(), Some(resident));
    assert_eq!(
        resolve_path("/resident", &reopened),
        Navigation::Allow(Screen::ResidentDashboard)
    );

    reopened.clear().unwrap();
    let again = SessionStore::new(FileStorage::new(&path));
    assert!(again.snapshot().is_none());
    assert_eq!(resolve_path("/resident", &again), Navigation::Redirect(Screen::Login));
}
