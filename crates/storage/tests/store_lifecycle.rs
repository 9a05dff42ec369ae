#![forbid(unsafe_code)]

use nk_core::paths::NodePath;
use nk_storage::{NodeStore, StoreError, StoreOptions};
use rusqlite::Connection;
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn options() -> StoreOptions {
    StoreOptions::default().with_lock_timeout(Duration::from_millis(100))
}

fn store_file(dir: &TempDir, name: &str) -> PathBuf {
    dir.path().join(name)
}

fn path(segments: &[&str]) -> NodePath {
    NodePath::try_new(segments.iter().copied()).expect("valid path")
}

#[test]
fn open_initializes_an_empty_store() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = store_file(&dir, "fresh.db");

    let mut store = NodeStore::new(options());
    assert!(!store.is_open());
    store.open(&file).expect("open store");

    assert!(store.is_open());
    assert!(file.exists());
    assert_eq!(store.file_path(), Some(file.as_path()));
    assert!(store.list_top_level().expect("list").is_empty());
    assert!(store.load_index().expect("index").is_empty());
}

#[test]
fn reload_observes_committed_mutations_and_is_repeatable() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = NodeStore::new(options());
    store.open(store_file(&dir, "reload.db")).expect("open store");

    store
        .add_entry(&path(&["users"]), "alice", "admin")
        .expect("add entry");
    store.reload().expect("first reload");
    store.reload().expect("second reload");

    let index = store.load_index().expect("index");
    let alice = index
        .lookup(&path(&["users", "alice"]))
        .expect("alice survives reload");
    assert_eq!(alice.value(), Some(&b"admin"[..]));
}

#[test]
fn closed_session_rejects_operations_until_reopened() {
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = NodeStore::new(options());
    store.open(store_file(&dir, "closed.db")).expect("open store");

    store.close();
    store.close();
    assert!(!store.is_open());
    assert!(matches!(store.list_top_level(), Err(StoreError::NotOpen)));
    assert!(matches!(
        store.add_container(&NodePath::root(), "users"),
        Err(StoreError::NotOpen)
    ));

    store.reload().expect("reload reopens the remembered file");
    store
        .add_container(&NodePath::root(), "users")
        .expect("add after reload");
}

#[test]
fn reload_without_a_remembered_file_is_unavailable() {
    let mut store = NodeStore::default();
    let err = store.reload().expect_err("nothing to reload");
    assert!(matches!(err, StoreError::StoreUnavailable { .. }));
}

#[test]
fn second_session_times_out_on_the_exclusive_lock() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = store_file(&dir, "locked.db");

    let mut owner = NodeStore::new(options());
    owner.open(&file).expect("owner opens");

    let mut contender = NodeStore::new(options());
    let started = Instant::now();
    let err = contender.open(&file).expect_err("lock is held");
    assert!(
        matches!(&err, StoreError::StoreUnavailable { path, .. } if path == &file),
        "unexpected error: {err}"
    );
    assert!(started.elapsed() < Duration::from_secs(5));
    assert!(!contender.is_open());

    owner.close();
    contender.open(&file).expect("lock released on close");
}

#[test]
fn garbage_file_is_unavailable_and_keeps_previous_file_for_reload() {
    let dir = tempfile::tempdir().expect("temp dir");
    let good = store_file(&dir, "good.db");
    let garbage = store_file(&dir, "garbage.db");
    std::fs::write(&garbage, "this is not a store file\n".repeat(64)).expect("write garbage");

    let mut store = NodeStore::new(options());
    store.open(&good).expect("open good file");
    store
        .add_container(&NodePath::root(), "kept")
        .expect("add container");

    let err = store.open(&garbage).expect_err("garbage must be rejected");
    assert!(matches!(err, StoreError::StoreUnavailable { .. }));
    assert!(!store.is_open());

    store.reload().expect("reload falls back to the last good file");
    assert_eq!(store.file_path(), Some(good.as_path()));
    assert!(store.find(&path(&["kept"])).expect("find").is_some());
}

#[test]
fn foreign_sqlite_database_is_rejected() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = store_file(&dir, "foreign.db");

    let conn = Connection::open(&file).expect("foreign db must open");
    conn.execute("CREATE TABLE invoices(id INTEGER PRIMARY KEY)", [])
        .expect("foreign table should be created");
    drop(conn);

    let mut store = NodeStore::new(options());
    let err = store.open(&file).expect_err("foreign schema must be rejected");
    assert!(matches!(
        err,
        StoreError::StoreUnavailable { reason, .. } if reason.contains("not part of a node store")
    ));
}

#[test]
fn missing_file_is_unavailable_when_creation_is_disabled() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = store_file(&dir, "absent.db");

    let mut store = NodeStore::new(options().with_create_if_missing(false));
    let err = store.open(&file).expect_err("missing file");
    assert!(matches!(err, StoreError::StoreUnavailable { .. }));
    assert!(!file.exists());
}

#[test]
fn open_file_takes_options_from_the_environment() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = store_file(&dir, "env.db");
    NodeStore::new(options()).open(&file).expect("create file");

    let store = NodeStore::open_file(&file).expect("open with env options");
    assert!(store.is_open());
    assert_eq!(store.options(), &StoreOptions::from_env());
    assert_eq!(store.file_path(), Some(file.as_path()));
}

#[test]
fn a_raw_exclusive_transaction_blocks_the_session_open() {
    let dir = tempfile::tempdir().expect("temp dir");
    let file = store_file(&dir, "raw.db");
    NodeStore::new(options()).open(&file).expect("create file");

    let raw = Connection::open(&file).expect("raw connection");
    raw.execute_batch("BEGIN EXCLUSIVE;").expect("raw lock");

    let mut store = NodeStore::new(options());
    assert!(matches!(
        store.open(&file),
        Err(StoreError::StoreUnavailable { path, .. }) if path == file
    ));

    raw.execute_batch("COMMIT;").expect("release raw lock");
    drop(raw);
    store.open(&file).expect("open after release");
}
