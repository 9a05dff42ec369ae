#![forbid(unsafe_code)]

use nk_core::model::NodeKind;
use nk_core::paths::NodePath;
use nk_storage::{NodeStore, StoreError, StoreOptions};
use tempfile::TempDir;

fn open_store() -> (TempDir, NodeStore) {
    let _ = env_logger::builder().is_test(true).try_init();
    let dir = tempfile::tempdir().expect("temp dir");
    let mut store = NodeStore::new(StoreOptions::default());
    store
        .open(dir.path().join("resolve.db"))
        .expect("open store");
    (dir, store)
}

fn path(segments: &[&str]) -> NodePath {
    NodePath::try_new(segments.iter().copied()).expect("valid path")
}

#[test]
fn ensure_then_resolve_returns_the_same_container() {
    let (_dir, mut store) = open_store();
    let target = path(&["a", "b", "c"]);

    let ensured = store.ensure_container_path(&target).expect("ensure");
    let resolved = store.resolve_container(&target).expect("resolve");

    assert_eq!(resolved.path(), &target);
    assert_eq!(resolved, ensured);
    assert!(!resolved.is_root());
}

#[test]
fn ensure_is_idempotent() {
    let (_dir, mut store) = open_store();
    let target = path(&["a", "b"]);

    let first = store.ensure_container_path(&target).expect("first ensure");
    let second = store.ensure_container_path(&target).expect("second ensure");
    assert_eq!(first.id(), second.id());

    assert_eq!(store.list_top_level().expect("top level").len(), 1);
    let children = store.list_children(&path(&["a"])).expect("children");
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name(), "b");
    assert_eq!(store.load_index().expect("index").len(), 2);
}

#[test]
fn resolve_reports_the_failing_depth() {
    let (_dir, mut store) = open_store();
    store
        .ensure_container_path(&path(&["a", "b"]))
        .expect("ensure");

    let err = store
        .resolve_container(&path(&["a", "b", "missing", "deeper"]))
        .expect_err("missing segment");
    match err {
        StoreError::NotFound { path: failing, depth } => {
            assert_eq!(depth, 3);
            assert_eq!(failing, path(&["a", "b", "missing"]));
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn resolve_through_an_entry_is_a_kind_mismatch() {
    let (_dir, mut store) = open_store();
    store
        .add_entry(&path(&["a"]), "leaf", "1")
        .expect("add entry");

    let err = store
        .resolve_container(&path(&["a", "leaf"]))
        .expect_err("entry is not a container");
    assert!(matches!(
        err,
        StoreError::KindMismatch { expected: NodeKind::Container, .. }
    ));

    let err = store
        .ensure_container_path(&path(&["a", "leaf", "below"]))
        .expect_err("cannot create below an entry");
    assert!(matches!(err, StoreError::KindMismatch { .. }));
    assert!(store.find(&path(&["a", "leaf", "below"])).expect("find").is_none());
}

#[test]
fn parent_of_a_top_level_path_is_the_root() {
    let (_dir, mut store) = open_store();
    store
        .add_container(&NodePath::root(), "users")
        .expect("add container");

    let parent = store
        .resolve_parent_container(&path(&["users"]))
        .expect("parent");
    assert!(parent.is_root());
    assert!(parent.path().is_root());

    let nested = store
        .resolve_parent_container(&path(&["users", "alice"]))
        .expect("nested parent");
    assert_eq!(nested.path(), &path(&["users"]));

    assert!(store.resolve_container(&NodePath::root()).expect("root").is_root());
    assert!(matches!(
        store.resolve_parent_container(&NodePath::root()),
        Err(StoreError::RootNotApplicable { .. })
    ));
}

#[test]
fn listing_follows_store_order_and_kinds() {
    let (_dir, mut store) = open_store();
    let users = path(&["users"]);
    store.add_entry(&users, "zed", "guest").expect("zed");
    store.add_container(&users, "groups").expect("groups");
    store.add_entry(&users, "alice", "admin").expect("alice");

    let children = store.list_children(&users).expect("children");
    let names: Vec<&str> = children.iter().map(|node| node.name()).collect();
    assert_eq!(names, vec!["alice", "groups", "zed"]);
    assert_eq!(children[1].kind, NodeKind::Container);
    assert_eq!(children[1].value, None);
    assert_eq!(children[2].value(), Some(&b"guest"[..]));

    let index = store.load_index().expect("index");
    let indexed: Vec<&str> = index.children(&users).map(|node| node.name()).collect();
    assert_eq!(indexed, names);

    assert!(matches!(
        store.list_children(&path(&["nope"])),
        Err(StoreError::NotFound { depth: 1, .. })
    ));
}

#[test]
fn find_reads_single_nodes() {
    let (_dir, mut store) = open_store();
    store
        .add_entry(&path(&["cfg"]), "mode", "{\"b\": 1, \"a\": 2}")
        .expect("add entry");

    let node = store
        .find(&path(&["cfg", "mode"]))
        .expect("find")
        .expect("entry exists");
    assert_eq!(node.kind, NodeKind::Entry);
    assert_eq!(node.value(), Some(&br#"{"a":2,"b":1}"#[..]));

    let cfg = store.find(&path(&["cfg"])).expect("find").expect("container");
    assert!(cfg.is_container());
    assert!(store.find(&path(&["cfg", "other"])).expect("find").is_none());
    assert!(store.find(&NodePath::root()).expect("find root").is_none());
}
