#![forbid(unsafe_code)]

use super::{Container, NodeStore, StoreError};
use nk_core::model::NodeKind;
use nk_core::paths::NodePath;
use rusqlite::Connection;

impl NodeStore {
    /// Copies the node at `path` to `dest`, leaving the source untouched.
    ///
    /// A container is copied with its full subtree. When `dest` already is a
    /// container the copy is merged into it; any name collision aborts the
    /// whole copy.
    pub fn copy_node(&mut self, path: &NodePath, dest: &NodePath) -> Result<(), StoreError> {
        super::reject_root(path, "copy")?;
        if dest.is_root() {
            return Err(StoreError::InvalidDestination {
                path: dest.clone(),
                reason: "destination must name a node",
            });
        }
        let copied = self.write(|tx| copy_tx(tx, path, dest))?;
        log::info!("copied {path} to {dest} ({copied} nodes)");
        Ok(())
    }
}

fn copy_tx(conn: &Connection, path: &NodePath, dest: &NodePath) -> Result<usize, StoreError> {
    let (_, row) = super::node_at_tx(conn, path)?;
    match row.kind {
        NodeKind::Entry => {
            let (Some(name), Some(dest_parent)) = (dest.name(), dest.parent()) else {
                return Err(StoreError::InvalidDestination {
                    path: dest.clone(),
                    reason: "destination must name a node",
                });
            };
            if dest_parent.is_root() {
                return Err(StoreError::InvalidDestination {
                    path: dest.clone(),
                    reason: "an entry cannot be copied to the root",
                });
            }
            let target = super::ensure_container_path_tx(conn, &dest_parent)?;
            super::insert_entry_tx(conn, &target, name, row.value.as_deref().unwrap_or_default())?;
            Ok(1)
        }
        NodeKind::Container => {
            // Snapshot before touching the destination: it may lie inside
            // the source subtree.
            let snapshot = snapshot_subtree(conn, row.id)?;
            let target = copy_target_tx(conn, dest)?;
            write_snapshot(conn, target, &snapshot)?;
            Ok(snapshot.len())
        }
    }
}

/// Container a subtree copy lands in: reused when `dest` already is a
/// container, created otherwise. An entry already at `dest` is a collision.
fn copy_target_tx(conn: &Connection, dest: &NodePath) -> Result<Container, StoreError> {
    let (Some(name), Some(parent)) = (dest.name(), dest.parent()) else {
        return Err(StoreError::InvalidDestination {
            path: dest.clone(),
            reason: "destination must name a node",
        });
    };
    let parent = super::ensure_container_path_tx(conn, &parent)?;
    match super::child_tx(conn, parent.id(), name)? {
        Some(row) if row.kind == NodeKind::Container => Ok(Container::new(row.id, dest.clone())),
        Some(_) => Err(StoreError::AlreadyExists { path: dest.clone() }),
        None => super::create_container_tx(conn, &parent, name),
    }
}

/// One node of a copied subtree. `parent_slot` indexes the containers of the
/// copy in creation order; slot 0 is the copy's root.
#[derive(Debug)]
struct SnapshotItem {
    parent_slot: usize,
    name: String,
    kind: NodeKind,
    value: Option<Vec<u8>>,
}

/// Preorder listing of everything below `container_id`, parents before
/// children, gathered with an explicit stack.
fn snapshot_subtree(conn: &Connection, container_id: i64) -> Result<Vec<SnapshotItem>, StoreError> {
    let mut items = Vec::new();
    let mut next_slot = 1usize;
    let mut pending = vec![(container_id, 0usize)];
    while let Some((source_id, slot)) = pending.pop() {
        for child in super::children_tx(conn, source_id)? {
            if child.kind == NodeKind::Container {
                pending.push((child.id, next_slot));
                next_slot += 1;
            }
            items.push(SnapshotItem {
                parent_slot: slot,
                name: child.name,
                kind: child.kind,
                value: child.value,
            });
        }
    }
    Ok(items)
}

fn write_snapshot(
    conn: &Connection,
    target: Container,
    items: &[SnapshotItem],
) -> Result<(), StoreError> {
    let mut slots = vec![target];
    for item in items {
        let parent = &slots[item.parent_slot];
        match item.kind {
            NodeKind::Container => {
                let created = super::create_container_tx(conn, parent, &item.name)?;
                slots.push(created);
            }
            NodeKind::Entry => {
                let value = item.value.as_deref().unwrap_or_default();
                super::insert_entry_tx(conn, parent, &item.name, value)?;
            }
        }
    }
    Ok(())
}
