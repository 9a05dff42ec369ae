#![forbid(unsafe_code)]

use super::{NodeStore, StoreError};
use nk_core::model::NodeKind;
use nk_core::paths::NodePath;
use rusqlite::Connection;

impl NodeStore {
    /// Moves the node at `path` so that it lives at `dest`.
    ///
    /// Containers are re-parented (and renamed when the last segment
    /// changes) without copying their subtree. Missing containers along
    /// `dest` are created.
    pub fn move_node(&mut self, path: &NodePath, dest: &NodePath) -> Result<(), StoreError> {
        super::reject_root(path, "move")?;
        check_destination(path, dest)?;
        self.write(|tx| move_tx(tx, path, dest))?;
        log::info!("moved {path} to {dest}");
        Ok(())
    }
}

fn check_destination(path: &NodePath, dest: &NodePath) -> Result<(), StoreError> {
    if dest.is_root() {
        return Err(StoreError::InvalidDestination {
            path: dest.clone(),
            reason: "destination must name a node",
        });
    }
    if dest != path && dest.starts_with(path) {
        return Err(StoreError::InvalidDestination {
            path: dest.clone(),
            reason: "destination lies inside the node being moved",
        });
    }
    Ok(())
}

fn move_tx(conn: &Connection, path: &NodePath, dest: &NodePath) -> Result<(), StoreError> {
    let (parent, row) = super::node_at_tx(conn, path)?;
    let Some(new_name) = dest.name() else {
        return Err(StoreError::InvalidDestination {
            path: dest.clone(),
            reason: "destination must name a node",
        });
    };
    let dest_parent = dest.parent().unwrap_or_default();

    match row.kind {
        NodeKind::Entry => {
            if dest.len() < 2 {
                return Err(StoreError::InvalidDestination {
                    path: dest.clone(),
                    reason: "an entry cannot be moved to the root",
                });
            }
            let value = row.value.unwrap_or_default();
            super::delete_entry_tx(conn, row.id)?;
            let target = super::ensure_container_path_tx(conn, &dest_parent)?;
            super::insert_entry_tx(conn, &target, new_name, &value)
        }
        NodeKind::Container => {
            if dest == path {
                return Ok(());
            }
            let target = super::ensure_container_path_tx(conn, &dest_parent)?;
            if target.id() == parent.id() && new_name == row.name {
                return Ok(());
            }
            super::relocate_container_tx(conn, row.id, &target, new_name)?;
            Ok(())
        }
    }
}
