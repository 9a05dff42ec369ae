#![forbid(unsafe_code)]

use super::{NodeStore, StoreError};
use nk_core::model::NodeKind;
use nk_core::paths::NodePath;
use rusqlite::Connection;

impl NodeStore {
    /// Gives the node at `path` a new name within the same container.
    ///
    /// An entry is re-inserted under the new name and its old slot removed.
    /// A container is relabelled in place, so its whole subtree, nested
    /// containers included, comes along.
    pub fn rename(&mut self, path: &NodePath, new_name: &str) -> Result<NodePath, StoreError> {
        super::reject_root(path, "rename")?;
        let target = path.with_name(new_name)?;
        self.write(|tx| rename_tx(tx, path, new_name))?;
        log::info!("renamed {path} to {target}");
        Ok(target)
    }
}

fn rename_tx(
    conn: &Connection,
    path: &NodePath,
    new_name: &str,
) -> Result<(), StoreError> {
    let (parent, row) = super::node_at_tx(conn, path)?;
    if super::child_tx(conn, parent.id(), new_name)?.is_some() {
        return Err(StoreError::AlreadyExists {
            path: parent.path().child(new_name)?,
        });
    }

    match row.kind {
        NodeKind::Entry => {
            let value = row.value.unwrap_or_default();
            super::insert_entry_tx(conn, &parent, new_name, &value)?;
            super::delete_entry_tx(conn, row.id)
        }
        NodeKind::Container => {
            super::relocate_container_tx(conn, row.id, &parent, new_name)?;
            Ok(())
        }
    }
}
