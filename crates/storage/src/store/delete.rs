#![forbid(unsafe_code)]

use super::{NodeStore, StoreError};
use nk_core::model::NodeKind;
use nk_core::paths::NodePath;

impl NodeStore {
    /// Removes the node at `path`; a container goes with all it holds.
    pub fn delete(&mut self, path: &NodePath) -> Result<(), StoreError> {
        super::reject_root(path, "delete")?;
        let removed = self.write(|tx| {
            let (_, row) = super::node_at_tx(tx, path)?;
            match row.kind {
                NodeKind::Entry => {
                    super::delete_entry_tx(tx, row.id)?;
                    Ok(1)
                }
                NodeKind::Container => super::delete_container_tx(tx, row.id),
            }
        })?;
        log::info!("deleted {path} ({removed} nodes)");
        Ok(())
    }

    /// Removes every direct child of the container at `path`, keeping the
    /// container itself.
    pub fn empty(&mut self, path: &NodePath) -> Result<(), StoreError> {
        super::reject_root(path, "empty")?;
        let removed = self.write(|tx| {
            let (_, container) = super::container_at_tx(tx, path)?;
            let mut removed = 0usize;
            for child in super::children_tx(tx, container.id)? {
                match child.kind {
                    NodeKind::Entry => {
                        super::delete_entry_tx(tx, child.id)?;
                        removed += 1;
                    }
                    NodeKind::Container => {
                        removed += super::delete_container_tx(tx, child.id)?;
                    }
                }
            }
            Ok(removed)
        })?;
        log::info!("emptied {path} ({removed} nodes)");
        Ok(())
    }
}
