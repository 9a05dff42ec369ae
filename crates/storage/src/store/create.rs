#![forbid(unsafe_code)]

use super::{NodeStore, StoreError, normalize_value};
use nk_core::paths::{NodePath, validate_segment};

impl NodeStore {
    /// Creates container `name` under `parent`, creating `parent` itself when
    /// missing. An empty `parent` means the root.
    pub fn add_container(&mut self, parent: &NodePath, name: &str) -> Result<NodePath, StoreError> {
        validate_segment(name)?;
        let created = self.write(|tx| {
            let parent = super::ensure_container_path_tx(tx, parent)?;
            super::create_container_tx(tx, &parent, name)
        })?;
        log::info!("added container {}", created.path());
        Ok(created.path().clone())
    }

    /// Stores the normalized `value` as entry `name` under `parent`.
    pub fn add_entry(
        &mut self,
        parent: &NodePath,
        name: &str,
        value: &str,
    ) -> Result<NodePath, StoreError> {
        validate_segment(name)?;
        let path = parent.child(name)?;
        if parent.is_root() {
            return Err(StoreError::InvalidDestination {
                path,
                reason: "entries cannot be created in the root",
            });
        }
        let value = normalize_value(value);
        self.write(|tx| {
            let parent = super::ensure_container_path_tx(tx, parent)?;
            super::insert_entry_tx(tx, &parent, name, &value)
        })?;
        log::info!("added entry {path} ({} bytes)", value.len());
        Ok(path)
    }

    /// Replaces the value of an existing entry with the normalized `value`.
    pub fn edit_entry(&mut self, path: &NodePath, value: &str) -> Result<(), StoreError> {
        super::reject_root(path, "edit")?;
        let value = normalize_value(value);
        self.write(|tx| {
            let (_, row) = super::entry_at_tx(tx, path)?;
            super::update_entry_tx(tx, row.id, &value)
        })?;
        log::info!("edited entry {path} ({} bytes)", value.len());
        Ok(())
    }
}
