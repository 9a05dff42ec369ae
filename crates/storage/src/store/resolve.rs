#![forbid(unsafe_code)]

use super::{Container, NodeStore, StoreError};
use nk_core::paths::NodePath;

impl NodeStore {
    /// Walks `path` from the root. Fails at the first missing segment with
    /// `NotFound`, naming the depth reached.
    pub fn resolve_container(&self, path: &NodePath) -> Result<Container, StoreError> {
        self.read(|conn| super::resolve_container_tx(conn, path))
    }

    pub fn resolve_parent_container(&self, path: &NodePath) -> Result<Container, StoreError> {
        self.read(|conn| super::resolve_parent_container_tx(conn, path))
    }

    pub fn ensure_container_path(&mut self, path: &NodePath) -> Result<Container, StoreError> {
        let container = self.write(|tx| super::ensure_container_path_tx(tx, path))?;
        log::debug!("ensured container path {path}");
        Ok(container)
    }
}
