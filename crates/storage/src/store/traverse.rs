#![forbid(unsafe_code)]

use super::{NodeStore, StoreError};
use nk_core::index::NodeIndex;
use nk_core::model::{Node, NodeKind};
use nk_core::paths::NodePath;
use rusqlite::Connection;

impl NodeStore {
    pub fn list_top_level(&self) -> Result<Vec<Node>, StoreError> {
        self.list_children(&NodePath::root())
    }

    pub fn list_children(&self, path: &NodePath) -> Result<Vec<Node>, StoreError> {
        self.read(|conn| {
            let container = super::resolve_container_tx(conn, path)?;
            super::children_tx(conn, container.id())?
                .into_iter()
                .map(|row| row.into_node(path))
                .collect()
        })
    }

    /// Reads one node straight from the store; `None` when nothing lives at
    /// `path` (the root is never a node).
    pub fn find(&self, path: &NodePath) -> Result<Option<Node>, StoreError> {
        if path.is_root() {
            return Ok(None);
        }
        self.read(|conn| match super::node_at_tx(conn, path) {
            Ok((parent, row)) => Ok(Some(row.into_node(parent.path())?)),
            Err(StoreError::NotFound { .. } | StoreError::KindMismatch { .. }) => Ok(None),
            Err(err) => Err(err),
        })
    }

    /// Full traversal of the store into a fresh index.
    pub fn load_index(&self) -> Result<NodeIndex, StoreError> {
        let nodes = self.read(collect_nodes)?;
        log::debug!("loaded node index ({} nodes)", nodes.len());
        Ok(NodeIndex::from_nodes(nodes))
    }
}

fn collect_nodes(conn: &Connection) -> Result<Vec<Node>, StoreError> {
    let mut nodes = Vec::new();
    let mut pending = vec![(super::ROOT_ID, NodePath::root())];
    while let Some((container_id, path)) = pending.pop() {
        for row in super::children_tx(conn, container_id)? {
            let id = row.id;
            let node = row.into_node(&path)?;
            if node.kind == NodeKind::Container {
                pending.push((id, node.path.clone()));
            }
            nodes.push(node);
        }
    }
    Ok(nodes)
}
