#![forbid(unsafe_code)]

use crate::model::Node;
use crate::paths::NodePath;
use std::collections::BTreeMap;
use std::ops::Bound;

/// Path → node table produced by a full traversal of a store.
///
/// The index is rebuilt wholesale after every structural change and never
/// patched in place. Keys are structured paths, so a segment containing the
/// display delimiter cannot alias a nested path.
#[derive(Clone, Debug, Default)]
pub struct NodeIndex {
    nodes: BTreeMap<NodePath, Node>,
}

impl NodeIndex {
    pub fn from_nodes(nodes: impl IntoIterator<Item = Node>) -> Self {
        Self {
            nodes: nodes
                .into_iter()
                .map(|node| (node.path.clone(), node))
                .collect(),
        }
    }

    pub fn lookup(&self, path: &NodePath) -> Option<&Node> {
        self.nodes.get(path)
    }

    pub fn contains(&self, path: &NodePath) -> bool {
        self.nodes.contains_key(path)
    }

    /// Direct children of `path` in name order. The root path yields the
    /// top-level containers.
    pub fn children<'a>(&'a self, path: &NodePath) -> impl Iterator<Item = &'a Node> + use<'a> {
        let parent = path.clone();
        let depth = parent.len() + 1;
        self.nodes
            .range((Bound::Excluded(path.clone()), Bound::Unbounded))
            .take_while(move |(key, _)| key.starts_with(&parent))
            .filter(move |(key, _)| key.len() == depth)
            .map(|(_, node)| node)
    }

    pub fn top_level(&self) -> impl Iterator<Item = &Node> {
        self.nodes
            .iter()
            .filter(|(key, _)| key.len() == 1)
            .map(|(_, node)| node)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
