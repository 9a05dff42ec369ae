#![forbid(unsafe_code)]

use super::super::{Container, StoreError};
use super::{ChildRow, child_tx, create_container_tx};
use nk_core::model::NodeKind;
use nk_core::paths::NodePath;
use rusqlite::Connection;

pub(in crate::store) fn resolve_container_tx(
    conn: &Connection,
    path: &NodePath,
) -> Result<Container, StoreError> {
    let mut current = Container::root();
    for (index, segment) in path.segments().iter().enumerate() {
        let depth = index + 1;
        match child_tx(conn, current.id(), segment)? {
            Some(row) if row.kind == NodeKind::Container => {
                current = Container::new(row.id, path.prefix(depth));
            }
            Some(_) => {
                return Err(StoreError::KindMismatch {
                    path: path.prefix(depth),
                    expected: NodeKind::Container,
                });
            }
            None => {
                return Err(StoreError::NotFound {
                    path: path.prefix(depth),
                    depth,
                });
            }
        }
    }
    Ok(current)
}

/// Container holding the last segment of `path`; the root for one-segment
/// paths.
pub(in crate::store) fn resolve_parent_container_tx(
    conn: &Connection,
    path: &NodePath,
) -> Result<Container, StoreError> {
    match path.parent() {
        Some(parent) => resolve_container_tx(conn, &parent),
        None => Err(StoreError::RootNotApplicable {
            operation: "resolve the parent of",
        }),
    }
}

/// Walks `path`, creating every missing container. Existing containers are
/// reused, so repeated calls converge on the same rows.
pub(in crate::store) fn ensure_container_path_tx(
    conn: &Connection,
    path: &NodePath,
) -> Result<Container, StoreError> {
    let mut current = Container::root();
    for (index, segment) in path.segments().iter().enumerate() {
        current = match child_tx(conn, current.id(), segment)? {
            Some(row) if row.kind == NodeKind::Container => {
                Container::new(row.id, path.prefix(index + 1))
            }
            Some(_) => {
                return Err(StoreError::KindMismatch {
                    path: path.prefix(index + 1),
                    expected: NodeKind::Container,
                });
            }
            None => create_container_tx(conn, &current, segment)?,
        };
    }
    Ok(current)
}

/// Looks up the node at `path` together with the container that holds it.
pub(in crate::store) fn node_at_tx(
    conn: &Connection,
    path: &NodePath,
) -> Result<(Container, ChildRow), StoreError> {
    let Some(name) = path.name() else {
        return Err(StoreError::RootNotApplicable {
            operation: "address",
        });
    };
    let parent = resolve_parent_container_tx(conn, path)?;
    match child_tx(conn, parent.id(), name)? {
        Some(row) => Ok((parent, row)),
        None => Err(StoreError::NotFound {
            path: path.clone(),
            depth: path.len(),
        }),
    }
}

pub(in crate::store) fn entry_at_tx(
    conn: &Connection,
    path: &NodePath,
) -> Result<(Container, ChildRow), StoreError> {
    let (parent, row) = node_at_tx(conn, path)?;
    if row.kind != NodeKind::Entry {
        return Err(StoreError::KindMismatch {
            path: path.clone(),
            expected: NodeKind::Entry,
        });
    }
    Ok((parent, row))
}

pub(in crate::store) fn container_at_tx(
    conn: &Connection,
    path: &NodePath,
) -> Result<(Container, ChildRow), StoreError> {
    let (parent, row) = node_at_tx(conn, path)?;
    if row.kind != NodeKind::Container {
        return Err(StoreError::KindMismatch {
            path: path.clone(),
            expected: NodeKind::Container,
        });
    }
    Ok((parent, row))
}
