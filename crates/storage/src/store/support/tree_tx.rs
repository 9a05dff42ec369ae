#![forbid(unsafe_code)]

use super::super::{Container, StoreError};
use nk_core::model::{Node, NodeKind};
use nk_core::paths::NodePath;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, ffi, params};

/// One slot of a container as stored: a nested container or an entry.
#[derive(Clone, Debug)]
pub(in crate::store) struct ChildRow {
    pub(in crate::store) id: i64,
    pub(in crate::store) name: String,
    pub(in crate::store) kind: NodeKind,
    pub(in crate::store) value: Option<Vec<u8>>,
}

impl ChildRow {
    pub(in crate::store) fn into_node(self, parent: &NodePath) -> Result<Node, StoreError> {
        let path = parent.child(self.name)?;
        Ok(match self.kind {
            NodeKind::Container => Node::container(path),
            NodeKind::Entry => Node::entry(path, self.value.unwrap_or_default()),
        })
    }
}

fn child_row(row: &Row<'_>) -> rusqlite::Result<ChildRow> {
    let kind = row.get::<_, String>(2)?;
    let Some(kind) = NodeKind::parse(&kind) else {
        return Err(rusqlite::Error::FromSqlConversionFailure(
            2,
            Type::Text,
            format!("unknown node kind {kind:?}").into(),
        ));
    };
    Ok(ChildRow {
        id: row.get(0)?,
        name: row.get(1)?,
        kind,
        value: row.get(3)?,
    })
}

pub(in crate::store) fn child_tx(
    conn: &Connection,
    parent_id: i64,
    name: &str,
) -> Result<Option<ChildRow>, StoreError> {
    Ok(conn
        .query_row(
            "SELECT id, name, kind, value FROM nodes WHERE parent_id=?1 AND name=?2",
            params![parent_id, name],
            child_row,
        )
        .optional()?)
}

/// Direct children in byte order of their names.
pub(in crate::store) fn children_tx(
    conn: &Connection,
    parent_id: i64,
) -> Result<Vec<ChildRow>, StoreError> {
    let mut stmt = conn.prepare_cached(
        "SELECT id, name, kind, value FROM nodes WHERE parent_id=?1 ORDER BY name ASC",
    )?;
    let rows = stmt.query_map(params![parent_id], child_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(in crate::store) fn create_container_tx(
    conn: &Connection,
    parent: &Container,
    name: &str,
) -> Result<Container, StoreError> {
    let path = parent.path().child(name)?;
    let insert = conn.execute(
        "INSERT INTO nodes(parent_id, name, kind, value) VALUES (?1, ?2, 'container', NULL)",
        params![parent.id(), name],
    );
    if let Err(err) = insert {
        return Err(map_insert_conflict(err, path));
    }
    Ok(Container::new(conn.last_insert_rowid(), path))
}

pub(in crate::store) fn insert_entry_tx(
    conn: &Connection,
    parent: &Container,
    name: &str,
    value: &[u8],
) -> Result<(), StoreError> {
    let path = parent.path().child(name)?;
    let insert = conn.execute(
        "INSERT INTO nodes(parent_id, name, kind, value) VALUES (?1, ?2, 'entry', ?3)",
        params![parent.id(), name, value],
    );
    if let Err(err) = insert {
        return Err(map_insert_conflict(err, path));
    }
    Ok(())
}

pub(in crate::store) fn update_entry_tx(
    conn: &Connection,
    entry_id: i64,
    value: &[u8],
) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE nodes SET value=?2 WHERE id=?1 AND kind='entry'",
        params![entry_id, value],
    )?;
    Ok(())
}

pub(in crate::store) fn delete_entry_tx(conn: &Connection, entry_id: i64) -> Result<(), StoreError> {
    conn.execute(
        "DELETE FROM nodes WHERE id=?1 AND kind='entry'",
        params![entry_id],
    )?;
    Ok(())
}

/// Removes a container together with every descendant in one statement.
pub(in crate::store) fn delete_container_tx(
    conn: &Connection,
    container_id: i64,
) -> Result<usize, StoreError> {
    let deleted = conn.execute(
        r#"
        WITH RECURSIVE subtree(id) AS (
          SELECT id FROM nodes WHERE id=?1 AND kind='container' AND parent_id IS NOT NULL
          UNION ALL
          SELECT nodes.id FROM nodes JOIN subtree ON nodes.parent_id = subtree.id
        )
        DELETE FROM nodes WHERE id IN (SELECT id FROM subtree)
        "#,
        params![container_id],
    )?;
    Ok(deleted)
}

/// Detaches a container and reattaches it under `new_parent` as `new_name`.
/// Descendants follow without being copied.
pub(in crate::store) fn relocate_container_tx(
    conn: &Connection,
    container_id: i64,
    new_parent: &Container,
    new_name: &str,
) -> Result<Container, StoreError> {
    let path = new_parent.path().child(new_name)?;
    let update = conn.execute(
        "UPDATE nodes SET parent_id=?2, name=?3 WHERE id=?1 AND kind='container'",
        params![container_id, new_parent.id(), new_name],
    );
    if let Err(err) = update {
        return Err(map_insert_conflict(err, path));
    }
    Ok(Container::new(container_id, path))
}

fn map_insert_conflict(err: rusqlite::Error, path: NodePath) -> StoreError {
    if is_unique_violation(&err) {
        return StoreError::AlreadyExists { path };
    }
    StoreError::Sql(err)
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    match err {
        rusqlite::Error::SqliteFailure(code, message) => {
            code.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || message
                    .as_deref()
                    .is_some_and(|value| value.contains("UNIQUE constraint failed"))
        }
        _ => false,
    }
}
