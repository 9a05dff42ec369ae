#![forbid(unsafe_code)]

use super::super::StoreError;
use super::now_ms;
use rusqlite::{Connection, OptionalExtension, params};
use std::collections::BTreeSet;
use std::path::Path;

pub(in crate::store) const SCHEMA_VERSION: i64 = 1;
pub(in crate::store) const ROOT_ID: i64 = 0;

const REQUIRED_TABLES: [&str; 2] = ["store_meta", "nodes"];

/// Refuses files that already hold tables other than a node store's.
pub(in crate::store) fn preflight_gate(conn: &Connection, path: &Path) -> Result<(), StoreError> {
    let mut stmt = conn.prepare(
        "SELECT name FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
    )?;
    let mut rows = stmt.query([])?;
    let mut tables = BTreeSet::new();
    while let Some(row) = rows.next()? {
        tables.insert(row.get::<_, String>(0)?);
    }

    if tables.is_empty() {
        return Ok(());
    }

    let required: BTreeSet<&str> = REQUIRED_TABLES.into_iter().collect();
    if tables
        .iter()
        .any(|table| !required.contains(table.as_str()))
    {
        return Err(unavailable(path, "file holds tables that are not part of a node store"));
    }
    for table in required {
        if !tables.contains(table) {
            return Err(unavailable(path, "node store table is missing"));
        }
    }
    Ok(())
}

pub(in crate::store) fn install_schema(conn: &Connection, path: &Path) -> Result<(), StoreError> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS store_meta (
          singleton INTEGER PRIMARY KEY CHECK(singleton = 1),
          schema_version INTEGER NOT NULL,
          created_at_ms INTEGER NOT NULL
        );

        CREATE TABLE IF NOT EXISTS nodes (
          id INTEGER PRIMARY KEY,
          parent_id INTEGER,
          name TEXT NOT NULL,
          kind TEXT NOT NULL CHECK(kind IN ('container', 'entry')),
          value BLOB,
          UNIQUE(parent_id, name),
          FOREIGN KEY(parent_id) REFERENCES nodes(id) ON DELETE CASCADE,
          CHECK((id = 0) = (parent_id IS NULL)),
          CHECK((kind = 'entry') = (value IS NOT NULL))
        );
        "#,
    )?;

    conn.execute(
        "INSERT OR IGNORE INTO store_meta(singleton, schema_version, created_at_ms) VALUES (1, ?1, ?2)",
        params![SCHEMA_VERSION, now_ms()],
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO nodes(id, parent_id, name, kind, value) VALUES (?1, NULL, '', 'container', NULL)",
        params![ROOT_ID],
    )?;

    let version = conn
        .query_row(
            "SELECT schema_version FROM store_meta WHERE singleton=1",
            [],
            |row| row.get::<_, i64>(0),
        )
        .optional()?;

    match version {
        Some(v) if v == SCHEMA_VERSION => Ok(()),
        Some(_) => Err(unavailable(path, "unsupported node store schema version")),
        None => Err(unavailable(path, "node store metadata row is missing")),
    }
}

fn unavailable(path: &Path, reason: &str) -> StoreError {
    StoreError::StoreUnavailable {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}
