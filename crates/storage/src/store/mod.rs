#![forbid(unsafe_code)]

mod copy;
mod create;
mod delete;
mod error;
mod normalize;
mod options;
mod relocate;
mod rename;
mod resolve;
mod support;
mod traverse;

pub use error::StoreError;
pub use normalize::normalize_value;
pub use options::{CREATE_IF_MISSING_ENV, LOCK_TIMEOUT_ENV, StoreOptions};

use nk_core::paths::NodePath;
use rusqlite::{Connection, ErrorCode, OpenFlags, Transaction, TransactionBehavior};
use std::path::{Path, PathBuf};
use support::*;

/// A resolved container: its row id and the path it was reached by.
///
/// The root container is a distinguished reference rather than an absent one.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Container {
    id: i64,
    path: NodePath,
}

impl Container {
    pub fn root() -> Self {
        Self {
            id: ROOT_ID,
            path: NodePath::root(),
        }
    }

    pub(in crate::store) fn new(id: i64, path: NodePath) -> Self {
        Self { id, path }
    }

    pub fn id(&self) -> i64 {
        self.id
    }

    pub fn path(&self) -> &NodePath {
        &self.path
    }

    pub fn is_root(&self) -> bool {
        self.id == ROOT_ID
    }
}

/// Session over one store file.
///
/// The session owns at most one connection. While open it holds the file's
/// exclusive lock; every mutation runs as a single immediate transaction.
#[derive(Debug)]
pub struct NodeStore {
    conn: Option<Connection>,
    file_path: Option<PathBuf>,
    options: StoreOptions,
}

impl NodeStore {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            conn: None,
            file_path: None,
            options,
        }
    }

    pub fn open_file(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let mut store = Self::new(StoreOptions::from_env());
        store.open(path)?;
        Ok(store)
    }

    /// Closes the current handle (if any) and opens `path`.
    ///
    /// The path is remembered for [`NodeStore::reload`] only when the open
    /// succeeds.
    pub fn open(&mut self, path: impl AsRef<Path>) -> Result<(), StoreError> {
        self.close();
        let path = path.as_ref().to_path_buf();
        match open_connection(&path, &self.options) {
            Ok(conn) => {
                log::info!("opened store file {}", path.display());
                self.conn = Some(conn);
                self.file_path = Some(path);
                Ok(())
            }
            Err(err) => {
                log::warn!("failed to open store file {}: {err}", path.display());
                Err(err)
            }
        }
    }

    pub fn reload(&mut self) -> Result<(), StoreError> {
        let Some(path) = self.file_path.clone() else {
            return Err(StoreError::StoreUnavailable {
                path: PathBuf::new(),
                reason: "no store file has been opened".to_string(),
            });
        };
        self.open(path)
    }

    pub fn close(&mut self) {
        let Some(conn) = self.conn.take() else {
            return;
        };
        if let Err((_, err)) = conn.close() {
            log::warn!("closing store connection failed: {err}");
        }
        if let Some(path) = &self.file_path {
            log::info!("closed store file {}", path.display());
        }
    }

    pub fn is_open(&self) -> bool {
        self.conn.is_some()
    }

    pub fn file_path(&self) -> Option<&Path> {
        self.file_path.as_deref()
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    fn conn(&self) -> Result<&Connection, StoreError> {
        self.conn.as_ref().ok_or(StoreError::NotOpen)
    }

    /// Runs `op` inside one read transaction.
    fn read<T>(
        &self,
        op: impl FnOnce(&Connection) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn()?;
        let result = run_read(conn, op);
        result.map_err(|err| self.lock_failure(err))
    }

    /// Runs `op` inside one write transaction; any error rolls it back.
    fn write<T>(
        &mut self,
        op: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
    ) -> Result<T, StoreError> {
        let conn = self.conn.as_mut().ok_or(StoreError::NotOpen)?;
        let result = run_write(conn, op);
        result.map_err(|err| self.lock_failure(err))
    }

    fn lock_failure(&self, err: StoreError) -> StoreError {
        match err {
            StoreError::Sql(sql) if is_lock_contention(&sql) => StoreError::StoreUnavailable {
                path: self.file_path.clone().unwrap_or_default(),
                reason: sql.to_string(),
            },
            other => other,
        }
    }
}

impl Default for NodeStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

fn run_read<T>(
    conn: &Connection,
    op: impl FnOnce(&Connection) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let tx = conn.unchecked_transaction()?;
    let out = op(&tx)?;
    tx.commit()?;
    Ok(out)
}

fn run_write<T>(
    conn: &mut Connection,
    op: impl FnOnce(&Transaction<'_>) -> Result<T, StoreError>,
) -> Result<T, StoreError> {
    let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;
    let out = op(&tx)?;
    tx.commit()?;
    Ok(out)
}

fn open_connection(path: &Path, options: &StoreOptions) -> Result<Connection, StoreError> {
    if !options.create_if_missing && !path.exists() {
        return Err(StoreError::StoreUnavailable {
            path: path.to_path_buf(),
            reason: "store file does not exist".to_string(),
        });
    }

    let mut flags = OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    if options.create_if_missing {
        flags |= OpenFlags::SQLITE_OPEN_CREATE;
    }

    connect(path, flags, options).map_err(|err| match err {
        StoreError::Sql(sql) => StoreError::StoreUnavailable {
            path: path.to_path_buf(),
            reason: sql.to_string(),
        },
        other => other,
    })
}

fn connect(path: &Path, flags: OpenFlags, options: &StoreOptions) -> Result<Connection, StoreError> {
    let conn = Connection::open_with_flags(path, flags)?;
    conn.busy_timeout(options.lock_timeout)?;
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.pragma_update_and_check(None, "locking_mode", "EXCLUSIVE", |row| {
        row.get::<_, String>(0)
    })?;
    // Take the lock now so a contended file fails here, not on first write.
    conn.execute_batch("BEGIN EXCLUSIVE; COMMIT;")?;

    preflight_gate(&conn, path)?;
    install_schema(&conn, path)?;
    Ok(conn)
}

fn is_lock_contention(err: &rusqlite::Error) -> bool {
    matches!(
        err.sqlite_error_code(),
        Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked)
    )
}

fn reject_root(path: &NodePath, operation: &'static str) -> Result<(), StoreError> {
    if path.is_root() {
        return Err(StoreError::RootNotApplicable { operation });
    }
    Ok(())
}
