#![forbid(unsafe_code)]

use nk_core::model::NodeKind;
use nk_core::paths::{NodePath, PathError};
use std::path::PathBuf;

#[derive(Debug)]
pub enum StoreError {
    Io(std::io::Error),
    Sql(rusqlite::Error),
    StoreUnavailable {
        path: PathBuf,
        reason: String,
    },
    NotOpen,
    NotFound {
        path: NodePath,
        depth: usize,
    },
    AlreadyExists {
        path: NodePath,
    },
    InvalidDestination {
        path: NodePath,
        reason: &'static str,
    },
    RootNotApplicable {
        operation: &'static str,
    },
    KindMismatch {
        path: NodePath,
        expected: NodeKind,
    },
    InvalidPath(PathError),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io: {err}"),
            Self::Sql(err) => write!(f, "sqlite: {err}"),
            Self::StoreUnavailable { path, reason } => {
                write!(f, "store unavailable ({}): {reason}", path.display())
            }
            Self::NotOpen => write!(f, "store is not open"),
            Self::NotFound { path, depth } => {
                write!(f, "not found: {path} (depth={depth})")
            }
            Self::AlreadyExists { path } => write!(f, "already exists: {path}"),
            Self::InvalidDestination { path, reason } => {
                write!(f, "invalid destination {path}: {reason}")
            }
            Self::RootNotApplicable { operation } => {
                write!(f, "cannot {operation} the root")
            }
            Self::KindMismatch { path, expected } => {
                write!(f, "{path} is not a {}", expected.as_str())
            }
            Self::InvalidPath(err) => write!(f, "invalid path: {err}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sql(err) => Some(err),
            Self::InvalidPath(err) => Some(err),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StoreError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sql(value)
    }
}

impl From<PathError> for StoreError {
    fn from(value: PathError) -> Self {
        Self::InvalidPath(value)
    }
}
