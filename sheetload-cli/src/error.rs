//! Error types for the load pipeline
//!
//! `LoadError` separates the failure classes a caller may want to treat
//! differently (retry a connection, fix a file, inspect a half-replaced
//! table). The command handlers wrap it in `anyhow` at the CLI boundary.

use std::path::PathBuf;

use thiserror::Error;

/// Failure class of a `LoadError`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Config,
    Connect,
    Extract,
    Schema,
    Load,
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::Config => write!(f, "config"),
            ErrorKind::Connect => write!(f, "connect"),
            ErrorKind::Extract => write!(f, "extract"),
            ErrorKind::Schema => write!(f, "schema"),
            ErrorKind::Load => write!(f, "load"),
        }
    }
}

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("failed to connect to {target}: {source}")]
    Connect {
        target: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to read {}: {source}", .path.display())]
    Extract {
        path: PathBuf,
        #[source]
        source: ExtractError,
    },

    #[error("no columns left to write into {table}")]
    EmptySchema { table: String },

    #[error("DDL on {table} failed: {source}")]
    Schema {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("writing rows into {table} failed: {source}")]
    Load {
        table: String,
        #[source]
        source: sqlx::Error,
    },
}

impl LoadError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            LoadError::Config(_) => ErrorKind::Config,
            LoadError::Connect { .. } => ErrorKind::Connect,
            LoadError::Extract { .. } => ErrorKind::Extract,
            LoadError::EmptySchema { .. } | LoadError::Schema { .. } => ErrorKind::Schema,
            LoadError::Load { .. } => ErrorKind::Load,
        }
    }

    pub(crate) fn schema(table: impl Into<String>, source: sqlx::Error) -> Self {
        LoadError::Schema {
            table: table.into(),
            source,
        }
    }

    pub(crate) fn load(table: impl Into<String>, source: sqlx::Error) -> Self {
        LoadError::Load {
            table: table.into(),
            source,
        }
    }
}

/// Reasons a sheet could not be turned into a dataset
#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("file does not exist")]
    FileNotFound,

    #[error("{0}")]
    Workbook(#[from] calamine::Error),

    #[error("sheet '{sheet}' not found (available: {})", .available.join(", "))]
    SheetNotFound {
        sheet: String,
        available: Vec<String>,
    },

    #[error("workbook has no sheets")]
    NoSheets,

    #[error("sheet '{0}' has no header row")]
    NoHeader(String),

    #[error("reader task did not complete: {0}")]
    Interrupted(String),
}

/// Errors from a table write, split by the statement that failed
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Ddl(#[source] sqlx::Error),

    #[error("{0}")]
    Insert(#[source] sqlx::Error),
}

impl StoreError {
    pub(crate) fn into_load_error(self, table: &str) -> LoadError {
        match self {
            StoreError::Ddl(e) => LoadError::schema(table, e),
            StoreError::Insert(e) => LoadError::load(table, e),
        }
    }
}
