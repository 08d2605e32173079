//! Destination database access
//!
//! A `TableStore` is one live connection that can both run DDL and bulk
//! insert rows. Postgres is the production target; SQLite shares the same
//! code path and backs the end-to-end tests.

mod postgres;
pub mod replace;
pub mod schema;
mod sqlite;

use async_trait::async_trait;

pub use postgres::PostgresStore;
pub use replace::{ReplaceMode, ReplaceOptions, ReplaceOutcome, ReplaceStep, replace_table};
pub use schema::{ColumnDef, SqlType, TableSchema};
pub use sqlite::SqliteStore;

use crate::config::{DatabaseConfig, DatabaseTarget};
use crate::error::{LoadError, StoreError};
use crate::sheet::CellValue;

/// SQL flavour of a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Postgres,
    Sqlite,
}

impl Dialect {
    /// Maximum bind parameters in one statement
    pub fn bind_limit(self) -> usize {
        match self {
            Dialect::Postgres => 65_535,
            Dialect::Sqlite => 32_766,
        }
    }
}

/// Quote an identifier, doubling embedded quotes
pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

/// A table name, optionally qualified by a schema
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableRef {
    pub schema: Option<String>,
    pub name: String,
}

impl TableRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    pub fn with_schema(mut self, schema: Option<String>) -> Self {
        self.schema = schema;
        self
    }

    /// Quoted, schema-qualified form for SQL text
    pub fn qualified(&self) -> String {
        match &self.schema {
            Some(schema) => format!("{}.{}", quote_ident(schema), quote_ident(&self.name)),
            None => quote_ident(&self.name),
        }
    }

    /// The side table used by the staging-swap mode
    pub fn staging(&self) -> TableRef {
        TableRef {
            schema: self.schema.clone(),
            name: format!("{}__staging", self.name),
        }
    }
}

impl std::fmt::Display for TableRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => write!(f, "{}", self.name),
        }
    }
}

/// One connection to the destination database
#[async_trait]
pub trait TableStore: Send {
    fn dialect(&self) -> Dialect;

    async fn table_exists(&mut self, table: &TableRef) -> Result<bool, sqlx::Error>;

    /// `DROP TABLE IF EXISTS`, committed immediately
    async fn drop_table(&mut self, table: &TableRef) -> Result<(), sqlx::Error>;

    /// Create `table` with `schema` and insert all rows in one transaction
    async fn create_and_fill(
        &mut self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[Vec<CellValue>],
        batch_size: usize,
    ) -> Result<u64, StoreError>;

    /// Drop `target` and rename `staging` to it in one transaction
    async fn swap(&mut self, staging: &TableRef, target: &TableRef) -> Result<(), sqlx::Error>;

    /// Release the connection
    async fn close(self: Box<Self>) -> Result<(), sqlx::Error>;
}

/// Open the single connection described by `config`
pub async fn connect(config: &DatabaseConfig) -> Result<Box<dyn TableStore>, LoadError> {
    let description = config.describe();
    log::info!("Connecting to {}", description);

    let store: Box<dyn TableStore> = match config.target()? {
        DatabaseTarget::Postgres(options) => Box::new(
            PostgresStore::connect(&options)
                .await
                .map_err(|source| LoadError::Connect {
                    target: description.clone(),
                    source,
                })?,
        ),
        DatabaseTarget::Sqlite(options) => Box::new(
            SqliteStore::connect(&options)
                .await
                .map_err(|source| LoadError::Connect {
                    target: description.clone(),
                    source,
                })?,
        ),
    };

    log::info!("Connected to {}", description);
    Ok(store)
}
