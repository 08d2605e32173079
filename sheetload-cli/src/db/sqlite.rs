//! SQLite table store

use async_trait::async_trait;
use sqlx::sqlite::SqliteConnectOptions;
use sqlx::{Connection, QueryBuilder, Sqlite, SqliteConnection};

use super::schema::{BindValue, TableSchema, coerce};
use super::{Dialect, TableRef, TableStore, quote_ident};
use crate::error::StoreError;
use crate::sheet::CellValue;

pub struct SqliteStore {
    conn: SqliteConnection,
}

impl SqliteStore {
    pub async fn connect(options: &SqliteConnectOptions) -> Result<Self, sqlx::Error> {
        let conn = SqliteConnection::connect_with(options).await?;
        Ok(Self { conn })
    }

    /// Fresh private in-memory database
    #[cfg(test)]
    pub(crate) async fn in_memory() -> Self {
        Self {
            conn: SqliteConnection::connect("sqlite::memory:").await.unwrap(),
        }
    }

    #[cfg(test)]
    pub(crate) fn connection(&mut self) -> &mut SqliteConnection {
        &mut self.conn
    }
}

#[async_trait]
impl TableStore for SqliteStore {
    fn dialect(&self) -> Dialect {
        Dialect::Sqlite
    }

    async fn table_exists(&mut self, table: &TableRef) -> Result<bool, sqlx::Error> {
        // An SQLite "schema" is an attached database, each with its own catalog
        let catalog = quote_ident(table.schema.as_deref().unwrap_or("main"));
        let sql = format!(
            "SELECT COUNT(*) FROM {}.sqlite_master WHERE type = 'table' AND name = ?",
            catalog
        );
        let count: i64 = sqlx::query_scalar(&sql)
            .bind(&table.name)
            .fetch_one(&mut self.conn)
            .await?;
        Ok(count > 0)
    }

    async fn drop_table(&mut self, table: &TableRef) -> Result<(), sqlx::Error> {
        let sql = format!("DROP TABLE IF EXISTS {}", table.qualified());
        sqlx::query(&sql).execute(&mut self.conn).await?;
        Ok(())
    }

    async fn create_and_fill(
        &mut self,
        table: &TableRef,
        schema: &TableSchema,
        rows: &[Vec<CellValue>],
        batch_size: usize,
    ) -> Result<u64, StoreError> {
        let mut tx = self.conn.begin().await.map_err(StoreError::Ddl)?;

        let create = schema.create_statement(table, Dialect::Sqlite);
        sqlx::query(&create)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::Ddl)?;

        let prefix = schema.insert_prefix(table);
        let per_statement = schema.rows_per_statement(batch_size, Dialect::Sqlite);
        let mut written = 0u64;

        for chunk in rows.chunks(per_statement) {
            let mut builder = QueryBuilder::<Sqlite>::new(&prefix);
            builder.push_values(chunk, |mut b, row| {
                for (cell, column) in row.iter().zip(schema.columns()) {
                    match coerce(cell, column.sql_type) {
                        BindValue::Bool(v) => b.push_bind(v),
                        BindValue::BigInt(v) => b.push_bind(v),
                        BindValue::Double(v) => b.push_bind(v),
                        BindValue::Timestamp(v) => b.push_bind(v),
                        BindValue::Text(v) => b.push_bind(v),
                    };
                }
            });

            let result = builder
                .build()
                .execute(&mut *tx)
                .await
                .map_err(StoreError::Insert)?;
            written += result.rows_affected();
        }

        tx.commit().await.map_err(StoreError::Insert)?;
        Ok(written)
    }

    async fn swap(&mut self, staging: &TableRef, target: &TableRef) -> Result<(), sqlx::Error> {
        let mut tx = self.conn.begin().await?;

        sqlx::query(&format!("DROP TABLE IF EXISTS {}", target.qualified()))
            .execute(&mut *tx)
            .await?;
        sqlx::query(&format!(
            "ALTER TABLE {} RENAME TO {}",
            staging.qualified(),
            quote_ident(&target.name)
        ))
        .execute(&mut *tx)
        .await?;

        tx.commit().await
    }

    async fn close(self: Box<Self>) -> Result<(), sqlx::Error> {
        let this = *self;
        this.conn.close().await
    }
}
