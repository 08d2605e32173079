//! PostgreSQL table store

use async_trait::async_trait;
use sqlx::postgres::PgConnectOptions;
use sqlx::{Connection, PgConnection, Postgres, QueryBuilder};

use super::schema::{BindValue, TableSchema, coerce};
use super::{Dialect, TableRef, TableStore, quote_ident};
use crate::error::StoreError;
use crate::sheet::CellValue;

pub struct PostgresStore {
    conn: PgConnection,
}

impl PostgresStore {
    pub async fn connect(options: &PgConnectOptions) -> Result<Self, sqlx::Error> {
        let conn = PgConnection::connect_with(options).await?;
        Ok(Self { conn })
    }

    #[cfg(test)]
    pub(crate) fn from_connection(conn: PgConnection) -> Self {
        Self { conn }
    }
}

#[async_trait]
impl TableStore for PostgresStore {
    fn dialect(&self) -> Dialect {
        Dialect::Postgres
    }

    async fn table_exists(&mut self, table: &TableRef) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM information_schema.tables
                WHERE table_schema = COALESCE($1, current_schema())
                  AND table_name = $2
            )
            "#,
        )
        .bind(table.schema.as_deref())
        .bind(&table.name)
        .fetch_one(&mut self.conn)
        .await
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

        let create = schema.create_statement(table, Dialect::Postgres);
        sqlx::query(&create)
            .execute(&mut *tx)
            .await
            .map_err(StoreError::Ddl)?;

        let prefix = schema.insert_prefix(table);
        let per_statement = schema.rows_per_statement(batch_size, Dialect::Postgres);
        let mut written = 0u64;

        for chunk in rows.chunks(per_statement) {
            let mut builder = QueryBuilder::<Postgres>::new(&prefix);
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
            log::debug!("Inserted {} rows into {}", written, table);
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
