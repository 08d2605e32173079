//! Column type inference and SQL generation for the destination table

use chrono::NaiveDateTime;
use serde::Serialize;

use super::{Dialect, TableRef, quote_ident};
use crate::sheet::{CellValue, Dataset};

/// SQL column type chosen from the values of a sheet column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SqlType {
    Boolean,
    BigInt,
    Double,
    Timestamp,
    Text,
}

impl SqlType {
    pub fn sql_name(self, dialect: Dialect) -> &'static str {
        match (self, dialect) {
            (SqlType::Boolean, _) => "BOOLEAN",
            (SqlType::BigInt, Dialect::Postgres) => "BIGINT",
            (SqlType::BigInt, Dialect::Sqlite) => "INTEGER",
            (SqlType::Double, Dialect::Postgres) => "DOUBLE PRECISION",
            (SqlType::Double, Dialect::Sqlite) => "REAL",
            (SqlType::Timestamp, _) => "TIMESTAMP",
            (SqlType::Text, _) => "TEXT",
        }
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.sql_name(Dialect::Postgres))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
}

/// Columns of the table that will be created, in dataset order
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct TableSchema {
    columns: Vec<ColumnDef>,
}

impl TableSchema {
    /// Infer one type per dataset column
    pub fn infer(dataset: &Dataset) -> Self {
        let columns = dataset
            .columns()
            .iter()
            .enumerate()
            .map(|(index, name)| ColumnDef {
                name: name.clone(),
                sql_type: infer_column_type(dataset.column_values(index)),
            })
            .collect();
        Self { columns }
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn create_statement(&self, table: &TableRef, dialect: Dialect) -> String {
        let columns: Vec<String> = self
            .columns
            .iter()
            .map(|c| format!("{} {}", quote_ident(&c.name), c.sql_type.sql_name(dialect)))
            .collect();
        format!("CREATE TABLE {} ({})", table.qualified(), columns.join(", "))
    }

    /// `INSERT INTO t (cols) ` prefix for a multi-row VALUES statement
    pub fn insert_prefix(&self, table: &TableRef) -> String {
        let columns: Vec<String> = self.columns.iter().map(|c| quote_ident(&c.name)).collect();
        format!("INSERT INTO {} ({}) ", table.qualified(), columns.join(", "))
    }

    /// Rows per INSERT, bounded by the dialect's bind parameter limit
    pub fn rows_per_statement(&self, batch_size: usize, dialect: Dialect) -> usize {
        let width = self.columns.len().max(1);
        batch_size.min(dialect.bind_limit() / width).max(1)
    }
}

/// Pick the narrowest type that holds every non-null value
///
/// Bools only give BOOLEAN, whole numbers only BIGINT, any mix of whole and
/// fractional numbers DOUBLE, date-times only TIMESTAMP. Everything else,
/// including a column with no values at all, is TEXT.
pub fn infer_column_type<'a>(values: impl Iterator<Item = &'a CellValue>) -> SqlType {
    let (mut bools, mut ints, mut floats, mut datetimes, mut texts) = (false, false, false, false, false);

    for value in values {
        match value {
            CellValue::Null => {}
            CellValue::Bool(_) => bools = true,
            CellValue::Int(_) => ints = true,
            CellValue::Float(_) => floats = true,
            CellValue::DateTime(_) => datetimes = true,
            CellValue::Text(_) => texts = true,
        }
        if texts {
            return SqlType::Text;
        }
    }

    match (bools, ints, floats, datetimes) {
        (true, false, false, false) => SqlType::Boolean,
        (false, true, false, false) => SqlType::BigInt,
        (false, _, true, false) => SqlType::Double,
        (false, false, false, true) => SqlType::Timestamp,
        _ => SqlType::Text,
    }
}

/// A cell converted to the Rust type bound for its column
#[derive(Debug, Clone, PartialEq)]
pub enum BindValue {
    Bool(Option<bool>),
    BigInt(Option<i64>),
    Double(Option<f64>),
    Timestamp(Option<NaiveDateTime>),
    Text(Option<String>),
}

/// Convert a cell for insertion into a column of type `sql_type`
///
/// Values that do not fit the column bind as NULL; inference never
/// produces that combination except for TEXT, which accepts everything.
pub fn coerce(value: &CellValue, sql_type: SqlType) -> BindValue {
    match sql_type {
        SqlType::Boolean => BindValue::Bool(value.as_bool()),
        SqlType::BigInt => BindValue::BigInt(value.as_int()),
        SqlType::Double => BindValue::Double(value.as_float()),
        SqlType::Timestamp => BindValue::Timestamp(value.as_datetime()),
        SqlType::Text => BindValue::Text(value.to_text()),
    }
}
