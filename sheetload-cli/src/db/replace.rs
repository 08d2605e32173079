//! Replace a table's schema and contents with a dataset

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use super::{TableRef, TableSchema, TableStore};
use crate::error::LoadError;
use crate::sheet::Dataset;

/// How the old table gives way to the new one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum ReplaceMode {
    /// Drop the table, then create and fill it. The table is absent in
    /// between, and stays absent if the load fails.
    #[default]
    DropAndCreate,
    /// Fill `<table>__staging`, then drop the table and rename the staging
    /// table over it in one transaction. A failed load leaves the old table.
    StagingSwap,
}

impl std::fmt::Display for ReplaceMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplaceMode::DropAndCreate => write!(f, "drop-and-create"),
            ReplaceMode::StagingSwap => write!(f, "staging-swap"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ReplaceOptions {
    pub mode: ReplaceMode,
    /// Upper bound on rows per INSERT statement
    pub batch_size: usize,
}

impl Default for ReplaceOptions {
    fn default() -> Self {
        Self {
            mode: ReplaceMode::DropAndCreate,
            batch_size: 1000,
        }
    }
}

/// Milestones reported while replacing
#[derive(Debug, Clone, PartialEq)]
pub enum ReplaceStep {
    /// A staging table left by an earlier run was found and dropped
    StaleStagingDropped { staging: TableRef },
    OldTableDropped { existed: bool },
    StagingLoaded { staging: TableRef, rows: u64 },
    Loaded { rows: u64 },
}

#[derive(Debug, Clone)]
pub struct ReplaceOutcome {
    pub schema: TableSchema,
    pub rows_written: u64,
    /// Whether a table of that name existed before the run
    pub replaced_existing: bool,
}

/// Make `table` hold exactly `dataset`, with an inferred schema
///
/// Nothing is dropped when the dataset has no columns. Errors are returned
/// as they happen; there is no rollback of an earlier drop.
pub async fn replace_table<F>(
    store: &mut dyn TableStore,
    table: &TableRef,
    dataset: &Dataset,
    options: &ReplaceOptions,
    mut on_step: F,
) -> Result<ReplaceOutcome, LoadError>
where
    F: FnMut(&ReplaceStep),
{
    let schema = TableSchema::infer(dataset);
    if schema.is_empty() {
        return Err(LoadError::EmptySchema {
            table: table.to_string(),
        });
    }

    log::debug!(
        "Replacing {} ({}, {:?}, {} columns)",
        table,
        options.mode,
        store.dialect(),
        schema.columns().len()
    );

    let existed = store
        .table_exists(table)
        .await
        .map_err(|e| LoadError::schema(table.to_string(), e))?;

    let rows_written = match options.mode {
        ReplaceMode::DropAndCreate => {
            store
                .drop_table(table)
                .await
                .map_err(|e| LoadError::schema(table.to_string(), e))?;
            log::info!("Dropped table {} (existed: {})", table, existed);
            on_step(&ReplaceStep::OldTableDropped { existed });

            store
                .create_and_fill(table, &schema, dataset.rows(), options.batch_size)
                .await
                .map_err(|e| e.into_load_error(&table.to_string()))?
        }
        ReplaceMode::StagingSwap => {
            let staging = table.staging();
            let stale = store
                .table_exists(&staging)
                .await
                .map_err(|e| LoadError::schema(staging.to_string(), e))?;
            if stale {
                log::warn!(
                    "Staging table {} already exists, dropping it before loading {}",
                    staging,
                    table
                );
                store
                    .drop_table(&staging)
                    .await
                    .map_err(|e| LoadError::schema(staging.to_string(), e))?;
                on_step(&ReplaceStep::StaleStagingDropped {
                    staging: staging.clone(),
                });
            }

            let rows = store
                .create_and_fill(&staging, &schema, dataset.rows(), options.batch_size)
                .await
                .map_err(|e| e.into_load_error(&staging.to_string()))?;
            log::info!("Loaded {} rows into staging table {}", rows, staging);
            on_step(&ReplaceStep::StagingLoaded {
                staging: staging.clone(),
                rows,
            });

            store
                .swap(&staging, table)
                .await
                .map_err(|e| LoadError::schema(table.to_string(), e))?;
            on_step(&ReplaceStep::OldTableDropped { existed });
            rows
        }
    };

    log::info!("Wrote {} rows into {}", rows_written, table);
    on_step(&ReplaceStep::Loaded { rows: rows_written });

    Ok(ReplaceOutcome {
        schema,
        rows_written,
        replaced_existing: existed,
    })
}
