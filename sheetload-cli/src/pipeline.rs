//! One load run: read the sheet, prune columns, replace the table
//!
//! `Pipeline::execute` walks the stages in order on an already open store and
//! reports the last stage it reached when something fails. `run` wraps it with
//! connecting and closing, so the connection is released on every path.

use std::path::PathBuf;

use thiserror::Error;

use crate::config::{DatabaseConfig, LoadJob, SourceSpec};
use crate::db::{self, ColumnDef, ReplaceStep, TableRef, TableStore, replace_table};
use crate::error::{ExtractError, LoadError};
use crate::sheet::{self, Dataset, drop_columns};

/// Progress of a run, in the order stages are reached
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Connected,
    Extracted,
    Pruned,
    TableDropped,
    StagingLoaded,
    TableLoaded,
}

impl std::fmt::Display for Stage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Stage::Connected => "connected",
            Stage::Extracted => "extracted",
            Stage::Pruned => "pruned",
            Stage::TableDropped => "table dropped",
            Stage::StagingLoaded => "staging loaded",
            Stage::TableLoaded => "table loaded",
        };
        write!(f, "{}", name)
    }
}

/// Something worth telling the user about
#[derive(Debug, Clone, PartialEq)]
pub enum Event {
    ReadingSheet { path: PathBuf, sheet: Option<String> },
    SheetRead { rows: usize, columns: usize },
    ColumnDropped { name: String },
    StaleStagingDropped { staging: TableRef },
    OldTableDropped { table: TableRef, existed: bool },
    StagingLoaded { staging: TableRef, rows: u64 },
    TableLoaded { table: TableRef, rows: u64 },
    Disconnected,
}

pub trait Progress {
    fn on_event(&mut self, event: &Event);
}

/// Discards all events
pub struct Silent;

impl Progress for Silent {
    fn on_event(&mut self, _event: &Event) {}
}

/// A failed run and how far it got
#[derive(Error, Debug)]
#[error("{error} (last stage reached: {stage})")]
pub struct PipelineError {
    pub stage: Stage,
    #[source]
    pub error: LoadError,
}

#[derive(Debug, Clone)]
pub struct LoadReport {
    pub table: String,
    pub columns: Vec<ColumnDef>,
    pub dropped_columns: Vec<String>,
    pub rows_written: u64,
    pub replaced_existing: bool,
}

/// Read the configured sheet on the blocking pool
pub async fn extract(source: &SourceSpec) -> Result<Dataset, ExtractError> {
    let path = source.path.clone();
    let sheet = source.sheet.clone();
    let headers = source.headers;

    tokio::task::spawn_blocking(move || sheet::read_sheet(&path, sheet.as_deref(), headers))
        .await
        .map_err(|e| ExtractError::Interrupted(e.to_string()))?
}

pub struct Pipeline {
    job: LoadJob,
}

impl Pipeline {
    pub fn new(job: LoadJob) -> Self {
        Self { job }
    }

    /// Run every stage after connecting against `store`
    ///
    /// Extraction happens before anything touches the database, so a bad
    /// file or sheet leaves the destination as it was.
    pub async fn execute(
        &self,
        store: &mut dyn TableStore,
        progress: &mut dyn Progress,
    ) -> Result<LoadReport, PipelineError> {
        let source = &self.job.source;
        let table = &self.job.table;

        let mut stage = Stage::Connected;

        progress.on_event(&Event::ReadingSheet {
            path: source.path.clone(),
            sheet: source.sheet.clone(),
        });
        let dataset = extract(source).await.map_err(|e| PipelineError {
            stage,
            error: LoadError::Extract {
                path: source.path.clone(),
                source: e,
            },
        })?;
        stage = Stage::Extracted;
        log::debug!("Stage: {}", stage);
        progress.on_event(&Event::SheetRead {
            rows: dataset.row_count(),
            columns: dataset.column_count(),
        });

        let (dataset, dropped) = drop_columns(dataset, &source.drop_columns);
        for name in &dropped {
            log::info!("Dropped column '{}'", name);
            progress.on_event(&Event::ColumnDropped { name: name.clone() });
        }
        stage = Stage::Pruned;
        log::debug!("Stage: {}", stage);

        let result = replace_table(store, table, &dataset, &self.job.replace, |step| match step {
            ReplaceStep::StaleStagingDropped { staging } => {
                progress.on_event(&Event::StaleStagingDropped {
                    staging: staging.clone(),
                });
            }
            ReplaceStep::OldTableDropped { existed } => {
                if stage == Stage::Pruned {
                    stage = Stage::TableDropped;
                }
                progress.on_event(&Event::OldTableDropped {
                    table: table.clone(),
                    existed: *existed,
                });
            }
            ReplaceStep::StagingLoaded { staging, rows } => {
                stage = Stage::StagingLoaded;
                progress.on_event(&Event::StagingLoaded {
                    staging: staging.clone(),
                    rows: *rows,
                });
            }
            ReplaceStep::Loaded { rows } => {
                stage = Stage::TableLoaded;
                progress.on_event(&Event::TableLoaded {
                    table: table.clone(),
                    rows: *rows,
                });
            }
        })
        .await;

        let outcome = result.map_err(|error| PipelineError { stage, error })?;

        Ok(LoadReport {
            table: table.to_string(),
            columns: outcome.schema.columns().to_vec(),
            dropped_columns: dropped,
            rows_written: outcome.rows_written,
            replaced_existing: outcome.replaced_existing,
        })
    }
}

/// Connect, execute the job, and disconnect
///
/// The outer error is a connection failure; the inner one is a failed run,
/// after which the connection has still been closed.
pub async fn run(
    job: LoadJob,
    database: &DatabaseConfig,
    progress: &mut dyn Progress,
) -> Result<Result<LoadReport, PipelineError>, LoadError> {
    let mut store = db::connect(database).await?;

    let result = Pipeline::new(job).execute(store.as_mut(), progress).await;

    if let Err(e) = store.close().await {
        log::warn!("Failed to close database connection cleanly: {}", e);
    }
    progress.on_event(&Event::Disconnected);

    Ok(result)
}
