//! `load` command handler

use anyhow::{Context, Result};
use colored::*;
use is_terminal::IsTerminal;

use super::LoadCommands;
use crate::error::ErrorKind;
use crate::pipeline::{self, Event, PipelineError, Progress, Stage};

/// Prints one status line per pipeline event
struct ConsoleProgress;

impl Progress for ConsoleProgress {
    fn on_event(&mut self, event: &Event) {
        match event {
            Event::ReadingSheet { path, sheet } => {
                let sheet = sheet.as_deref().unwrap_or("(first sheet)");
                println!();
                println!(
                    "📄 Reading sheet {} from {}",
                    sheet.cyan(),
                    path.display().to_string().dimmed()
                );
            }
            Event::SheetRead { rows, columns } => {
                println!("   {} rows, {} columns", rows, columns);
            }
            Event::ColumnDropped { name } => {
                println!("🚮 Dropped column '{}'", name.yellow());
            }
            Event::StaleStagingDropped { staging } => {
                println!(
                    "{} {}",
                    "⚠️  Dropped leftover staging table".yellow(),
                    staging.to_string().yellow()
                );
            }
            Event::OldTableDropped { table, existed } => {
                if *existed {
                    println!("🗑️  Dropped old table {}", table.to_string().yellow());
                } else {
                    println!("🗑️  No existing table {}", table.to_string().dimmed());
                }
            }
            Event::StagingLoaded { staging, rows } => {
                println!("📦 Loaded {} rows into {}", rows, staging.to_string().dimmed());
            }
            Event::TableLoaded { table, rows } => {
                println!(
                    "{} {} ({} rows)",
                    "✅ Uploaded table".bright_green(),
                    table.to_string().bright_green().bold(),
                    rows
                );
            }
            Event::Disconnected => log::debug!("Connection closed"),
        }
    }
}

/// Handle `sheetload load`
///
/// Configuration and connection problems are returned as errors. A failed
/// run is printed and only turned into an error with `--fail-on-error`.
pub async fn handle_load_command(args: LoadCommands) -> Result<()> {
    let config = args.source.resolve(args.overrides())?;
    let job = config.job().context("Invalid load configuration")?;

    let mut database = config.database.clone();
    if database.needs_password() && std::io::stdin().is_terminal() {
        let prompt = format!("Password for {}: ", database.describe());
        let password = rpassword::prompt_password(prompt).context("Failed to read password")?;
        database.password = Some(password);
    }

    let result = pipeline::run(job, &database, &mut ConsoleProgress)
        .await
        .map_err(|err| {
            let context = match err.kind() {
                ErrorKind::Config => "Invalid database configuration",
                _ => "Failed to connect to the database",
            };
            anyhow::Error::new(err).context(context)
        })?;

    match result {
        Ok(report) => {
            log::info!(
                "Loaded {} rows into {} ({} columns)",
                report.rows_written,
                report.table,
                report.columns.len()
            );
            Ok(())
        }
        Err(err) => {
            report_failure(&err);
            if args.fail_on_error {
                Err(err.into())
            } else {
                Ok(())
            }
        }
    }
}

fn report_failure(err: &PipelineError) {
    println!("{} {}", "❌ Upload failed:".red().bold(), err.error);
    log::debug!("Failure kind: {}, stage: {}", err.error.kind(), err.stage);

    if err.stage == Stage::TableDropped {
        println!(
            "{}",
            "   The old table was already dropped and has not been recreated.".yellow()
        );
    }
}
