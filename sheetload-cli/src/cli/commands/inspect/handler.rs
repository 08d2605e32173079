//! `inspect` command handler

use std::path::PathBuf;

use anyhow::{Context, Result};
use colored::*;
use serde::Serialize;

use super::{InspectCommands, OutputFormat};
use crate::config::SourceSpec;
use crate::db::{ColumnDef, TableSchema};
use crate::pipeline;
use crate::sheet::{self, CellValue, Dataset, drop_columns};

/// What a load of this sheet would create
#[derive(Debug, Serialize)]
struct InspectReport {
    path: PathBuf,
    sheet: Option<String>,
    sheets: Vec<String>,
    dropped_columns: Vec<String>,
    columns: Vec<ColumnDef>,
    rows: usize,
    preview: Vec<serde_json::Map<String, serde_json::Value>>,
}

/// Handle `sheetload inspect`
pub async fn handle_inspect_command(args: InspectCommands) -> Result<()> {
    let config = args.source.resolve(args.source.overrides())?;
    let source = config.source_spec().context("Invalid source configuration")?;

    let report = inspect(&source, args.preview).await?;

    match args.format {
        OutputFormat::Json => {
            let json = serde_json::to_string_pretty(&report).context("Failed to format JSON output")?;
            println!("{}", json);
        }
        OutputFormat::Table => print_table(&report),
    }
    Ok(())
}

async fn inspect(source: &SourceSpec, preview: usize) -> Result<InspectReport> {
    let path = source.path.clone();
    let sheets = tokio::task::spawn_blocking(move || sheet::list_sheets(&path))
        .await
        .context("Sheet listing task failed")?
        .with_context(|| format!("Failed to open {}", source.path.display()))?;

    let dataset = pipeline::extract(source)
        .await
        .with_context(|| format!("Failed to read {}", source.path.display()))?;
    let (dataset, dropped_columns) = drop_columns(dataset, &source.drop_columns);
    let schema = TableSchema::infer(&dataset);

    Ok(InspectReport {
        path: source.path.clone(),
        sheet: source.sheet.clone().or_else(|| sheets.first().cloned()),
        sheets,
        dropped_columns,
        columns: schema.columns().to_vec(),
        rows: dataset.row_count(),
        preview: preview_rows(&dataset, preview),
    })
}

fn preview_rows(dataset: &Dataset, limit: usize) -> Vec<serde_json::Map<String, serde_json::Value>> {
    (0..limit.min(dataset.row_count()))
        .filter_map(|row| dataset.record(row))
        .map(|record| {
            record
                .map(|(name, value)| (name.to_string(), cell_to_json(value)))
                .collect()
        })
        .collect()
}

fn cell_to_json(value: &CellValue) -> serde_json::Value {
    match value {
        CellValue::Null => serde_json::Value::Null,
        CellValue::Bool(b) => serde_json::Value::Bool(*b),
        CellValue::Int(i) => serde_json::Value::from(*i),
        CellValue::Float(f) => serde_json::Number::from_f64(*f)
            .map(serde_json::Value::Number)
            .unwrap_or(serde_json::Value::Null),
        CellValue::DateTime(_) | CellValue::Text(_) => {
            serde_json::Value::String(value.to_string())
        }
    }
}

fn print_table(report: &InspectReport) {
    println!("{} {}", "File:".bold(), report.path.display());
    println!("{} {}", "Sheets:".bold(), report.sheets.join(", "));
    if let Some(sheet) = &report.sheet {
        println!("{} {}", "Sheet:".bold(), sheet.cyan());
    }
    if !report.dropped_columns.is_empty() {
        println!(
            "{} {}",
            "Dropped:".bold(),
            report.dropped_columns.join(", ").yellow()
        );
    }
    println!("{} {}", "Rows:".bold(), report.rows);
    println!();

    let width = report
        .columns
        .iter()
        .map(|c| c.name.chars().count())
        .max()
        .unwrap_or(0)
        .max("COLUMN".len());
    println!("  {:<width$}  {}", "COLUMN".dimmed(), "TYPE".dimmed(), width = width);
    for column in &report.columns {
        println!(
            "  {:<width$}  {}",
            column.name,
            column.sql_type.to_string().green(),
            width = width
        );
    }

    for (i, row) in report.preview.iter().enumerate() {
        println!();
        println!("{}", format!("Row {}", i + 1).bold());
        for (name, value) in row {
            println!("  {:<width$}  {}", name, value, width = width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::SqlType;
    use crate::sheet::HeaderOptions;
    use crate::sheet::fixtures::{Fx, write_workbook};

    #[tokio::test]
    async fn test_inspect_reports_types_without_database() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(
            dir.path(),
            &[
                ("说明", vec![vec![Fx::s("notes")]]),
                (
                    "24年汇总",
                    vec![
                        vec![Fx::s("序号"), Fx::s("证券代码"), Fx::s("上市日期"), Fx::s("ST")],
                        vec![Fx::n(1.0), Fx::s("000001"), Fx::date(33263.0), Fx::b(false)],
                        vec![Fx::n(2.0), Fx::s("000002"), Fx::date(33246.0), Fx::b(true)],
                    ],
                ),
            ],
        );
        let source = SourceSpec {
            path,
            sheet: Some("24年汇总".into()),
            drop_columns: vec!["序号".into()],
            headers: HeaderOptions::default(),
        };

        let report = inspect(&source, 1).await.unwrap();

        assert_eq!(report.sheets, vec!["说明", "24年汇总"]);
        assert_eq!(report.dropped_columns, vec!["序号"]);
        assert_eq!(report.rows, 2);
        let types: Vec<SqlType> = report.columns.iter().map(|c| c.sql_type).collect();
        assert_eq!(types, vec![SqlType::Text, SqlType::Timestamp, SqlType::Boolean]);

        assert_eq!(report.preview.len(), 1);
        assert_eq!(report.preview[0]["证券代码"], serde_json::json!("000001"));
        assert_eq!(report.preview[0]["ST"], serde_json::json!(false));
    }

    #[tokio::test]
    async fn test_preview_keeps_sheet_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(
            dir.path(),
            &[(
                "data",
                vec![
                    vec![Fx::s("zeta"), Fx::s("alpha"), Fx::s("mid")],
                    vec![Fx::n(1.0), Fx::n(2.0), Fx::n(3.0)],
                ],
            )],
        );
        let source = SourceSpec {
            path,
            sheet: None,
            drop_columns: vec![],
            headers: HeaderOptions::default(),
        };

        let report = inspect(&source, 1).await.unwrap();

        let columns: Vec<&str> = report.columns.iter().map(|c| c.name.as_str()).collect();
        let keys: Vec<&str> = report.preview[0].keys().map(String::as_str).collect();
        assert_eq!(columns, vec!["zeta", "alpha", "mid"]);
        assert_eq!(keys, columns);

        let json = serde_json::to_string(&report.preview[0]).unwrap();
        assert_eq!(json, r#"{"zeta":1,"alpha":2,"mid":3}"#);
    }

    #[test]
    fn test_cell_to_json() {
        assert_eq!(cell_to_json(&CellValue::Null), serde_json::Value::Null);
        assert_eq!(cell_to_json(&CellValue::Int(7)), serde_json::json!(7));
        assert_eq!(cell_to_json(&CellValue::Float(f64::NAN)), serde_json::Value::Null);
    }
}
