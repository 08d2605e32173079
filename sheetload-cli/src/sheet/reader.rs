//! Read one sheet of a workbook into a `Dataset`

use std::collections::HashSet;
use std::path::Path;

use calamine::{Data, Reader, open_workbook_auto};
use once_cell::sync::Lazy;
use regex::Regex;

use super::{CellValue, Dataset};
use crate::error::ExtractError;

/// How header cells become column names
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HeaderOptions {
    /// Trim names, collapse whitespace to `_`, strip quoting characters
    pub normalize: bool,
}

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static QUOTING: Lazy<Regex> = Lazy::new(|| Regex::new(r#"[`"\[\]()]"#).expect("valid regex"));

/// List the sheet names of a workbook in file order
pub fn list_sheets(path: &Path) -> Result<Vec<String>, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound);
    }
    let workbook = open_workbook_auto(path)?;
    Ok(workbook.sheet_names())
}

/// Read `sheet` (or the first sheet when `None`) from the workbook at `path`
///
/// The first non-empty row is the header. Rows whose cells are all empty are
/// skipped. Supports every format calamine detects from the extension.
pub fn read_sheet(
    path: &Path,
    sheet: Option<&str>,
    options: HeaderOptions,
) -> Result<Dataset, ExtractError> {
    if !path.exists() {
        return Err(ExtractError::FileNotFound);
    }

    let mut workbook = open_workbook_auto(path)?;
    let available = workbook.sheet_names();

    let sheet_name = match sheet {
        Some(name) if available.iter().any(|s| s == name) => name.to_string(),
        Some(name) => {
            return Err(ExtractError::SheetNotFound {
                sheet: name.to_string(),
                available,
            });
        }
        None => available.first().cloned().ok_or(ExtractError::NoSheets)?,
    };

    let range = workbook.worksheet_range(&sheet_name)?;
    let (height, width) = range.get_size();
    log::debug!(
        "Sheet '{}' used range is {} rows x {} columns",
        sheet_name,
        height,
        width
    );

    let mut rows = range.rows().filter(|row| !is_blank(row));

    let header = rows
        .next()
        .ok_or_else(|| ExtractError::NoHeader(sheet_name.clone()))?;
    let columns = column_names(header, options);

    let data: Vec<Vec<CellValue>> = rows
        .map(|row| row.iter().map(CellValue::from).collect())
        .collect();

    log::info!(
        "Read {} rows and {} columns from sheet '{}'",
        data.len(),
        columns.len(),
        sheet_name
    );

    Ok(Dataset::new(columns, data))
}

fn is_blank(row: &[Data]) -> bool {
    row.iter().all(|cell| CellValue::from(cell).is_null())
}

/// Turn header cells into unique column names
///
/// Empty headers become `Unnamed: <index>` and repeated names get a `.N`
/// suffix, the same scheme dataframe libraries use.
fn column_names(header: &[Data], options: HeaderOptions) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut names = Vec::with_capacity(header.len());

    for (index, cell) in header.iter().enumerate() {
        let mut name = match CellValue::from(cell) {
            CellValue::Null => String::new(),
            value => value.to_string(),
        };
        if options.normalize {
            name = normalize_header(&name);
        }
        if name.is_empty() {
            name = format!("Unnamed: {}", index);
        }

        let unique = if seen.contains(&name) {
            (1..)
                .map(|n| format!("{}.{}", name, n))
                .find(|candidate| !seen.contains(candidate))
                .unwrap_or_default()
        } else {
            name
        };

        seen.insert(unique.clone());
        names.push(unique);
    }

    names
}

fn normalize_header(name: &str) -> String {
    let trimmed = name.trim();
    let underscored = WHITESPACE.replace_all(trimmed, "_");
    QUOTING.replace_all(&underscored, "").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::fixtures::{Fx, write_workbook};

    #[test]
    fn test_read_named_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(
            dir.path(),
            &[
                ("other", vec![vec![Fx::s("x")], vec![Fx::n(1.0)]]),
                (
                    "24年汇总",
                    vec![
                        vec![Fx::s("序号"), Fx::s("证券代码"), Fx::s("金额"), Fx::s("上市")],
                        vec![Fx::n(1.0), Fx::s("000001"), Fx::n(12.5), Fx::b(true)],
                        vec![Fx::n(2.0), Fx::s("000002"), Fx::n(7.0), Fx::b(false)],
                    ],
                ),
            ],
        );

        let ds = read_sheet(&path, Some("24年汇总"), HeaderOptions::default()).unwrap();
        assert_eq!(ds.columns(), ["序号", "证券代码", "金额", "上市"]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(
            ds.rows()[0],
            vec![
                CellValue::Int(1),
                CellValue::Text("000001".into()),
                CellValue::Float(12.5),
                CellValue::Bool(true),
            ]
        );
        assert_eq!(ds.rows()[1][2], CellValue::Int(7));
    }

    #[test]
    fn test_defaults_to_first_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(
            dir.path(),
            &[
                ("first", vec![vec![Fx::s("a")], vec![Fx::n(1.0)]]),
                ("second", vec![vec![Fx::s("b")], vec![Fx::n(2.0)]]),
            ],
        );

        let ds = read_sheet(&path, None, HeaderOptions::default()).unwrap();
        assert_eq!(ds.columns(), ["a"]);
        assert_eq!(list_sheets(&path).unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn test_missing_sheet() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(dir.path(), &[("data", vec![vec![Fx::s("a")]])]);

        let err = read_sheet(&path, Some("nope"), HeaderOptions::default()).unwrap_err();
        match err {
            ExtractError::SheetNotFound { sheet, available } => {
                assert_eq!(sheet, "nope");
                assert_eq!(available, vec!["data".to_string()]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_sheet(&dir.path().join("absent.xlsx"), None, HeaderOptions::default())
            .unwrap_err();
        assert!(matches!(err, ExtractError::FileNotFound));
    }

    #[test]
    fn test_blank_rows_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(
            dir.path(),
            &[(
                "data",
                vec![
                    vec![Fx::s("a"), Fx::s("b")],
                    vec![Fx::n(1.0), Fx::s("x")],
                    vec![Fx::Empty, Fx::Empty],
                    vec![Fx::Empty, Fx::s("y")],
                ],
            )],
        );

        let ds = read_sheet(&path, None, HeaderOptions::default()).unwrap();
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.rows()[1], vec![CellValue::Null, CellValue::Text("y".into())]);
    }

    #[test]
    fn test_date_cells() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(
            dir.path(),
            &[("data", vec![vec![Fx::s("报告时间")], vec![Fx::date(45428.0)]])],
        );

        let ds = read_sheet(&path, None, HeaderOptions::default()).unwrap();
        assert_eq!(
            ds.rows()[0][0].as_datetime().map(|d| d.to_string()),
            Some("2024-05-16 00:00:00".to_string())
        );
    }

    #[test]
    fn test_header_only_sheet_has_no_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_workbook(dir.path(), &[("data", vec![vec![Fx::s("a"), Fx::s("b")]])]);

        let ds = read_sheet(&path, None, HeaderOptions::default()).unwrap();
        assert_eq!(ds.columns(), ["a", "b"]);
        assert_eq!(ds.row_count(), 0);
    }

    #[test]
    fn test_column_names_unnamed_and_duplicates() {
        let header = vec![
            Data::String("a".into()),
            Data::Empty,
            Data::String("a".into()),
            Data::Float(2024.0),
            Data::String("a.1".into()),
        ];
        assert_eq!(
            column_names(&header, HeaderOptions::default()),
            vec!["a", "Unnamed: 1", "a.1", "2024", "a.1.1"]
        );
    }

    #[test]
    fn test_normalized_headers() {
        let header = vec![
            Data::String("  公司 名称 ".into()),
            Data::String("金额(万元)".into()),
            Data::String("\"quoted\"".into()),
        ];
        assert_eq!(
            column_names(&header, HeaderOptions { normalize: true }),
            vec!["公司_名称", "金额万元", "quoted"]
        );
        assert_eq!(
            column_names(&header, HeaderOptions::default())[0],
            "  公司 名称 "
        );
    }
}
