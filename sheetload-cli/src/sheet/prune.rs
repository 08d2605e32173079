//! Column pruning by exact name

use super::Dataset;

/// Result of removing a column
#[derive(Debug, Clone, PartialEq)]
pub struct Pruned {
    pub dataset: Dataset,
    /// Whether the column was present and removed
    pub dropped: bool,
}

/// Remove `column` from the dataset if present
///
/// Matching is case-sensitive and exact. A missing column is not an error.
pub fn drop_column(mut dataset: Dataset, column: &str) -> Pruned {
    match dataset.column_index(column) {
        Some(index) => {
            dataset.remove_column(index);
            Pruned {
                dataset,
                dropped: true,
            }
        }
        None => Pruned {
            dataset,
            dropped: false,
        },
    }
}

/// Remove every listed column that is present, returning the names removed
pub fn drop_columns<S: AsRef<str>>(mut dataset: Dataset, columns: &[S]) -> (Dataset, Vec<String>) {
    let mut removed = Vec::new();
    for column in columns {
        let pruned = drop_column(dataset, column.as_ref());
        dataset = pruned.dataset;
        if pruned.dropped {
            removed.push(column.as_ref().to_string());
        }
    }
    (dataset, removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;

    fn sample() -> Dataset {
        Dataset::new(
            vec!["序号".into(), "公司".into(), "金额".into()],
            vec![
                vec![CellValue::Int(1), CellValue::Text("甲".into()), CellValue::Float(1.5)],
                vec![CellValue::Int(2), CellValue::Text("乙".into()), CellValue::Null],
            ],
        )
    }

    #[test]
    fn test_drop_present_column() {
        let pruned = drop_column(sample(), "序号");
        assert!(pruned.dropped);
        assert_eq!(pruned.dataset.columns(), ["公司", "金额"]);
        assert_eq!(
            pruned.dataset.rows()[0],
            vec![CellValue::Text("甲".into()), CellValue::Float(1.5)]
        );
        assert_eq!(pruned.dataset.row_count(), 2);
    }

    #[test]
    fn test_drop_is_idempotent() {
        let once = drop_column(sample(), "序号").dataset;
        let twice = drop_column(once.clone(), "序号");
        assert!(!twice.dropped);
        assert_eq!(twice.dataset, once);
    }

    #[test]
    fn test_missing_column_is_noop() {
        let pruned = drop_column(sample(), "id");
        assert!(!pruned.dropped);
        assert_eq!(pruned.dataset, sample());
    }

    #[test]
    fn test_match_is_case_sensitive() {
        let ds = Dataset::new(vec!["ID".into(), "name".into()], vec![]);
        let pruned = drop_column(ds.clone(), "id");
        assert!(!pruned.dropped);
        assert_eq!(pruned.dataset, ds);
    }

    #[test]
    fn test_drop_columns_reports_removed_names() {
        let (ds, removed) = drop_columns(sample(), &["金额", "missing", "序号"]);
        assert_eq!(removed, vec!["金额".to_string(), "序号".to_string()]);
        assert_eq!(ds.columns(), ["公司"]);
    }
}
