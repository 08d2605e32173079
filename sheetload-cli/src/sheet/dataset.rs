//! In-memory table extracted from a sheet

use super::CellValue;

/// Ordered columns and positional rows
///
/// Every row has exactly `columns.len()` cells. Column names are unique.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Dataset {
    columns: Vec<String>,
    rows: Vec<Vec<CellValue>>,
}

impl Dataset {
    /// Build a dataset, padding or truncating rows to the column count
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        debug_assert!(
            {
                let mut seen = std::collections::HashSet::new();
                columns.iter().all(|c| seen.insert(c))
            },
            "column names must be unique"
        );

        let width = columns.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, CellValue::Null);
                row
            })
            .collect();

        Self { columns, rows }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == name)
    }

    /// Cells of one column, top to bottom
    pub fn column_values(&self, index: usize) -> impl Iterator<Item = &CellValue> {
        self.rows.iter().map(move |row| &row[index])
    }

    /// A row as (column name, value) pairs
    pub fn record(&self, row: usize) -> Option<impl Iterator<Item = (&str, &CellValue)>> {
        self.rows
            .get(row)
            .map(|cells| self.columns.iter().map(String::as_str).zip(cells.iter()))
    }

    /// Remove the column at `index` from the header and from every row
    pub(crate) fn remove_column(&mut self, index: usize) -> String {
        for row in &mut self.rows {
            row.remove(index);
        }
        self.columns.remove(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rows_are_padded_to_width() {
        let ds = Dataset::new(
            vec!["a".into(), "b".into()],
            vec![vec![CellValue::Int(1)], vec![CellValue::Int(2), CellValue::Int(3)]],
        );
        assert_eq!(ds.rows()[0], vec![CellValue::Int(1), CellValue::Null]);
        assert_eq!(ds.row_count(), 2);
        assert_eq!(ds.column_count(), 2);
    }

    #[test]
    fn test_record_pairs_names_and_values() {
        let ds = Dataset::new(
            vec!["name".into(), "score".into()],
            vec![vec![CellValue::Text("x".into()), CellValue::Float(1.5)]],
        );
        let record: Vec<_> = ds.record(0).unwrap().collect();
        assert_eq!(record[0], ("name", &CellValue::Text("x".into())));
        assert_eq!(record[1], ("score", &CellValue::Float(1.5)));
        assert!(ds.record(1).is_none());
    }
}
