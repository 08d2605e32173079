//! Spreadsheet extraction: reading one sheet into a `Dataset` and pruning columns

mod dataset;
mod prune;
mod reader;
mod value;

pub use dataset::Dataset;
pub use prune::{Pruned, drop_column, drop_columns};
pub use reader::{HeaderOptions, list_sheets, read_sheet};
pub use value::CellValue;

#[cfg(test)]
pub(crate) mod fixtures;
