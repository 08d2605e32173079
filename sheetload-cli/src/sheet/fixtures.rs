//! Workbook builders for tests

use std::path::{Path, PathBuf};

use rust_xlsxwriter::{Format, Workbook};

/// A fixture cell
#[derive(Debug, Clone)]
pub enum Fx {
    Empty,
    Str(String),
    Num(f64),
    Bool(bool),
    /// Excel serial date, written with a date number format
    Date(f64),
}

impl Fx {
    pub fn s(value: &str) -> Self {
        Fx::Str(value.to_string())
    }

    pub fn n(value: f64) -> Self {
        Fx::Num(value)
    }

    pub fn b(value: bool) -> Self {
        Fx::Bool(value)
    }

    pub fn date(serial: f64) -> Self {
        Fx::Date(serial)
    }
}

/// Write an `.xlsx` with the given sheets into `dir` and return its path
pub fn write_workbook(dir: &Path, sheets: &[(&str, Vec<Vec<Fx>>)]) -> PathBuf {
    let path = dir.join("fixture.xlsx");
    let date_format = Format::new().set_num_format("yyyy-mm-dd");
    let mut workbook = Workbook::new();

    for (name, rows) in sheets {
        let worksheet = workbook.add_worksheet();
        worksheet.set_name(*name).unwrap();

        for (r, row) in rows.iter().enumerate() {
            for (c, cell) in row.iter().enumerate() {
                let (r, c) = (r as u32, c as u16);
                match cell {
                    Fx::Empty => {}
                    Fx::Str(s) => {
                        worksheet.write_string(r, c, s).unwrap();
                    }
                    Fx::Num(n) => {
                        worksheet.write_number(r, c, *n).unwrap();
                    }
                    Fx::Bool(b) => {
                        worksheet.write_boolean(r, c, *b).unwrap();
                    }
                    Fx::Date(serial) => {
                        worksheet
                            .write_number_with_format(r, c, *serial, &date_format)
                            .unwrap();
                    }
                }
            }
        }
    }

    workbook.save(&path).unwrap();
    path
}
