//! Cell value representation for loaded sheets

use calamine::Data;
use chrono::{DateTime, NaiveDate, NaiveDateTime};

/// A single cell after extraction from the workbook
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    /// Empty cell, or an Excel error value such as `#N/A`
    Null,
    Bool(bool),
    /// Whole number (also integral floats, which is how workbooks store most numbers)
    Int(i64),
    Float(f64),
    DateTime(NaiveDateTime),
    Text(String),
}

/// Largest float that converts to i64 without losing integer precision
const MAX_EXACT_INT: f64 = 9_007_199_254_740_992.0;

impl CellValue {
    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            CellValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_float(&self) -> Option<f64> {
        match self {
            CellValue::Float(f) => Some(*f),
            CellValue::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            CellValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            CellValue::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Text form used when the value lands in a TEXT column
    pub fn to_text(&self) -> Option<String> {
        match self {
            CellValue::Null => None,
            CellValue::Text(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    fn from_float(f: f64) -> Self {
        if f.fract() == 0.0 && f.abs() <= MAX_EXACT_INT {
            CellValue::Int(f as i64)
        } else {
            CellValue::Float(f)
        }
    }
}

impl From<&Data> for CellValue {
    fn from(cell: &Data) -> Self {
        match cell {
            Data::Empty => CellValue::Null,
            Data::String(s) if s.is_empty() => CellValue::Null,
            Data::String(s) => CellValue::Text(s.clone()),
            Data::Int(i) => CellValue::Int(*i),
            Data::Float(f) => CellValue::from_float(*f),
            Data::Bool(b) => CellValue::Bool(*b),
            Data::DateTime(dt) => match dt.as_datetime() {
                Some(value) => CellValue::DateTime(value),
                None => CellValue::from_float(dt.as_f64()),
            },
            Data::DateTimeIso(s) => {
                parse_iso_datetime(s).map_or_else(|| CellValue::Text(s.clone()), CellValue::DateTime)
            }
            Data::DurationIso(s) => CellValue::Text(s.clone()),
            Data::Error(e) => {
                log::debug!("Treating cell error {:?} as null", e);
                CellValue::Null
            }
        }
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

impl std::fmt::Display for CellValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CellValue::Null => write!(f, "(null)"),
            CellValue::Bool(b) => write!(f, "{}", b),
            CellValue::Int(i) => write!(f, "{}", i),
            CellValue::Float(fl) => write!(f, "{}", fl),
            CellValue::DateTime(dt) => write!(f, "{}", dt.format("%Y-%m-%d %H:%M:%S")),
            CellValue::Text(s) => write!(f, "{}", s),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_integral_floats_become_ints() {
        assert_eq!(CellValue::from(&Data::Float(3.0)), CellValue::Int(3));
        assert_eq!(CellValue::from(&Data::Float(-12.0)), CellValue::Int(-12));
        assert_eq!(CellValue::from(&Data::Float(2.5)), CellValue::Float(2.5));
        assert_eq!(CellValue::from(&Data::Float(1e20)), CellValue::Float(1e20));
    }

    #[test]
    fn test_empty_cells_are_null() {
        assert!(CellValue::from(&Data::Empty).is_null());
        assert!(CellValue::from(&Data::String(String::new())).is_null());
        assert!(
            CellValue::from(&Data::Error(calamine::CellErrorType::NA)).is_null()
        );
    }

    #[test]
    fn test_iso_strings() {
        let value = CellValue::from(&Data::DateTimeIso("2024-05-16T08:30:00".into()));
        assert_eq!(
            value.as_datetime().map(|d| d.to_string()),
            Some("2024-05-16 08:30:00".to_string())
        );

        let value = CellValue::from(&Data::DateTimeIso("2024-05-16".into()));
        assert_eq!(
            value.to_text().as_deref(),
            Some("2024-05-16 00:00:00")
        );

        let value = CellValue::from(&Data::DurationIso("PT1H".into()));
        assert_eq!(value, CellValue::Text("PT1H".into()));
    }

    #[test]
    fn test_text_form() {
        assert_eq!(CellValue::Null.to_text(), None);
        assert_eq!(CellValue::Int(7).to_text().as_deref(), Some("7"));
        assert_eq!(CellValue::Float(0.25).to_text().as_deref(), Some("0.25"));
        assert_eq!(CellValue::Bool(true).to_text().as_deref(), Some("true"));
        assert_eq!(CellValue::Text("a b".into()).to_text().as_deref(), Some("a b"));
    }
}
