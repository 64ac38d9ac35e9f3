use std::path::PathBuf;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use tracing::{debug, warn};

use crate::error::SalesError;
use crate::models::{Column, LoadReport, SalesRecord, SalesTable};

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M",
];

/// A raw cell as decoded by one of the format readers.
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum CellValue {
    Empty,
    Text(String),
    Number(f64),
    Date(NaiveDate),
    /// Bytes that could not be decoded, kept lossily for diagnostics.
    Invalid(String),
}

impl CellValue {
    fn is_empty(&self) -> bool {
        match self {
            CellValue::Empty => true,
            CellValue::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }
}

/// Parse a calendar date, truncating any time-of-day component.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(s, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(s, f).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
}

/// Parse a currency amount such as `1234.5`, `$1,234.50` or ` 99 `.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| !matches!(c, '$' | ',' | ' '))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Parse a non-negative whole quantity; integral floats like `3.0` are accepted.
pub fn parse_quantity(s: &str) -> Option<u32> {
    let s = s.trim();
    s.parse::<u32>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().and_then(quantity_from_f64))
}

fn quantity_from_f64(v: f64) -> Option<u32> {
    if v.is_finite() && v >= 0.0 && v.fract() == 0.0 && v <= f64::from(u32::MAX) {
        Some(v as u32)
    } else {
        None
    }
}

fn number_to_text(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        format!("{}", v as i64)
    } else {
        v.to_string()
    }
}

fn text_field(cell: CellValue) -> Option<String> {
    match cell {
        CellValue::Empty => None,
        CellValue::Text(s) => {
            let s = s.trim();
            (!s.is_empty()).then(|| s.to_string())
        }
        CellValue::Number(v) => Some(number_to_text(v)),
        CellValue::Date(d) => Some(d.format("%Y-%m-%d").to_string()),
        CellValue::Invalid(_) => None,
    }
}

/// Accumulates rows into a [`SalesTable`], turning malformed cells into
/// missing values instead of failing the load.
pub(crate) struct TableBuilder {
    name: String,
    columns: Vec<Column>,
    records: Vec<SalesRecord>,
    report: LoadReport,
    data_rows: usize,
}

impl TableBuilder {
    pub fn new(name: impl Into<String>, columns: Vec<Column>) -> Result<Self, SalesError> {
        if columns.is_empty() {
            return Err(SalesError::NoRecognizedColumns);
        }
        Ok(Self {
            name: name.into(),
            columns,
            records: Vec::new(),
            report: LoadReport::default(),
            data_rows: 0,
        })
    }

    /// Add one source row. `row_index` is only used for diagnostics.
    pub fn push_row(&mut self, row_index: usize, cells: Vec<(Column, CellValue)>) {
        if cells.iter().all(|(_, c)| c.is_empty()) {
            return;
        }
        self.data_rows += 1;

        let mut record = SalesRecord::default();
        for (column, cell) in cells {
            if cell.is_empty() {
                continue;
            }
            if !self.assign(&mut record, column, cell.clone()) {
                self.report.invalid_cells += 1;
                debug!(row = row_index, %column, value = ?cell, "invalid cell treated as missing");
            }
        }

        if self.keep(&record) {
            self.records.push(record);
        } else {
            self.report.skipped_rows += 1;
            debug!(row = row_index, "row skipped: no parsable date or amount");
        }
    }

    /// Count a source row that could not be interpreted at all.
    pub fn skip_row(&mut self, row_index: usize) {
        self.data_rows += 1;
        self.report.skipped_rows += 1;
        debug!(row = row_index, "row skipped: not a record");
    }

    fn assign(&self, record: &mut SalesRecord, column: Column, cell: CellValue) -> bool {
        match column {
            Column::Date => {
                record.date = match cell {
                    CellValue::Date(d) => Some(d),
                    CellValue::Text(s) => parse_date(&s),
                    _ => None,
                };
                record.date.is_some()
            }
            Column::Amount => {
                record.amount = match cell {
                    CellValue::Number(v) if v.is_finite() => Some(v),
                    CellValue::Text(s) => parse_amount(&s),
                    _ => None,
                };
                record.amount.is_some()
            }
            Column::Quantity => {
                record.quantity = match cell {
                    CellValue::Number(v) => quantity_from_f64(v),
                    CellValue::Text(s) => parse_quantity(&s),
                    _ => None,
                };
                record.quantity.is_some()
            }
            Column::Product | Column::Region | Column::Salesperson => {
                if matches!(cell, CellValue::Invalid(_)) {
                    return false;
                }
                let value = text_field(cell);
                match column {
                    Column::Product => record.product = value,
                    Column::Region => record.region = value,
                    _ => record.salesperson = value,
                }
                true
            }
        }
    }

    fn keep(&self, record: &SalesRecord) -> bool {
        let keyed = self.columns.contains(&Column::Date) || self.columns.contains(&Column::Amount);
        if keyed {
            record.date.is_some() || record.amount.is_some()
        } else {
            !record.is_blank()
        }
    }

    /// Finish the load. A source without any data row is an empty file.
    pub fn finish(self) -> Result<SalesTable, SalesError> {
        if self.data_rows == 0 {
            return Err(SalesError::EmptyFile(PathBuf::from(&self.name)));
        }
        if !self.report.is_clean() {
            warn!(
                table = %self.name,
                skipped_rows = self.report.skipped_rows,
                invalid_cells = self.report.invalid_cells,
                "loaded with malformed values"
            );
        }
        Ok(SalesTable::new(self.name, self.columns, self.records).with_report(self.report))
    }
}
