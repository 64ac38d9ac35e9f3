use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::error::SalesError;
use crate::models::{Column, SalesTable};

use super::cells::{CellValue, TableBuilder};
use super::{check_readable, table_name};

/// Map header cells to known columns, keeping their source positions.
fn header_columns(headers: &csv::StringRecord) -> Vec<(usize, Column)> {
    let mut mapped: Vec<(usize, Column)> = Vec::new();
    for (idx, header) in headers.iter().enumerate() {
        match Column::from_header(header) {
            Some(col) if !mapped.iter().any(|(_, c)| *c == col) => mapped.push((idx, col)),
            Some(col) => debug!(%col, "duplicate column ignored"),
            None => debug!(header, "unrecognized column ignored"),
        }
    }
    mapped
}

/// A field that is not valid UTF-8 becomes an invalid cell, not a read error.
fn decode_cell(raw: Option<&[u8]>) -> CellValue {
    match raw.map(|bytes| (bytes, std::str::from_utf8(bytes))) {
        Some((_, Ok(s))) if !s.trim().is_empty() => CellValue::Text(s.to_string()),
        Some((bytes, Err(_))) => CellValue::Invalid(String::from_utf8_lossy(bytes).into_owned()),
        _ => CellValue::Empty,
    }
}

fn parse_csv_records<R: Read>(
    rdr: &mut csv::Reader<R>,
    name: &str,
) -> Result<SalesTable, SalesError> {
    let headers = rdr.headers()?.clone();
    if headers.iter().all(|h| h.trim().is_empty()) {
        return Err(SalesError::EmptyFile(name.into()));
    }

    let mapped = header_columns(&headers);
    let mut builder = TableBuilder::new(name, mapped.iter().map(|(_, c)| *c).collect())?;

    for (row_index, result) in rdr.byte_records().enumerate() {
        let record = result?;
        let cells = mapped
            .iter()
            .map(|(idx, col)| (*col, decode_cell(record.get(*idx))))
            .collect();
        builder.push_row(row_index, cells);
    }

    builder.finish()
}

fn reader_builder() -> csv::ReaderBuilder {
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::All);
    builder
}

/// Read a sales table from a CSV file.
pub fn read_csv(path: impl AsRef<Path>) -> Result<SalesTable, SalesError> {
    let path = path.as_ref();
    check_readable(path)?;
    let mut rdr = reader_builder().from_path(path)?;
    parse_csv_records(&mut rdr, &table_name(path))
}

/// Read a sales table from CSV bytes.
pub fn read_csv_from_bytes(data: &[u8], name: &str) -> Result<SalesTable, SalesError> {
    if data.iter().all(|b| b.is_ascii_whitespace()) {
        return Err(SalesError::EmptyFile(name.into()));
    }
    let mut rdr = reader_builder().from_reader(data);
    parse_csv_records(&mut rdr, name)
}

/// Write the table's columns and records to a CSV file.
pub fn write_csv(table: &SalesTable, path: impl AsRef<Path>) -> Result<(), SalesError> {
    let mut wtr = csv::Writer::from_path(path.as_ref())?;

    wtr.write_record(table.columns().iter().map(|c| c.name()))?;
    for record in table.records() {
        wtr.write_record(table.columns().iter().map(|c| record.display_value(*c)))?;
    }

    wtr.flush()?;
    Ok(())
}
