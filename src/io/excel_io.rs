use std::path::Path;

use calamine::{open_workbook_auto, Data, DataType, Reader};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::debug;

use crate::error::SalesError;
use crate::models::{Column, SalesTable};

use super::cells::{CellValue, TableBuilder};
use super::{check_readable, table_name};

/// Sheet name used for the raw records in every workbook this crate writes.
pub const RAW_SHEET: &str = "Raw Data";

fn cell_from_excel(cell: &Data) -> CellValue {
    match cell {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Float(f) => CellValue::Number(*f),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Bool(b) => CellValue::Text(b.to_string()),
        Data::DateTime(_) | Data::DateTimeIso(_) => cell
            .as_date()
            .map(CellValue::Date)
            .unwrap_or_else(|| CellValue::Text(cell.to_string())),
        Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Text(e.to_string()),
    }
}

/// Read a sales table from the first worksheet of an Excel workbook.
///
/// The first row holds the headers; recognized headers are
/// Date, Product, Region, Amount, Quantity and Salesperson in any order.
pub fn read_excel(path: impl AsRef<Path>) -> Result<SalesTable, SalesError> {
    let path = path.as_ref();
    check_readable(path)?;
    read_workbook(path, &table_name(path))
}

fn read_workbook(path: &Path, name: &str) -> Result<SalesTable, SalesError> {
    let mut workbook = open_workbook_auto(path)?;

    let sheet_name = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| SalesError::Excel("No sheets found in workbook".to_string()))?;
    debug!(sheet = %sheet_name, "reading worksheet");

    let range = workbook.worksheet_range(&sheet_name)?;
    let mut rows = range.rows();

    let Some(header) = rows.next() else {
        return Err(SalesError::EmptyFile(name.into()));
    };
    let mut mapped: Vec<(usize, Column)> = Vec::new();
    for (idx, cell) in header.iter().enumerate() {
        if let Some(col) = Column::from_header(&cell.to_string()) {
            if !mapped.iter().any(|(_, c)| *c == col) {
                mapped.push((idx, col));
            }
        }
    }

    let mut builder = TableBuilder::new(name, mapped.iter().map(|(_, c)| *c).collect())?;
    for (row_index, row) in rows.enumerate() {
        let cells = mapped
            .iter()
            .map(|(idx, col)| {
                let cell = row.get(*idx).map(cell_from_excel).unwrap_or(CellValue::Empty);
                (*col, cell)
            })
            .collect();
        builder.push_row(row_index, cells);
    }

    builder.finish()
}

/// Read a sales table from Excel bytes.
pub fn read_excel_from_bytes(data: &[u8], name: &str) -> Result<SalesTable, SalesError> {
    use std::io::Write;
    if data.is_empty() {
        return Err(SalesError::EmptyFile(name.into()));
    }
    let mut tmp = tempfile::Builder::new().suffix(".xlsx").tempfile()?;
    tmp.write_all(data)?;
    tmp.flush()?;
    read_workbook(tmp.path(), name)
}

/// Fill `worksheet` with a header row and one row per record.
pub(crate) fn write_raw_sheet(worksheet: &mut Worksheet, table: &SalesTable) -> Result<(), SalesError> {
    let bold = Format::new().set_bold();
    worksheet.set_name(RAW_SHEET)?;

    for (col, column) in table.columns().iter().enumerate() {
        worksheet.write_string_with_format(0, col as u16, column.name(), &bold)?;
    }

    for (idx, record) in table.records().iter().enumerate() {
        let row = idx as u32 + 1;
        for (col, column) in table.columns().iter().enumerate() {
            let col = col as u16;
            match column {
                Column::Amount => {
                    if let Some(amount) = record.amount {
                        worksheet.write_number(row, col, amount)?;
                    }
                }
                Column::Quantity => {
                    if let Some(q) = record.quantity {
                        worksheet.write_number(row, col, f64::from(q))?;
                    }
                }
                _ => {
                    let value = record.display_value(*column);
                    if !value.is_empty() {
                        worksheet.write_string(row, col, value)?;
                    }
                }
            }
        }
    }

    worksheet.autofit();
    Ok(())
}

/// Write the raw records to a single-sheet Excel (.xlsx) workbook.
pub fn write_excel(table: &SalesTable, path: impl AsRef<Path>) -> Result<(), SalesError> {
    let mut workbook = Workbook::new();
    write_raw_sheet(workbook.add_worksheet(), table)?;
    workbook.save(path.as_ref())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesRecord;
    use chrono::NaiveDate;

    fn sample_table() -> SalesTable {
        SalesTable::new(
            "xlsx",
            vec![Column::Date, Column::Product, Column::Amount, Column::Quantity],
            vec![
                SalesRecord {
                    date: NaiveDate::from_ymd_opt(2024, 2, 1),
                    product: Some("Laptop".into()),
                    amount: Some(999.99),
                    quantity: Some(1),
                    ..Default::default()
                },
                SalesRecord {
                    date: NaiveDate::from_ymd_opt(2024, 2, 2),
                    product: None,
                    amount: Some(20.0),
                    quantity: None,
                    ..Default::default()
                },
            ],
        )
    }

    #[test]
    fn test_cell_conversion() {
        assert_eq!(cell_from_excel(&Data::Empty), CellValue::Empty);
        assert_eq!(cell_from_excel(&Data::Int(3)), CellValue::Number(3.0));
        assert_eq!(
            cell_from_excel(&Data::String("x".into())),
            CellValue::Text("x".into())
        );
    }

    #[test]
    fn test_excel_roundtrip() {
        let table = sample_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.xlsx");
        write_excel(&table, &path).unwrap();

        let loaded = read_excel(&path).unwrap();
        assert_eq!(loaded.name(), "raw");
        assert_eq!(loaded.columns(), table.columns());
        assert_eq!(loaded.records(), table.records());
    }

    #[test]
    fn test_excel_from_bytes() {
        let table = sample_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("raw.xlsx");
        write_excel(&table, &path).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        let loaded = read_excel_from_bytes(&bytes, "upload").unwrap();
        assert_eq!(loaded.name(), "upload");
        assert_eq!(loaded.len(), 2);
    }

    #[test]
    fn test_garbage_bytes_fail() {
        let err = read_excel_from_bytes(b"this is not a workbook", "bad").unwrap_err();
        assert!(err.is_load_error());
    }
}
