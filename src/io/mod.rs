mod cells;
mod csv_io;
mod excel_io;
mod json_io;

use std::path::Path;

use crate::error::SalesError;
use crate::models::SalesTable;

pub use cells::{parse_amount, parse_date, parse_quantity};
pub use csv_io::{read_csv, read_csv_from_bytes, write_csv};
pub use excel_io::{read_excel, read_excel_from_bytes, write_excel, RAW_SHEET};
pub use json_io::{read_json, read_json_from_bytes, write_json};

pub(crate) use excel_io::write_raw_sheet;

/// Trait for reading a sales table from a file.
pub trait TableReader {
    fn read(&self, path: &Path) -> Result<SalesTable, SalesError>;
}

/// Trait for writing a sales table to a file.
pub trait TableWriter {
    fn write(&self, table: &SalesTable, path: &Path) -> Result<(), SalesError>;
}

/// CSV format reader/writer.
pub struct CsvFormat;

impl TableReader for CsvFormat {
    fn read(&self, path: &Path) -> Result<SalesTable, SalesError> {
        read_csv(path)
    }
}

impl TableWriter for CsvFormat {
    fn write(&self, table: &SalesTable, path: &Path) -> Result<(), SalesError> {
        write_csv(table, path)
    }
}

/// JSON format reader/writer.
#[derive(Default)]
pub struct JsonFormat {
    pub pretty: bool,
}

impl TableReader for JsonFormat {
    fn read(&self, path: &Path) -> Result<SalesTable, SalesError> {
        read_json(path)
    }
}

impl TableWriter for JsonFormat {
    fn write(&self, table: &SalesTable, path: &Path) -> Result<(), SalesError> {
        write_json(table, path, self.pretty)
    }
}

/// Excel (.xlsx) format reader/writer.
pub struct ExcelFormat;

impl TableReader for ExcelFormat {
    fn read(&self, path: &Path) -> Result<SalesTable, SalesError> {
        read_excel(path)
    }
}

impl TableWriter for ExcelFormat {
    fn write(&self, table: &SalesTable, path: &Path) -> Result<(), SalesError> {
        write_excel(table, path)
    }
}

fn extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase()
}

/// Pick a reader from the file extension.
pub fn reader_for(path: &Path) -> Result<Box<dyn TableReader>, SalesError> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "json" => Ok(Box::new(JsonFormat::default())),
        "xlsx" | "xls" | "xlsm" | "ods" => Ok(Box::new(ExcelFormat)),
        other => Err(SalesError::UnsupportedFormat(other.to_string())),
    }
}

/// Pick a writer from the file extension.
pub fn writer_for(path: &Path, pretty: bool) -> Result<Box<dyn TableWriter>, SalesError> {
    match extension(path).as_str() {
        "csv" => Ok(Box::new(CsvFormat)),
        "json" => Ok(Box::new(JsonFormat { pretty })),
        "xlsx" => Ok(Box::new(ExcelFormat)),
        other => Err(SalesError::UnsupportedFormat(other.to_string())),
    }
}

/// Load a table, choosing the format from the file extension.
pub fn read_table(path: impl AsRef<Path>) -> Result<SalesTable, SalesError> {
    let path = path.as_ref();
    let table = reader_for(path)?.read(path)?;
    tracing::info!(
        path = %path.display(),
        records = table.len(),
        columns = table.columns().len(),
        "table loaded"
    );
    Ok(table)
}

/// Fail early with a load error for missing or zero-length files.
pub(crate) fn check_readable(path: &Path) -> Result<(), SalesError> {
    let meta = match std::fs::metadata(path) {
        Ok(meta) => meta,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(SalesError::FileNotFound(path.to_path_buf()));
        }
        Err(e) => return Err(e.into()),
    };
    if meta.len() == 0 {
        return Err(SalesError::EmptyFile(path.to_path_buf()));
    }
    Ok(())
}

pub(crate) fn table_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .unwrap_or_else(|| "Unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Column, SalesRecord};
    use chrono::NaiveDate;

    fn sample_table() -> SalesTable {
        SalesTable::new(
            "IO Trait Test",
            vec![Column::Date, Column::Region, Column::Amount],
            vec![
                SalesRecord {
                    date: NaiveDate::from_ymd_opt(2024, 1, 1),
                    region: Some("North".into()),
                    amount: Some(100.0),
                    ..Default::default()
                },
                SalesRecord {
                    date: NaiveDate::from_ymd_opt(2024, 1, 2),
                    region: Some("West".into()),
                    amount: Some(250.25),
                    ..Default::default()
                },
            ],
        )
    }

    #[test]
    fn test_csv_trait_roundtrip() {
        let table = sample_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.csv");

        let writer: &dyn TableWriter = &CsvFormat;
        writer.write(&table, &path).unwrap();

        let reader: &dyn TableReader = &CsvFormat;
        let loaded = reader.read(&path).unwrap();
        assert_eq!(loaded.len(), table.len());
        assert_eq!(loaded.columns(), table.columns());
    }

    #[test]
    fn test_json_trait_roundtrip() {
        let table = sample_table();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.json");

        let writer: &dyn TableWriter = &JsonFormat { pretty: true };
        writer.write(&table, &path).unwrap();

        let loaded = read_table(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.records()[1].amount, Some(250.25));
    }

    #[test]
    fn test_json_format_default() {
        assert!(!JsonFormat::default().pretty);
    }

    #[test]
    fn test_unsupported_extension() {
        assert!(matches!(
            read_table("data.txt"),
            Err(SalesError::UnsupportedFormat(ext)) if ext == "txt"
        ));
        assert!(writer_for(Path::new("out.parquet"), false).is_err());
    }

    #[test]
    fn test_extension_case_insensitive() {
        assert!(reader_for(Path::new("DATA.CSV")).is_ok());
        assert!(reader_for(Path::new("book.XLSX")).is_ok());
    }

    #[test]
    fn test_zero_length_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        std::fs::write(&path, "").unwrap();
        assert!(matches!(read_table(&path), Err(SalesError::EmptyFile(_))));
    }
}
