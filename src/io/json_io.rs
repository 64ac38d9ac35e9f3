use std::path::Path;

use serde_json::{Map, Value};

use crate::error::SalesError;
use crate::models::{Column, SalesRecord, SalesTable};

use super::cells::{CellValue, TableBuilder};
use super::{check_readable, table_name};

fn cell_from_json(value: &Value) -> CellValue {
    match value {
        Value::Null => CellValue::Empty,
        Value::String(s) => CellValue::Text(s.clone()),
        Value::Number(n) => n.as_f64().map(CellValue::Number).unwrap_or(CellValue::Empty),
        other => CellValue::Text(other.to_string()),
    }
}

/// Accepts either a bare array of record objects or `{"records": [...]}`.
fn record_list(value: Value) -> Result<Vec<Value>, SalesError> {
    match value {
        Value::Array(items) => Ok(items),
        Value::Object(mut map) => match map.remove("records") {
            Some(Value::Array(items)) => Ok(items),
            _ => Err(SalesError::ParseError(
                "expected an array of records or an object with a \"records\" array".to_string(),
            )),
        },
        _ => Err(SalesError::ParseError(
            "expected an array of records".to_string(),
        )),
    }
}

fn parse_json_records(content: &str, name: &str) -> Result<SalesTable, SalesError> {
    if content.trim().is_empty() {
        return Err(SalesError::EmptyFile(name.into()));
    }
    let items = record_list(serde_json::from_str(content)?)?;
    if items.is_empty() {
        return Err(SalesError::EmptyFile(name.into()));
    }

    let mut columns: Vec<Column> = Vec::new();
    for obj in items.iter().filter_map(Value::as_object) {
        for key in obj.keys() {
            if let Some(col) = Column::from_header(key) {
                if !columns.contains(&col) {
                    columns.push(col);
                }
            }
        }
    }

    let mut builder = TableBuilder::new(name, columns.clone())?;
    for (row_index, item) in items.iter().enumerate() {
        let Some(obj) = item.as_object() else {
            builder.skip_row(row_index);
            continue;
        };
        let cells = columns
            .iter()
            .map(|col| {
                let cell = obj
                    .iter()
                    .find(|(k, _)| Column::from_header(k) == Some(*col))
                    .map(|(_, v)| cell_from_json(v))
                    .unwrap_or(CellValue::Empty);
                (*col, cell)
            })
            .collect();
        builder.push_row(row_index, cells);
    }

    builder.finish()
}

/// Read a sales table from a JSON file holding a list of records.
pub fn read_json(path: impl AsRef<Path>) -> Result<SalesTable, SalesError> {
    let path = path.as_ref();
    check_readable(path)?;
    let content = std::fs::read_to_string(path)?;
    parse_json_records(&content, &table_name(path))
}

/// Read a sales table from JSON bytes.
pub fn read_json_from_bytes(data: &[u8], name: &str) -> Result<SalesTable, SalesError> {
    let content = std::str::from_utf8(data)
        .map_err(|e| SalesError::ParseError(format!("Invalid UTF-8: {e}")))?;
    parse_json_records(content, name)
}

fn record_to_json(record: &SalesRecord, columns: &[Column]) -> Value {
    let mut obj = Map::new();
    for col in columns {
        let value = match col {
            Column::Date => record
                .date
                .map(|d| Value::String(d.format("%Y-%m-%d").to_string()))
                .unwrap_or(Value::Null),
            Column::Amount => record
                .amount
                .and_then(serde_json::Number::from_f64)
                .map(Value::Number)
                .unwrap_or(Value::Null),
            Column::Quantity => record.quantity.map(Value::from).unwrap_or(Value::Null),
            _ => record
                .text(*col)
                .map(|s| Value::String(s.to_string()))
                .unwrap_or(Value::Null),
        };
        obj.insert(col.name().to_string(), value);
    }
    Value::Object(obj)
}

/// Write the table as a JSON array of records. Missing values become `null`.
pub fn write_json(
    table: &SalesTable,
    path: impl AsRef<Path>,
    pretty: bool,
) -> Result<(), SalesError> {
    let records: Vec<Value> = table
        .records()
        .iter()
        .map(|r| record_to_json(r, table.columns()))
        .collect();
    let value = Value::Array(records);
    let content = if pretty {
        serde_json::to_string_pretty(&value)?
    } else {
        serde_json::to_string(&value)?
    };
    std::fs::write(path.as_ref(), content)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"[
        {"Date": "2024-01-01", "Product": "Laptop", "Region": "North", "Amount": 1200.0, "Quantity": 1},
        {"Date": "2024-01-02", "Product": "Mouse", "Region": "South", "Amount": "25.50", "Quantity": "3"},
        {"date": "2024-01-03", "product": "Keyboard", "amount": null}
    ]"#;

    #[test]
    fn test_read_json_from_bytes() {
        let table = read_json_from_bytes(SAMPLE.as_bytes(), "sample").unwrap();
        assert_eq!(table.len(), 3);
        assert_eq!(table.records()[0].amount, Some(1200.0));
        assert_eq!(table.records()[1].amount, Some(25.5));
        assert_eq!(table.records()[1].quantity, Some(3));
        assert_eq!(table.records()[2].amount, None);
        assert!(table.has_column(Column::Region));
        assert!(!table.has_column(Column::Salesperson));
    }

    #[test]
    fn test_records_wrapper_object() {
        let data = r#"{"records": [{"Amount": 5}]}"#;
        let table = read_json_from_bytes(data.as_bytes(), "t").unwrap();
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_non_object_items_are_skipped() {
        let data = r#"[{"Amount": 5}, 42, "text"]"#;
        let table = read_json_from_bytes(data.as_bytes(), "t").unwrap();
        assert_eq!(table.len(), 1);
        assert_eq!(table.load_report().skipped_rows, 2);
    }

    #[test]
    fn test_empty_array_is_empty_file() {
        assert!(matches!(
            read_json_from_bytes(b"[]", "t"),
            Err(SalesError::EmptyFile(_))
        ));
    }

    #[test]
    fn test_invalid_json() {
        assert!(matches!(
            read_json_from_bytes(b"{not json", "t"),
            Err(SalesError::Json(_))
        ));
    }

    #[test]
    fn test_scalar_top_level_rejected() {
        assert!(matches!(
            read_json_from_bytes(b"42", "t"),
            Err(SalesError::ParseError(_))
        ));
    }

    #[test]
    fn test_write_then_read() {
        let table = read_json_from_bytes(SAMPLE.as_bytes(), "sample").unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.json");
        write_json(&table, &path, true).unwrap();

        let loaded = read_json(&path).unwrap();
        assert_eq!(loaded.len(), table.len());
        assert_eq!(loaded.records(), table.records());
        for col in table.columns() {
            assert!(loaded.has_column(*col));
        }
    }
}
