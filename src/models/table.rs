use serde::{Deserialize, Serialize};

use super::{Column, SalesRecord};

/// Bookkeeping from a lenient load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadReport {
    /// Rows dropped because neither a date nor an amount could be parsed
    pub skipped_rows: usize,
    /// Cells whose malformed value was treated as missing
    pub invalid_cells: usize,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_rows == 0 && self.invalid_cells == 0
    }
}

/// An immutable, ordered collection of sales records loaded from one source.
///
/// `columns` lists the recognized columns the source actually carried, in
/// source order. A record field whose column is absent is always `None`.
#[derive(Debug, Clone, PartialEq)]
pub struct SalesTable {
    name: String,
    columns: Vec<Column>,
    records: Vec<SalesRecord>,
    report: LoadReport,
}

impl SalesTable {
    /// Build a table; duplicate columns are collapsed to their first position.
    ///
    /// # Examples
    ///
    /// ```
    /// use sales_analyzer::{Column, SalesRecord, SalesTable};
    ///
    /// let table = SalesTable::new(
    ///     "Example",
    ///     vec![Column::Product, Column::Amount],
    ///     vec![SalesRecord { product: Some("Laptop".into()), amount: Some(999.0), ..Default::default() }],
    /// );
    /// assert_eq!(table.len(), 1);
    /// assert!(table.has_column(Column::Amount));
    /// assert!(!table.has_column(Column::Date));
    /// ```
    pub fn new(name: impl Into<String>, columns: Vec<Column>, records: Vec<SalesRecord>) -> Self {
        let mut unique: Vec<Column> = Vec::with_capacity(columns.len());
        for c in columns {
            if !unique.contains(&c) {
                unique.push(c);
            }
        }
        Self {
            name: name.into(),
            columns: unique,
            records,
            report: LoadReport::default(),
        }
    }

    pub fn with_report(mut self, report: LoadReport) -> Self {
        self.report = report;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn records(&self) -> &[SalesRecord] {
        &self.records
    }

    pub fn load_report(&self) -> LoadReport {
        self.report
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: Column) -> bool {
        self.columns.contains(&column)
    }

    /// First `n` records.
    pub fn head(&self, n: usize) -> &[SalesRecord] {
        &self.records[..n.min(self.records.len())]
    }

    /// Non-missing values of a numeric column, in row order.
    pub fn numeric_values(&self, column: Column) -> Vec<f64> {
        self.records.iter().filter_map(|r| r.number(column)).collect()
    }
}
