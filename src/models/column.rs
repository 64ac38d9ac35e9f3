use serde::{Deserialize, Serialize};

/// A recognized column of a sales table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Column {
    Date,
    Product,
    Region,
    Amount,
    Quantity,
    Salesperson,
}

impl Column {
    /// All columns in canonical order.
    pub const ALL: [Column; 6] = [
        Column::Date,
        Column::Product,
        Column::Region,
        Column::Amount,
        Column::Quantity,
        Column::Salesperson,
    ];

    /// Canonical header name, as written by the exporters.
    pub fn name(&self) -> &'static str {
        match self {
            Column::Date => "Date",
            Column::Product => "Product",
            Column::Region => "Region",
            Column::Amount => "Amount",
            Column::Quantity => "Quantity",
            Column::Salesperson => "Salesperson",
        }
    }

    /// Match a header cell against the known columns (case-insensitive, trimmed).
    pub fn from_header(header: &str) -> Option<Column> {
        let header = header.trim();
        Column::ALL
            .into_iter()
            .find(|c| c.name().eq_ignore_ascii_case(header))
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Column::Amount | Column::Quantity)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
