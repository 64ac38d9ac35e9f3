use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Column;

/// A single sales transaction. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesRecord {
    /// Calendar day of the sale
    pub date: Option<NaiveDate>,
    pub product: Option<String>,
    pub region: Option<String>,
    /// Sale value in currency units
    pub amount: Option<f64>,
    /// Units sold
    pub quantity: Option<u32>,
    pub salesperson: Option<String>,
}

impl SalesRecord {
    /// Text value of a categorical column, if present.
    pub fn text(&self, column: Column) -> Option<&str> {
        match column {
            Column::Product => self.product.as_deref(),
            Column::Region => self.region.as_deref(),
            Column::Salesperson => self.salesperson.as_deref(),
            _ => None,
        }
    }

    /// Numeric value of a numeric column, if present.
    pub fn number(&self, column: Column) -> Option<f64> {
        match column {
            Column::Amount => self.amount,
            Column::Quantity => self.quantity.map(f64::from),
            _ => None,
        }
    }

    /// Display form of any column; empty string when missing.
    pub fn display_value(&self, column: Column) -> String {
        match column {
            Column::Date => self
                .date
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            Column::Amount => self.amount.map(|a| format!("{a:.2}")).unwrap_or_default(),
            Column::Quantity => self.quantity.map(|q| q.to_string()).unwrap_or_default(),
            _ => self.text(column).unwrap_or_default().to_string(),
        }
    }

    /// True when no field carries a value.
    pub fn is_blank(&self) -> bool {
        self.date.is_none()
            && self.product.is_none()
            && self.region.is_none()
            && self.amount.is_none()
            && self.quantity.is_none()
            && self.salesperson.is_none()
    }
}
