use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::SalesError;
use crate::models::{Column, SalesTable};

/// Totals for one calendar day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyBucket {
    pub date: NaiveDate,
    pub amount: f64,
    pub quantity: u64,
    /// Rows dated on this day
    pub records: usize,
    /// Rows dated on this day that carry an amount
    pub amount_records: usize,
}

impl DailyBucket {
    fn new(date: NaiveDate) -> Self {
        Self {
            date,
            amount: 0.0,
            quantity: 0,
            records: 0,
            amount_records: 0,
        }
    }

    /// A bucket is empty when none of its rows carried an amount.
    pub fn is_empty(&self) -> bool {
        self.amount_records == 0
    }
}

/// Bucket rows by calendar day, ascending. Undated rows are ignored.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sales_analyzer::{analysis::daily_buckets, Column, SalesRecord, SalesTable};
///
/// let day = NaiveDate::from_ymd_opt(2024, 1, 1);
/// let table = SalesTable::new(
///     "Example",
///     vec![Column::Date, Column::Amount],
///     vec![
///         SalesRecord { date: day, amount: Some(10.0), ..Default::default() },
///         SalesRecord { date: day, amount: Some(5.0), ..Default::default() },
///     ],
/// );
/// let buckets = daily_buckets(&table).unwrap();
/// assert_eq!(buckets.len(), 1);
/// assert_eq!(buckets[0].amount, 15.0);
/// ```
pub fn daily_buckets(table: &SalesTable) -> Result<Vec<DailyBucket>, SalesError> {
    for column in [Column::Date, Column::Amount] {
        if !table.has_column(column) {
            return Err(SalesError::MissingColumn(column));
        }
    }

    let mut days: BTreeMap<NaiveDate, DailyBucket> = BTreeMap::new();
    for record in table.records() {
        let Some(date) = record.date else {
            continue;
        };
        let bucket = days.entry(date).or_insert_with(|| DailyBucket::new(date));
        bucket.records += 1;
        if let Some(amount) = record.amount {
            bucket.amount += amount;
            bucket.amount_records += 1;
        }
        bucket.quantity += u64::from(record.quantity.unwrap_or(0));
    }

    Ok(days.into_values().collect())
}

/// Percentage change from the first to the last non-empty daily bucket.
pub fn growth_rate(buckets: &[DailyBucket]) -> Result<f64, SalesError> {
    let mut non_empty = buckets.iter().filter(|b| !b.is_empty());
    let (Some(first), Some(last)) = (non_empty.next(), non_empty.last()) else {
        return Err(SalesError::InsufficientData(
            "need at least two days with sales to compute growth".to_string(),
        ));
    };
    if first.amount == 0.0 {
        return Err(SalesError::AnalysisError(format!(
            "growth is undefined: total on {} is zero",
            first.date
        )));
    }
    Ok((last.amount - first.amount) / first.amount * 100.0)
}
