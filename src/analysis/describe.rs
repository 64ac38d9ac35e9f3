use serde::{Deserialize, Serialize};
use statrs::statistics::Statistics;

use crate::models::{Column, SalesTable};

/// Descriptive statistics for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnStats {
    pub column: Column,
    pub count: usize,
    pub mean: f64,
    /// Sample standard deviation; `None` with fewer than two values
    pub std_dev: Option<f64>,
    pub min: f64,
    pub q1: f64,
    pub median: f64,
    pub q3: f64,
    pub max: f64,
}

/// Percentile of sorted values with linear interpolation between ranks.
fn percentile(sorted: &[f64], p: f64) -> f64 {
    let n = sorted.len();
    if n == 1 {
        return sorted[0];
    }
    let rank = p * (n - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = (rank.ceil() as usize).min(n - 1);
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Compute statistics for a set of values, or `None` when there are none.
pub fn column_stats(column: Column, values: &[f64]) -> Option<ColumnStats> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let std_dev = (values.len() > 1).then(|| Statistics::std_dev(values));

    Some(ColumnStats {
        column,
        count: values.len(),
        mean: Statistics::mean(values),
        std_dev,
        min: sorted[0],
        q1: percentile(&sorted, 0.25),
        median: percentile(&sorted, 0.5),
        q3: percentile(&sorted, 0.75),
        max: sorted[sorted.len() - 1],
    })
}

/// Describe every numeric column present in the table.
///
/// Columns without a single non-missing value are left out entirely.
pub fn describe(table: &SalesTable) -> Vec<ColumnStats> {
    table
        .columns()
        .iter()
        .filter(|c| c.is_numeric())
        .filter_map(|c| column_stats(*c, &table.numeric_values(*c)))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SalesRecord;
    use assert_approx_eq::assert_approx_eq;

    fn table(amounts: &[Option<f64>], quantities: &[Option<u32>]) -> SalesTable {
        let records = amounts
            .iter()
            .zip(quantities)
            .map(|(a, q)| SalesRecord {
                amount: *a,
                quantity: *q,
                ..Default::default()
            })
            .collect();
        SalesTable::new("describe", vec![Column::Amount, Column::Quantity], records)
    }

    #[test]
    fn test_percentile_interpolates() {
        let sorted = [1.0, 2.0, 3.0, 4.0];
        assert_approx_eq!(percentile(&sorted, 0.25), 1.75);
        assert_approx_eq!(percentile(&sorted, 0.5), 2.5);
        assert_approx_eq!(percentile(&sorted, 0.75), 3.25);
    }

    #[test]
    fn test_column_stats_basic() {
        let stats = column_stats(Column::Amount, &[10.0, 12.0, 11.0, 13.0, 9.0]).unwrap();
        assert_eq!(stats.count, 5);
        assert_approx_eq!(stats.mean, 11.0);
        assert_approx_eq!(stats.std_dev.unwrap(), 2.5f64.sqrt());
        assert_eq!(stats.min, 9.0);
        assert_eq!(stats.max, 13.0);
        assert_approx_eq!(stats.median, 11.0);
        assert_approx_eq!(stats.q1, 10.0);
        assert_approx_eq!(stats.q3, 12.0);
    }

    #[test]
    fn test_single_value_has_no_std_dev() {
        let stats = column_stats(Column::Amount, &[42.0]).unwrap();
        assert_eq!(stats.std_dev, None);
        assert_eq!(stats.q1, 42.0);
        assert_eq!(stats.q3, 42.0);
    }

    #[test]
    fn test_empty_values() {
        assert!(column_stats(Column::Amount, &[]).is_none());
    }

    #[test]
    fn test_describe_omits_all_missing_column() {
        let t = table(&[Some(1.0), Some(2.0)], &[None, None]);
        let stats = describe(&t);
        assert_eq!(stats.len(), 1);
        assert_eq!(stats[0].column, Column::Amount);
        assert!(stats.iter().all(|s| !s.mean.is_nan()));
    }

    #[test]
    fn test_describe_both_columns() {
        let t = table(&[Some(1.0), None, Some(3.0)], &[Some(1), Some(2), None]);
        let stats = describe(&t);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].count, 2);
        assert_eq!(stats[1].column, Column::Quantity);
        assert_approx_eq!(stats[1].mean, 1.5);
    }

    #[test]
    fn test_describe_skips_text_columns() {
        let t = SalesTable::new(
            "text",
            vec![Column::Product],
            vec![SalesRecord {
                product: Some("A".into()),
                ..Default::default()
            }],
        );
        assert!(describe(&t).is_empty());
    }
}
