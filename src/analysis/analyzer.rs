use tracing::warn;

use crate::analysis::{
    cross_tab, daily_buckets, describe, group_by, growth_rate, moving_average_forecast,
    sales_summary, ColumnStats, CrossTab, DailyBucket, Forecast, GroupKey, GroupSummary,
    SalesSummary, DEFAULT_WINDOW,
};
use crate::error::SalesError;
use crate::models::SalesTable;

/// Unified analysis API that groups all analysis operations on a table.
pub struct Analyzer<'a> {
    table: &'a SalesTable,
    window: usize,
}

impl<'a> Analyzer<'a> {
    /// Create a new Analyzer for the given table.
    pub fn new(table: &'a SalesTable) -> Self {
        Self {
            table,
            window: DEFAULT_WINDOW,
        }
    }

    /// Override the maximum moving-average window used by [`Analyzer::forecast`].
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window.max(1);
        self
    }

    pub fn table(&self) -> &SalesTable {
        self.table
    }

    /// Count, mean, std, min, quartiles and max for each numeric column.
    pub fn describe(&self) -> Vec<ColumnStats> {
        describe(self.table)
    }

    /// Total, mean, max and min of the amount column.
    pub fn sales_summary(&self) -> Result<Option<SalesSummary>, SalesError> {
        sales_summary(self.table)
    }

    /// Per-group count, total and mean of amounts.
    pub fn group_by(&self, key: GroupKey) -> Result<GroupSummary, SalesError> {
        group_by(self.table, key)
    }

    /// Amount totals over two categorical keys.
    pub fn cross_tab(&self, rows: GroupKey, cols: GroupKey) -> Result<CrossTab, SalesError> {
        cross_tab(self.table, rows, cols)
    }

    /// Amount and quantity totals per calendar day.
    pub fn daily_buckets(&self) -> Result<Vec<DailyBucket>, SalesError> {
        daily_buckets(self.table)
    }

    /// Percentage change between the first and last day with sales.
    pub fn growth_rate(&self) -> Result<f64, SalesError> {
        growth_rate(&self.daily_buckets()?)
    }

    /// Flat moving-average forecast for the next `horizon` days.
    ///
    /// Returns an empty forecast when daily history is unavailable (missing
    /// date or amount column) and `InsufficientData` when it is available but
    /// holds no day at all.
    pub fn forecast(&self, horizon: u32) -> Result<Forecast, SalesError> {
        let buckets = match self.daily_buckets() {
            Ok(buckets) => buckets,
            Err(SalesError::MissingColumn(column)) => {
                warn!(%column, "forecast unavailable");
                return Ok(Forecast::empty());
            }
            Err(e) => return Err(e),
        };
        moving_average_forecast(&buckets, horizon, self.window)
    }
}
