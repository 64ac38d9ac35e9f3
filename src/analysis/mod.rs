mod analyzer;
mod describe;
mod forecast;
mod summary;
mod trend;

pub use analyzer::Analyzer;
pub use describe::{column_stats, describe, ColumnStats};
pub use forecast::{moving_average_forecast, Forecast, ForecastPoint, DEFAULT_HORIZON, DEFAULT_WINDOW, MAX_HORIZON};
pub use summary::{
    cross_tab, group_by, sales_summary, CrossTab, GroupKey, GroupStats, GroupSummary,
    SalesSummary, UNKNOWN_GROUP,
};
pub use trend::{daily_buckets, growth_rate, DailyBucket};
