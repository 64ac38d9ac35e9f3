mod charts;
pub mod plots;
mod tables;

pub use charts::{format_group_bars, print_group_bars};
pub use plots::{render_all, ChartSet, SkippedChart};
pub use tables::{
    format_describe_table, format_forecast_table, format_group_table, format_overview,
    format_preview, format_sales_summary, format_trend_table, money, print_describe_table,
    print_forecast_table, print_group_table, print_overview, print_preview, print_sales_summary,
    print_trend_table,
};
