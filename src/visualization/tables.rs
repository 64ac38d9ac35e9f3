use colored::Colorize;
use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, ContentArrangement, Table};

use crate::analysis::{ColumnStats, DailyBucket, Forecast, GroupSummary, SalesSummary, UNKNOWN_GROUP};
use crate::models::SalesTable;

/// Format a currency value as `$1,234.56` (negative values as `-$1,234.56`).
pub fn money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

fn new_table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn heading(output: &mut String, title: &str, width: usize) {
    output.push_str(&format!("\n{}\n", title.bold().green()));
    output.push_str(&format!("{}\n", "=".repeat(width)));
}

/// Format the dataset overview (record count, columns, load diagnostics).
pub fn format_overview(table: &SalesTable) -> String {
    let mut output = String::new();
    heading(&mut output, "Dataset Overview", 50);

    let columns: Vec<&str> = table.columns().iter().map(|c| c.name()).collect();
    output.push_str(&format!("  Total Records: {}\n", table.len()));
    output.push_str(&format!("  Columns:       {}\n", columns.join(", ")));

    let report = table.load_report();
    if !report.is_clean() {
        output.push_str(&format!(
            "  {}\n",
            format!(
                "Skipped rows: {} | Invalid cells: {}",
                report.skipped_rows, report.invalid_cells
            )
            .yellow()
        ));
    }
    output
}

/// Print the dataset overview.
pub fn print_overview(table: &SalesTable) {
    print!("{}", format_overview(table));
}

/// Format the first `rows` records as a table.
pub fn format_preview(table: &SalesTable, rows: usize) -> String {
    let mut output = String::new();
    let head = table.head(rows);
    heading(&mut output, &format!("Sample Data (first {} rows)", head.len()), 50);

    let mut t = new_table(table.columns().iter().map(|c| c.name()).collect());
    for record in head {
        t.add_row(
            table
                .columns()
                .iter()
                .map(|c| Cell::new(record.display_value(*c)))
                .collect::<Vec<_>>(),
        );
    }

    output.push_str(&format!("{t}"));
    output
}

/// Print a preview of the first `rows` records.
pub fn print_preview(table: &SalesTable, rows: usize) {
    print!("{}", format_preview(table, rows));
}

/// Format descriptive statistics, one column per numeric field.
pub fn format_describe_table(stats: &[ColumnStats]) -> String {
    let mut output = String::new();
    heading(&mut output, "Statistical Summary", 50);

    if stats.is_empty() {
        output.push_str("  No numeric data available.\n");
        return output;
    }

    let mut header = vec![""];
    header.extend(stats.iter().map(|s| s.column.name()));
    let mut t = new_table(header);

    let rows: [(&str, fn(&ColumnStats) -> String); 8] = [
        ("count", |s| s.count.to_string()),
        ("mean", |s| format!("{:.2}", s.mean)),
        ("std", |s| {
            s.std_dev
                .map(|v| format!("{v:.2}"))
                .unwrap_or_else(|| "-".to_string())
        }),
        ("min", |s| format!("{:.2}", s.min)),
        ("25%", |s| format!("{:.2}", s.q1)),
        ("50%", |s| format!("{:.2}", s.median)),
        ("75%", |s| format!("{:.2}", s.q3)),
        ("max", |s| format!("{:.2}", s.max)),
    ];
    for (label, value) in rows {
        let mut cells = vec![Cell::new(label)];
        cells.extend(stats.iter().map(|s| Cell::new(value(s))));
        t.add_row(cells);
    }

    output.push_str(&format!("{t}"));
    output
}

/// Print descriptive statistics.
pub fn print_describe_table(stats: &[ColumnStats]) {
    print!("{}", format_describe_table(stats));
}

/// Format the overall sales figures, or a "no data" notice.
pub fn format_sales_summary(summary: Option<&SalesSummary>) -> String {
    let mut output = String::new();
    heading(&mut output, "Sales Analysis", 50);

    let Some(s) = summary else {
        output.push_str("  No data: no row has an amount.\n");
        return output;
    };

    let mut t = new_table(vec!["Metric", "Value"]);
    t.add_row(vec![Cell::new("Total Sales"), Cell::new(money(s.total))]);
    t.add_row(vec![Cell::new("Average Sale"), Cell::new(money(s.mean))]);
    t.add_row(vec![Cell::new("Highest Sale"), Cell::new(money(s.max))]);
    t.add_row(vec![Cell::new("Lowest Sale"), Cell::new(money(s.min))]);
    t.add_row(vec![Cell::new("Number of Sales"), Cell::new(s.count)]);

    output.push_str(&format!("{t}"));
    output
}

/// Print the overall sales figures.
pub fn print_sales_summary(summary: Option<&SalesSummary>) {
    print!("{}", format_sales_summary(summary));
}

/// Format a group breakdown in its display order.
pub fn format_group_table(summary: &GroupSummary) -> String {
    let mut output = String::new();
    heading(&mut output, &format!("Sales by {}", summary.key), 50);

    let mut t = new_table(vec![
        summary.key.column().name(),
        "Total Sales",
        "Number of Sales",
        "Average Sale",
        "Units",
    ]);
    for g in &summary.groups {
        t.add_row(vec![
            Cell::new(&g.key),
            Cell::new(money(g.total)),
            Cell::new(g.count),
            Cell::new(g.mean.map(money).unwrap_or_else(|| "-".to_string())),
            Cell::new(g.quantity),
        ]);
    }

    output.push_str(&format!("{t}\n"));
    if summary.get(UNKNOWN_GROUP).is_some() {
        output.push_str(&format!(
            "{}\n",
            format!(
                "  \"{UNKNOWN_GROUP}\" includes rows without a {}",
                summary.key.column().name()
            )
            .dimmed()
        ));
    }
    output
}

/// Print a group breakdown.
pub fn print_group_table(summary: &GroupSummary) {
    print!("{}", format_group_table(summary));
}

/// Format daily totals with the growth rate, if one could be computed.
pub fn format_trend_table(buckets: &[DailyBucket], growth: Option<f64>) -> String {
    let mut output = String::new();
    heading(&mut output, "Daily Sales Trend", 50);

    if buckets.is_empty() {
        output.push_str("  No dated sales.\n");
        return output;
    }

    let mut t = new_table(vec!["Date", "Total Sales", "Units", "Transactions"]);
    for b in buckets {
        t.add_row(vec![
            Cell::new(b.date),
            Cell::new(money(b.amount)),
            Cell::new(b.quantity),
            Cell::new(b.records),
        ]);
    }
    output.push_str(&format!("{t}\n"));

    match growth {
        Some(rate) => {
            let text = format!("{rate:+.1}%");
            let text = if rate >= 0.0 { text.green() } else { text.red() };
            output.push_str(&format!("  Growth (first to last day): {text}\n"));
        }
        None => output.push_str("  Growth (first to last day): n/a\n"),
    }
    output
}

/// Print daily totals.
pub fn print_trend_table(buckets: &[DailyBucket], growth: Option<f64>) {
    print!("{}", format_trend_table(buckets, growth));
}

/// Format the moving-average forecast.
pub fn format_forecast_table(forecast: &Forecast) -> String {
    let mut output = String::new();
    heading(&mut output, "Sales Forecast", 50);

    if forecast.is_empty() {
        output.push_str("  Forecast unavailable.\n");
        return output;
    }

    output.push_str(&format!(
        "{}\n",
        format!("{}-day moving average (flat projection)", forecast.window).dimmed()
    ));
    let mut t = new_table(vec!["Date", "Predicted Sales"]);
    for p in &forecast.points {
        t.add_row(vec![Cell::new(p.date), Cell::new(money(p.amount))]);
    }

    output.push_str(&format!("{t}"));
    output
}

/// Print the moving-average forecast.
pub fn print_forecast_table(forecast: &Forecast) {
    print!("{}", format_forecast_table(forecast));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{describe, group_by, moving_average_forecast, GroupKey};
    use crate::models::{Column, LoadReport, SalesRecord};
    use chrono::NaiveDate;

    fn sample_table() -> SalesTable {
        let rec = |day: u32, product: &str, amount: f64| SalesRecord {
            date: NaiveDate::from_ymd_opt(2024, 1, day),
            product: Some(product.to_string()),
            amount: Some(amount),
            quantity: Some(2),
            ..Default::default()
        };
        SalesTable::new(
            "Viz Test",
            vec![Column::Date, Column::Product, Column::Amount, Column::Quantity],
            vec![rec(1, "Laptop", 1200.0), rec(2, "Mouse", 25.5), rec(2, "Laptop", 999.0)],
        )
    }

    #[test]
    fn test_money() {
        assert_eq!(money(0.0), "$0.00");
        assert_eq!(money(1234.5), "$1,234.50");
        assert_eq!(money(1234567.891), "$1,234,567.89");
        assert_eq!(money(-42.0), "-$42.00");
        assert_eq!(money(999.999), "$1,000.00");
    }

    #[test]
    fn test_format_overview() {
        let t = sample_table();
        let output = format_overview(&t);
        assert!(output.contains("Total Records: 3"));
        assert!(output.contains("Date, Product, Amount, Quantity"));
        assert!(!output.contains("Skipped rows"));
    }

    #[test]
    fn test_format_overview_reports_issues() {
        let t = sample_table().with_report(LoadReport {
            skipped_rows: 1,
            invalid_cells: 4,
        });
        assert!(format_overview(&t).contains("Invalid cells: 4"));
    }

    #[test]
    fn test_format_preview() {
        let output = format_preview(&sample_table(), 2);
        assert!(output.contains("first 2 rows"));
        assert!(output.contains("Laptop"));
        assert!(output.contains("Mouse"));
        assert!(!output.contains("999.00"));
    }

    #[test]
    fn test_format_preview_counts_shown_rows() {
        let output = format_preview(&sample_table(), 10);
        assert!(output.contains("first 3 rows"));
        assert!(!output.contains("first 10 rows"));
    }

    #[test]
    fn test_format_describe_table() {
        let output = format_describe_table(&describe(&sample_table()));
        assert!(output.contains("Amount"));
        assert!(output.contains("Quantity"));
        assert!(output.contains("25%"));
        assert!(output.contains("std"));
    }

    #[test]
    fn test_format_describe_empty() {
        assert!(format_describe_table(&[]).contains("No numeric data"));
    }

    #[test]
    fn test_format_sales_summary() {
        let s = SalesSummary {
            count: 3,
            total: 2224.5,
            mean: 741.5,
            max: 1200.0,
            min: 25.5,
        };
        let output = format_sales_summary(Some(&s));
        assert!(output.contains("$2,224.50"));
        assert!(output.contains("Lowest Sale"));
        assert!(format_sales_summary(None).contains("No data"));
    }

    #[test]
    fn test_format_group_table() {
        let g = group_by(&sample_table(), GroupKey::Product).unwrap();
        let output = format_group_table(&g);
        assert!(output.contains("Sales by Product"));
        assert!(output.contains("$2,199.00"));
        let laptop = output.find("Laptop").unwrap();
        let mouse = output.find("Mouse").unwrap();
        assert!(laptop < mouse);
    }

    #[test]
    fn test_format_group_table_notes_unknown_bucket() {
        let g = group_by(&sample_table(), GroupKey::Product).unwrap();
        assert!(!format_group_table(&g).contains("includes rows without"));

        let t = SalesTable::new(
            "keyless",
            vec![Column::Product, Column::Amount],
            vec![SalesRecord {
                amount: Some(5.0),
                ..Default::default()
            }],
        );
        let g = group_by(&t, GroupKey::Product).unwrap();
        assert!(format_group_table(&g).contains("\"unknown\" includes rows without a Product"));
    }

    #[test]
    fn test_format_trend_and_forecast() {
        let t = sample_table();
        let buckets = crate::analysis::daily_buckets(&t).unwrap();
        let output = format_trend_table(&buckets, Some(-15.0));
        assert!(output.contains("2024-01-02"));
        assert!(output.contains("-15.0%"));
        assert!(format_trend_table(&buckets, None).contains("n/a"));

        let forecast = moving_average_forecast(&buckets, 3, 7).unwrap();
        let output = format_forecast_table(&forecast);
        assert!(output.contains("2024-01-05"));
        assert!(output.contains("2-day moving average"));
        assert!(format_forecast_table(&Forecast::empty()).contains("unavailable"));
    }
}
