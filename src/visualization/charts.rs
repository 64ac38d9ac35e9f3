use colored::Colorize;

use crate::analysis::GroupSummary;

use super::money;

const BAR_WIDTH: usize = 40;

/// Format a text bar chart of group totals as a string.
pub fn format_group_bars(summary: &GroupSummary) -> String {
    let mut output = String::new();
    output.push_str(&format!(
        "\n{}\n",
        format!("Sales by {} (chart)", summary.key).bold().green()
    ));
    output.push_str(&format!("{}\n", "=".repeat(60)));

    if summary.groups.is_empty() {
        output.push_str("  No data available.\n");
        return output;
    }

    let max_total = summary.groups.iter().map(|g| g.total).fold(0.0f64, f64::max);
    let label_width = summary
        .groups
        .iter()
        .map(|g| g.key.chars().count())
        .max()
        .unwrap_or(0)
        .max(summary.key.column().name().len());

    for group in &summary.groups {
        let bar_len = if max_total > 0.0 {
            ((group.total.max(0.0) / max_total) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let bar = "\u{2588}".repeat(bar_len);

        output.push_str(&format!(
            "  {:<width$}  {:>14}  {}\n",
            group.key,
            money(group.total),
            bar.green(),
            width = label_width
        ));
    }

    output.push('\n');
    output
}

/// Print a text bar chart of group totals.
pub fn print_group_bars(summary: &GroupSummary) {
    print!("{}", format_group_bars(summary));
}
