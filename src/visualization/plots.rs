use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use chrono::{Days, NaiveDate};
use plotters::coord::Shift;
use plotters::data::Quartiles;
use plotters::element::Pie;
use plotters::prelude::*;
use tracing::{debug, info};

use crate::analysis::{Analyzer, DailyBucket, Forecast, GroupKey, GroupSummary, UNKNOWN_GROUP};
use crate::error::SalesError;
use crate::models::{Column, SalesTable};

use super::money;

pub const BAR_CHART: &str = "bar_by_product.png";
pub const PIE_CHART: &str = "pie_by_region.png";
pub const LINE_CHART: &str = "line_daily_trend.png";
pub const BOX_CHART: &str = "box_by_product.png";
pub const HEATMAP_CHART: &str = "heatmap_product_region.png";

const FONT: &str = "sans-serif";
const BAR_COLOR: RGBColor = RGBColor(91, 155, 213);
const FORECAST_COLOR: RGBColor = RGBColor(237, 125, 49);
const PALETTE: [RGBColor; 8] = [
    RGBColor(91, 155, 213),
    RGBColor(237, 125, 49),
    RGBColor(112, 173, 71),
    RGBColor(255, 192, 0),
    RGBColor(165, 105, 189),
    RGBColor(68, 114, 196),
    RGBColor(158, 72, 14),
    RGBColor(99, 99, 99),
];

fn chart_err<E: std::fmt::Display>(e: E) -> SalesError {
    SalesError::Chart(e.to_string())
}

/// A chart that was not rendered and why.
#[derive(Debug, Clone, PartialEq)]
pub struct SkippedChart {
    pub file: &'static str,
    pub reason: String,
}

/// Outcome of [`render_all`].
#[derive(Debug, Default)]
pub struct ChartSet {
    pub files: Vec<PathBuf>,
    pub skipped: Vec<SkippedChart>,
}

/// Render every chart into `dir`.
///
/// Charts whose columns are missing, or that have nothing to plot, are
/// recorded in [`ChartSet::skipped`]; any drawing failure aborts.
pub fn render_all(
    analyzer: &Analyzer<'_>,
    forecast: Option<&Forecast>,
    dir: &Path,
    size: (u32, u32),
) -> Result<ChartSet, SalesError> {
    std::fs::create_dir_all(dir)?;
    let mut set = ChartSet::default();

    let jobs: [(&'static str, Box<dyn Fn(&Path) -> Result<(), SalesError> + '_>); 5] = [
        (
            BAR_CHART,
            Box::new(|p: &Path| render_bar_chart(&analyzer.group_by(GroupKey::Product)?, p, size)),
        ),
        (
            PIE_CHART,
            Box::new(|p: &Path| render_pie_chart(&analyzer.group_by(GroupKey::Region)?, p, size)),
        ),
        (
            LINE_CHART,
            Box::new(|p: &Path| render_line_chart(&analyzer.daily_buckets()?, forecast, p, size)),
        ),
        (
            BOX_CHART,
            Box::new(|p: &Path| render_box_plot(analyzer.table(), p, size)),
        ),
        (
            HEATMAP_CHART,
            Box::new(|p: &Path| render_heatmap(analyzer, p, size)),
        ),
    ];

    for (file, render) in jobs {
        let path = dir.join(file);
        match render(&path) {
            Ok(()) => {
                debug!(path = %path.display(), "chart written");
                set.files.push(path);
            }
            Err(e @ (SalesError::MissingColumn(_) | SalesError::InsufficientData(_))) => {
                info!(chart = file, reason = %e, "chart skipped");
                set.skipped.push(SkippedChart {
                    file,
                    reason: e.to_string(),
                });
            }
            Err(e) => return Err(e),
        }
    }

    info!(
        rendered = set.files.len(),
        skipped = set.skipped.len(),
        dir = %dir.display(),
        "charts rendered"
    );
    Ok(set)
}

/// Group labels and totals in display order.
pub fn bar_data(summary: &GroupSummary) -> (Vec<String>, Vec<f64>) {
    summary
        .groups
        .iter()
        .map(|g| (g.key.clone(), g.total))
        .unzip()
}

/// Slices for a share chart; groups with a non-positive total have no share.
pub fn pie_slices(summary: &GroupSummary) -> Vec<(String, f64)> {
    summary
        .groups
        .iter()
        .filter(|g| g.total > 0.0)
        .map(|g| (g.key.clone(), g.total))
        .collect()
}

/// Amounts per product, sorted by product name. Rows without an amount are
/// left out and products with no amounts are dropped.
pub fn box_groups(table: &SalesTable) -> Result<Vec<(String, Vec<f64>)>, SalesError> {
    for column in [Column::Product, Column::Amount] {
        if !table.has_column(column) {
            return Err(SalesError::MissingColumn(column));
        }
    }
    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for record in table.records() {
        if let Some(amount) = record.amount {
            let key = record.text(Column::Product).unwrap_or(UNKNOWN_GROUP);
            groups.entry(key).or_default().push(amount);
        }
    }
    Ok(groups
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect())
}

/// Day offset from `start` for each bucket.
pub fn day_offsets(start: NaiveDate, buckets: &[DailyBucket]) -> Vec<(i32, f64)> {
    buckets
        .iter()
        .map(|b| (day_offset(start, b.date), b.amount))
        .collect()
}

fn day_offset(start: NaiveDate, date: NaiveDate) -> i32 {
    i32::try_from((date - start).num_days()).unwrap_or(i32::MAX)
}

/// Shade from white (0) to a deep blue (`max`).
pub fn heat_color(value: f64, max: f64) -> RGBColor {
    let t = if max > 0.0 {
        (value / max).clamp(0.0, 1.0)
    } else {
        0.0
    };
    let mix = |hi: u8, lo: u8| (f64::from(hi) + (f64::from(lo) - f64::from(hi)) * t).round() as u8;
    RGBColor(mix(255, 8), mix(255, 48), mix(255, 107))
}

fn axis_max(values: impl IntoIterator<Item = f64>) -> f64 {
    let max = values.into_iter().fold(0.0f64, f64::max);
    if max > 0.0 {
        max * 1.1
    } else {
        1.0
    }
}

fn label_at(labels: &[String], index: i32) -> String {
    usize::try_from(index)
        .ok()
        .and_then(|i| labels.get(i))
        .cloned()
        .unwrap_or_default()
}

fn segment_label(labels: &[String], value: &SegmentValue<i32>) -> String {
    match value {
        SegmentValue::CenterOf(i) => label_at(labels, *i),
        _ => String::new(),
    }
}

fn blank_canvas(path: &Path, size: (u32, u32)) -> Result<DrawingArea<BitMapBackend<'_>, Shift>, SalesError> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(chart_err)?;
    Ok(root)
}

/// Vertical bars of group totals.
pub fn render_bar_chart(summary: &GroupSummary, path: &Path, size: (u32, u32)) -> Result<(), SalesError> {
    let (labels, values) = bar_data(summary);
    if labels.is_empty() {
        return Err(SalesError::InsufficientData(format!(
            "no {} groups to chart",
            summary.key
        )));
    }
    let n = labels.len() as i32;

    let root = blank_canvas(path, size)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(format!("Total Sales by {}", summary.key), (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..axis_max(values.iter().copied()))
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v: &SegmentValue<i32>| segment_label(&labels, v))
        .y_label_formatter(&|v: &f64| money(*v))
        .x_desc(summary.key.column().name())
        .y_desc("Total Sales")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(
            Histogram::vertical(&chart)
                .style(BAR_COLOR.filled())
                .margin(12)
                .data(values.iter().enumerate().map(|(i, v)| (i as i32, *v))),
        )
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Share of total sales per group.
pub fn render_pie_chart(summary: &GroupSummary, path: &Path, size: (u32, u32)) -> Result<(), SalesError> {
    let slices = pie_slices(summary);
    if slices.is_empty() {
        return Err(SalesError::InsufficientData(format!(
            "no positive {} totals to chart",
            summary.key
        )));
    }
    let (labels, sizes): (Vec<String>, Vec<f64>) = slices.into_iter().unzip();
    let colors: Vec<RGBColor> = (0..labels.len()).map(|i| PALETTE[i % PALETTE.len()]).collect();

    let root = blank_canvas(path, size)?;
    let area = root
        .titled(&format!("Sales Share by {}", summary.key), (FONT, 28))
        .map_err(chart_err)?;
    let (w, h) = area.dim_in_pixel();
    let center = (w as i32 / 2, h as i32 / 2);
    let radius = f64::from(w.min(h)) * 0.35;

    let mut pie = Pie::new(&center, &radius, &sizes, &colors, &labels);
    pie.start_angle(-90.0);
    pie.label_style((FONT, 18).into_font().color(&BLACK));
    pie.percentages((FONT, 16).into_font().color(&WHITE));
    area.draw(&pie).map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Daily totals, followed by the forecast when one is given.
pub fn render_line_chart(
    buckets: &[DailyBucket],
    forecast: Option<&Forecast>,
    path: &Path,
    size: (u32, u32),
) -> Result<(), SalesError> {
    let Some(start) = buckets.first().map(|b| b.date) else {
        return Err(SalesError::InsufficientData(
            "no dated sales to chart".to_string(),
        ));
    };
    let history = day_offsets(start, buckets);
    let projected: Vec<(i32, f64)> = forecast
        .map(|f| {
            f.points
                .iter()
                .map(|p| (day_offset(start, p.date), p.amount))
                .collect()
        })
        .unwrap_or_default();

    let x_end = history
        .iter()
        .chain(projected.iter())
        .map(|(x, _)| *x)
        .max()
        .unwrap_or(0)
        .max(1);
    let y_max = axis_max(history.iter().chain(projected.iter()).map(|(_, y)| *y));

    let root = blank_canvas(path, size)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Daily Sales Trend", (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d(0..x_end, 0f64..y_max)
        .map_err(chart_err)?;

    let date_label = |offset: &i32| {
        u64::try_from(*offset)
            .ok()
            .and_then(|d| start.checked_add_days(Days::new(d)))
            .map(|d| d.format("%m-%d").to_string())
            .unwrap_or_default()
    };
    chart
        .configure_mesh()
        .x_labels(10)
        .x_label_formatter(&date_label)
        .y_label_formatter(&|v: &f64| money(*v))
        .x_desc("Date")
        .y_desc("Total Sales")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(LineSeries::new(history.iter().copied(), BAR_COLOR.stroke_width(2)))
        .map_err(chart_err)?
        .label("Daily sales")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BAR_COLOR));
    chart
        .draw_series(
            history
                .iter()
                .map(|&(x, y)| Circle::new((x, y), 3, BAR_COLOR.filled())),
        )
        .map_err(chart_err)?;

    if !projected.is_empty() {
        let line: Vec<(i32, f64)> = history
            .last()
            .copied()
            .into_iter()
            .chain(projected.iter().copied())
            .collect();
        chart
            .draw_series(LineSeries::new(line, FORECAST_COLOR.stroke_width(2)))
            .map_err(chart_err)?
            .label("Forecast")
            .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], FORECAST_COLOR));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Amount distribution per product.
pub fn render_box_plot(table: &SalesTable, path: &Path, size: (u32, u32)) -> Result<(), SalesError> {
    let groups = box_groups(table)?;
    if groups.is_empty() {
        return Err(SalesError::InsufficientData(
            "no amounts to chart".to_string(),
        ));
    }
    let labels: Vec<String> = groups.iter().map(|(k, _)| k.clone()).collect();
    let n = labels.len() as i32;

    let (lo, hi) = groups
        .iter()
        .flat_map(|(_, v)| v.iter().copied())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    let pad = ((hi - lo) * 0.1).max(1.0);
    let y_range = (lo - pad) as f32..(hi + pad) as f32;

    let root = blank_canvas(path, size)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Sale Amount Distribution by Product", (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(100)
        .build_cartesian_2d((0..n).into_segmented(), y_range)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len())
        .x_label_formatter(&|v: &SegmentValue<i32>| segment_label(&labels, v))
        .y_label_formatter(&|v: &f32| money(f64::from(*v)))
        .x_desc("Product")
        .y_desc("Amount")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(groups.iter().enumerate().map(|(i, (_, values))| {
            Boxplot::new_vertical(SegmentValue::CenterOf(i as i32), &Quartiles::new(values.as_slice()))
                .width(30)
                .whisker_width(0.5)
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}

/// Product by region totals as shaded cells.
pub fn render_heatmap(analyzer: &Analyzer<'_>, path: &Path, size: (u32, u32)) -> Result<(), SalesError> {
    let ct = analyzer.cross_tab(GroupKey::Product, GroupKey::Region)?;
    if ct.row_keys.is_empty() {
        return Err(SalesError::InsufficientData(
            "no product/region pairs to chart".to_string(),
        ));
    }
    let rows = ct.row_keys.len() as i32;
    let cols = ct.col_keys.len() as i32;
    let max = ct.max();

    let root = blank_canvas(path, size)?;
    let mut chart = ChartBuilder::on(&root)
        .caption("Sales by Product and Region", (FONT, 28))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(120)
        .build_cartesian_2d(0..cols, 0..rows)
        .map_err(chart_err)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_labels(ct.col_keys.len() + 1)
        .y_labels(ct.row_keys.len() + 1)
        .x_label_formatter(&|v: &i32| label_at(&ct.col_keys, *v))
        .y_label_formatter(&|v: &i32| label_at(&ct.row_keys, *v))
        .x_desc("Region")
        .y_desc("Product")
        .draw()
        .map_err(chart_err)?;

    chart
        .draw_series(ct.values.iter().enumerate().flat_map(|(r, row)| {
            row.iter().enumerate().map(move |(c, v)| {
                let (x, y) = (c as i32, r as i32);
                Rectangle::new([(x, y), (x + 1, y + 1)], heat_color(*v, max).filled())
            })
        }))
        .map_err(chart_err)?;

    root.present().map_err(chart_err)?;
    Ok(())
}
