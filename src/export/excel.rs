use std::path::Path;

use rust_xlsxwriter::{Format, Workbook, Worksheet};
use tracing::{info, warn};

use crate::analysis::{Analyzer, ColumnStats, GroupKey, SalesSummary};
use crate::error::SalesError;
use crate::io::write_raw_sheet;

pub const STATISTICS_SHEET: &str = "Statistics";
pub const PRODUCT_SHEET: &str = "By Product";
pub const REGION_SHEET: &str = "By Region";

/// File name of the workbook written by the `analyze` command.
pub const EXCEL_REPORT: &str = "sales_report.xlsx";

/// Write the full workbook: raw records, statistics, and the product and
/// region breakdowns. A breakdown whose column is missing gets a sheet with
/// a notice instead of a table.
pub fn export_excel(analyzer: &Analyzer<'_>, path: impl AsRef<Path>) -> Result<(), SalesError> {
    let path = path.as_ref();
    let mut workbook = Workbook::new();

    write_raw_sheet(workbook.add_worksheet(), analyzer.table())?;
    write_statistics_sheet(workbook.add_worksheet(), analyzer)?;
    write_group_sheet(workbook.add_worksheet(), analyzer, GroupKey::Product, PRODUCT_SHEET)?;
    write_group_sheet(workbook.add_worksheet(), analyzer, GroupKey::Region, REGION_SHEET)?;

    workbook.save(path)?;
    info!(path = %path.display(), "excel report written");
    Ok(())
}

fn write_statistics_sheet(ws: &mut Worksheet, analyzer: &Analyzer<'_>) -> Result<(), SalesError> {
    let bold = Format::new().set_bold();
    let number = Format::new().set_num_format("#,##0.00");
    ws.set_name(STATISTICS_SHEET)?;

    let stats = analyzer.describe();
    ws.write_string_with_format(0, 0, "Statistic", &bold)?;
    for (i, s) in stats.iter().enumerate() {
        ws.write_string_with_format(0, i as u16 + 1, s.column.name(), &bold)?;
    }

    let rows: [(&str, fn(&ColumnStats) -> Option<f64>); 8] = [
        ("count", |s| Some(s.count as f64)),
        ("mean", |s| Some(s.mean)),
        ("std", |s| s.std_dev),
        ("min", |s| Some(s.min)),
        ("25%", |s| Some(s.q1)),
        ("50%", |s| Some(s.median)),
        ("75%", |s| Some(s.q3)),
        ("max", |s| Some(s.max)),
    ];
    for (r, (label, value)) in rows.iter().enumerate() {
        let row = r as u32 + 1;
        ws.write_string(row, 0, *label)?;
        for (i, s) in stats.iter().enumerate() {
            if let Some(v) = value(s) {
                ws.write_number_with_format(row, i as u16 + 1, v, &number)?;
            }
        }
    }

    let start = rows.len() as u32 + 2;
    ws.write_string_with_format(start, 0, "Sales Summary", &bold)?;
    match analyzer.sales_summary() {
        Ok(Some(summary)) => write_summary_block(ws, start + 1, &summary)?,
        Ok(None) => {
            ws.write_string(start + 1, 0, "No data")?;
        }
        Err(e) => {
            warn!(error = %e, "sales summary omitted from workbook");
            ws.write_string(start + 1, 0, e.to_string())?;
        }
    }

    ws.autofit();
    Ok(())
}

fn write_summary_block(ws: &mut Worksheet, row: u32, s: &SalesSummary) -> Result<(), SalesError> {
    let currency = Format::new().set_num_format("$#,##0.00");
    let lines = [
        ("Total Sales", s.total),
        ("Average Sale", s.mean),
        ("Highest Sale", s.max),
        ("Lowest Sale", s.min),
    ];
    for (i, (label, value)) in lines.iter().enumerate() {
        ws.write_string(row + i as u32, 0, *label)?;
        ws.write_number_with_format(row + i as u32, 1, *value, &currency)?;
    }
    let last = row + lines.len() as u32;
    ws.write_string(last, 0, "Number of Sales")?;
    ws.write_number(last, 1, s.count as f64)?;
    Ok(())
}

fn write_group_sheet(
    ws: &mut Worksheet,
    analyzer: &Analyzer<'_>,
    key: GroupKey,
    name: &str,
) -> Result<(), SalesError> {
    let bold = Format::new().set_bold();
    let currency = Format::new().set_num_format("$#,##0.00");
    ws.set_name(name)?;

    let summary = match analyzer.group_by(key) {
        Ok(summary) => summary,
        Err(e @ SalesError::MissingColumn(_)) => {
            warn!(sheet = name, error = %e, "group sheet left empty");
            ws.write_string(0, 0, e.to_string())?;
            return Ok(());
        }
        Err(e) => return Err(e),
    };

    let headers = [
        key.column().name(),
        "Total Sales",
        "Number of Sales",
        "Average Sale",
        "Units",
    ];
    for (col, header) in headers.iter().enumerate() {
        ws.write_string_with_format(0, col as u16, *header, &bold)?;
    }

    for (i, g) in summary.groups.iter().enumerate() {
        let row = i as u32 + 1;
        ws.write_string(row, 0, &g.key)?;
        ws.write_number_with_format(row, 1, g.total, &currency)?;
        ws.write_number(row, 2, g.count as f64)?;
        if let Some(mean) = g.mean {
            ws.write_number_with_format(row, 3, mean, &currency)?;
        }
        ws.write_number(row, 4, g.quantity as f64)?;
    }

    ws.autofit();
    Ok(())
}
