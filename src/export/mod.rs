//! Report files: the multi-sheet workbook and the PDF summary.

mod excel;
mod pdf;

pub use excel::{export_excel, EXCEL_REPORT, PRODUCT_SHEET, REGION_SHEET, STATISTICS_SHEET};
pub use pdf::{export_pdf, summary_lines, PDF_REPORT};
