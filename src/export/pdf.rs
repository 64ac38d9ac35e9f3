use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use printpdf::image_crate::{self, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::{debug, info};

use crate::analysis::{Analyzer, Forecast, GroupKey};
use crate::error::SalesError;
use crate::visualization::money;

/// File name of the document written by the `analyze` command.
pub const PDF_REPORT: &str = "sales_report.pdf";

const PAGE_WIDTH: f32 = 210.0;
const PAGE_HEIGHT: f32 = 297.0;
const MARGIN: f32 = 20.0;
const LINE_HEIGHT: f32 = 6.5;
const TOP_GROUPS: usize = 5;

fn pdf_err<E: std::fmt::Display>(e: E) -> SalesError {
    SalesError::Pdf(e.to_string())
}

/// Text lines for the summary page.
pub fn summary_lines(analyzer: &Analyzer<'_>, forecast: Option<&Forecast>) -> Vec<String> {
    let table = analyzer.table();
    let mut lines = vec![
        format!("Dataset: {}", table.name()),
        format!("Total records: {}", table.len()),
        String::new(),
    ];

    match analyzer.sales_summary() {
        Ok(Some(s)) => {
            lines.push(format!("Total sales: {}", money(s.total)));
            lines.push(format!("Average sale: {}", money(s.mean)));
            lines.push(format!("Highest sale: {}", money(s.max)));
            lines.push(format!("Lowest sale: {}", money(s.min)));
            lines.push(format!("Number of sales: {}", s.count));
        }
        Ok(None) => lines.push("Sales: no data".to_string()),
        Err(e) => lines.push(format!("Sales: {e}")),
    }

    for key in [GroupKey::Product, GroupKey::Region] {
        lines.push(String::new());
        match analyzer.group_by(key) {
            Ok(summary) => {
                lines.push(format!("Top sales by {key}:"));
                for g in summary.groups.iter().take(TOP_GROUPS) {
                    lines.push(format!("  {}: {} ({} sales)", g.key, money(g.total), g.count));
                }
            }
            Err(e) => lines.push(format!("Sales by {key}: {e}")),
        }
    }

    lines.push(String::new());
    match analyzer.growth_rate() {
        Ok(rate) => lines.push(format!("Growth (first to last day): {rate:+.1}%")),
        Err(e) => lines.push(format!("Growth: n/a ({e})")),
    }

    if let Some(f) = forecast {
        if let (Some(avg), Some(first), Some(last)) = (f.average, f.points.first(), f.points.last()) {
            lines.push(format!(
                "Forecast {} to {}: {} per day ({}-day moving average)",
                first.date,
                last.date,
                money(avg),
                f.window
            ));
        }
    }
    lines
}

struct Writer {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    font: IndirectFontRef,
    bold: IndirectFontRef,
    y: f32,
}

impl Writer {
    fn new(title: &str) -> Result<Self, SalesError> {
        let (doc, page, layer) = PdfDocument::new(title, Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        let font = doc.add_builtin_font(BuiltinFont::Helvetica).map_err(pdf_err)?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(pdf_err)?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(Self {
            doc,
            layer,
            font,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        })
    }

    fn new_page(&mut self) {
        let (page, layer) = self.doc.add_page(Mm(PAGE_WIDTH), Mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn heading(&mut self, text: &str) {
        self.layer
            .use_text(text, 18.0, Mm(MARGIN), Mm(self.y), &self.bold);
        self.y -= LINE_HEIGHT * 2.0;
    }

    fn line(&mut self, text: &str) {
        if self.y < MARGIN {
            self.new_page();
        }
        if !text.is_empty() {
            self.layer
                .use_text(text, 11.0, Mm(MARGIN), Mm(self.y), &self.font);
        }
        self.y -= LINE_HEIGHT;
    }

    /// Place an image scaled to the printable width under a caption.
    fn image_page(&mut self, caption: &str, path: &Path) -> Result<(), SalesError> {
        let img = image_crate::open(path).map_err(pdf_err)?;
        let (width_px, height_px) = img.dimensions();
        let usable = PAGE_WIDTH - 2.0 * MARGIN;
        let dpi = width_px as f32 * 25.4 / usable;
        let height_mm = height_px as f32 * 25.4 / dpi;

        self.new_page();
        self.heading(caption);
        let bottom = (self.y - height_mm).max(MARGIN);
        Image::from_dynamic_image(&img).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(Mm(MARGIN)),
                translate_y: Some(Mm(bottom)),
                dpi: Some(dpi),
                ..Default::default()
            },
        );
        Ok(())
    }

    fn save(self, path: &Path) -> Result<(), SalesError> {
        let mut out = BufWriter::new(File::create(path)?);
        self.doc.save(&mut out).map_err(pdf_err)
    }
}

/// Write a summary page followed by one page per chart image.
pub fn export_pdf(
    analyzer: &Analyzer<'_>,
    forecast: Option<&Forecast>,
    charts: &[PathBuf],
    path: impl AsRef<Path>,
) -> Result<(), SalesError> {
    let path = path.as_ref();
    let mut writer = Writer::new("Sales Analysis Report")?;

    writer.heading("Sales Analysis Report");
    for line in summary_lines(analyzer, forecast) {
        writer.line(&line);
    }

    for chart in charts {
        let caption = chart
            .file_stem()
            .map(|s| s.to_string_lossy().replace('_', " "))
            .unwrap_or_default();
        debug!(chart = %chart.display(), "adding chart page");
        writer.image_page(&caption, chart)?;
    }

    writer.save(path)?;
    info!(path = %path.display(), pages = charts.len() + 1, "pdf report written");
    Ok(())
}
