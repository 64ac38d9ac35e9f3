use std::path::PathBuf;

use thiserror::Error;

use crate::models::Column;

/// Errors that can occur while loading, analyzing or exporting sales data.
#[derive(Error, Debug)]
pub enum SalesError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Excel error: {0}")]
    Excel(String),

    #[error("Config error: {0}")]
    Config(#[from] toml::de::Error),

    #[error("Config error: {0}")]
    InvalidConfig(String),

    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("File is empty: {}", .0.display())]
    EmptyFile(PathBuf),

    #[error("Unsupported file format: .{0}. Use .csv, .json, or .xlsx")]
    UnsupportedFormat(String),

    #[error("No recognized columns (expected any of Date, Product, Region, Amount, Quantity, Salesperson)")]
    NoRecognizedColumns,

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Missing column: {0}")]
    MissingColumn(Column),

    #[error("Analysis error: {0}")]
    AnalysisError(String),

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Chart error: {0}")]
    Chart(String),

    #[error("PDF error: {0}")]
    Pdf(String),
}

impl SalesError {
    /// True for failures that leave no table to analyze.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            SalesError::Io(_)
                | SalesError::Csv(_)
                | SalesError::Json(_)
                | SalesError::Excel(_)
                | SalesError::FileNotFound(_)
                | SalesError::EmptyFile(_)
                | SalesError::UnsupportedFormat(_)
                | SalesError::NoRecognizedColumns
                | SalesError::ParseError(_)
        )
    }
}

impl From<calamine::Error> for SalesError {
    fn from(e: calamine::Error) -> Self {
        SalesError::Excel(e.to_string())
    }
}

impl From<calamine::XlsxError> for SalesError {
    fn from(e: calamine::XlsxError) -> Self {
        SalesError::Excel(e.to_string())
    }
}

impl From<rust_xlsxwriter::XlsxError> for SalesError {
    fn from(e: rust_xlsxwriter::XlsxError) -> Self {
        SalesError::Excel(e.to_string())
    }
}
