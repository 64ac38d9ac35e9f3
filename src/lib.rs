pub mod analysis;
pub mod config;
pub mod error;
pub mod export;
pub mod io;
pub mod models;
pub mod visualization;

pub use analysis::Analyzer;
pub use config::AnalyzerConfig;
pub use error::SalesError;
pub use io::{TableReader, TableWriter};
pub use models::{Column, LoadReport, SalesRecord, SalesTable};
