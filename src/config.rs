use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::{DEFAULT_HORIZON, DEFAULT_WINDOW, MAX_HORIZON};
use crate::error::SalesError;

/// Moving-average forecast settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub window: usize,
    pub horizon: u32,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            horizon: DEFAULT_HORIZON,
        }
    }
}

/// Where and how large output artifacts are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    pub chart_width: u32,
    pub chart_height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("reports"),
            chart_width: 1024,
            chart_height: 640,
        }
    }
}

/// Analyzer settings, loadable from a TOML file. Every field has a default.
///
/// ```toml
/// preview_rows = 5
///
/// [forecast]
/// window = 7
/// horizon = 7
///
/// [output]
/// dir = "reports"
/// chart_width = 1024
/// chart_height = 640
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    /// Rows shown in the console preview
    pub preview_rows: usize,
    pub forecast: ForecastConfig,
    pub output: OutputConfig,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            preview_rows: 5,
            forecast: ForecastConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

impl AnalyzerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self, SalesError> {
        let cfg: Self = toml::from_str(content)?;
        cfg.validate()?;
        Ok(cfg)
    }

    fn validate(&self) -> Result<(), SalesError> {
        if self.forecast.horizon > MAX_HORIZON {
            return Err(SalesError::InvalidConfig(format!(
                "forecast.horizon must be at most {MAX_HORIZON}, got {}",
                self.forecast.horizon
            )));
        }
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SalesError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Load from `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, SalesError> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }
}
