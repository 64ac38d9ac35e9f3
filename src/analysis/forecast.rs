use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::SalesError;

use super::DailyBucket;

/// Largest number of trailing days averaged by default.
pub const DEFAULT_WINDOW: usize = 7;
/// Number of future days projected by default.
pub const DEFAULT_HORIZON: u32 = 7;
/// Longest projection the CLI and config accept.
pub const MAX_HORIZON: u32 = 365;

/// A projected daily total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastPoint {
    pub date: NaiveDate,
    pub amount: f64,
}

/// A flat moving-average projection.
///
/// Every point carries the same value: the mean of the last `window` daily
/// totals. It deliberately ignores trend and seasonality.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    /// Number of trailing days that were averaged; 0 when nothing was projected
    pub window: usize,
    /// The averaged daily total, if any history was available
    pub average: Option<f64>,
    pub points: Vec<ForecastPoint>,
}

impl Forecast {
    /// A forecast with no points, used when daily history is unavailable.
    pub fn empty() -> Self {
        Self {
            window: 0,
            average: None,
            points: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Project `horizon` days past the last bucket using the mean of the most
/// recent `min(max_window, buckets.len())` daily totals.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use sales_analyzer::analysis::{moving_average_forecast, DailyBucket};
///
/// let bucket = DailyBucket {
///     date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
///     amount: 120.0,
///     quantity: 3,
///     records: 2,
///     amount_records: 2,
/// };
/// let forecast = moving_average_forecast(&[bucket], 7, 7).unwrap();
/// assert_eq!(forecast.points.len(), 7);
/// assert!(forecast.points.iter().all(|p| p.amount == 120.0));
/// ```
pub fn moving_average_forecast(
    buckets: &[DailyBucket],
    horizon: u32,
    max_window: usize,
) -> Result<Forecast, SalesError> {
    let Some(last) = buckets.last() else {
        return Err(SalesError::InsufficientData(
            "no daily history to forecast from".to_string(),
        ));
    };
    let window = max_window.max(1).min(buckets.len());
    let recent = &buckets[buckets.len() - window..];
    let average = recent.iter().map(|b| b.amount).sum::<f64>() / window as f64;

    let points = (1..=horizon)
        .map_while(|offset| {
            last.date
                .checked_add_days(Days::new(u64::from(offset)))
                .map(|date| ForecastPoint {
                    date,
                    amount: average,
                })
        })
        .collect();

    Ok(Forecast {
        window,
        average: Some(average),
        points,
    })
}
