//! Bar frequency and dated predictions.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

use crate::domain::error::StockcastError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

impl Frequency {
    /// Calendar days between consecutive bars or predictions.
    pub fn step_days(self) -> i64 {
        match self {
            Frequency::Daily => 1,
            Frequency::Weekly => 7,
            Frequency::Monthly => 30,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Frequency::Daily => "daily",
            Frequency::Weekly => "weekly",
            Frequency::Monthly => "monthly",
        }
    }

    /// Date of the `index`-th (0-based) step after `anchor`.
    pub fn date_after(self, anchor: NaiveDate, index: usize) -> NaiveDate {
        anchor + Duration::days((index as i64 + 1) * self.step_days())
    }
}

impl fmt::Display for Frequency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Frequency {
    type Err = StockcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "time_series_daily" => Ok(Frequency::Daily),
            "weekly" | "time_series_weekly" => Ok(Frequency::Weekly),
            "monthly" | "time_series_monthly" => Ok(Frequency::Monthly),
            other => Err(StockcastError::invalid(format!(
                "unknown frequency '{other}' (expected daily, weekly or monthly)"
            ))),
        }
    }
}

/// One forecast point. Prices are rounded to cents on construction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Prediction {
    pub date: NaiveDate,
    pub price: f64,
}

impl Prediction {
    pub fn new(date: NaiveDate, price: f64) -> Self {
        Self {
            date,
            price: round_cents(price),
        }
    }
}

pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Attach dates to a raw price path: step `i` lands on `anchor + (i+1)·step`.
pub fn date_predictions(prices: &[f64], anchor: NaiveDate, frequency: Frequency) -> Vec<Prediction> {
    prices
        .iter()
        .enumerate()
        .map(|(i, &p)| Prediction::new(frequency.date_after(anchor, i), p))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn step_days_per_frequency() {
        assert_eq!(Frequency::Daily.step_days(), 1);
        assert_eq!(Frequency::Weekly.step_days(), 7);
        assert_eq!(Frequency::Monthly.step_days(), 30);
    }

    #[test]
    fn parse_accepts_case_and_function_names() {
        assert_eq!("Weekly".parse::<Frequency>().unwrap(), Frequency::Weekly);
        assert_eq!(
            "TIME_SERIES_MONTHLY".parse::<Frequency>().unwrap(),
            Frequency::Monthly
        );
        assert!("hourly".parse::<Frequency>().is_err());
    }

    #[test]
    fn dates_start_one_step_after_anchor() {
        let preds = date_predictions(&[1.0, 2.0, 3.0], date(2024, 3, 1), Frequency::Weekly);
        assert_eq!(preds[0].date, date(2024, 3, 8));
        assert_eq!(preds[1].date, date(2024, 3, 15));
        assert_eq!(preds[2].date, date(2024, 3, 22));
    }

    #[test]
    fn prices_are_rounded_to_cents() {
        assert_eq!(Prediction::new(date(2024, 1, 1), 2505.0025).price, 2505.0);
        assert_eq!(Prediction::new(date(2024, 1, 1), 2507.5075025).price, 2507.51);
    }
}
