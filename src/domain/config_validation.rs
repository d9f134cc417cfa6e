//! Configuration validation.
//!
//! Checks every recognised key once at load time and turns the INI sections
//! into the explicit settings the service layer runs on:
//!
//! ```ini
//! [data]
//! dir = ./data
//! output_size = full
//!
//! [forecast]
//! frequency = daily
//! days = 5
//! model_type = ridge
//! window = 250
//! ridge_alpha = 1.0
//! market_index = SPY
//!
//! [manual]
//! drift_pct = 0.1
//! vol_pct = 1.0
//! slope = 0.0
//! base_price = 2500
//! ```

use std::path::PathBuf;
use std::str::FromStr;

use crate::domain::error::StockcastError;
use crate::domain::frequency::Frequency;
use crate::domain::model::{ModelConfig, ModelType};
use crate::domain::request::{RequestDefaults, MAX_DAYS};
use crate::domain::simulator::ManualParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::history_port::OutputSize;

/// Where history comes from.
#[derive(Debug, Clone, PartialEq)]
pub struct DataSettings {
    pub dir: PathBuf,
    pub output_size: OutputSize,
}

pub fn validate_forecast_config(config: &dyn ConfigPort) -> Result<(), StockcastError> {
    data_settings(config)?;
    request_defaults(config)?;
    Ok(())
}

pub fn data_settings(config: &dyn ConfigPort) -> Result<DataSettings, StockcastError> {
    let dir = match config.get_string("data", "dir") {
        Some(s) if !s.trim().is_empty() => PathBuf::from(s.trim()),
        _ => {
            return Err(StockcastError::ConfigMissing {
                section: "data".to_string(),
                key: "dir".to_string(),
            });
        }
    };
    let output_size = parse_key::<OutputSize>(config, "data", "output_size")?.unwrap_or_default();
    Ok(DataSettings { dir, output_size })
}

pub fn request_defaults(config: &dyn ConfigPort) -> Result<RequestDefaults, StockcastError> {
    let fallback = RequestDefaults::default();

    let frequency = parse_key::<Frequency>(config, "forecast", "frequency")?.unwrap_or(fallback.frequency);
    let days = match parse_key::<i64>(config, "forecast", "days")? {
        None => fallback.days,
        Some(d) if (1..=MAX_DAYS as i64).contains(&d) => d as usize,
        Some(_) => return Err(invalid("forecast", "days", format!("days must be between 1 and {MAX_DAYS}"))),
    };
    let model_type = parse_key::<ModelType>(config, "forecast", "model_type")?.unwrap_or_default();
    let window = match parse_key::<i64>(config, "forecast", "window")? {
        None => None,
        Some(w) if w > 0 => Some(w as usize),
        Some(_) => return Err(invalid("forecast", "window", "window must be positive")),
    };
    let ridge_alpha = match parse_key::<f64>(config, "forecast", "ridge_alpha")? {
        None => fallback.model.ridge_alpha,
        Some(a) if a.is_finite() && a > 0.0 => a,
        Some(_) => return Err(invalid("forecast", "ridge_alpha", "ridge_alpha must be positive")),
    };
    let market_symbol = config
        .get_string("forecast", "market_index")
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty());

    let manual = ManualParams {
        drift_pct: finite_key(config, "manual", "drift_pct")?.unwrap_or(fallback.manual.drift_pct),
        vol_pct: finite_key(config, "manual", "vol_pct")?.unwrap_or(fallback.manual.vol_pct),
        slope: finite_key(config, "manual", "slope")?.unwrap_or(fallback.manual.slope),
    };
    if manual.vol_pct < 0.0 {
        return Err(invalid("manual", "vol_pct", "vol_pct must be non-negative"));
    }
    let base_price = finite_key(config, "manual", "base_price")?;

    Ok(RequestDefaults {
        frequency,
        days,
        model: ModelConfig {
            model_type,
            window,
            ridge_alpha,
        },
        manual,
        base_price,
        market_symbol,
    })
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> StockcastError {
    StockcastError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// `Ok(None)` when the key is absent or blank, `ConfigInvalid` when it does not parse.
fn parse_key<T>(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<T>, StockcastError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match config.get_string(section, key) {
        None => Ok(None),
        Some(raw) if raw.trim().is_empty() => Ok(None),
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| invalid(section, key, format!("cannot parse '{}': {e}", raw.trim()))),
    }
}

fn finite_key(config: &dyn ConfigPort, section: &str, key: &str) -> Result<Option<f64>, StockcastError> {
    match parse_key::<f64>(config, section, key)? {
        Some(v) if !v.is_finite() => Err(invalid(section, key, format!("{key} must be finite"))),
        other => Ok(other),
    }
}
