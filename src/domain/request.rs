//! Request normalisation: loosely-typed JSON payloads into explicit structs,
//! validated once at the boundary.

use std::str::FromStr;

use serde::Deserialize;

use crate::domain::error::StockcastError;
use crate::domain::frequency::Frequency;
use crate::domain::model::{ModelConfig, ModelType};
use crate::domain::simulator::ManualParams;

pub const MAX_DAYS: usize = 5;
pub const DEFAULT_INDICATOR_LIMIT: usize = 120;
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Auto,
    Manual,
}

impl FromStr for Mode {
    type Err = StockcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "auto" | "ml" | "model" => Ok(Mode::Auto),
            "manual" => Ok(Mode::Manual),
            other => Err(StockcastError::invalid(format!(
                "unknown mode '{other}' (expected auto or manual)"
            ))),
        }
    }
}

/// `model` may be a bare type name or an object with parameters.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RawModel {
    Name(String),
    Params {
        #[serde(rename = "type")]
        model_type: Option<String>,
        window: Option<i64>,
        alpha: Option<f64>,
    },
}

/// Predict payload as received. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawPredictRequest {
    pub ticker: Option<String>,
    pub days: Option<f64>,
    pub mode: Option<String>,
    pub frequency: Option<String>,
    pub model: Option<RawModel>,
    pub window: Option<i64>,
    pub alpha: Option<f64>,
    pub market_ticker: Option<String>,
    pub base_price: Option<f64>,
    pub drift_pct: Option<f64>,
    pub vol_pct: Option<f64>,
    pub slope: Option<f64>,
}

/// Payload shared by the indicators, history and feature-column queries.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawSeriesRequest {
    pub ticker: Option<String>,
    pub frequency: Option<String>,
    /// Provider function name (`TIME_SERIES_WEEKLY`, ...); wins over `frequency`.
    pub function: Option<String>,
    pub limit: Option<i64>,
    pub window: Option<i64>,
    pub market_ticker: Option<String>,
}

/// Configured fallbacks for anything a request leaves out.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDefaults {
    pub frequency: Frequency,
    pub days: usize,
    pub model: ModelConfig,
    pub manual: ManualParams,
    pub base_price: Option<f64>,
    pub market_symbol: Option<String>,
}

impl Default for RequestDefaults {
    fn default() -> Self {
        Self {
            frequency: Frequency::Daily,
            days: MAX_DAYS,
            model: ModelConfig::default(),
            manual: ManualParams::default(),
            base_price: None,
            market_symbol: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PredictRequest {
    pub symbol: String,
    pub days: usize,
    pub mode: Mode,
    pub frequency: Frequency,
    pub model: ModelConfig,
    pub manual: ManualParams,
    pub base_price: Option<f64>,
    pub market_symbol: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SeriesQuery {
    pub symbol: String,
    pub frequency: Frequency,
    pub limit: Option<usize>,
    pub window: Option<usize>,
    pub market_symbol: Option<String>,
}

/// Horizon clamp: absent uses `default`, non-positive becomes 5, anything
/// above 5 becomes 5.
pub fn clamp_days(days: Option<f64>, default: usize) -> usize {
    match days {
        None => default.clamp(1, MAX_DAYS),
        Some(d) if !d.is_finite() || d.trunc() <= 0.0 => MAX_DAYS,
        Some(d) => (d.trunc() as usize).min(MAX_DAYS),
    }
}

pub fn normalize_symbol(raw: Option<&str>) -> Result<String, StockcastError> {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => Ok(s.to_uppercase()),
        _ => Err(StockcastError::invalid("ticker is required")),
    }
}

fn optional_symbol(raw: Option<&str>) -> Option<String> {
    raw.map(str::trim).filter(|s| !s.is_empty()).map(str::to_uppercase)
}

fn positive_window(window: Option<i64>) -> Result<Option<usize>, StockcastError> {
    match window {
        None => Ok(None),
        Some(w) if w > 0 => Ok(Some(w as usize)),
        Some(w) => Err(StockcastError::invalid(format!("window must be positive, got {w}"))),
    }
}

fn positive_alpha(alpha: f64) -> Result<f64, StockcastError> {
    if alpha.is_finite() && alpha > 0.0 {
        Ok(alpha)
    } else {
        Err(StockcastError::invalid(format!("ridge alpha must be positive, got {alpha}")))
    }
}

impl PredictRequest {
    pub fn from_raw(raw: &RawPredictRequest, defaults: &RequestDefaults) -> Result<Self, StockcastError> {
        let symbol = normalize_symbol(raw.ticker.as_deref())?;
        let days = clamp_days(raw.days, defaults.days);
        let mode = raw
            .mode
            .as_deref()
            .map(str::parse::<Mode>)
            .transpose()?
            .unwrap_or_default();
        let frequency = raw
            .frequency
            .as_deref()
            .map(str::parse::<Frequency>)
            .transpose()?
            .unwrap_or(defaults.frequency);

        let (model_name, nested_window, nested_alpha) = match &raw.model {
            None => (None, None, None),
            Some(RawModel::Name(name)) => (Some(name.as_str()), None, None),
            Some(RawModel::Params {
                model_type,
                window,
                alpha,
            }) => (model_type.as_deref(), *window, *alpha),
        };
        let model_type = model_name
            .map(ModelType::from_str)
            .transpose()?
            .unwrap_or(defaults.model.model_type);
        let window = positive_window(raw.window.or(nested_window))?.or(defaults.model.window);
        let ridge_alpha = positive_alpha(raw.alpha.or(nested_alpha).unwrap_or(defaults.model.ridge_alpha))?;

        let manual = ManualParams {
            drift_pct: raw.drift_pct.unwrap_or(defaults.manual.drift_pct),
            vol_pct: raw.vol_pct.unwrap_or(defaults.manual.vol_pct),
            slope: raw.slope.unwrap_or(defaults.manual.slope),
        };
        if !(manual.vol_pct >= 0.0) {
            return Err(StockcastError::invalid(format!(
                "vol_pct must be non-negative, got {}",
                manual.vol_pct
            )));
        }

        Ok(PredictRequest {
            symbol,
            days,
            mode,
            frequency,
            model: ModelConfig {
                model_type,
                window,
                ridge_alpha,
            },
            manual,
            base_price: raw.base_price.or(defaults.base_price),
            market_symbol: optional_symbol(raw.market_ticker.as_deref())
                .or_else(|| defaults.market_symbol.clone()),
        })
    }
}

impl SeriesQuery {
    pub fn from_raw(raw: &RawSeriesRequest, defaults: &RequestDefaults) -> Result<Self, StockcastError> {
        let symbol = normalize_symbol(raw.ticker.as_deref())?;
        let frequency = match raw.function.as_deref().filter(|f| !f.trim().is_empty()) {
            Some(function) => function.parse::<Frequency>()?,
            None => raw
                .frequency
                .as_deref()
                .map(str::parse::<Frequency>)
                .transpose()?
                .unwrap_or(defaults.frequency),
        };
        let limit = match raw.limit {
            None => None,
            Some(l) if l > 0 => Some(l as usize),
            Some(l) => return Err(StockcastError::invalid(format!("limit must be positive, got {l}"))),
        };

        Ok(SeriesQuery {
            symbol,
            frequency,
            limit,
            window: positive_window(raw.window)?.or(defaults.model.window),
            market_symbol: optional_symbol(raw.market_ticker.as_deref())
                .or_else(|| defaults.market_symbol.clone()),
        })
    }
}
