//! Boundary operations: `predict`, `feature_columns`, `indicators` and
//! `history`, wired to the history and fundamentals ports.
//!
//! Provider failures never escape from here as provider errors. They are
//! logged and treated as "no data", which the caller then sees as
//! `NoData`/`InsufficientData`.

use chrono::NaiveDate;
use rand::Rng;
use serde::Serialize;
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::domain::error::StockcastError;
use crate::domain::features::{align_by_date, Fundamentals};
use crate::domain::forecast::{drift_fallback, forecast_prices, training_features, ForecastInput};
use crate::domain::frame::Frame;
use crate::domain::frequency::{date_predictions, Frequency, Prediction};
use crate::domain::indicator::engine::compute_indicators;
use crate::domain::indicator::{ColumnId, Values};
use crate::domain::ohlcv::{closes, OhlcvBar};
use crate::domain::request::{
    Mode, PredictRequest, SeriesQuery, DEFAULT_HISTORY_LIMIT, DEFAULT_INDICATOR_LIMIT,
};
use crate::domain::simulator::simulate;
use crate::ports::fundamentals_port::FundamentalsPort;
use crate::ports::history_port::{HistoryPort, OutputSize};

/// The external collaborators one request talks to.
#[derive(Clone, Copy)]
pub struct Providers<'a> {
    pub history: &'a dyn HistoryPort,
    pub fundamentals: &'a dyn FundamentalsPort,
    pub output_size: OutputSize,
}

/// Where a prediction list came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Source {
    Model,
    DriftFallback,
    Manual,
}

/// Latest values of the headline indicators.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IndicatorSnapshot {
    pub close: Option<f64>,
    pub sma_20: Option<f64>,
    pub ema_20: Option<f64>,
    pub rsi_14: Option<f64>,
    pub macd: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_hist: Option<f64>,
    pub bb_mid: Option<f64>,
    pub bb_upper: Option<f64>,
    pub bb_lower: Option<f64>,
    pub atr_14: Option<f64>,
    pub obv: Option<f64>,
}

impl IndicatorSnapshot {
    /// Snapshot of the last row of the enriched series, `None` for an empty one.
    pub fn from_bars(bars: &[OhlcvBar]) -> Option<Self> {
        let frame = compute_indicators(bars);
        let row = frame.len().checked_sub(1)?;
        let at = |id| frame.value(id, row);
        Some(Self {
            close: at(ColumnId::Close),
            sma_20: at(ColumnId::Sma20),
            ema_20: at(ColumnId::Ema20),
            rsi_14: at(ColumnId::Rsi14),
            macd: at(ColumnId::Macd),
            macd_signal: at(ColumnId::MacdSignal),
            macd_hist: at(ColumnId::MacdHist),
            bb_mid: at(ColumnId::BbMid),
            bb_upper: at(ColumnId::BbUpper),
            bb_lower: at(ColumnId::BbLower),
            atr_14: at(ColumnId::Atr14),
            obv: at(ColumnId::Obv),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictResponse {
    pub ticker: String,
    pub predictions: Vec<Prediction>,
    pub indicators_latest: Option<IndicatorSnapshot>,
    pub source: Option<Source>,
    pub error: Option<String>,
}

impl PredictResponse {
    pub fn from_error(ticker: impl Into<String>, err: &StockcastError) -> Self {
        Self {
            ticker: ticker.into(),
            predictions: Vec::new(),
            indicators_latest: None,
            source: None,
            error: Some(err.to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeatureColumns {
    pub columns: Vec<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRows {
    pub ticker: String,
    pub frequency: Frequency,
    pub rows: Vec<Map<String, Value>>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRow {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryRows {
    pub ticker: String,
    pub frequency: Frequency,
    pub rows: Vec<HistoryRow>,
}

/// History for `symbol`, retried once at monthly frequency when the first
/// fetch is empty or fails. Returns the bars with the frequency they came from.
pub fn fetch_history(
    providers: &Providers<'_>,
    symbol: &str,
    frequency: Frequency,
) -> Result<(Vec<OhlcvBar>, Frequency), StockcastError> {
    let bars = fetch_or_empty(providers, symbol, frequency);
    if !bars.is_empty() {
        return Ok((bars, frequency));
    }
    if frequency != Frequency::Monthly {
        warn!(symbol, %frequency, "no history, retrying at monthly frequency");
        let bars = fetch_or_empty(providers, symbol, Frequency::Monthly);
        if !bars.is_empty() {
            return Ok((bars, Frequency::Monthly));
        }
    }
    Err(StockcastError::NoData {
        symbol: symbol.to_string(),
    })
}

fn fetch_or_empty(providers: &Providers<'_>, symbol: &str, frequency: Frequency) -> Vec<OhlcvBar> {
    match providers.history.fetch(symbol, frequency, providers.output_size) {
        Ok(bars) => bars,
        Err(e) => {
            warn!(symbol, %frequency, error = %e, "history provider failed");
            Vec::new()
        }
    }
}

fn fetch_fundamentals(providers: &Providers<'_>, symbol: &str) -> Fundamentals {
    providers.fundamentals.fetch(symbol).unwrap_or_else(|e| {
        warn!(symbol, error = %e, "fundamentals provider failed");
        Fundamentals::default()
    })
}

/// Market index closes aligned to `bars`; `None` when no index is configured
/// or the index has no history at `frequency`.
fn fetch_market_index(
    providers: &Providers<'_>,
    market_symbol: Option<&str>,
    frequency: Frequency,
    bars: &[OhlcvBar],
) -> Option<Values> {
    let market_symbol = market_symbol?;
    let index = fetch_or_empty(providers, market_symbol, frequency);
    if index.is_empty() {
        warn!(market_symbol, %frequency, "market index unavailable, continuing without it");
        return None;
    }
    Some(align_by_date(bars, &index))
}

/// Forecast (auto mode) or simulate (manual mode) the next `request.days`
/// closes. Dates are anchored at `today` and step by the requested
/// frequency, even when the history came from the monthly fallback.
pub fn predict<R: Rng + ?Sized>(
    providers: &Providers<'_>,
    request: &PredictRequest,
    today: NaiveDate,
    rng: &mut R,
) -> Result<PredictResponse, StockcastError> {
    match request.mode {
        Mode::Auto => predict_auto(providers, request, today),
        Mode::Manual => predict_manual(providers, request, today, rng),
    }
}

fn predict_auto(
    providers: &Providers<'_>,
    request: &PredictRequest,
    today: NaiveDate,
) -> Result<PredictResponse, StockcastError> {
    let symbol = request.symbol.as_str();
    let (bars, frequency) = fetch_history(providers, symbol, request.frequency)?;
    let latest = IndicatorSnapshot::from_bars(&bars);
    let fundamentals = fetch_fundamentals(providers, symbol);
    let index = fetch_market_index(providers, request.market_symbol.as_deref(), frequency, &bars);

    let input = ForecastInput {
        bars: &bars,
        fundamentals: Some(&fundamentals),
        market_index: index.as_deref(),
    };
    let (prices, source) = match forecast_prices(&input, request.days, &request.model) {
        Ok(prices) => (prices, Source::Model),
        Err(e) => {
            warn!(symbol, error = %e, "forecast engine failed, using drift fallback");
            (drift_fallback(&closes(&bars), request.days)?, Source::DriftFallback)
        }
    };
    info!(symbol, source = ?source, steps = prices.len(), "predicted");

    Ok(PredictResponse {
        ticker: request.symbol.clone(),
        predictions: date_predictions(&prices, today, request.frequency),
        indicators_latest: latest,
        source: Some(source),
        error: None,
    })
}

fn predict_manual<R: Rng + ?Sized>(
    providers: &Providers<'_>,
    request: &PredictRequest,
    today: NaiveDate,
    rng: &mut R,
) -> Result<PredictResponse, StockcastError> {
    let (seed, latest) = match request.base_price {
        Some(price) => (price, None),
        None => {
            let (bars, _) = fetch_history(providers, &request.symbol, request.frequency)?;
            let last = bars.last().map(|b| b.close).ok_or_else(|| StockcastError::NoData {
                symbol: request.symbol.clone(),
            })?;
            (last, IndicatorSnapshot::from_bars(&bars))
        }
    };

    let predictions = simulate(seed, &request.manual, request.days, request.frequency, today, rng)?;
    Ok(PredictResponse {
        ticker: request.symbol.clone(),
        predictions,
        indicators_latest: latest,
        source: Some(Source::Manual),
        error: None,
    })
}

/// Feature columns the forecast engine would train on for `query`.
/// Fundamentals and the market index are included exactly as `predict`
/// would include them; the label is never listed.
pub fn feature_columns(
    providers: &Providers<'_>,
    query: &SeriesQuery,
) -> Result<FeatureColumns, StockcastError> {
    let (bars, frequency) = fetch_history(providers, &query.symbol, query.frequency)?;
    let fundamentals = fetch_fundamentals(providers, &query.symbol);
    let index = fetch_market_index(providers, query.market_symbol.as_deref(), frequency, &bars);

    let input = ForecastInput {
        bars: &bars,
        fundamentals: Some(&fundamentals),
        market_index: index.as_deref(),
    }
    .windowed(query.window);
    let columns: Vec<String> = training_features(&input)
        .into_iter()
        .map(|id| id.name().to_string())
        .collect();
    Ok(FeatureColumns {
        count: columns.len(),
        columns,
    })
}

/// The trailing `limit` rows (default 120) of the enriched series, one JSON
/// object per row: `date` first, then every column in canonical order with
/// `null` for undefined values.
pub fn indicators(
    providers: &Providers<'_>,
    query: &SeriesQuery,
) -> Result<IndicatorRows, StockcastError> {
    let bars = fetch_or_empty(providers, &query.symbol, query.frequency);
    if bars.is_empty() {
        return Err(StockcastError::NoData {
            symbol: query.symbol.clone(),
        });
    }
    let frame = compute_indicators(&bars).tail(query.limit.unwrap_or(DEFAULT_INDICATOR_LIMIT));
    Ok(IndicatorRows {
        ticker: query.symbol.clone(),
        frequency: query.frequency,
        rows: frame_rows(&frame),
    })
}

fn frame_rows(frame: &Frame) -> Vec<Map<String, Value>> {
    (0..frame.len())
        .map(|r| {
            let mut row = Map::new();
            row.insert("date".into(), Value::String(frame.dates()[r].to_string()));
            for (id, value) in frame.row(r) {
                row.insert(id.name().into(), value.map_or(Value::Null, Value::from));
            }
            row
        })
        .collect()
}

/// The trailing `limit` raw bars (default 100). An unknown symbol yields no rows.
pub fn history(providers: &Providers<'_>, query: &SeriesQuery) -> HistoryRows {
    let bars = fetch_or_empty(providers, &query.symbol, query.frequency);
    let limit = query.limit.unwrap_or(DEFAULT_HISTORY_LIMIT);
    let rows = bars[bars.len().saturating_sub(limit)..]
        .iter()
        .map(|b| HistoryRow {
            date: b.date,
            open: b.open,
            high: b.high,
            low: b.low,
            close: b.close,
            volume: b.volume,
        })
        .collect();
    HistoryRows {
        ticker: query.symbol.clone(),
        frequency: query.frequency,
        rows,
    }
}
