//! Forecast engine: train on historical feature rows, then predict recursively
//! by feeding each prediction back as a synthetic bar.

use chrono::Duration;
use ndarray::{Array1, Array2};
use tracing::{debug, info};

use crate::domain::error::StockcastError;
use crate::domain::features::{assemble, Fundamentals};
use crate::domain::frame::Frame;
use crate::domain::frequency::{date_predictions, Frequency, Prediction};
use crate::domain::indicator::ColumnId;
use crate::domain::model::ModelConfig;
use crate::domain::ohlcv::OhlcvBar;

/// Fewer usable training rows than this is an insufficient-data failure.
pub const MIN_TRAINING_ROWS: usize = 60;

/// The drift fallback averages at most this many trailing log returns.
pub const FALLBACK_LOOKBACK: usize = 20;

/// The drift fallback needs at least this many closes.
pub const FALLBACK_MIN_CLOSES: usize = 5;

/// Everything the engine reads about one instrument.
#[derive(Debug, Clone, Copy)]
pub struct ForecastInput<'a> {
    pub bars: &'a [OhlcvBar],
    pub fundamentals: Option<&'a Fundamentals>,
    /// Market index closes aligned to `bars` by date.
    pub market_index: Option<&'a [Option<f64>]>,
}

impl<'a> ForecastInput<'a> {
    pub fn new(bars: &'a [OhlcvBar]) -> Self {
        Self {
            bars,
            fundamentals: None,
            market_index: None,
        }
    }

    /// Keep only the trailing `window` bars (and matching index values).
    pub fn windowed(self, window: Option<usize>) -> Self {
        let Some(window) = window.filter(|w| *w > 0 && *w < self.bars.len()) else {
            return self;
        };
        let start = self.bars.len() - window;
        Self {
            bars: &self.bars[start..],
            fundamentals: self.fundamentals,
            market_index: self.market_index.map(|idx| &idx[start.min(idx.len())..]),
        }
    }
}

/// Design matrix and labels with the feature ordering fixed at build time.
#[derive(Debug, Clone)]
pub struct TrainingSet {
    pub features: Vec<ColumnId>,
    pub x: Array2<f64>,
    pub y: Array1<f64>,
    /// Per-feature training mean, used to impute undefined prediction inputs.
    pub means: Vec<f64>,
}

impl TrainingSet {
    pub fn rows(&self) -> usize {
        self.y.len()
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.features.iter().map(|c| c.name().to_string()).collect()
    }

    /// Feature vector for row `row` of `matrix`, imputing undefined values.
    fn input_row(&self, matrix: &Frame, row: usize) -> Vec<f64> {
        self.features
            .iter()
            .zip(&self.means)
            .map(|(id, mean)| matrix.value(*id, row).unwrap_or(*mean))
            .collect()
    }
}

/// Assembled matrix, the feature set, and the `(row, label)` pairs usable
/// for training.
struct Selection {
    matrix: Frame,
    features: Vec<ColumnId>,
    usable: Vec<(usize, f64)>,
}

/// The label of each row is the close of the next bar of the series, so the
/// final bar is never a training row. Columns undefined on every labelled row
/// (a missing market index, unknown fundamentals, absent volume) are left out
/// of the feature set; any remaining undefined value drops its row.
fn select_training_rows(input: &ForecastInput<'_>) -> Selection {
    let bars = input.bars;
    let matrix = assemble(bars, input.fundamentals, input.market_index);
    let labelled: Vec<(usize, f64)> = matrix
        .positions()
        .iter()
        .enumerate()
        .filter_map(|(row, &pos)| {
            let next = bars.get(pos + 1)?;
            next.close.is_finite().then_some((row, next.close))
        })
        .collect();

    let features: Vec<ColumnId> = matrix
        .column_ids()
        .filter(|id| labelled.iter().any(|(row, _)| matrix.value(*id, *row).is_some()))
        .collect();

    let usable: Vec<(usize, f64)> = labelled
        .into_iter()
        .filter(|(row, _)| features.iter().all(|id| matrix.value(*id, *row).is_some()))
        .collect();

    Selection {
        matrix,
        features,
        usable,
    }
}

/// Feature columns a model trained on `input` would use, in canonical order.
/// Unlike [`build_training_set`] this never fails on a short series.
pub fn training_features(input: &ForecastInput<'_>) -> Vec<ColumnId> {
    select_training_rows(input).features
}

/// Build the training set from an (already windowed) input.
pub fn build_training_set(input: &ForecastInput<'_>) -> Result<TrainingSet, StockcastError> {
    if input.bars.is_empty() {
        return Err(StockcastError::InsufficientData {
            rows: 0,
            minimum: MIN_TRAINING_ROWS,
        });
    }

    let Selection {
        matrix,
        features,
        usable,
    } = select_training_rows(input);

    if usable.len() < MIN_TRAINING_ROWS {
        return Err(StockcastError::InsufficientData {
            rows: usable.len(),
            minimum: MIN_TRAINING_ROWS,
        });
    }

    let x = Array2::from_shape_fn((usable.len(), features.len()), |(r, c)| {
        matrix.value(features[c], usable[r].0).unwrap_or(f64::NAN)
    });
    let y = Array1::from_iter(usable.iter().map(|(_, label)| *label));
    let means = (0..features.len())
        .map(|c| x.column(c).mean().unwrap_or(0.0))
        .collect();

    debug!(
        rows = usable.len(),
        features = features.len(),
        "built training set"
    );
    Ok(TrainingSet {
        features,
        x,
        y,
        means,
    })
}

/// Next synthetic bar: flat at `price`, volume carried forward from the last
/// bar that has one, dated one inter-bar gap after the last bar (one day when
/// only one bar exists).
pub fn synthetic_bar(bars: &[OhlcvBar], price: f64) -> Option<OhlcvBar> {
    let last = bars.last()?;
    let gap = match bars.len() {
        0 | 1 => Duration::days(1),
        n => last.date - bars[n - 2].date,
    };
    let volume = bars.iter().rev().find_map(|b| b.volume);
    Some(OhlcvBar::flat(last.date + gap, price, volume))
}

/// Raw predicted closes for `steps` iterations.
pub fn forecast_prices(
    input: &ForecastInput<'_>,
    steps: usize,
    config: &ModelConfig,
) -> Result<Vec<f64>, StockcastError> {
    let input = input.windowed(config.window);
    let training = build_training_set(&input)?;

    let mut model = config.build();
    model.fit(&training.x, &training.y)?;
    info!(
        model = %config.model_type,
        rows = training.rows(),
        features = training.features.len(),
        "trained forecast model"
    );

    let mut sim: Vec<OhlcvBar> = input.bars.to_vec();
    let mut index: Option<Vec<Option<f64>>> = input.market_index.map(<[Option<f64>]>::to_vec);
    let mut prices = Vec::with_capacity(steps);

    for step in 0..steps {
        let matrix = assemble(&sim, input.fundamentals, index.as_deref());
        let last = matrix.len().checked_sub(1).ok_or(StockcastError::InsufficientData {
            rows: 0,
            minimum: MIN_TRAINING_ROWS,
        })?;
        let row = training.input_row(&matrix, last);
        let price = model.predict_one(&row)?;
        debug!(step, price, "predicted next close");
        prices.push(price);

        let bar = synthetic_bar(&sim, price).ok_or(StockcastError::ModelFailure {
            reason: "cannot extend an empty series".into(),
        })?;
        sim.push(bar);
        if let Some(index) = index.as_mut() {
            let carried = index.iter().rev().find_map(|v| *v);
            index.push(carried);
        }
    }
    Ok(prices)
}

/// Dated forecast anchored at the last known bar:
/// step `i` lands on `last_date + (i+1)·frequency_step`.
pub fn forecast(
    input: &ForecastInput<'_>,
    steps: usize,
    frequency: Frequency,
    config: &ModelConfig,
) -> Result<Vec<Prediction>, StockcastError> {
    let prices = forecast_prices(input, steps, config)?;
    let anchor = input
        .bars
        .last()
        .map(|b| b.date)
        .ok_or(StockcastError::InsufficientData {
            rows: 0,
            minimum: MIN_TRAINING_ROWS,
        })?;
    Ok(date_predictions(&prices, anchor, frequency))
}

/// Deterministic fallback: extrapolate the mean of the trailing (at most 20)
/// one-bar log returns geometrically from the last close.
pub fn drift_fallback(closes: &[f64], steps: usize) -> Result<Vec<f64>, StockcastError> {
    let closes: Vec<f64> = closes.iter().copied().filter(|c| c.is_finite()).collect();
    if closes.len() < FALLBACK_MIN_CLOSES {
        return Err(StockcastError::InsufficientData {
            rows: closes.len(),
            minimum: FALLBACK_MIN_CLOSES,
        });
    }

    let log_returns: Vec<f64> = closes
        .windows(2)
        .filter(|w| w[0] > 0.0 && w[1] > 0.0)
        .map(|w| (w[1] / w[0]).ln())
        .collect();
    if log_returns.is_empty() {
        return Err(StockcastError::InsufficientData {
            rows: 0,
            minimum: 1,
        });
    }
    let tail = &log_returns[log_returns.len().saturating_sub(FALLBACK_LOOKBACK)..];
    let mean_r = tail.iter().sum::<f64>() / tail.len() as f64;
    let growth = mean_r.exp();

    let mut price = closes[closes.len() - 1];
    Ok((0..steps)
        .map(|_| {
            price *= growth;
            price
        })
        .collect())
}
