//! Manual what-if simulator: drift, slope and Gaussian noise from a seed price.

use chrono::NaiveDate;
use rand::Rng;
use rand_distr::{Distribution, Normal};

use crate::domain::error::StockcastError;
use crate::domain::frequency::{date_predictions, Frequency, Prediction};

/// Scenario parameters. Percentages are per step (`0.1` means 0.1%).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ManualParams {
    pub drift_pct: f64,
    pub vol_pct: f64,
    /// Absolute price change added every step.
    pub slope: f64,
}

impl Default for ManualParams {
    fn default() -> Self {
        Self {
            drift_pct: 0.1,
            vol_pct: 1.0,
            slope: 0.0,
        }
    }
}

/// Walk `steps` prices from `seed`:
/// `p = p·(1 + drift) + slope`, then `p = p·(1 + N(0, vol))`.
/// With `vol_pct == 0` no draw is taken and the path is deterministic.
pub fn simulate_prices<R: Rng + ?Sized>(
    seed: f64,
    params: &ManualParams,
    steps: usize,
    rng: &mut R,
) -> Result<Vec<f64>, StockcastError> {
    if !seed.is_finite() {
        return Err(StockcastError::invalid(format!("seed price must be finite, got {seed}")));
    }
    let drift = params.drift_pct / 100.0;
    let vol = params.vol_pct / 100.0;
    let noise = if vol > 0.0 {
        Some(Normal::new(0.0, vol).map_err(|e| StockcastError::invalid(format!("vol_pct: {e}")))?)
    } else if vol == 0.0 {
        None
    } else {
        return Err(StockcastError::invalid(format!(
            "vol_pct must be non-negative, got {}",
            params.vol_pct
        )));
    };

    let mut price = seed;
    Ok((0..steps)
        .map(|_| {
            price = price * (1.0 + drift) + params.slope;
            if let Some(normal) = &noise {
                price *= 1.0 + normal.sample(rng);
            }
            price
        })
        .collect())
}

/// Dated simulation: step `i` lands on `anchor + (i+1)·frequency_step`.
pub fn simulate<R: Rng + ?Sized>(
    seed: f64,
    params: &ManualParams,
    steps: usize,
    frequency: Frequency,
    anchor: NaiveDate,
    rng: &mut R,
) -> Result<Vec<Prediction>, StockcastError> {
    let prices = simulate_prices(seed, params, steps, rng)?;
    Ok(date_predictions(&prices, anchor, frequency))
}
