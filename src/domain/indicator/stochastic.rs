//! Stochastic oscillator.
//!
//! %K = (close - lowest_low(n)) / (highest_high(n) - lowest_low(n)) × 100
//! %D = SMA(d) of %K
//!
//! %K is undefined when the n-bar range is 0.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{rolling_max, rolling_mean, rolling_min, to_values};
use crate::domain::ohlcv::OhlcvBar;

pub struct StochasticColumns {
    pub k: Values,
    pub d: Values,
}

pub fn calculate_stochastic(bars: &[OhlcvBar], k_period: usize, d_period: usize) -> StochasticColumns {
    let highs = to_values(&bars.iter().map(|b| b.high).collect::<Vec<_>>());
    let lows = to_values(&bars.iter().map(|b| b.low).collect::<Vec<_>>());
    let highest = rolling_max(&highs, k_period, k_period);
    let lowest = rolling_min(&lows, k_period, k_period);

    let k: Values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| match (highest[i], lowest[i]) {
            (Some(hh), Some(ll)) if hh - ll != 0.0 => Some((bar.close - ll) / (hh - ll) * 100.0),
            _ => None,
        })
        .collect();
    let d = rolling_mean(&k, d_period);

    StochasticColumns { k, d }
}
