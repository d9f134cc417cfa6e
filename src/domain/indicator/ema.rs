//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first observation, EMA[i] = x[i]*k + EMA[i-1]*(1-k).
//! Warmup: the first (n-1) positions are undefined; the recursion itself starts
//! at the first value, not at an SMA seed.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::ema_span;

pub fn calculate_ema(values: &[Option<f64>], span: usize) -> Values {
    ema_span(values, span)
}
