//! Bollinger Bands.
//!
//! - Middle: SMA over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//! - Width: (Upper - Lower) / Middle, undefined when Middle is 0
//!
//! StdDev is the population standard deviation (divides by N, not N-1).
//! Warmup: first (period-1) positions are undefined.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{combine, rolling_mean, rolling_std};

pub struct BollingerColumns {
    pub mid: Values,
    pub upper: Values,
    pub lower: Values,
    pub width: Values,
}

pub fn calculate_bollinger(close: &[Option<f64>], period: usize, multiplier: f64) -> BollingerColumns {
    let mid = rolling_mean(close, period);
    let std = rolling_std(close, period);
    let upper = combine(&mid, &std, |m, s| Some(m + multiplier * s));
    let lower = combine(&mid, &std, |m, s| Some(m - multiplier * s));
    let band = combine(&upper, &lower, |u, l| Some(u - l));
    let width = combine(&band, &mid, |b, m| if m == 0.0 { None } else { Some(b / m) });

    BollingerColumns {
        mid,
        upper,
        lower,
        width,
    }
}
