//! Support/resistance levels and breakout flags.
//!
//! support    = rolling min of close over n bars
//! resistance = rolling max of close over n bars
//! breakout   = 1 when close > previous bar's resistance, else 0
//! breakdown  = 1 when close < previous bar's support, else 0
//!
//! Unlike the other rolling indicators, the extrema accept partial windows
//! (one observation is enough), so both levels are defined from the first bar.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{flag, rolling_max, rolling_min, shift};

pub struct LevelColumns {
    pub support: Values,
    pub resistance: Values,
    pub breakout: Values,
    pub breakdown: Values,
}

pub fn calculate_levels(close: &[Option<f64>], period: usize) -> LevelColumns {
    let support = rolling_min(close, period, 1);
    let resistance = rolling_max(close, period, 1);
    let prior_support = shift(&support, 1);
    let prior_resistance = shift(&resistance, 1);

    let breakout = flag(close.len(), |i| matches!(
        (close[i], prior_resistance[i]),
        (Some(c), Some(r)) if c > r
    ));
    let breakdown = flag(close.len(), |i| matches!(
        (close[i], prior_support[i]),
        (Some(c), Some(s)) if c < s
    ));

    LevelColumns {
        support,
        resistance,
        breakout,
        breakdown,
    }
}
