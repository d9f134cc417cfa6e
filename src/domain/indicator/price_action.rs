//! Lags, returns and intrabar price ratios.

use crate::domain::indicator::{finite, Values};
use crate::domain::indicator_helpers::{combine, shift};
use crate::domain::ohlcv::OhlcvBar;

/// Simple return over `periods` bars: close / close_lag - 1.
pub fn calculate_return(close: &[Option<f64>], periods: usize) -> Values {
    combine(close, &shift(close, periods), |c, p| {
        if p == 0.0 { None } else { Some(c / p - 1.0) }
    })
}

pub fn calculate_lag(close: &[Option<f64>], periods: usize) -> Values {
    shift(close, periods)
}

pub struct PriceActionColumns {
    /// (high - low) / open × 100
    pub hl_pct: Values,
    /// (close - open) / open × 100
    pub co_pct: Values,
    /// (close - prev_close) / prev_close × 100
    pub cp_pct: Values,
}

pub fn calculate_price_action(bars: &[OhlcvBar]) -> PriceActionColumns {
    let pct = |num: f64, den: f64| if den == 0.0 { None } else { finite(num / den * 100.0) };

    let hl_pct = bars.iter().map(|b| pct(b.high - b.low, b.open)).collect();
    let co_pct = bars.iter().map(|b| pct(b.close - b.open, b.open)).collect();
    let cp_pct = bars
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let prev = bars.get(i.checked_sub(1)?)?.close;
            pct(b.close - prev, prev)
        })
        .collect();

    PriceActionColumns {
        hl_pct,
        co_pct,
        cp_pct,
    }
}
