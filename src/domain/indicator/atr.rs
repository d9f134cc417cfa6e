//! True Range and Average True Range.
//!
//! TR[0] = high - low (no previous close)
//! TR[i] = max(high - low, |high - prev_close|, |low - prev_close|)
//! ATR = EMA(n) of TR with smoothing 2/(n+1), first (n-1) positions undefined.

use crate::domain::indicator::{finite, Values};
use crate::domain::indicator_helpers::ema_span;
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_true_range(bars: &[OhlcvBar]) -> Values {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let tr = if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            };
            finite(tr)
        })
        .collect()
}

pub fn calculate_atr(true_range: &[Option<f64>], period: usize) -> Values {
    ema_span(true_range, period)
}
