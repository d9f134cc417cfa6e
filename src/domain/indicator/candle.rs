//! Single- and two-bar candle patterns, emitted as 0/1 flags.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::flag;
use crate::domain::ohlcv::OhlcvBar;

/// Body / range threshold below which a candle counts as a doji.
pub const DOJI_BODY_RATIO: f64 = 0.1;

pub struct CandleColumns {
    pub doji: Values,
    pub bull_engulf: Values,
    pub bear_engulf: Values,
}

pub fn calculate_candles(bars: &[OhlcvBar]) -> CandleColumns {
    let n = bars.len();

    let doji = flag(n, |i| {
        let bar = &bars[i];
        let range = bar.high - bar.low;
        range > 0.0 && (bar.close - bar.open).abs() / range < DOJI_BODY_RATIO
    });

    // Current body opens beyond the previous close and closes beyond the previous open.
    let bull_engulf = flag(n, |i| {
        i > 0 && {
            let (prev, cur) = (&bars[i - 1], &bars[i]);
            prev.close < prev.open
                && cur.close > cur.open
                && cur.open <= prev.close
                && cur.close >= prev.open
        }
    });
    let bear_engulf = flag(n, |i| {
        i > 0 && {
            let (prev, cur) = (&bars[i - 1], &bars[i]);
            prev.close > prev.open
                && cur.close < cur.open
                && cur.open >= prev.close
                && cur.close <= prev.open
        }
    });

    CandleColumns {
        doji,
        bull_engulf,
        bear_engulf,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{make_bars, make_ohlcv_bars};

    #[test]
    fn doji_detection() {
        let bars = make_ohlcv_bars(&[
            (10.0, 12.0, 8.0, 10.1, 1.0),
            (10.0, 12.0, 8.0, 11.0, 1.0),
        ]);
        let cols = calculate_candles(&bars);
        assert_eq!(cols.doji, vec![Some(1.0), Some(0.0)]);
    }

    #[test]
    fn zero_range_is_not_doji() {
        let cols = calculate_candles(&make_bars(&[10.0, 10.0]));
        assert_eq!(cols.doji, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn bullish_engulfing() {
        let bars = make_ohlcv_bars(&[
            (11.0, 11.5, 9.5, 10.0, 1.0),
            (9.8, 12.0, 9.5, 11.5, 1.0),
        ]);
        let cols = calculate_candles(&bars);
        assert_eq!(cols.bull_engulf, vec![Some(0.0), Some(1.0)]);
        assert_eq!(cols.bear_engulf, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn bearish_engulfing() {
        let bars = make_ohlcv_bars(&[
            (10.0, 11.5, 9.5, 11.0, 1.0),
            (11.2, 11.5, 9.0, 9.5, 1.0),
        ]);
        let cols = calculate_candles(&bars);
        assert_eq!(cols.bear_engulf, vec![Some(0.0), Some(1.0)]);
        assert_eq!(cols.bull_engulf, vec![Some(0.0), Some(0.0)]);
    }

    #[test]
    fn inside_bar_does_not_engulf() {
        let bars = make_ohlcv_bars(&[
            (11.0, 11.5, 9.5, 10.0, 1.0),
            (10.2, 10.9, 10.1, 10.8, 1.0),
        ]);
        let cols = calculate_candles(&bars);
        assert_eq!(cols.bull_engulf[1], Some(0.0));
    }
}
