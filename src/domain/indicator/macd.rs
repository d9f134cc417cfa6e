//! MACD (Moving Average Convergence/Divergence).
//!
//! - MACD line = EMA(fast) - EMA(slow)
//! - Signal line = EMA(signal) of the MACD line
//! - Histogram = MACD - Signal
//!
//! The signal EMA counts only defined MACD observations, so it first appears
//! `signal - 1` positions after the MACD line does.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{combine, ema_span};

pub struct MacdColumns {
    pub macd: Values,
    pub signal: Values,
    pub hist: Values,
}

pub fn calculate_macd(
    close: &[Option<f64>],
    fast: usize,
    slow: usize,
    signal: usize,
) -> MacdColumns {
    let fast_ema = ema_span(close, fast);
    let slow_ema = ema_span(close, slow);
    let macd = combine(&fast_ema, &slow_ema, |f, s| Some(f - s));
    let signal = ema_span(&macd, signal);
    let hist = combine(&macd, &signal, |m, s| Some(m - s));

    MacdColumns { macd, signal, hist }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::to_values;
    use approx::assert_relative_eq;

    fn trending(n: usize) -> Values {
        to_values(&(0..n).map(|i| 100.0 + i as f64 * 0.5 + (i as f64).sin()).collect::<Vec<_>>())
    }

    #[test]
    fn macd_warmup_positions() {
        let cols = calculate_macd(&trending(60), 12, 26, 9);
        assert_eq!(cols.macd[24], None);
        assert!(cols.macd[25].is_some());
        assert_eq!(cols.signal[32], None);
        assert!(cols.signal[33].is_some());
        assert_eq!(cols.hist[32], None);
        assert!(cols.hist[33].is_some());
    }

    #[test]
    fn histogram_is_macd_minus_signal() {
        let cols = calculate_macd(&trending(80), 12, 26, 9);
        for i in 0..80 {
            if let (Some(m), Some(s), Some(h)) = (cols.macd[i], cols.signal[i], cols.hist[i]) {
                assert_eq!(h, m - s);
            }
        }
    }

    #[test]
    fn flat_series_has_zero_macd() {
        let cols = calculate_macd(&to_values(&[50.0; 40]), 12, 26, 9);
        assert_relative_eq!(cols.macd[39].unwrap(), 0.0);
        assert_relative_eq!(cols.hist[39].unwrap(), 0.0);
    }

    #[test]
    fn uptrend_has_positive_macd() {
        let cols = calculate_macd(&trending(60), 12, 26, 9);
        assert!(cols.macd[59].unwrap() > 0.0);
    }
}
