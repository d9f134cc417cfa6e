//! OBV (On-Balance Volume).

use crate::domain::indicator::Values;
use crate::domain::ohlcv::OhlcvBar;

/// Calculate OBV.
///
/// OBV[0] = 0
/// OBV[i] = OBV[i-1] + sign(close[i] - close[i-1]) × volume[i], sign(0) = 0
///
/// No warmup period. A bar without volume is undefined and contributes nothing
/// to the running total.
pub fn calculate_obv(bars: &[OhlcvBar]) -> Values {
    let mut obv = 0.0;

    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            let volume = bar.volume.filter(|v| v.is_finite())?;
            if i > 0 {
                let change = bar.close - bars[i - 1].close;
                if change > 0.0 {
                    obv += volume;
                } else if change < 0.0 {
                    obv -= volume;
                }
            }
            Some(obv)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{make_bars, make_ohlcv_bars};
    use approx::assert_relative_eq;

    #[test]
    fn obv_basic() {
        let bars = make_ohlcv_bars(&[
            (10.0, 10.0, 10.0, 10.0, 100.0),
            (11.0, 11.0, 11.0, 11.0, 200.0),
            (10.5, 10.5, 10.5, 10.5, 50.0),
            (10.5, 10.5, 10.5, 10.5, 75.0),
        ]);
        let out = calculate_obv(&bars);
        assert_relative_eq!(out[0].unwrap(), 0.0);
        assert_relative_eq!(out[1].unwrap(), 200.0);
        assert_relative_eq!(out[2].unwrap(), 150.0);
        // unchanged close contributes nothing
        assert_relative_eq!(out[3].unwrap(), 150.0);
    }

    #[test]
    fn obv_flat_series_stays_zero() {
        let out = calculate_obv(&make_bars(&[5.0; 10]));
        assert!(out.iter().all(|v| *v == Some(0.0)));
    }

    #[test]
    fn obv_missing_volume() {
        let mut bars = make_bars(&[1.0, 2.0, 3.0]);
        bars[1].volume = None;
        let out = calculate_obv(&bars);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 1000.0);
    }

    #[test]
    fn obv_empty() {
        assert!(calculate_obv(&[]).is_empty());
    }
}
