//! MFI (Money Flow Index).
//!
//! typical = (high + low + close) / 3, raw flow = typical × volume.
//! Flow is positive when typical price rises against the previous bar and
//! negative when it falls. Over n bars:
//!
//! MFI = 100 - 100 / (1 + positive_sum / negative_sum)
//! - negative_sum == 0 and positive_sum > 0: 100
//! - both sums 0 (flat typical price): 50
//!
//! Warmup: first n positions are undefined.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{combine, rolling_sum};
use crate::domain::ohlcv::OhlcvBar;

pub fn calculate_mfi(bars: &[OhlcvBar], period: usize) -> Values {
    let n = bars.len();
    let mut positive: Values = vec![None; n];
    let mut negative: Values = vec![None; n];

    for i in 1..n {
        let Some(volume) = bars[i].volume.filter(|v| v.is_finite()) else {
            continue;
        };
        let tp = bars[i].typical_price();
        let prev_tp = bars[i - 1].typical_price();
        let flow = tp * volume;
        positive[i] = Some(if tp > prev_tp { flow } else { 0.0 });
        negative[i] = Some(if tp < prev_tp { flow } else { 0.0 });
    }

    let pos_sum = rolling_sum(&positive, period);
    let neg_sum = rolling_sum(&negative, period);

    combine(&pos_sum, &neg_sum, |p, q| {
        Some(if q == 0.0 {
            if p == 0.0 { 50.0 } else { 100.0 }
        } else {
            100.0 - 100.0 / (1.0 + p / q)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{make_bars, make_ohlcv_bars};
    use approx::assert_relative_eq;

    #[test]
    fn mfi_warmup() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + (i % 4) as f64).collect();
        let out = calculate_mfi(&make_bars(&closes), 14);
        assert!(out[..14].iter().all(Option::is_none));
        assert!(out[14].is_some());
    }

    #[test]
    fn mfi_known_value() {
        let bars = make_ohlcv_bars(&[
            (10.0, 10.0, 10.0, 10.0, 100.0),
            (12.0, 12.0, 12.0, 12.0, 100.0),
            (11.0, 11.0, 11.0, 11.0, 200.0),
        ]);
        let out = calculate_mfi(&bars, 2);
        // positive 1200, negative 2200
        assert_relative_eq!(out[2].unwrap(), 100.0 - 100.0 / (1.0 + 1200.0 / 2200.0), epsilon = 1e-12);
    }

    #[test]
    fn mfi_rising_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 10.0 + i as f64).collect();
        let out = calculate_mfi(&make_bars(&closes), 14);
        assert_relative_eq!(out[19].unwrap(), 100.0);
    }

    #[test]
    fn mfi_flat_is_50() {
        let out = calculate_mfi(&make_bars(&[10.0; 20]), 14);
        assert_relative_eq!(out[19].unwrap(), 50.0);
    }
}
