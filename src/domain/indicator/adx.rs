//! ADX: Average Directional Index (Wilder).
//!
//! 1. +DM / -DM from consecutive highs and lows
//! 2. Wilder-smooth TR, +DM and -DM (SMA seed, then (prev·(n-1) + x)/n)
//! 3. ±DI = 100 · smoothed(±DM) / smoothed(TR), undefined when smoothed TR is 0
//! 4. DX = 100 · |+DI − −DI| / (+DI + −DI), 0 when both DI are 0
//! 5. ADX = Wilder-smoothed DX
//!
//! DI appears at position n, ADX at position 2n − 1.

use crate::domain::indicator::{finite, Values};
use crate::domain::indicator_helpers::{combine, wilder};
use crate::domain::ohlcv::OhlcvBar;

pub struct AdxColumns {
    pub adx: Values,
    pub plus_di: Values,
    pub minus_di: Values,
}

pub fn calculate_adx(bars: &[OhlcvBar], period: usize) -> AdxColumns {
    let n = bars.len();
    let mut plus_dm: Values = vec![None; n];
    let mut minus_dm: Values = vec![None; n];
    let mut tr: Values = vec![None; n];

    for i in 1..n {
        let up = bars[i].high - bars[i - 1].high;
        let down = bars[i - 1].low - bars[i].low;
        plus_dm[i] = finite(if up > down && up > 0.0 { up } else { 0.0 });
        minus_dm[i] = finite(if down > up && down > 0.0 { down } else { 0.0 });
        tr[i] = finite(bars[i].true_range(bars[i - 1].close));
    }

    let smooth_tr = wilder(&tr, period);
    let smooth_plus = wilder(&plus_dm, period);
    let smooth_minus = wilder(&minus_dm, period);

    let di = |dm: &Values| {
        combine(dm, &smooth_tr, |d, t| if t == 0.0 { None } else { Some(100.0 * d / t) })
    };
    let plus_di = di(&smooth_plus);
    let minus_di = di(&smooth_minus);

    let dx = combine(&plus_di, &minus_di, |p, m| {
        let sum = p + m;
        Some(if sum == 0.0 { 0.0 } else { 100.0 * (p - m).abs() / sum })
    });
    let adx = wilder(&dx, period);

    AdxColumns {
        adx,
        plus_di,
        minus_di,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_bars::{make_bars, make_ranged_bars};
    use approx::assert_relative_eq;

    #[test]
    fn adx_warmup() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64).collect();
        let cols = calculate_adx(&make_ranged_bars(&closes, 1.0), 14);
        assert_eq!(cols.plus_di[13], None);
        assert!(cols.plus_di[14].is_some());
        assert_eq!(cols.adx[26], None);
        assert!(cols.adx[27].is_some());
    }

    #[test]
    fn steady_uptrend_is_strong() {
        let closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64 * 2.0).collect();
        let cols = calculate_adx(&make_ranged_bars(&closes, 1.0), 14);
        let last = 59;
        assert!(cols.plus_di[last].unwrap() > cols.minus_di[last].unwrap());
        assert_relative_eq!(cols.minus_di[last].unwrap(), 0.0);
        assert!(cols.adx[last].unwrap() > 25.0);
    }

    #[test]
    fn values_are_bounded() {
        let closes: Vec<f64> = (0..80).map(|i| 50.0 + (i as f64 * 0.4).sin() * 8.0).collect();
        let cols = calculate_adx(&make_ranged_bars(&closes, 0.5), 14);
        for v in cols.adx.iter().chain(&cols.plus_di).chain(&cols.minus_di).flatten() {
            assert!((0.0..=100.0 + 1e-9).contains(v));
        }
    }

    #[test]
    fn flat_series_is_undefined() {
        let cols = calculate_adx(&make_bars(&[100.0; 40]), 14);
        assert!(cols.plus_di.iter().all(Option::is_none));
        assert!(cols.adx.iter().all(Option::is_none));
    }

    #[test]
    fn single_bar() {
        let cols = calculate_adx(&make_bars(&[1.0]), 14);
        assert_eq!(cols.adx, vec![None]);
    }
}
