//! Rolling distribution statistics of close.
//!
//! - std: population standard deviation (divides by N)
//! - skew: bias-corrected sample skewness G1
//! - kurt: bias-corrected sample excess kurtosis G2
//! - zscore: (close - rolling mean) / rolling std
//!
//! Skew, kurtosis and z-score are undefined when the window variance is 0.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{combine, mean, rolling, rolling_mean, rolling_std};

pub fn calculate_rolling_std(close: &[Option<f64>], period: usize) -> Values {
    rolling_std(close, period)
}

pub fn calculate_rolling_skew(close: &[Option<f64>], period: usize) -> Values {
    rolling(close, period, period.max(3), skewness)
}

pub fn calculate_rolling_kurt(close: &[Option<f64>], period: usize) -> Values {
    rolling(close, period, period.max(4), kurtosis)
}

pub fn calculate_rolling_zscore(close: &[Option<f64>], period: usize) -> Values {
    let avg = rolling_mean(close, period);
    let std = rolling_std(close, period);
    let centered = combine(close, &avg, |c, m| Some(c - m));
    combine(&centered, &std, |d, s| if s == 0.0 { None } else { Some(d / s) })
}

/// Central moments m2, m3, m4 (divided by N).
fn moments(xs: &[f64]) -> Option<(f64, f64, f64)> {
    let m = mean(xs)?;
    let n = xs.len() as f64;
    let (mut m2, mut m3, mut m4) = (0.0, 0.0, 0.0);
    for x in xs {
        let d = x - m;
        let d2 = d * d;
        m2 += d2;
        m3 += d2 * d;
        m4 += d2 * d2;
    }
    Some((m2 / n, m3 / n, m4 / n))
}

/// Variances this small relative to the data are rounding noise around a flat window.
fn is_degenerate(m2: f64, xs: &[f64]) -> bool {
    let scale = xs.iter().fold(0.0_f64, |acc, x| acc.max(x.abs())).max(1.0);
    m2 <= (scale * 1e-14).powi(2)
}

pub fn skewness(xs: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    if xs.len() < 3 {
        return None;
    }
    let (m2, m3, _) = moments(xs)?;
    if is_degenerate(m2, xs) {
        return None;
    }
    let g1 = m3 / m2.powf(1.5);
    Some((n * (n - 1.0)).sqrt() / (n - 2.0) * g1)
}

pub fn kurtosis(xs: &[f64]) -> Option<f64> {
    let n = xs.len() as f64;
    if xs.len() < 4 {
        return None;
    }
    let (m2, _, m4) = moments(xs)?;
    if is_degenerate(m2, xs) {
        return None;
    }
    let g2 = m4 / (m2 * m2) - 3.0;
    Some((n - 1.0) / ((n - 2.0) * (n - 3.0)) * ((n + 1.0) * g2 + 6.0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::to_values;
    use approx::assert_relative_eq;

    #[test]
    fn symmetric_window_has_zero_skew() {
        assert_relative_eq!(skewness(&[1.0, 2.0, 3.0, 4.0, 5.0]).unwrap(), 0.0, epsilon = 1e-12);
    }

    #[test]
    fn skew_known_value() {
        // m2 = 12.5, m3 = 45
        assert_relative_eq!(skewness(&[1.0, 2.0, 3.0, 10.0]).unwrap(), 1.7636315, epsilon = 1e-6);
    }

    #[test]
    fn kurt_known_value() {
        // m2 = 12.5, m4 = 348.5
        assert_relative_eq!(kurtosis(&[1.0, 2.0, 3.0, 10.0]).unwrap(), 3.228, epsilon = 1e-9);
    }

    #[test]
    fn uniform_kurtosis_is_negative() {
        let k = kurtosis(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0]).unwrap();
        assert_relative_eq!(k, -1.2, epsilon = 1e-12);
    }

    #[test]
    fn flat_window_is_undefined() {
        let close = to_values(&[7.0; 12]);
        assert!(calculate_rolling_skew(&close, 10).iter().all(Option::is_none));
        assert!(calculate_rolling_kurt(&close, 10).iter().all(Option::is_none));
        assert!(calculate_rolling_zscore(&close, 10).iter().all(Option::is_none));
        assert_relative_eq!(calculate_rolling_std(&close, 10)[11].unwrap(), 0.0);
    }

    #[test]
    fn zscore_of_last_point() {
        let close = to_values(&[1.0, 2.0, 3.0]);
        let z = calculate_rolling_zscore(&close, 3);
        // mean 2, population std sqrt(2/3)
        assert_relative_eq!(z[2].unwrap(), 1.0 / (2.0_f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn warmup_matches_window() {
        let close = to_values(&(0..12).map(|i| (i * i) as f64).collect::<Vec<_>>());
        let skew = calculate_rolling_skew(&close, 10);
        assert_eq!(skew[8], None);
        assert!(skew[9].is_some());
    }
}
