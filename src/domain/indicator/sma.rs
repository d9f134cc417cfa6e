//! Simple Moving Average.
//!
//! SMA[i] = mean(x[i-n+1..=i]); the first (n-1) positions are undefined.
//! No partial-window averaging.

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::rolling_mean;

pub fn calculate_sma(values: &[Option<f64>], period: usize) -> Values {
    rolling_mean(values, period)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::to_values;
    use approx::assert_relative_eq;

    #[test]
    fn sma_warmup() {
        let out = calculate_sma(&to_values(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert!(out[2].is_some());
        assert!(out[4].is_some());
    }

    #[test]
    fn sma_values() {
        let out = calculate_sma(&to_values(&[10.0, 20.0, 30.0, 40.0, 50.0]), 3);
        assert_relative_eq!(out[2].unwrap(), 20.0);
        assert_relative_eq!(out[3].unwrap(), 30.0);
        assert_relative_eq!(out[4].unwrap(), 40.0);
    }

    #[test]
    fn sma_longer_than_series() {
        let out = calculate_sma(&to_values(&[1.0, 2.0]), 5);
        assert!(out.iter().all(Option::is_none));
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn sma_empty() {
        assert!(calculate_sma(&[], 3).is_empty());
    }
}
