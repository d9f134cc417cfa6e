//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing for average gain/loss:
//! - First average: simple mean of the first n gains/losses
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! RSI = 100 - 100 / (1 + avg_gain / avg_loss)
//! - avg_loss == 0 and avg_gain > 0: 100
//! - avg_loss == 0 and avg_gain == 0 (flat series): 50
//!
//! Warmup: first n positions are undefined (n price changes are needed).

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{combine, shift, wilder};

pub fn calculate_rsi(close: &[Option<f64>], period: usize) -> Values {
    let change = combine(close, &shift(close, 1), |c, p| Some(c - p));
    let gains: Values = change.iter().map(|c| c.map(|x| x.max(0.0))).collect();
    let losses: Values = change.iter().map(|c| c.map(|x| (-x).max(0.0))).collect();

    let avg_gain = wilder(&gains, period);
    let avg_loss = wilder(&losses, period);

    combine(&avg_gain, &avg_loss, |g, l| {
        Some(if l == 0.0 {
            if g == 0.0 { 50.0 } else { 100.0 }
        } else {
            100.0 - 100.0 / (1.0 + g / l)
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator_helpers::to_values;
    use approx::assert_relative_eq;

    #[test]
    fn rsi_warmup() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + (i % 3) as f64).collect();
        let out = calculate_rsi(&to_values(&closes), 14);
        assert!(out[..14].iter().all(Option::is_none));
        assert!(out[14..].iter().all(Option::is_some));
    }

    #[test]
    fn rsi_all_gains_is_100() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = calculate_rsi(&to_values(&closes), 14);
        assert_relative_eq!(out[19].unwrap(), 100.0);
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let closes: Vec<f64> = (0..20).map(|i| 100.0 - i as f64).collect();
        let out = calculate_rsi(&to_values(&closes), 14);
        assert_relative_eq!(out[19].unwrap(), 0.0);
    }

    #[test]
    fn rsi_flat_series_is_50() {
        let out = calculate_rsi(&to_values(&[100.0; 30]), 14);
        assert_eq!(out[13], None);
        for v in &out[14..] {
            assert_relative_eq!(v.unwrap(), 50.0);
        }
    }

    #[test]
    fn rsi_known_values() {
        // period 2: changes +2, -1, +1
        let out = calculate_rsi(&to_values(&[10.0, 12.0, 11.0, 12.0]), 2);
        // seed: gain 1.0, loss 0.5 → rs 2 → 66.67
        assert_relative_eq!(out[2].unwrap(), 100.0 - 100.0 / 3.0, epsilon = 1e-12);
        // gain (1·1 + 1)/2 = 1, loss (0.5 + 0)/2 = 0.25 → rs 4 → 80
        assert_relative_eq!(out[3].unwrap(), 80.0, epsilon = 1e-12);
    }

    #[test]
    fn rsi_short_series() {
        let out = calculate_rsi(&to_values(&[1.0]), 14);
        assert_eq!(out, vec![None]);
    }
}
