//! Rolling Pearson correlation between two aligned columns.

use crate::domain::indicator::{finite, Values};

/// Correlation over each trailing window of `period` positions, using only
/// positions where both inputs are defined. Needs `period` such pairs and is
/// undefined when either side has zero variance.
pub fn calculate_rolling_corr(a: &[Option<f64>], b: &[Option<f64>], period: usize) -> Values {
    let n = a.len().min(b.len());
    let mut out = vec![None; a.len()];
    if period == 0 {
        return out;
    }

    let mut pairs: Vec<(f64, f64)> = Vec::with_capacity(period);
    for i in 0..n {
        let start = (i + 1).saturating_sub(period);
        pairs.clear();
        pairs.extend((start..=i).filter_map(|j| Some((a[j]?, b[j]?))));
        if pairs.len() < period.max(2) {
            continue;
        }
        out[i] = pearson(&pairs);
    }
    out
}

fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|p| p.0).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|p| p.1).sum::<f64>() / n;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for &(x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx == 0.0 || syy == 0.0 {
        return None;
    }
    finite((sxy / (sxx * syy).sqrt()).clamp(-1.0, 1.0))
}
