//! Shared column transforms for indicator calculations.
//!
//! Each transform maps a nullable column to a same-length column with leading
//! `None` entries for the warm-up period. Rolling windows follow the
//! "min periods" convention: a window produces a value once it holds at least
//! `min_periods` defined observations.

use crate::domain::indicator::{finite, Values};

/// Lift a plain numeric slice into a nullable column.
pub fn to_values(raw: &[f64]) -> Values {
    raw.iter().map(|&x| finite(x)).collect()
}

/// Apply `f` to the defined values in each trailing window of `window` positions.
pub fn rolling<F>(values: &[Option<f64>], window: usize, min_periods: usize, f: F) -> Values
where
    F: Fn(&[f64]) -> Option<f64>,
{
    if window == 0 {
        return vec![None; values.len()];
    }
    let min_periods = min_periods.max(1);
    let mut buf: Vec<f64> = Vec::with_capacity(window);

    (0..values.len())
        .map(|i| {
            let start = (i + 1).saturating_sub(window);
            buf.clear();
            buf.extend(values[start..=i].iter().flatten());
            if buf.len() >= min_periods {
                f(&buf).and_then(finite)
            } else {
                None
            }
        })
        .collect()
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// Population standard deviation (divides by N).
pub fn population_std(xs: &[f64]) -> Option<f64> {
    let m = mean(xs)?;
    let var = xs.iter().map(|x| (x - m) * (x - m)).sum::<f64>() / xs.len() as f64;
    Some(var.sqrt())
}

pub fn rolling_mean(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, window, mean)
}

pub fn rolling_sum(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, window, |xs| Some(xs.iter().sum()))
}

pub fn rolling_std(values: &[Option<f64>], window: usize) -> Values {
    rolling(values, window, window, population_std)
}

pub fn rolling_min(values: &[Option<f64>], window: usize, min_periods: usize) -> Values {
    rolling(values, window, min_periods, |xs| {
        xs.iter().copied().reduce(f64::min)
    })
}

pub fn rolling_max(values: &[Option<f64>], window: usize, min_periods: usize) -> Values {
    rolling(values, window, min_periods, |xs| {
        xs.iter().copied().reduce(f64::max)
    })
}

/// Value `periods` positions earlier.
pub fn shift(values: &[Option<f64>], periods: usize) -> Values {
    (0..values.len())
        .map(|i| if i >= periods { values[i - periods] } else { None })
        .collect()
}

/// Element-wise combination; `f` only sees positions where both inputs are defined.
pub fn combine<F>(a: &[Option<f64>], b: &[Option<f64>], f: F) -> Values
where
    F: Fn(f64, f64) -> Option<f64>,
{
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) => f(*x, *y).and_then(finite),
            _ => None,
        })
        .collect()
}

/// Exponentially weighted mean without bias adjustment:
/// `s = alpha·x + (1-alpha)·s_prev`, seeded with the first defined value.
/// Undefined until `min_periods` defined observations have been seen; an
/// undefined input after that carries the previous state.
pub fn ewm(values: &[Option<f64>], alpha: f64, min_periods: usize) -> Values {
    let mut state: Option<f64> = None;
    let mut seen = 0usize;

    values
        .iter()
        .map(|v| {
            if let Some(x) = v {
                state = Some(match state {
                    None => *x,
                    Some(s) => alpha * x + (1.0 - alpha) * s,
                });
                seen += 1;
            }
            if seen >= min_periods.max(1) { state } else { None }
        })
        .collect()
}

/// EMA with smoothing `2/(span+1)`, undefined for the first `span - 1` observations.
pub fn ema_span(values: &[Option<f64>], span: usize) -> Values {
    if span == 0 {
        return vec![None; values.len()];
    }
    ewm(values, 2.0 / (span as f64 + 1.0), span)
}

/// Wilder smoothing: seed with the simple mean of the first `period` defined
/// values, then `avg = (prev·(period-1) + x) / period`.
pub fn wilder(values: &[Option<f64>], period: usize) -> Values {
    let mut out = vec![None; values.len()];
    if period == 0 {
        return out;
    }

    let mut seed_sum = 0.0;
    let mut seed_count = 0usize;
    let mut avg: Option<f64> = None;

    for (i, v) in values.iter().enumerate() {
        let Some(x) = v else { continue };
        match avg {
            None => {
                seed_sum += x;
                seed_count += 1;
                if seed_count == period {
                    avg = Some(seed_sum / period as f64);
                    out[i] = avg;
                }
            }
            Some(prev) => {
                let next = (prev * (period - 1) as f64 + x) / period as f64;
                avg = Some(next);
                out[i] = finite(next);
            }
        }
    }
    out
}

/// Gate a column on a boolean condition: 1.0 where it holds, 0.0 otherwise
/// (including where the inputs are undefined).
pub fn flag<F>(len: usize, cond: F) -> Values
where
    F: Fn(usize) -> bool,
{
    (0..len).map(|i| Some(if cond(i) { 1.0 } else { 0.0 })).collect()
}
