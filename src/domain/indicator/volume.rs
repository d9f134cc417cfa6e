//! Volume average and spike ratio.
//!
//! vol_sma = SMA(n) of volume (full window)
//! spike   = volume / vol_sma, undefined when the average is 0 or volume is absent

use crate::domain::indicator::Values;
use crate::domain::indicator_helpers::{combine, rolling_mean};
use crate::domain::ohlcv::OhlcvBar;

pub struct VolumeColumns {
    pub vol_sma: Values,
    pub spike: Values,
}

/// Volume as a nullable column; non-finite volumes are treated as absent.
pub fn volume_column(bars: &[OhlcvBar]) -> Values {
    bars.iter()
        .map(|b| b.volume.filter(|v| v.is_finite()))
        .collect()
}

pub fn calculate_volume(volume: &[Option<f64>], period: usize) -> VolumeColumns {
    let vol_sma = rolling_mean(volume, period);
    let spike = combine(volume, &vol_sma, |v, avg| if avg == 0.0 { None } else { Some(v / avg) });
    VolumeColumns { vol_sma, spike }
}
