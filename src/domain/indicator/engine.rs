//! Indicator engine: bars in, enriched frame out.
//!
//! Every indicator column is always present (undefined where its window is not
//! yet full), so the column set only depends on whether a market index was
//! joined. Short series never error.

use tracing::debug;

use crate::domain::frame::Frame;
use crate::domain::indicator::adx::calculate_adx;
use crate::domain::indicator::atr::{calculate_atr, calculate_true_range};
use crate::domain::indicator::bollinger::calculate_bollinger;
use crate::domain::indicator::candle::calculate_candles;
use crate::domain::indicator::correlation::calculate_rolling_corr;
use crate::domain::indicator::ema::calculate_ema;
use crate::domain::indicator::levels::calculate_levels;
use crate::domain::indicator::macd::calculate_macd;
use crate::domain::indicator::mfi::calculate_mfi;
use crate::domain::indicator::obv::calculate_obv;
use crate::domain::indicator::price_action::{calculate_lag, calculate_price_action, calculate_return};
use crate::domain::indicator::rsi::calculate_rsi;
use crate::domain::indicator::sma::calculate_sma;
use crate::domain::indicator::stats::{
    calculate_rolling_kurt, calculate_rolling_skew, calculate_rolling_std, calculate_rolling_zscore,
};
use crate::domain::indicator::stochastic::calculate_stochastic;
use crate::domain::indicator::volume::{calculate_volume, volume_column};
use crate::domain::indicator::{ColumnId, Values};
use crate::domain::indicator_helpers::{flag, to_values};
use crate::domain::ohlcv::OhlcvBar;

/// ADX level at or above which the regime flag marks a trending market.
pub const REGIME_ADX_THRESHOLD: f64 = 25.0;

pub fn compute_indicators(bars: &[OhlcvBar]) -> Frame {
    compute_indicators_with_index(bars, None)
}

/// Compute every indicator column. `market_index`, when given, must already be
/// aligned to `bars` by date; it becomes the `market_index` column and feeds
/// `corr_with_index_20`.
pub fn compute_indicators_with_index(bars: &[OhlcvBar], market_index: Option<&[Option<f64>]>) -> Frame {
    let mut frame = Frame::new(bars.iter().map(|b| b.date).collect());

    let field = |f: fn(&OhlcvBar) -> f64| to_values(&bars.iter().map(f).collect::<Vec<_>>());
    let close = field(|b| b.close);
    let volume = volume_column(bars);

    frame.insert(ColumnId::Open, field(|b| b.open));
    frame.insert(ColumnId::High, field(|b| b.high));
    frame.insert(ColumnId::Low, field(|b| b.low));
    frame.insert(ColumnId::Close, close.clone());
    frame.insert(ColumnId::Volume, volume.clone());
    if let Some(index) = market_index {
        frame.insert(ColumnId::MarketIndex, index.to_vec());
    }

    // Trend and momentum
    for (id, period) in [
        (ColumnId::Sma5, 5),
        (ColumnId::Sma10, 10),
        (ColumnId::Sma20, 20),
        (ColumnId::Sma50, 50),
    ] {
        frame.insert(id, calculate_sma(&close, period));
    }
    for (id, span) in [
        (ColumnId::Ema12, 12),
        (ColumnId::Ema20, 20),
        (ColumnId::Ema26, 26),
        (ColumnId::Ema50, 50),
    ] {
        frame.insert(id, calculate_ema(&close, span));
    }

    let macd = calculate_macd(&close, 12, 26, 9);
    frame.insert(ColumnId::Macd, macd.macd);
    frame.insert(ColumnId::MacdSignal, macd.signal);
    frame.insert(ColumnId::MacdHist, macd.hist);

    frame.insert(ColumnId::Rsi14, calculate_rsi(&close, 14));

    let stoch = calculate_stochastic(bars, 14, 3);
    frame.insert(ColumnId::StochK14, stoch.k);
    frame.insert(ColumnId::StochD3, stoch.d);

    let adx = calculate_adx(bars, 14);
    let regime = regime_flag(&adx.adx);
    frame.insert(ColumnId::Adx14, adx.adx);
    frame.insert(ColumnId::PlusDi14, adx.plus_di);
    frame.insert(ColumnId::MinusDi14, adx.minus_di);
    frame.insert(ColumnId::RegimeTrend, regime);

    // Volatility
    let tr = calculate_true_range(bars);
    frame.insert(ColumnId::Atr14, calculate_atr(&tr, 14));
    frame.insert(ColumnId::Tr, tr);

    let bb = calculate_bollinger(&close, 20, 2.0);
    frame.insert(ColumnId::BbMid, bb.mid);
    frame.insert(ColumnId::BbUpper, bb.upper);
    frame.insert(ColumnId::BbLower, bb.lower);
    frame.insert(ColumnId::BbWidth, bb.width);

    // Volume
    let vol = calculate_volume(&volume, 20);
    frame.insert(ColumnId::VolSma20, vol.vol_sma);
    frame.insert(ColumnId::VolSpike, vol.spike.clone());
    frame.insert(ColumnId::VolumeSpike, vol.spike);
    frame.insert(ColumnId::Obv, calculate_obv(bars));
    frame.insert(ColumnId::Mfi14, calculate_mfi(bars, 14));

    // Levels
    let levels = calculate_levels(&close, 20);
    frame.insert(ColumnId::Support20, levels.support);
    frame.insert(ColumnId::Resistance20, levels.resistance);
    frame.insert(ColumnId::Breakout, levels.breakout);
    frame.insert(ColumnId::Breakdown, levels.breakdown);

    // Price action
    for (id, lag) in [
        (ColumnId::CloseLag1, 1),
        (ColumnId::CloseLag3, 3),
        (ColumnId::CloseLag5, 5),
        (ColumnId::CloseLag10, 10),
    ] {
        frame.insert(id, calculate_lag(&close, lag));
    }
    let ret_1 = calculate_return(&close, 1);
    frame.insert(ColumnId::Ret5, calculate_return(&close, 5));

    let action = calculate_price_action(bars);
    frame.insert(ColumnId::HlPct, action.hl_pct);
    frame.insert(ColumnId::CoPct, action.co_pct);
    frame.insert(ColumnId::CpPct, action.cp_pct);

    // Rolling statistics
    frame.insert(ColumnId::RollingStd10, calculate_rolling_std(&close, 10));
    frame.insert(ColumnId::RollingStd20, calculate_rolling_std(&close, 20));
    frame.insert(ColumnId::RollingSkew10, calculate_rolling_skew(&close, 10));
    frame.insert(ColumnId::RollingKurt10, calculate_rolling_kurt(&close, 10));
    frame.insert(ColumnId::RollingZscore10, calculate_rolling_zscore(&close, 10));

    // Candles
    let candles = calculate_candles(bars);
    frame.insert(ColumnId::Doji, candles.doji);
    frame.insert(ColumnId::BullEngulf, candles.bull_engulf);
    frame.insert(ColumnId::BearEngulf, candles.bear_engulf);

    // Cross-series
    let corr = match market_index {
        Some(index) => calculate_rolling_corr(&ret_1, &calculate_return(index, 1), 20),
        None => vec![None; bars.len()],
    };
    frame.insert(ColumnId::CorrWithIndex20, corr);
    frame.insert(ColumnId::Ret1, ret_1);

    debug!(
        rows = frame.len(),
        with_index = market_index.is_some(),
        "computed indicators"
    );
    frame
}

fn regime_flag(adx: &Values) -> Values {
    flag(adx.len(), |i| adx[i].is_some_and(|v| v >= REGIME_ADX_THRESHOLD))
}
