//! Technical indicator implementations.
//!
//! Every indicator is a pure function from bars (or an already computed column)
//! to a same-length [`Values`] buffer, with `None` marking positions whose
//! trailing window is not yet full or whose formula is undefined. A value at
//! position `i` only ever depends on positions `<= i`.
//!
//! Column identifiers are a wire-level contract: [`ColumnId::name`] is what the
//! feature assembler, the forecast engine and API consumers see.

pub mod adx;
pub mod atr;
pub mod bollinger;
pub mod candle;
pub mod correlation;
pub mod ema;
pub mod engine;
pub mod levels;
pub mod macd;
pub mod mfi;
pub mod obv;
pub mod price_action;
pub mod rsi;
pub mod sma;
pub mod stats;
pub mod stochastic;
pub mod volume;

use std::fmt;
use std::str::FromStr;

use crate::domain::error::StockcastError;

/// A nullable numeric column.
pub type Values = Vec<Option<f64>>;

/// Keep finite results, map NaN/inf to undefined.
pub fn finite(x: f64) -> Option<f64> {
    if x.is_finite() { Some(x) } else { None }
}

macro_rules! columns {
    ($($variant:ident => $name:literal),+ $(,)?) => {
        /// Ordering follows declaration order, which is the canonical column order.
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub enum ColumnId {
            $($variant),+
        }

        impl ColumnId {
            pub const ALL: &'static [ColumnId] = &[$(ColumnId::$variant),+];

            pub fn name(self) -> &'static str {
                match self {
                    $(ColumnId::$variant => $name),+
                }
            }
        }

        impl FromStr for ColumnId {
            type Err = StockcastError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($name => Ok(ColumnId::$variant),)+
                    other => Err(StockcastError::invalid(format!("unknown column '{other}'"))),
                }
            }
        }
    };
}

columns! {
    Open => "open",
    High => "high",
    Low => "low",
    Close => "close",
    Volume => "volume",
    MarketIndex => "market_index",
    Sma5 => "sma_5",
    Sma10 => "sma_10",
    Sma20 => "sma_20",
    Sma50 => "sma_50",
    Ema12 => "ema_12",
    Ema20 => "ema_20",
    Ema26 => "ema_26",
    Ema50 => "ema_50",
    Macd => "macd",
    MacdSignal => "macd_signal",
    MacdHist => "macd_hist",
    Rsi14 => "rsi_14",
    StochK14 => "stoch_k_14",
    StochD3 => "stoch_d_3",
    Adx14 => "adx_14",
    PlusDi14 => "plus_di_14",
    MinusDi14 => "minus_di_14",
    Tr => "tr",
    Atr14 => "atr_14",
    BbMid => "bb_mid",
    BbUpper => "bb_upper",
    BbLower => "bb_lower",
    BbWidth => "bb_width",
    VolSma20 => "vol_sma_20",
    VolSpike => "vol_spike",
    VolumeSpike => "volume_spike",
    Obv => "obv",
    Mfi14 => "mfi_14",
    Support20 => "support_20",
    Resistance20 => "resistance_20",
    Breakout => "breakout",
    Breakdown => "breakdown",
    CloseLag1 => "close_lag_1",
    CloseLag3 => "close_lag_3",
    CloseLag5 => "close_lag_5",
    CloseLag10 => "close_lag_10",
    Ret1 => "ret_1",
    Ret5 => "ret_5",
    HlPct => "hl_pct",
    CoPct => "co_pct",
    CpPct => "cp_pct",
    RollingStd10 => "rolling_std_10",
    RollingStd20 => "rolling_std_20",
    RollingSkew10 => "rolling_skew_10",
    RollingKurt10 => "rolling_kurt_10",
    RollingZscore10 => "rolling_zscore_10",
    Doji => "doji",
    BullEngulf => "bull_engulf",
    BearEngulf => "bear_engulf",
    CorrWithIndex20 => "corr_with_index_20",
    RegimeTrend => "regime_trend",
    FEps => "f_eps",
    FPe => "f_pe",
    FPeg => "f_peg",
    FPb => "f_pb",
}

impl ColumnId {
    /// Raw OHLC fields; a row missing any of these is structurally broken.
    pub const PRICE: &'static [ColumnId] =
        &[ColumnId::Open, ColumnId::High, ColumnId::Low, ColumnId::Close];

    pub const FUNDAMENTALS: &'static [ColumnId] =
        &[ColumnId::FEps, ColumnId::FPe, ColumnId::FPeg, ColumnId::FPb];

    pub fn is_fundamental(self) -> bool {
        Self::FUNDAMENTALS.contains(&self)
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn column_names_are_unique() {
        let names: HashSet<_> = ColumnId::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), ColumnId::ALL.len());
    }

    #[test]
    fn column_name_round_trips_through_from_str() {
        for &col in ColumnId::ALL {
            assert_eq!(col.name().parse::<ColumnId>().unwrap(), col);
        }
        assert!("sma_21".parse::<ColumnId>().is_err());
    }

    #[test]
    fn display_uses_wire_name() {
        assert_eq!(ColumnId::Sma20.to_string(), "sma_20");
        assert_eq!(ColumnId::Rsi14.to_string(), "rsi_14");
        assert_eq!(ColumnId::CorrWithIndex20.to_string(), "corr_with_index_20");
    }

    #[test]
    fn finite_filters_nan_and_infinity() {
        assert_eq!(finite(1.5), Some(1.5));
        assert_eq!(finite(f64::NAN), None);
        assert_eq!(finite(f64::INFINITY), None);
    }
}
