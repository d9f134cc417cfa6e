//! Historical price access port trait.

use std::fmt;
use std::str::FromStr;

use crate::domain::error::StockcastError;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::OhlcvBar;

/// Bars returned by a `Compact` fetch.
pub const COMPACT_BARS: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputSize {
    /// Trailing `COMPACT_BARS` bars only.
    Compact,
    #[default]
    Full,
}

impl fmt::Display for OutputSize {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            OutputSize::Compact => "compact",
            OutputSize::Full => "full",
        })
    }
}

impl FromStr for OutputSize {
    type Err = StockcastError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "compact" => Ok(OutputSize::Compact),
            "full" => Ok(OutputSize::Full),
            other => Err(StockcastError::invalid(format!(
                "unknown output size '{other}' (expected compact or full)"
            ))),
        }
    }
}

/// Source of OHLCV history for a symbol.
///
/// Implementations return bars ascending by date with no duplicate dates.
/// An unknown symbol is `Ok(vec![])`; `Err` is reserved for a provider that
/// could not answer at all.
pub trait HistoryPort {
    fn fetch(
        &self,
        symbol: &str,
        frequency: Frequency,
        size: OutputSize,
    ) -> Result<Vec<OhlcvBar>, StockcastError>;
}
