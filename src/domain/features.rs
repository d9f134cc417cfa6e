//! Feature assembler: indicators plus fundamentals and market index, filtered
//! for data sufficiency.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::frame::Frame;
use crate::domain::indicator::engine::compute_indicators_with_index;
use crate::domain::indicator::{finite, ColumnId, Values};
use crate::domain::ohlcv::OhlcvBar;

/// Rows with a larger share of undefined fields are dropped.
pub const MAX_UNDEFINED_FRACTION: f64 = 0.8;

/// The filtered feature table. Its index is a subsequence of the input series.
pub type FeatureMatrix = Frame;

/// Per-symbol scalar ratios, broadcast to every row. Any field may be unknown.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Fundamentals {
    pub eps: Option<f64>,
    pub pe: Option<f64>,
    pub peg: Option<f64>,
    pub pb: Option<f64>,
}

impl Fundamentals {
    pub fn is_empty(&self) -> bool {
        self.eps.is_none() && self.pe.is_none() && self.peg.is_none() && self.pb.is_none()
    }

    fn columns(&self) -> [(ColumnId, Option<f64>); 4] {
        [
            (ColumnId::FEps, self.eps.and_then(finite)),
            (ColumnId::FPe, self.pe.and_then(finite)),
            (ColumnId::FPeg, self.peg.and_then(finite)),
            (ColumnId::FPb, self.pb.and_then(finite)),
        ]
    }
}

/// Reindex an external series' closes onto `bars` by exact date match.
/// Dates the index lacks stay undefined; nothing is resampled or filled.
pub fn align_by_date(bars: &[OhlcvBar], index: &[OhlcvBar]) -> Values {
    let by_date: HashMap<_, _> = index.iter().map(|b| (b.date, b.close)).collect();
    bars.iter()
        .map(|b| by_date.get(&b.date).copied().and_then(finite))
        .collect()
}

/// Build the feature matrix for `bars`.
///
/// Fundamentals, when supplied, add the four `f_*` columns even if every
/// ratio is unknown. The market index must already be aligned to `bars`
/// (see [`align_by_date`]).
pub fn assemble(
    bars: &[OhlcvBar],
    fundamentals: Option<&Fundamentals>,
    market_index: Option<&[Option<f64>]>,
) -> FeatureMatrix {
    let mut frame = compute_indicators_with_index(bars, market_index);
    if let Some(f) = fundamentals {
        for (id, value) in f.columns() {
            frame.broadcast(id, value);
        }
    }
    filter_sufficient(&frame)
}

/// Two-stage filter: drop rows missing an OHLC field, then rows that are
/// mostly undefined. Indicator warm-up gaps alone never trip the second stage.
pub fn filter_sufficient(frame: &Frame) -> FeatureMatrix {
    let structural = frame.filter_rows(|r| {
        ColumnId::PRICE
            .iter()
            .filter(|id| frame.has_column(**id))
            .all(|id| frame.value(*id, r).is_some())
    });
    let kept = structural.filter_rows(|r| structural.undefined_fraction(r) <= MAX_UNDEFINED_FRACTION);

    debug!(
        input = frame.len(),
        after_price_filter = structural.len(),
        kept = kept.len(),
        "assembled feature matrix"
    );
    kept
}
