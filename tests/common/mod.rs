#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use std::cell::RefCell;
use std::collections::HashMap;
use stockcast::domain::error::StockcastError;
use stockcast::domain::features::Fundamentals;
use stockcast::domain::frequency::Frequency;
pub use stockcast::domain::ohlcv::OhlcvBar;
use stockcast::domain::service::Providers;
use stockcast::ports::fundamentals_port::FundamentalsPort;
use stockcast::ports::history_port::{HistoryPort, OutputSize};

pub struct MockHistoryPort {
    pub data: HashMap<(String, Frequency), Vec<OhlcvBar>>,
    pub errors: HashMap<String, String>,
    pub calls: RefCell<Vec<(String, Frequency)>>,
}

impl MockHistoryPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
            calls: RefCell::new(Vec::new()),
        }
    }

    pub fn with_bars(mut self, symbol: &str, frequency: Frequency, bars: Vec<OhlcvBar>) -> Self {
        self.data.insert((symbol.to_string(), frequency), bars);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.borrow().len()
    }
}

impl HistoryPort for MockHistoryPort {
    fn fetch(
        &self,
        symbol: &str,
        frequency: Frequency,
        _size: OutputSize,
    ) -> Result<Vec<OhlcvBar>, StockcastError> {
        self.calls.borrow_mut().push((symbol.to_string(), frequency));
        if let Some(reason) = self.errors.get(symbol) {
            return Err(StockcastError::ProviderUnavailable {
                provider: "mock".into(),
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(&(symbol.to_string(), frequency))
            .cloned()
            .unwrap_or_default())
    }
}

pub struct MockFundamentalsPort {
    pub data: HashMap<String, Fundamentals>,
    pub failing: bool,
}

impl MockFundamentalsPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            failing: false,
        }
    }

    pub fn failing() -> Self {
        Self {
            data: HashMap::new(),
            failing: true,
        }
    }

    pub fn with(mut self, symbol: &str, fundamentals: Fundamentals) -> Self {
        self.data.insert(symbol.to_string(), fundamentals);
        self
    }
}

impl FundamentalsPort for MockFundamentalsPort {
    fn fetch(&self, symbol: &str) -> Result<Fundamentals, StockcastError> {
        if self.failing {
            return Err(StockcastError::ProviderUnavailable {
                provider: "mock".into(),
                reason: "no api key".into(),
            });
        }
        Ok(self.data.get(symbol).copied().unwrap_or_default())
    }
}

pub fn providers<'a>(history: &'a MockHistoryPort, fundamentals: &'a MockFundamentalsPort) -> Providers<'a> {
    Providers {
        history,
        fundamentals,
        output_size: OutputSize::Full,
    }
}

pub fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

pub fn start_date() -> NaiveDate {
    date("2024-01-01")
}

/// Bars with open = high = low = close and a fixed volume.
pub fn flat_bars(closes: &[f64]) -> Vec<OhlcvBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| OhlcvBar::flat(start_date() + Duration::days(i as i64), c, Some(1_000.0)))
        .collect()
}

/// A trending, oscillating series with a non-degenerate range and volume.
pub fn wave_bars(n: usize) -> Vec<OhlcvBar> {
    (0..n)
        .map(|i| {
            let x = i as f64;
            let close = 100.0 + 0.15 * x + 3.0 * (x * 0.35).sin();
            let open = close - 0.5 * (x * 0.9).cos();
            OhlcvBar {
                date: start_date() + Duration::days(i as i64),
                open,
                high: close.max(open) + 1.0,
                low: close.min(open) - 1.0,
                close,
                volume: Some(10_000.0 + 500.0 * (x * 0.5).sin()),
            }
        })
        .collect()
}
