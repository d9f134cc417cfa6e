//! CSV file history and fundamentals adapter.
//!
//! History lives in `{dir}/{SYMBOL}_{frequency}.csv` with a
//! `date,open,high,low,close,volume` header (volume may be blank or absent).
//! Fundamentals live in `{dir}/fundamentals.csv` with a
//! `symbol,eps,pe,peg,pb` header.

use crate::domain::error::StockcastError;
use crate::domain::features::Fundamentals;
use crate::domain::frequency::Frequency;
use crate::domain::ohlcv::{normalize_series, OhlcvBar};
use crate::ports::fundamentals_port::FundamentalsPort;
use crate::ports::history_port::{HistoryPort, OutputSize, COMPACT_BARS};
use chrono::NaiveDate;
use serde::Deserialize;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::debug;

const PROVIDER: &str = "csv";
const FUNDAMENTALS_FILE: &str = "fundamentals.csv";

pub struct CsvAdapter {
    base_path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CsvFundamentals {
    symbol: String,
    #[serde(default)]
    eps: Option<f64>,
    #[serde(default)]
    pe: Option<f64>,
    #[serde(default)]
    peg: Option<f64>,
    #[serde(default)]
    pb: Option<f64>,
}

fn unavailable(reason: String) -> StockcastError {
    StockcastError::ProviderUnavailable {
        provider: PROVIDER.to_string(),
        reason,
    }
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, frequency: Frequency) -> PathBuf {
        self.base_path
            .join(format!("{}_{}.csv", symbol.to_uppercase(), frequency))
    }

    /// File contents, `None` when the file does not exist.
    fn read_optional(path: &Path) -> Result<Option<String>, StockcastError> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(unavailable(format!("failed to read {}: {}", path.display(), e))),
        }
    }
}

impl HistoryPort for CsvAdapter {
    fn fetch(
        &self,
        symbol: &str,
        frequency: Frequency,
        size: OutputSize,
    ) -> Result<Vec<OhlcvBar>, StockcastError> {
        let path = self.csv_path(symbol, frequency);
        let Some(content) = Self::read_optional(&path)? else {
            debug!(path = %path.display(), "no history file");
            return Ok(Vec::new());
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        let mut bars = Vec::new();
        for result in rdr.deserialize::<CsvBar>() {
            let row = result.map_err(|e| {
                unavailable(format!("CSV parse error in {}: {}", path.display(), e))
            })?;
            bars.push(OhlcvBar {
                date: row.date,
                open: row.open,
                high: row.high,
                low: row.low,
                close: row.close,
                volume: row.volume,
            });
        }

        let mut bars = normalize_series(bars);
        if size == OutputSize::Compact && bars.len() > COMPACT_BARS {
            bars.drain(..bars.len() - COMPACT_BARS);
        }
        Ok(bars)
    }
}

impl FundamentalsPort for CsvAdapter {
    fn fetch(&self, symbol: &str) -> Result<Fundamentals, StockcastError> {
        let path = self.base_path.join(FUNDAMENTALS_FILE);
        let Some(content) = Self::read_optional(&path)? else {
            return Ok(Fundamentals::default());
        };

        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(content.as_bytes());
        for result in rdr.deserialize::<CsvFundamentals>() {
            let row = result.map_err(|e| {
                unavailable(format!("CSV parse error in {}: {}", path.display(), e))
            })?;
            if row.symbol.eq_ignore_ascii_case(symbol) {
                return Ok(Fundamentals {
                    eps: row.eps,
                    pe: row.pe,
                    peg: row.peg,
                    pb: row.pb,
                });
            }
        }
        Ok(Fundamentals::default())
    }
}
