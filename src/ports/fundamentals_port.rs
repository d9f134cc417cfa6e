//! Fundamentals access port trait.

use crate::domain::error::StockcastError;
use crate::domain::features::Fundamentals;

pub trait FundamentalsPort {
    /// Latest snapshot for `symbol`. Unknown fields are `None`.
    fn fetch(&self, symbol: &str) -> Result<Fundamentals, StockcastError>;
}
