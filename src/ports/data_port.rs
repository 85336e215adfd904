//! Data access port trait.

use crate::domain::error::MarketLensError;
use crate::domain::fundamental::FinancialFacts;
use crate::domain::ohlcv::PricePoint;

pub trait DataPort {
    /// Full daily history for `code`, oldest first.
    fn fetch_price_history(&self, code: &str) -> Result<Vec<PricePoint>, MarketLensError>;

    fn list_symbols(&self) -> Result<Vec<String>, MarketLensError>;

    /// `Ok(None)` when nothing is known about the instrument's financials.
    fn fetch_financials(&self, code: &str) -> Result<Option<FinancialFacts>, MarketLensError>;
}
