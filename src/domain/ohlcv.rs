//! Daily price observation for one instrument.

use crate::domain::error::MarketLensError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub code: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: i64,
    pub turnover: f64,
    pub transactions: i64,
}

impl PricePoint {
    /// A bar with zero turnover and transaction count, which the engine never reads.
    pub fn new(
        code: &str,
        date: NaiveDate,
        open: f64,
        high: f64,
        low: f64,
        close: f64,
        volume: i64,
    ) -> Self {
        Self {
            code: code.to_string(),
            date,
            open,
            high,
            low,
            close,
            volume,
            turnover: 0.0,
            transactions: 0,
        }
    }

    /// (high + low + close) / 3
    pub fn typical_price(&self) -> f64 {
        (self.high + self.low + self.close) / 3.0
    }

    /// max(high - low, |high - prev_close|, |low - prev_close|)
    pub fn true_range(&self, prev_close: f64) -> f64 {
        let hl = self.high - self.low;
        let hc = (self.high - prev_close).abs();
        let lc = (self.low - prev_close).abs();
        hl.max(hc).max(lc)
    }

    /// Rejects values that would poison the smoothing recurrences downstream.
    pub fn validate(&self, row: usize) -> Result<(), MarketLensError> {
        let malformed = |reason: String| MarketLensError::MalformedInput {
            code: self.code.clone(),
            row,
            reason,
        };

        for (name, value) in [
            ("open", self.open),
            ("high", self.high),
            ("low", self.low),
            ("close", self.close),
        ] {
            if !value.is_finite() {
                return Err(malformed(format!("{name} is not a number")));
            }
            if value <= 0.0 {
                return Err(malformed(format!("{name} must be positive, got {value}")));
            }
        }
        if self.high < self.low {
            return Err(malformed(format!(
                "high {} is below low {}",
                self.high, self.low
            )));
        }
        if self.volume < 0 {
            return Err(malformed(format!("negative volume {}", self.volume)));
        }
        if !self.turnover.is_finite() || self.turnover < 0.0 {
            return Err(malformed(format!("invalid turnover {}", self.turnover)));
        }
        if self.transactions < 0 {
            return Err(malformed(format!(
                "negative transaction count {}",
                self.transactions
            )));
        }
        Ok(())
    }
}

/// Validates every bar and the strictly ascending date order of the history.
pub fn validate_history(bars: &[PricePoint]) -> Result<(), MarketLensError> {
    for (row, bar) in bars.iter().enumerate() {
        bar.validate(row)?;
        if row > 0 && bar.date <= bars[row - 1].date {
            return Err(MarketLensError::MalformedInput {
                code: bar.code.clone(),
                row,
                reason: format!(
                    "date {} does not follow {}",
                    bar.date,
                    bars[row - 1].date
                ),
            });
        }
    }
    Ok(())
}
