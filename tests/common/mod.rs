#![allow(dead_code)]

use chrono::{Duration, NaiveDate};
use marketlens::domain::error::MarketLensError;
use marketlens::domain::fundamental::FinancialFacts;
pub use marketlens::domain::ohlcv::PricePoint;
use marketlens::ports::data_port::DataPort;
use std::collections::HashMap;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PricePoint>>,
    pub financials: HashMap<String, FinancialFacts>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            financials: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, code: &str, bars: Vec<PricePoint>) -> Self {
        self.data.insert(code.to_string(), bars);
        self
    }

    pub fn with_financials(mut self, code: &str, facts: FinancialFacts) -> Self {
        self.financials.insert(code.to_string(), facts);
        self
    }

    pub fn with_error(mut self, code: &str, reason: &str) -> Self {
        self.errors.insert(code.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_price_history(&self, code: &str) -> Result<Vec<PricePoint>, MarketLensError> {
        if let Some(reason) = self.errors.get(code) {
            return Err(MarketLensError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(code).cloned().unwrap_or_default())
    }

    fn list_symbols(&self) -> Result<Vec<String>, MarketLensError> {
        let mut symbols: Vec<String> = self.data.keys().cloned().collect();
        symbols.sort();
        Ok(symbols)
    }

    fn fetch_financials(&self, code: &str) -> Result<Option<FinancialFacts>, MarketLensError> {
        Ok(self.financials.get(code).cloned())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

pub fn day(i: usize) -> NaiveDate {
    date(2024, 1, 1) + Duration::days(i as i64)
}

/// Bars with high = low = close and volume 1000.
pub fn flat_bars(code: &str, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(code, day(i), c, c, c, c, 1000))
        .collect()
}

/// Bars with a one-point range around each close.
pub fn ranged_bars(code: &str, closes: &[f64]) -> Vec<PricePoint> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &c)| PricePoint::new(code, day(i), c, c + 0.5, c - 0.5, c, 1000))
        .collect()
}

pub fn constant_closes(n: usize, price: f64) -> Vec<f64> {
    vec![price; n]
}

/// `n` closes rising linearly from `from` to `to`.
pub fn rising_closes(n: usize, from: f64, to: f64) -> Vec<f64> {
    let step = (to - from) / (n - 1) as f64;
    (0..n).map(|i| from + step * i as f64).collect()
}

/// 100, 101, 100, 101, ...
pub fn alternating_closes(n: usize) -> Vec<f64> {
    (0..n)
        .map(|i| if i % 2 == 0 { 100.0 } else { 101.0 })
        .collect()
}

/// Scenario with a volume spike on the last of 21 flat days.
pub fn volume_spike_bars(code: &str, last_volume: i64) -> Vec<PricePoint> {
    let mut bars = flat_bars(code, &constant_closes(21, 100.0));
    if let Some(last) = bars.last_mut() {
        last.volume = last_volume;
    }
    bars
}
