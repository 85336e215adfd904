//! CSV file data adapter.
//!
//! Layout under `base_path`:
//! - `{CODE}.csv`: `date,open,high,low,close,volume[,turnover,transactions]`
//! - `{CODE}_quarterly.csv`, `{CODE}_monthly.csv`, `{CODE}_dividends.csv`

use crate::domain::error::MarketLensError;
use crate::domain::fundamental::{Dividend, FinancialFacts, MonthlyRevenue, QuarterlyFinancials};
use crate::domain::ohlcv::PricePoint;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};

const FINANCIAL_SUFFIXES: [&str; 3] = ["_quarterly", "_monthly", "_dividends"];

#[derive(Debug, Deserialize)]
struct PriceRow {
    date: NaiveDate,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: i64,
    #[serde(default)]
    turnover: Option<f64>,
    #[serde(default)]
    transactions: Option<i64>,
}

impl PriceRow {
    fn into_point(self, code: &str) -> PricePoint {
        PricePoint {
            code: code.to_string(),
            date: self.date,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
            turnover: self.turnover.unwrap_or(0.0),
            transactions: self.transactions.unwrap_or(0),
        }
    }
}

pub struct CsvAdapter {
    base_path: PathBuf,
}

impl CsvAdapter {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, code: &str, suffix: &str) -> PathBuf {
        self.base_path.join(format!("{}{}.csv", code, suffix))
    }

    /// Rows of one file; row numbers in errors are 1-based data rows.
    fn read_rows<T: DeserializeOwned>(path: &Path, code: &str) -> Result<Vec<T>, MarketLensError> {
        let mut rdr = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_path(path)
            .map_err(|e| MarketLensError::Data {
                reason: format!("failed to read {}: {}", path.display(), e),
            })?;

        let mut rows = Vec::new();
        for (i, result) in rdr.deserialize().enumerate() {
            let row = result.map_err(|e| MarketLensError::MalformedInput {
                code: code.to_string(),
                row: i + 1,
                reason: format!("{}: {}", path.display(), e),
            })?;
            rows.push(row);
        }
        Ok(rows)
    }

    fn read_optional<T: DeserializeOwned>(
        &self,
        code: &str,
        suffix: &str,
    ) -> Result<Option<Vec<T>>, MarketLensError> {
        let path = self.csv_path(code, suffix);
        if !path.exists() {
            return Ok(None);
        }
        Self::read_rows(&path, code).map(Some)
    }
}

impl DataPort for CsvAdapter {
    fn fetch_price_history(&self, code: &str) -> Result<Vec<PricePoint>, MarketLensError> {
        let path = self.csv_path(code, "");
        if !path.exists() {
            return Err(MarketLensError::NoData {
                code: code.to_string(),
            });
        }

        let rows: Vec<PriceRow> = Self::read_rows(&path, code)?;
        let mut bars: Vec<PricePoint> = rows.into_iter().map(|r| r.into_point(code)).collect();
        bars.sort_by_key(|b| b.date);
        tracing::debug!(code, bars = bars.len(), "loaded price history");
        Ok(bars)
    }

    fn list_symbols(&self) -> Result<Vec<String>, MarketLensError> {
        let entries = fs::read_dir(&self.base_path).map_err(|e| MarketLensError::Data {
            reason: format!(
                "failed to read directory {}: {}",
                self.base_path.display(),
                e
            ),
        })?;

        let mut symbols = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();

            let Some(stem) = name_str.strip_suffix(".csv") else {
                continue;
            };
            if stem.is_empty() || FINANCIAL_SUFFIXES.iter().any(|s| stem.ends_with(s)) {
                continue;
            }
            symbols.push(stem.to_string());
        }

        symbols.sort();
        Ok(symbols)
    }

    fn fetch_financials(&self, code: &str) -> Result<Option<FinancialFacts>, MarketLensError> {
        let quarters: Option<Vec<QuarterlyFinancials>> = self.read_optional(code, "_quarterly")?;
        let monthly: Option<Vec<MonthlyRevenue>> = self.read_optional(code, "_monthly")?;
        let dividends: Option<Vec<Dividend>> = self.read_optional(code, "_dividends")?;

        if quarters.is_none() && monthly.is_none() && dividends.is_none() {
            return Ok(None);
        }

        let facts = FinancialFacts {
            quarters: quarters.unwrap_or_default(),
            monthly_revenue: monthly.unwrap_or_default(),
            dividends: dividends.unwrap_or_default(),
        };
        Ok(Some(facts.normalized()))
    }
}
