//! Per-instrument indicator snapshot as of one date.

use crate::domain::series::round_to;
use chrono::NaiveDate;
use serde::Serialize;

/// Decimal places for price-scale values and bounded oscillators.
pub const PRICE_PLACES: u32 = 2;
/// Decimal places for MACD values, which sit close to zero.
pub const MACD_PLACES: u32 = 4;

/// One computed snapshot. `None` means the lookback was not satisfied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRecord {
    pub code: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
    pub ma5: Option<f64>,
    pub ma10: Option<f64>,
    pub ma20: Option<f64>,
    pub ma60: Option<f64>,
    pub rsi14: Option<f64>,
    pub macd_line: Option<f64>,
    pub macd_signal: Option<f64>,
    pub macd_histogram: Option<f64>,
    pub stoch_k: Option<f64>,
    pub stoch_d: Option<f64>,
    pub bollinger_upper: Option<f64>,
    pub bollinger_middle: Option<f64>,
    pub bollinger_lower: Option<f64>,
    pub vwap20: Option<f64>,
    pub atr14: Option<f64>,
    pub adx14: Option<f64>,
    pub plus_di14: Option<f64>,
    pub minus_di14: Option<f64>,
    pub williams_r14: Option<f64>,
    pub obv: Option<i64>,
}

impl IndicatorRecord {
    /// An empty record for `date`; every indicator absent.
    pub fn empty(code: &str, date: NaiveDate, close: f64, volume: i64) -> Self {
        Self {
            code: code.to_string(),
            date,
            close,
            volume,
            ma5: None,
            ma10: None,
            ma20: None,
            ma60: None,
            rsi14: None,
            macd_line: None,
            macd_signal: None,
            macd_histogram: None,
            stoch_k: None,
            stoch_d: None,
            bollinger_upper: None,
            bollinger_middle: None,
            bollinger_lower: None,
            vwap20: None,
            atr14: None,
            adx14: None,
            plus_di14: None,
            minus_di14: None,
            williams_r14: None,
            obv: None,
        }
    }

    /// (upper - lower) / middle
    pub fn bollinger_width(&self) -> Option<f64> {
        let (upper, middle, lower) = (
            self.bollinger_upper?,
            self.bollinger_middle?,
            self.bollinger_lower?,
        );
        if middle == 0.0 {
            return None;
        }
        Some((upper - lower) / middle)
    }

    /// Position of the close inside the band, 0 at the lower band and 1 at
    /// the upper. Absent when the band has collapsed.
    pub fn percent_b(&self) -> Option<f64> {
        let (upper, lower) = (self.bollinger_upper?, self.bollinger_lower?);
        if upper == lower {
            return None;
        }
        Some((self.close - lower) / (upper - lower))
    }

    /// Copy with every value rounded for display.
    pub fn rounded(&self) -> Self {
        let price = |v: Option<f64>| v.map(|v| round_to(v, PRICE_PLACES));
        let macd = |v: Option<f64>| v.map(|v| round_to(v, MACD_PLACES));
        Self {
            code: self.code.clone(),
            date: self.date,
            close: round_to(self.close, PRICE_PLACES),
            volume: self.volume,
            ma5: price(self.ma5),
            ma10: price(self.ma10),
            ma20: price(self.ma20),
            ma60: price(self.ma60),
            rsi14: price(self.rsi14),
            macd_line: macd(self.macd_line),
            macd_signal: macd(self.macd_signal),
            macd_histogram: macd(self.macd_histogram),
            stoch_k: price(self.stoch_k),
            stoch_d: price(self.stoch_d),
            bollinger_upper: price(self.bollinger_upper),
            bollinger_middle: price(self.bollinger_middle),
            bollinger_lower: price(self.bollinger_lower),
            vwap20: price(self.vwap20),
            atr14: price(self.atr14),
            adx14: price(self.adx14),
            plus_di14: price(self.plus_di14),
            minus_di14: price(self.minus_di14),
            williams_r14: price(self.williams_r14),
            obv: self.obv,
        }
    }
}
