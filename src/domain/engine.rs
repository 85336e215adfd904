//! Indicator engine: raw price history in, [`IndicatorRecord`]s out.

use crate::domain::error::MarketLensError;
use crate::domain::indicator::{
    self, IndicatorSeries, IndicatorType, IndicatorValue, atr, bollinger, dmi, macd, rsi,
    stochastic, vwap, williams,
};
use crate::domain::ohlcv::{PricePoint, validate_history};
use crate::domain::record::IndicatorRecord;
use std::collections::HashMap;

/// Below this many rows nothing is computed for an instrument.
pub const MIN_HISTORY: usize = 20;

pub const MA_PERIODS: [usize; 4] = [5, 10, 20, 60];

/// Every indicator type the engine fills into a record.
pub fn record_indicator_types() -> Vec<IndicatorType> {
    let mut types: Vec<IndicatorType> = MA_PERIODS.iter().map(|&p| IndicatorType::Sma(p)).collect();
    types.extend([
        IndicatorType::Rsi(rsi::DEFAULT_PERIOD),
        IndicatorType::Macd {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        },
        IndicatorType::Stochastic(stochastic::DEFAULT_PERIOD),
        IndicatorType::Bollinger {
            period: bollinger::DEFAULT_PERIOD,
            stddev_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
        },
        IndicatorType::Vwap(vwap::DEFAULT_PERIOD),
        IndicatorType::Atr(atr::DEFAULT_PERIOD),
        IndicatorType::Dmi(dmi::DEFAULT_PERIOD),
        IndicatorType::WilliamsR(williams::DEFAULT_PERIOD),
        IndicatorType::Obv,
    ]);
    types
}

pub fn compute_indicator(bars: &[PricePoint], indicator_type: &IndicatorType) -> IndicatorSeries {
    match *indicator_type {
        IndicatorType::Sma(p) => indicator::calculate_sma(bars, p),
        IndicatorType::Rsi(p) => indicator::calculate_rsi(bars, p),
        IndicatorType::Atr(p) => indicator::calculate_atr(bars, p),
        IndicatorType::Vwap(p) => indicator::calculate_vwap(bars, p),
        IndicatorType::WilliamsR(p) => indicator::calculate_williams_r(bars, p),
        IndicatorType::Dmi(p) => indicator::calculate_dmi(bars, p),
        IndicatorType::Obv => indicator::calculate_obv(bars),
        IndicatorType::Macd { fast, slow, signal } => {
            indicator::calculate_macd(bars, fast, slow, signal)
        }
        IndicatorType::Stochastic(p) => indicator::calculate_stochastic(bars, p),
        IndicatorType::Bollinger {
            period,
            stddev_mult_x100,
        } => indicator::calculate_bollinger(bars, period, stddev_mult_x100),
    }
}

pub fn compute_indicators(
    bars: &[PricePoint],
    types: &[IndicatorType],
) -> HashMap<IndicatorType, IndicatorSeries> {
    types
        .iter()
        .map(|t| (t.clone(), compute_indicator(bars, t)))
        .collect()
}

/// Computed series for one instrument, addressable by bar index.
pub struct IndicatorSet<'a> {
    pub code: String,
    bars: &'a [PricePoint],
    series: HashMap<IndicatorType, IndicatorSeries>,
}

impl<'a> IndicatorSet<'a> {
    /// Validates `bars` and computes every record indicator over them.
    pub fn build(code: &str, bars: &'a [PricePoint]) -> Result<Self, MarketLensError> {
        validate_history(bars)?;
        if bars.len() < MIN_HISTORY {
            return Err(MarketLensError::InsufficientHistory {
                code: code.to_string(),
                bars: bars.len(),
                minimum: MIN_HISTORY,
            });
        }

        let series = compute_indicators(bars, &record_indicator_types());
        tracing::debug!(
            code,
            bars = bars.len(),
            indicators = series.len(),
            "computed indicator series"
        );
        Ok(Self {
            code: code.to_string(),
            bars,
            series,
        })
    }

    pub fn bar_count(&self) -> usize {
        self.bars.len()
    }

    pub fn series(&self, indicator_type: &IndicatorType) -> Option<&IndicatorSeries> {
        self.series.get(indicator_type)
    }

    fn value(&self, indicator_type: &IndicatorType, index: usize) -> Option<&IndicatorValue> {
        self.series(indicator_type)?.value_at(index)
    }

    fn simple(&self, indicator_type: &IndicatorType, index: usize) -> Option<f64> {
        self.series(indicator_type)?.simple_at(index)
    }

    /// Snapshot of every indicator at bar `index`.
    pub fn record_at(&self, index: usize) -> Option<IndicatorRecord> {
        let bar = self.bars.get(index)?;
        let mut record = IndicatorRecord::empty(&self.code, bar.date, bar.close, bar.volume);

        record.ma5 = self.simple(&IndicatorType::Sma(5), index);
        record.ma10 = self.simple(&IndicatorType::Sma(10), index);
        record.ma20 = self.simple(&IndicatorType::Sma(20), index);
        record.ma60 = self.simple(&IndicatorType::Sma(60), index);
        record.rsi14 = self.simple(&IndicatorType::Rsi(rsi::DEFAULT_PERIOD), index);
        record.vwap20 = self.simple(&IndicatorType::Vwap(vwap::DEFAULT_PERIOD), index);
        record.atr14 = self.simple(&IndicatorType::Atr(atr::DEFAULT_PERIOD), index);
        record.williams_r14 =
            self.simple(&IndicatorType::WilliamsR(williams::DEFAULT_PERIOD), index);
        record.obv = self.simple(&IndicatorType::Obv, index).map(|v| v as i64);

        let macd_type = IndicatorType::Macd {
            fast: macd::DEFAULT_FAST,
            slow: macd::DEFAULT_SLOW,
            signal: macd::DEFAULT_SIGNAL,
        };
        if let Some(IndicatorValue::Macd {
            line,
            signal,
            histogram,
        }) = self.value(&macd_type, index)
        {
            record.macd_line = Some(*line);
            record.macd_signal = *signal;
            record.macd_histogram = *histogram;
        }

        if let Some(IndicatorValue::Stochastic { k, d }) = self.value(
            &IndicatorType::Stochastic(stochastic::DEFAULT_PERIOD),
            index,
        ) {
            record.stoch_k = Some(*k);
            record.stoch_d = Some(*d);
        }

        let bollinger_type = IndicatorType::Bollinger {
            period: bollinger::DEFAULT_PERIOD,
            stddev_mult_x100: bollinger::DEFAULT_STDDEV_MULT_X100,
        };
        if let Some(IndicatorValue::Bollinger {
            upper,
            middle,
            lower,
        }) = self.value(&bollinger_type, index)
        {
            record.bollinger_upper = Some(*upper);
            record.bollinger_middle = Some(*middle);
            record.bollinger_lower = Some(*lower);
        }

        if let Some(IndicatorValue::Dmi {
            plus_di,
            minus_di,
            adx,
        }) = self.value(&IndicatorType::Dmi(dmi::DEFAULT_PERIOD), index)
        {
            record.plus_di14 = *plus_di;
            record.minus_di14 = *minus_di;
            record.adx14 = *adx;
        }

        Some(record)
    }
}

/// One record per bar from the `MIN_HISTORY`-th onward, oldest first.
pub fn compute_history(
    code: &str,
    bars: &[PricePoint],
) -> Result<Vec<IndicatorRecord>, MarketLensError> {
    let set = IndicatorSet::build(code, bars)?;
    Ok((MIN_HISTORY - 1..set.bar_count())
        .filter_map(|i| set.record_at(i))
        .collect())
}

/// The record as of the last bar.
pub fn compute_latest(code: &str, bars: &[PricePoint]) -> Result<IndicatorRecord, MarketLensError> {
    let set = IndicatorSet::build(code, bars)?;
    set.record_at(set.bar_count() - 1)
        .ok_or_else(|| MarketLensError::NoData {
            code: code.to_string(),
        })
}
