//! Rolling volume-weighted average of typical price.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub const DEFAULT_PERIOD: usize = 20;

/// VWAP over the trailing `period` bars; absent when the window traded no volume.
pub fn calculate_vwap(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                return None;
            }
            let window = &bars[i + 1 - period..=i];
            let volume: f64 = window.iter().map(|b| b.volume as f64).sum();
            if volume == 0.0 {
                return None;
            }
            let weighted: f64 = window
                .iter()
                .map(|b| b.typical_price() * b.volume as f64)
                .sum();
            Some(weighted / volume)
        })
        .collect();

    IndicatorSeries::from_simple(IndicatorType::Vwap(period), bars, values)
}
