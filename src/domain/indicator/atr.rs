//! Average True Range.
//!
//! TR[0] = high - low (no previous close); TR[i] = max(H-L, |H-C[i-1]|, |L-C[i-1]|).
//! ATR is the Wilder-smoothed TR, seeded with the mean of the first n TRs.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use crate::domain::series::wilder_smooth;

pub const DEFAULT_PERIOD: usize = 14;

pub fn true_ranges(bars: &[PricePoint]) -> Vec<f64> {
    bars.iter()
        .enumerate()
        .map(|(i, bar)| {
            if i == 0 {
                bar.high - bar.low
            } else {
                bar.true_range(bars[i - 1].close)
            }
        })
        .collect()
}

pub fn calculate_atr(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let values = wilder_smooth(&true_ranges(bars), period);
    IndicatorSeries::from_simple(IndicatorType::Atr(period), bars, values)
}
