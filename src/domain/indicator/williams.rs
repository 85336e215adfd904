//! Williams %R.
//!
//! %R = (HH(n) - C) / (HH(n) - LL(n)) * -100, or -50 when HH == LL.

use crate::domain::indicator::stochastic::high_low;
use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;

pub const DEFAULT_PERIOD: usize = 14;

pub fn williams_r(window: &[PricePoint]) -> Option<f64> {
    let (highest, lowest) = high_low(window)?;
    let close = window.last()?.close;
    if highest == lowest {
        return Some(-50.0);
    }
    Some((highest - close) / (highest - lowest) * -100.0)
}

pub fn calculate_williams_r(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let values = (0..bars.len())
        .map(|i| {
            if period == 0 || i + 1 < period {
                None
            } else {
                williams_r(&bars[i + 1 - period..=i])
            }
        })
        .collect();
    IndicatorSeries::from_simple(IndicatorType::WilliamsR(period), bars, values)
}
