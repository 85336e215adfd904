//! Simple moving average of closes.

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use crate::domain::series;

pub fn calculate_sma(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    IndicatorSeries::from_simple(
        IndicatorType::Sma(period),
        bars,
        series::sma_series(&closes, period),
    )
}
