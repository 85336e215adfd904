//! RSI (Relative Strength Index).
//!
//! Uses Wilder's smoothing for average gain/loss calculation:
//! - First average: simple mean of gains/losses over the first n changes
//! - Subsequent: avg = (prev_avg * (n-1) + current) / n
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0: RSI = 100
//!
//! Warmup: first n bars have no value (n price changes are needed).

use crate::domain::indicator::{IndicatorSeries, IndicatorType};
use crate::domain::ohlcv::PricePoint;
use crate::domain::series::wilder_smooth;

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_rsi(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = vec![None; bars.len()];

    if period > 0 && bars.len() > period {
        let mut gains = Vec::with_capacity(bars.len() - 1);
        let mut losses = Vec::with_capacity(bars.len() - 1);
        for pair in bars.windows(2) {
            let change = pair[1].close - pair[0].close;
            gains.push(change.max(0.0));
            losses.push((-change).max(0.0));
        }

        let avg_gain = wilder_smooth(&gains, period);
        let avg_loss = wilder_smooth(&losses, period);

        for (i, (g, l)) in avg_gain.into_iter().zip(avg_loss).enumerate() {
            if let (Some(g), Some(l)) = (g, l) {
                values[i + 1] = Some(rsi_from_averages(g, l));
            }
        }
    }

    IndicatorSeries::from_simple(IndicatorType::Rsi(period), bars, values)
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_loss == 0.0 {
        100.0
    } else {
        100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
    }
}
