//! Stochastic oscillator (KD) with recursive smoothing.
//!
//! RSV = (C - LL(n)) / (HH(n) - LL(n)) * 100, or 50 when HH == LL
//! K = 2/3 * K[prev] + 1/3 * RSV
//! D = 2/3 * D[prev] + 1/3 * K
//! K and D start from 50 before the first full window.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;

pub const DEFAULT_PERIOD: usize = 9;
const SEED: f64 = 50.0;

/// Raw stochastic value of the last bar in `window`.
pub fn rsv(window: &[PricePoint]) -> Option<f64> {
    let (highest, lowest) = high_low(window)?;
    let close = window.last()?.close;
    if highest == lowest {
        return Some(50.0);
    }
    Some((close - lowest) / (highest - lowest) * 100.0)
}

pub(crate) fn high_low(window: &[PricePoint]) -> Option<(f64, f64)> {
    if window.is_empty() {
        return None;
    }
    let highest = window.iter().map(|b| b.high).fold(f64::NEG_INFINITY, f64::max);
    let lowest = window.iter().map(|b| b.low).fold(f64::INFINITY, f64::min);
    Some((highest, lowest))
}

pub fn calculate_stochastic(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let mut values = Vec::with_capacity(bars.len());
    let mut k = SEED;
    let mut d = SEED;

    for (i, bar) in bars.iter().enumerate() {
        let value = if period > 0 && i + 1 >= period {
            rsv(&bars[i + 1 - period..=i]).map(|rsv| {
                k = (2.0 / 3.0) * k + (1.0 / 3.0) * rsv;
                d = (2.0 / 3.0) * d + (1.0 / 3.0) * k;
                IndicatorValue::Stochastic { k, d }
            })
        } else {
            None
        };
        values.push(IndicatorPoint {
            date: bar.date,
            value,
        });
    }

    IndicatorSeries {
        indicator_type: IndicatorType::Stochastic(period),
        values,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::indicator::test_support::{close_bars, hlc_bars};
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn kd(series: &IndicatorSeries, i: usize) -> (f64, f64) {
        match series.value_at(i) {
            Some(IndicatorValue::Stochastic { k, d }) => (*k, *d),
            other => panic!("expected stochastic value, got {:?}", other),
        }
    }

    #[test]
    fn stochastic_warmup() {
        let series = calculate_stochastic(&close_bars(&[10.0; 12]), 9);
        for i in 0..8 {
            assert!(series.value_at(i).is_none());
        }
        assert!(series.value_at(8).is_some());
    }

    #[test]
    fn flat_window_rsv_is_50() {
        let bars = close_bars(&[42.0; 9]);
        assert_relative_eq!(rsv(&bars).unwrap(), 50.0);
        let series = calculate_stochastic(&bars, 9);
        let (k, d) = kd(&series, 8);
        assert_relative_eq!(k, 50.0);
        assert_relative_eq!(d, 50.0);
    }

    #[test]
    fn first_window_uses_seed() {
        // Close at window high → RSV = 100.
        let rows: Vec<(f64, f64, f64)> = (0..9)
            .map(|i| (11.0 + i as f64, 9.0, 10.0 + i as f64))
            .collect();
        let mut bars = hlc_bars(&rows);
        bars[8].close = bars[8].high;
        let series = calculate_stochastic(&bars, 9);
        let (k, d) = kd(&series, 8);
        let expected_k = 2.0 / 3.0 * 50.0 + 100.0 / 3.0;
        assert_relative_eq!(k, expected_k);
        assert_relative_eq!(d, 2.0 / 3.0 * 50.0 + expected_k / 3.0);
    }

    #[test]
    fn rsv_uses_window_extremes() {
        let bars = hlc_bars(&[(12.0, 8.0, 10.0), (15.0, 9.0, 14.0), (13.0, 5.0, 11.0)]);
        // HH=15, LL=5, C=11 → 60
        assert_relative_eq!(rsv(&bars).unwrap(), 60.0);
    }

    proptest! {
        #[test]
        fn kd_bounded(
            rows in prop::collection::vec((1.0f64..500.0, 0.0f64..50.0, 0.0f64..1.0), 9..80)
        ) {
            let triples: Vec<(f64, f64, f64)> = rows
                .iter()
                .map(|&(low, spread, pos)| (low + spread, low, low + spread * pos))
                .collect();
            let series = calculate_stochastic(&hlc_bars(&triples), 9);
            for point in &series.values {
                if let Some(IndicatorValue::Stochastic { k, d }) = point.value {
                    prop_assert!((0.0..=100.0).contains(&k));
                    prop_assert!((0.0..=100.0).contains(&d));
                }
            }
        }
    }
}
