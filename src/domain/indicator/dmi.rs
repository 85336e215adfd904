//! Directional Movement Index: +DI, -DI and ADX.
//!
//! +DM = up-move when it exceeds the down-move and is positive, else 0 (and
//! symmetrically for -DM). TR, +DM and -DM are Wilder-smoothed independently;
//! DI = smoothed DM / smoothed TR * 100. DX = |+DI - -DI| / (+DI + -DI) * 100,
//! 0 when both are 0. ADX is the Wilder-smoothed DX seeded with the mean of
//! the first n DX values.
//!
//! A zero smoothed TR (no price movement at all) leaves both DI absent and
//! counts as DX = 0.

use crate::domain::indicator::{IndicatorPoint, IndicatorSeries, IndicatorType, IndicatorValue};
use crate::domain::ohlcv::PricePoint;
use crate::domain::series::{over_defined, wilder_smooth};

pub const DEFAULT_PERIOD: usize = 14;

pub fn calculate_dmi(bars: &[PricePoint], period: usize) -> IndicatorSeries {
    let deltas = bars.len().saturating_sub(1);
    let mut plus_dm = Vec::with_capacity(deltas);
    let mut minus_dm = Vec::with_capacity(deltas);
    let mut tr = Vec::with_capacity(deltas);

    for pair in bars.windows(2) {
        let (prev, curr) = (&pair[0], &pair[1]);
        let up_move = curr.high - prev.high;
        let down_move = prev.low - curr.low;

        plus_dm.push(if up_move > down_move && up_move > 0.0 {
            up_move
        } else {
            0.0
        });
        minus_dm.push(if down_move > up_move && down_move > 0.0 {
            down_move
        } else {
            0.0
        });
        // Starts at bar 1 to align with the DM series; ATR keeps H-L at bar 0.
        tr.push(curr.true_range(prev.close));
    }

    let smoothed_tr = wilder_smooth(&tr, period);
    let smoothed_plus = wilder_smooth(&plus_dm, period);
    let smoothed_minus = wilder_smooth(&minus_dm, period);

    let mut di: Vec<Option<(f64, f64)>> = Vec::with_capacity(deltas);
    let mut dx: Vec<Option<f64>> = Vec::with_capacity(deltas);
    for j in 0..deltas {
        match (smoothed_tr[j], smoothed_plus[j], smoothed_minus[j]) {
            (Some(t), Some(p), Some(m)) if t > 0.0 => {
                let plus_di = p / t * 100.0;
                let minus_di = m / t * 100.0;
                let sum = plus_di + minus_di;
                di.push(Some((plus_di, minus_di)));
                dx.push(Some(if sum == 0.0 {
                    0.0
                } else {
                    (plus_di - minus_di).abs() / sum * 100.0
                }));
            }
            (Some(_), Some(_), Some(_)) => {
                di.push(None);
                dx.push(Some(0.0));
            }
            _ => {
                di.push(None);
                dx.push(None);
            }
        }
    }

    let adx = over_defined(&dx, |defined| wilder_smooth(defined, period));

    let values = bars
        .iter()
        .enumerate()
        .map(|(i, bar)| {
            // Delta j describes the move into bar j + 1.
            let value = i.checked_sub(1).and_then(|j| {
                dx[j]?;
                let (plus_di, minus_di) = match di[j] {
                    Some((p, m)) => (Some(p), Some(m)),
                    None => (None, None),
                };
                Some(IndicatorValue::Dmi {
                    plus_di,
                    minus_di,
                    adx: adx[j],
                })
            });
            IndicatorPoint {
                date: bar.date,
                value,
            }
        })
        .collect();

    IndicatorSeries {
        indicator_type: IndicatorType::Dmi(period),
        values,
    }
}
