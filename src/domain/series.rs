//! Numeric series primitives shared by every indicator.
//!
//! Series outputs are the same length as their input with `None` marking
//! positions whose lookback is not yet satisfied. Nothing here rounds;
//! rounding belongs to presentation.

/// Mean of the last `period` values, or `None` when fewer are available.
pub fn sma(values: &[f64], period: usize) -> Option<f64> {
    if period == 0 || values.len() < period {
        return None;
    }
    let window = &values[values.len() - period..];
    Some(window.iter().sum::<f64>() / period as f64)
}

/// Rolling simple moving average aligned with `values`.
pub fn sma_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    (0..values.len())
        .map(|i| sma(&values[..=i], period))
        .collect()
}

/// Exponential moving average seeded with the SMA of the first `period` values.
///
/// k = 2/(n+1); EMA[n-1] = SMA(first n); EMA[i] = v[i]*k + EMA[i-1]*(1-k).
pub fn ema_series(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut ema = values[..period].iter().sum::<f64>() / period as f64;
    out[period - 1] = Some(ema);
    for i in period..values.len() {
        ema = values[i] * k + ema * (1.0 - k);
        out[i] = Some(ema);
    }
    out
}

/// Wilder smoothing: SMA seed, then `(prev*(n-1) + v)/n`.
pub fn wilder_smooth(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return out;
    }

    let n = period as f64;
    let mut smoothed = values[..period].iter().sum::<f64>() / n;
    out[period - 1] = Some(smoothed);
    for i in period..values.len() {
        smoothed = (smoothed * (n - 1.0) + values[i]) / n;
        out[i] = Some(smoothed);
    }
    out
}

/// Applies `f` to the defined tail of a left-padded series and re-pads the result.
///
/// Returns all-`None` when the series has a gap after its first defined value.
pub fn over_defined(
    values: &[Option<f64>],
    f: impl Fn(&[f64]) -> Vec<Option<f64>>,
) -> Vec<Option<f64>> {
    let mut out = vec![None; values.len()];
    let Some(start) = values.iter().position(Option::is_some) else {
        return out;
    };
    let tail: Option<Vec<f64>> = values[start..].iter().copied().collect();
    if let Some(tail) = tail {
        for (offset, v) in f(&tail).into_iter().enumerate() {
            out[start + offset] = v;
        }
    }
    out
}

/// Population standard deviation (divides by N).
pub fn population_stddev(window: &[f64]) -> Option<f64> {
    if window.is_empty() {
        return None;
    }
    let n = window.len() as f64;
    let mean = window.iter().sum::<f64>() / n;
    let variance = window
        .iter()
        .map(|v| {
            let diff = v - mean;
            diff * diff
        })
        .sum::<f64>()
        / n;
    Some(variance.sqrt())
}

/// Round half away from zero to `places` decimal places.
pub fn round_to(value: f64, places: u32) -> f64 {
    let factor = 10f64.powi(places as i32);
    (value * factor).round() / factor
}
