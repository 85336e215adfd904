//! Discrete event detection over the latest one or two snapshots.
//!
//! Every detector is a pure function of its inputs and returns at most one
//! event, so re-running on an unchanged tail reproduces the same result.

use crate::domain::ohlcv::PricePoint;
use crate::domain::record::IndicatorRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

pub const RSI_OVERSOLD: f64 = 30.0;
pub const RSI_OVERBOUGHT: f64 = 70.0;
/// Volume must exceed this multiple of the trailing average.
pub const VOLUME_BREAKOUT_MULTIPLE: f64 = 2.0;
pub const VOLUME_LOOKBACK: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalKind {
    GoldenCross,
    DeathCross,
    RsiBounce,
    RsiOversold,
    RsiOverbought,
    MacdGoldenCross,
    MacdDeathCross,
    VolumeBreakout,
    BollingerBreakoutUpper,
    BollingerBreakoutLower,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Bullish,
    Bearish,
    Neutral,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Signal {
    pub code: String,
    pub date: NaiveDate,
    pub kind: SignalKind,
    pub direction: Direction,
    pub description: String,
}

impl fmt::Display for SignalKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SignalKind::GoldenCross => "golden_cross",
            SignalKind::DeathCross => "death_cross",
            SignalKind::RsiBounce => "rsi_bounce",
            SignalKind::RsiOversold => "rsi_oversold",
            SignalKind::RsiOverbought => "rsi_overbought",
            SignalKind::MacdGoldenCross => "macd_golden_cross",
            SignalKind::MacdDeathCross => "macd_death_cross",
            SignalKind::VolumeBreakout => "volume_breakout",
            SignalKind::BollingerBreakoutUpper => "bollinger_breakout_upper",
            SignalKind::BollingerBreakoutLower => "bollinger_breakout_lower",
        };
        f.write_str(name)
    }
}

fn signal(
    record: &IndicatorRecord,
    kind: SignalKind,
    direction: Direction,
    description: String,
) -> Signal {
    Signal {
        code: record.code.clone(),
        date: record.date,
        kind,
        direction,
        description,
    }
}

/// MA5 crossing MA20 between `prev` and `curr`.
pub fn detect_ma_cross(prev: &IndicatorRecord, curr: &IndicatorRecord) -> Option<Signal> {
    let (p5, p20) = (prev.ma5?, prev.ma20?);
    let (c5, c20) = (curr.ma5?, curr.ma20?);

    if p5 <= p20 && c5 > c20 {
        Some(signal(
            curr,
            SignalKind::GoldenCross,
            Direction::Bullish,
            format!("MA5 crossed above MA20 ({:.2} > {:.2})", c5, c20),
        ))
    } else if p5 >= p20 && c5 < c20 {
        Some(signal(
            curr,
            SignalKind::DeathCross,
            Direction::Bearish,
            format!("MA5 crossed below MA20 ({:.2} < {:.2})", c5, c20),
        ))
    } else {
        None
    }
}

/// Bounce out of oversold, else oversold, else overbought.
pub fn detect_rsi_zone(prev: Option<&IndicatorRecord>, curr: &IndicatorRecord) -> Option<Signal> {
    let rsi = curr.rsi14?;

    if let Some(prev_rsi) = prev.and_then(|p| p.rsi14) {
        if prev_rsi < RSI_OVERSOLD && rsi >= RSI_OVERSOLD {
            return Some(signal(
                curr,
                SignalKind::RsiBounce,
                Direction::Bullish,
                format!("RSI rose out of oversold ({:.2} -> {:.2})", prev_rsi, rsi),
            ));
        }
    }

    if rsi < RSI_OVERSOLD {
        Some(signal(
            curr,
            SignalKind::RsiOversold,
            Direction::Bullish,
            format!("RSI oversold at {:.2}", rsi),
        ))
    } else if rsi > RSI_OVERBOUGHT {
        Some(signal(
            curr,
            SignalKind::RsiOverbought,
            Direction::Bearish,
            format!("RSI overbought at {:.2}", rsi),
        ))
    } else {
        None
    }
}

/// Sign flip of the MACD histogram.
pub fn detect_macd_cross(prev: &IndicatorRecord, curr: &IndicatorRecord) -> Option<Signal> {
    let (p, c) = (prev.macd_histogram?, curr.macd_histogram?);

    if p <= 0.0 && c > 0.0 {
        Some(signal(
            curr,
            SignalKind::MacdGoldenCross,
            Direction::Bullish,
            format!("MACD histogram turned positive ({:.4})", c),
        ))
    } else if p >= 0.0 && c < 0.0 {
        Some(signal(
            curr,
            SignalKind::MacdDeathCross,
            Direction::Bearish,
            format!("MACD histogram turned negative ({:.4})", c),
        ))
    } else {
        None
    }
}

/// Mean volume of the `VOLUME_LOOKBACK` bars before the last one.
pub fn trailing_average_volume(bars: &[PricePoint]) -> Option<f64> {
    if bars.len() < VOLUME_LOOKBACK + 1 {
        return None;
    }
    let end = bars.len() - 1;
    let window = &bars[end - VOLUME_LOOKBACK..end];
    Some(window.iter().map(|b| b.volume as f64).sum::<f64>() / VOLUME_LOOKBACK as f64)
}

/// Latest volume above twice the preceding 20-day average.
pub fn detect_volume_breakout(bars: &[PricePoint]) -> Option<Signal> {
    let average = trailing_average_volume(bars)?;
    let latest = bars.last()?;
    if (latest.volume as f64) <= VOLUME_BREAKOUT_MULTIPLE * average {
        return None;
    }

    let prev_close = bars[bars.len() - 2].close;
    let direction = if latest.close > prev_close {
        Direction::Bullish
    } else if latest.close < prev_close {
        Direction::Bearish
    } else {
        Direction::Neutral
    };

    Some(Signal {
        code: latest.code.clone(),
        date: latest.date,
        kind: SignalKind::VolumeBreakout,
        direction,
        description: format!(
            "volume {} is {:.1}x the {}-day average {:.0}",
            latest.volume,
            latest.volume as f64 / average,
            VOLUME_LOOKBACK,
            average
        ),
    })
}

/// Close strictly outside the latest Bollinger band.
pub fn detect_bollinger_breakout(curr: &IndicatorRecord) -> Option<Signal> {
    let (upper, lower) = (curr.bollinger_upper?, curr.bollinger_lower?);

    if curr.close > upper {
        Some(signal(
            curr,
            SignalKind::BollingerBreakoutUpper,
            Direction::Bullish,
            format!("close {:.2} above upper band {:.2}", curr.close, upper),
        ))
    } else if curr.close < lower {
        Some(signal(
            curr,
            SignalKind::BollingerBreakoutLower,
            Direction::Bearish,
            format!("close {:.2} below lower band {:.2}", curr.close, lower),
        ))
    } else {
        None
    }
}

/// Runs every detector against the tail of `records` and `bars`.
///
/// `records` is the oldest-first indicator history; `bars` the matching
/// price history. The result carries no ordering guarantee.
pub fn detect_signals(records: &[IndicatorRecord], bars: &[PricePoint]) -> Vec<Signal> {
    let mut signals = Vec::new();
    let Some(curr) = records.last() else {
        return signals;
    };
    let prev = records.len().checked_sub(2).map(|i| &records[i]);

    if let Some(prev) = prev {
        signals.extend(detect_ma_cross(prev, curr));
        signals.extend(detect_macd_cross(prev, curr));
    }
    signals.extend(detect_rsi_zone(prev, curr));
    signals.extend(detect_bollinger_breakout(curr));
    if bars.last().map(|b| b.date) == Some(curr.date) {
        signals.extend(detect_volume_breakout(bars));
    }
    signals
}
