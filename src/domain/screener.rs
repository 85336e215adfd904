//! Named screening strategies over the latest snapshot of a universe.

use crate::domain::error::MarketLensError;
use crate::domain::record::IndicatorRecord;
use chrono::NaiveDate;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Hard cap on results from any strategy.
pub const MAX_RESULTS: usize = 50;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenStrategy {
    GoldenCross,
    RsiOversold,
    MacdGoldenCross,
    VolumeBreakout,
    BollingerSqueeze,
}

impl ScreenStrategy {
    pub const ALL: [ScreenStrategy; 5] = [
        ScreenStrategy::GoldenCross,
        ScreenStrategy::RsiOversold,
        ScreenStrategy::MacdGoldenCross,
        ScreenStrategy::VolumeBreakout,
        ScreenStrategy::BollingerSqueeze,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ScreenStrategy::GoldenCross => "golden_cross",
            ScreenStrategy::RsiOversold => "rsi_oversold",
            ScreenStrategy::MacdGoldenCross => "macd_golden_cross",
            ScreenStrategy::VolumeBreakout => "volume_breakout",
            ScreenStrategy::BollingerSqueeze => "bollinger_squeeze",
        }
    }

    fn descending(&self) -> bool {
        matches!(
            self,
            ScreenStrategy::GoldenCross
                | ScreenStrategy::MacdGoldenCross
                | ScreenStrategy::VolumeBreakout
        )
    }
}

impl fmt::Display for ScreenStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ScreenStrategy {
    type Err = MarketLensError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|strategy| strategy.name() == wanted)
            .ok_or_else(|| MarketLensError::UnknownStrategy {
                name: s.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenParams {
    pub rsi_threshold: f64,
    pub volume_multiple: f64,
    pub limit: usize,
}

impl Default for ScreenParams {
    fn default() -> Self {
        Self {
            rsi_threshold: 30.0,
            volume_multiple: 2.0,
            limit: MAX_RESULTS,
        }
    }
}

/// Latest and previous snapshot for one instrument.
#[derive(Debug, Clone, PartialEq)]
pub struct UniverseRow {
    pub latest: IndicatorRecord,
    pub previous: Option<IndicatorRecord>,
    pub average_volume_20: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScreenMatch {
    pub code: String,
    pub date: NaiveDate,
    pub close: f64,
    pub volume: i64,
    pub sort_key: f64,
    /// Values that made the row match.
    pub fields: BTreeMap<String, f64>,
}

fn fields<const N: usize>(pairs: [(&str, f64); N]) -> BTreeMap<String, f64> {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn evaluate(
    row: &UniverseRow,
    strategy: ScreenStrategy,
    params: &ScreenParams,
) -> Option<(f64, BTreeMap<String, f64>)> {
    let latest = &row.latest;
    match strategy {
        ScreenStrategy::GoldenCross => {
            let previous = row.previous.as_ref()?;
            let (ma5, ma20) = (latest.ma5?, latest.ma20?);
            let (prev5, prev20) = (previous.ma5?, previous.ma20?);
            (ma5 > ma20 && prev5 <= prev20)
                .then(|| (latest.close, fields([("ma5", ma5), ("ma20", ma20)])))
        }
        ScreenStrategy::RsiOversold => {
            let rsi = latest.rsi14?;
            (rsi < params.rsi_threshold).then(|| (rsi, fields([("rsi14", rsi)])))
        }
        ScreenStrategy::MacdGoldenCross => {
            let previous = row.previous.as_ref()?;
            let (hist, prev) = (latest.macd_histogram?, previous.macd_histogram?);
            (hist > 0.0 && prev <= 0.0)
                .then(|| (hist, fields([("macd_histogram", hist), ("previous_histogram", prev)])))
        }
        ScreenStrategy::VolumeBreakout => {
            let average = row.average_volume_20?;
            let volume = latest.volume as f64;
            (volume > params.volume_multiple * average).then(|| {
                (
                    volume,
                    fields([("volume", volume), ("average_volume_20", average)]),
                )
            })
        }
        ScreenStrategy::BollingerSqueeze => {
            let width = latest.bollinger_width()?;
            Some((width, fields([("bollinger_width", width)])))
        }
    }
}

/// Runs `strategy` over `rows` and returns at most `params.limit` matches
/// (never more than [`MAX_RESULTS`]), best first. Ties are broken by code.
pub fn screen(
    rows: &[UniverseRow],
    strategy: ScreenStrategy,
    params: &ScreenParams,
) -> Vec<ScreenMatch> {
    let mut matches: Vec<ScreenMatch> = rows
        .iter()
        .filter_map(|row| {
            let (sort_key, fields) = evaluate(row, strategy, params)?;
            Some(ScreenMatch {
                code: row.latest.code.clone(),
                date: row.latest.date,
                close: row.latest.close,
                volume: row.latest.volume,
                sort_key,
                fields,
            })
        })
        .collect();

    let descending = strategy.descending();
    matches.sort_by(|a, b| {
        let by_key = a.sort_key.total_cmp(&b.sort_key);
        let by_key = if descending { by_key.reverse() } else { by_key };
        match by_key {
            Ordering::Equal => a.code.cmp(&b.code),
            other => other,
        }
    });
    matches.truncate(params.limit.min(MAX_RESULTS));
    matches
}
