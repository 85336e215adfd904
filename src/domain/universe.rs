//! Universe analysis: every instrument computed in isolation.
//!
//! One instrument's missing or malformed data is recorded as a skip and
//! never aborts the batch.

use crate::domain::engine::compute_history;
use crate::domain::error::MarketLensError;
use crate::domain::ohlcv::PricePoint;
use crate::domain::record::IndicatorRecord;
use crate::domain::score::{PriceContext, Score, ScoringWeights, technical_score};
use crate::domain::screener::UniverseRow;
use crate::domain::signal::{Signal, detect_signals, trailing_average_volume};
use crate::ports::data_port::DataPort;
use std::collections::HashSet;

#[derive(Debug, Clone, thiserror::Error)]
pub enum UniverseError {
    #[error("empty token in code list")]
    EmptyToken,

    #[error("duplicate code: {0}")]
    DuplicateCode(String),
}

/// Parses a comma-separated code list, uppercased and de-duplicated.
pub fn parse_codes(input: &str) -> Result<Vec<String>, UniverseError> {
    let mut codes = Vec::new();
    let mut seen = HashSet::new();

    for token in input.split(',') {
        let trimmed = token.trim();
        if trimmed.is_empty() {
            return Err(UniverseError::EmptyToken);
        }
        let code = trimmed.to_uppercase();
        if !seen.insert(code.clone()) {
            return Err(UniverseError::DuplicateCode(code));
        }
        codes.push(code);
    }

    Ok(codes)
}

/// Price history plus the indicator record for every date past the floor.
#[derive(Debug, Clone)]
pub struct InstrumentAnalysis {
    pub code: String,
    pub bars: Vec<PricePoint>,
    pub history: Vec<IndicatorRecord>,
}

impl InstrumentAnalysis {
    pub fn latest(&self) -> Option<&IndicatorRecord> {
        self.history.last()
    }

    pub fn previous(&self) -> Option<&IndicatorRecord> {
        let n = self.history.len();
        n.checked_sub(2).map(|i| &self.history[i])
    }

    pub fn price_context(&self) -> PriceContext {
        let n = self.bars.len();
        PriceContext {
            previous_close: n.checked_sub(2).map(|i| self.bars[i].close),
            average_volume_20: trailing_average_volume(&self.bars),
        }
    }

    pub fn signals(&self) -> Vec<Signal> {
        detect_signals(&self.history, &self.bars)
    }

    pub fn technical_score(&self, weights: &ScoringWeights) -> Option<Score> {
        let latest = self.latest()?;
        Some(technical_score(latest, &self.price_context(), weights))
    }

    pub fn universe_row(&self) -> Option<UniverseRow> {
        Some(UniverseRow {
            latest: self.latest()?.clone(),
            previous: self.previous().cloned(),
            average_volume_20: trailing_average_volume(&self.bars),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SkipReason {
    NoData,
    InsufficientHistory { bars: usize },
    Malformed { reason: String },
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedCode {
    pub code: String,
    pub reason: SkipReason,
}

impl SkipReason {
    fn from_error(err: &MarketLensError) -> Self {
        match err {
            MarketLensError::NoData { .. } => SkipReason::NoData,
            MarketLensError::InsufficientHistory { bars, .. } => {
                SkipReason::InsufficientHistory { bars: *bars }
            }
            MarketLensError::MalformedInput { .. } => SkipReason::Malformed {
                reason: err.to_string(),
            },
            other => SkipReason::Failed {
                reason: other.to_string(),
            },
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct UniverseAnalysis {
    pub instruments: Vec<InstrumentAnalysis>,
    pub skipped: Vec<SkippedCode>,
}

impl UniverseAnalysis {
    /// Screener input, one row per analysed instrument.
    pub fn rows(&self) -> Vec<UniverseRow> {
        self.instruments
            .iter()
            .filter_map(InstrumentAnalysis::universe_row)
            .collect()
    }
}

/// Loads and computes one instrument.
pub fn analyze_instrument<P>(
    data_port: &P,
    code: &str,
) -> Result<InstrumentAnalysis, MarketLensError>
where
    P: DataPort + ?Sized,
{
    let bars = data_port.fetch_price_history(code)?;
    if bars.is_empty() {
        return Err(MarketLensError::NoData {
            code: code.to_string(),
        });
    }
    let history = compute_history(code, &bars)?;
    Ok(InstrumentAnalysis {
        code: code.to_string(),
        bars,
        history,
    })
}

#[cfg(feature = "parallel")]
fn map_codes<R, F>(codes: &[String], f: F) -> Vec<R>
where
    F: Fn(&String) -> R + Sync + Send,
    R: Send,
{
    use rayon::prelude::*;
    codes.par_iter().map(f).collect()
}

#[cfg(not(feature = "parallel"))]
fn map_codes<R, F>(codes: &[String], f: F) -> Vec<R>
where
    F: Fn(&String) -> R,
{
    codes.iter().map(f).collect()
}

/// Analyses every code; failures land in `skipped` in input order.
pub fn analyze_universe<P>(data_port: &P, codes: &[String]) -> UniverseAnalysis
where
    P: DataPort + Sync + ?Sized,
{
    let results = map_codes(codes, |code| {
        (code.clone(), analyze_instrument(data_port, code))
    });

    let mut analysis = UniverseAnalysis::default();
    for (code, result) in results {
        match result {
            Ok(instrument) => analysis.instruments.push(instrument),
            Err(e) => {
                tracing::warn!(code = %code, error = %e, "skipping instrument");
                analysis.skipped.push(SkippedCode {
                    code,
                    reason: SkipReason::from_error(&e),
                });
            }
        }
    }

    tracing::info!(
        analysed = analysis.instruments.len(),
        skipped = analysis.skipped.len(),
        "universe analysis complete"
    );
    analysis
}
