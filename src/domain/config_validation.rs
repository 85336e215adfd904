//! Configuration validation and typed loading.
//!
//! Every section is validated in full before any command runs.

use crate::domain::error::MarketLensError;
use crate::domain::score::ScoringWeights;
use crate::domain::screener::{MAX_RESULTS, ScreenParams};
use crate::ports::config_port::ConfigPort;
use std::path::PathBuf;

fn invalid(section: &str, key: &str, reason: &str) -> MarketLensError {
    MarketLensError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

pub fn validate_config(config: &dyn ConfigPort) -> Result<(), MarketLensError> {
    data_path(config)?;
    load_scoring_weights(config)?;
    load_screen_params(config)?;
    Ok(())
}

/// `[data] path`, required and non-blank.
pub fn data_path(config: &dyn ConfigPort) -> Result<PathBuf, MarketLensError> {
    match config.get_string("data", "path") {
        Some(s) if !s.trim().is_empty() => Ok(PathBuf::from(s.trim())),
        _ => Err(MarketLensError::ConfigMissing {
            section: "data".to_string(),
            key: "path".to_string(),
        }),
    }
}

fn weight(config: &dyn ConfigPort, key: &str, default: f64) -> Result<f64, MarketLensError> {
    let value = config.get_double("scoring", key, default);
    if !value.is_finite() || value < 0.0 {
        return Err(invalid(
            "scoring",
            key,
            &format!("{} must be a non-negative number", key),
        ));
    }
    Ok(value)
}

/// `[scoring]` weights, defaulting any key that is not set.
pub fn load_scoring_weights(config: &dyn ConfigPort) -> Result<ScoringWeights, MarketLensError> {
    let d = ScoringWeights::default();
    Ok(ScoringWeights {
        rsi: weight(config, "rsi_weight", d.rsi)?,
        ma: weight(config, "ma_weight", d.ma)?,
        macd: weight(config, "macd_weight", d.macd)?,
        kd: weight(config, "kd_weight", d.kd)?,
        volume: weight(config, "volume_weight", d.volume)?,
        adx: weight(config, "adx_weight", d.adx)?,
        bollinger: weight(config, "bollinger_weight", d.bollinger)?,
    })
}

/// `[screener]` defaults for strategy parameters.
pub fn load_screen_params(config: &dyn ConfigPort) -> Result<ScreenParams, MarketLensError> {
    let d = ScreenParams::default();

    let rsi_threshold = config.get_double("screener", "rsi_threshold", d.rsi_threshold);
    if !(rsi_threshold > 0.0 && rsi_threshold < 100.0) {
        return Err(invalid(
            "screener",
            "rsi_threshold",
            "rsi_threshold must be between 0 and 100",
        ));
    }

    let volume_multiple = config.get_double("screener", "volume_multiple", d.volume_multiple);
    if !(volume_multiple.is_finite() && volume_multiple > 0.0) {
        return Err(invalid(
            "screener",
            "volume_multiple",
            "volume_multiple must be positive",
        ));
    }

    let limit = config.get_int("screener", "limit", d.limit as i64);
    if !(1..=MAX_RESULTS as i64).contains(&limit) {
        return Err(invalid(
            "screener",
            "limit",
            &format!("limit must be between 1 and {}", MAX_RESULTS),
        ));
    }

    Ok(ScreenParams {
        rsi_threshold,
        volume_multiple,
        limit: limit as usize,
    })
}
