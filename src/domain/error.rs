//! Domain error types.

/// Top-level error type for marketlens.
#[derive(Debug, thiserror::Error)]
pub enum MarketLensError {
    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("no data for {code}")]
    NoData { code: String },

    #[error("insufficient history for {code}: have {bars} bars, need {minimum}")]
    InsufficientHistory {
        code: String,
        bars: usize,
        minimum: usize,
    },

    #[error("malformed input for {code} at row {row}: {reason}")]
    MalformedInput {
        code: String,
        row: usize,
        reason: String,
    },

    #[error("unknown strategy: {name}")]
    UnknownStrategy { name: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&MarketLensError> for std::process::ExitCode {
    fn from(err: &MarketLensError) -> Self {
        let code: u8 = match err {
            MarketLensError::Io(_) => 1,
            MarketLensError::ConfigParse { .. }
            | MarketLensError::ConfigMissing { .. }
            | MarketLensError::ConfigInvalid { .. } => 2,
            MarketLensError::Data { .. } => 3,
            MarketLensError::UnknownStrategy { .. } => 4,
            MarketLensError::NoData { .. }
            | MarketLensError::InsufficientHistory { .. }
            | MarketLensError::MalformedInput { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
