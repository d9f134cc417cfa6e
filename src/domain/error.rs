//! Domain error types.

/// Top-level error type for stockcast.
#[derive(Debug, thiserror::Error)]
pub enum StockcastError {
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    #[error("provider {provider} unavailable: {reason}")]
    ProviderUnavailable { provider: String, reason: String },

    #[error("no history available for {symbol}")]
    NoData { symbol: String },

    #[error("insufficient data: have {rows} usable rows, need {minimum}")]
    InsufficientData { rows: usize, minimum: usize },

    #[error("model failure: {reason}")]
    ModelFailure { reason: String },

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

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl StockcastError {
    pub fn invalid(reason: impl Into<String>) -> Self {
        StockcastError::InvalidInput {
            reason: reason.into(),
        }
    }

    /// True for both "no history at all" and "too few usable rows".
    pub fn is_insufficient_data(&self) -> bool {
        matches!(
            self,
            StockcastError::NoData { .. } | StockcastError::InsufficientData { .. }
        )
    }

    /// HTTP-style status for the gateway: 400 for malformed input, 500 otherwise.
    pub fn status_code(&self) -> u16 {
        match self {
            StockcastError::InvalidInput { .. } | StockcastError::ConfigInvalid { .. } => 400,
            StockcastError::ProviderUnavailable { .. }
            | StockcastError::NoData { .. }
            | StockcastError::InsufficientData { .. }
            | StockcastError::ModelFailure { .. }
            | StockcastError::ConfigParse { .. }
            | StockcastError::ConfigMissing { .. }
            | StockcastError::Io(_) => 500,
        }
    }
}

impl From<&StockcastError> for std::process::ExitCode {
    fn from(err: &StockcastError) -> Self {
        let code: u8 = match err {
            StockcastError::Io(_) => 1,
            StockcastError::ConfigParse { .. }
            | StockcastError::ConfigMissing { .. }
            | StockcastError::ConfigInvalid { .. } => 2,
            StockcastError::ProviderUnavailable { .. } => 3,
            StockcastError::InvalidInput { .. } => 4,
            StockcastError::NoData { .. } | StockcastError::InsufficientData { .. } => 5,
            StockcastError::ModelFailure { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
