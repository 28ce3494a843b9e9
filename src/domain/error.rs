//! Domain error types.

/// Top-level error type for peakscreen.
#[derive(Debug, thiserror::Error)]
pub enum ScreenerError {
    /// No usable price history: the cache was absent or unreadable and the
    /// remote fetch failed, an incremental fetch failed, or a fresh fetch
    /// returned no rows.
    #[error("no price history for {ticker}: {reason}")]
    DataUnavailable { ticker: String, reason: String },

    /// The market-data provider failed to supply a snapshot or a response.
    #[error("provider error for {ticker}: {reason}")]
    Provider { ticker: String, reason: String },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value for {key}: {reason}")]
    ConfigInvalid { key: String, reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ScreenerError> for std::process::ExitCode {
    fn from(err: &ScreenerError) -> Self {
        let code: u8 = match err {
            ScreenerError::Io(_) => 1,
            ScreenerError::ConfigParse { .. } | ScreenerError::ConfigInvalid { .. } => 2,
            ScreenerError::Provider { .. } => 3,
            ScreenerError::DataUnavailable { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}
