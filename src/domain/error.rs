//! Domain error types.

use std::path::PathBuf;

/// Top-level error type for scaneq.
#[derive(Debug, thiserror::Error)]
pub enum ScanEqError {
    #[error("ticker symbol is invalid: {input:?} (expected 1-10 letters, digits, '.' or '-')")]
    InvalidTicker { input: String },

    #[error("date should be in YYYY-MM-DD format: {input:?}")]
    InvalidDate { input: String },

    #[error("start date {start} must be before end date {end}")]
    InvalidDateRange {
        start: chrono::NaiveDate,
        end: chrono::NaiveDate,
    },

    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("market data provider error: {reason}")]
    Provider { reason: String },

    #[error("failed to download data for {ticker}: provider returned no rows")]
    EmptyDownload { ticker: String },

    #[error("no data file found for ticker {ticker} ({}); download data first", path.display())]
    MissingData { ticker: String, path: PathBuf },

    #[error("malformed data in {}: {reason}", path.display())]
    MalformedData { path: PathBuf, reason: String },

    #[error("insufficient data for {strategy}: have {bars} bars, need {minimum}")]
    InsufficientData {
        strategy: String,
        bars: usize,
        minimum: usize,
    },

    #[error("chart rendering failed: {reason}")]
    Chart { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ScanEqError {
    /// Short heading used when the shell reports this error.
    pub fn title(&self) -> &'static str {
        match self {
            ScanEqError::InvalidTicker { .. } => "Invalid Ticker",
            ScanEqError::InvalidDate { .. } | ScanEqError::InvalidDateRange { .. } => {
                "Invalid Date"
            }
            ScanEqError::ConfigParse { .. } | ScanEqError::ConfigInvalid { .. } => {
                "Invalid Config"
            }
            ScanEqError::Provider { .. } | ScanEqError::EmptyDownload { .. } => "Download Failed",
            ScanEqError::MissingData { .. } | ScanEqError::MalformedData { .. } => "Data Error",
            ScanEqError::InsufficientData { .. } => "Not Enough Data",
            ScanEqError::Chart { .. } => "Chart Error",
            ScanEqError::Io(_) => "Error",
        }
    }
}

impl From<&ScanEqError> for std::process::ExitCode {
    fn from(err: &ScanEqError) -> Self {
        let code: u8 = match err {
            ScanEqError::Io(_) => 1,
            ScanEqError::InvalidTicker { .. }
            | ScanEqError::InvalidDate { .. }
            | ScanEqError::InvalidDateRange { .. }
            | ScanEqError::ConfigParse { .. }
            | ScanEqError::ConfigInvalid { .. } => 2,
            ScanEqError::Provider { .. } | ScanEqError::EmptyDownload { .. } => 3,
            ScanEqError::MissingData { .. } | ScanEqError::MalformedData { .. } => 4,
            ScanEqError::InsufficientData { .. } => 5,
            ScanEqError::Chart { .. } => 6,
        };
        std::process::ExitCode::from(code)
    }
}
