//! Error types for the depth chart engine

use thiserror::Error;

/// Depth chart engine errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DepthChartError {
    #[error("Snapshot sequence is empty")]
    EmptySequence,

    #[error("Unknown bar category: {0}")]
    UnknownCategory(String),

    #[error("Malformed snapshot at record {record}: {reason}")]
    MalformedSnapshot { record: usize, reason: String },

    #[error("Invalid scrub request: {0}")]
    InvalidScrub(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Failed to parse input: {0}")]
    ParseError(String),

    #[error("I/O error: {0}")]
    IoError(String),

    #[error("Metrics error: {0}")]
    MetricsError(String),
}

impl DepthChartError {
    pub(crate) fn malformed(record: usize, reason: impl Into<String>) -> Self {
        DepthChartError::MalformedSnapshot {
            record,
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for DepthChartError {
    fn from(err: serde_json::Error) -> Self {
        DepthChartError::ParseError(err.to_string())
    }
}

impl From<std::io::Error> for DepthChartError {
    fn from(err: std::io::Error) -> Self {
        DepthChartError::IoError(err.to_string())
    }
}

impl From<prometheus::Error> for DepthChartError {
    fn from(err: prometheus::Error) -> Self {
        DepthChartError::MetricsError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DepthChartError>;
