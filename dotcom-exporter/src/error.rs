//! Error types for the Dotcom-Monitor exporter.

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias using [`ScrapeError`].
pub type Result<T> = std::result::Result<T, ScrapeError>;

/// Reasons a single scrape of the Dotcom-Monitor API can fail.
///
/// The exporter treats every variant the same way (the scrape is reported
/// as unsuccessful), but the variants stay distinct so callers can tell
/// an unreachable upstream from one that answered with nothing useful.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Network failure, including the request timeout.
    #[error("Request to dotcom failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Upstream answered with a non-2xx status.
    #[error("Did not receive a HTTP 200 OK, received HTTP {status}")]
    HttpStatus { status: StatusCode },

    /// Response body is not a valid XML status report.
    #[error("Failed to parse status report: {0}")]
    Parse(#[from] quick_xml::DeError),

    /// Report decoded fine but listed no devices.
    #[error("No device statuses received")]
    EmptyResult,
}

impl ScrapeError {
    /// Short, stable name of the failure kind, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport(_) => "transport",
            Self::HttpStatus { .. } => "http_status",
            Self::Parse(_) => "parse",
            Self::EmptyResult => "empty_result",
        }
    }

    /// Whether the failure was the request timing out.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_timeout())
    }
}

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] json5::Error),
    #[error("Validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    /// Create a validation error.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }
}
