//! Trendfeed error types

use std::fmt;
use std::time::Duration;

/// Trendfeed error types.
///
/// A closed set of failure variants; use [`TrendsError::kind()`] to branch on
/// the broad category without matching every variant.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TrendsError {
    // Transport errors
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP error ({status}): {message}")]
    Http { status: u16, message: String },

    #[error("request timed out")]
    Timeout,

    #[error("rate limited, retry after {retry_after:?}")]
    RateLimited { retry_after: Option<Duration> },

    // Data errors
    #[error("parse error: {0}")]
    Parse(String),

    // Rejected before any network call
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Broad category of a [`TrendsError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Network,
    Parse,
    RateLimit,
    InvalidParameter,
    Configuration,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Network => "network",
            ErrorKind::Parse => "parse",
            ErrorKind::RateLimit => "rate_limit",
            ErrorKind::InvalidParameter => "invalid_parameter",
            ErrorKind::Configuration => "configuration",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TrendsError {
    /// The broad category of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrendsError::Network(_) | TrendsError::Http { .. } | TrendsError::Timeout => {
                ErrorKind::Network
            }
            TrendsError::RateLimited { .. } => ErrorKind::RateLimit,
            TrendsError::Parse(_) => ErrorKind::Parse,
            TrendsError::InvalidParameter(_) => ErrorKind::InvalidParameter,
            TrendsError::Configuration(_) => ErrorKind::Configuration,
        }
    }

    /// Whether a caller-side retry could plausibly succeed.
    ///
    /// Transport failures, 5xx responses and throttling are transient;
    /// 4xx responses, parse failures and bad parameters are not. The batch
    /// layer never retries on its own.
    pub fn is_transient(&self) -> bool {
        match self {
            TrendsError::Network(_) | TrendsError::Timeout | TrendsError::RateLimited { .. } => {
                true
            }
            TrendsError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// The server-suggested wait before retrying, if any.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            TrendsError::RateLimited { retry_after } => *retry_after,
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TrendsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TrendsError::Timeout
        } else if let Some(status) = err.status() {
            TrendsError::Http {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            TrendsError::Network(err.to_string())
        }
    }
}

impl From<quick_xml::Error> for TrendsError {
    fn from(err: quick_xml::Error) -> Self {
        TrendsError::Parse(err.to_string())
    }
}

/// Result type alias for Trendfeed operations
pub type Result<T> = std::result::Result<T, TrendsError>;
