//! Errors of the calendar pipeline.

use reqwest::StatusCode;
use thiserror::Error;

/// A request option which could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid value {value:?} for {field}: {reason}")]
pub struct ValidationError {
    /// The query parameter name.
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &'static str, value: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            field,
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Fetching the dates from Skatteverket failed.
///
/// [`FetchError::Request`] and [`FetchError::Status`] mean the feed is unavailable,
/// [`FetchError::Malformed`] means it answered with something that is not a date feed.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request to Skatteverket failed")]
    Request(#[source] reqwest::Error),
    #[error("Skatteverket responded with status {0}")]
    Status(StatusCode),
    #[error("malformed response from Skatteverket")]
    Malformed(#[source] serde_json::Error),
}

impl FetchError {
    pub fn is_unavailable(&self) -> bool {
        matches!(self, FetchError::Request(_) | FetchError::Status(_))
    }

    pub fn is_malformed(&self) -> bool {
        matches!(self, FetchError::Malformed(_))
    }
}
