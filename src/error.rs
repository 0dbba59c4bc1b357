//! Error types for the fetch, classify and aggregate stages.
//!
//! None of these reach the pipeline's caller directly: fetch and classify
//! errors are absorbed into the neutral sentinel at the unit-of-work
//! boundary, and aggregation errors become the "unavailable" narrative.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure retrieving a single forecast image.
#[derive(Debug, Error)]
pub enum FetchError {
    /// Connect, read or body failure reported by the HTTP client.
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with a non-success status.
    #[error("unexpected HTTP status {status}")]
    Status { status: StatusCode, retryable: bool },

    /// The request URL could not be built.
    #[error("invalid url: {0}")]
    Url(String),

    /// Every allowed attempt failed with a retryable error.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted {
        attempts: u32,
        #[source]
        last: Box<FetchError>,
    },
}

impl FetchError {
    /// Whether another attempt could plausibly succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            FetchError::Transport(e) => {
                e.is_connect() || e.is_timeout() || e.is_request() || e.is_body()
            }
            FetchError::Status { retryable, .. } => *retryable,
            FetchError::Url(_) | FetchError::Exhausted { .. } => false,
        }
    }
}

/// Failure turning image bytes into a classification.
#[derive(Debug, Error)]
pub enum ClassifyError {
    #[error("image decode failed: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image has no pixels")]
    Empty,
}

/// Failure reducing day records into a regime summary.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no forecast days were produced")]
    NoDays,

    #[error("expected 16 forecast days, got {got}")]
    IncompleteHorizon { got: usize },
}
