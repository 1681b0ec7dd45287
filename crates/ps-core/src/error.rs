//! # AppError
//!
//! Centralized error handling for the photo-search ecosystem.
//! Remote failures are classified into `FetchError` so callers can pick a
//! category-specific notice; everything else lands in `AppError`.

use thiserror::Error;

/// Failure of a request against the remote photo API or an image URL.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FetchError {
    /// The host could not be reached at all (DNS, refused, offline).
    #[error("no network connectivity")]
    NoConnectivity,

    /// The request was sent but did not complete in time.
    #[error("request timed out")]
    Timeout,

    /// A newer request superseded this one. Never shown to the user.
    #[error("request cancelled")]
    Cancelled,

    /// The response body was not what we expected (bad JSON, not an image).
    #[error("malformed response: {0}")]
    Decode(String),

    /// The server answered with a non-2xx status.
    #[error("remote returned status {0}")]
    Status(u16),

    #[error("unknown fetch failure: {0}")]
    Unknown(String),
}

/// The primary error type for all ps-core operations.
#[derive(Error, Debug)]
pub enum AppError {
    /// Resource not found (e.g., Photo)
    #[error("{0} not found with ID {1}")]
    NotFound(String, String),

    /// Validation failure (e.g., empty query, full image not loaded yet)
    #[error("validation error: {0}")]
    ValidationError(String),

    /// Resource already exists (e.g., photo already saved)
    #[error("conflict: {0}")]
    Conflict(String),

    /// Storage layer failure on write, delete or read.
    #[error("persistence error: {0}")]
    Persistence(String),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// Anything else that should never happen.
    #[error("internal service error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn photo_not_found(id: impl ToString) -> Self {
        AppError::NotFound("Photo".to_string(), id.to_string())
    }

    /// True for outcomes that must be swallowed instead of surfaced.
    pub fn is_cancelled(&self) -> bool {
        matches!(self, AppError::Fetch(FetchError::Cancelled))
    }
}

/// A specialized Result type for photo-search logic.
pub type Result<T> = std::result::Result<T, AppError>;
