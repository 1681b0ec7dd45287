//! # Core Traits (Ports)
//!
//! Any plugin must implement these traits to be used by the binary.

use crate::error::{FetchError, Result};
use crate::models::{Fingerprint, PhotoRecord, PhotoSummary};
use async_trait::async_trait;
use uuid::Uuid;

/// Search contract against a remote photo API.
///
/// Implementations keep at most one search in flight: starting a new one
/// makes the pending one resolve to `FetchError::Cancelled`.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PhotoSearchClient: Send + Sync {
    async fn search(&self, query: &str) -> std::result::Result<Vec<PhotoSummary>, FetchError>;

    /// Cancels the pending search, if any.
    fn cancel(&self);
}

/// Downloads raw image bytes from a URL handed out by the search API.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> std::result::Result<Vec<u8>, FetchError>;
}

/// Durable storage contract for saved photos.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait PhotoRepo: Send + Sync {
    /// Appends a new durable record. The record must carry `saved_at`.
    async fn insert(&self, record: &PhotoRecord) -> Result<()>;

    /// Removes by id; `AppError::NotFound` if absent.
    async fn delete(&self, id: Uuid) -> Result<()>;

    async fn get(&self, id: Uuid) -> Result<Option<PhotoRecord>>;

    /// All durable records, ascending by save time.
    async fn list(&self) -> Result<Vec<PhotoRecord>>;

    /// True if a record with the same full-image content is already stored.
    async fn exists(&self, fingerprint: &Fingerprint) -> Result<bool>;
}
