//! # Domain Models
//!
//! `PhotoRecord` is the one entity of the system. It lives either in the
//! staging store (search results) or in the persistent store (saved photos),
//! never both. Saving produces a fresh record via [`PhotoRecord::commit_copy`].
//! We use UUID v7 for time-ordered, globally unique identification.

use crate::error::{AppError, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// One search hit as decoded from the remote photo API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoSummary {
    pub description: Option<String>,
    pub alt_description: Option<String>,
    pub thumbnail_url: String,
    pub full_url: String,
    pub user_name: String,
}

/// Which store owns a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Origin {
    Staging,
    Persistent,
}

/// Content-derived key of the full-resolution image (hex SHA-256).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Fingerprint(hex::encode(hasher.finalize()))
    }

    /// Wraps an already computed hex digest (e.g. read back from storage).
    pub fn from_hex(hex: impl Into<String>) -> Self {
        Fingerprint(hex.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Descriptive fields shared by both representations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoMeta {
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub user_name: String,
}

/// A photo with its two image payloads.
///
/// Fields are private: after creation the only permitted mutation is
/// attaching fetched image bytes.
#[derive(Debug, Clone)]
pub struct PhotoRecord {
    id: Uuid,
    meta: PhotoMeta,
    thumbnail: Option<Vec<u8>>,
    full: Option<Vec<u8>>,
    /// Only meaningful while the record is staged.
    thumbnail_url: Option<String>,
    full_url: Option<String>,
    saved_at: Option<DateTime<Utc>>,
}

impl PhotoRecord {
    /// Builds a staging record from a search hit.
    pub fn from_summary(summary: PhotoSummary) -> Self {
        Self {
            id: Uuid::now_v7(),
            meta: PhotoMeta {
                title: summary.description,
                subtitle: summary.alt_description,
                user_name: summary.user_name,
            },
            thumbnail: None,
            full: None,
            thumbnail_url: Some(summary.thumbnail_url),
            full_url: Some(summary.full_url),
            saved_at: None,
        }
    }

    /// Rehydrates a record read back from durable storage.
    pub fn from_storage(
        id: Uuid,
        meta: PhotoMeta,
        thumbnail: Vec<u8>,
        full: Vec<u8>,
        saved_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            meta,
            thumbnail: Some(thumbnail),
            full: Some(full),
            thumbnail_url: None,
            full_url: None,
            saved_at: Some(saved_at),
        }
    }

    /// Duplicates a staged record into a new durable one.
    ///
    /// The copy gets its own id and `saved_at = now`; URLs are not carried.
    /// Both payloads must already be fetched.
    pub fn commit_copy(&self, now: DateTime<Utc>) -> Result<PhotoRecord> {
        if self.origin() != Origin::Staging {
            return Err(AppError::ValidationError(format!(
                "photo {} is already saved",
                self.id
            )));
        }
        let (Some(thumbnail), Some(full)) = (&self.thumbnail, &self.full) else {
            return Err(AppError::ValidationError(format!(
                "photo {} has not finished loading",
                self.id
            )));
        };

        Ok(PhotoRecord::from_storage(
            Uuid::now_v7(),
            self.meta.clone(),
            thumbnail.clone(),
            full.clone(),
            now,
        ))
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn meta(&self) -> &PhotoMeta {
        &self.meta
    }

    pub fn title(&self) -> Option<&str> {
        self.meta.title.as_deref()
    }

    pub fn subtitle(&self) -> Option<&str> {
        self.meta.subtitle.as_deref()
    }

    pub fn user_name(&self) -> &str {
        &self.meta.user_name
    }

    pub fn thumbnail(&self) -> Option<&[u8]> {
        self.thumbnail.as_deref()
    }

    pub fn full(&self) -> Option<&[u8]> {
        self.full.as_deref()
    }

    pub fn thumbnail_url(&self) -> Option<&str> {
        self.thumbnail_url.as_deref()
    }

    pub fn full_url(&self) -> Option<&str> {
        self.full_url.as_deref()
    }

    pub fn saved_at(&self) -> Option<DateTime<Utc>> {
        self.saved_at
    }

    pub fn origin(&self) -> Origin {
        if self.saved_at.is_some() {
            Origin::Persistent
        } else {
            Origin::Staging
        }
    }

    /// `None` until the full-resolution bytes are present.
    pub fn fingerprint(&self) -> Option<Fingerprint> {
        self.full.as_deref().map(Fingerprint::of)
    }

    pub fn attach_thumbnail(&mut self, bytes: Vec<u8>) {
        self.thumbnail = Some(bytes);
    }

    pub fn attach_full(&mut self, bytes: Vec<u8>) {
        self.full = Some(bytes);
    }

    /// Text shown under the full-size image.
    pub fn caption(&self) -> String {
        let mut caption = format!("Author: {}", self.meta.user_name);
        if let Some(saved_at) = self.saved_at {
            caption.push_str(&format!("\nSaved: {}", saved_at.format("%-d %B %Y at %H:%M")));
        }
        caption
    }
}
