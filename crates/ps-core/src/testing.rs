//! In-memory `PhotoRepo` for tests in this and downstream crates.

use crate::error::{AppError, Result};
use crate::models::{Fingerprint, PhotoRecord};
use crate::traits::PhotoRepo;
use async_trait::async_trait;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct MemoryPhotoRepo {
    records: Mutex<Vec<PhotoRecord>>,
}

impl MemoryPhotoRepo {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl PhotoRepo for MemoryPhotoRepo {
    async fn insert(&self, record: &PhotoRecord) -> Result<()> {
        if record.saved_at().is_none() {
            return Err(AppError::Persistence("record has no save time".into()));
        }
        let fingerprint = record
            .fingerprint()
            .ok_or_else(|| AppError::Persistence("record has no full image".into()))?;
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        if records
            .iter()
            .any(|r| r.fingerprint().as_ref() == Some(&fingerprint))
        {
            return Err(AppError::Conflict(format!(
                "a photo with fingerprint {} is already saved",
                fingerprint.as_str()
            )));
        }
        records.push(record.clone());
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(AppError::photo_not_found(id));
        }
        Ok(())
    }

    async fn get(&self, id: Uuid) -> Result<Option<PhotoRecord>> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    async fn list(&self) -> Result<Vec<PhotoRecord>> {
        let mut records = self
            .records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        records.sort_by_key(|r| r.saved_at());
        Ok(records)
    }

    async fn exists(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(records
            .iter()
            .any(|r| r.fingerprint().as_ref() == Some(fingerprint)))
    }
}
