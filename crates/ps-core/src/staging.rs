//! Ephemeral holding area for search results.
//!
//! Nothing in here is ever written to durable storage; saving goes through
//! [`PhotoRecord::commit_copy`](crate::models::PhotoRecord::commit_copy).

use crate::models::PhotoRecord;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct StagingStore {
    records: Vec<PhotoRecord>,
}

impl StagingStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Swaps the full contents in one step.
    pub fn replace(&mut self, records: Vec<PhotoRecord>) {
        self.records = records;
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }

    pub fn records(&self) -> &[PhotoRecord] {
        &self.records
    }

    pub fn get(&self, id: Uuid) -> Option<&PhotoRecord> {
        self.records.iter().find(|r| r.id() == id)
    }

    pub fn get_mut(&mut self, id: Uuid) -> Option<&mut PhotoRecord> {
        self.records.iter_mut().find(|r| r.id() == id)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PhotoSummary;

    fn record(name: &str) -> PhotoRecord {
        PhotoRecord::from_summary(PhotoSummary {
            description: None,
            alt_description: None,
            thumbnail_url: format!("https://img.example/{name}-s"),
            full_url: format!("https://img.example/{name}-f"),
            user_name: name.to_string(),
        })
    }

    #[test]
    fn replace_discards_previous_results() {
        let mut staging = StagingStore::new();
        staging.replace(vec![record("a"), record("b")]);
        staging.replace(vec![record("c")]);

        assert_eq!(staging.len(), 1);
        assert_eq!(staging.records()[0].user_name(), "c");
    }

    #[test]
    fn lookup_and_clear() {
        let mut staging = StagingStore::new();
        let r = record("a");
        let id = r.id();
        staging.replace(vec![r]);

        staging.get_mut(id).unwrap().attach_thumbnail(vec![1]);
        assert_eq!(staging.get(id).unwrap().thumbnail(), Some(&[1u8][..]));

        staging.clear();
        assert!(staging.is_empty());
        assert!(staging.get(id).is_none());
    }
}
