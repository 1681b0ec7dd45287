//! # GalleryController
//!
//! Decides what the grid shows: either the staged search results or the
//! saved photos, never a mix.
//!
//! Every operation that suspends captures the current `generation` before
//! awaiting and re-checks it afterwards. Anything that changes what is
//! displayed (a new search, a dismissal, a reload) bumps the generation, so a
//! late completion from a superseded request is dropped instead of applied.

use crate::cell::{CellImage, CellSlot};
use crate::error::{AppError, FetchError, Result};
use crate::loading::LoadingIndicator;
use crate::models::PhotoRecord;
use crate::staging::StagingStore;
use crate::traits::{ImageFetcher, PhotoRepo, PhotoSearchClient};
use serde::Serialize;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DisplaySource {
    Saved,
    Staging,
}

/// How a search request ended, from the grid's point of view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "count", rename_all = "snake_case")]
pub enum SearchOutcome {
    /// Staging now holds this many results and is displayed.
    Results(usize),
    /// Nothing matched (or the body was unreadable); saved photos are shown.
    NoResults,
    /// The query was blank; saved photos are shown.
    ShowingSaved,
    /// A newer request took over; nothing was applied.
    Superseded,
}

#[derive(Debug, Clone, Copy)]
enum ImageSize {
    Thumbnail,
    Full,
}

#[derive(Debug)]
struct GalleryState {
    staging: StagingStore,
    saved: Vec<PhotoRecord>,
    source: DisplaySource,
    generation: u64,
}

impl GalleryState {
    fn displayed_record(&self, id: Uuid) -> Option<&PhotoRecord> {
        match self.source {
            DisplaySource::Saved => self.saved.iter().find(|r| r.id() == id),
            DisplaySource::Staging => self.staging.get(id),
        }
    }
}

pub struct GalleryController {
    search: Arc<dyn PhotoSearchClient>,
    images: Arc<dyn ImageFetcher>,
    repo: Arc<dyn PhotoRepo>,
    state: Mutex<GalleryState>,
}

impl GalleryController {
    pub fn new(
        search: Arc<dyn PhotoSearchClient>,
        images: Arc<dyn ImageFetcher>,
        repo: Arc<dyn PhotoRepo>,
    ) -> Self {
        Self {
            search,
            images,
            repo,
            state: Mutex::new(GalleryState {
                staging: StagingStore::new(),
                saved: Vec::new(),
                source: DisplaySource::Saved,
                generation: 0,
            }),
        }
    }

    fn state(&self) -> MutexGuard<'_, GalleryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Starts a new logical operation and discards staged results.
    fn supersede(&self) -> u64 {
        let mut state = self.state();
        state.generation += 1;
        state.staging.clear();
        state.generation
    }

    /// Initial load: shows saved photos.
    pub async fn load_saved(&self) -> Result<Vec<PhotoRecord>> {
        let token = self.supersede();
        self.show_saved(token).await
    }

    async fn show_saved(&self, token: u64) -> Result<Vec<PhotoRecord>> {
        let saved = self.repo.list().await?;
        let mut state = self.state();
        state.saved = saved;
        if state.generation == token {
            state.source = DisplaySource::Saved;
            state.staging.clear();
        }
        Ok(state.saved.clone())
    }

    /// Search field focused with no text: the grid goes blank.
    pub fn begin_search(&self) {
        self.supersede();
        self.state().source = DisplaySource::Staging;
    }

    pub async fn search(&self, query: &str, loading: &LoadingIndicator) -> Result<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            self.load_saved().await?;
            return Ok(SearchOutcome::ShowingSaved);
        }

        let token = self.supersede();
        let _loading = loading.start();
        log::info!("searching photos for {query:?}");

        let summaries = match self.search.search(query).await {
            Ok(summaries) => summaries,
            Err(FetchError::Cancelled) => {
                log::debug!("search for {query:?} was cancelled");
                return Ok(SearchOutcome::Superseded);
            }
            Err(FetchError::Decode(reason)) => {
                log::warn!("could not decode search response for {query:?}: {reason}");
                Vec::new()
            }
            Err(err) => {
                if self.state().generation != token {
                    return Ok(SearchOutcome::Superseded);
                }
                return Err(err.into());
            }
        };

        if summaries.is_empty() {
            if self.state().generation != token {
                return Ok(SearchOutcome::Superseded);
            }
            self.show_saved(token).await?;
            return Ok(SearchOutcome::NoResults);
        }

        let mut state = self.state();
        if state.generation != token {
            log::debug!("dropping results of superseded search {query:?}");
            return Ok(SearchOutcome::Superseded);
        }
        let records: Vec<PhotoRecord> = summaries.into_iter().map(PhotoRecord::from_summary).collect();
        let count = records.len();
        state.staging.replace(records);
        state.source = DisplaySource::Staging;
        Ok(SearchOutcome::Results(count))
    }

    /// Search cancelled or dismissed: back to the saved photos.
    pub async fn dismiss_search(&self) -> Result<Vec<PhotoRecord>> {
        self.search.cancel();
        self.load_saved().await
    }

    pub fn source(&self) -> DisplaySource {
        self.state().source
    }

    pub fn displayed(&self) -> Vec<PhotoRecord> {
        let state = self.state();
        match state.source {
            DisplaySource::Saved => state.saved.clone(),
            DisplaySource::Staging => state.staging.records().to_vec(),
        }
    }

    pub fn staged(&self) -> Vec<PhotoRecord> {
        self.state().staging.records().to_vec()
    }

    /// True when nothing is on screen and the user should be nudged to search.
    pub fn should_prompt_search(&self) -> bool {
        let state = self.state();
        match state.source {
            DisplaySource::Saved => state.saved.is_empty(),
            DisplaySource::Staging => state.staging.is_empty(),
        }
    }

    /// Snapshot of a displayed record, for handing to the detail view.
    pub fn record(&self, id: Uuid) -> Result<PhotoRecord> {
        self.state()
            .displayed_record(id)
            .cloned()
            .ok_or_else(|| AppError::photo_not_found(id))
    }

    pub async fn thumbnail(&self, id: Uuid) -> Result<Vec<u8>> {
        self.image(id, ImageSize::Thumbnail).await
    }

    pub async fn full_image(&self, id: Uuid) -> Result<Vec<u8>> {
        self.image(id, ImageSize::Full).await
    }

    /// Returns the payload, fetching it first if the record lacks it.
    /// The fetched bytes are attached only if the record is still staged
    /// under the same generation.
    async fn image(&self, id: Uuid, size: ImageSize) -> Result<Vec<u8>> {
        let (url, token) = {
            let state = self.state();
            let record = state
                .displayed_record(id)
                .ok_or_else(|| AppError::photo_not_found(id))?;

            let (bytes, url) = match size {
                ImageSize::Thumbnail => (record.thumbnail(), record.thumbnail_url()),
                ImageSize::Full => (record.full(), record.full_url()),
            };
            if let Some(bytes) = bytes {
                return Ok(bytes.to_vec());
            }
            let url = url.ok_or_else(|| {
                AppError::Internal(format!("photo {id} has neither {size:?} bytes nor URL"))
            })?;
            (url.to_string(), state.generation)
        };

        let bytes = self.images.fetch(&url).await?;

        let mut state = self.state();
        if state.generation == token {
            if let Some(record) = state.staging.get_mut(id) {
                match size {
                    ImageSize::Thumbnail => record.attach_thumbnail(bytes.clone()),
                    ImageSize::Full => record.attach_full(bytes.clone()),
                }
            }
        } else {
            log::debug!("{size:?} for photo {id} arrived after the gallery moved on");
        }
        Ok(bytes)
    }

    /// Fills a grid cell with the record's thumbnail.
    ///
    /// Shows the placeholder while fetching; a failed fetch keeps it.
    pub async fn populate_cell(&self, cell: &CellSlot, id: Uuid) -> Result<()> {
        let record = self.record(id)?;
        let binding = cell.bind(id);
        if let Some(bytes) = record.thumbnail() {
            cell.show(binding, CellImage::Image(bytes.to_vec()));
            return Ok(());
        }

        match self.thumbnail(id).await {
            Ok(bytes) => {
                if !cell.show(binding, CellImage::Image(bytes)) {
                    log::debug!("cell was rebound before thumbnail of {id} arrived");
                }
            }
            Err(err) => {
                log::warn!("thumbnail fetch for {id} failed: {err}");
                cell.show(binding, CellImage::Placeholder);
            }
        }
        Ok(())
    }

    /// Keeps the saved list in step with a fresh insert.
    pub(crate) fn note_saved(&self, record: PhotoRecord) {
        self.state().saved.push(record);
    }

    /// Drops a deleted record from the saved list.
    pub(crate) fn forget(&self, id: Uuid) {
        self.state().saved.retain(|r| r.id() != id);
    }
}
