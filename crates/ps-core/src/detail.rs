//! # DetailController
//!
//! Full-size view of one record plus the save and delete actions that move
//! a photo between the staging and persistent stores.

use crate::error::{AppError, Result};
use crate::gallery::GalleryController;
use crate::loading::LoadingIndicator;
use crate::models::{Fingerprint, Origin, PhotoRecord};
use crate::notice::Notice;
use crate::traits::PhotoRepo;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use uuid::Uuid;

/// What the detail screen renders once the full image is available.
#[derive(Debug, Clone, Serialize)]
pub struct DetailView {
    pub id: Uuid,
    pub origin: Origin,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub user_name: String,
    pub caption: String,
    pub saved_at: Option<DateTime<Utc>>,
    pub already_saved: bool,
    pub can_save: bool,
    pub can_delete: bool,
}

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct SaveReceipt {
    pub record: PhotoRecord,
    pub notice: Notice,
}

/// First step of a delete: the user has been asked, nothing is removed yet.
#[derive(Debug)]
pub struct DeleteIntent {
    id: Uuid,
    pub prompt: Notice,
}

impl DeleteIntent {
    pub fn id(&self) -> Uuid {
        self.id
    }
}

/// Tells the caller to leave the detail screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavigateBack {
    pub removed: Uuid,
}

pub struct DetailController {
    gallery: Arc<GalleryController>,
    repo: Arc<dyn PhotoRepo>,
}

impl DetailController {
    pub fn new(gallery: Arc<GalleryController>, repo: Arc<dyn PhotoRepo>) -> Self {
        Self { gallery, repo }
    }

    /// Opens a displayed record, fetching its full image if needed.
    pub async fn open(&self, id: Uuid, loading: &LoadingIndicator) -> Result<DetailView> {
        let record = self.gallery.record(id)?;
        let full = match record.full() {
            Some(bytes) => bytes.to_vec(),
            None => {
                let _loading = loading.start();
                self.gallery.full_image(id).await?
            }
        };

        let already_saved = match record.origin() {
            Origin::Persistent => true,
            Origin::Staging => self.repo.exists(&Fingerprint::of(&full)).await?,
        };

        Ok(DetailView {
            id,
            origin: record.origin(),
            title: record.title().map(str::to_string),
            subtitle: record.subtitle().map(str::to_string),
            user_name: record.user_name().to_string(),
            caption: record.caption(),
            saved_at: record.saved_at(),
            already_saved,
            can_save: record.origin() == Origin::Staging && !already_saved,
            can_delete: record.origin() == Origin::Persistent,
        })
    }

    /// Commits a staged record as a new durable one.
    pub async fn save(&self, id: Uuid) -> Result<SaveReceipt> {
        let mut record = self.gallery.record(id)?;
        if record.origin() != Origin::Staging {
            return Err(AppError::Conflict(format!("photo {id} is already saved")));
        }
        if record.thumbnail().is_none() {
            record.attach_thumbnail(self.gallery.thumbnail(id).await?);
        }
        if record.full().is_none() {
            record.attach_full(self.gallery.full_image(id).await?);
        }

        let fingerprint = record
            .fingerprint()
            .ok_or_else(|| AppError::Internal(format!("photo {id} lost its full image")))?;
        if self.repo.exists(&fingerprint).await? {
            return Err(AppError::Conflict(format!(
                "a photo with fingerprint {} is already saved",
                fingerprint.as_str()
            )));
        }

        let saved = record.commit_copy(Utc::now())?;
        self.repo.insert(&saved).await?;
        log::info!("saved photo {} as {}", id, saved.id());
        self.gallery.note_saved(saved.clone());

        Ok(SaveReceipt {
            record: saved,
            notice: Notice::SAVED,
        })
    }

    /// Asks for confirmation before deleting a saved record.
    ///
    /// The record may be on screen or only in the persistent store.
    pub async fn request_delete(&self, id: Uuid) -> Result<DeleteIntent> {
        let record = match self.gallery.record(id) {
            Ok(record) => record,
            Err(AppError::NotFound(..)) => self
                .repo
                .get(id)
                .await?
                .ok_or_else(|| AppError::photo_not_found(id))?,
            Err(err) => return Err(err),
        };
        if record.origin() != Origin::Persistent {
            return Err(AppError::ValidationError(format!(
                "photo {id} is a search result and cannot be deleted"
            )));
        }
        Ok(DeleteIntent {
            id,
            prompt: Notice::CONFIRM_DELETE,
        })
    }

    /// Irreversibly deletes the record the intent was issued for.
    pub async fn confirm_delete(&self, intent: DeleteIntent) -> Result<NavigateBack> {
        self.repo.delete(intent.id).await?;
        self.gallery.forget(intent.id);
        log::info!("deleted saved photo {}", intent.id);
        Ok(NavigateBack { removed: intent.id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use crate::gallery::{DisplaySource, SearchOutcome};
    use crate::models::PhotoSummary;
    use crate::testing::MemoryPhotoRepo;
    use crate::traits::{MockImageFetcher, MockPhotoSearchClient, MockPhotoRepo};

    fn summary(n: usize) -> PhotoSummary {
        PhotoSummary {
            description: Some(format!("peak {n}")),
            alt_description: Some("mountain".into()),
            thumbnail_url: format!("https://img.example/{n}/small"),
            full_url: format!("https://img.example/{n}/full"),
            user_name: format!("climber {n}"),
        }
    }

    /// Every URL serves bytes derived from its photo number, so the same
    /// photo always has the same content.
    fn images() -> MockImageFetcher {
        let mut images = MockImageFetcher::new();
        images.expect_fetch().returning(|url| {
            let n = url.split('/').nth(3).unwrap_or("0").to_string();
            let kind = if url.ends_with("full") { "full" } else { "small" };
            Ok(format!("{kind}-{n}").into_bytes())
        });
        images
    }

    fn search_client(results: Vec<PhotoSummary>) -> MockPhotoSearchClient {
        let mut client = MockPhotoSearchClient::new();
        client.expect_search().returning(move |_| Ok(results.clone()));
        client.expect_cancel().return_const(());
        client
    }

    async fn setup(
        results: Vec<PhotoSummary>,
    ) -> (Arc<GalleryController>, DetailController, Arc<MemoryPhotoRepo>) {
        let repo = Arc::new(MemoryPhotoRepo::new());
        let gallery = Arc::new(GalleryController::new(
            Arc::new(search_client(results)),
            Arc::new(images()),
            repo.clone(),
        ));
        let detail = DetailController::new(gallery.clone(), repo.clone());
        (gallery, detail, repo)
    }

    #[tokio::test]
    async fn mountains_scenario() {
        let (gallery, detail, repo) = setup(vec![summary(1), summary(2), summary(3)]).await;
        let loading = LoadingIndicator::new();

        let outcome = gallery.search("mountains", &loading).await.unwrap();
        assert_eq!(outcome, SearchOutcome::Results(3));
        assert!(gallery.displayed().iter().all(|r| r.saved_at().is_none()));

        let second = gallery.displayed()[1].id();
        let view = detail.open(second, &loading).await.unwrap();
        assert!(view.can_save);
        assert!(!view.already_saved);
        assert_eq!(
            gallery.record(second).unwrap().full(),
            Some(&b"full-2"[..])
        );

        let receipt = detail.save(second).await.unwrap();
        assert_eq!(receipt.notice, Notice::SAVED);
        assert!(receipt.record.saved_at().is_some());
        assert_eq!(receipt.record.full(), Some(&b"full-2"[..]));

        let reopened = detail.open(second, &loading).await.unwrap();
        assert!(reopened.already_saved);
        assert!(!reopened.can_save);

        let shown = gallery.dismiss_search().await.unwrap();
        assert_eq!(gallery.source(), DisplaySource::Saved);
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id(), receipt.record.id());
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn saving_same_photo_twice_is_rejected() {
        let (gallery, detail, repo) = setup(vec![summary(4)]).await;
        gallery.search("lake", &LoadingIndicator::new()).await.unwrap();
        let id = gallery.displayed()[0].id();

        detail.save(id).await.unwrap();
        let second = detail.save(id).await;

        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn concurrent_saves_persist_a_single_copy() {
        let (gallery, detail, repo) = setup(vec![summary(4)]).await;
        gallery.search("lake", &LoadingIndicator::new()).await.unwrap();
        let id = gallery.displayed()[0].id();

        let (a, b) = tokio::join!(detail.save(id), detail.save(id));

        assert_eq!(a.is_ok() as u8 + b.is_ok() as u8, 1);
        assert!(matches!(a.and(b), Err(AppError::Conflict(_))));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn repo_rejects_second_copy_of_same_content() {
        let repo = MemoryPhotoRepo::new();
        let mut staged = PhotoRecord::from_summary(summary(8));
        staged.attach_thumbnail(b"small-8".to_vec());
        staged.attach_full(b"full-8".to_vec());

        repo.insert(&staged.commit_copy(Utc::now()).unwrap())
            .await
            .unwrap();
        let second = repo.insert(&staged.commit_copy(Utc::now()).unwrap()).await;

        assert!(matches!(second, Err(AppError::Conflict(_))));
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn same_content_from_a_new_search_counts_as_saved() {
        let (gallery, detail, _repo) = setup(vec![summary(4)]).await;
        let loading = LoadingIndicator::new();
        gallery.search("lake", &loading).await.unwrap();
        detail.save(gallery.displayed()[0].id()).await.unwrap();

        gallery.search("lake again", &loading).await.unwrap();
        let fresh = gallery.displayed()[0].id();
        let view = detail.open(fresh, &loading).await.unwrap();

        assert!(view.already_saved);
        assert!(!view.can_save);
    }

    #[tokio::test]
    async fn saved_record_opens_without_fetching() {
        let (gallery, detail, _repo) = setup(vec![summary(5)]).await;
        let loading = LoadingIndicator::new();
        gallery.search("sea", &loading).await.unwrap();
        detail.save(gallery.displayed()[0].id()).await.unwrap();
        gallery.dismiss_search().await.unwrap();

        let saved_id = gallery.displayed()[0].id();
        let view = detail.open(saved_id, &loading).await.unwrap();

        assert_eq!(view.origin, Origin::Persistent);
        assert!(view.can_delete);
        assert!(!view.can_save);
        assert!(view.caption.starts_with("Author: climber 5\nSaved: "));
    }

    #[tokio::test]
    async fn delete_is_two_step_and_updates_the_grid() {
        let (gallery, detail, repo) = setup(vec![summary(6)]).await;
        gallery.search("forest", &LoadingIndicator::new()).await.unwrap();
        detail.save(gallery.displayed()[0].id()).await.unwrap();
        gallery.dismiss_search().await.unwrap();
        let saved_id = gallery.displayed()[0].id();

        let intent = detail.request_delete(saved_id).await.unwrap();
        assert_eq!(intent.prompt, Notice::CONFIRM_DELETE);
        assert_eq!(repo.len(), 1);

        let back = detail.confirm_delete(intent).await.unwrap();
        assert_eq!(back.removed, saved_id);
        assert!(repo.is_empty());
        assert!(gallery.displayed().is_empty());
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn search_results_cannot_be_deleted() {
        let (gallery, detail, _repo) = setup(vec![summary(7)]).await;
        gallery.search("desert", &LoadingIndicator::new()).await.unwrap();
        let id = gallery.displayed()[0].id();

        assert!(matches!(
            detail.request_delete(id).await,
            Err(AppError::ValidationError(_))
        ));
    }

    #[tokio::test]
    async fn deleting_twice_reports_not_found() {
        let (gallery, detail, _repo) = setup(vec![summary(8)]).await;
        gallery.search("river", &LoadingIndicator::new()).await.unwrap();
        detail.save(gallery.displayed()[0].id()).await.unwrap();
        gallery.dismiss_search().await.unwrap();
        let saved_id = gallery.displayed()[0].id();

        let first = detail.request_delete(saved_id).await.unwrap();
        let second = detail.request_delete(saved_id).await.unwrap();
        detail.confirm_delete(first).await.unwrap();

        assert!(matches!(
            detail.confirm_delete(second).await,
            Err(AppError::NotFound(..))
        ));
    }

    #[tokio::test]
    async fn failed_full_image_fetch_surfaces_error() {
        let mut images = MockImageFetcher::new();
        images
            .expect_fetch()
            .returning(|_| Err(FetchError::NoConnectivity));
        let repo: Arc<dyn PhotoRepo> = Arc::new(MockPhotoRepo::new());
        let gallery = Arc::new(GalleryController::new(
            Arc::new(search_client(vec![summary(9)])),
            Arc::new(images),
            repo.clone(),
        ));
        let detail = DetailController::new(gallery.clone(), repo);
        let loading = LoadingIndicator::new();
        gallery.search("storm", &loading).await.unwrap();

        let err = detail
            .open(gallery.displayed()[0].id(), &loading)
            .await
            .unwrap_err();

        assert!(matches!(err, AppError::Fetch(FetchError::NoConnectivity)));
        assert!(!loading.is_active());
    }

    #[tokio::test]
    async fn storage_failure_on_insert_is_reported() {
        let mut repo = MockPhotoRepo::new();
        repo.expect_exists().returning(|_| Ok(false));
        repo.expect_insert()
            .returning(|_| Err(AppError::Persistence("disk full".into())));
        let repo: Arc<dyn PhotoRepo> = Arc::new(repo);
        let gallery = Arc::new(GalleryController::new(
            Arc::new(search_client(vec![summary(10)])),
            Arc::new(images()),
            repo.clone(),
        ));
        let detail = DetailController::new(gallery.clone(), repo);
        gallery.search("snow", &LoadingIndicator::new()).await.unwrap();

        let err = detail.save(gallery.displayed()[0].id()).await.unwrap_err();

        assert!(matches!(err, AppError::Persistence(_)));
    }
}
