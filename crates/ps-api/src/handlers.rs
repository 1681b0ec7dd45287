//! # ps-api Handlers
//!
//! This module coordinates the flow between HTTP requests and the core
//! controllers.

use crate::error::ApiError;
use actix_web::{web, HttpResponse};
use chrono::{DateTime, Utc};
use ps_core::detail::DetailController;
use ps_core::gallery::{DisplaySource, GalleryController, SearchOutcome};
use ps_core::loading::LoadingIndicator;
use ps_core::models::{Origin, PhotoRecord};
use ps_core::notice::Notice;
use ps_core::traits::PhotoRepo;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

/// State shared across all Actix-web workers.
pub struct AppState {
    pub gallery: Arc<GalleryController>,
    pub detail: DetailController,
    pub repo: Arc<dyn PhotoRepo>,
    pub loading: LoadingIndicator,
}

impl AppState {
    pub fn new(gallery: Arc<GalleryController>, repo: Arc<dyn PhotoRepo>) -> Self {
        Self {
            detail: DetailController::new(gallery.clone(), repo.clone()),
            gallery,
            repo,
            loading: LoadingIndicator::new(),
        }
    }
}

/// Wire form of a photo. Image bytes are served from their own routes.
#[derive(Debug, Serialize, Deserialize)]
pub struct PhotoDto {
    pub id: Uuid,
    pub origin: String,
    pub title: Option<String>,
    pub subtitle: Option<String>,
    pub user_name: String,
    pub saved_at: Option<DateTime<Utc>>,
    pub thumbnail_loaded: bool,
    pub full_loaded: bool,
}

impl From<&PhotoRecord> for PhotoDto {
    fn from(record: &PhotoRecord) -> Self {
        PhotoDto {
            id: record.id(),
            origin: match record.origin() {
                Origin::Staging => "staging".to_string(),
                Origin::Persistent => "persistent".to_string(),
            },
            title: record.title().map(str::to_string),
            subtitle: record.subtitle().map(str::to_string),
            user_name: record.user_name().to_string(),
            saved_at: record.saved_at(),
            thumbnail_loaded: record.thumbnail().is_some(),
            full_loaded: record.full().is_some(),
        }
    }
}

fn to_dtos(records: &[PhotoRecord]) -> Vec<PhotoDto> {
    records.iter().map(PhotoDto::from).collect()
}

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
}

#[derive(Serialize)]
struct SearchResponse {
    outcome: SearchOutcome,
    notice: Option<Notice>,
    source: DisplaySource,
    photos: Vec<PhotoDto>,
}

#[derive(Serialize)]
struct GridResponse {
    source: DisplaySource,
    loading: bool,
    prompt_search: bool,
    photos: Vec<PhotoDto>,
}

#[derive(Debug, Deserialize)]
pub struct SaveRequest {
    pub photo_id: Uuid,
}

#[derive(Serialize)]
struct SaveResponse {
    photo: PhotoDto,
    notice: Notice,
}

/// Runs a search; the grid switches to the results (or back to saved).
pub async fn search(
    data: web::Data<AppState>,
    body: web::Json<SearchRequest>,
) -> Result<HttpResponse, ApiError> {
    let outcome = data.gallery.search(&body.query, &data.loading).await?;
    let notice = (outcome == SearchOutcome::NoResults).then_some(Notice::NO_RESULTS);

    Ok(HttpResponse::Ok().json(SearchResponse {
        outcome,
        notice,
        source: data.gallery.source(),
        photos: to_dtos(&data.gallery.displayed()),
    }))
}

/// Dismisses the search and returns the saved photos.
pub async fn cancel_search(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let saved = data.gallery.dismiss_search().await?;
    Ok(HttpResponse::Ok().json(to_dtos(&saved)))
}

pub async fn list_displayed(data: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(GridResponse {
        source: data.gallery.source(),
        loading: data.loading.is_active(),
        prompt_search: data.gallery.should_prompt_search(),
        photos: to_dtos(&data.gallery.displayed()),
    })
}

/// Opens one displayed photo; fetches the full image on first access.
pub async fn photo_detail(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let view = data.detail.open(path.into_inner(), &data.loading).await?;
    Ok(HttpResponse::Ok().json(view))
}

pub async fn photo_thumbnail(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let bytes = data.gallery.thumbnail(path.into_inner()).await?;
    Ok(image_response(bytes))
}

pub async fn photo_full(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let bytes = data.gallery.full_image(path.into_inner()).await?;
    Ok(image_response(bytes))
}

fn image_response(bytes: Vec<u8>) -> HttpResponse {
    let mime = image::guess_format(&bytes)
        .map(|format| format.to_mime_type())
        .unwrap_or("application/octet-stream");
    HttpResponse::Ok().content_type(mime).body(bytes)
}

/// Persistent store contents, ascending by save time.
pub async fn list_saved(data: web::Data<AppState>) -> Result<HttpResponse, ApiError> {
    let saved = data.repo.list().await?;
    Ok(HttpResponse::Ok().json(to_dtos(&saved)))
}

/// Saves a staged search result.
pub async fn save_photo(
    data: web::Data<AppState>,
    body: web::Json<SaveRequest>,
) -> Result<HttpResponse, ApiError> {
    let receipt = data.detail.save(body.photo_id).await?;
    Ok(HttpResponse::Created().json(SaveResponse {
        photo: PhotoDto::from(&receipt.record),
        notice: receipt.notice,
    }))
}

/// The HTTP DELETE itself is the confirmed intent, so both steps run here.
pub async fn delete_saved(
    data: web::Data<AppState>,
    path: web::Path<Uuid>,
) -> Result<HttpResponse, ApiError> {
    let intent = data.detail.request_delete(path.into_inner()).await?;
    data.detail.confirm_delete(intent).await?;
    Ok(HttpResponse::NoContent().finish())
}
