//! # ps-api
//!
//! The web routing and orchestration layer for photo-search.

pub mod error;
pub mod handlers;
pub mod middleware;

pub use handlers::AppState;

use actix_web::web;

/// Configures the routes for the photo service.
///
/// # Developer Note
/// We use a scoped configuration to allow the main binary to mount
/// the API under different paths if needed (e.g., /api/v1/).
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("")
            // Search lifecycle: submit, then dismiss back to saved photos
            .route("/search", web::post().to(handlers::search))
            .route("/search/cancel", web::post().to(handlers::cancel_search))
            // Whatever the grid currently shows
            .route("/photos", web::get().to(handlers::list_displayed))
            .route("/photos/{id}", web::get().to(handlers::photo_detail))
            .route("/photos/{id}/thumbnail", web::get().to(handlers::photo_thumbnail))
            .route("/photos/{id}/full", web::get().to(handlers::photo_full))
            // Persistent store
            .route("/saved", web::get().to(handlers::list_saved))
            .route("/saved", web::post().to(handlers::save_photo))
            .route("/saved/{id}", web::delete().to(handlers::delete_saved)),
    );
}
