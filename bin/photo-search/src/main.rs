//! # photo-search Binary
//!
//! The entry point that assembles the application based on compile-time features.

use actix_web::{web, App, HttpServer};
use ps_api::middleware::{cors_policy, standard_middleware};
use ps_api::{configure_routes, AppState};
use ps_config::Settings;
use ps_core::gallery::GalleryController;
use ps_core::traits::PhotoRepo;
use secrecy::ExposeSecret;
use std::sync::Arc;

// Feature-gated imports: This is the "Compiled-to-Order" magic
#[cfg(feature = "db-sqlite")]
use ps_db_sqlite::SqlitePhotoRepo;

#[cfg(feature = "remote-unsplash")]
use ps_unsplash::{HttpImageFetcher, UnsplashClient};

#[cfg(not(all(feature = "db-sqlite", feature = "remote-unsplash")))]
compile_error!("photo-search needs a photo store (db-sqlite) and a remote client (remote-unsplash)");

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));
    let settings = Settings::load()?;

    // 1. Initialize the persistent store
    #[cfg(feature = "db-sqlite")]
    let repo: Arc<dyn PhotoRepo> = Arc::new(SqlitePhotoRepo::new(&settings.database.url).await?);

    // 2. Initialize the remote photo API
    #[cfg(feature = "remote-unsplash")]
    let (search, images) = (
        Arc::new(UnsplashClient::new(
            settings.unsplash.endpoint.clone(),
            settings.unsplash.access_key.expose_secret(),
            settings.unsplash.per_page,
        )),
        Arc::new(HttpImageFetcher::new()),
    );

    // 3. Wire the controllers and show saved photos first
    let gallery = Arc::new(GalleryController::new(search, images, repo.clone()));
    let saved = gallery.load_saved().await?;
    log::info!("{} saved photos in library", saved.len());

    let state = web::Data::new(AppState::new(gallery, repo));
    let (host, port) = settings.bind_address();

    log::info!("🚀 photo-search starting on http://{host}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(standard_middleware())
            .wrap(cors_policy())
            .app_data(state.clone())
            .configure(configure_routes)
    })
    .bind((host.as_str(), port))?
    .run()
    .await?;

    Ok(())
}
