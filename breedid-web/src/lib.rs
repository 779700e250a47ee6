//! breedid-web library - dog breed classification web service
//!
//! Serves the upload form, a JSON API over the same pipeline, the stored
//! gallery images and a health endpoint.

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use breedid_classifier::BreedClassifier;
use breedid_common::config::TomlConfig;
use breedid_common::time::secs_to_duration;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod error;
pub mod gallery;
pub mod render;
pub mod session;
pub mod upload;
pub mod workflow;

pub use error::{ApiError, ApiResult};

use gallery::Gallery;
use session::SessionStore;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<TomlConfig>,
    /// Loaded once at startup, read-only afterwards
    pub classifier: Arc<BreedClassifier>,
    pub gallery: Arc<Gallery>,
    pub sessions: SessionStore,
    /// Held for the duration of one upload
    pub pipeline_lock: Arc<Mutex<()>>,
    pub startup_time: DateTime<Utc>,
}

impl AppState {
    /// Create new application state
    pub fn new(config: TomlConfig, classifier: Arc<BreedClassifier>) -> Self {
        let gallery = Gallery::new(config.gallery.dir.clone(), config.gallery.file_prefix.clone());
        let sessions = SessionStore::new(
            config.history.retention,
            secs_to_duration(config.session.idle_timeout_secs),
        );

        Self {
            config: Arc::new(config),
            classifier,
            gallery: Arc::new(gallery),
            sessions,
            pipeline_lock: Arc::new(Mutex::new(())),
            startup_time: Utc::now(),
        }
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{delete, get, post};

    let max_bytes = state.config.upload.max_bytes;
    let gallery_files = ServeDir::new(state.gallery.dir());

    let ui = Router::new()
        .route("/", get(api::serve_index))
        .route("/classify", post(api::classify_form));

    let json = Router::new()
        .route("/api/classify", post(api::classify_json))
        .route("/api/history", get(api::get_history))
        .route("/api/session", delete(api::end_session))
        .route("/api/gallery", get(api::get_gallery))
        .route("/api/buildinfo", get(api::get_build_info));

    Router::new()
        .merge(ui)
        .merge(json)
        .merge(api::health_routes())
        .nest_service("/gallery", gallery_files)
        .layer(DefaultBodyLimit::max(max_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
