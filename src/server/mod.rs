//! HTTP/JSON interface for the note store.
//!
//! Routes mirror the browser client's contract: every `/api/*` endpoint
//! answers `{success: true, ...}` or `{success: false, error}`.

pub mod error;
pub mod handlers;

use std::sync::Arc;

use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::config::Config;
use crate::error::Result;
use crate::storage::{AttachmentStore, NoteStore, IMAGES_DIR};

pub use error::{ApiError, Operation};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    pub store: NoteStore,
    pub attachments: AttachmentStore,
    pub config: Arc<Config>,
}

impl AppState {
    pub fn from_config(config: Config) -> Result<Self> {
        config.validate()?;
        let store = NoteStore::new(&config.root, config.list)?;
        let attachments = AttachmentStore::new(
            &store.images_dir(),
            &format!("{}/{}", config.public_prefix, IMAGES_DIR),
        )?;
        Ok(Self {
            store,
            attachments,
            config: Arc::new(config),
        })
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let files = ServeDir::new(state.store.root());
    let static_dir = state.config.static_dir.clone();
    let body_limit = state.config.max_body_bytes;
    let public_prefix = state.config.public_prefix.clone();

    let app = Router::new()
        .route("/api/save", post(handlers::save_note))
        .route("/api/open", post(handlers::open_note))
        .route("/api/delete", post(handlers::delete_note))
        .route("/api/rename", post(handlers::rename_note))
        .route("/api/list", get(handlers::list_notes))
        .route("/api/list-with-content", get(handlers::list_with_content))
        .route("/api/search", get(handlers::search_notes))
        .route("/api/tree", get(handlers::note_tree))
        .route("/api/folders", get(handlers::list_folders))
        .route("/api/upload-image", post(handlers::upload_image))
        .route("/health", get(handlers::health))
        .nest_service(&public_prefix, files)
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    match static_dir {
        Some(dir) => app.fallback_service(ServeDir::new(dir)),
        None => app,
    }
}

/// Bind and serve until `shutdown` is cancelled.
pub async fn serve(config: Config, shutdown: CancellationToken) -> Result<()> {
    let bind = config.bind.clone();
    let state = AppState::from_config(config)?;
    let root = state.store.root().display().to_string();

    let listener = TcpListener::bind(&bind).await?;
    info!(addr = %listener.local_addr()?, root = %root, "ToastNotes server running");

    axum::serve(listener, router(state))
        .with_graceful_shutdown(async move { shutdown.cancelled().await })
        .await?;

    info!("server stopped");
    Ok(())
}
