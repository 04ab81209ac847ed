//! Storefront HTTP ingress
//!
//! Axum routes on top of the host registry:
//! - Host-dispatched storefront pages (`/`, `/{page}`, `/pages/{name}`)
//! - Multipart file upload (`/upload`)
//! - Tenant JSON API for pages and themes (`/api/...`)
//! - Registry rebuild and health (`/admin/rebuild`, `/healthz`)

pub mod api;
pub mod error;
pub mod health;
pub mod pages;
pub mod upload;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post, put},
};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use storefront_dispatch::HostRegistry;

pub use error::{ApiError, ApiResult};

/// Default cap on an `/upload` request body (32 MiB)
pub const DEFAULT_MAX_UPLOAD_SIZE: usize = 32 << 20;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HostRegistry>,
    /// Directory receiving uploaded files
    pub upload_dir: Arc<PathBuf>,
    /// Largest accepted `/upload` request body, in bytes
    pub max_upload_size: usize,
}

impl AppState {
    pub fn new(registry: Arc<HostRegistry>, upload_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            upload_dir: Arc::new(upload_dir.into()),
            max_upload_size: DEFAULT_MAX_UPLOAD_SIZE,
        }
    }

    pub fn with_max_upload_size(mut self, max_upload_size: usize) -> Self {
        self.max_upload_size = max_upload_size;
        self
    }
}

/// Build the storefront router
pub fn router(state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(state.max_upload_size);

    Router::new()
        .route("/healthz", get(health::healthz))
        .route("/admin/rebuild", post(api::rebuild))
        .route(
            "/upload",
            post(upload::upload)
                .options(upload::preflight)
                .layer(upload_limit),
        )
        // Tenant API
        .route("/api/pages", get(api::list_pages).post(api::create_page))
        .route("/api/themes", get(api::list_themes).post(api::create_theme))
        .route("/api/themes/{name}/default", put(api::set_default_theme))
        // Storefront pages
        .route("/", get(pages::home))
        .route("/pages/{name}", get(pages::raw_page))
        .route("/{page}", get(pages::page))
        .with_state(state)
}

/// Build the router with request tracing enabled
pub fn traced_router(state: AppState) -> Router {
    router(state).layer(TraceLayer::new_for_http())
}
