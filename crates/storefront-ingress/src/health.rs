//! Health endpoint

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};

use crate::AppState;

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// Whether the host registry has been built
    pub registry_built: bool,
    /// Registry generation, `0` before the first build
    pub generation: u64,
    /// Number of routed hostnames
    pub hosts: usize,
}

/// `GET /healthz`: liveness plus registry state. Never triggers a build.
pub async fn healthz(State(state): State<AppState>) -> Json<HealthResponse> {
    let registry = &state.registry;
    Json(HealthResponse {
        status: "ok".to_string(),
        registry_built: registry.is_built(),
        generation: registry.generation(),
        hosts: registry.host_count(),
    })
}
