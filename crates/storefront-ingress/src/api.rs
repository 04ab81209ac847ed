//! Tenant JSON API and registry administration
//!
//! Tenant routes act on the store serving the request's host. Reads go to
//! the record store, so they reflect writes made since the last rebuild.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode, Uri},
};
use serde::{Deserialize, Serialize};

use storefront_core::{
    catalog,
    records::{Page, Theme},
};

use crate::{ApiError, ApiResult, AppState, pages::resolve_app};

/// Body of `POST /api/pages`
#[derive(Debug, Clone, Deserialize)]
pub struct NewPage {
    pub name: String,
    pub template_name: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
}

/// Body of `POST /api/themes`
#[derive(Debug, Clone, Deserialize)]
pub struct NewTheme {
    pub name: String,
    #[serde(default)]
    pub is_default: bool,
}

/// Response of `POST /admin/rebuild`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RebuildResponse {
    pub generation: u64,
    pub hosts: usize,
}

/// `GET /api/pages`
pub async fn list_pages(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Json<Vec<Page>>> {
    let app = resolve_app(&state, &headers, &uri).await?;
    let pages = catalog::get_pages(state.registry.records().as_ref(), app.store_id()).await?;
    Ok(Json(pages))
}

/// `POST /api/pages`
pub async fn create_page(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<NewPage>,
) -> ApiResult<(StatusCode, Json<Page>)> {
    let app = resolve_app(&state, &headers, &uri).await?;

    let mut page = Page::new(app.store_id(), body.name, body.template_name)
        .with_title(body.title)
        .with_description(body.description)
        .with_content(body.content);
    catalog::create_page(state.registry.records().as_ref(), &mut page).await?;

    tracing::info!("Created page {:?} for store {}", page.name, page.store_id);
    Ok((StatusCode::CREATED, Json(page)))
}

/// `GET /api/themes`
pub async fn list_themes(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Json<Vec<Theme>>> {
    let app = resolve_app(&state, &headers, &uri).await?;
    let themes = catalog::get_themes(state.registry.records().as_ref(), app.store_id()).await?;
    Ok(Json(themes))
}

/// `POST /api/themes`
pub async fn create_theme(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
    Json(body): Json<NewTheme>,
) -> ApiResult<(StatusCode, Json<Theme>)> {
    let app = resolve_app(&state, &headers, &uri).await?;

    let mut theme = Theme::new(app.store_id(), body.name);
    theme.is_default = body.is_default;
    catalog::create_theme(state.registry.records().as_ref(), &mut theme).await?;

    tracing::info!("Created theme {:?} for store {}", theme.name, theme.store_id);
    Ok((StatusCode::CREATED, Json(theme)))
}

/// `PUT /api/themes/{name}/default`
pub async fn set_default_theme(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Json<Theme>> {
    let app = resolve_app(&state, &headers, &uri).await?;
    let records = state.registry.records().as_ref();

    catalog::set_default_theme(records, app.store_id(), &name).await?;

    let theme = catalog::get_theme_by_name(records, app.store_id(), &name)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("theme {:?}", name)))?;
    Ok(Json(theme))
}

/// `POST /admin/rebuild`
pub async fn rebuild(State(state): State<AppState>) -> ApiResult<Json<RebuildResponse>> {
    let table = state.registry.rebuild().await?;
    Ok(Json(RebuildResponse {
        generation: table.generation(),
        hosts: table.len(),
    }))
}
