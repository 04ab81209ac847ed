//! Host-dispatched storefront pages

use axum::{
    extract::{Path, State},
    http::{HeaderMap, Uri, header},
    response::{Html, IntoResponse, Response},
};
use std::sync::Arc;

use storefront_dispatch::{StoreApplication, display_page, page_source};

use crate::{AppState, ApiError, ApiResult};

/// Page served for `/`
pub const HOME_PAGE: &str = "home";

/// Hostname of the request: the `Host` header, or the URI authority
pub(crate) fn request_host(headers: &HeaderMap, uri: &Uri) -> Option<String> {
    headers
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned)
        .or_else(|| uri.authority().map(|a| a.to_string()))
}

/// Resolve the store application serving this request
pub(crate) async fn resolve_app(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
) -> ApiResult<Arc<StoreApplication>> {
    let host = request_host(headers, uri).ok_or(ApiError::MissingHost)?;
    state
        .registry
        .resolve(&host)
        .await?
        .ok_or(ApiError::UnknownHost(host))
}

async fn render_page(
    state: &AppState,
    headers: &HeaderMap,
    uri: &Uri,
    name: &str,
) -> ApiResult<Response> {
    let app = resolve_app(state, headers, uri).await?;
    match display_page(&app, name).await? {
        Some(rendered) => Ok((rendered.status, Html(rendered.body)).into_response()),
        None => Err(ApiError::NotFound(format!("page {:?}", name))),
    }
}

/// `GET /`
pub async fn home(
    State(state): State<AppState>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Response> {
    render_page(&state, &headers, &uri, HOME_PAGE).await
}

/// `GET /{page}`
pub async fn page(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Response> {
    render_page(&state, &headers, &uri, &name).await
}

/// `GET /pages/{name}`: the raw page file of the store
pub async fn raw_page(
    State(state): State<AppState>,
    Path(name): Path<String>,
    headers: HeaderMap,
    uri: Uri,
) -> ApiResult<Html<String>> {
    let app = resolve_app(&state, &headers, &uri).await?;
    page_source(&app, &name)
        .await?
        .map(Html)
        .ok_or_else(|| ApiError::NotFound(format!("page file {:?}", name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_request_host_prefers_header() {
        let mut headers = HeaderMap::new();
        headers.insert(header::HOST, HeaderValue::from_static("shop.example.com:8080"));
        let uri: Uri = "http://other.example.com/about".parse().unwrap();

        assert_eq!(
            request_host(&headers, &uri).as_deref(),
            Some("shop.example.com:8080")
        );
    }

    #[test]
    fn test_request_host_falls_back_to_authority() {
        let uri: Uri = "http://shop.example.com/about".parse().unwrap();
        assert_eq!(
            request_host(&HeaderMap::new(), &uri).as_deref(),
            Some("shop.example.com")
        );

        let relative: Uri = "/about".parse().unwrap();
        assert!(request_host(&HeaderMap::new(), &relative).is_none());
    }
}
