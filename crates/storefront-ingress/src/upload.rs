//! Multipart file upload
//!
//! Every file part is streamed to `<upload_dir>/<file name>`. Parts are
//! written one at a time; the first failure ends the request with a 500
//! and the error text, leaving files written by earlier parts in place.
//! The request body is capped at `AppState::max_upload_size` bytes; a body
//! over the cap fails like any other read error.

use axum::{
    Json,
    extract::{
        Multipart, State,
        multipart::{MultipartError, MultipartRejection},
    },
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

use crate::AppState;

const ALLOW_ORIGIN: &str = "*";
const ALLOW_METHODS: &str = "GET, POST, PUT, DELETE";

#[derive(Debug, Error)]
pub enum UploadError {
    #[error(transparent)]
    Rejected(#[from] MultipartRejection),

    #[error(transparent)]
    Multipart(#[from] MultipartError),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn with_cors(mut response: Response) -> Response {
    let headers = response.headers_mut();
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_ORIGIN,
        HeaderValue::from_static(ALLOW_ORIGIN),
    );
    headers.insert(
        header::ACCESS_CONTROL_ALLOW_METHODS,
        HeaderValue::from_static(ALLOW_METHODS),
    );
    response
}

/// Destination of an uploaded file, or `None` for parts without a usable name
fn destination(upload_dir: &Path, file_name: &str) -> Option<PathBuf> {
    let base = Path::new(file_name).file_name()?;
    Some(upload_dir.join(base))
}

/// Stream one file part to `path`. The file is flushed and closed on return.
async fn save_part(
    field: &mut axum::extract::multipart::Field<'_>,
    path: &Path,
) -> Result<u64, UploadError> {
    let mut file = tokio::fs::File::create(path).await?;
    let mut written = 0u64;
    while let Some(chunk) = field.chunk().await? {
        file.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }
    file.flush().await?;
    Ok(written)
}

async fn save_all(upload_dir: &Path, mut multipart: Multipart) -> Result<usize, UploadError> {
    tokio::fs::create_dir_all(upload_dir).await?;

    let mut saved = 0;
    while let Some(mut field) = multipart.next_field().await? {
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let Some(path) = destination(upload_dir, &file_name) else {
            debug!("Skipping upload part with file name {:?}", file_name);
            continue;
        };

        let written = save_part(&mut field, &path).await?;
        debug!("Saved upload {:?} ({} bytes)", path, written);
        saved += 1;
    }
    Ok(saved)
}

/// `POST /upload`
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Response {
    let result = match multipart {
        Ok(multipart) => save_all(&state.upload_dir, multipart).await,
        Err(rejection) => Err(rejection.into()),
    };

    let response = match result {
        Ok(saved) => {
            info!("Upload complete: {} files", saved);
            Json("done").into_response()
        }
        Err(e) => {
            warn!("Upload failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    };
    with_cors(response)
}

/// `OPTIONS /upload`
pub async fn preflight() -> Response {
    with_cors(StatusCode::OK.into_response())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_destination_keeps_base_name_only() {
        let dir = Path::new("/srv/upload");
        assert_eq!(
            destination(dir, "photo.png"),
            Some(PathBuf::from("/srv/upload/photo.png"))
        );
        assert_eq!(
            destination(dir, "../../etc/passwd"),
            Some(PathBuf::from("/srv/upload/passwd"))
        );
        assert_eq!(destination(dir, ""), None);
        assert_eq!(destination(dir, ".."), None);
    }

    #[test]
    fn test_cors_headers_added() {
        let response = with_cors(StatusCode::OK.into_response());
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "*"
        );
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_METHODS],
            "GET, POST, PUT, DELETE"
        );
    }
}
