//! LoRA gateway handlers: download, list, serve, and the embedded UI.

use axum::{
    body::Body,
    extract::{Path, State},
    http::header,
    response::{Html, Response},
    Json,
};
use std::sync::Arc;
use tokio_util::io::ReaderStream;
use utoipa;
use validator::Validate;

use crate::download::TransferOutcome;
use crate::storage::CatalogEntry;
use crate::web::dto::{ApiResponse, DownloadRequest, MessageResponse};
use crate::web::error::ApiError;
use crate::web::handlers::AppState;

/// Embedded single-page UI.
const INDEX_HTML: &str = include_str!("../../../assets/index.html");

/// Generate a safe Content-Disposition header value for file downloads.
///
/// This function sanitizes the filename to prevent header injection
/// attacks and uses RFC 5987 encoding for non-ASCII filenames.
fn content_disposition_header(filename: &str) -> String {
    // Sanitize filename for the basic filename parameter (ASCII fallback)
    let sanitized: String = filename
        .chars()
        .filter(|c| !c.is_control()) // Remove control characters (CR, LF, etc.)
        .map(|c| match c {
            '"' => '_',
            '\\' => '_',
            _ => c,
        })
        .collect();

    // For ASCII-only filenames, use simple format
    if filename.is_ascii() && !filename.chars().any(|c| c.is_control() || c == '"' || c == '\\') {
        return format!("attachment; filename=\"{}\"", filename);
    }

    // Use RFC 5987 filename* parameter for non-ASCII or special characters
    let encoded = urlencoding::encode(filename);

    format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        sanitized, encoded
    )
}

/// GET / - Embedded web UI.
pub async fn index_page() -> Html<&'static str> {
    Html(INDEX_HTML)
}

/// POST /api/loras/download - Download a remote file into the managed root.
#[utoipa::path(
    post,
    path = "/loras/download",
    tag = "loras",
    request_body = DownloadRequest,
    responses(
        (status = 200, description = "File stored or already present", body = MessageResponse),
        (status = 400, description = "Missing or invalid fields"),
        (status = 403, description = "Name escapes the managed root"),
        (status = 500, description = "Transfer failed")
    )
)]
pub async fn download_lora(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DownloadRequest>,
) -> Result<Json<ApiResponse<MessageResponse>>, ApiError> {
    request
        .validate()
        .map_err(ApiError::from_validation_errors)?;

    let name = request.name.trim().to_string();
    let outcome = state
        .downloader
        .transfer(&name, &request.source_url)
        .await?;

    let message = match outcome {
        TransferOutcome::Stored => format!("Successfully downloaded {name}"),
        TransferOutcome::AlreadyExists => format!("File {name} already exists"),
    };

    Ok(Json(ApiResponse::new(MessageResponse { message })))
}

/// GET /api/loras - List recognized files under the managed root.
#[utoipa::path(
    get,
    path = "/loras",
    tag = "loras",
    responses(
        (status = 200, description = "Catalog of recognized files", body = Vec<CatalogEntry>),
        (status = 500, description = "Listing failed")
    )
)]
pub async fn list_loras(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<CatalogEntry>>>, ApiError> {
    let entries = state.storage().list().map_err(|e| {
        tracing::error!("Failed to list files: {}", e);
        ApiError::internal("Failed to list files")
    })?;

    Ok(Json(ApiResponse::new(entries)))
}

/// GET /api/loras/download_file/{name} - Stream an existing file back.
///
/// The wildcard path parameter arrives percent-decoded, so `name` may
/// contain `/` separators.
#[utoipa::path(
    get,
    path = "/loras/download_file/{name}",
    tag = "loras",
    params(
        ("name" = String, Path, description = "Relative file name, may contain '/'")
    ),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 403, description = "Name escapes the managed root"),
        (status = 404, description = "File not found")
    )
)]
pub async fn download_lora_file(
    State(state): State<Arc<AppState>>,
    Path(name): Path<String>,
) -> Result<Response<Body>, ApiError> {
    let resolved = state.storage().resolve(&name)?;

    let metadata = match tokio::fs::metadata(&resolved).await {
        Ok(m) if m.is_file() => m,
        Ok(_) => return Err(ApiError::not_found("File not found")),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ApiError::not_found("File not found"));
        }
        Err(e) => {
            tracing::error!("Failed to stat file: {}", e);
            return Err(ApiError::internal("Failed to read file"));
        }
    };

    let file = tokio::fs::File::open(&resolved).await.map_err(|e| {
        tracing::error!("Failed to open file: {}", e);
        ApiError::internal("Failed to read file")
    })?;

    // Suggest only the basename to the client, never the relative path.
    let basename = resolved
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("download");

    let content_type = mime_guess::from_path(&resolved)
        .first_or_octet_stream()
        .to_string();

    let body = Body::from_stream(ReaderStream::new(file));

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_header(basename),
        )
        .header(header::CONTENT_LENGTH, metadata.len())
        .body(body)
        .map_err(|e| {
            tracing::error!("Failed to build response: {}", e);
            ApiError::internal("Failed to build response")
        })?;

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_header_simple_ascii() {
        let result = content_disposition_header("model.safetensors");
        assert_eq!(result, "attachment; filename=\"model.safetensors\"");
    }

    #[test]
    fn test_content_disposition_header_with_spaces() {
        let result = content_disposition_header("my model.safetensors");
        assert_eq!(result, "attachment; filename=\"my model.safetensors\"");
    }

    #[test]
    fn test_content_disposition_header_unicode() {
        let result = content_disposition_header("日本語モデル.safetensors");
        assert!(result.starts_with("attachment; filename=\""));
        assert!(result.contains("filename*=UTF-8''"));
    }

    #[test]
    fn test_content_disposition_header_double_quote() {
        let result = content_disposition_header("test\"file.pt");
        assert!(result.contains("filename=\"test_file.pt\""));
        assert!(result.contains("filename*=UTF-8''"));
        assert!(result.contains("%22"));
    }

    #[test]
    fn test_content_disposition_header_control_characters() {
        // Header injection attempt
        let result = content_disposition_header("test\r\nX-Injected: bad.pt");
        assert!(!result.contains('\r'));
        assert!(!result.contains('\n'));
        assert!(result.starts_with("attachment; filename="));
    }

    #[test]
    fn test_index_html_embedded() {
        assert!(INDEX_HTML.contains("<html"));
    }
}
