//! Request DTOs for the web API.

use serde::Deserialize;
use utoipa::ToSchema;
use validator::Validate;

/// Download request.
///
/// Accepts the legacy field names `lora_name` / `download_url` as
/// aliases.
#[derive(Debug, Deserialize, Validate, ToSchema)]
pub struct DownloadRequest {
    /// Relative name to store the file under, inside the managed root.
    #[serde(alias = "lora_name")]
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    /// Absolute http(s) URL to fetch the file from.
    #[serde(alias = "download_url")]
    #[validate(length(min = 1, message = "source URL is required"))]
    pub source_url: String,
}
