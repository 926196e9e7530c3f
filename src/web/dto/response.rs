//! Response DTOs for the web API.

use serde::Serialize;
use utoipa::ToSchema;

/// Generic API response wrapper.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    /// Response data.
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a new API response.
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Human-readable outcome message.
#[derive(Debug, Serialize, ToSchema)]
pub struct MessageResponse {
    /// Outcome message.
    pub message: String,
}
