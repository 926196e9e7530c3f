//! Router configuration for the web API.

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use super::handlers::{download_lora, download_lora_file, index_page, list_loras, AppState};
use super::middleware::create_cors_layer;
use crate::storage::CatalogEntry;
use crate::web::dto::{DownloadRequest, MessageResponse};

/// OpenAPI documentation.
#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::handlers::loras::download_lora,
        crate::web::handlers::loras::list_loras,
        crate::web::handlers::loras::download_lora_file,
    ),
    components(schemas(DownloadRequest, MessageResponse, CatalogEntry)),
    tags((name = "loras", description = "Managed LoRA file operations")),
    servers((url = "/api"))
)]
struct ApiDoc;

/// Create the main API router.
pub fn create_router(app_state: Arc<AppState>, cors_origins: &[String]) -> Router {
    let lora_routes = Router::new()
        .route("/loras", get(list_loras))
        .route("/loras/download", post(download_lora))
        .route("/loras/download_file/*name", get(download_lora_file));

    Router::new()
        .route("/", get(index_page))
        .nest("/api", lora_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(create_cors_layer(cors_origins)),
        )
        .with_state(app_state)
}

/// Create a health check router.
pub fn create_health_router() -> Router {
    Router::new().route("/health", get(health_check))
}

/// Create the Swagger UI router.
pub fn create_swagger_router() -> Router {
    SwaggerUi::new("/swagger-ui")
        .url("/api-docs/openapi.json", ApiDoc::openapi())
        .into()
}

/// Health check handler.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_health_router() {
        let _router = create_health_router();
        // Should not panic
    }

    #[test]
    fn test_openapi_document_builds() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/loras/download"));
    }
}
