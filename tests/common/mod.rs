//! Test helpers for gateway integration tests.
//!
//! Provides a TestServer over a temporary managed root and a stub remote
//! source to download from.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::header;
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use axum_test::TestServer;
use tempfile::TempDir;

use lorad::config::DownloadConfig;
use lorad::web::handlers::AppState;
use lorad::web::router::create_router;
use lorad::{Downloader, Storage};

/// Download configuration that permits the loopback stub source.
pub fn test_download_config() -> DownloadConfig {
    DownloadConfig {
        allow_private_sources: true,
        ..DownloadConfig::default()
    }
}

/// Create a test server over a temporary managed root.
///
/// Returns the server, the tempdir guard, and the canonicalized root.
pub fn create_test_server() -> (TestServer, TempDir, PathBuf) {
    let temp = TempDir::new().expect("Failed to create temp dir");

    let storage = Storage::new(
        temp.path().join("loras"),
        vec![
            "safetensors".to_string(),
            "ckpt".to_string(),
            "pt".to_string(),
        ],
    )
    .expect("Failed to create storage");
    let root = storage.root().to_path_buf();

    let downloader =
        Downloader::new(&test_download_config(), storage).expect("Failed to create downloader");
    let app_state = Arc::new(AppState::new(downloader));

    let router = create_router(app_state, &[]);
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, temp, root)
}

/// Stub remote source.
///
/// Routes:
/// - `/ok.safetensors` - 200 with a small fixed body
/// - `/missing.safetensors` - 404
/// - `/drop.safetensors` - announces a large body, sends a fragment, then
///   fails the connection mid-stream
pub async fn spawn_source() -> SocketAddr {
    let app = Router::new()
        .route("/ok.safetensors", get(|| async { "stub-lora-weights" }))
        .route(
            "/missing.safetensors",
            get(|| async { (axum::http::StatusCode::NOT_FOUND, "gone") }),
        )
        .route("/drop.safetensors", get(dropped_mid_stream));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind stub source");
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    addr
}

async fn dropped_mid_stream() -> Response {
    let chunks = futures::stream::iter(vec![
        Ok::<_, std::io::Error>(axum::body::Bytes::from_static(b"partial-")),
        Err(std::io::Error::new(
            std::io::ErrorKind::ConnectionReset,
            "dropped",
        )),
    ]);

    Response::builder()
        .header(header::CONTENT_LENGTH, 1_000_000)
        .body(Body::from_stream(chunks))
        .unwrap()
}
