use tracing::info;

use lorad::{Config, Downloader, Storage, WebServer};

#[tokio::main]
async fn main() {
    // Load configuration
    let config = match Config::load_with_env("config.toml") {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load config.toml: {e}");
            eprintln!("Using default configuration.");
            Config::default()
        }
    };

    if let Err(e) = config.validate() {
        eprintln!("Invalid configuration: {e}");
        std::process::exit(1);
    }

    // Initialize logging
    if let Err(e) = lorad::logging::init(&config.logging) {
        eprintln!("Failed to initialize logging: {e}");
        // Fall back to console-only logging
        lorad::logging::init_console_only(&config.logging.level);
    }

    info!("lorad - Managed LoRA File Gateway");

    let storage = match Storage::from_config(&config.storage) {
        Ok(storage) => storage,
        Err(e) => {
            tracing::error!("Failed to initialize storage: {e}");
            std::process::exit(1);
        }
    };
    info!("Managed root: {}", storage.root().display());

    let downloader = match Downloader::new(&config.download, storage) {
        Ok(downloader) => downloader,
        Err(e) => {
            tracing::error!("Failed to initialize downloader: {e}");
            std::process::exit(1);
        }
    };

    let server = WebServer::new(&config.server, downloader);
    info!(
        "Server configured on {}:{}",
        config.server.host, config.server.port
    );

    if let Err(e) = server.run().await {
        tracing::error!("Web server error: {e}");
        std::process::exit(1);
    }
}
