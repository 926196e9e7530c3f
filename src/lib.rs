//! lorad - Managed LoRA File Gateway
//!
//! An HTTP service that downloads, lists, and serves model weight files
//! confined to a single managed directory.

pub mod config;
pub mod download;
pub mod error;
pub mod logging;
pub mod storage;
pub mod web;

pub use config::Config;
pub use download::{Downloader, TransferOutcome};
pub use error::{LoradError, Result};
pub use storage::{safe_join, CatalogEntry, Storage};
pub use web::WebServer;
