//! API handlers for the web surface.

pub mod loras;

pub use loras::*;

use crate::download::Downloader;
use crate::storage::Storage;

/// Shared application state injected into handlers.
///
/// Owns the downloader (and through it the managed storage); constructed
/// once at startup so tests can point it at a temporary directory.
pub struct AppState {
    /// Transfer engine over the managed root.
    pub downloader: Downloader,
}

impl AppState {
    /// Create application state from a downloader.
    pub fn new(downloader: Downloader) -> Self {
        Self { downloader }
    }

    /// The managed storage.
    pub fn storage(&self) -> &Storage {
        self.downloader.storage()
    }
}
