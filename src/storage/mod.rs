//! Managed file storage for lorad.
//!
//! The filesystem subtree rooted at the configured directory is the only
//! state this service has. [`Storage`] owns the canonicalized root and
//! guarantees that every resolved path stays inside it.

pub mod catalog;
pub mod paths;

use std::fs;
use std::path::{Path, PathBuf};

use crate::config::StorageConfig;
use crate::Result;

pub use catalog::CatalogEntry;
pub use paths::safe_join;

/// Managed storage rooted at a single directory.
///
/// Constructed once at startup and injected into the web layer; the root
/// is immutable for the process lifetime.
#[derive(Debug, Clone)]
pub struct Storage {
    /// Canonicalized managed root.
    root: PathBuf,
    /// Extensions the catalog recognizes.
    extensions: Vec<String>,
}

impl Storage {
    /// Create storage over the given root directory.
    ///
    /// The directory is created if it does not exist, then canonicalized
    /// so containment checks compare against a normalized absolute path.
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>) -> Result<Self> {
        let root = root.into();
        fs::create_dir_all(&root)?;
        let root = root.canonicalize()?;

        Ok(Self { root, extensions })
    }

    /// Create storage from configuration.
    pub fn from_config(config: &StorageConfig) -> Result<Self> {
        Self::new(&config.root, config.extensions.clone())
    }

    /// The canonicalized managed root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve an untrusted relative name to a contained absolute path.
    pub fn resolve(&self, name: &str) -> Result<PathBuf> {
        safe_join(&self.root, name)
    }

    /// Enumerate recognized files under the root.
    ///
    /// Takes no lock: an entry for a file still being transferred may
    /// report a size that is still growing.
    pub fn list(&self) -> Result<Vec<CatalogEntry>> {
        catalog::scan(&self.root, &self.extensions)
    }
}
