//! Remote file transfer into managed storage.
//!
//! The transfer sequence is: validate inputs, resolve the destination
//! inside the managed root, then fetch and stream to disk. Transfers
//! targeting the same resolved path are mutually exclusive; distinct
//! paths proceed in parallel.

pub mod fetcher;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::config::DownloadConfig;
use crate::storage::Storage;
use crate::{LoradError, Result};

pub use fetcher::validate_url;

/// Result of a completed transfer request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The file was fetched and written.
    Stored,
    /// The destination already existed; nothing was fetched or touched.
    AlreadyExists,
}

/// Downloads remote files into managed storage.
pub struct Downloader {
    client: reqwest::Client,
    storage: Storage,
    allow_private_sources: bool,
    /// Lazily-populated lock per resolved destination path. Entries are
    /// removed once the last in-flight transfer for a path completes.
    in_flight: DashMap<PathBuf, Arc<Mutex<()>>>,
}

impl Downloader {
    /// Create a downloader over the given storage.
    pub fn new(config: &DownloadConfig, storage: Storage) -> Result<Self> {
        Ok(Self {
            client: fetcher::build_client(config)?,
            storage,
            allow_private_sources: config.allow_private_sources,
            in_flight: DashMap::new(),
        })
    }

    /// The storage this downloader writes into.
    pub fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Transfer a remote file to `name` under the managed root.
    ///
    /// Idempotent: if the destination already exists as a regular file it
    /// is left untouched and nothing is fetched. On any fetch or write
    /// failure the partially written file is removed before the error is
    /// returned.
    pub async fn transfer(&self, name: &str, source_url: &str) -> Result<TransferOutcome> {
        let name = name.trim();
        let source_url = source_url.trim();

        if name.is_empty() {
            return Err(LoradError::InvalidRequest("missing name".to_string()));
        }
        if source_url.is_empty() {
            return Err(LoradError::InvalidRequest(
                "missing source URL".to_string(),
            ));
        }

        fetcher::validate_url(source_url, self.allow_private_sources)?;

        let dest = self.storage.resolve(name)?;

        // Serialize the exists-check-then-write sequence per destination.
        let lock = self
            .in_flight
            .entry(dest.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();

        let outcome = {
            let _guard = lock.lock().await;
            self.transfer_locked(name, source_url, &dest).await
        };

        // Drop our handle, then retire the entry if nobody else holds one.
        drop(lock);
        self.in_flight
            .remove_if(&dest, |_, v| Arc::strong_count(v) == 1);

        outcome
    }

    async fn transfer_locked(
        &self,
        name: &str,
        source_url: &str,
        dest: &Path,
    ) -> Result<TransferOutcome> {
        if fs::metadata(dest).await.map(|m| m.is_file()).unwrap_or(false) {
            tracing::debug!(name, "file already exists, skipping fetch");
            return Ok(TransferOutcome::AlreadyExists);
        }

        if let Some(parent) = dest.parent() {
            fs::create_dir_all(parent).await?;
        }

        tracing::info!(name, url = source_url, "starting transfer");

        match self.fetch_to(source_url, dest).await {
            Ok(bytes) => {
                tracing::info!(name, bytes, "transfer complete");
                Ok(TransferOutcome::Stored)
            }
            Err(e) => {
                // Never leave a partial file behind.
                if let Err(rm) = fs::remove_file(dest).await {
                    if rm.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(name, error = %rm, "failed to remove partial file");
                    }
                }
                tracing::warn!(name, error = %e, "transfer failed");
                Err(e)
            }
        }
    }

    /// Stream the response body to `dest` in chunks, returning the byte
    /// count written.
    async fn fetch_to(&self, source_url: &str, dest: &Path) -> Result<u64> {
        let mut response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(|e| LoradError::Transfer(format!("request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(LoradError::Transfer(format!(
                "HTTP error: {}",
                response.status()
            )));
        }

        let mut file = fs::File::create(dest)
            .await
            .map_err(|e| LoradError::Transfer(format!("failed to create file: {e}")))?;

        let mut written: u64 = 0;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| LoradError::Transfer(format!("failed to read response: {e}")))?
        {
            file.write_all(&chunk)
                .await
                .map_err(|e| LoradError::Transfer(format!("failed to write file: {e}")))?;
            written += chunk.len() as u64;
        }

        file.flush()
            .await
            .map_err(|e| LoradError::Transfer(format!("failed to flush file: {e}")))?;

        Ok(written)
    }
}
