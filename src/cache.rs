//! Durable memoization of listing responses.

use crate::error::SyncError;
use crate::types::ListingResponse;
use std::collections::HashMap;
use std::path::PathBuf;
use tracing::{info, warn};
use url::Url;

/// Fallback cache file stem when the share URL has no usable path segment.
const FALLBACK_CACHE_STEM: &str = "requests_cache";

/// Memoizes decoded listing responses, keyed by the literal request URL.
///
/// The remote tree is assumed immutable for the duration of a session, so an
/// entry is never invalidated once stored. The whole mapping is rewritten to
/// a single JSON file on every miss; persisted entries let a re-run walk the
/// tree without touching the network at all.
pub struct ResponseCache {
    path: PathBuf,
    entries: HashMap<String, ListingResponse>,
    client: reqwest::Client,
}

impl ResponseCache {
    /// Opens the cache backed by the file at `path`, loading any entries a
    /// previous session persisted there.
    ///
    /// An unreadable or corrupt cache file is ignored; the session then
    /// starts from an empty mapping.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let mut entries = HashMap::new();

        if path.exists() {
            info!("Found listing cache: {}", path.display());
            match std::fs::read_to_string(&path) {
                Ok(content) => match serde_json::from_str(&content) {
                    Ok(map) => entries = map,
                    Err(e) => warn!("Ignoring corrupt cache {}: {}", path.display(), e),
                },
                Err(e) => warn!("Cannot read cache {}: {}", path.display(), e),
            }
        }

        Self {
            path,
            entries,
            client: reqwest::Client::new(),
        }
    }

    /// Returns the listing response for `url`, fetching and memoizing it on
    /// a cache miss.
    ///
    /// A miss performs one GET, decodes the body, stores the entry and
    /// persists the whole mapping. Persistence is best-effort: a failed write
    /// is logged and the in-memory value is still returned, at the cost of
    /// one redundant request after a crash.
    pub async fn get(&mut self, url: &str) -> Result<ListingResponse, SyncError> {
        if let Some(hit) = self.entries.get(url) {
            return Ok(hit.clone());
        }

        let response = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json::<ListingResponse>()
            .await?;

        self.entries.insert(url.to_string(), response.clone());
        if let Err(e) = self.persist() {
            warn!("Failed to persist listing cache: {}", e);
        }

        Ok(response)
    }

    /// Rewrites the full mapping to the backing file.
    pub fn persist(&self) -> Result<(), SyncError> {
        let json = serde_json::to_string(&self.entries)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

/// Derives the cache file name for a share from the last path segment of its
/// public URL (the share token).
pub(crate) fn cache_file_name(public_url: &str) -> String {
    let stem = Url::parse(public_url)
        .ok()
        .and_then(|u| {
            u.path_segments().and_then(|segments| {
                segments
                    .filter(|s| !s.is_empty())
                    .last()
                    .map(|s| s.to_string())
            })
        })
        .unwrap_or_else(|| FALLBACK_CACHE_STEM.to_string());

    format!("{}.json", stem)
}
