//! Recursive, paginated traversal of the remote directory tree.

use crate::cache::ResponseCache;
use crate::error::SyncError;
use crate::types::{FileDescriptor, ItemKind, ListingResponse, SyncConfig};
use futures_util::future::{BoxFuture, FutureExt};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use url::Url;

/// Walks the remote tree depth-first and flattens it into an ordered list of
/// file descriptors, creating local directories as it descends.
///
/// Files appear in the exact page order the API returned them; a directory is
/// drained of all its pages before its next sibling is considered. Listing
/// failures are contained per subtree: the failed subtree contributes
/// `([], 0)` and bumps [`skipped_subtrees`](Self::skipped_subtrees) instead
/// of aborting the walk.
pub struct ListingWalker<'a> {
    config: &'a SyncConfig,
    cache: &'a mut ResponseCache,
    /// Number of subtrees dropped because their listing or local directory
    /// could not be produced.
    pub skipped_subtrees: usize,
}

impl<'a> ListingWalker<'a> {
    pub fn new(config: &'a SyncConfig, cache: &'a mut ResponseCache) -> Self {
        Self {
            config,
            cache,
            skipped_subtrees: 0,
        }
    }

    /// Lists one page of `path` at `offset` and recursively flattens any
    /// subdirectories found on it.
    ///
    /// Returns the discovered files bound to destinations under
    /// `local_prefix`, and their count. Never fails: a listing error anywhere
    /// in the subtree yields an empty result for that subtree.
    pub fn list<'s>(
        &'s mut self,
        offset: u64,
        path: &'s str,
        local_prefix: &'s Path,
    ) -> BoxFuture<'s, (Vec<FileDescriptor>, usize)> {
        async move {
            match self.walk_page(offset, path, local_prefix).await {
                Ok(found) => found,
                Err(e) => {
                    warn!("Listing {} at offset {} failed: {}, skipping subtree", path, offset, e);
                    self.skipped_subtrees += 1;
                    (Vec::new(), 0)
                }
            }
        }
        .boxed()
    }

    async fn walk_page(
        &mut self,
        offset: u64,
        path: &str,
        local_prefix: &Path,
    ) -> Result<(Vec<FileDescriptor>, usize), SyncError> {
        let page = self.fetch_page(offset, path).await?;
        let local_dir = materialize_dir(local_prefix, &page.name)?;

        let mut files = Vec::new();
        for item in page.embedded.items {
            match item.kind {
                ItemKind::File => files.push(FileDescriptor::new(item, &local_dir)),
                ItemKind::Dir => {
                    info!("Found directory: {}", item.name);
                    // Drain every page of the subdirectory before moving on
                    // to its siblings. The inner offset advances by the
                    // previous call's returned file count, nested files
                    // included, until a call comes back empty.
                    let mut inner_offset = 0u64;
                    loop {
                        debug!("Searching {} at offset {}", item.name, inner_offset);
                        let (inner_files, inner_len) =
                            self.list(inner_offset, &item.path, &local_dir).await;
                        if inner_len == 0 {
                            break;
                        }
                        files.extend(inner_files);
                        inner_offset += inner_len as u64;
                    }
                }
                ItemKind::Unknown => {}
            }
        }

        let len = files.len();
        Ok((files, len))
    }

    /// Fetches one decoded listing page via the cache. No filesystem effects.
    async fn fetch_page(&mut self, offset: u64, path: &str) -> Result<ListingResponse, SyncError> {
        let mut url = Url::parse(&self.config.api_base)?;
        url.query_pairs_mut()
            .append_pair("offset", &offset.to_string())
            .append_pair("public_key", &self.config.public_url)
            .append_pair("path", path);

        // The full request URL doubles as the cache key.
        self.cache.get(url.as_str()).await
    }
}

/// Creates the local directory for a remote directory name under `prefix`
/// and returns its path.
fn materialize_dir(prefix: &Path, name: &str) -> Result<PathBuf, SyncError> {
    let dir = prefix.join(normalize_name(name));
    if !dir.exists() {
        info!("Creating local directory {}", dir.display());
        std::fs::create_dir_all(&dir)?;
    }
    Ok(dir)
}

/// Replaces whitespace in a remote name with `_` so it is safe as a local
/// directory name.
fn normalize_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_whitespace() { '_' } else { c })
        .collect()
}
