//! Top-level sync loop over root listing pages.

use crate::cache::{cache_file_name, ResponseCache};
use crate::error::SyncError;
use crate::syncer::{FileSyncer, SyncOutcome};
use crate::types::SyncConfig;
use crate::walker::ListingWalker;
use tracing::{debug, info};

/// Aggregate tally of one sync run.
#[derive(Debug, Default, Clone)]
pub struct SyncReport {
    /// Files discovered by the walk so far. Grows as directories are found,
    /// so mid-run percentages are estimates.
    pub discovered: usize,
    /// Files streamed to disk this run.
    pub downloaded: usize,
    /// Files skipped because destination and receipt already matched.
    pub skipped_validated: usize,
    /// Files skipped for exceeding the size limit.
    pub skipped_too_big: usize,
    /// Entries skipped for an unrecognized kind.
    pub skipped_unknown: usize,
    /// Files that failed and were left for a later run.
    pub failed: usize,
    /// Subtrees dropped because their listing could not be fetched.
    pub skipped_subtrees: usize,
}

/// Drives walker and syncer until the root listing is exhausted.
pub struct SyncSession {
    config: SyncConfig,
    cache: ResponseCache,
}

impl SyncSession {
    /// Creates a session for `config`, opening the share's listing cache.
    pub fn new(config: SyncConfig) -> Self {
        let cache_path = config.cache_dir.join(cache_file_name(&config.public_url));
        let cache = ResponseCache::load(cache_path);
        Self { config, cache }
    }

    /// Runs the sync to completion.
    ///
    /// Loops root pages at an offset that advances by one per processed
    /// file, handing every discovered file to the syncer in listing order,
    /// and stops normally on the first page that yields zero files. Per-file
    /// failures and unlistable subtrees are tallied in the report, never
    /// propagated.
    pub async fn run(&mut self) -> Result<SyncReport, SyncError> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let pb = if atty::is(atty::Stream::Stderr) {
            let pb = indicatif::ProgressBar::new(0);
            pb.set_style(
                indicatif::ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
                    .unwrap()
                    .progress_chars("█▓▒░ "),
            );
            pb
        } else {
            indicatif::ProgressBar::hidden()
        };

        let syncer = FileSyncer::new(&self.config, pb.clone());
        let mut report = SyncReport::default();
        let mut offset = 0u64;
        let mut processed = 0u64;

        loop {
            debug!("Current offset: {}", offset);

            let mut walker = ListingWalker::new(&self.config, &mut self.cache);
            let (files, found) = walker.list(offset, "/", &self.config.output_dir).await;
            report.skipped_subtrees += walker.skipped_subtrees;

            if files.is_empty() {
                info!("Listing exhausted, sync complete");
                break;
            }

            report.discovered += found;
            pb.set_length(report.discovered as u64);

            for file in &files {
                match syncer.sync(file).await {
                    SyncOutcome::Downloaded => report.downloaded += 1,
                    SyncOutcome::SkippedValidated => report.skipped_validated += 1,
                    SyncOutcome::SkippedTooBig => report.skipped_too_big += 1,
                    SyncOutcome::SkippedUnknown => report.skipped_unknown += 1,
                    SyncOutcome::Failed(_) => report.failed += 1,
                }
                processed += 1;
                offset += 1;
                pb.set_position(processed);
            }
        }

        pb.finish_and_clear();
        Ok(report)
    }
}
