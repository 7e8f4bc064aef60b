//! Per-file download, verification and receipt handling.

use crate::error::SyncError;
use crate::types::{FileDescriptor, ItemKind, SyncConfig};
use futures_util::StreamExt;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};

/// Terminal outcome of syncing one file.
///
/// Every file ends in exactly one of these; nothing escapes the per-file
/// boundary as an error, so one bad file never aborts the batch.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The file was streamed to disk and its receipt written.
    Downloaded,
    /// Destination and receipt were present and the recomputed checksum
    /// matched; no bytes were transferred.
    SkippedValidated,
    /// The declared content length exceeded the configured size limit; the
    /// destination was never created.
    SkippedTooBig,
    /// The listing reported an unrecognized entry kind; no I/O performed.
    SkippedUnknown,
    /// Any other failure (network, disk, missing URL), contained and logged.
    Failed(SyncError),
}

/// Downloads single files with checksum-based skip detection.
pub struct FileSyncer<'a> {
    config: &'a SyncConfig,
    client: reqwest::Client,
    pb: indicatif::ProgressBar,
}

impl<'a> FileSyncer<'a> {
    pub fn new(config: &'a SyncConfig, pb: indicatif::ProgressBar) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
            pb,
        }
    }

    /// Syncs one file and reports how it ended.
    ///
    /// An existing destination is trusted only when its sidecar receipt
    /// matches the recomputed content hash; anything else falls through to a
    /// fresh download. The receipt is written last, so an interrupted
    /// transfer leaves a truncated file that the next run redownloads.
    pub async fn sync(&self, file: &FileDescriptor) -> SyncOutcome {
        if file.kind != ItemKind::File {
            warn!("Unknown entry kind for {}, skipping", file.name);
            return SyncOutcome::SkippedUnknown;
        }

        let outcome = match self.try_sync(file).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Cannot download {}: {}", file.name, e);
                SyncOutcome::Failed(e)
            }
        };

        match &outcome {
            SyncOutcome::Downloaded => {
                info!("✅ {} downloaded", file.dest.display());
            }
            SyncOutcome::SkippedValidated => {
                info!("{} already downloaded, checksum ok", file.dest.display());
            }
            SyncOutcome::SkippedTooBig => {
                info!("{} exceeds the size limit, skipping", file.dest.display());
            }
            SyncOutcome::SkippedUnknown | SyncOutcome::Failed(_) => {}
        }

        outcome
    }

    async fn try_sync(&self, file: &FileDescriptor) -> Result<SyncOutcome, SyncError> {
        if self.validate_existing(file).await? {
            return Ok(SyncOutcome::SkippedValidated);
        }
        self.download(file).await
    }

    /// Returns true when the destination exists and its recomputed hash
    /// matches the receipt written by a previous successful download.
    async fn validate_existing(&self, file: &FileDescriptor) -> Result<bool, SyncError> {
        if !file.dest.exists() {
            return Ok(false);
        }

        let receipt = receipt_path(&file.dest);
        if !receipt.exists() {
            info!(
                "{} found without checksum receipt, redownloading",
                file.dest.display()
            );
            return Ok(false);
        }

        info!("{} checking checksum", file.dest.display());
        let expected = tokio::fs::read_to_string(&receipt).await?;
        let actual = compute_file_md5(&file.dest, self.config.hash_chunk_size).await?;

        if actual == expected.trim() {
            Ok(true)
        } else {
            info!(
                "{} already downloaded, but checksum differs, redownloading",
                file.dest.display()
            );
            Ok(false)
        }
    }

    async fn download(&self, file: &FileDescriptor) -> Result<SyncOutcome, SyncError> {
        let url = file.download_url.as_deref().ok_or_else(|| {
            SyncError::DownloadFailed(format!("no download URL for {}", file.name))
        })?;

        info!("Start download: {}", file.dest.display());
        let response = self.client.get(url).send().await?.error_for_status()?;

        let total = response.content_length().ok_or_else(|| {
            SyncError::DownloadFailed(format!("missing content-length for {}", file.name))
        })?;

        // The size check runs before the destination is created, so an
        // oversized file never touches disk.
        if total > self.config.size_limit {
            return Ok(SyncOutcome::SkippedTooBig);
        }

        let mut out = tokio::fs::File::create(&file.dest).await?;
        let mut byte_stream = response.bytes_stream();
        let mut downloaded = 0u64;

        while let Some(piece) = byte_stream.next().await {
            let chunk = piece?;
            out.write_all(&chunk).await?;
            // Flush per chunk: a crash mid-transfer must leave a truncated
            // file, never a buffered illusion of one.
            out.flush().await?;
            downloaded += chunk.len() as u64;
            self.pb.set_message(format!(
                "⬇️  {}: {:.2}/{:.2} MB",
                file.name,
                mb(downloaded),
                mb(total)
            ));
        }

        if downloaded != total {
            return Err(SyncError::DownloadFailed(format!(
                "size mismatch for {}: expected {} bytes, got {}",
                file.name, total, downloaded
            )));
        }

        // The receipt records the listing-declared checksum, not a local
        // recomputation; the next run's validation is what actually proves
        // the bytes on disk match it.
        let receipt = receipt_path(&file.dest);
        tokio::fs::write(&receipt, file.md5.as_deref().unwrap_or_default()).await?;

        Ok(SyncOutcome::Downloaded)
    }
}

fn mb(bytes: u64) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

/// Path of the sidecar receipt for a destination file (`X` -> `X.md5`).
pub(crate) fn receipt_path(dest: &Path) -> PathBuf {
    let mut os = dest.as_os_str().to_os_string();
    os.push(".md5");
    PathBuf::from(os)
}

/// Computes the MD5 hash of a local file.
///
/// Reads the file in `chunk_size` pieces inside a blocking task so large
/// files neither fill memory nor stall the async runtime.
pub(crate) async fn compute_file_md5(
    path: &Path,
    chunk_size: usize,
) -> Result<String, SyncError> {
    let path = path.to_path_buf();

    tokio::task::spawn_blocking(move || {
        use md5::{Digest, Md5};
        use std::io::Read;

        let file = std::fs::File::open(&path).map_err(SyncError::IoError)?;
        let mut reader = std::io::BufReader::new(file);
        let mut hasher = Md5::new();
        let mut buffer = vec![0u8; chunk_size.max(1)];

        loop {
            let n = reader.read(&mut buffer).map_err(SyncError::IoError)?;
            if n == 0 {
                break;
            }
            hasher.update(&buffer[..n]);
        }

        Ok(format!("{:x}", hasher.finalize()))
    })
    .await
    .map_err(|e| SyncError::IoError(std::io::Error::other(format!("Task join error: {}", e))))?
}
