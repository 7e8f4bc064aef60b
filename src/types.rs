//! Data structures for share mirroring.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Public resources endpoint of the Yandex Disk REST API.
pub const DEFAULT_API_BASE: &str = "https://cloud-api.yandex.net/v1/disk/public/resources";

/// Configuration for mirroring a public share.
///
/// # Example
///
/// ```
/// use sharesync::SyncConfig;
///
/// let config = SyncConfig {
///     public_url: "https://disk.example.com/d/token123".to_string(),
///     size_limit: 512 * 1024 * 1024, // refuse files over 512 MiB
///     ..SyncConfig::default()
/// };
/// ```
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Base URL of the paginated listing API.
    pub api_base: String,
    /// Public URL of the share to mirror.
    pub public_url: String,
    /// Directory the mirrored tree is rooted under (default: `"."`).
    pub output_dir: PathBuf,
    /// Directory the listing cache file is written to (default: `"."`).
    pub cache_dir: PathBuf,
    /// Largest file to download, in bytes (default: 2 GiB).
    ///
    /// Files whose declared `content-length` exceeds this are skipped before
    /// any bytes are written, so an unattended batch run cannot be stalled by
    /// a surprise multi-gigabyte download.
    pub size_limit: u64,
    /// Read chunk size used when re-hashing local files, in bytes (default: 4 KiB).
    pub hash_chunk_size: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            public_url: String::new(),
            output_dir: PathBuf::from("."),
            cache_dir: PathBuf::from("."),
            size_limit: 2 * 1024 * 1024 * 1024,
            hash_chunk_size: 4 * 1024,
        }
    }
}

/// Kind of a remote listing entry.
///
/// Anything the API reports that is not a plain file or directory decodes to
/// `Unknown` and is skipped by the walker.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    File,
    Dir,
    #[serde(other)]
    #[default]
    Unknown,
}

/// One entry of a listing page.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct RemoteItem {
    /// Display name of the entry.
    pub name: String,
    /// Entry kind (`file`, `dir`, or anything else).
    #[serde(rename = "type", default)]
    pub kind: ItemKind,
    /// Remote path, used to paginate a directory's own children.
    #[serde(default)]
    pub path: String,
    /// Direct download URL, present for files only.
    #[serde(default)]
    pub file: Option<String>,
    /// Expected content checksum, present for files only.
    #[serde(default)]
    pub md5: Option<String>,
}

/// Embedded children of a listing response.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Embedded {
    /// Child entries in the order the API returned them. Page order is
    /// authoritative; nothing re-sorts this.
    #[serde(default)]
    pub items: Vec<RemoteItem>,
}

/// One decoded page of the remote directory listing.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ListingResponse {
    /// Name of the listed directory.
    pub name: String,
    /// Children of this page.
    #[serde(rename = "_embedded", default)]
    pub embedded: Embedded,
}

/// A remote file bound to its resolved local destination.
///
/// The destination's parent directory always exists by the time a descriptor
/// is handed to [`FileSyncer`](crate::FileSyncer); the walker creates
/// directories parent-before-child during the traversal.
#[derive(Debug, Clone)]
pub struct FileDescriptor {
    /// Display name of the file.
    pub name: String,
    /// Entry kind as reported by the listing.
    pub kind: ItemKind,
    /// Direct download URL.
    pub download_url: Option<String>,
    /// Checksum declared by the listing.
    pub md5: Option<String>,
    /// Local destination path.
    pub dest: PathBuf,
}

impl FileDescriptor {
    /// Binds a listing entry to a destination inside `local_dir`.
    pub fn new(item: RemoteItem, local_dir: &Path) -> Self {
        Self {
            dest: local_dir.join(&item.name),
            name: item.name,
            kind: item.kind,
            download_url: item.file,
            md5: item.md5,
        }
    }
}
