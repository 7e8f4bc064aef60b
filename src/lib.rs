//! ShareSync - mirror public cloud share folders to local disk
//!
//! This library walks a publicly shared folder tree exposed through a
//! paginated listing API, downloads every file it finds and skips files
//! already downloaded and verified by checksum, making repeated runs cheap
//! and interrupted runs resumable.
//!
//! # Features
//!
//! - **Idempotent Mirroring**: files with a matching checksum receipt are
//!   never transferred again
//! - **Resumable Runs**: a half-written file has no receipt and is simply
//!   redownloaded on the next run
//! - **Listing Cache**: decoded listing pages persist across runs, so a
//!   re-run can walk the whole tree without network calls
//! - **Fault Containment**: a subtree whose listing fails is skipped and
//!   counted; one bad file never aborts the batch
//! - **Size Ceiling**: files over a configurable limit are skipped before a
//!   single byte is written
//!
//! # Example
//!
//! ```no_run
//! use sharesync::{SyncConfig, SyncSession};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = SyncConfig {
//!     public_url: "https://disk.example.com/d/token123".to_string(),
//!     ..SyncConfig::default()
//! };
//!
//! let mut session = SyncSession::new(config);
//! let report = session.run().await?;
//! println!("{} files downloaded", report.downloaded);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod error;
pub mod session;
pub mod syncer;
pub mod types;
pub mod walker;

pub use cache::ResponseCache;
pub use error::SyncError;
pub use session::{SyncReport, SyncSession};
pub use syncer::{FileSyncer, SyncOutcome};
pub use types::{
    Embedded, FileDescriptor, ItemKind, ListingResponse, RemoteItem, SyncConfig, DEFAULT_API_BASE,
};
pub use walker::ListingWalker;
