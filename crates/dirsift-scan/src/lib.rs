//! Directory scanning engine for dirsift.
//!
//! This crate walks a directory subtree, gives every file and directory a
//! scan-scoped id, hashes file content to find duplicates and classifies
//! each file as stale, large or empty.
//!
//! # Overview
//!
//! - **Tree walker** visits directories depth-first and never follows
//!   symbolic links
//! - **Batch hasher** processes regular files in bounded batches
//!   (optionally on the rayon pool)
//! - **Duplicate index** flags every file that shares a BLAKE3 digest
//! - **Progress updates** via a broadcast channel
//!
//! Only a missing or unreadable root aborts a scan. Unreadable
//! subdirectories, files that cannot be stat'ed and files that cannot be
//! read are reported as warnings and the walk carries on.
//!
//! # Example
//!
//! ```rust,no_run
//! use dirsift_scan::{ScanConfig, TreeScanner};
//!
//! let config = ScanConfig::new("/path/to/scan");
//! let result = TreeScanner::new().scan(&config).unwrap();
//!
//! println!("Files: {}", result.file_count);
//! for file in result.all_files.iter().filter(|f| f.flags.is_duplicate) {
//!     println!("duplicate: {}", file.path.display());
//! }
//! ```
//!
//! # Progress Monitoring
//!
//! ```rust,no_run
//! use dirsift_scan::{ScanConfig, TreeScanner};
//!
//! let scanner = TreeScanner::new();
//! let mut progress_rx = scanner.subscribe();
//!
//! std::thread::spawn(move || {
//!     while let Ok(progress) = progress_rx.blocking_recv() {
//!         eprintln!("Scanned {} files", progress.files_scanned);
//!     }
//! });
//! ```

use std::path::Path;

mod batch;
mod digest;
mod index;
mod metadata;
mod progress;
mod walker;

pub use batch::{BatchHasher, BatchOutcome};
pub use digest::{DigestEngine, DigestError};
pub use index::{DuplicateIndex, Observation};
pub use metadata::{FileMetadata, MetadataError, MetadataExtractor, extension_of};
pub use progress::ScanProgress;
pub use walker::{CancelHandle, TreeScanner};

// Re-export core types for convenience
pub use dirsift_core::{
    ContentHash, FileFlags, FileNode, FileRecord, FileTree, NodeId, NodeKind, ScanConfig,
    ScanError, ScanResult, ScanWarning, Timestamps, WarningKind,
};

/// Scan `root` with default batch size and thresholds.
pub fn scan(root: impl AsRef<Path>) -> Result<ScanResult, ScanError> {
    TreeScanner::new().scan(&ScanConfig::new(root.as_ref()))
}
