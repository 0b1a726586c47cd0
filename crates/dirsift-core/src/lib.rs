//! Core types for dirsift.
//!
//! This crate provides the data structures shared by the scanner and the
//! analysis layer: file and directory nodes, the flat file records, the
//! arena-backed tree, scan configuration and classification policy.

mod classify;
mod config;
mod error;
mod node;
mod tree;

pub use classify::{
    Classifier, DAYS_PER_YEAR, DEFAULT_LARGE_FILE_THRESHOLD, DEFAULT_STALE_AFTER_YEARS,
};
pub use config::{
    DEFAULT_BATCH_SIZE, DEFAULT_CHUNK_SIZE, ScanConfig, ScanConfigBuilder, ScanConfigBuilderError,
};
pub use error::{ScanError, ScanWarning, WarningKind};
pub use node::{ContentHash, FileFlags, FileNode, FileRecord, NodeId, NodeKind, Timestamps};
pub use tree::{FileTree, Preorder, ScanResult};
