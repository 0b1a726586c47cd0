//! Scan configuration types.

use std::path::PathBuf;
use std::time::SystemTime;

use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::classify::{Classifier, DEFAULT_LARGE_FILE_THRESHOLD, DEFAULT_STALE_AFTER_YEARS};
use crate::error::ScanError;

/// Default number of files hashed per batch.
pub const DEFAULT_BATCH_SIZE: usize = 10;

/// Default read size when streaming file content into the digest.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Configuration for scanning operations.
#[derive(Debug, Clone, Builder, Serialize, Deserialize)]
#[builder(setter(into), build_fn(validate = "Self::validate"))]
pub struct ScanConfig {
    /// Root path to scan.
    pub root: PathBuf,

    /// Files hashed per batch.
    #[builder(default = "DEFAULT_BATCH_SIZE")]
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Files untouched for more than this many years are flagged old.
    #[builder(default = "DEFAULT_STALE_AFTER_YEARS")]
    #[serde(default = "default_stale_after_years")]
    pub stale_after_years: u32,

    /// Files strictly larger than this many bytes are flagged large.
    #[builder(default = "DEFAULT_LARGE_FILE_THRESHOLD")]
    #[serde(default = "default_large_file_threshold")]
    pub large_file_threshold: u64,

    /// Hash the files of one batch on the rayon pool.
    #[builder(default = "false")]
    #[serde(default)]
    pub parallel_hashing: bool,

    /// Read size used when streaming file content into the digest.
    #[builder(default = "DEFAULT_CHUNK_SIZE")]
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
}

fn default_batch_size() -> usize {
    DEFAULT_BATCH_SIZE
}

fn default_stale_after_years() -> u32 {
    DEFAULT_STALE_AFTER_YEARS
}

fn default_large_file_threshold() -> u64 {
    DEFAULT_LARGE_FILE_THRESHOLD
}

fn default_chunk_size() -> usize {
    DEFAULT_CHUNK_SIZE
}

impl ScanConfigBuilder {
    fn validate(&self) -> Result<(), String> {
        if let Some(ref root) = self.root {
            if root.as_os_str().is_empty() {
                return Err("Root path cannot be empty".to_string());
            }
        } else {
            return Err("Root path is required".to_string());
        }
        if self.batch_size == Some(0) {
            return Err("Batch size must be at least 1".to_string());
        }
        if self.chunk_size == Some(0) {
            return Err("Chunk size must be at least 1".to_string());
        }
        Ok(())
    }
}

impl ScanConfig {
    /// Create a new scan config builder.
    pub fn builder() -> ScanConfigBuilder {
        ScanConfigBuilder::default()
    }

    /// Create a config with default thresholds for scanning a path.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            batch_size: DEFAULT_BATCH_SIZE,
            stale_after_years: DEFAULT_STALE_AFTER_YEARS,
            large_file_threshold: DEFAULT_LARGE_FILE_THRESHOLD,
            parallel_hashing: false,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Batch size, never below one.
    pub fn effective_batch_size(&self) -> usize {
        self.batch_size.max(1)
    }

    /// Build the classifier for a scan starting at `reference_time`.
    pub fn classifier(&self, reference_time: SystemTime) -> Classifier {
        Classifier::new(
            reference_time,
            self.stale_after_years,
            self.large_file_threshold,
        )
    }
}

impl From<ScanConfigBuilderError> for ScanError {
    fn from(err: ScanConfigBuilderError) -> Self {
        ScanError::InvalidConfig {
            message: err.to_string(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self::new(".")
    }
}
