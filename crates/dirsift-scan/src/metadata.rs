//! Per-file metadata extraction and classification.

use std::path::{Path, PathBuf};

use compact_str::{CompactString, format_compact};
use thiserror::Error;

use dirsift_core::{Classifier, ContentHash, FileFlags, FileRecord, NodeId, Timestamps};

/// File metadata could not be read.
#[derive(Debug, Error)]
#[error("Cannot read metadata for {path}: {source}")]
pub struct MetadataError {
    /// File that failed.
    pub path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    pub source: std::io::Error,
}

/// Everything known about a file before it gets an id and a digest.
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetadata {
    /// File name (not full path).
    pub name: CompactString,
    /// Full path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Modification and creation times.
    pub timestamps: Timestamps,
    /// Lower-cased extension with leading dot, or empty.
    pub extension: CompactString,
    /// Flags derived from size and age.
    pub flags: FileFlags,
}

impl FileMetadata {
    /// Turn into a record for node `id`.
    pub fn into_record(self, id: NodeId, digest: Option<ContentHash>) -> FileRecord {
        FileRecord {
            id,
            name: self.name,
            path: self.path,
            size: self.size,
            timestamps: self.timestamps,
            extension: self.extension,
            digest,
            flags: self.flags,
        }
    }
}

/// Reads size and timestamps for a path and applies the classifier.
#[derive(Debug, Clone, Copy)]
pub struct MetadataExtractor {
    classifier: Classifier,
}

impl MetadataExtractor {
    /// Create an extractor using `classifier` for all files.
    pub fn new(classifier: Classifier) -> Self {
        Self { classifier }
    }

    /// The classifier applied to every file.
    pub fn classifier(&self) -> &Classifier {
        &self.classifier
    }

    /// Stat `path` and derive its flags.
    pub fn extract(&self, path: &Path) -> Result<FileMetadata, MetadataError> {
        let wrap = |source| MetadataError {
            path: path.to_path_buf(),
            source,
        };

        let metadata = std::fs::metadata(path).map_err(wrap)?;
        let modified = metadata.modified().map_err(wrap)?;
        let size = metadata.len();

        Ok(FileMetadata {
            name: file_name(path),
            path: path.to_path_buf(),
            size,
            timestamps: Timestamps::new(modified, metadata.created().ok()),
            extension: extension_of(path),
            flags: self.classifier.classify(size, modified),
        })
    }
}

/// Base name of `path`, falling back to the whole path.
pub(crate) fn file_name(path: &Path) -> CompactString {
    path.file_name()
        .map(|n| CompactString::new(n.to_string_lossy()))
        .unwrap_or_else(|| CompactString::new(path.to_string_lossy()))
}

/// Lower-cased extension including the dot; empty when there is none.
///
/// Leading dots of hidden files do not start an extension.
pub fn extension_of(path: &Path) -> CompactString {
    match path.extension() {
        Some(ext) => format_compact!(".{}", ext.to_string_lossy().to_lowercase()),
        None => CompactString::default(),
    }
}
