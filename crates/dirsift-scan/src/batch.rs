//! Batched hashing and classification of the files in one directory.

use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use dirsift_core::{ContentHash, FileNode, FileTree, NodeId, ScanWarning};

use crate::digest::{DigestEngine, DigestError};
use crate::index::{DuplicateIndex, Observation};
use crate::metadata::{FileMetadata, MetadataError, MetadataExtractor};

/// What one flushed batch added to the tree.
#[derive(Debug, Default)]
pub struct BatchOutcome {
    /// Ids of the file nodes created, in batch order.
    pub files: Vec<NodeId>,
    /// Bytes across the created files.
    pub bytes: u64,
    /// Recovered per-file failures.
    pub warnings: Vec<ScanWarning>,
}

/// Turns a batch of file paths into file nodes under one directory.
#[derive(Debug, Clone, Copy)]
pub struct BatchHasher {
    digest: DigestEngine,
    metadata: MetadataExtractor,
    parallel: bool,
}

impl BatchHasher {
    /// Create a hasher; with `parallel`, the I/O of one batch runs on the
    /// rayon pool.
    pub fn new(digest: DigestEngine, metadata: MetadataExtractor, parallel: bool) -> Self {
        Self {
            digest,
            metadata,
            parallel,
        }
    }

    /// Hash, stat and attach every path in `batch` to directory `parent`.
    ///
    /// Files are added in batch order whatever the I/O mode, so node ids and
    /// the choice of duplicate originals are the same in both modes. A file
    /// whose metadata cannot be read is left out entirely; a file that cannot
    /// be hashed is kept without a digest.
    pub fn process(
        &self,
        batch: &[PathBuf],
        parent: NodeId,
        tree: &mut FileTree,
        index: &DuplicateIndex,
    ) -> BatchOutcome {
        debug!(parent = %parent, files = batch.len(), "flushing batch");

        let probes: Vec<Probe> = if self.parallel {
            batch.par_iter().map(|path| self.probe(path)).collect()
        } else {
            batch.iter().map(|path| self.probe(path)).collect()
        };

        let mut outcome = BatchOutcome::default();
        for probe in probes {
            let (metadata, digest) = match probe {
                Probe::Stated { metadata, digest } => (metadata, digest),
                Probe::Unreadable(err) => {
                    warn!(path = %err.path.display(), error = %err.source, "skipping file");
                    outcome.warnings.push(ScanWarning::metadata(&err.path, &err.source));
                    continue;
                }
            };

            let digest = match digest {
                Ok(digest) => Some(digest),
                Err(err) => {
                    warn!(path = %err.path.display(), error = %err.source, "hash failed");
                    outcome.warnings.push(ScanWarning::hash(&err.path, &err.source));
                    None
                }
            };

            let size = metadata.size;
            let id = tree.insert_with(|id| FileNode::new_file(metadata.into_record(id, digest)));
            if let Observation::Duplicate { original } = index.observe(id, digest) {
                mark_duplicate(tree, id);
                mark_duplicate(tree, original);
            }
            tree.attach(parent, id);

            outcome.files.push(id);
            outcome.bytes += size;
        }
        outcome
    }

    /// Stat first; content is only read for files that will be kept.
    fn probe(&self, path: &Path) -> Probe {
        match self.metadata.extract(path) {
            Ok(metadata) => Probe::Stated {
                metadata,
                digest: self.digest.digest(path),
            },
            Err(err) => Probe::Unreadable(err),
        }
    }
}

/// Raw I/O results for one path.
enum Probe {
    Stated {
        metadata: FileMetadata,
        digest: Result<ContentHash, DigestError>,
    },
    Unreadable(MetadataError),
}

fn mark_duplicate(tree: &mut FileTree, id: NodeId) {
    if let Some(record) = tree.record_mut(id) {
        record.flags.is_duplicate = true;
    }
}
