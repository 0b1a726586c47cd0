//! Depth-first directory walker that builds the file tree.

use std::fs::{self, ReadDir};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Instant, SystemTime};

use compact_str::CompactString;
use tokio::sync::broadcast;
use tracing::{debug, info, trace, warn};

use dirsift_core::{
    FileNode, FileTree, NodeId, ScanConfig, ScanError, ScanResult, ScanWarning, WarningKind,
};

use crate::batch::BatchHasher;
use crate::digest::DigestEngine;
use crate::index::DuplicateIndex;
use crate::metadata::{MetadataExtractor, file_name};
use crate::progress::{ProgressTracker, ScanProgress};

/// Shared flag used to abandon an in-flight scan.
#[derive(Debug, Clone, Default)]
pub struct CancelHandle(Arc<AtomicBool>);

impl CancelHandle {
    /// Ask the scan to stop at the next entry or batch.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    /// Whether cancellation was requested.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    /// Clear a previous cancellation so the scanner can be reused.
    pub fn reset(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Sequential tree scanner with batched hashing.
pub struct TreeScanner {
    progress_tx: broadcast::Sender<ScanProgress>,
    cancel: CancelHandle,
}

impl TreeScanner {
    /// Create a new scanner.
    pub fn new() -> Self {
        let (progress_tx, _) = broadcast::channel(100);
        Self {
            progress_tx,
            cancel: CancelHandle::default(),
        }
    }

    /// Subscribe to scan progress updates.
    pub fn subscribe(&self) -> broadcast::Receiver<ScanProgress> {
        self.progress_tx.subscribe()
    }

    /// Handle that cancels scans run by this scanner.
    pub fn cancel_handle(&self) -> CancelHandle {
        self.cancel.clone()
    }

    /// Perform a scan of the configured root.
    ///
    /// Fails only when the root cannot be opened as a directory or the scan
    /// is cancelled; everything below the root is recovered and reported
    /// through [`ScanResult::warnings`].
    pub fn scan(&self, config: &ScanConfig) -> Result<ScanResult, ScanError> {
        let start = Instant::now();
        let scanned_at = SystemTime::now();

        let root_path = config
            .root
            .canonicalize()
            .map_err(|e| ScanError::io(&config.root, e))?;
        let root_metadata = fs::metadata(&root_path).map_err(|e| ScanError::io(&root_path, e))?;
        if !root_metadata.is_dir() {
            return Err(ScanError::NotADirectory { path: root_path });
        }
        let entries = fs::read_dir(&root_path).map_err(|e| ScanError::io(&root_path, e))?;

        let classifier = config.classifier(scanned_at);
        let hasher = BatchHasher::new(
            DigestEngine::new(config.chunk_size),
            MetadataExtractor::new(classifier),
            config.parallel_hashing,
        );

        let mut walk = Walk {
            tree: FileTree::new(file_name(&root_path), &root_path),
            index: DuplicateIndex::new(),
            hasher,
            batch_size: config.effective_batch_size(),
            file_order: Vec::new(),
            warnings: Vec::new(),
            tracker: ProgressTracker::new(start),
            progress_tx: &self.progress_tx,
            cancel: &self.cancel,
        };

        debug!(path = %root_path.display(), "entering directory");
        walk.tracker.record_dir();
        let root_id = walk.tree.root().id;
        walk.visit_entries(root_id, &root_path, entries)?;

        let elapsed = start.elapsed();
        info!(
            root = %root_path.display(),
            files = walk.tracker.files_scanned(),
            dirs = walk.tracker.dirs_scanned(),
            warnings = walk.warnings.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "scan complete"
        );

        Ok(ScanResult::new(
            root_path,
            walk.tree,
            &walk.file_order,
            scanned_at,
            elapsed,
            walk.warnings,
        ))
    }

    /// Scan `path` with default settings.
    pub fn scan_path(&self, path: impl Into<PathBuf>) -> Result<ScanResult, ScanError> {
        self.scan(&ScanConfig::new(path))
    }
}

impl Default for TreeScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable state of one scan.
struct Walk<'a> {
    tree: FileTree,
    index: DuplicateIndex,
    hasher: BatchHasher,
    batch_size: usize,
    file_order: Vec<NodeId>,
    warnings: Vec<ScanWarning>,
    tracker: ProgressTracker,
    progress_tx: &'a broadcast::Sender<ScanProgress>,
    cancel: &'a CancelHandle,
}

impl Walk<'_> {
    /// List and process a directory below the root.
    ///
    /// A directory that cannot be listed keeps its node with no children.
    fn visit_dir(&mut self, dir: NodeId, path: &Path) -> Result<(), ScanError> {
        debug!(path = %path.display(), "entering directory");
        self.tracker.record_dir();
        match fs::read_dir(path) {
            Ok(entries) => self.visit_entries(dir, path, entries),
            Err(err) => {
                self.warn(ScanWarning::directory_access(path, &err));
                Ok(())
            }
        }
    }

    /// Recurse into subdirectories as they are met; batch regular files.
    fn visit_entries(&mut self, dir: NodeId, path: &Path, entries: ReadDir) -> Result<(), ScanError> {
        let mut pending: Vec<PathBuf> = Vec::with_capacity(self.batch_size);

        for entry in entries {
            self.check_cancelled()?;

            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    self.warn(ScanWarning::new(path, err.to_string(), WarningKind::Entry));
                    continue;
                }
            };
            let entry_path = entry.path();
            // Does not follow symlinks.
            let file_type = match entry.file_type() {
                Ok(file_type) => file_type,
                Err(err) => {
                    self.warn(ScanWarning::new(&entry_path, err.to_string(), WarningKind::Entry));
                    continue;
                }
            };

            if file_type.is_dir() {
                let name = CompactString::new(entry.file_name().to_string_lossy());
                let child = self
                    .tree
                    .insert_with(|id| FileNode::new_directory(id, name, &entry_path));
                self.visit_dir(child, &entry_path)?;
                self.tree.attach(dir, child);
            } else if file_type.is_file() {
                pending.push(entry_path);
                if pending.len() >= self.batch_size {
                    self.flush(dir, path, &mut pending)?;
                }
            } else {
                trace!(path = %entry_path.display(), "ignoring special file or symlink");
            }
        }

        if !pending.is_empty() {
            self.flush(dir, path, &mut pending)?;
        }
        Ok(())
    }

    fn flush(&mut self, dir: NodeId, path: &Path, pending: &mut Vec<PathBuf>) -> Result<(), ScanError> {
        self.check_cancelled()?;

        let outcome = self
            .hasher
            .process(pending, dir, &mut self.tree, &self.index);
        pending.clear();

        self.tracker.record_files(outcome.files.len(), outcome.bytes);
        self.tracker.record_errors(outcome.warnings.len());
        self.file_order.extend(outcome.files);
        self.warnings.extend(outcome.warnings);

        let _ = self.progress_tx.send(self.tracker.snapshot(path));
        Ok(())
    }

    fn warn(&mut self, warning: ScanWarning) {
        warn!(path = %warning.path.display(), kind = ?warning.kind, "{}", warning.message);
        self.tracker.record_errors(1);
        self.warnings.push(warning);
    }

    fn check_cancelled(&self) -> Result<(), ScanError> {
        if self.cancel.is_cancelled() {
            return Err(ScanError::Interrupted);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn create_test_tree() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::create_dir(root.join("dir1")).unwrap();
        fs::create_dir(root.join("dir2")).unwrap();
        fs::create_dir(root.join("dir1/subdir")).unwrap();

        fs::write(root.join("file1.txt"), "hello").unwrap();
        fs::write(root.join("dir1/file2.txt"), "world world world").unwrap();
        fs::write(root.join("dir1/subdir/file3.txt"), "test").unwrap();
        fs::write(root.join("dir2/file4.txt"), "another file here").unwrap();

        temp
    }

    #[test]
    fn test_basic_scan() {
        let temp = create_test_tree();
        let result = TreeScanner::new().scan_path(temp.path()).unwrap();

        assert_eq!(result.file_count, 4);
        assert_eq!(result.dir_count, 4);
        assert_eq!(result.tree.file_count(), 4);
        assert!(result.warnings.is_empty());
        assert_eq!(result.total_size(), 5 + 17 + 4 + 17);
    }

    #[test]
    fn test_ids_unique_and_match_arena() {
        let temp = create_test_tree();
        let result = TreeScanner::new().scan_path(temp.path()).unwrap();

        let mut ids: Vec<u64> = result.tree.walk().map(|n| n.id.0).collect();
        ids.sort_unstable();
        let expected: Vec<u64> = (0..result.tree.len() as u64).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_directory_ids_precede_descendants() {
        let temp = create_test_tree();
        let result = TreeScanner::new().scan_path(temp.path()).unwrap();

        for node in result.tree.walk() {
            for child in result.tree.children(node.id) {
                assert!(child.id > node.id);
            }
        }
    }

    #[test]
    fn test_missing_root_fails() {
        let temp = TempDir::new().unwrap();
        let err = TreeScanner::new()
            .scan_path(temp.path().join("nope"))
            .unwrap_err();
        assert!(matches!(err, ScanError::NotFound { .. }));
    }

    #[test]
    fn test_file_root_fails() {
        let temp = TempDir::new().unwrap();
        let file = temp.path().join("file.txt");
        fs::write(&file, "x").unwrap();
        let err = TreeScanner::new().scan_path(&file).unwrap_err();
        assert!(matches!(err, ScanError::NotADirectory { .. }));
    }

    #[test]
    fn test_cancelled_scan_returns_no_tree() {
        let temp = create_test_tree();
        let scanner = TreeScanner::new();
        scanner.cancel_handle().cancel();

        let err = scanner.scan_path(temp.path()).unwrap_err();
        assert!(matches!(err, ScanError::Interrupted));

        scanner.cancel_handle().reset();
        assert!(scanner.scan_path(temp.path()).is_ok());
    }

    #[test]
    fn test_progress_is_published() {
        let temp = create_test_tree();
        let scanner = TreeScanner::new();
        let mut rx = scanner.subscribe();

        scanner.scan_path(temp.path()).unwrap();

        let mut last = None;
        while let Ok(progress) = rx.try_recv() {
            last = Some(progress);
        }
        let last = last.unwrap();
        assert_eq!(last.files_scanned, 4);
        assert_eq!(last.bytes_scanned, 5 + 17 + 4 + 17);
    }
}
