//! Scan progress reporting.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Progress information during a scan.
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Number of files recorded so far.
    pub files_scanned: u64,
    /// Number of directories entered so far.
    pub dirs_scanned: u64,
    /// Total bytes of recorded files so far.
    pub bytes_scanned: u64,
    /// Directory whose batch was flushed last.
    pub current_path: PathBuf,
    /// Number of warnings encountered.
    pub errors_count: u64,
    /// Time elapsed since scan started.
    pub elapsed: Duration,
}

impl ScanProgress {
    /// Create initial progress state.
    pub fn new() -> Self {
        Self {
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            current_path: PathBuf::new(),
            errors_count: 0,
            elapsed: Duration::ZERO,
        }
    }

    /// Calculate scan rate in files per second.
    pub fn files_per_second(&self) -> f64 {
        if self.elapsed.as_secs_f64() > 0.0 {
            self.files_scanned as f64 / self.elapsed.as_secs_f64()
        } else {
            0.0
        }
    }

    /// Get total items scanned (files + dirs).
    pub fn total_items(&self) -> u64 {
        self.files_scanned + self.dirs_scanned
    }
}

impl Default for ScanProgress {
    fn default() -> Self {
        Self::new()
    }
}

/// Running counters for one scan.
#[derive(Debug)]
pub(crate) struct ProgressTracker {
    start_time: Instant,
    files_scanned: u64,
    dirs_scanned: u64,
    bytes_scanned: u64,
    errors_count: u64,
}

impl ProgressTracker {
    pub fn new(start_time: Instant) -> Self {
        Self {
            start_time,
            files_scanned: 0,
            dirs_scanned: 0,
            bytes_scanned: 0,
            errors_count: 0,
        }
    }

    pub fn record_files(&mut self, count: usize, bytes: u64) {
        self.files_scanned += count as u64;
        self.bytes_scanned += bytes;
    }

    pub fn record_dir(&mut self) {
        self.dirs_scanned += 1;
    }

    pub fn record_errors(&mut self, count: usize) {
        self.errors_count += count as u64;
    }

    pub fn files_scanned(&self) -> u64 {
        self.files_scanned
    }

    pub fn dirs_scanned(&self) -> u64 {
        self.dirs_scanned
    }

    pub fn snapshot(&self, current_path: &Path) -> ScanProgress {
        ScanProgress {
            files_scanned: self.files_scanned,
            dirs_scanned: self.dirs_scanned,
            bytes_scanned: self.bytes_scanned,
            current_path: current_path.to_path_buf(),
            errors_count: self.errors_count,
            elapsed: self.start_time.elapsed(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_snapshot() {
        let mut tracker = ProgressTracker::new(Instant::now());
        tracker.record_dir();
        tracker.record_files(3, 300);
        tracker.record_errors(1);

        let snap = tracker.snapshot(Path::new("/tmp/x"));
        assert_eq!(snap.files_scanned, 3);
        assert_eq!(snap.dirs_scanned, 1);
        assert_eq!(snap.bytes_scanned, 300);
        assert_eq!(snap.errors_count, 1);
        assert_eq!(snap.total_items(), 4);
        assert_eq!(snap.current_path, PathBuf::from("/tmp/x"));
    }

    #[test]
    fn test_rate_without_elapsed() {
        assert_eq!(ScanProgress::new().files_per_second(), 0.0);
    }
}
