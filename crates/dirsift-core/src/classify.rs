//! Policy predicates applied to every scanned file.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};

use crate::node::FileFlags;

/// Seconds in one day.
const SECS_PER_DAY: u64 = 24 * 60 * 60;

/// Days counted per year when measuring staleness.
pub const DAYS_PER_YEAR: u64 = 365;

/// Default staleness threshold in years.
pub const DEFAULT_STALE_AFTER_YEARS: u32 = 5;

/// Default large-file threshold: 100 MiB.
pub const DEFAULT_LARGE_FILE_THRESHOLD: u64 = 100 * 1024 * 1024;

/// Thresholds plus the reference instant used to classify files.
///
/// The reference time is fixed when the classifier is built, so
/// classifying the same metadata twice always yields the same flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Classifier {
    /// Instant ages are measured against.
    pub reference_time: SystemTime,
    /// Files older than this many years (of 365 days) are stale.
    pub stale_after_years: u32,
    /// Files strictly larger than this are large.
    pub large_file_threshold: u64,
}

impl Classifier {
    /// Create a classifier measuring age from `reference_time`.
    pub fn new(reference_time: SystemTime, stale_after_years: u32, large_file_threshold: u64) -> Self {
        Self {
            reference_time,
            stale_after_years,
            large_file_threshold,
        }
    }

    /// Derive flags for a file of `size` bytes last modified at `modified`.
    ///
    /// `is_duplicate` always starts out false; only the duplicate index
    /// sets it.
    pub fn classify(&self, size: u64, modified: SystemTime) -> FileFlags {
        FileFlags {
            is_empty: size == 0,
            is_old: self.is_old(modified),
            is_large: size > self.large_file_threshold,
            is_duplicate: false,
        }
    }

    /// Whole days elapsed since `modified` exceed the staleness window.
    ///
    /// Modification times in the future count as age zero.
    pub fn is_old(&self, modified: SystemTime) -> bool {
        let age = self
            .reference_time
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age.as_secs() / SECS_PER_DAY > u64::from(self.stale_after_years) * DAYS_PER_YEAR
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::new(
            SystemTime::now(),
            DEFAULT_STALE_AFTER_YEARS,
            DEFAULT_LARGE_FILE_THRESHOLD,
        )
    }
}
