//! Per-category counts over the flat file list.
//!
//! Mirrors the post-scan overview: how many files were scanned and how
//! many of them are duplicates, old, large or empty.

use std::time::{Duration, SystemTime};

use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString, IntoEnumIterator};

use dirsift_core::FileRecord;

/// A view over the scanned files selected by one flag.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum FileCategory {
    /// Every recorded file.
    All,
    /// Files sharing content with another file.
    Duplicate,
    /// Files past the staleness threshold.
    Old,
    /// Files over the large-file threshold.
    Large,
    /// Zero-byte files.
    Empty,
}

impl FileCategory {
    /// Whether `record` belongs to this category.
    pub fn matches(self, record: &FileRecord) -> bool {
        match self {
            FileCategory::All => true,
            FileCategory::Duplicate => record.flags.is_duplicate,
            FileCategory::Old => record.flags.is_old,
            FileCategory::Large => record.flags.is_large,
            FileCategory::Empty => record.flags.is_empty,
        }
    }

    /// Human-readable heading.
    pub fn title(self) -> &'static str {
        match self {
            FileCategory::All => "Total Files Scanned",
            FileCategory::Duplicate => "Duplicate Files",
            FileCategory::Old => "Old Files",
            FileCategory::Large => "Large Files",
            FileCategory::Empty => "Empty Files",
        }
    }
}

/// Count and size of the files in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryStats {
    /// The category.
    pub category: FileCategory,
    /// Number of files.
    pub file_count: u64,
    /// Total size of those files.
    pub total_size: u64,
}

/// Counts for every category.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanSummary {
    /// One entry per category, in [`FileCategory`] order.
    pub categories: Vec<CategoryStats>,
}

impl ScanSummary {
    /// Tally `records`.
    pub fn from_records(records: &[FileRecord]) -> Self {
        let categories = FileCategory::iter()
            .map(|category| {
                let (file_count, total_size) = records
                    .iter()
                    .filter(|r| category.matches(r))
                    .fold((0u64, 0u64), |(n, size), r| (n + 1, size + r.size));
                CategoryStats {
                    category,
                    file_count,
                    total_size,
                }
            })
            .collect();
        Self { categories }
    }

    /// Stats for `category`.
    pub fn get(&self, category: FileCategory) -> Option<&CategoryStats> {
        self.categories.iter().find(|c| c.category == category)
    }

    /// File count for `category`.
    pub fn count(&self, category: FileCategory) -> u64 {
        self.get(category).map_or(0, |c| c.file_count)
    }

    /// Total number of files scanned.
    pub fn total_files(&self) -> u64 {
        self.count(FileCategory::All)
    }
}

/// Records belonging to `category`, in their original order.
pub fn files_in(records: &[FileRecord], category: FileCategory) -> Vec<&FileRecord> {
    records.iter().filter(|r| category.matches(r)).collect()
}

/// Time since `modified`, measured from `now`.
pub fn age_of(record: &FileRecord, now: SystemTime) -> Duration {
    now.duration_since(record.timestamps.modified)
        .unwrap_or(Duration::ZERO)
}

/// Format a byte count with binary units (KiB, MiB, ...).
pub fn format_size(bytes: u64) -> String {
    humansize::format_size(bytes, humansize::BINARY)
}

/// Format a duration as a human-readable age string.
pub fn format_age(duration: Duration) -> String {
    let secs = duration.as_secs();
    if secs < 60 {
        format!("{secs} seconds")
    } else if secs < 3600 {
        format!("{} minutes", secs / 60)
    } else if secs < 86400 {
        format!("{} hours", secs / 3600)
    } else if secs < 2592000 {
        format!("{} days", secs / 86400)
    } else if secs < 31536000 {
        format!("{} months", secs / 2592000)
    } else {
        format!("{:.1} years", secs as f64 / 31536000.0)
    }
}
