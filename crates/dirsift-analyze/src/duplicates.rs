//! Duplicate groups built from scanned file records.
//!
//! The scanner already hashed every readable file and marked duplicates.
//! This module only groups the records by digest and totals the space a
//! cleanup could reclaim; it does no I/O.

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use dirsift_core::{ContentHash, FileRecord, NodeId};

/// A group of files sharing the same content.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuplicateGroup {
    /// Content hash shared by all files in this group.
    pub hash: ContentHash,

    /// Size of each file in bytes.
    pub size: u64,

    /// Ids of the files, in scan order. The first one is the original.
    pub ids: Vec<NodeId>,

    /// Paths of the files, parallel to `ids`.
    pub paths: Vec<PathBuf>,

    /// Wasted space: size * (count - 1).
    pub wasted_bytes: u64,
}

impl DuplicateGroup {
    /// Get the number of files in the group.
    pub fn count(&self) -> usize {
        self.paths.len()
    }

    /// Check if keeping one file, how many could be deleted.
    pub fn deletable_count(&self) -> usize {
        self.paths.len().saturating_sub(1)
    }

    /// The file seen first during the scan.
    pub fn original(&self) -> Option<&PathBuf> {
        self.paths.first()
    }
}

/// Results from duplicate analysis.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DuplicateReport {
    /// Groups of duplicate files, sorted by wasted space descending.
    pub groups: Vec<DuplicateGroup>,

    /// Total size of all duplicate files.
    pub total_duplicate_size: u64,

    /// Total wasted space (could be reclaimed).
    pub total_wasted_space: u64,

    /// Number of records that carried a digest.
    pub files_analyzed: u64,

    /// Number of unique duplicate groups.
    pub group_count: usize,
}

impl DuplicateReport {
    /// Group `records` by digest.
    ///
    /// Records without a digest are ignored. Groups with the same wasted
    /// space keep the order their first file was scanned in.
    pub fn from_records(records: &[FileRecord]) -> Self {
        let mut slots: HashMap<ContentHash, usize> = HashMap::new();
        let mut groups: Vec<DuplicateGroup> = Vec::new();
        let mut files_analyzed = 0u64;

        for record in records {
            let Some(hash) = record.digest else {
                continue;
            };
            files_analyzed += 1;

            let slot = *slots.entry(hash).or_insert_with(|| {
                groups.push(DuplicateGroup {
                    hash,
                    size: record.size,
                    ids: Vec::new(),
                    paths: Vec::new(),
                    wasted_bytes: 0,
                });
                groups.len() - 1
            });
            let group = &mut groups[slot];
            group.ids.push(record.id);
            group.paths.push(record.path.clone());
        }

        groups.retain(|g| g.count() >= 2);
        for group in &mut groups {
            group.wasted_bytes = group.size * group.deletable_count() as u64;
        }
        groups.sort_by(|a, b| b.wasted_bytes.cmp(&a.wasted_bytes));

        let total_duplicate_size = groups.iter().map(|g| g.size * g.count() as u64).sum();
        let total_wasted_space = groups.iter().map(|g| g.wasted_bytes).sum();
        let group_count = groups.len();

        Self {
            groups,
            total_duplicate_size,
            total_wasted_space,
            files_analyzed,
            group_count,
        }
    }

    /// Check if any duplicates were found.
    pub fn has_duplicates(&self) -> bool {
        !self.groups.is_empty()
    }

    /// Get total number of duplicate files across all groups.
    pub fn total_duplicate_files(&self) -> usize {
        self.groups.iter().map(|g| g.paths.len()).sum()
    }
}
