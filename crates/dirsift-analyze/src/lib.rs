//! Post-scan analysis for dirsift.
//!
//! This crate turns the flat file list of a scan into the views a user
//! looks at afterwards:
//!
//! - **Category summary** - How many files are duplicates, old, large or empty
//! - **Duplicate report** - Files grouped by digest with reclaimable space
//!
//! Nothing here touches the filesystem; both views are computed from
//! [`FileRecord`]s the scanner already produced.
//!
//! ```rust,no_run
//! use dirsift_analyze::{DuplicateReport, FileCategory, ScanSummary, format_size};
//!
//! let result = dirsift_scan::scan("/path/to/scan").unwrap();
//!
//! let summary = ScanSummary::from_records(&result.all_files);
//! println!("Empty files: {}", summary.count(FileCategory::Empty));
//!
//! let report = DuplicateReport::from_records(&result.all_files);
//! println!("Found {} duplicate groups", report.group_count);
//! println!("Wasted space: {}", format_size(report.total_wasted_space));
//! ```

mod duplicates;
pub mod summary;

pub use duplicates::{DuplicateGroup, DuplicateReport};
pub use summary::{
    CategoryStats, FileCategory, ScanSummary, age_of, files_in, format_age, format_size,
};

// Re-export core types
pub use dirsift_core::{ContentHash, FileRecord};
