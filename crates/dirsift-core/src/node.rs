//! File and directory node types.

use std::fmt;
use std::path::PathBuf;
use std::time::SystemTime;

use compact_str::CompactString;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Unique identifier for a node within one scan.
///
/// Ids are handed out in discovery order, so the id is also the node's
/// position in the [`FileTree`](crate::FileTree) arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

impl NodeId {
    /// Create a new NodeId from a u64.
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    /// Arena index for this id.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// BLAKE3 content digest used for duplicate detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContentHash(pub [u8; 32]);

impl ContentHash {
    /// Create a new ContentHash from raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Get the hash as a hex string.
    pub fn to_hex(&self) -> String {
        self.0.iter().map(|b| format!("{b:02x}")).collect()
    }

    /// Parse a 64 character hex string.
    pub fn from_hex(s: &str) -> Option<Self> {
        if s.len() != 64 || !s.is_ascii() {
            return None;
        }
        let mut bytes = [0u8; 32];
        for (i, byte) in bytes.iter_mut().enumerate() {
            *byte = u8::from_str_radix(&s[i * 2..i * 2 + 2], 16).ok()?;
        }
        Some(Self(bytes))
    }
}

impl fmt::Display for ContentHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for ContentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for ContentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).ok_or_else(|| serde::de::Error::custom("invalid content hash"))
    }
}

/// File metadata timestamps.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timestamps {
    /// Last modification time.
    pub modified: SystemTime,
    /// Creation time (if available, platform-dependent).
    pub created: Option<SystemTime>,
}

impl Timestamps {
    /// Create timestamps with only modified time.
    pub fn with_modified(modified: SystemTime) -> Self {
        Self {
            modified,
            created: None,
        }
    }

    /// Create timestamps with all available times.
    pub fn new(modified: SystemTime, created: Option<SystemTime>) -> Self {
        Self { modified, created }
    }
}

/// Classification flags derived for every file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileFlags {
    /// Size is zero.
    pub is_empty: bool,
    /// Not modified within the staleness window.
    pub is_old: bool,
    /// Larger than the large-file threshold.
    pub is_large: bool,
    /// Shares its digest with at least one other file in the scan.
    pub is_duplicate: bool,
}

/// Flat description of one scanned file.
///
/// The same value is stored on the file's tree node and projected into
/// [`ScanResult::all_files`](crate::ScanResult).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Id of the file node this record belongs to.
    pub id: NodeId,
    /// File name (not full path).
    pub name: CompactString,
    /// Full path.
    pub path: PathBuf,
    /// Size in bytes.
    pub size: u64,
    /// Modification and creation times.
    pub timestamps: Timestamps,
    /// Lower-cased extension including the leading dot, or empty.
    pub extension: CompactString,
    /// Content digest; `None` when the file could not be read.
    pub digest: Option<ContentHash>,
    /// Classification flags.
    pub flags: FileFlags,
}

impl FileRecord {
    /// Whether this file participates in duplicate detection.
    pub fn is_hashed(&self) -> bool {
        self.digest.is_some()
    }
}

/// Type of tree node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Directory with children in enumeration order.
    Directory {
        /// Arena ids of direct children.
        children: Vec<NodeId>,
    },
    /// Regular file.
    File(FileRecord),
}

impl NodeKind {
    /// Check if this is a directory.
    pub fn is_dir(&self) -> bool {
        matches!(self, NodeKind::Directory { .. })
    }

    /// Check if this is a regular file.
    pub fn is_file(&self) -> bool {
        matches!(self, NodeKind::File(_))
    }
}

/// A single file or directory in the tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileNode {
    /// Unique identifier for this node.
    pub id: NodeId,

    /// File/directory name (not full path).
    pub name: CompactString,

    /// Full path.
    pub path: PathBuf,

    /// Node type and associated data.
    pub kind: NodeKind,
}

impl FileNode {
    /// Create a new directory node with no children.
    pub fn new_directory(id: NodeId, name: impl Into<CompactString>, path: impl Into<PathBuf>) -> Self {
        Self {
            id,
            name: name.into(),
            path: path.into(),
            kind: NodeKind::Directory {
                children: Vec::new(),
            },
        }
    }

    /// Create a file node from its record.
    pub fn new_file(record: FileRecord) -> Self {
        Self {
            id: record.id,
            name: record.name.clone(),
            path: record.path.clone(),
            kind: NodeKind::File(record),
        }
    }

    /// Check if this node is a directory.
    pub fn is_dir(&self) -> bool {
        self.kind.is_dir()
    }

    /// Check if this node is a file.
    pub fn is_file(&self) -> bool {
        self.kind.is_file()
    }

    /// Direct children (empty for files).
    pub fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Directory { children } => children.as_slice(),
            NodeKind::File(_) => &[],
        }
    }

    /// Get the number of direct children.
    pub fn child_count(&self) -> usize {
        self.children().len()
    }

    /// File record, if this is a file.
    pub fn record(&self) -> Option<&FileRecord> {
        match &self.kind {
            NodeKind::File(record) => Some(record),
            NodeKind::Directory { .. } => None,
        }
    }

    /// Mutable file record, if this is a file.
    pub fn record_mut(&mut self) -> Option<&mut FileRecord> {
        match &mut self.kind {
            NodeKind::File(record) => Some(record),
            NodeKind::Directory { .. } => None,
        }
    }

    /// File size, 0 for directories.
    pub fn size(&self) -> u64 {
        self.record().map_or(0, |r| r.size)
    }
}
