//! Arena-backed file tree and the scan result container.

use std::path::PathBuf;
use std::time::{Duration, SystemTime};

use compact_str::CompactString;
use serde::{Deserialize, Serialize};

use crate::error::ScanWarning;
use crate::node::{FileNode, FileRecord, NodeId, NodeKind};

/// Scanned hierarchy stored as a flat arena.
///
/// Every node lives in `nodes` at the index equal to its id; directories
/// refer to their children by id. The root is always the first node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawTree")]
pub struct FileTree {
    nodes: Vec<FileNode>,
}

/// Unchecked form of [`FileTree`] as read from serialized data.
#[derive(Deserialize)]
struct RawTree {
    nodes: Vec<FileNode>,
}

impl TryFrom<RawTree> for FileTree {
    type Error = String;

    fn try_from(raw: RawTree) -> Result<Self, Self::Error> {
        match raw.nodes.first() {
            None => Err("file tree has no root node".to_string()),
            Some(root) if !root.is_dir() || root.id != NodeId::new(0) => {
                Err("file tree root must be directory 0".to_string())
            }
            Some(_) => Ok(Self { nodes: raw.nodes }),
        }
    }
}

impl FileTree {
    /// Create a tree holding only a root directory with id 0.
    pub fn new(root_name: impl Into<CompactString>, root_path: impl Into<PathBuf>) -> Self {
        let root = FileNode::new_directory(NodeId::new(0), root_name, root_path);
        Self { nodes: vec![root] }
    }

    /// Id the next inserted node will receive.
    pub fn next_id(&self) -> NodeId {
        NodeId::new(self.nodes.len() as u64)
    }

    /// Allocate a node; `make` receives the id assigned to it.
    ///
    /// The node is not attached to any parent; see [`FileTree::attach`].
    pub fn insert_with(&mut self, make: impl FnOnce(NodeId) -> FileNode) -> NodeId {
        let id = self.next_id();
        let mut node = make(id);
        node.id = id;
        if let NodeKind::File(record) = &mut node.kind {
            record.id = id;
        }
        self.nodes.push(node);
        id
    }

    /// Append `child` to the children of directory `parent`.
    ///
    /// Returns false (and changes nothing) when `parent` is not a directory
    /// or either id is unknown.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> bool {
        if child.index() >= self.nodes.len() {
            return false;
        }
        match self.nodes.get_mut(parent.index()).map(|n| &mut n.kind) {
            Some(NodeKind::Directory { children }) => {
                children.push(child);
                true
            }
            _ => false,
        }
    }

    /// The root directory node.
    pub fn root(&self) -> &FileNode {
        &self.nodes[0]
    }

    /// Direct arena access by id.
    pub fn get(&self, id: NodeId) -> Option<&FileNode> {
        self.nodes.get(id.index())
    }

    /// Mutable arena access by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut FileNode> {
        self.nodes.get_mut(id.index())
    }

    /// Record of the file node `id`.
    pub fn record(&self, id: NodeId) -> Option<&FileRecord> {
        self.get(id).and_then(FileNode::record)
    }

    /// Mutable record of the file node `id`.
    pub fn record_mut(&mut self, id: NodeId) -> Option<&mut FileRecord> {
        self.get_mut(id).and_then(FileNode::record_mut)
    }

    /// Child nodes of `id`, in order.
    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &FileNode> + '_ {
        self.get(id)
            .map(FileNode::children)
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.get(*child))
    }

    /// Depth-first, pre-order walk starting at the root.
    pub fn walk(&self) -> Preorder<'_> {
        Preorder {
            tree: self,
            stack: vec![NodeId::new(0)],
        }
    }

    /// Resolve an id by searching depth-first from the root.
    ///
    /// Only nodes reachable from the root are found.
    pub fn find_by_id(&self, id: NodeId) -> Option<&FileNode> {
        self.walk().find(|node| node.id == id)
    }

    /// File nodes reachable from the root.
    pub fn files(&self) -> impl Iterator<Item = &FileRecord> + '_ {
        self.walk().filter_map(FileNode::record)
    }

    /// Number of file nodes reachable from the root.
    pub fn file_count(&self) -> usize {
        self.files().count()
    }

    /// Number of directory nodes reachable from the root, root included.
    pub fn dir_count(&self) -> usize {
        self.walk().filter(|node| node.is_dir()).count()
    }

    /// Number of allocated nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// A tree always holds its root, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Every allocated node in id order.
    pub fn nodes(&self) -> &[FileNode] {
        &self.nodes
    }
}

/// Pre-order iterator over a [`FileTree`].
pub struct Preorder<'a> {
    tree: &'a FileTree,
    stack: Vec<NodeId>,
}

impl<'a> Iterator for Preorder<'a> {
    type Item = &'a FileNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.tree.get(self.stack.pop()?)?;
        self.stack.extend(node.children().iter().rev().copied());
        Some(node)
    }
}

/// Everything one scan produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanResult {
    /// Root path that was scanned.
    pub root_path: PathBuf,

    /// The scanned hierarchy.
    pub tree: FileTree,

    /// Every recorded file, in processing order.
    pub all_files: Vec<FileRecord>,

    /// Number of recorded files.
    pub file_count: usize,

    /// Number of directories, root included.
    pub dir_count: usize,

    /// When this scan was started.
    pub scanned_at: SystemTime,

    /// Duration of the scan.
    pub elapsed: Duration,

    /// Warnings encountered during scan.
    pub warnings: Vec<ScanWarning>,
}

impl ScanResult {
    /// Assemble a result; `all_files` is projected from `file_order`.
    pub fn new(
        root_path: PathBuf,
        tree: FileTree,
        file_order: &[NodeId],
        scanned_at: SystemTime,
        elapsed: Duration,
        warnings: Vec<ScanWarning>,
    ) -> Self {
        let all_files: Vec<FileRecord> = file_order
            .iter()
            .filter_map(|id| tree.record(*id).cloned())
            .collect();
        let dir_count = tree.dir_count();
        Self {
            root_path,
            file_count: all_files.len(),
            dir_count,
            all_files,
            tree,
            scanned_at,
            elapsed,
            warnings,
        }
    }

    /// Root node of the tree.
    pub fn root(&self) -> &FileNode {
        self.tree.root()
    }

    /// Resolve a node id.
    pub fn find_by_id(&self, id: NodeId) -> Option<&FileNode> {
        self.tree.find_by_id(id)
    }

    /// Total bytes across all recorded files.
    pub fn total_size(&self) -> u64 {
        self.all_files.iter().map(|f| f.size).sum()
    }

    /// Check if there were any warnings during scanning.
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}
