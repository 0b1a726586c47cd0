use dirsift_core::{
    Classifier, ContentHash, FileFlags, FileNode, FileRecord, FileTree, NodeId, NodeKind,
    ScanConfig, ScanResult, Timestamps,
};
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

const DAY: Duration = Duration::from_secs(24 * 60 * 60);

fn record(name: &str, size: u64, digest: Option<ContentHash>) -> FileRecord {
    FileRecord {
        id: NodeId::new(0),
        name: name.into(),
        path: PathBuf::from("/root").join(name),
        size,
        timestamps: Timestamps::with_modified(SystemTime::now()),
        extension: ".txt".into(),
        digest,
        flags: FileFlags::default(),
    }
}

/// root
/// ├── dir1
/// │   └── file1.txt
/// ├── dir2
/// │   ├── file2.txt
/// │   └── nested
/// └── top.txt
fn sample_tree() -> FileTree {
    let mut tree = FileTree::new("root", "/root");
    let root = tree.root().id;

    let dir1 = tree.insert_with(|id| FileNode::new_directory(id, "dir1", "/root/dir1"));
    let file1 = tree.insert_with(|_| FileNode::new_file(record("file1.txt", 512, None)));
    tree.attach(dir1, file1);
    tree.attach(root, dir1);

    let dir2 = tree.insert_with(|id| FileNode::new_directory(id, "dir2", "/root/dir2"));
    let nested = tree.insert_with(|id| FileNode::new_directory(id, "nested", "/root/dir2/nested"));
    tree.attach(dir2, nested);
    let file2 = tree.insert_with(|_| FileNode::new_file(record("file2.txt", 1024, None)));
    tree.attach(dir2, file2);
    tree.attach(root, dir2);

    let top = tree.insert_with(|_| FileNode::new_file(record("top.txt", 3, None)));
    tree.attach(root, top);
    tree
}

#[test]
fn test_node_id_operations() {
    let id1 = NodeId::new(42);
    let id2 = NodeId::new(42);

    assert_eq!(id1, id2);
    assert_eq!(id1.0, 42);
    assert!(NodeId::new(1) < NodeId::new(2));
}

#[test]
fn test_content_hash_creation_and_hex() {
    let bytes = [0xab; 32];
    let hash = ContentHash::new(bytes);

    let hex = hash.to_hex();
    assert_eq!(hex.len(), 64);
    assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
    assert!(hex.starts_with("ab"));

    assert_eq!(hash, ContentHash::new(bytes));
    assert_ne!(hash, ContentHash::new([0xcd; 32]));
}

#[test]
fn test_content_hash_serializes_as_hex() {
    let hash = ContentHash::new([0x01; 32]);
    let json = serde_json::to_string(&hash).unwrap();
    assert_eq!(json, format!("\"{}\"", "01".repeat(32)));
    let back: ContentHash = serde_json::from_str(&json).unwrap();
    assert_eq!(back, hash);
}

#[test]
fn test_timestamps() {
    let now = SystemTime::now();
    let timestamps = Timestamps::with_modified(now);
    assert_eq!(timestamps.modified, now);
    assert!(timestamps.created.is_none());

    let created = now - Duration::from_secs(7200);
    let full = Timestamps::new(now, Some(created));
    assert_eq!(full.created, Some(created));
}

#[test]
fn test_node_kind_discrimination() {
    let file_kind = NodeKind::File(record("a.txt", 1, None));
    assert!(file_kind.is_file());
    assert!(!file_kind.is_dir());

    let dir_kind = NodeKind::Directory {
        children: vec![NodeId::new(3)],
    };
    assert!(dir_kind.is_dir());
    assert!(!dir_kind.is_file());
}

#[test]
fn test_tree_ids_and_preorder() {
    let tree = sample_tree();

    let ids: Vec<u64> = tree.walk().map(|n| n.id.0).collect();
    assert_eq!(ids, vec![0, 1, 2, 3, 4, 5, 6]);

    let names: Vec<&str> = tree.walk().map(|n| n.name.as_str()).collect();
    assert_eq!(
        names,
        vec!["root", "dir1", "file1.txt", "dir2", "nested", "file2.txt", "top.txt"]
    );

    // Arena position matches id for every node.
    for (index, node) in tree.nodes().iter().enumerate() {
        assert_eq!(node.id.index(), index);
    }
}

#[test]
fn test_tree_counts() {
    let tree = sample_tree();
    assert_eq!(tree.file_count(), 3);
    assert_eq!(tree.dir_count(), 4);
    assert_eq!(tree.children(tree.root().id).count(), 3);
}

#[test]
fn test_find_by_id() {
    let tree = sample_tree();

    let node = tree.find_by_id(NodeId::new(5)).unwrap();
    assert_eq!(node.name.as_str(), "file2.txt");
    assert_eq!(node.size(), 1024);

    let dir = tree.find_by_id(NodeId::new(4)).unwrap();
    assert!(dir.is_dir());
    assert_eq!(dir.child_count(), 0);

    assert!(tree.find_by_id(NodeId::new(7)).is_none());
}

#[test]
fn test_unattached_node_is_not_found() {
    let mut tree = sample_tree();
    let orphan = tree.insert_with(|id| FileNode::new_directory(id, "orphan", "/orphan"));

    assert!(tree.get(orphan).is_some());
    assert!(tree.find_by_id(orphan).is_none());
}

#[test]
fn test_scan_result_matches_tree() {
    let tree = sample_tree();
    let order: Vec<NodeId> = tree.files().map(|r| r.id).collect();
    let result = ScanResult::new(
        PathBuf::from("/root"),
        tree,
        &order,
        SystemTime::now(),
        Duration::from_secs(1),
        Vec::new(),
    );

    assert_eq!(result.file_count, result.tree.file_count());
    assert_eq!(result.all_files.len(), 3);
    assert_eq!(result.root().name.as_str(), "root");
    assert_eq!(result.total_size(), 512 + 1024 + 3);
    assert_eq!(
        result.find_by_id(NodeId::new(2)).map(|n| n.name.as_str()),
        Some("file1.txt")
    );
}

#[test]
fn test_scan_config_builder() {
    let config = ScanConfig::builder()
        .root("/test/path")
        .batch_size(3usize)
        .large_file_threshold(1024u64)
        .chunk_size(8192usize)
        .build()
        .unwrap();

    assert_eq!(config.root.to_str().unwrap(), "/test/path");
    assert_eq!(config.batch_size, 3);
    assert_eq!(config.large_file_threshold, 1024);
    assert_eq!(config.stale_after_years, 5);
    assert_eq!(config.chunk_size, 8192);
}

#[test]
fn test_config_classifier_uses_thresholds() {
    let mut config = ScanConfig::new("/test");
    config.stale_after_years = 1;
    config.large_file_threshold = 10;

    let now = SystemTime::now();
    let classifier = config.classifier(now);

    let flags = classifier.classify(11, now - DAY * 366);
    assert!(flags.is_large);
    assert!(flags.is_old);

    let flags = classifier.classify(10, now - DAY * 365);
    assert!(!flags.is_large);
    assert!(!flags.is_old);
}

#[test]
fn test_default_classifier_thresholds() {
    let classifier = Classifier::default();
    let now = classifier.reference_time;

    assert!(!classifier.classify(100 * 1024 * 1024, now).is_large);
    assert!(classifier.classify(100 * 1024 * 1024 + 1, now).is_large);
    assert!(!classifier.is_old(now - DAY * (5 * 365)));
    assert!(classifier.is_old(now - DAY * (5 * 365 + 1)));
}
