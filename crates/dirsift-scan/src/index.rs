//! Content-digest index for duplicate detection.

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use dirsift_core::{ContentHash, NodeId};

/// Outcome of showing one file to the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Observation {
    /// The file has no digest and takes no part in duplicate detection.
    Unhashed,
    /// First file seen with this digest; it becomes the original.
    Original,
    /// Another file already holds this digest.
    Duplicate {
        /// The first-seen file for this digest.
        original: NodeId,
    },
}

/// Maps each content digest to the first file seen with it.
///
/// The check-then-insert for a digest happens under the map's shard lock,
/// so two concurrent first sightings of one digest cannot both become the
/// original. The index lives for one scan only.
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    originals: DashMap<ContentHash, NodeId>,
}

impl DuplicateIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self {
            originals: DashMap::new(),
        }
    }

    /// Record that file `id` has content `digest`.
    ///
    /// When the digest was already present, the caller must flag both the
    /// incoming file and the returned original as duplicates. The stored
    /// original is never replaced.
    pub fn observe(&self, id: NodeId, digest: Option<ContentHash>) -> Observation {
        let Some(digest) = digest else {
            return Observation::Unhashed;
        };
        match self.originals.entry(digest) {
            Entry::Occupied(entry) => Observation::Duplicate {
                original: *entry.get(),
            },
            Entry::Vacant(entry) => {
                entry.insert(id);
                Observation::Original
            }
        }
    }

    /// First-seen file for `digest`, if any.
    pub fn original(&self, digest: &ContentHash) -> Option<NodeId> {
        self.originals.get(digest).map(|r| *r.value())
    }

    /// Get the number of distinct digests seen.
    pub fn len(&self) -> usize {
        self.originals.len()
    }

    /// Check if no digests have been recorded.
    pub fn is_empty(&self) -> bool {
        self.originals.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn hash(b: u8) -> ContentHash {
        ContentHash::new([b; 32])
    }

    #[test]
    fn test_first_sighting_is_original() {
        let index = DuplicateIndex::new();
        assert_eq!(index.observe(NodeId::new(1), Some(hash(1))), Observation::Original);
        assert_eq!(index.original(&hash(1)), Some(NodeId::new(1)));
        assert_eq!(index.len(), 1);
    }

    #[test]
    fn test_second_sighting_reports_original() {
        let index = DuplicateIndex::new();
        index.observe(NodeId::new(1), Some(hash(1)));

        assert_eq!(
            index.observe(NodeId::new(2), Some(hash(1))),
            Observation::Duplicate {
                original: NodeId::new(1)
            }
        );
        // Original is never replaced.
        assert_eq!(
            index.observe(NodeId::new(3), Some(hash(1))),
            Observation::Duplicate {
                original: NodeId::new(1)
            }
        );
        assert_eq!(index.original(&hash(1)), Some(NodeId::new(1)));
    }

    #[test]
    fn test_unhashed_is_ignored() {
        let index = DuplicateIndex::new();
        assert_eq!(index.observe(NodeId::new(1), None), Observation::Unhashed);
        assert_eq!(index.observe(NodeId::new(2), None), Observation::Unhashed);
        assert!(index.is_empty());
    }

    #[test]
    fn test_different_digests() {
        let index = DuplicateIndex::new();
        assert_eq!(index.observe(NodeId::new(1), Some(hash(1))), Observation::Original);
        assert_eq!(index.observe(NodeId::new(2), Some(hash(2))), Observation::Original);
        assert_eq!(index.len(), 2);
    }

    #[test]
    fn test_concurrent_first_sightings() {
        let index = Arc::new(DuplicateIndex::new());
        let handles: Vec<_> = (0..8u64)
            .map(|i| {
                let index = Arc::clone(&index);
                std::thread::spawn(move || index.observe(NodeId::new(i), Some(hash(9))))
            })
            .collect();

        let originals = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|o| *o == Observation::Original)
            .count();
        assert_eq!(originals, 1);
    }
}
