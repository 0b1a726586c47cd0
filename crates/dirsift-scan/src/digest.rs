//! Streaming content digests.

use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::{Path, PathBuf};

use blake3::Hasher;
use thiserror::Error;

use dirsift_core::{ContentHash, DEFAULT_CHUNK_SIZE};

/// File content could not be hashed.
#[derive(Debug, Error)]
#[error("Cannot hash {path}: {source}")]
pub struct DigestError {
    /// File that failed.
    pub path: PathBuf,
    /// Underlying I/O failure.
    #[source]
    pub source: std::io::Error,
}

/// Computes BLAKE3 digests by reading files in fixed-size chunks.
///
/// Holds no state between calls, so one engine can be shared across
/// threads.
#[derive(Debug, Clone, Copy)]
pub struct DigestEngine {
    chunk_size: usize,
}

impl DigestEngine {
    /// Create an engine reading `chunk_size` bytes at a time.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    /// Bytes read per chunk.
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Digest the full content of `path`.
    pub fn digest(&self, path: &Path) -> Result<ContentHash, DigestError> {
        let wrap = |source| DigestError {
            path: path.to_path_buf(),
            source,
        };

        let mut file = File::open(path).map_err(wrap)?;
        let mut hasher = Hasher::new();
        let mut buffer = vec![0u8; self.chunk_size];

        loop {
            let bytes_read = match file.read(&mut buffer) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(wrap(e)),
            };
            hasher.update(&buffer[..bytes_read]);
        }

        Ok(ContentHash::new(*hasher.finalize().as_bytes()))
    }

    /// Digest of zero bytes of content.
    pub fn empty_digest() -> ContentHash {
        ContentHash::new(*blake3::hash(&[]).as_bytes())
    }
}

impl Default for DigestEngine {
    fn default() -> Self {
        Self::new(DEFAULT_CHUNK_SIZE)
    }
}
