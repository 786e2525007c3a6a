//! Incremental hashers for the two archive digests.
//!
//! [`ContentHasher`] computes the linear SHA-256 of everything fed to it.
//! [`TreeHasher`] cuts the same bytes into 1 MiB segments by content offset
//! and hashes each segment into a leaf. Segment boundaries never depend on
//! how the caller slices its `update` calls: a single call may complete
//! several segments, and a segment may be assembled from many calls.

use sha2::{Digest as _, Sha256};
use tracing::trace;

use crate::digest::Sha256Digest;
use crate::tree::LeafSequence;

/// Size of one tree-hash segment.
pub const SEGMENT_SIZE: usize = 1024 * 1024;

// ---------------------------------------------------------------------------
// ContentHasher
// ---------------------------------------------------------------------------

/// Linear SHA-256 over a whole stream.
///
/// # Examples
///
/// ```
/// use rustcas_integrity::{ContentHasher, Sha256Digest};
///
/// let mut hasher = ContentHasher::new();
/// hasher.update(b"hello ");
/// hasher.update(b"world");
/// assert_eq!(hasher.finalize(), Sha256Digest::of(b"hello world"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct ContentHasher {
    hasher: Sha256,
    bytes_hashed: u64,
}

impl ContentHasher {
    /// Create an empty hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more data.
    pub fn update(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.bytes_hashed += data.len() as u64;
    }

    /// Total bytes fed so far.
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    /// Consume the hasher and return the digest.
    #[must_use]
    pub fn finalize(self) -> Sha256Digest {
        Sha256Digest::from_hasher(self.hasher)
    }
}

// ---------------------------------------------------------------------------
// ChunkAccumulator
// ---------------------------------------------------------------------------

/// Running hash of the in-flight segment.
///
/// Invariant: `pre_size < SEGMENT_SIZE` between calls; a segment is sealed as
/// soon as it reaches `SEGMENT_SIZE`.
#[derive(Debug, Clone, Default)]
struct ChunkAccumulator {
    hasher: Sha256,
    pre_size: usize,
}

impl ChunkAccumulator {
    /// Bytes still needed to complete the current segment.
    fn remaining(&self) -> usize {
        SEGMENT_SIZE - self.pre_size
    }

    fn absorb(&mut self, data: &[u8]) {
        self.hasher.update(data);
        self.pre_size += data.len();
    }

    fn is_empty(&self) -> bool {
        self.pre_size == 0
    }

    /// Finalize the current segment and start a fresh one.
    fn seal(&mut self) -> Sha256Digest {
        self.pre_size = 0;
        Sha256Digest::from_hasher(std::mem::take(&mut self.hasher))
    }
}

// ---------------------------------------------------------------------------
// TreeHasher
// ---------------------------------------------------------------------------

/// Incremental SHA-256 tree hasher.
///
/// # Examples
///
/// ```
/// use rustcas_integrity::{Sha256Digest, TreeHasher};
///
/// // Below one segment the tree hash is the plain content hash.
/// let mut hasher = TreeHasher::new();
/// hasher.update(b"small archive");
/// assert_eq!(hasher.finalize(), Sha256Digest::of(b"small archive"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct TreeHasher {
    chunk: ChunkAccumulator,
    leaves: Vec<Sha256Digest>,
    bytes_hashed: u64,
}

impl TreeHasher {
    /// Create an empty hasher.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed more data, sealing every segment it completes.
    pub fn update(&mut self, data: &[u8]) {
        let mut rest = data;
        while rest.len() >= self.chunk.remaining() {
            let (head, tail) = rest.split_at(self.chunk.remaining());
            self.chunk.absorb(head);
            let leaf = self.chunk.seal();
            trace!(index = self.leaves.len(), leaf = %leaf, "sealed tree hash segment");
            self.leaves.push(leaf);
            rest = tail;
        }
        self.chunk.absorb(rest);
        self.bytes_hashed += data.len() as u64;
    }

    /// Segments sealed so far, not counting the in-flight one.
    #[must_use]
    pub fn leaf_count(&self) -> usize {
        self.leaves.len()
    }

    /// Total bytes fed so far.
    #[must_use]
    pub fn bytes_hashed(&self) -> u64 {
        self.bytes_hashed
    }

    /// Close the stream and return its leaves.
    ///
    /// The in-flight segment becomes the last leaf when it holds data, or when
    /// no segment was ever sealed. The latter makes an empty stream a single
    /// leaf equal to `SHA256("")`. A stream that ends exactly on a segment
    /// boundary gets no empty trailing leaf.
    #[must_use]
    pub fn finish(mut self) -> LeafSequence {
        if self.leaves.is_empty() || !self.chunk.is_empty() {
            let leaf = self.chunk.seal();
            self.leaves.push(leaf);
        }
        LeafSequence::new(self.leaves)
    }

    /// Close the stream and return the tree hash.
    #[must_use]
    pub fn finalize(self) -> Sha256Digest {
        self.finish().root()
    }
}
