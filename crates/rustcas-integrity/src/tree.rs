//! Bottom-up reduction of leaf digests into a tree hash.
//!
//! Each level is scanned left to right in steps of two. A pair becomes
//! `SHA256(left || right)` over the raw 32-byte digests; an unpaired trailing
//! digest moves up to the next level unchanged. The service verifies uploads
//! against exactly this shape, so the carry rule must not be "balanced" away
//! when the leaf count is not a power of two.
//!
//! ```text
//! level 0:  L0   L1   L2   L3   L4
//! level 1:  H(L0|L1)  H(L2|L3)  L4
//! level 2:  H(H01|H23)          L4
//! level 3:  H(H0123|L4)
//! ```

use sha2::{Digest as _, Sha256};

use crate::digest::Sha256Digest;
use crate::error::IntegrityError;

/// Hash the concatenation of two digests' raw bytes.
#[must_use]
pub fn combine(left: &Sha256Digest, right: &Sha256Digest) -> Sha256Digest {
    let mut hasher = Sha256::new();
    hasher.update(left.as_bytes());
    hasher.update(right.as_bytes());
    Sha256Digest::from_hasher(hasher)
}

/// Reduce an ordered leaf sequence to its root digest.
///
/// # Errors
///
/// Returns [`IntegrityError::EmptyInput`] when `leaves` is empty.
///
/// # Examples
///
/// ```
/// use rustcas_integrity::{Sha256Digest, combine, tree_hash};
///
/// let leaves = [Sha256Digest::of(b"a"), Sha256Digest::of(b"b"), Sha256Digest::of(b"c")];
/// let root = tree_hash(&leaves).unwrap();
/// assert_eq!(root, combine(&combine(&leaves[0], &leaves[1]), &leaves[2]));
/// ```
pub fn tree_hash(leaves: &[Sha256Digest]) -> Result<Sha256Digest, IntegrityError> {
    if leaves.is_empty() {
        return Err(IntegrityError::EmptyInput);
    }
    Ok(reduce(leaves))
}

/// Reduce a non-empty leaf slice.
fn reduce(leaves: &[Sha256Digest]) -> Sha256Digest {
    debug_assert!(!leaves.is_empty());

    let mut level = leaves.to_vec();
    while level.len() > 1 {
        level = next_level(&level);
    }
    level[0]
}

/// Build the parent level of `level`, carrying an odd trailing digest.
fn next_level(level: &[Sha256Digest]) -> Vec<Sha256Digest> {
    level
        .chunks(2)
        .map(|pair| pair.get(1).map_or(pair[0], |right| combine(&pair[0], right)))
        .collect()
}

/// Ordered leaf digests of one stream, in content-offset order.
///
/// A sequence produced by [`TreeHasher`](crate::TreeHasher) always holds at
/// least one leaf, so its root is infallible.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeafSequence(Vec<Sha256Digest>);

impl LeafSequence {
    /// Only the hasher builds sequences; it guarantees at least one leaf.
    pub(crate) fn new(leaves: Vec<Sha256Digest>) -> Self {
        debug_assert!(!leaves.is_empty());
        Self(leaves)
    }

    /// The leaves in content order.
    #[must_use]
    pub fn as_slice(&self) -> &[Sha256Digest] {
        &self.0
    }

    /// Number of leaves.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always `false`; kept for API symmetry with `len`.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The tree hash over these leaves.
    #[must_use]
    pub fn root(&self) -> Sha256Digest {
        reduce(&self.0)
    }

    /// Take the leaves out.
    #[must_use]
    pub fn into_vec(self) -> Vec<Sha256Digest> {
        self.0
    }
}
