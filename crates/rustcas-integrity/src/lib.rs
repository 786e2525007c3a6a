//! Archive integrity digests for RustCAS.
//!
//! The archive service verifies every upload against two SHA-256 values:
//!
//! - the **content digest**, a plain SHA-256 of the whole body, and
//! - the **tree digest**: the body is cut into 1 MiB segments by content
//!   offset, each segment is hashed into a leaf, and leaves are combined
//!   pairwise, bottom-up, carrying an odd trailing digest to the next level.
//!
//! Both are single-pass and streaming. They share no state, so a caller that
//! needs both runs them over two independent readers, in parallel if it
//! wants.
//!
//! # Usage
//!
//! ```rust
//! use rustcas_integrity::{ArchiveDigests, content_sha256, tree_sha256};
//!
//! let body = vec![7u8; 3 * 1024 * 1024];
//! let content = content_sha256(body.as_slice()).unwrap();
//! let tree = tree_sha256(body.as_slice()).unwrap();
//! assert_eq!(ArchiveDigests::from_bytes(&body).tree_sha256, tree);
//! assert_ne!(content, tree);
//! ```
//!
//! # Empty input
//!
//! A zero-length stream hashes to a single leaf, the digest of the empty
//! segment, so both of its digests equal `SHA256("")`. Only [`tree_hash`]
//! over an explicitly empty leaf slice fails, with
//! [`IntegrityError::EmptyInput`].
//!
//! # Modules
//!
//! - [`digest`] - The [`Sha256Digest`] value type
//! - [`error`] - Integrity error types
//! - [`hasher`] - Incremental content and tree hashers
//! - [`stream`] - Reader-driven single-pass digests
//! - [`tree`] - Leaf reduction into the tree hash
//! - [`upload`] - Body staging and the parallel two-pass digest pair

pub mod digest;
pub mod error;
pub mod hasher;
pub mod stream;
pub mod tree;
pub mod upload;

pub use digest::Sha256Digest;
pub use error::IntegrityError;
pub use hasher::{ContentHasher, SEGMENT_SIZE, TreeHasher};
pub use stream::{
    DEFAULT_READ_BUFFER_SIZE, content_sha256, content_sha256_async, content_sha256_with_buffer,
    tree_sha256, tree_sha256_async, tree_sha256_with_buffer,
};
pub use tree::{LeafSequence, combine, tree_hash};
pub use upload::{ArchiveDigests, CONTENT_SHA256_HEADER, StagedBody, TREE_HASH_HEADER};
