//! Single-pass digest computation over readers.
//!
//! Every function here consumes its reader exactly once and never rewinds.
//! A caller that needs both digests opens the data twice (see
//! [`ArchiveDigests`](crate::ArchiveDigests)). A read error aborts the pass and
//! the partial hash state is dropped.

use std::io::{ErrorKind, Read};

use tokio::io::{AsyncRead, AsyncReadExt};
use tracing::debug;

use crate::digest::Sha256Digest;
use crate::error::IntegrityError;
use crate::hasher::{ContentHasher, TreeHasher};

/// Read size used when the caller does not choose one.
pub const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// Compute the linear SHA-256 of everything `reader` yields.
///
/// # Examples
///
/// ```
/// use rustcas_integrity::content_sha256;
///
/// let digest = content_sha256(&b""[..]).unwrap();
/// assert_eq!(
///     digest.to_hex(),
///     "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
/// );
/// ```
pub fn content_sha256<R: Read>(reader: R) -> Result<Sha256Digest, IntegrityError> {
    content_sha256_with_buffer(reader, DEFAULT_READ_BUFFER_SIZE)
}

/// [`content_sha256`] with an explicit read size.
pub fn content_sha256_with_buffer<R: Read>(
    mut reader: R,
    buffer_size: usize,
) -> Result<Sha256Digest, IntegrityError> {
    let mut hasher = ContentHasher::new();
    drain(&mut reader, buffer_size, |chunk| hasher.update(chunk))?;
    debug!(bytes = hasher.bytes_hashed(), "computed content sha256");
    Ok(hasher.finalize())
}

/// Compute the SHA-256 tree hash of everything `reader` yields.
///
/// # Examples
///
/// ```
/// use rustcas_integrity::{Sha256Digest, tree_sha256};
///
/// let digest = tree_sha256(&b"archive"[..]).unwrap();
/// assert_eq!(digest, Sha256Digest::of(b"archive"));
/// ```
pub fn tree_sha256<R: Read>(reader: R) -> Result<Sha256Digest, IntegrityError> {
    tree_sha256_with_buffer(reader, DEFAULT_READ_BUFFER_SIZE)
}

/// [`tree_sha256`] with an explicit read size.
pub fn tree_sha256_with_buffer<R: Read>(
    mut reader: R,
    buffer_size: usize,
) -> Result<Sha256Digest, IntegrityError> {
    let mut hasher = TreeHasher::new();
    drain(&mut reader, buffer_size, |chunk| hasher.update(chunk))?;
    let bytes = hasher.bytes_hashed();
    let leaves = hasher.finish();
    debug!(bytes, leaves = leaves.len(), "computed sha256 tree hash");
    Ok(leaves.root())
}

/// Async [`content_sha256`].
pub async fn content_sha256_async<R: AsyncRead + Unpin>(
    mut reader: R,
    buffer_size: usize,
) -> Result<Sha256Digest, IntegrityError> {
    let mut hasher = ContentHasher::new();
    drain_async(&mut reader, buffer_size, |chunk| hasher.update(chunk)).await?;
    debug!(bytes = hasher.bytes_hashed(), "computed content sha256");
    Ok(hasher.finalize())
}

/// Async [`tree_sha256`].
pub async fn tree_sha256_async<R: AsyncRead + Unpin>(
    mut reader: R,
    buffer_size: usize,
) -> Result<Sha256Digest, IntegrityError> {
    let mut hasher = TreeHasher::new();
    drain_async(&mut reader, buffer_size, |chunk| hasher.update(chunk)).await?;
    let bytes = hasher.bytes_hashed();
    let leaves = hasher.finish();
    debug!(bytes, leaves = leaves.len(), "computed sha256 tree hash");
    Ok(leaves.root())
}

/// Feed every chunk `reader` yields into `sink` until end of stream.
fn drain<R: Read>(
    reader: &mut R,
    buffer_size: usize,
    mut sink: impl FnMut(&[u8]),
) -> Result<(), IntegrityError> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    loop {
        match reader.read(&mut buf) {
            Ok(0) => return Ok(()),
            Ok(n) => sink(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(IntegrityError::StreamRead(e)),
        }
    }
}

async fn drain_async<R: AsyncRead + Unpin>(
    reader: &mut R,
    buffer_size: usize,
    mut sink: impl FnMut(&[u8]),
) -> Result<(), IntegrityError> {
    let mut buf = vec![0u8; buffer_size.max(1)];
    loop {
        match reader.read(&mut buf).await {
            Ok(0) => return Ok(()),
            Ok(n) => sink(&buf[..n]),
            Err(e) if e.kind() == ErrorKind::Interrupted => {}
            Err(e) => return Err(IntegrityError::StreamRead(e)),
        }
    }
}
