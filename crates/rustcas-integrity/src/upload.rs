//! Upload body staging and the two-pass digest pair.
//!
//! The service wants both the linear digest and the tree digest of an
//! archive before the body is sent. Each pass consumes its own reader, so a
//! body is first staged into a temporary file that can be opened as often as
//! needed. The two passes then run in parallel over separate handles and the
//! pair is returned only when both succeed.

use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use http::HeaderMap;
use http::header::{HeaderName, HeaderValue};
use tempfile::NamedTempFile;
use tokio::io::{AsyncRead, AsyncWriteExt};
use tracing::debug;

use crate::digest::Sha256Digest;
use crate::error::IntegrityError;
use crate::hasher::{ContentHasher, TreeHasher};
use crate::stream::{
    DEFAULT_READ_BUFFER_SIZE, content_sha256_with_buffer, tree_sha256_with_buffer,
};

/// Header carrying the linear SHA-256 of an archive body.
pub const CONTENT_SHA256_HEADER: &str = "x-cas-content-sha256";

/// Header carrying the SHA-256 tree hash of an archive body.
pub const TREE_HASH_HEADER: &str = "x-cas-sha256-tree-hash";

// ---------------------------------------------------------------------------
// ArchiveDigests
// ---------------------------------------------------------------------------

/// Linear and tree digests of one archive body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArchiveDigests {
    /// SHA-256 of the whole body.
    pub content_sha256: Sha256Digest,
    /// SHA-256 tree hash over 1 MiB segments of the body.
    pub tree_sha256: Sha256Digest,
}

impl ArchiveDigests {
    /// Compute both digests over an in-memory body.
    ///
    /// # Examples
    ///
    /// ```
    /// use rustcas_integrity::ArchiveDigests;
    ///
    /// let digests = ArchiveDigests::from_bytes(b"tiny archive");
    /// assert_eq!(digests.content_sha256, digests.tree_sha256);
    /// ```
    #[must_use]
    pub fn from_bytes(data: &[u8]) -> Self {
        let mut content = ContentHasher::new();
        content.update(data);
        let mut tree = TreeHasher::new();
        tree.update(data);
        Self {
            content_sha256: content.finalize(),
            tree_sha256: tree.finalize(),
        }
    }

    /// Compute both digests of a file, one thread per pass.
    pub fn from_path_blocking(
        path: impl AsRef<Path>,
        buffer_size: usize,
    ) -> Result<Self, IntegrityError> {
        let path = path.as_ref();

        let (content, tree) = std::thread::scope(|scope| {
            let content = scope.spawn(|| hash_file(path, Pass::Content, buffer_size));
            let tree = scope.spawn(|| hash_file(path, Pass::Tree, buffer_size));
            (join_thread(content), join_thread(tree))
        });

        let digests = Self {
            content_sha256: content?,
            tree_sha256: tree?,
        };
        debug!(path = %path.display(), ?digests, "computed archive digests");
        Ok(digests)
    }

    /// Compute both digests of a file on the blocking pool, one task per pass.
    ///
    /// If either pass fails the whole call fails; a pass still running at that
    /// point finishes in the background and its result is discarded.
    pub async fn from_path(
        path: impl Into<PathBuf>,
        buffer_size: usize,
    ) -> Result<Self, IntegrityError> {
        let path = path.into();

        let content = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || hash_file(&path, Pass::Content, buffer_size))
        };
        let tree = {
            let path = path.clone();
            tokio::task::spawn_blocking(move || hash_file(&path, Pass::Tree, buffer_size))
        };

        let (content_sha256, tree_sha256) =
            tokio::try_join!(join_task(content), join_task(tree))?;

        let digests = Self {
            content_sha256,
            tree_sha256,
        };
        debug!(path = %path.display(), ?digests, "computed archive digests");
        Ok(digests)
    }

    /// Set the two digest headers on an outgoing request.
    pub fn apply_to(&self, headers: &mut HeaderMap) -> Result<(), IntegrityError> {
        headers.insert(
            HeaderName::from_static(CONTENT_SHA256_HEADER),
            HeaderValue::from_str(&self.content_sha256.to_hex())?,
        );
        headers.insert(
            HeaderName::from_static(TREE_HASH_HEADER),
            HeaderValue::from_str(&self.tree_sha256.to_hex())?,
        );
        Ok(())
    }
}

#[derive(Debug, Clone, Copy)]
enum Pass {
    Content,
    Tree,
}

fn hash_file(path: &Path, pass: Pass, buffer_size: usize) -> Result<Sha256Digest, IntegrityError> {
    let file = File::open(path).map_err(IntegrityError::StreamRead)?;
    match pass {
        Pass::Content => content_sha256_with_buffer(file, buffer_size),
        Pass::Tree => tree_sha256_with_buffer(file, buffer_size),
    }
}

fn join_thread(
    handle: std::thread::ScopedJoinHandle<'_, Result<Sha256Digest, IntegrityError>>,
) -> Result<Sha256Digest, IntegrityError> {
    handle
        .join()
        .map_err(|_| IntegrityError::TaskJoin("hashing thread panicked".to_owned()))?
}

async fn join_task(
    handle: tokio::task::JoinHandle<Result<Sha256Digest, IntegrityError>>,
) -> Result<Sha256Digest, IntegrityError> {
    handle
        .await
        .map_err(|e| IntegrityError::TaskJoin(e.to_string()))?
}

// ---------------------------------------------------------------------------
// StagedBody
// ---------------------------------------------------------------------------

/// An upload body copied into a temporary file.
///
/// The file is deleted when the value is dropped, on success and on failure
/// alike.
#[derive(Debug)]
pub struct StagedBody {
    file: NamedTempFile,
    len: u64,
}

impl StagedBody {
    /// Copy `reader` into a new temporary file.
    pub fn stage<R: Read>(mut reader: R) -> Result<Self, IntegrityError> {
        let mut file = NamedTempFile::new().map_err(IntegrityError::Staging)?;
        let len = std::io::copy(&mut reader, file.as_file_mut()).map_err(IntegrityError::Staging)?;
        file.as_file_mut()
            .flush()
            .map_err(IntegrityError::Staging)?;
        debug!(path = %file.path().display(), len, "staged upload body");
        Ok(Self { file, len })
    }

    /// Copy an async `reader` into a new temporary file.
    pub async fn stage_async<R: AsyncRead + Unpin>(mut reader: R) -> Result<Self, IntegrityError> {
        let file = NamedTempFile::new().map_err(IntegrityError::Staging)?;
        let handle = file.reopen().map_err(IntegrityError::Staging)?;
        let mut writer = tokio::fs::File::from_std(handle);
        let len = tokio::io::copy(&mut reader, &mut writer)
            .await
            .map_err(IntegrityError::Staging)?;
        writer.flush().await.map_err(IntegrityError::Staging)?;
        debug!(path = %file.path().display(), len, "staged upload body");
        Ok(Self { file, len })
    }

    /// Location of the staged file.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// Body length in bytes, suitable for `Content-Length`.
    #[must_use]
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the staged body is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Open an independent read handle, e.g. for sending the body.
    pub fn reopen(&self) -> Result<File, IntegrityError> {
        self.file.reopen().map_err(IntegrityError::Staging)
    }

    /// Compute both digests, blocking the current thread.
    pub fn digests_blocking(&self) -> Result<ArchiveDigests, IntegrityError> {
        ArchiveDigests::from_path_blocking(self.path(), DEFAULT_READ_BUFFER_SIZE)
    }

    /// Compute both digests with an explicit read size.
    pub async fn digests_with_buffer(
        &self,
        buffer_size: usize,
    ) -> Result<ArchiveDigests, IntegrityError> {
        ArchiveDigests::from_path(self.path(), buffer_size).await
    }

    /// Compute both digests on the blocking pool.
    pub async fn digests(&self) -> Result<ArchiveDigests, IntegrityError> {
        self.digests_with_buffer(DEFAULT_READ_BUFFER_SIZE).await
    }
}
