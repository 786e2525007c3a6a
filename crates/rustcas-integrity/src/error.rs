//! Error types for archive digest computation.

use rustcas_core::CasError;

/// Errors that can occur while computing archive digests.
#[derive(Debug, thiserror::Error)]
pub enum IntegrityError {
    /// Reading the byte stream failed. The digest computation is abandoned.
    #[error("failed to read stream: {0}")]
    StreamRead(#[source] std::io::Error),

    /// A tree hash was requested over an empty leaf sequence.
    #[error("cannot compute a tree hash over zero leaves")]
    EmptyInput,

    /// Copying an upload body into its staging file failed.
    #[error("failed to stage upload body: {0}")]
    Staging(#[source] std::io::Error),

    /// A concurrent hashing pass panicked or was cancelled.
    #[error("hashing task failed: {0}")]
    TaskJoin(String),

    /// A digest string is not 64 hex characters.
    #[error("invalid SHA-256 digest: {0}")]
    InvalidDigest(String),

    /// A digest could not be placed into an HTTP header.
    #[error("invalid header value: {0}")]
    InvalidHeader(#[from] http::header::InvalidHeaderValue),
}

impl From<IntegrityError> for CasError {
    fn from(err: IntegrityError) -> Self {
        Self::Integrity(err.to_string())
    }
}
