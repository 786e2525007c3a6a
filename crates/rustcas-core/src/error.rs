//! Error types for the RustCAS core.

/// Core error type for RustCAS.
///
/// The hashing and signing crates each return their own error enum; callers
/// that drive both in one operation convert them into this type.
#[derive(Debug, thiserror::Error)]
pub enum CasError {
    /// A configuration value is out of range or malformed.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Computing an archive digest failed.
    #[error("integrity check failed: {0}")]
    Integrity(String),

    /// Signing a request failed.
    #[error("request signing failed: {0}")]
    Signing(String),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for RustCAS operations.
pub type CasResult<T> = Result<T, CasError>;
