//! Error types for request signing.

use rustcas_core::CasError;

/// Errors that can occur while signing a request.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The secret id or secret key is missing or empty.
    #[error("missing credential: {0}")]
    MissingCredential(&'static str),

    /// A computed value cannot be sent as an HTTP header.
    #[error("invalid header value: {0}")]
    InvalidHeaderValue(String),
}

impl From<AuthError> for CasError {
    fn from(err: AuthError) -> Self {
        Self::Signing(err.to_string())
    }
}
