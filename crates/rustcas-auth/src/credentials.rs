//! Credentials and the provider seam the signer reads them through.
//!
//! Credentials are always handed in by the caller. Nothing here reads the
//! environment or a credentials file.

use std::fmt;

use crate::error::AuthError;

/// A secret id / secret key pair.
///
/// Both parts are required: constructing credentials with an empty id or key
/// fails immediately, so a signer can never produce a token without them.
///
/// # Examples
///
/// ```
/// use rustcas_auth::{AuthError, Credentials};
///
/// let creds = Credentials::new("AKIDexample", "secret").unwrap();
/// assert_eq!(creds.secret_id(), "AKIDexample");
///
/// assert!(matches!(
///     Credentials::new("AKIDexample", ""),
///     Err(AuthError::MissingCredential(_))
/// ));
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    secret_id: String,
    secret_key: String,
}

impl Credentials {
    /// Create credentials, rejecting an empty id or key.
    pub fn new(
        secret_id: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Result<Self, AuthError> {
        let secret_id = secret_id.into();
        let secret_key = secret_key.into();
        if secret_id.is_empty() {
            return Err(AuthError::MissingCredential("secret id"));
        }
        if secret_key.is_empty() {
            return Err(AuthError::MissingCredential("secret key"));
        }
        Ok(Self {
            secret_id,
            secret_key,
        })
    }

    /// The public secret id, sent as `q-ak`.
    #[must_use]
    pub fn secret_id(&self) -> &str {
        &self.secret_id
    }

    /// The secret key. Never sent, never logged.
    #[must_use]
    pub fn secret_key(&self) -> &str {
        &self.secret_key
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"<redacted>")
            .finish()
    }
}

/// Source of the credentials used for each signature.
///
/// Implementations may rotate credentials between calls; the signer asks
/// for them once per request.
pub trait CredentialProvider: Send + Sync {
    /// Return the credentials to sign with.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::MissingCredential`] when no usable credentials are
    /// available.
    fn credentials(&self) -> Result<Credentials, AuthError>;
}

/// A provider that always returns the same credentials.
#[derive(Debug, Clone)]
pub struct StaticCredentialProvider {
    credentials: Credentials,
}

impl StaticCredentialProvider {
    /// Wrap a fixed credential pair.
    #[must_use]
    pub fn new(credentials: Credentials) -> Self {
        Self { credentials }
    }
}

impl CredentialProvider for StaticCredentialProvider {
    fn credentials(&self) -> Result<Credentials, AuthError> {
        Ok(self.credentials.clone())
    }
}
