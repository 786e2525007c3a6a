//! HMAC-SHA1 request signing for the cold-archive storage service.
//!
//! Every request to the service carries a time-windowed `Authorization`
//! token derived from a secret id / secret key pair. This crate builds that
//! token: it canonicalizes the method, path, query parameters and headers,
//! hashes the result with SHA-1 and signs it with a two-stage HMAC-SHA1 key
//! derivation bound to the validity window.
//!
//! # Usage
//!
//! ```rust
//! use rustcas_auth::{Credentials, RequestSigner, SigningRequest};
//!
//! let signer = RequestSigner::from_credentials(
//!     Credentials::new("AKIDexample", "secretkey").unwrap(),
//! );
//!
//! let request = SigningRequest::new("POST", "/-/vaults/photos/archives")
//!     .header("Host", "cas.ap-chengdu.myqcloud.com")
//!     .expires(600);
//!
//! let token = signer.sign_at(&request, 1_700_000_000).unwrap();
//! assert_eq!(token.header_list, "host");
//! assert!(token.to_string().contains("&q-signature="));
//! ```
//!
//! # Modules
//!
//! - [`canonical`] - Format string and string-to-sign construction
//! - [`credentials`] - Credential pair and provider trait
//! - [`error`] - Signing error types
//! - [`signer`] - Token derivation and header attachment

pub mod canonical;
pub mod credentials;
pub mod error;
pub mod signer;

pub use credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
pub use error::AuthError;
pub use signer::{
    Authorization, DEFAULT_EXPIRES, RequestSigner, SIGN_ALGORITHM, SignTime, SigningRequest,
    compute_signature, derive_sign_key,
};
