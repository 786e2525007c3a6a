//! Client configuration.
//!
//! Provides [`CasConfig`] for tuning the integrity and signing core. Values
//! can be loaded from environment variables via [`CasConfig::from_env`].
//! Secret ids and keys are never part of the configuration; callers always
//! hand credentials to the signer directly.

use serde::{Deserialize, Serialize};
use typed_builder::TypedBuilder;

use crate::error::{CasError, CasResult};
use crate::types::{CasHost, CasRegion};

/// Default validity window of a request signature, in seconds.
const DEFAULT_SIGN_EXPIRES: u64 = 3600;

/// Default size of the buffer used for each read while hashing a stream.
const DEFAULT_READ_BUFFER_SIZE: usize = 64 * 1024;

/// RustCAS client configuration.
///
/// # Examples
///
/// ```
/// use rustcas_core::CasConfig;
///
/// let config = CasConfig::default();
/// assert_eq!(config.sign_expires, 3600);
/// assert_eq!(config.endpoint_host().as_str(), "cas.ap-guangzhou.myqcloud.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, TypedBuilder)]
#[serde(rename_all = "camelCase")]
pub struct CasConfig {
    /// Region the client talks to.
    #[builder(default)]
    pub region: CasRegion,

    /// Explicit endpoint host. When unset the regional public host is used.
    #[builder(default, setter(strip_option, into))]
    pub host: Option<String>,

    /// Validity window, in seconds, applied when a request does not carry its own.
    #[builder(default = DEFAULT_SIGN_EXPIRES)]
    pub sign_expires: u64,

    /// Size of each read issued against a stream being hashed.
    #[builder(default = DEFAULT_READ_BUFFER_SIZE)]
    pub read_buffer_size: usize,

    /// Log level filter string (e.g. `"info"`, `"debug"`).
    #[builder(default = String::from("info"))]
    pub log_level: String,
}

impl Default for CasConfig {
    fn default() -> Self {
        Self {
            region: CasRegion::default(),
            host: None,
            sign_expires: DEFAULT_SIGN_EXPIRES,
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
            log_level: String::from("info"),
        }
    }
}

impl CasConfig {
    /// Load configuration from environment variables.
    ///
    /// Reads the following environment variables (falling back to defaults):
    ///
    /// | Variable | Default |
    /// |----------|---------|
    /// | `CAS_REGION` | `ap-guangzhou` |
    /// | `CAS_HOST` | *(regional host)* |
    /// | `CAS_SIGN_EXPIRES` | `3600` |
    /// | `CAS_READ_BUFFER_SIZE` | `65536` |
    /// | `LOG_LEVEL` | `info` |
    #[must_use]
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(v) = std::env::var("CAS_REGION") {
            config.region = CasRegion::new(v);
        }
        if let Ok(v) = std::env::var("CAS_HOST") {
            if !v.is_empty() {
                config.host = Some(v);
            }
        }
        if let Ok(v) = std::env::var("CAS_SIGN_EXPIRES") {
            if let Ok(n) = v.parse::<u64>() {
                config.sign_expires = n;
            }
        }
        if let Ok(v) = std::env::var("CAS_READ_BUFFER_SIZE") {
            if let Ok(n) = v.parse::<usize>() {
                config.read_buffer_size = n;
            }
        }
        if let Ok(v) = std::env::var("LOG_LEVEL") {
            config.log_level = v;
        }

        config
    }

    /// Check that the configuration can drive the hasher and signer.
    ///
    /// # Errors
    ///
    /// Returns [`CasError::InvalidConfig`] for an empty region or a zero-sized
    /// read buffer.
    pub fn validate(&self) -> CasResult<()> {
        if self.region.as_str().is_empty() {
            return Err(CasError::InvalidConfig("region must not be empty".to_owned()));
        }
        if self.read_buffer_size == 0 {
            return Err(CasError::InvalidConfig(
                "read buffer size must be greater than zero".to_owned(),
            ));
        }
        Ok(())
    }

    /// The host every request is addressed to.
    #[must_use]
    pub fn endpoint_host(&self) -> CasHost {
        match &self.host {
            Some(host) => CasHost::new(host.clone()),
            None => CasHost::for_region(&self.region),
        }
    }
}
