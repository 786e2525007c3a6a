//! Region and endpoint host definitions.

use std::fmt;

/// Service name prefixed to every regional endpoint host.
const SERVICE_NAME: &str = "cas";

/// Domain suffix shared by every regional endpoint host.
const HOST_SUFFIX: &str = "myqcloud.com";

/// CAS region identifier, e.g. `ap-chengdu`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CasRegion(String);

impl CasRegion {
    /// Default region used when none is configured.
    pub const DEFAULT: &str = "ap-guangzhou";

    /// Create a new region.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Self {
        Self(region.into())
    }

    /// Get the region as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CasRegion {
    fn default() -> Self {
        Self(Self::DEFAULT.to_owned())
    }
}

impl fmt::Display for CasRegion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Endpoint host sent in the `Host` header of every request.
///
/// # Examples
///
/// ```
/// use rustcas_core::{CasHost, CasRegion};
///
/// let host = CasHost::for_region(&CasRegion::new("ap-chengdu"));
/// assert_eq!(host.as_str(), "cas.ap-chengdu.myqcloud.com");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct CasHost(String);

impl CasHost {
    /// Use an explicit host name, e.g. for a private endpoint.
    #[must_use]
    pub fn new(host: impl Into<String>) -> Self {
        Self(host.into())
    }

    /// Build the public endpoint host for a region.
    #[must_use]
    pub fn for_region(region: &CasRegion) -> Self {
        Self(format!("{SERVICE_NAME}.{region}.{HOST_SUFFIX}"))
    }

    /// Get the host as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CasHost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
