//! Authorization token derivation.
//!
//! Every request carries an `Authorization` header of the form:
//!
//! ```text
//! q-sign-algorithm=sha1&q-ak=<SecretId>&q-sign-time=<t0;t1>&q-key-time=<t0;t1>
//!   &q-header-list=<keys>&q-url-param-list=<keys>&q-signature=<hex>
//! ```
//!
//! where:
//!
//! ```text
//! t0           = now - 1
//! t1           = t0 + expires
//! SignKey      = hex(HMAC-SHA1(SecretKey, "t0;t1"))
//! StringToSign = "sha1\n" + "t0;t1\n" + hex(SHA1(FormatString)) + "\n"
//! Signature    = hex(HMAC-SHA1(SignKey, StringToSign))
//! ```
//!
//! `SignKey` is used as the second HMAC key in its hex text form, which is
//! what the service recomputes on its side.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use hmac::{Hmac, KeyInit, Mac};
use http::HeaderValue;
use percent_encoding::percent_decode_str;
use rustcas_core::{CasConfig, CasHost};
use sha1::{Digest, Sha1};
use tracing::debug;

use crate::canonical::{build_format_string, build_key_list, build_string_to_sign};
use crate::credentials::{CredentialProvider, Credentials, StaticCredentialProvider};
use crate::error::AuthError;

/// The only signing algorithm the service accepts.
pub const SIGN_ALGORITHM: &str = "sha1";

/// Validity window, in seconds, used when neither the request nor the signer
/// overrides it.
pub const DEFAULT_EXPIRES: u64 = 3600;

type HmacSha1 = Hmac<Sha1>;

// ---------------------------------------------------------------------------
// SignTime
// ---------------------------------------------------------------------------

/// The `[t0, t1]` unix-time window a signature is valid for.
///
/// # Examples
///
/// ```
/// use rustcas_auth::SignTime;
///
/// let window = SignTime::new(1_700_000_000, 3600);
/// assert_eq!(window.to_string(), "1699999999;1700003599");
///
/// // Zero means the signature is valid for a single instant.
/// assert_eq!(SignTime::new(1_700_000_000, 0).to_string(), "1699999999;1699999999");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SignTime {
    /// Start of the window, one second before the signing instant.
    pub start: i64,
    /// End of the window.
    pub end: i64,
}

impl SignTime {
    /// Build the window for a signature made at unix time `now`.
    #[must_use]
    pub fn new(now: i64, expires: u64) -> Self {
        let start = now.saturating_sub(1);
        Self {
            start,
            end: start.saturating_add_unsigned(expires),
        }
    }
}

impl fmt::Display for SignTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{};{}", self.start, self.end)
    }
}

// ---------------------------------------------------------------------------
// SigningRequest
// ---------------------------------------------------------------------------

/// The parts of an HTTP request that go into its signature.
///
/// Header and parameter keys are case-insensitive and stored lowercase; when
/// two keys differ only in case, the one set last wins.
///
/// # Examples
///
/// ```
/// use rustcas_auth::SigningRequest;
///
/// let request = SigningRequest::new("GET", "/-/vaults")
///     .param("limit", "10")
///     .header("Host", "cas.ap-chengdu.myqcloud.com")
///     .expires(60);
/// assert_eq!(request.headers().keys().next().map(String::as_str), Some("host"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SigningRequest {
    method: String,
    pathname: String,
    headers: BTreeMap<String, String>,
    params: BTreeMap<String, String>,
    expires: Option<u64>,
}

impl SigningRequest {
    /// Start a request. An empty method means `GET`; an empty path means `/`.
    #[must_use]
    pub fn new(method: impl Into<String>, pathname: impl Into<String>) -> Self {
        let method = method.into();
        let pathname = pathname.into();
        Self {
            method: if method.is_empty() {
                "GET".to_owned()
            } else {
                method
            },
            pathname: if pathname.is_empty() {
                "/".to_owned()
            } else {
                pathname
            },
            headers: BTreeMap::new(),
            params: BTreeMap::new(),
            expires: None,
        }
    }

    /// Take the method, path and decoded query parameters of a prepared request.
    ///
    /// Query components are percent-decoded as URI components, so `+` stays a
    /// literal plus sign. Headers are not copied; add the ones that should be
    /// signed with [`SigningRequest::header`].
    #[must_use]
    pub fn from_parts(parts: &http::request::Parts) -> Self {
        let mut request = Self::new(parts.method.as_str(), parts.uri.path());
        if let Some(query) = parts.uri.query() {
            for (key, value) in parse_query(query) {
                request = request.param(key, value);
            }
        }
        request
    }

    /// Add a header to sign.
    #[must_use]
    pub fn header(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.headers
            .insert(key.as_ref().to_lowercase(), value.into());
        self
    }

    /// Add a query parameter to sign.
    #[must_use]
    pub fn param(mut self, key: impl AsRef<str>, value: impl Into<String>) -> Self {
        self.params.insert(key.as_ref().to_lowercase(), value.into());
        self
    }

    /// Override the validity window for this request.
    #[must_use]
    pub fn expires(mut self, seconds: u64) -> Self {
        self.expires = Some(seconds);
        self
    }

    /// HTTP method as given.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Request path.
    #[must_use]
    pub fn pathname(&self) -> &str {
        &self.pathname
    }

    /// Signed headers keyed by lowercase name.
    #[must_use]
    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    /// Signed query parameters keyed by lowercase name.
    #[must_use]
    pub fn params(&self) -> &BTreeMap<String, String> {
        &self.params
    }
}

// ---------------------------------------------------------------------------
// Authorization
// ---------------------------------------------------------------------------

/// A derived authorization token. [`Display`](fmt::Display) renders the
/// `Authorization` header value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Authorization {
    /// The secret id (`q-ak`).
    pub access_key_id: String,
    /// Validity window, used for both `q-sign-time` and `q-key-time`.
    pub sign_time: SignTime,
    /// Sorted lowercase signed header names joined with `;`.
    pub header_list: String,
    /// Sorted lowercase signed query parameter names joined with `;`.
    pub url_param_list: String,
    /// Hex-encoded HMAC-SHA1 signature.
    pub signature: String,
}

impl fmt::Display for Authorization {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "q-sign-algorithm={SIGN_ALGORITHM}&q-ak={ak}&q-sign-time={time}&q-key-time={time}\
             &q-header-list={headers}&q-url-param-list={params}&q-signature={signature}",
            ak = self.access_key_id,
            time = self.sign_time,
            headers = self.header_list,
            params = self.url_param_list,
            signature = self.signature,
        )
    }
}

// ---------------------------------------------------------------------------
// RequestSigner
// ---------------------------------------------------------------------------

/// Signs requests with credentials from a [`CredentialProvider`].
///
/// # Examples
///
/// ```
/// use rustcas_auth::{Credentials, RequestSigner, SigningRequest};
///
/// let signer = RequestSigner::from_credentials(Credentials::new("AKID", "secret").unwrap());
/// let request = SigningRequest::new("GET", "/-/vaults");
///
/// let token = signer.sign_at(&request, 1_700_000_000).unwrap().to_string();
/// assert!(token.starts_with("q-sign-algorithm=sha1&q-ak=AKID&q-sign-time=1699999999;1700003599"));
/// ```
#[derive(Clone)]
pub struct RequestSigner {
    provider: Arc<dyn CredentialProvider>,
    default_expires: u64,
}

impl fmt::Debug for RequestSigner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestSigner")
            .field("default_expires", &self.default_expires)
            .finish_non_exhaustive()
    }
}

impl RequestSigner {
    /// Create a signer reading credentials from `provider`.
    pub fn new(provider: impl CredentialProvider + 'static) -> Self {
        Self {
            provider: Arc::new(provider),
            default_expires: DEFAULT_EXPIRES,
        }
    }

    /// Create a signer with fixed credentials.
    #[must_use]
    pub fn from_credentials(credentials: Credentials) -> Self {
        Self::new(StaticCredentialProvider::new(credentials))
    }

    /// Create a signer whose default window comes from `config`.
    pub fn from_config(provider: impl CredentialProvider + 'static, config: &CasConfig) -> Self {
        Self::new(provider).with_default_expires(config.sign_expires)
    }

    /// Change the window applied to requests without their own.
    #[must_use]
    pub fn with_default_expires(mut self, seconds: u64) -> Self {
        self.default_expires = seconds;
        self
    }

    /// Sign `request` at the current wall-clock time.
    pub fn sign(&self, request: &SigningRequest) -> Result<Authorization, AuthError> {
        self.sign_at(request, chrono::Utc::now().timestamp())
    }

    /// Sign `request` as if made at unix time `now`.
    pub fn sign_at(&self, request: &SigningRequest, now: i64) -> Result<Authorization, AuthError> {
        let credentials = self.provider.credentials()?;
        let sign_time = SignTime::new(now, request.expires.unwrap_or(self.default_expires));
        let sign_time_str = sign_time.to_string();

        debug!(
            access_key_id = %credentials.secret_id(),
            sign_time = %sign_time_str,
            method = %request.method,
            pathname = %request.pathname,
            "Signing request"
        );

        let sign_key = derive_sign_key(credentials.secret_key(), &sign_time_str);

        let format_string = build_format_string(
            &request.method,
            &request.pathname,
            &request.params,
            &request.headers,
        );
        debug!(format_string = %format_string, "Built format string");

        let format_digest = hex::encode(Sha1::digest(format_string.as_bytes()));
        let string_to_sign = build_string_to_sign(&sign_time_str, &format_digest);
        debug!(string_to_sign = %string_to_sign, "Built string to sign");

        Ok(Authorization {
            access_key_id: credentials.secret_id().to_owned(),
            sign_time,
            header_list: build_key_list(&request.headers),
            url_param_list: build_key_list(&request.params),
            signature: compute_signature(&sign_key, &string_to_sign),
        })
    }

    /// Address `parts` to `host` and attach a fresh `Authorization` header.
    ///
    /// The method, path and query string of `parts` are signed; headers are
    /// not.
    pub fn authorize(
        &self,
        parts: &mut http::request::Parts,
        host: &CasHost,
    ) -> Result<Authorization, AuthError> {
        let host_value = HeaderValue::from_str(host.as_str())
            .map_err(|_| AuthError::InvalidHeaderValue(host.to_string()))?;
        parts.headers.insert(http::header::HOST, host_value);

        let authorization = self.sign(&SigningRequest::from_parts(parts))?;
        let token = authorization.to_string();
        let token_value = HeaderValue::from_str(&token)
            .map_err(|_| AuthError::InvalidHeaderValue(token.clone()))?;
        parts.headers.insert(http::header::AUTHORIZATION, token_value);

        Ok(authorization)
    }
}

/// Split a raw query string into percent-decoded pairs. A key without `=`
/// gets an empty value.
fn parse_query(query: &str) -> impl Iterator<Item = (String, String)> + '_ {
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            (decode_component(key), decode_component(value))
        })
}

fn decode_component(input: &str) -> String {
    percent_decode_str(input).decode_utf8_lossy().into_owned()
}

/// Derive the hex `SignKey` from the secret key and the sign window.
#[must_use]
pub fn derive_sign_key(secret_key: &str, sign_time: &str) -> String {
    hex::encode(hmac_sha1(secret_key.as_bytes(), sign_time.as_bytes()))
}

/// Compute the hex signature of `string_to_sign`, keyed by the hex text of
/// `sign_key`.
#[must_use]
pub fn compute_signature(sign_key: &str, string_to_sign: &str) -> String {
    hex::encode(hmac_sha1(sign_key.as_bytes(), string_to_sign.as_bytes()))
}

/// Compute HMAC-SHA1.
fn hmac_sha1(key: &[u8], data: &[u8]) -> Vec<u8> {
    let mut mac = HmacSha1::new_from_slice(key).expect("HMAC can accept any key length");
    mac.update(data);
    mac.finalize().into_bytes().to_vec()
}
