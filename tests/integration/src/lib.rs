//! Integration tests for the RustCAS integrity and signing core.
//!
//! These tests drive the hasher and the signer together the way an HTTP
//! transport would: stage an upload body, attach both digest headers, then
//! address and sign the request. No server is involved.
//!
//! Run them with:
//! ```text
//! cargo test -p rustcas-integration
//! ```

use std::sync::Once;

use http::request::Parts;
use rustcas_auth::{Authorization, Credentials, RequestSigner};
use rustcas_core::{CasConfig, CasError, CasResult};
use rustcas_integrity::{ArchiveDigests, StagedBody};
use tokio::io::AsyncRead;
use tracing::info;

static INIT: Once = Once::new();

/// Filter used when `RUST_LOG` is unset: the configured log level.
#[must_use]
pub fn fallback_filter(config: &CasConfig) -> tracing_subscriber::EnvFilter {
    tracing_subscriber::EnvFilter::new(&config.log_level)
}

/// Initialize tracing (once).
pub fn init_tracing(config: &CasConfig) {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| fallback_filter(config)),
            )
            .with_test_writer()
            .init();
    });
}

/// Create a signer with fixed test credentials and the defaults of `config`.
#[must_use]
pub fn test_signer(config: &CasConfig) -> RequestSigner {
    init_tracing(config);

    let creds = Credentials::new("AKIDintegration", "integration-secret")
        .unwrap_or_else(|err| panic!("test credentials are valid: {err}"));
    RequestSigner::from_credentials(creds).with_default_expires(config.sign_expires)
}

/// Build request parts for `method` and `uri` with an empty body.
#[must_use]
pub fn request_parts(method: &str, uri: &str) -> Parts {
    let (parts, ()) = http::Request::builder()
        .method(method)
        .uri(uri)
        .body(())
        .unwrap_or_else(|err| panic!("test request is valid: {err}"))
        .into_parts();
    parts
}

/// Stage `body`, attach its digest and length headers to `parts`, then
/// address and sign the request for the configured endpoint.
///
/// The staged body is returned so the caller can stream it as the request
/// body.
pub async fn prepare_upload<R: AsyncRead + Unpin>(
    parts: &mut Parts,
    body: R,
    signer: &RequestSigner,
    config: &CasConfig,
) -> CasResult<(StagedBody, ArchiveDigests, Authorization)> {
    config.validate()?;

    let staged = StagedBody::stage_async(body).await?;
    let digests = staged.digests_with_buffer(config.read_buffer_size).await?;
    digests.apply_to(&mut parts.headers)?;
    parts
        .headers
        .insert(http::header::CONTENT_LENGTH, http::HeaderValue::from(staged.len()));

    let authorization = signer.authorize(parts, &config.endpoint_host())?;
    info!(
        len = staged.len(),
        content_sha256 = %digests.content_sha256,
        tree_sha256 = %digests.tree_sha256,
        "prepared upload"
    );
    Ok((staged, digests, authorization))
}

/// Same as [`prepare_upload`] for a body already on disk, without staging.
pub fn prepare_file_upload(
    parts: &mut Parts,
    path: &std::path::Path,
    signer: &RequestSigner,
    config: &CasConfig,
) -> CasResult<(ArchiveDigests, Authorization)> {
    config.validate()?;

    let digests = ArchiveDigests::from_path_blocking(path, config.read_buffer_size)?;
    digests.apply_to(&mut parts.headers)?;
    let authorization = signer.authorize(parts, &config.endpoint_host())?;
    Ok((digests, authorization))
}

/// Fail with [`CasError::Internal`] when a header that should be present is not.
pub fn header_str<'a>(parts: &'a Parts, name: &str) -> CasResult<&'a str> {
    parts
        .headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| CasError::Internal(anyhow::anyhow!("missing header {name}")))
}

mod test_signing;
mod test_upload;

#[cfg(test)]
mod tests {
    use rustcas_core::CasConfig;

    use crate::fallback_filter;

    #[test]
    fn test_should_fall_back_to_configured_log_level() {
        let config = CasConfig::builder().log_level("debug".into()).build();
        assert_eq!(fallback_filter(&config).to_string(), "debug");

        let scoped = CasConfig::builder()
            .log_level("rustcas_auth=trace".into())
            .build();
        assert_eq!(fallback_filter(&scoped).to_string(), "rustcas_auth=trace");
    }
}
