//! Request signing integration tests.

#[cfg(test)]
mod tests {
    use rustcas_auth::{Credentials, RequestSigner, SigningRequest};
    use rustcas_core::{CasConfig, CasError};

    use crate::{header_str, request_parts, test_signer};

    /// Pull one `q-*` field out of an Authorization header value.
    fn token_field<'a>(token: &'a str, name: &str) -> &'a str {
        token
            .split('&')
            .find_map(|pair| pair.strip_prefix(name)?.strip_prefix('='))
            .unwrap_or_else(|| panic!("token has no {name} field: {token}"))
    }

    fn window_start(token: &str) -> i64 {
        let (start, _) = token_field(token, "q-sign-time").split_once(';').unwrap();
        start.parse().unwrap()
    }

    #[test]
    fn test_should_address_and_sign_request() {
        let config = CasConfig::builder()
            .region(rustcas_core::CasRegion::new("ap-chengdu"))
            .build();
        let signer = test_signer(&config);
        let mut parts = request_parts("GET", "/-/vaults?limit=10&marker=abc");

        let authorization = signer
            .authorize(&mut parts, &config.endpoint_host())
            .unwrap();

        assert_eq!(
            header_str(&parts, "host").unwrap(),
            "cas.ap-chengdu.myqcloud.com"
        );
        let token = header_str(&parts, "authorization").unwrap();
        assert_eq!(token, authorization.to_string());
        assert_eq!(token_field(token, "q-sign-algorithm"), "sha1");
        assert_eq!(token_field(token, "q-ak"), "AKIDintegration");
        assert_eq!(token_field(token, "q-url-param-list"), "limit;marker");
        assert_eq!(token_field(token, "q-header-list"), "");
        assert_eq!(
            token_field(token, "q-sign-time"),
            token_field(token, "q-key-time")
        );
    }

    #[test]
    fn test_should_use_configured_host_override() {
        let config = CasConfig::builder().host("cas.internal.example").build();
        let signer = test_signer(&config);
        let mut parts = request_parts("DELETE", "/-/vaults/photos");

        signer
            .authorize(&mut parts, &config.endpoint_host())
            .unwrap();

        assert_eq!(header_str(&parts, "host").unwrap(), "cas.internal.example");
    }

    #[test]
    fn test_should_apply_configured_expiry_window() {
        let config = CasConfig::builder().sign_expires(600).build();
        let signer = test_signer(&config);
        let mut parts = request_parts("GET", "/-/jobs");

        let authorization = signer
            .authorize(&mut parts, &config.endpoint_host())
            .unwrap();

        assert_eq!(
            authorization.sign_time.end - authorization.sign_time.start,
            600
        );
    }

    #[test]
    fn test_should_reproduce_signature_from_header() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let mut parts = request_parts("POST", "/-/vaults/photos/archives?tag=a%20b");

        signer
            .authorize(&mut parts, &config.endpoint_host())
            .unwrap();
        let token = header_str(&parts, "authorization").unwrap().to_owned();

        // What the service does: rebuild the request, resign at the stated time.
        let request = SigningRequest::from_parts(&parts);
        let recomputed = signer
            .sign_at(&request, window_start(&token) + 1)
            .unwrap();

        assert_eq!(recomputed.to_string(), token);
    }

    #[test]
    fn test_should_reject_tampered_request() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let mut parts = request_parts("POST", "/-/vaults/photos/archives");

        signer
            .authorize(&mut parts, &config.endpoint_host())
            .unwrap();
        let token = header_str(&parts, "authorization").unwrap().to_owned();
        let now = window_start(&token) + 1;

        let tampered = SigningRequest::new("POST", "/-/vaults/videos/archives");
        let resigned = signer.sign_at(&tampered, now).unwrap();

        assert_ne!(resigned.signature, token_field(&token, "q-signature"));
    }

    #[test]
    fn test_should_convert_missing_credential_to_cas_error() {
        let err: CasError = Credentials::new("", "secret").unwrap_err().into();
        assert!(matches!(err, CasError::Signing(_)));
        assert!(err.to_string().contains("secret id"));
    }

    #[test]
    fn test_should_sign_identically_across_signer_clones() {
        let signer = RequestSigner::from_credentials(Credentials::new("AKID", "key").unwrap());
        let clone = signer.clone();
        let request = SigningRequest::new("GET", "/-/vaults");

        let handle = std::thread::spawn(move || clone.sign_at(&request, 1_700_000_000));
        let from_thread = handle.join().unwrap().unwrap();

        let request = SigningRequest::new("GET", "/-/vaults");
        assert_eq!(signer.sign_at(&request, 1_700_000_000).unwrap(), from_thread);
    }
}
