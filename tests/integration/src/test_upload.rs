//! Upload preparation integration tests.

#[cfg(test)]
mod tests {
    use std::io::Write;
    use std::pin::Pin;
    use std::task::{Context, Poll};

    use rustcas_core::{CasConfig, CasError};
    use rustcas_integrity::{CONTENT_SHA256_HEADER, TREE_HASH_HEADER};
    use tokio::io::{AsyncRead, ReadBuf};

    use crate::{header_str, prepare_file_upload, prepare_upload, request_parts, test_signer};

    const EMPTY_SHA256: &str = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855";

    /// 2 MiB + 123 bytes of `i % 251`, so three leaves with a short tail.
    fn patterned_body() -> Vec<u8> {
        (0..2 * 1024 * 1024 + 123).map(|i| (i % 251) as u8).collect()
    }

    const PATTERNED_CONTENT_SHA256: &str =
        "030ccaa3b42e4c1a5f01d6f1e3cb1ac695331e7dd54f16592f818bc1a89fc62d";
    const PATTERNED_TREE_SHA256: &str =
        "1604c269569f445adeda65e39c43e20dc95cc91d34ace6b11bdd253434e62ad2";

    struct FailingReader;

    impl AsyncRead for FailingReader {
        fn poll_read(
            self: Pin<&mut Self>,
            _cx: &mut Context<'_>,
            _buf: &mut ReadBuf<'_>,
        ) -> Poll<std::io::Result<()>> {
            Poll::Ready(Err(std::io::Error::other("disk gone")))
        }
    }

    #[tokio::test]
    async fn test_should_attach_digest_headers_for_multi_segment_upload() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let mut parts = request_parts("POST", "/-/vaults/photos/archives");
        let body = patterned_body();

        let (staged, digests, _) = prepare_upload(&mut parts, body.as_slice(), &signer, &config)
            .await
            .unwrap();

        assert_eq!(staged.len(), body.len() as u64);
        assert_eq!(digests.content_sha256.to_hex(), PATTERNED_CONTENT_SHA256);
        assert_eq!(digests.tree_sha256.to_hex(), PATTERNED_TREE_SHA256);
        assert_eq!(
            header_str(&parts, CONTENT_SHA256_HEADER).unwrap(),
            PATTERNED_CONTENT_SHA256
        );
        assert_eq!(
            header_str(&parts, TREE_HASH_HEADER).unwrap(),
            PATTERNED_TREE_SHA256
        );
        assert_eq!(
            header_str(&parts, "content-length").unwrap(),
            body.len().to_string()
        );
    }

    #[tokio::test]
    async fn test_should_use_equal_digests_below_one_segment() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let mut parts = request_parts("POST", "/-/vaults/photos/archives");

        let (_, digests, _) = prepare_upload(&mut parts, &b"small archive"[..], &signer, &config)
            .await
            .unwrap();

        assert_eq!(digests.content_sha256, digests.tree_sha256);
        assert_eq!(
            header_str(&parts, CONTENT_SHA256_HEADER).unwrap(),
            header_str(&parts, TREE_HASH_HEADER).unwrap()
        );
    }

    #[tokio::test]
    async fn test_should_hash_empty_upload() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let mut parts = request_parts("POST", "/-/vaults/photos/archives");

        let (staged, _, _) = prepare_upload(&mut parts, &b""[..], &signer, &config)
            .await
            .unwrap();

        assert!(staged.is_empty());
        assert_eq!(header_str(&parts, CONTENT_SHA256_HEADER).unwrap(), EMPTY_SHA256);
        assert_eq!(header_str(&parts, TREE_HASH_HEADER).unwrap(), EMPTY_SHA256);
    }

    #[tokio::test]
    async fn test_should_not_depend_on_read_buffer_size() {
        let body = patterned_body();
        for read_buffer_size in [1024, 1024 * 1024 + 1, 4 * 1024 * 1024] {
            let config = CasConfig::builder()
                .read_buffer_size(read_buffer_size)
                .build();
            let signer = test_signer(&config);
            let mut parts = request_parts("POST", "/-/vaults/photos/archives");

            let (_, digests, _) = prepare_upload(&mut parts, body.as_slice(), &signer, &config)
                .await
                .unwrap();

            assert_eq!(digests.tree_sha256.to_hex(), PATTERNED_TREE_SHA256);
        }
    }

    #[test]
    fn test_should_prepare_upload_from_existing_file() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&patterned_body()).unwrap();
        file.flush().unwrap();

        let mut parts = request_parts("POST", "/-/vaults/photos/archives");
        let (digests, authorization) =
            prepare_file_upload(&mut parts, file.path(), &signer, &config).unwrap();

        assert_eq!(digests.content_sha256.to_hex(), PATTERNED_CONTENT_SHA256);
        assert_eq!(digests.tree_sha256.to_hex(), PATTERNED_TREE_SHA256);
        assert_eq!(
            header_str(&parts, "authorization").unwrap(),
            authorization.to_string()
        );
    }

    #[tokio::test]
    async fn test_should_surface_read_failure_as_integrity_error() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let mut parts = request_parts("POST", "/-/vaults/photos/archives");

        let result = prepare_upload(&mut parts, FailingReader, &signer, &config).await;

        assert!(matches!(result, Err(CasError::Integrity(_))));
        assert!(parts.headers.get("authorization").is_none());
        assert!(parts.headers.get(CONTENT_SHA256_HEADER).is_none());
    }

    #[test]
    fn test_should_fail_pair_when_file_is_missing() {
        let config = CasConfig::default();
        let signer = test_signer(&config);
        let dir = tempfile::tempdir().unwrap();
        let mut parts = request_parts("POST", "/-/vaults/photos/archives");

        let result = prepare_file_upload(&mut parts, &dir.path().join("gone"), &signer, &config);

        assert!(matches!(result, Err(CasError::Integrity(_))));
        assert!(parts.headers.is_empty());
    }

    #[tokio::test]
    async fn test_should_reject_zero_read_buffer() {
        let config = CasConfig::builder().read_buffer_size(0).build();
        let signer = test_signer(&config);
        let mut parts = request_parts("POST", "/-/vaults/photos/archives");

        let result = prepare_upload(&mut parts, &b"data"[..], &signer, &config).await;

        assert!(matches!(result, Err(CasError::InvalidConfig(_))));
    }
}
