use http_body_util::BodyExt;
use hyper::header;
use hyper::StatusCode;
use oznet_gateway::certs::CertStore;

const CERT_BYTES: &[u8] = b"-----BEGIN CERTIFICATE-----\nMIIB\n-----END CERTIFICATE-----\n";

fn store_with_cert() -> (CertStore, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("oznet-ca.crt"), CERT_BYTES).unwrap();
    std::fs::write(dir.path().join("oznet-ca.pem"), CERT_BYTES).unwrap();
    (CertStore::new(dir.path()), dir)
}

#[tokio::test]
async fn test_serve_allowed_certificate() {
    let (store, _dir) = store_with_cert();

    let response = store.serve("oznet-ca.crt").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/x-x509-ca-cert"
    );
    // 브라우저가 렌더링하지 않고 저장하도록 attachment로 제공
    let disposition = response
        .headers()
        .get(header::CONTENT_DISPOSITION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(disposition.contains("attachment"));
    assert!(disposition.contains("oznet-ca.crt"));

    let body = response.into_body().collect().await.unwrap().to_bytes();
    assert_eq!(&body[..], CERT_BYTES);
}

#[tokio::test]
async fn test_serve_pem_content_type() {
    let (store, _dir) = store_with_cert();

    let response = store.serve("oznet-ca.pem").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/x-pem-file"
    );
}

#[tokio::test]
async fn test_disallowed_extension_rejected() {
    let (store, _dir) = store_with_cert();

    assert_eq!(store.serve("malware.exe").await.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.serve("config.toml").await.status(), StatusCode::FORBIDDEN);
    // 확장자가 없는 이름도 거부
    assert_eq!(store.serve("oznet-ca").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_extension_check_without_directory() {
    // 확장자 검사는 파일 시스템 접근 전에 수행되므로
    // 존재하지 않는 디렉터리에서도 403으로 동작해야 함
    let store = CertStore::new("/nonexistent/certs");
    assert_eq!(store.serve("malware.exe").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_path_traversal_rejected() {
    let (store, _dir) = store_with_cert();

    // 허용된 확장자라도 디렉터리 탈출 시도는 403
    assert_eq!(
        store.serve("../../etc/passwd.crt").await.status(),
        StatusCode::FORBIDDEN
    );
    assert_eq!(store.serve("/etc/ssl/ca.pem").await.status(), StatusCode::FORBIDDEN);
    assert_eq!(store.serve("sub/dir.crt").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_symlink_escape_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let outside = tempfile::tempdir().unwrap();
    let secret = outside.path().join("secret.crt");
    std::fs::write(&secret, b"secret").unwrap();
    std::os::unix::fs::symlink(&secret, dir.path().join("link.crt")).unwrap();

    let store = CertStore::new(dir.path());
    // 이름은 평범해 보여도 정규화된 경로가 디렉터리를 벗어나면 거부
    assert_eq!(store.serve("link.crt").await.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_missing_certificate_not_found() {
    let (store, _dir) = store_with_cert();
    assert_eq!(store.serve("missing.crt").await.status(), StatusCode::NOT_FOUND);
}
