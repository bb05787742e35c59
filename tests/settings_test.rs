use oznet_gateway::settings::Settings;
use serial_test::serial;

// 테스트 전후 환경변수 초기화를 위한 헬퍼 함수
fn cleanup_env() {
    std::env::remove_var("GATEWAY_CONFIG_FILE");
    std::env::remove_var("GATEWAY_HTTP_PORT");
    std::env::remove_var("PORT");
    std::env::remove_var("GATEWAY_PUBLIC_SCHEME");
    std::env::remove_var("GATEWAY_DOMAIN");
    std::env::remove_var("GATEWAY_CERT_DIR");
    std::env::remove_var("GATEWAY_FILES_ROOT");
    std::env::remove_var("GATEWAY_UPSTREAM_SUBDOMAIN");
    std::env::remove_var("GATEWAY_UPSTREAM_HOST");
    std::env::remove_var("GATEWAY_UPSTREAM_PORT");
    std::env::remove_var("GATEWAY_LOG_FORMAT");
    std::env::remove_var("GATEWAY_LOG_OUTPUT");
}

// 테스트용 임시 TOML 파일 생성 헬퍼
fn create_test_toml(content: &str) -> (String, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let file_path = dir.path().join("test_config.toml");
    std::fs::write(&file_path, content).unwrap();
    (file_path.to_str().unwrap().to_string(), dir)
}

#[test]
#[serial]
fn test_default_settings() {
    cleanup_env();

    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.server.http_port, 3000);
    assert_eq!(settings.server.public_scheme, "https");
    assert_eq!(settings.server.domain, "oznet");

    // 기본 업스트림은 OctoPrint 하나
    assert_eq!(settings.upstreams.len(), 1);
    assert_eq!(settings.upstreams[0].subdomain, "3dprint");
    assert_eq!(settings.upstreams[0].port, 5000);

    cleanup_env();
}

#[test]
#[serial]
fn test_port_env_precedence() {
    cleanup_env();

    // 관례적인 PORT 변수를 따름
    std::env::set_var("PORT", "8081");
    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.server.http_port, 8081);

    // GATEWAY_HTTP_PORT가 PORT보다 우선
    std::env::set_var("GATEWAY_HTTP_PORT", "9090");
    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.server.http_port, 9090);

    cleanup_env();
}

#[test]
#[serial]
fn test_invalid_env_values() {
    cleanup_env();

    // 범위를 벗어난 포트
    std::env::set_var("GATEWAY_HTTP_PORT", "99999");
    assert!(Settings::from_env().is_err());
    cleanup_env();

    // 허용되지 않은 공개 스킴
    std::env::set_var("GATEWAY_PUBLIC_SCHEME", "ftp");
    assert!(Settings::from_env().is_err());
    cleanup_env();

    // 점이 포함된 업스트림 서브도메인
    std::env::set_var("GATEWAY_UPSTREAM_SUBDOMAIN", "a.b");
    assert!(Settings::from_env().is_err());
    cleanup_env();
}

#[test]
#[serial]
fn test_env_overrides() {
    cleanup_env();

    std::env::set_var("GATEWAY_DOMAIN", "homelab");
    std::env::set_var("GATEWAY_CERT_DIR", "/tmp/certs");
    std::env::set_var("GATEWAY_UPSTREAM_HOST", "192.168.1.50");
    std::env::set_var("GATEWAY_UPSTREAM_PORT", "8080");

    let settings = Settings::from_env().unwrap();
    assert_eq!(settings.server.domain, "homelab");
    assert_eq!(settings.apps.cert_dir, "/tmp/certs");
    assert_eq!(settings.upstreams[0].host, "192.168.1.50");
    assert_eq!(settings.upstreams[0].port, 8080);

    cleanup_env();
}

#[tokio::test]
#[serial]
async fn test_toml_file_settings() {
    cleanup_env();

    let (path, _dir) = create_test_toml(
        r#"
        [server]
        http_port = 4000
        public_scheme = "http"
        domain = "lab"

        [apps]
        cert_dir = "/srv/certs"

        [[upstreams]]
        subdomain = "3dprint"
        host = "10.0.0.5"
        port = 5000

        [[upstreams]]
        subdomain = "cam"
        host = "10.0.0.6"
        port = 8080
        "#,
    );

    let settings = Settings::from_toml_file(&path).await.unwrap();
    assert_eq!(settings.server.http_port, 4000);
    assert_eq!(settings.server.public_scheme, "http");
    assert_eq!(settings.server.domain, "lab");
    assert_eq!(settings.apps.cert_dir, "/srv/certs");
    assert_eq!(settings.upstreams.len(), 2);
    // 스킴 생략 시 http가 기본값
    assert_eq!(settings.upstreams[1].scheme, "http");

    cleanup_env();
}

#[tokio::test]
#[serial]
async fn test_toml_file_validation() {
    cleanup_env();

    // 동일 서브도메인 중복 정의는 거부
    let (path, _dir) = create_test_toml(
        r#"
        [[upstreams]]
        subdomain = "3dprint"
        host = "10.0.0.5"
        port = 5000

        [[upstreams]]
        subdomain = "3dprint"
        host = "10.0.0.6"
        port = 5001
        "#,
    );
    assert!(Settings::from_toml_file(&path).await.is_err());

    cleanup_env();
}

#[tokio::test]
#[serial]
async fn test_load_prefers_config_file() {
    cleanup_env();

    let (path, _dir) = create_test_toml(
        r#"
        [server]
        http_port = 4100
        "#,
    );
    std::env::set_var("GATEWAY_CONFIG_FILE", &path);
    // 파일이 지정되면 환경 변수 경로는 무시됨
    std::env::set_var("GATEWAY_HTTP_PORT", "4200");

    let settings = Settings::load().await.unwrap();
    assert_eq!(settings.server.http_port, 4100);

    cleanup_env();
}
