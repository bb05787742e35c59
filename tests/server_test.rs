use std::convert::Infallible;
use std::net::SocketAddr;
use std::time::Duration;

use http_body_util::Full;
use hyper::body::{Bytes, Incoming};
use hyper::header::{self, HeaderValue};
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use oznet_gateway::server::GatewayServer;
use oznet_gateway::settings::{AppSettings, ServerSettings, Settings, UpstreamSettings};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(5);

// 업스트림(OctoPrint 역할)을 흉내내는 로컬 HTTP 서버
async fn spawn_upstream() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        loop {
            let (stream, _) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(_) => break,
            };
            tokio::spawn(async move {
                let _ = hyper::server::conn::http1::Builder::new()
                    .serve_connection(TokioIo::new(stream), service_fn(upstream_service))
                    .with_upgrades()
                    .await;
            });
        }
    });

    addr
}

async fn upstream_service(
    mut req: Request<Incoming>,
) -> Result<Response<Full<Bytes>>, Infallible> {
    let response = match req.uri().path() {
        // 게이트웨이가 재작성해야 하는 경로 절대 리다이렉트
        "/redirect" => Response::builder()
            .status(StatusCode::FOUND)
            .header(header::LOCATION, "/printer/1")
            .header(header::X_FRAME_OPTIONS, "DENY")
            .header(header::X_CONTENT_TYPE_OPTIONS, "nosniff")
            .body(Full::new(Bytes::from_static(b"redirecting")))
            .unwrap(),

        // 수신한 전달 헤더를 응답 헤더로 되돌려줌
        "/echo" => {
            let empty = HeaderValue::from_static("");
            let echo = |name: &str| req.headers().get(name).cloned().unwrap_or_else(|| empty.clone());
            Response::builder()
                .status(StatusCode::OK)
                .header("x-echo-host", echo("host"))
                .header("x-echo-forwarded-host", echo("x-forwarded-host"))
                .header("x-echo-forwarded-proto", echo("x-forwarded-proto"))
                .header("x-echo-script-name", echo("x-script-name"))
                .body(Full::new(Bytes::from_static(b"echo")))
                .unwrap()
        }

        // 업그레이드 후 바이트를 그대로 되돌려주는 에코 터널
        "/ws" => {
            let on_upgrade = hyper::upgrade::on(&mut req);
            tokio::spawn(async move {
                if let Ok(upgraded) = on_upgrade.await {
                    let mut io = TokioIo::new(upgraded);
                    let mut buf = [0u8; 1024];
                    loop {
                        match io.read(&mut buf).await {
                            Ok(0) | Err(_) => break,
                            Ok(n) => {
                                if io.write_all(&buf[..n]).await.is_err() {
                                    break;
                                }
                            }
                        }
                    }
                }
            });
            Response::builder()
                .status(StatusCode::SWITCHING_PROTOCOLS)
                .header(header::UPGRADE, "websocket")
                .header(header::CONNECTION, "Upgrade")
                .body(Full::new(Bytes::new()))
                .unwrap()
        }

        _ => Response::builder()
            .status(StatusCode::OK)
            .body(Full::new(Bytes::from_static(b"upstream ok")))
            .unwrap(),
    };

    Ok(response)
}

// 임시 포트에 게이트웨이를 기동하고 주소를 반환
async fn spawn_gateway(upstream: SocketAddr, cert_dir: &str) -> SocketAddr {
    let settings = Settings {
        server: ServerSettings {
            http_port: 0,
            public_scheme: "https".to_string(),
            domain: "oznet".to_string(),
        },
        apps: AppSettings {
            cert_dir: cert_dir.to_string(),
            files_root: "/nonexistent".to_string(),
        },
        upstreams: vec![UpstreamSettings {
            subdomain: "3dprint".to_string(),
            scheme: "http".to_string(),
            host: "127.0.0.1".to_string(),
            port: upstream.port(),
        }],
        ..Settings::default()
    };

    let server = GatewayServer::new(settings).await.unwrap();
    let addr = server.local_addr().unwrap();
    tokio::spawn(server.run());
    addr
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_proxied_redirect_rewritten() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway(upstream, "/nonexistent").await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/redirect", gateway.port()))
        .header(reqwest::header::HOST, "3dprint.oznet")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::FOUND);
    // 경로 절대 Location이 공개 호스트 기준 절대 URL로 재작성됨
    assert_eq!(
        response.headers().get("location").unwrap(),
        "https://3dprint.oznet/printer/1"
    );
    // 업스트림의 프레이밍 정책 헤더는 제거됨
    assert!(response.headers().get("x-frame-options").is_none());
    assert!(response.headers().get("x-content-type-options").is_none());
}

#[tokio::test]
async fn test_proxied_forwarding_headers() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway(upstream, "/nonexistent").await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/echo", gateway.port()))
        .header(reqwest::header::HOST, "3dprint.oznet")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let header = |name: &str| response.headers().get(name).unwrap().to_str().unwrap().to_string();
    // Host는 업스트림 authority로, 원래 호스트는 X-Forwarded-Host로
    assert_eq!(header("x-echo-host"), format!("127.0.0.1:{}", upstream.port()));
    assert_eq!(header("x-echo-forwarded-host"), "3dprint.oznet");
    // 공개 스킴으로 고정
    assert_eq!(header("x-echo-forwarded-proto"), "https");
    assert_eq!(header("x-echo-script-name"), "/");
}

#[tokio::test]
async fn test_unmatched_request_gets_fallback_page() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway(upstream, "/nonexistent").await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/", gateway.port()))
        .header(reqwest::header::HOST, "unknown.oznet")
        .send()
        .await
        .unwrap();

    // 매칭 실패는 에러가 아니라 서비스 안내 페이지
    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("OzNet"));
    assert!(body.contains("3dprint"));
}

#[tokio::test]
async fn test_path_rule_wins_over_proxied_subdomain() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway(upstream, "/nonexistent").await;

    // 프록시되는 서브도메인이라도 /home 경로는 로컬 앱이 처리
    let response = client()
        .get(format!("http://127.0.0.1:{}/home", gateway.port()))
        .header(reqwest::header::HOST, "3dprint.oznet")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let body = response.text().await.unwrap();
    assert!(body.contains("OzNet"));
    assert!(!body.contains("upstream ok"));
}

#[tokio::test]
async fn test_hub_service_listing() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway(upstream, "/nonexistent").await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/hub/api/services", gateway.port()))
        .header(reqwest::header::HOST, "oznet")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    let content_type = response.headers().get("content-type").unwrap().to_str().unwrap();
    assert!(content_type.starts_with("application/json"));

    let services: serde_json::Value = response.json().await.unwrap();
    let services = services.as_array().unwrap();
    assert!(!services.is_empty());
    assert!(services.iter().any(|s| s["id"] == "home"));
}

#[tokio::test]
async fn test_certificate_download() {
    let upstream = spawn_upstream().await;
    let cert_dir = tempfile::tempdir().unwrap();
    std::fs::write(cert_dir.path().join("oznet-ca.crt"), b"cert-bytes").unwrap();
    let gateway = spawn_gateway(upstream, cert_dir.path().to_str().unwrap()).await;

    let response = client()
        .get(format!("http://127.0.0.1:{}/certs/oznet-ca.crt", gateway.port()))
        .header(reqwest::header::HOST, "oznet")
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), reqwest::StatusCode::OK);
    assert!(response
        .headers()
        .get("content-disposition")
        .unwrap()
        .to_str()
        .unwrap()
        .contains("attachment"));
    assert_eq!(response.bytes().await.unwrap().as_ref(), b"cert-bytes");

    // 허용되지 않은 확장자는 403
    let response = client()
        .get(format!("http://127.0.0.1:{}/certs/malware.exe", gateway.port()))
        .header(reqwest::header::HOST, "oznet")
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_websocket_tunnel() {
    let upstream = spawn_upstream().await;
    let gateway = spawn_gateway(upstream, "/nonexistent").await;

    let mut stream = TcpStream::connect(gateway).await.unwrap();
    stream
        .write_all(
            b"GET /ws HTTP/1.1\r\n\
              Host: 3dprint.oznet\r\n\
              Connection: Upgrade\r\n\
              Upgrade: websocket\r\n\
              \r\n",
        )
        .await
        .unwrap();

    // 101 응답 헤더 블록을 끝까지 읽음
    let mut response = Vec::new();
    let mut buf = [0u8; 1024];
    loop {
        let n = timeout(WAIT, stream.read(&mut buf)).await.unwrap().unwrap();
        assert!(n > 0, "업그레이드 응답 전에 연결이 닫힘");
        response.extend_from_slice(&buf[..n]);
        if response.windows(4).any(|w| w == b"\r\n\r\n") {
            break;
        }
    }
    assert!(response.starts_with(b"HTTP/1.1 101"));

    // 터널을 통한 에코 왕복
    stream.write_all(b"ping").await.unwrap();
    let mut echoed = [0u8; 4];
    timeout(WAIT, stream.read_exact(&mut echoed))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(&echoed, b"ping");

    // 클라이언트 쪽을 닫으면 터널 전체가 닫힘
    stream.shutdown().await.unwrap();
    let n = timeout(WAIT, stream.read(&mut buf)).await.unwrap().unwrap();
    assert_eq!(n, 0);
}
