//! WebSocket 등 프로토콜 업그레이드 요청의 양방향 중계를 담당합니다.

use std::net::IpAddr;

use bytes::Bytes;
use http_body_util::{BodyExt, Empty};
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tracing::{debug, warn};

use crate::body::{self, BoxError, BoxedBody};
use crate::proxy::adapter::apply_forwarding_headers;
use crate::proxy::ProxyError;
use crate::routing::UpstreamTarget;

/// 요청이 프로토콜 업그레이드(WebSocket 포함)를 요구하는지 확인합니다.
pub fn is_upgrade_request<B>(req: &Request<B>) -> bool {
    let wants_upgrade = req
        .headers()
        .get(header::CONNECTION)
        .and_then(|value| value.to_str().ok())
        .map(|value| {
            value
                .split(',')
                .any(|token| token.trim().eq_ignore_ascii_case("upgrade"))
        })
        .unwrap_or(false);

    wants_upgrade && req.headers().contains_key(header::UPGRADE)
}

/// 업그레이드 요청을 업스트림으로 중계합니다.
///
/// 전용 연결로 핸드셰이크를 전달하고, 업스트림이 101로 응답하면
/// 양쪽의 업그레이드된 스트림을 터널링합니다. 한쪽이 닫히거나
/// 에러가 나면 양쪽 모두 닫힙니다. 업스트림이 업그레이드를
/// 거부하면 그 응답을 그대로 클라이언트에 전달합니다.
pub async fn proxy_upgrade(
    mut req: Request<Incoming>,
    target: &UpstreamTarget,
    public_scheme: &str,
    client_ip: IpAddr,
) -> Result<Response<BoxedBody>, ProxyError> {
    let authority = target.authority();

    let stream = TcpStream::connect(&authority)
        .await
        .map_err(|e| ProxyError::UpstreamUnavailable {
            authority: authority.clone(),
            reason: e.to_string(),
        })?;

    let (mut sender, conn) = hyper::client::conn::http1::handshake(TokioIo::new(stream))
        .await
        .map_err(|e| ProxyError::UpstreamUnavailable {
            authority: authority.clone(),
            reason: e.to_string(),
        })?;

    tokio::spawn(async move {
        if let Err(e) = conn.with_upgrades().await {
            debug!(error = %e, "업스트림 업그레이드 연결 종료");
        }
    });

    // hyper::upgrade::on은 요청을 소비하기 전에 호출해야 합니다.
    let client_upgrade = hyper::upgrade::on(&mut req);

    let original_host = req
        .headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string());

    let path_and_query = req
        .uri()
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/")
        .to_string();

    let mut upstream_req = Request::builder()
        .method(req.method().clone())
        .uri(path_and_query)
        .body(Empty::<Bytes>::new())
        .map_err(|e| ProxyError::RequestBuild {
            reason: e.to_string(),
        })?;

    *upstream_req.headers_mut() = req.headers().clone();
    apply_forwarding_headers(
        upstream_req.headers_mut(),
        original_host.as_deref(),
        target,
        public_scheme,
        client_ip,
    );
    // 핸드셰이크 헤더는 정규화 이후에도 유지되어야 합니다.
    upstream_req
        .headers_mut()
        .insert(header::CONNECTION, HeaderValue::from_static("Upgrade"));

    let mut upstream_res = sender
        .send_request(upstream_req)
        .await
        .map_err(|e| ProxyError::UpstreamRequest {
            authority: authority.clone(),
            reason: e.to_string(),
        })?;

    if upstream_res.status() != StatusCode::SWITCHING_PROTOCOLS {
        debug!(status = %upstream_res.status(), "업스트림이 업그레이드를 거부");
        return Ok(upstream_res
            .map(|body| body.map_err(|e| -> BoxError { Box::new(e) }).boxed_unsync()));
    }

    let upstream_upgrade = hyper::upgrade::on(&mut upstream_res);

    tokio::spawn(async move {
        let upgraded = tokio::try_join!(client_upgrade, upstream_upgrade);
        let (client_io, upstream_io) = match upgraded {
            Ok(pair) => pair,
            Err(e) => {
                warn!(error = %e, "업그레이드 완료 실패");
                return;
            }
        };

        let mut client_io = TokioIo::new(client_io);
        let mut upstream_io = TokioIo::new(upstream_io);

        match tokio::io::copy_bidirectional(&mut client_io, &mut upstream_io).await {
            Ok((to_upstream, to_client)) => debug!(
                bytes_to_upstream = to_upstream,
                bytes_to_client = to_client,
                "업그레이드 터널 정상 종료"
            ),
            Err(e) => debug!(error = %e, "업그레이드 터널 종료"),
        }
        // 여기서 양쪽 스트림이 모두 드롭되어 반대편도 닫힙니다.
    });

    // 업스트림 핸드셰이크 헤더를 그대로 보존한 101 응답
    Ok(upstream_res.map(|_| body::empty()))
}
