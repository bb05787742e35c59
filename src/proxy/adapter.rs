use std::net::IpAddr;

use http_body_util::BodyExt;
use hyper::body::Incoming;
use hyper::header::{self, HeaderMap, HeaderName, HeaderValue};
use hyper::{Request, Response, Uri};
use hyper_util::client::legacy;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::rt::TokioExecutor;
use tracing::{error, info, instrument};

use crate::body::{BoxError, BoxedBody};
use crate::proxy::error::error_response;
use crate::proxy::{upgrade, ProxyError};
use crate::routing::UpstreamTarget;

const X_FORWARDED_HOST: HeaderName = HeaderName::from_static("x-forwarded-host");
const X_FORWARDED_PROTO: HeaderName = HeaderName::from_static("x-forwarded-proto");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");
const X_REAL_IP: HeaderName = HeaderName::from_static("x-real-ip");
const X_SCRIPT_NAME: HeaderName = HeaderName::from_static("x-script-name");

/// 리버스 프록시 어댑터입니다.
///
/// 일반 요청은 풀링된 클라이언트로 전달하고 응답 본문을 그대로
/// 스트리밍합니다. 업그레이드 요청은 전용 연결로 중계합니다.
#[derive(Clone)]
pub struct ProxyAdapter {
    client: legacy::Client<HttpConnector, Incoming>,
    public_scheme: String,
}

impl ProxyAdapter {
    pub fn new(public_scheme: impl Into<String>) -> Self {
        let connector = HttpConnector::new();
        let client = legacy::Client::builder(TokioExecutor::new())
            .build::<_, Incoming>(connector);

        Self {
            client,
            public_scheme: public_scheme.into(),
        }
    }

    /// 요청을 업스트림 대상으로 전달하고 후처리된 응답을 반환합니다.
    ///
    /// `public_host`는 리다이렉트 재작성에 사용되는 외부 관점의
    /// 호스트(예: "3dprint.oznet")입니다. 실패는 항상 요청 단위의
    /// 5xx 응답으로 변환됩니다.
    #[instrument(skip(self, req, target), fields(upstream = %target, public_host = %public_host))]
    pub async fn proxy_request(
        &self,
        req: Request<Incoming>,
        target: &UpstreamTarget,
        public_host: &str,
        client_ip: IpAddr,
    ) -> Response<BoxedBody> {
        let result = if upgrade::is_upgrade_request(&req) {
            upgrade::proxy_upgrade(req, target, &self.public_scheme, client_ip).await
        } else {
            self.forward(req, target, public_host, client_ip).await
        };

        match result {
            Ok(response) => response,
            Err(e) => {
                error!(error = %e, "프록시 요청 실패");
                error_response(&e)
            }
        }
    }

    async fn forward(
        &self,
        req: Request<Incoming>,
        target: &UpstreamTarget,
        public_host: &str,
        client_ip: IpAddr,
    ) -> Result<Response<BoxedBody>, ProxyError> {
        let original_host = host_header(&req);
        let uri = build_upstream_uri(target, req.uri())?;

        let (mut parts, body) = req.into_parts();
        parts.uri = uri;
        apply_forwarding_headers(
            &mut parts.headers,
            original_host.as_deref(),
            target,
            &self.public_scheme,
            client_ip,
        );
        let proxied_req = Request::from_parts(parts, body);

        let mut response = self
            .client
            .request(proxied_req)
            .await
            .map_err(|e| ProxyError::UpstreamUnavailable {
                authority: target.authority(),
                reason: e.to_string(),
            })?;

        info!(status = %response.status(), "업스트림 응답 수신");

        postprocess_response(response.headers_mut(), &self.public_scheme, public_host);

        Ok(response.map(|body| body.map_err(|e| -> BoxError { Box::new(e) }).boxed_unsync()))
    }
}

fn host_header<B>(req: &Request<B>) -> Option<String> {
    req.headers()
        .get(header::HOST)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
}

fn build_upstream_uri(target: &UpstreamTarget, original: &Uri) -> Result<Uri, ProxyError> {
    let path_and_query = original
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");

    format!("{}://{}{}", target.scheme, target.authority(), path_and_query)
        .parse()
        .map_err(|e: hyper::http::uri::InvalidUri| ProxyError::RequestBuild {
            reason: e.to_string(),
        })
}

/// 업스트림으로 전달하기 전에 요청 헤더를 정규화합니다.
///
/// `X-Forwarded-Proto`는 클라이언트가 실제 사용한 스킴과 무관하게
/// 게이트웨이의 공개 스킴으로 고정됩니다. 업스트림은 항상 게이트웨이의
/// 정식 스킴 뒤에 있다고 믿게 됩니다.
pub fn apply_forwarding_headers(
    headers: &mut HeaderMap,
    original_host: Option<&str>,
    target: &UpstreamTarget,
    public_scheme: &str,
    client_ip: IpAddr,
) {
    if let Ok(value) = HeaderValue::from_str(&target.authority()) {
        headers.insert(header::HOST, value);
    }
    if let Some(host) = original_host {
        if let Ok(value) = HeaderValue::from_str(host) {
            headers.insert(X_FORWARDED_HOST, value);
        }
    }
    if let Ok(value) = HeaderValue::from_str(public_scheme) {
        headers.insert(X_FORWARDED_PROTO, value);
    }
    if let Ok(value) = HeaderValue::from_str(&client_ip.to_string()) {
        headers.insert(X_FORWARDED_FOR, value.clone());
        headers.insert(X_REAL_IP, value);
    }
    headers.insert(X_SCRIPT_NAME, HeaderValue::from_static("/"));
}

/// 클라이언트로 반환하기 전에 업스트림 응답 헤더를 후처리합니다.
///
/// 경로 절대 `Location`은 게이트웨이의 공개 스킴과 호스트를 사용한
/// 절대 URL로 재작성하고, 업스트림의 프레이밍 정책 헤더는 제거합니다.
pub fn postprocess_response(headers: &mut HeaderMap, public_scheme: &str, public_host: &str) {
    if let Some(location) = headers
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(|value| value.to_string())
    {
        if let Some(rewritten) = rewrite_location(&location, public_scheme, public_host) {
            if let Ok(value) = HeaderValue::from_str(&rewritten) {
                info!(from = %location, to = %rewritten, "Location 헤더 재작성");
                headers.insert(header::LOCATION, value);
            }
        }
    }

    headers.remove(header::X_FRAME_OPTIONS);
    headers.remove(header::X_CONTENT_TYPE_OPTIONS);
}

/// 경로 절대 `Location` 값을 절대 URL로 재작성합니다.
///
/// 스킴을 이미 포함한 절대 URL과 스킴 상대(`//host/...`) URL은
/// 변경 없이 통과시키며, 그 외 상대 참조도 건드리지 않습니다.
/// 경로와 쿼리는 그대로 보존됩니다.
pub fn rewrite_location(location: &str, public_scheme: &str, public_host: &str) -> Option<String> {
    if url::Url::parse(location).is_ok() {
        // 이미 절대 URL
        return None;
    }
    if !location.starts_with('/') || location.starts_with("//") {
        return None;
    }

    Some(format!("{}://{}{}", public_scheme, public_host, location))
}
