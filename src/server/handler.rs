use std::net::SocketAddr;
use std::time::Instant;

use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response};
use uuid::Uuid;

use crate::apps::Handler;
use crate::body::BoxedBody;
use crate::fallback::FallbackPage;
use crate::logging::{log_request, RequestLog};
use crate::proxy::ProxyAdapter;
use crate::routing::{Destination, MatchKind, RouteRule, RouteTable, RoutingKey};

/// 요청 디스패처입니다.
///
/// 요청마다 라우팅 키를 계산하고, 라우팅 테이블에서 최초로 매칭되는
/// 규칙의 목적지를 정확히 한 번 호출합니다. 매칭이 없으면 폴백
/// 응답기를 호출합니다. 요청이 조용히 버려지는 경우는 없습니다.
pub struct RequestHandler {
    table: RouteTable,
    proxy: ProxyAdapter,
    fallback: FallbackPage,
    domain: String,
}

impl RequestHandler {
    pub fn new(
        table: RouteTable,
        proxy: ProxyAdapter,
        fallback: FallbackPage,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            table,
            proxy,
            fallback,
            domain: domain.into(),
        }
    }

    pub async fn dispatch(
        &self,
        req: Request<Incoming>,
        remote_addr: SocketAddr,
    ) -> Result<Response<BoxedBody>, std::convert::Infallible> {
        let request_id = Uuid::new_v4().to_string();
        let start_time = Instant::now();
        let mut log = RequestLog::new(request_id);
        log.with_request(&req);

        let key = RoutingKey::from_request(&req);

        let response = match self.table.resolve(&key) {
            Some(rule) => {
                log.with_destination(&rule.name);
                self.invoke(rule, req, &key, remote_addr).await
            }
            None => {
                log.with_destination("fallback");
                self.fallback.handle(req, &key.path).await
            }
        };

        log.with_response(response.status());
        log.duration_ms = start_time.elapsed().as_millis() as u64;
        log_request(&log);

        Ok(response)
    }

    /// 매칭된 규칙의 목적지를 호출합니다. 위임 이후에는 요청을
    /// 다시 검사하거나 재시도하지 않습니다.
    async fn invoke(
        &self,
        rule: &RouteRule,
        req: Request<Incoming>,
        key: &RoutingKey,
        remote_addr: SocketAddr,
    ) -> Response<BoxedBody> {
        match &rule.destination {
            Destination::Local(handler) => {
                let relative = rule.relative_path(&key.path).to_string();
                handler.handle(req, &relative).await
            }
            Destination::Upstream(target) => {
                let public_host = self.public_host(rule, &req);
                self.proxy
                    .proxy_request(req, target, &public_host, remote_addr.ip())
                    .await
            }
        }
    }

    /// 리다이렉트 재작성에 사용할 외부 관점의 호스트를 계산합니다.
    /// 서브도메인 규칙이면 원래 겨냥된 `<서브도메인>.<도메인>`이고,
    /// 그 외에는 인바운드 Host 헤더(포트 제외)를 사용합니다.
    fn public_host<B>(&self, rule: &RouteRule, req: &Request<B>) -> String {
        match rule.kind {
            MatchKind::Subdomain => format!("{}.{}", rule.value, self.domain),
            MatchKind::PathPrefix => req
                .headers()
                .get(hyper::header::HOST)
                .and_then(|value| value.to_str().ok())
                .and_then(|value| value.split(':').next())
                .map(|value| value.to_string())
                .unwrap_or_else(|| self.domain.clone()),
        }
    }

    pub async fn handle_connection<I>(
        &self,
        io: I,
        remote_addr: SocketAddr,
    ) -> std::result::Result<(), Box<dyn std::error::Error + Send + Sync>>
    where
        I: hyper::rt::Read + hyper::rt::Write + Send + Unpin + 'static,
    {
        // 업그레이드 패스스루를 위해 with_upgrades가 필요합니다.
        http1::Builder::new()
            .serve_connection(io, service_fn(|req| self.dispatch(req, remote_addr)))
            .with_upgrades()
            .await
            .map_err(|e| e.into())
    }
}
