use std::net::SocketAddr;
use std::sync::Arc;

use tracing::info;

use super::handler::RequestHandler;
use super::listener::GatewayListener;
use super::Result;
use crate::apps::{FilesApp, HomeApp, HubApp, NullMetrics};
use crate::certs::CertStore;
use crate::fallback::FallbackPage;
use crate::proxy::ProxyAdapter;
use crate::routing::{Destination, RouteRule, RouteTable, RoutingError, UpstreamTarget};
use crate::settings::Settings;

/// 설정으로부터 라우팅 테이블을 구성합니다.
///
/// 규칙 순서는 고정입니다: 개발용 경로 접두 규칙(`/home`, `/hub`,
/// `/files`, `/certs`)을 먼저 등록하고, 그 다음 서브도메인 규칙을
/// 등록합니다. 잘못된 규칙은 기동 실패로 이어집니다.
pub fn build_route_table(settings: &Settings) -> std::result::Result<RouteTable, RoutingError> {
    let scheme = &settings.server.public_scheme;
    let domain = &settings.server.domain;

    let home = Arc::new(HomeApp::new(scheme.clone(), domain.clone()));
    let hub = Arc::new(HubApp::new(domain, Arc::new(NullMetrics)));
    let files = Arc::new(FilesApp::new(settings.apps.files_root.clone()));
    let certs = Arc::new(CertStore::new(settings.apps.cert_dir.clone()));

    let mut table = RouteTable::new();

    // 경로 접두 규칙 (서브도메인 없이 접근하는 개발용 라우트)
    table.add_rule(RouteRule::path_prefix(
        "home-path",
        "/home",
        Destination::Local(home.clone()),
    )?);
    table.add_rule(RouteRule::path_prefix(
        "hub-path",
        "/hub",
        Destination::Local(hub.clone()),
    )?);
    table.add_rule(RouteRule::path_prefix(
        "files-path",
        "/files",
        Destination::Local(files.clone()),
    )?);
    table.add_rule(RouteRule::path_prefix(
        "certs-path",
        "/certs",
        Destination::Local(certs),
    )?);

    // 서브도메인 규칙
    table.add_rule(RouteRule::subdomain(
        "home",
        "home",
        Destination::Local(home.clone()),
    )?);
    table.add_rule(RouteRule::subdomain(
        "server",
        "server",
        Destination::Local(home),
    )?);
    table.add_rule(RouteRule::subdomain("hub", "hub", Destination::Local(hub))?);
    table.add_rule(RouteRule::subdomain(
        "files",
        "files",
        Destination::Local(files),
    )?);

    // 프록시되는 서브도메인마다 정확히 하나의 업스트림 대상
    for upstream in &settings.upstreams {
        table.add_rule(RouteRule::subdomain(
            upstream.subdomain.clone(),
            upstream.subdomain.clone(),
            Destination::Upstream(UpstreamTarget::new(
                upstream.scheme.clone(),
                upstream.host.clone(),
                upstream.port,
            )),
        )?);
    }

    Ok(table)
}

/// 게이트웨이 서버입니다. 설정으로부터 라우팅 테이블과 핸들러를
/// 구성하고 리스너를 바인딩합니다.
pub struct GatewayServer {
    handler: Arc<RequestHandler>,
    listener: GatewayListener,
}

impl GatewayServer {
    pub async fn new(settings: Settings) -> Result<Self> {
        let table = build_route_table(&settings)?;
        info!(rules = table.len(), "라우팅 테이블 구성 완료");

        let proxy = ProxyAdapter::new(settings.server.public_scheme.clone());
        let fallback = FallbackPage::new(
            settings.server.public_scheme.clone(),
            settings.server.domain.clone(),
        );

        let handler = Arc::new(RequestHandler::new(
            table,
            proxy,
            fallback,
            settings.server.domain.clone(),
        ));

        let listener = GatewayListener::new(&settings.server).await?;

        Ok(Self { handler, listener })
    }

    pub fn local_addr(&self) -> Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub async fn run(self) -> Result<()> {
        self.listener.run(self.handler).await
    }
}
