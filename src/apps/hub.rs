use std::sync::Arc;

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};
use serde::Serialize;
use tracing::error;

use crate::apps::home::page;
use crate::apps::Handler;
use crate::body::{html_response, json_response, text_response, BoxedBody};

/// 서비스 상태 조회를 위한 좁은 인터페이스입니다.
///
/// 시스템 지표 수집 방법(셸 호출, /proc 파싱 등)은 구현체 뒤에
/// 숨겨지며 허브 애플리케이션과 게이트웨이 코어는 이 트레이트에만
/// 의존합니다.
#[async_trait]
pub trait MetricsProvider: Send + Sync {
    async fn system_stats(&self) -> SystemStats;
}

#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct SystemStats {
    pub cpu_percent: f64,
    pub memory_percent: f64,
    pub disk_percent: f64,
}

/// 지표 수집이 구성되지 않은 환경에서 사용하는 기본 구현체입니다.
pub struct NullMetrics;

#[async_trait]
impl MetricsProvider for NullMetrics {
    async fn system_stats(&self) -> SystemStats {
        SystemStats::default()
    }
}

#[derive(Clone, Debug, Serialize)]
pub struct ServiceEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub domain: Option<String>,
    pub status: String,
}

/// 서비스 관리 대시보드 애플리케이션입니다.
pub struct HubApp {
    services: Vec<ServiceEntry>,
    metrics: Arc<dyn MetricsProvider>,
}

impl HubApp {
    pub fn new(domain: &str, metrics: Arc<dyn MetricsProvider>) -> Self {
        let web = |id: &str, name: &str, description: &str| ServiceEntry {
            id: id.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            domain: Some(format!("{}.{}", id, domain)),
            status: "running".to_string(),
        };

        Self {
            services: vec![
                web("home", "OzNet Home", "Main documentation server"),
                web("hub", "OzNet Hub", "Service management"),
                web("files", "OzNet Files", "File server"),
                web("3dprint", "OctoPrint", "3D printer management"),
            ],
            metrics,
        }
    }

    /// 서비스 목록의 스냅샷을 값으로 반환합니다. 렌더링은 항상
    /// 이 스냅샷을 대상으로 하며 공유 가변 상태를 사용하지 않습니다.
    pub fn services_snapshot(&self) -> Vec<ServiceEntry> {
        self.services.clone()
    }

    fn dashboard_page(&self, services: &[ServiceEntry]) -> String {
        let mut rows = String::new();
        for service in services {
            rows.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                service.name,
                service.description,
                service.domain.as_deref().unwrap_or("-"),
                service.status,
            ));
        }

        page(
            "Hub - OzNet",
            &format!(
                "<h1>Service dashboard</h1>\n\
                 <table>\n\
                 <thead><tr><th>Service</th><th>Description</th><th>Domain</th><th>Status</th></tr></thead>\n\
                 <tbody>\n{}</tbody>\n\
                 </table>\n\
                 <p><a href=\"/hub/system\">System status</a></p>",
                rows
            ),
        )
    }

    fn system_page(&self, stats: SystemStats) -> String {
        page(
            "System - OzNet",
            &format!(
                "<h1>System status</h1>\n\
                 <ul>\n\
                 <li>CPU: {:.1}%</li>\n\
                 <li>Memory: {:.1}%</li>\n\
                 <li>Disk: {:.1}%</li>\n\
                 </ul>",
                stats.cpu_percent, stats.memory_percent, stats.disk_percent
            ),
        )
    }
}

#[async_trait]
impl Handler for HubApp {
    fn name(&self) -> &str {
        "hub"
    }

    async fn handle(&self, _req: Request<Incoming>, path: &str) -> Response<BoxedBody> {
        match path.trim_end_matches('/') {
            "" => {
                let snapshot = self.services_snapshot();
                html_response(StatusCode::OK, self.dashboard_page(&snapshot))
            }
            "/api/services" => {
                let snapshot = self.services_snapshot();
                match serde_json::to_string(&snapshot) {
                    Ok(json) => json_response(StatusCode::OK, json),
                    Err(e) => {
                        error!(error = %e, "서비스 목록 직렬화 실패");
                        text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error")
                    }
                }
            }
            "/system" => {
                let stats = self.metrics.system_stats().await;
                html_response(StatusCode::OK, self.system_page(stats))
            }
            _ => text_response(StatusCode::NOT_FOUND, "Not Found"),
        }
    }
}
