//! 게이트웨이 뒤에서 동작하는 내부 애플리케이션 모듈입니다.
//!
//! 각 애플리케이션은 요청을 받아 완성된 응답을 만들어내는
//! 핸들러 능력(capability)으로만 게이트웨이에 노출됩니다.

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::{Request, Response};

use crate::body::BoxedBody;

mod files;
mod home;
mod hub;

pub use files::FilesApp;
pub use home::HomeApp;
pub(crate) use home::page;
pub use hub::{HubApp, MetricsProvider, NullMetrics, ServiceEntry, SystemStats};

/// 로컬 핸들러 트레이트
///
/// 디스패처는 라우팅 규칙이 선택한 핸들러를 호출할 뿐이며
/// 핸들러 내부 동작에는 관여하지 않습니다. `path`는 경로 접두
/// 규칙으로 매칭된 경우 접두가 제거된 나머지 경로입니다.
#[async_trait]
pub trait Handler: Send + Sync {
    /// 핸들러의 고유 이름을 반환합니다.
    fn name(&self) -> &str;

    /// 요청을 처리하고 완성된 응답을 반환합니다.
    async fn handle(&self, req: Request<Incoming>, path: &str) -> Response<BoxedBody>;
}
