//! OzNet Gateway는 사설 네트워크의 단일 진입점으로, 서브도메인과
//! 경로 접두 기반 라우팅을 지원하는 경량 게이트웨이입니다.
//!
//! # 주요 기능
//!
//! - 서브도메인/경로 접두 기반 요청 디스패치
//! - 고정 업스트림으로의 리버스 프록시 (WebSocket 업그레이드 포함)
//! - 리다이렉트 재작성과 전달 헤더 정규화
//! - 격리 검증을 거치는 인증서 다운로드 엔드포인트
//!
//! # 예제
//!
//! ```
//! use oznet_gateway::routing::{
//!     Destination, RouteRule, RouteTable, RoutingKey, UpstreamTarget,
//! };
//!
//! let mut table = RouteTable::new();
//!
//! // 3dprint 서브도메인을 OctoPrint 업스트림으로 프록시
//! table.add_rule(
//!     RouteRule::subdomain(
//!         "octoprint",
//!         "3dprint",
//!         Destination::Upstream(UpstreamTarget::new("http", "127.0.0.1", 5000)),
//!     )
//!     .unwrap(),
//! );
//!
//! let key = RoutingKey::new("3dprint", "/printer/1");
//! assert!(table.resolve(&key).is_some());
//!
//! // 매칭이 없으면 폴백 응답기가 처리합니다
//! let unknown = RoutingKey::new("mail", "/");
//! assert!(table.resolve(&unknown).is_none());
//! ```

pub mod apps;
pub mod body;
pub mod certs;
pub mod fallback;
pub mod logging;
pub mod proxy;
pub mod routing;
pub mod server;
pub mod settings;
