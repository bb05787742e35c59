//! 서브도메인/경로 기반 라우팅의 핵심 기능을 제공하는 모듈입니다.

mod error;
mod key;
mod rule;
mod table;

pub use error::RoutingError;
pub use key::RoutingKey;
pub use rule::{Destination, MatchKind, RouteRule, UpstreamTarget};
pub use table::RouteTable;
