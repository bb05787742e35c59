//! 고정 업스트림 대상으로의 리버스 프록시 어댑터 모듈입니다.

mod adapter;
mod error;
mod upgrade;

pub use adapter::{
    apply_forwarding_headers, postprocess_response, rewrite_location, ProxyAdapter,
};
pub use error::ProxyError;
pub use upgrade::is_upgrade_request;
