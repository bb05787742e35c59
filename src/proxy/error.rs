use std::fmt;

use hyper::{Response, StatusCode};

use crate::body::{full, BoxedBody};

/// 프록시 처리 중 발생하는 에러를 표현하는 열거형입니다.
/// 모든 변종은 요청 단위의 실패이며 프로세스를 종료시키지 않습니다.
#[derive(Debug)]
pub enum ProxyError {
    /// 업스트림 연결 실패 (거부/타임아웃/리셋)
    UpstreamUnavailable {
        authority: String,
        reason: String,
    },
    /// 업스트림 요청 전송 또는 응답 수신 실패
    UpstreamRequest {
        authority: String,
        reason: String,
    },
    /// 프록시 요청 생성 실패
    RequestBuild {
        reason: String,
    },
}

impl fmt::Display for ProxyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProxyError::UpstreamUnavailable { authority, reason } =>
                write!(f, "업스트림 {} 연결 실패: {}", authority, reason),
            ProxyError::UpstreamRequest { authority, reason } =>
                write!(f, "업스트림 {} 요청 실패: {}", authority, reason),
            ProxyError::RequestBuild { reason } =>
                write!(f, "프록시 요청 생성 실패: {}", reason),
        }
    }
}

impl std::error::Error for ProxyError {}

/// 프록시 에러를 클라이언트 응답으로 변환합니다.
/// 내부 토폴로지를 드러내지 않는 일반적인 본문만 포함합니다.
pub fn error_response(_error: &ProxyError) -> Response<BoxedBody> {
    Response::builder()
        .status(StatusCode::INTERNAL_SERVER_ERROR)
        .body(full("Proxy error"))
        .unwrap()
}
