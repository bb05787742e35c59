use std::fmt;

/// 라우팅 규칙 구성 관련 에러를 표현하는 열거형입니다.
#[derive(Debug, PartialEq)]
pub enum RoutingError {
    /// 유효하지 않은 경로 접두 패턴
    InvalidPathPrefix {
        pattern: String,
        reason: String,
    },
    /// 유효하지 않은 서브도메인 라벨
    InvalidSubdomain {
        label: String,
        reason: String,
    },
}

impl fmt::Display for RoutingError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoutingError::InvalidPathPrefix { pattern, reason } =>
                write!(f, "유효하지 않은 경로 접두 패턴 {}: {}", pattern, reason),
            RoutingError::InvalidSubdomain { label, reason } =>
                write!(f, "유효하지 않은 서브도메인 라벨 {}: {}", label, reason),
        }
    }
}

impl std::error::Error for RoutingError {}
