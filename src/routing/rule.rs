use std::fmt;
use std::sync::Arc;

use crate::apps::Handler;
use crate::routing::{RoutingError, RoutingKey};

/// 규칙이 라우팅 키의 어떤 부분과 매칭되는지를 나타냅니다.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MatchKind {
    /// 요청 경로가 패턴으로 시작하면 매칭 (세그먼트 경계 기준)
    PathPrefix,
    /// 서브도메인 라벨이 패턴과 동일하면 매칭
    Subdomain,
}

/// 프록시 대상이 되는 고정 업스트림 서비스 정보입니다.
/// 호스트와 포트는 기동 시점에 결정되며 이후 변경되지 않습니다.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UpstreamTarget {
    pub scheme: String,
    pub host: String,
    pub port: u16,
}

impl UpstreamTarget {
    pub fn new(scheme: impl Into<String>, host: impl Into<String>, port: u16) -> Self {
        Self {
            scheme: scheme.into(),
            host: host.into(),
            port,
        }
    }

    pub fn authority(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl fmt::Display for UpstreamTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}://{}:{}", self.scheme, self.host, self.port)
    }
}

/// 규칙이 선택하는 목적지입니다.
///
/// 로컬 핸들러는 요청을 받아 완성된 응답을 만들어내는 불투명한
/// 능력(capability)으로만 취급하며, 게이트웨이는 내부에 어떤
/// 계약도 부과하지 않습니다.
#[derive(Clone)]
pub enum Destination {
    Local(Arc<dyn Handler>),
    Upstream(UpstreamTarget),
}

impl fmt::Debug for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Local(handler) => write!(f, "Local({})", handler.name()),
            Destination::Upstream(target) => write!(f, "Upstream({})", target),
        }
    }
}

/// 라우팅 테이블의 단일 규칙입니다.
#[derive(Clone, Debug)]
pub struct RouteRule {
    pub name: String,
    pub kind: MatchKind,
    pub value: String,
    pub destination: Destination,
}

impl RouteRule {
    /// 경로 접두 매칭 규칙을 생성합니다. 패턴은 `/`로 시작해야 합니다.
    pub fn path_prefix(
        name: impl Into<String>,
        pattern: impl Into<String>,
        destination: Destination,
    ) -> Result<Self, RoutingError> {
        let pattern = pattern.into();
        if !pattern.starts_with('/') {
            return Err(RoutingError::InvalidPathPrefix {
                pattern,
                reason: "'/'로 시작해야 합니다".to_string(),
            });
        }

        Ok(Self {
            name: name.into(),
            kind: MatchKind::PathPrefix,
            value: pattern,
            destination,
        })
    }

    /// 서브도메인 매칭 규칙을 생성합니다. 라벨은 점을 포함할 수 없습니다.
    pub fn subdomain(
        name: impl Into<String>,
        label: impl Into<String>,
        destination: Destination,
    ) -> Result<Self, RoutingError> {
        let label = label.into();
        if label.is_empty() {
            return Err(RoutingError::InvalidSubdomain {
                label,
                reason: "빈 라벨은 허용되지 않습니다".to_string(),
            });
        }
        if label.contains('.') {
            return Err(RoutingError::InvalidSubdomain {
                label,
                reason: "라벨은 점을 포함할 수 없습니다".to_string(),
            });
        }

        Ok(Self {
            name: name.into(),
            kind: MatchKind::Subdomain,
            value: label,
            destination,
        })
    }

    /// 규칙이 라우팅 키와 매칭되는지 확인합니다.
    ///
    /// 경로 접두 매칭은 세그먼트 경계를 지킵니다. `/home` 패턴은
    /// `/home`과 `/home/docs`에는 매칭되지만 `/homepage`에는
    /// 매칭되지 않습니다.
    pub fn matches(&self, key: &RoutingKey) -> bool {
        match self.kind {
            MatchKind::PathPrefix => {
                if self.value == "/" {
                    return true;
                }
                let pattern = self.value.trim_end_matches('/');
                key.path == pattern || key.path.starts_with(&format!("{}/", pattern))
            }
            MatchKind::Subdomain => key.subdomain == self.value,
        }
    }

    /// 경로 접두 규칙이 매칭된 경우, 접두를 제거한 나머지 경로를 반환합니다.
    /// 서브도메인 규칙은 경로를 변형하지 않습니다.
    pub fn relative_path<'a>(&self, path: &'a str) -> &'a str {
        match self.kind {
            MatchKind::PathPrefix => {
                let pattern = self.value.trim_end_matches('/');
                let rest = path.strip_prefix(pattern).unwrap_or(path);
                if rest.is_empty() {
                    "/"
                } else {
                    rest
                }
            }
            MatchKind::Subdomain => path,
        }
    }
}
