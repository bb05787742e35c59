use tracing::debug;

use crate::routing::{MatchKind, RouteRule, RoutingKey};

/// 기동 시 한 번 구성되고 이후 변경되지 않는 순서 있는 규칙 목록입니다.
///
/// 평가 순서는 결정적입니다: 경로 접두 규칙을 등록 순서대로 먼저
/// 평가하고, 그 다음 서브도메인 규칙을 등록 순서대로 평가합니다.
/// 최초로 매칭된 규칙이 선택되며 조합이나 점수 계산은 없습니다.
#[derive(Clone, Debug, Default)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn add_rule(&mut self, rule: RouteRule) {
        self.rules.push(rule);
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 라우팅 키에 대해 최초로 매칭되는 규칙을 찾습니다.
    ///
    /// 매칭되는 규칙이 없으면 `None`을 반환하며, 이는 에러가 아니라
    /// 폴백 응답기가 처리해야 하는 정상 결과입니다.
    pub fn resolve(&self, key: &RoutingKey) -> Option<&RouteRule> {
        let matched = self
            .rules
            .iter()
            .filter(|rule| rule.kind == MatchKind::PathPrefix)
            .chain(
                self.rules
                    .iter()
                    .filter(|rule| rule.kind == MatchKind::Subdomain),
            )
            .find(|rule| rule.matches(key));

        match matched {
            Some(rule) => {
                debug!(
                    subdomain = %key.subdomain,
                    path = %key.path,
                    rule = %rule.name,
                    "라우팅 규칙 매칭"
                );
            }
            None => {
                debug!(
                    subdomain = %key.subdomain,
                    path = %key.path,
                    "매칭되는 규칙 없음"
                );
            }
        }

        matched
    }
}
