/// 요청마다 계산되는 불변 라우팅 키입니다.
///
/// # 필드
///
/// * `subdomain` - Host 헤더의 첫 번째 점 구분 라벨 (예: "3dprint.oznet" → "3dprint").
///   헤더가 없거나 파싱할 수 없으면 빈 문자열입니다.
/// * `path` - 요청 URI의 경로 부분
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoutingKey {
    pub subdomain: String,
    pub path: String,
}

impl RoutingKey {
    pub fn new(subdomain: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            subdomain: subdomain.into(),
            path: path.into(),
        }
    }

    /// HTTP 요청에서 라우팅 키를 추출합니다.
    ///
    /// DNS 조회나 도메인 검증 없이 순수한 문자열 분리만 수행하며
    /// 어떤 입력에도 실패하지 않습니다. Host 헤더가 없거나 잘못된
    /// 경우 서브도메인은 빈 문자열로 처리됩니다.
    ///
    /// # 예제
    ///
    /// ```
    /// use oznet_gateway::routing::RoutingKey;
    /// use http_body_util::Empty;
    /// use hyper::body::Bytes;
    ///
    /// let req = hyper::Request::builder()
    ///     .uri("/printer/1")
    ///     .header("Host", "3dprint.example.net:8080")
    ///     .body(Empty::<Bytes>::new())
    ///     .unwrap();
    ///
    /// let key = RoutingKey::from_request(&req);
    /// assert_eq!(key.subdomain, "3dprint");
    /// assert_eq!(key.path, "/printer/1");
    /// ```
    pub fn from_request<B>(req: &hyper::Request<B>) -> Self {
        let subdomain = req
            .headers()
            .get(hyper::header::HOST)
            .and_then(|value| value.to_str().ok())
            .map(subdomain_label)
            .unwrap_or_default();

        Self {
            subdomain,
            path: req.uri().path().to_string(),
        }
    }
}

/// Host 헤더 값에서 첫 번째 라벨을 추출합니다. 포트는 먼저 제거합니다.
fn subdomain_label(host: &str) -> String {
    let without_port = host.split(':').next().unwrap_or(host);
    without_port
        .split('.')
        .next()
        .unwrap_or("")
        .to_string()
}
