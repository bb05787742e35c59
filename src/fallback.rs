//! 어떤 라우팅 규칙에도 매칭되지 않은 요청을 처리하는 폴백 응답기입니다.

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};

use crate::apps::{page, Handler};
use crate::body::{html_response, BoxedBody};

/// 알려진 서비스와 정식 URL을 안내하는 정적 페이지를 제공합니다.
/// 매칭 실패는 에러가 아니므로 항상 200으로 응답합니다.
pub struct FallbackPage {
    scheme: String,
    domain: String,
}

impl FallbackPage {
    pub fn new(scheme: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            domain: domain.into(),
        }
    }

    pub fn render(&self) -> String {
        let services = [
            ("home", "Main documentation"),
            ("hub", "Service management"),
            ("files", "File server"),
            ("3dprint", "OctoPrint"),
        ];

        let mut subdomain_items = String::new();
        let mut dev_items = String::new();
        for (label, description) in services {
            subdomain_items.push_str(&format!(
                "<li><a href=\"{scheme}://{label}.{domain}\">{label}.{domain}</a> - {description}</li>\n",
                scheme = self.scheme,
                label = label,
                domain = self.domain,
                description = description,
            ));
            if label != "3dprint" {
                dev_items.push_str(&format!(
                    "<li><a href=\"/{label}\">/{label}</a> - {description}</li>\n",
                    label = label,
                    description = description,
                ));
            }
        }

        page(
            "OzNet",
            &format!(
                "<h1>OzNet</h1>\n\
                 <p>Welcome to the OzNet private network. Available services:</p>\n\
                 <ul>\n{}</ul>\n\
                 <p><strong>Development routes:</strong></p>\n\
                 <ul>\n{}</ul>",
                subdomain_items, dev_items
            ),
        )
    }
}

#[async_trait]
impl Handler for FallbackPage {
    fn name(&self) -> &str {
        "fallback"
    }

    async fn handle(&self, _req: Request<Incoming>, _path: &str) -> Response<BoxedBody> {
        html_response(StatusCode::OK, self.render())
    }
}
