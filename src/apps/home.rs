use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::{Request, Response, StatusCode};

use crate::body::{html_response, text_response, BoxedBody};
use crate::apps::Handler;

const ZEROTIER_NETWORK_ID: &str = "9bee8941b563441a";
const ZEROTIER_NETWORK_NAME: &str = "Oz Network";

/// 메인 문서 애플리케이션입니다. 서비스 목록과 네트워크 설정
/// 안내 페이지를 제공합니다.
pub struct HomeApp {
    scheme: String,
    domain: String,
}

impl HomeApp {
    pub fn new(scheme: impl Into<String>, domain: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            domain: domain.into(),
        }
    }

    fn service_url(&self, label: &str) -> String {
        format!("{}://{}.{}", self.scheme, label, self.domain)
    }

    fn index_page(&self) -> String {
        let services = [
            ("home", "Main documentation for the private network"),
            ("hub", "Service management and dashboard"),
            ("files", "Public file server"),
            ("3dprint", "OctoPrint for 3D printer management"),
        ];

        let mut items = String::new();
        for (label, description) in services {
            let url = self.service_url(label);
            items.push_str(&format!(
                "<li><a href=\"{url}\">{label}.{domain}</a> - {description}</li>\n",
                url = url,
                label = label,
                domain = self.domain,
                description = description,
            ));
        }

        page(
            "OzNet",
            &format!(
                "<h1>OzNet</h1>\n\
                 <p>Welcome to the OzNet private network. Available services:</p>\n\
                 <ul>\n{}</ul>\n\
                 <p><a href=\"/home/setup\">Network setup</a> · <a href=\"/home/docs\">Documentation</a></p>",
                items
            ),
        )
    }

    fn setup_page(&self) -> String {
        page(
            "Setup - OzNet",
            &format!(
                "<h1>Network setup</h1>\n\
                 <p>Join the ZeroTier network to reach the gateway:</p>\n\
                 <ul>\n\
                 <li>Network: <strong>{}</strong></li>\n\
                 <li>Network ID: <code>{}</code></li>\n\
                 </ul>\n\
                 <p>CA certificates are available at <a href=\"/certs/oznet-ca.crt\">/certs/oznet-ca.crt</a>.</p>",
                ZEROTIER_NETWORK_NAME, ZEROTIER_NETWORK_ID
            ),
        )
    }

    fn docs_page(&self) -> String {
        page(
            "Documentation - OzNet",
            "<h1>Documentation</h1>\n\
             <p>Every service is reachable by its subdomain, or by its path\n\
             prefix when subdomains are not configured (development mode).</p>",
        )
    }
}

#[async_trait]
impl Handler for HomeApp {
    fn name(&self) -> &str {
        "home"
    }

    async fn handle(&self, _req: Request<Incoming>, path: &str) -> Response<BoxedBody> {
        match path.trim_end_matches('/') {
            "" => html_response(StatusCode::OK, self.index_page()),
            "/setup" => html_response(StatusCode::OK, self.setup_page()),
            "/docs" => html_response(StatusCode::OK, self.docs_page()),
            _ => text_response(StatusCode::NOT_FOUND, "Not Found"),
        }
    }
}

/// 모든 페이지가 공유하는 최소 레이아웃입니다.
pub(crate) fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n\
         <html>\n\
         <head>\n\
         <meta charset=\"utf-8\">\n\
         <title>{title}</title>\n\
         <link rel=\"stylesheet\" href=\"https://cdn.jsdelivr.net/npm/@picocss/pico@1/css/pico.min.css\">\n\
         </head>\n\
         <body><main class=\"container\">\n{body}\n</main></body>\n\
         </html>\n",
        title = title,
        body = body,
    )
}
