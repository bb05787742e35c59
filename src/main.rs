use tracing::{error, info};

use oznet_gateway::logging::init_logging;
use oznet_gateway::server::GatewayServer;
use oznet_gateway::settings::Settings;

#[tokio::main]
async fn main() {
    // 설정 로드 실패는 로깅 초기화 전일 수 있으므로 stderr로 출력
    let settings = match Settings::load().await {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("설정 로드 실패: {}", e);
            std::process::exit(1);
        }
    };

    let _log_guard = init_logging(&settings.logging);

    info!(
        port = settings.server.http_port,
        domain = %settings.server.domain,
        public_scheme = %settings.server.public_scheme,
        "OzNet 게이트웨이 시작"
    );

    let server = match GatewayServer::new(settings).await {
        Ok(server) => server,
        Err(e) => {
            error!(error = %e, "서버 초기화 실패");
            std::process::exit(1);
        }
    };

    if let Err(e) = server.run().await {
        error!(error = %e, "서버 실행 실패");
        std::process::exit(1);
    }
}
