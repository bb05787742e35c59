use std::net::SocketAddr;
use std::sync::Arc;

use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::handler::RequestHandler;
use super::Result;
use crate::settings::ServerSettings;

pub struct GatewayListener {
    listener: TcpListener,
}

impl GatewayListener {
    /// 설정된 포트에 TCP 리스너를 바인딩합니다.
    /// 바인딩 실패는 기동 에러이며 호출자가 프로세스를 종료해야 합니다.
    pub async fn new(settings: &ServerSettings) -> Result<Self> {
        let listener = TcpListener::bind(format!("0.0.0.0:{}", settings.http_port))
            .await
            .map_err(|e| {
                error!(error = %e, port = settings.http_port, "HTTP 포트 바인딩 실패");
                e
            })?;

        info!(port = settings.http_port, "HTTP 리스너 시작");

        Ok(Self { listener })
    }

    /// 실제로 바인딩된 주소를 반환합니다. 포트 0으로 바인딩한
    /// 테스트에서 임시 포트를 알아내는 데 사용됩니다.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// 연결 수락 루프를 실행합니다. 각 연결은 독립적인 태스크에서
    /// 처리되며 수락 실패는 루프를 중단시키지 않습니다.
    pub async fn run(self, handler: Arc<RequestHandler>) -> Result<()> {
        loop {
            match self.listener.accept().await {
                Ok((stream, remote_addr)) => {
                    let handler = handler.clone();
                    tokio::spawn(async move {
                        let io = TokioIo::new(stream);
                        if let Err(err) = handler.handle_connection(io, remote_addr).await {
                            error!(error = %err, remote = %remote_addr, "연결 처리 실패");
                        }
                    });
                }
                Err(e) => {
                    error!(error = %e, "연결 수락 실패");
                }
            }
        }
    }
}
