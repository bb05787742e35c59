//! CA 인증서 다운로드 엔드포인트입니다.
//!
//! 파일 이름은 경로가 아닌 불투명한 요청 파라미터로 취급합니다.
//! 확장자 허용 목록과 격리(containment) 검증을 모두 통과한
//! 파일만 스트리밍됩니다.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode};
use tracing::{error, warn};

use crate::apps::Handler;
use crate::body::{self, text_response, BoxedBody};

const ALLOWED_EXTENSIONS: [&str; 2] = ["crt", "pem"];

/// 고정된 인증서 디렉터리에서 파일을 제공하는 응답기입니다.
/// 디렉터리의 파일은 읽기 전용이며 절대 생성/수정/삭제하지 않습니다.
pub struct CertStore {
    dir: PathBuf,
}

impl CertStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 요청된 파일 이름에 대한 응답을 생성합니다.
    ///
    /// 검증 순서는 고정입니다:
    /// 1. 확장자 허용 목록 검사 (실패 시 파일 시스템 접근 없이 403)
    /// 2. 격리 검사 - 해석된 경로가 인증서 디렉터리를 벗어나면 403.
    ///    확장자 필터만으로는 `..` 세그먼트를 막을 수 없으므로
    ///    이 검사는 필수 불변식입니다.
    /// 3. 파일 존재 검사 (404)
    ///
    /// 403 응답은 파일 존재 여부를 드러내지 않습니다.
    pub async fn serve(&self, filename: &str) -> Response<BoxedBody> {
        if !has_allowed_extension(filename) {
            warn!(filename = %filename, "허용되지 않은 확장자 거부");
            return text_response(StatusCode::FORBIDDEN, "Forbidden");
        }

        if !is_plain_filename(filename) {
            warn!(filename = %filename, "인증서 경로 탈출 시도 거부");
            return text_response(StatusCode::FORBIDDEN, "Forbidden");
        }

        let path = self.dir.join(filename);

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            _ => return text_response(StatusCode::NOT_FOUND, "Not Found"),
        }

        // 심볼릭 링크를 통한 탈출까지 차단하는 2차 격리 검사
        match (
            tokio::fs::canonicalize(&path).await,
            tokio::fs::canonicalize(&self.dir).await,
        ) {
            (Ok(resolved), Ok(root)) if resolved.starts_with(&root) => {}
            _ => {
                warn!(filename = %filename, "정규화된 경로가 인증서 디렉터리를 벗어남");
                return text_response(StatusCode::FORBIDDEN, "Forbidden");
            }
        }

        let stream = match body::file_stream(&path).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, path = %path.display(), "인증서 파일 열기 실패");
                return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            }
        };

        let disposition = format!("attachment; filename=\"{}\"", filename);
        Response::builder()
            .status(StatusCode::OK)
            .header(header::CONTENT_TYPE, content_type(filename))
            .header(
                header::CONTENT_DISPOSITION,
                HeaderValue::from_str(&disposition)
                    .unwrap_or_else(|_| HeaderValue::from_static("attachment")),
            )
            .body(stream)
            .unwrap()
    }
}

#[async_trait]
impl Handler for CertStore {
    fn name(&self) -> &str {
        "certs"
    }

    async fn handle(&self, _req: Request<Incoming>, path: &str) -> Response<BoxedBody> {
        let filename = path.trim_start_matches('/');
        if filename.is_empty() {
            return text_response(StatusCode::NOT_FOUND, "Not Found");
        }
        self.serve(filename).await
    }
}

fn has_allowed_extension(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| {
            let ext = ext.to_ascii_lowercase();
            ALLOWED_EXTENSIONS.contains(&ext.as_str())
        })
        .unwrap_or(false)
}

/// 파일 이름이 디렉터리 구분자 없는 단일 세그먼트인지 검사합니다.
fn is_plain_filename(filename: &str) -> bool {
    let mut components = Path::new(filename).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

fn content_type(filename: &str) -> HeaderValue {
    if filename.ends_with(".pem") {
        HeaderValue::from_static("application/x-pem-file")
    } else {
        HeaderValue::from_static("application/x-x509-ca-cert")
    }
}
