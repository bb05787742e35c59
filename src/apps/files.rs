use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use hyper::body::Incoming;
use hyper::header::{self, HeaderValue};
use hyper::{Request, Response, StatusCode};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tracing::{error, warn};

use crate::apps::home::page;
use crate::apps::Handler;
use crate::body::{self, html_response, text_response, BoxedBody};

/// 파일 브라우저 애플리케이션입니다.
///
/// 구성된 루트 디렉터리 안의 내용만 노출합니다. 요청 경로는
/// 루트 기준 상대 경로로 해석되며, 상위 디렉터리로 탈출하는
/// 경로는 파일 시스템 접근 전에 거부됩니다.
pub struct FilesApp {
    root: PathBuf,
}

struct FileRow {
    name: String,
    is_dir: bool,
    size: Option<u64>,
    modified: Option<OffsetDateTime>,
}

impl FilesApp {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// 루트 기준 상대 경로를 절대 경로로 해석합니다.
    /// 탈출 시도(`..` 세그먼트, 절대 경로)는 `None`을 반환합니다.
    fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let trimmed = relative.trim_start_matches('/');
        let candidate = Path::new(trimmed);

        for component in candidate.components() {
            match component {
                Component::Normal(_) | Component::CurDir => {}
                _ => return None,
            }
        }

        Some(self.root.join(trimmed))
    }

    async fn browse(&self, relative: &str) -> Response<BoxedBody> {
        let dir = match self.resolve(relative) {
            Some(dir) => dir,
            None => {
                warn!(path = %relative, "파일 목록 경로 탈출 시도 거부");
                return text_response(StatusCode::FORBIDDEN, "Forbidden");
            }
        };

        let mut entries = match tokio::fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(_) => return text_response(StatusCode::NOT_FOUND, "Not Found"),
        };

        let mut rows: Vec<FileRow> = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let Ok(metadata) = entry.metadata().await else {
                continue;
            };
            rows.push(FileRow {
                name: entry.file_name().to_string_lossy().to_string(),
                is_dir: metadata.is_dir(),
                size: metadata.is_file().then(|| metadata.len()),
                modified: metadata.modified().ok().map(OffsetDateTime::from),
            });
        }

        // 디렉터리 먼저, 이후 이름순
        rows.sort_by(|a, b| b.is_dir.cmp(&a.is_dir).then(a.name.cmp(&b.name)));

        html_response(StatusCode::OK, self.listing_page(relative, &rows))
    }

    fn listing_page(&self, relative: &str, rows: &[FileRow]) -> String {
        let current = relative.trim_matches('/');
        let mut table = String::new();

        if !current.is_empty() {
            let parent = match current.rfind('/') {
                Some(idx) => &current[..idx],
                None => "",
            };
            table.push_str(&format!(
                "<tr><td><a href=\"?path={}\">..</a></td><td></td><td></td></tr>\n",
                encode_query(parent)
            ));
        }

        for row in rows {
            let child = if current.is_empty() {
                row.name.clone()
            } else {
                format!("{}/{}", current, row.name)
            };
            let encoded = encode_query(&child);
            let link = if row.is_dir {
                format!("<a href=\"?path={}\">{}/</a>", encoded, row.name)
            } else {
                format!("<a href=\"/files/download?path={}\">{}</a>", encoded, row.name)
            };
            let size = row.size.map(format_bytes).unwrap_or_default();
            let modified = row
                .modified
                .and_then(|t| t.format(&Rfc3339).ok())
                .unwrap_or_default();
            table.push_str(&format!(
                "<tr><td>{}</td><td>{}</td><td>{}</td></tr>\n",
                link, size, modified
            ));
        }

        page(
            "Files - OzNet",
            &format!(
                "<h1>Files</h1>\n\
                 <p><code>/{}</code></p>\n\
                 <table>\n\
                 <thead><tr><th>Name</th><th>Size</th><th>Modified</th></tr></thead>\n\
                 <tbody>\n{}</tbody>\n\
                 </table>",
                current, table
            ),
        )
    }

    async fn download(&self, relative: &str) -> Response<BoxedBody> {
        if relative.is_empty() {
            return text_response(StatusCode::BAD_REQUEST, "path parameter required");
        }

        let path = match self.resolve(relative) {
            Some(path) => path,
            None => {
                warn!(path = %relative, "다운로드 경로 탈출 시도 거부");
                return text_response(StatusCode::FORBIDDEN, "Forbidden");
            }
        };

        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return text_response(StatusCode::BAD_REQUEST, "Not a file"),
            Err(_) => return text_response(StatusCode::NOT_FOUND, "Not Found"),
        }

        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let stream = match body::file_stream(&path).await {
            Ok(stream) => stream,
            Err(e) => {
                error!(error = %e, path = %path.display(), "파일 열기 실패");
                return text_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
            }
        };

        let disposition = format!("attachment; filename=\"{}\"", filename);
        Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/octet-stream"),
            )
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
impl Handler for FilesApp {
    fn name(&self) -> &str {
        "files"
    }

    async fn handle(&self, req: Request<Incoming>, path: &str) -> Response<BoxedBody> {
        let requested = query_param(req.uri().query(), "path").unwrap_or_default();

        match path.trim_end_matches('/') {
            "" => self.browse(&requested).await,
            "/download" => self.download(&requested).await,
            _ => text_response(StatusCode::NOT_FOUND, "Not Found"),
        }
    }
}

fn query_param(query: Option<&str>, name: &str) -> Option<String> {
    let query = query?;
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

fn encode_query(value: &str) -> String {
    url::form_urlencoded::byte_serialize(value.as_bytes()).collect()
}

fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

    if bytes == 0 {
        return "0 B".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[unit])
    } else {
        format!("{:.2} {}", value, UNITS[unit])
    }
}
