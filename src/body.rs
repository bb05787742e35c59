//! 응답 본문 타입과 공용 응답 헬퍼를 제공하는 모듈입니다.
//!
//! 프록시 응답은 업스트림 본문을 그대로 스트리밍해야 하고,
//! 로컬 핸들러는 완성된 문자열을 반환하므로 두 경우를 하나의
//! 박싱된 본문 타입으로 통일합니다.

use bytes::Bytes;
use futures_util::stream;
use http_body_util::combinators::UnsyncBoxBody;
use http_body_util::{BodyExt, Empty, Full, StreamBody};
use hyper::body::Frame;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use std::path::Path;
use tokio::io::AsyncReadExt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// 게이트웨이 전역에서 사용하는 응답 본문 타입입니다.
pub type BoxedBody = UnsyncBoxBody<Bytes, BoxError>;

const FILE_CHUNK_SIZE: usize = 64 * 1024;

pub fn full(data: impl Into<Bytes>) -> BoxedBody {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed_unsync()
}

pub fn empty() -> BoxedBody {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed_unsync()
}

/// 파일을 청크 단위로 읽어 스트리밍하는 본문을 생성합니다.
/// 파일 전체를 메모리에 올리지 않습니다.
pub async fn file_stream(path: &Path) -> std::io::Result<BoxedBody> {
    let file = tokio::fs::File::open(path).await?;

    let stream = stream::try_unfold(file, |mut file| async move {
        let mut buf = vec![0u8; FILE_CHUNK_SIZE];
        let read = file.read(&mut buf).await.map_err(|e| -> BoxError { Box::new(e) })?;
        if read == 0 {
            Ok(None)
        } else {
            buf.truncate(read);
            Ok(Some((Frame::data(Bytes::from(buf)), file)))
        }
    });

    Ok(StreamBody::new(stream).boxed_unsync())
}

pub fn text_response(status: StatusCode, message: &str) -> Response<BoxedBody> {
    Response::builder()
        .status(status)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        )
        .body(full(message.to_string()))
        .unwrap()
}

pub fn html_response(status: StatusCode, html: String) -> Response<BoxedBody> {
    Response::builder()
        .status(status)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/html; charset=utf-8"),
        )
        .body(full(html))
        .unwrap()
}

pub fn json_response(status: StatusCode, json: String) -> Response<BoxedBody> {
    Response::builder()
        .status(status)
        .header(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )
        .body(full(json))
        .unwrap()
}
