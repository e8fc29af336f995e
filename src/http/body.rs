use crate::error::DownloadError;
use crate::session::CleanupGuard;
use axum::{
    body::Body,
    http::{header, HeaderValue, StatusCode},
    response::Response,
};
use futures::Stream;
use std::path::Path;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio_util::io::ReaderStream;
use tracing::debug;

/// Body stream that keeps a `CleanupGuard` alive until the body is dropped
pub struct GuardedStream<S> {
    inner: S,
    _guard: CleanupGuard,
}

impl<S> GuardedStream<S> {
    pub fn new(inner: S, guard: CleanupGuard) -> Self {
        Self {
            inner,
            _guard: guard,
        }
    }
}

impl<S: Stream + Unpin> Stream for GuardedStream<S> {
    type Item = S::Item;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        Pin::new(&mut self.inner).poll_next(cx)
    }
}

/// Stream `path` as an attachment; `guard` fires once the body is done
pub async fn file_response(
    path: &Path,
    media_type: &str,
    guard: CleanupGuard,
) -> Result<Response, DownloadError> {
    let file = tokio::fs::File::open(path).await?;
    let len = file.metadata().await?.len();
    let filename = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();

    debug!("Streaming {} ({} bytes)", path.display(), len);

    let stream = GuardedStream::new(ReaderStream::new(file), guard);

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, media_type)
        .header(header::CONTENT_LENGTH, len)
        .header(header::CONTENT_DISPOSITION, content_disposition(&filename))
        .body(Body::from_stream(stream))
        .map_err(|e| DownloadError::Io(std::io::Error::other(e)))
}

/// `attachment` disposition with an ASCII fallback and an RFC 5987 UTF-8 name
fn content_disposition(filename: &str) -> HeaderValue {
    let fallback: String = filename
        .chars()
        .map(|c| match c {
            '"' | '\\' => '_',
            c if c.is_ascii() && !c.is_ascii_control() => c,
            _ => '_',
        })
        .collect();

    let value = format!(
        "attachment; filename=\"{}\"; filename*=UTF-8''{}",
        fallback,
        urlencoding::encode(filename)
    );
    HeaderValue::from_str(&value).unwrap_or_else(|_| HeaderValue::from_static("attachment"))
}
