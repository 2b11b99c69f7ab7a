//! Byte-level wiretap instrumentation.
//!
//! # Responsibilities
//! - Define the wiretap boundary: a hook receiving raw ingress/egress bytes
//! - Wrap a transport stream so every read/write is reported to the hook
//! - Wrap the client connector so pooled connections are tapped too
//!
//! # Design Decisions
//! - The hook is optional; absence changes nothing but the missing events
//! - The default hook logs through `tracing` at trace level
//! - Payload previews are lossy UTF-8 and truncated; the length is exact

use std::io;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use http::Uri;
use hyper_util::client::legacy::connect::{Connected, Connection, HttpConnector};
use hyper_util::rt::TokioIo;
use tokio::io::{AsyncRead, AsyncWrite, ReadBuf};
use tokio::net::TcpStream;
use tower::Service;

use crate::error::BoxError;

/// Direction of a tapped byte event, relative to this endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ingress,
    Egress,
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Direction::Ingress => "ingress",
            Direction::Egress => "egress",
        })
    }
}

/// Hook invoked with raw transport bytes as they pass the endpoint.
pub trait WiretapHook: Send + Sync {
    fn record(&self, direction: Direction, bytes: &[u8]);
}

/// Default hook: structured trace events with a truncated payload preview.
#[derive(Debug, Default)]
pub struct LogWiretap;

const PREVIEW_LIMIT: usize = 256;

impl WiretapHook for LogWiretap {
    fn record(&self, direction: Direction, bytes: &[u8]) {
        let preview_len = bytes.len().min(PREVIEW_LIMIT);
        tracing::trace!(
            target: "filament::wiretap",
            direction = %direction,
            len = bytes.len(),
            payload = %String::from_utf8_lossy(&bytes[..preview_len]),
            "Wiretap event"
        );
    }
}

/// Transport stream wrapper reporting all traffic to a [`WiretapHook`].
pub struct WiretapStream<S> {
    inner: S,
    hook: Option<Arc<dyn WiretapHook>>,
}

impl<S> WiretapStream<S> {
    pub fn new(inner: S, hook: Option<Arc<dyn WiretapHook>>) -> Self {
        Self { inner, hook }
    }
}

impl<S: AsyncRead + Unpin> AsyncRead for WiretapStream<S> {
    fn poll_read(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        let this = self.get_mut();
        let filled_before = buf.filled().len();
        let poll = Pin::new(&mut this.inner).poll_read(cx, buf);
        if let (Poll::Ready(Ok(())), Some(hook)) = (&poll, &this.hook) {
            let data = &buf.filled()[filled_before..];
            if !data.is_empty() {
                hook.record(Direction::Ingress, data);
            }
        }
        poll
    }
}

impl<S: AsyncWrite + Unpin> AsyncWrite for WiretapStream<S> {
    fn poll_write(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &[u8],
    ) -> Poll<io::Result<usize>> {
        let this = self.get_mut();
        let poll = Pin::new(&mut this.inner).poll_write(cx, buf);
        if let (Poll::Ready(Ok(written)), Some(hook)) = (&poll, &this.hook) {
            if *written > 0 {
                hook.record(Direction::Egress, &buf[..*written]);
            }
        }
        poll
    }

    fn poll_flush(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_flush(cx)
    }

    fn poll_shutdown(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<io::Result<()>> {
        Pin::new(&mut self.get_mut().inner).poll_shutdown(cx)
    }
}

// Lets the pooled client treat a tapped stream as a regular connection.
impl<S: Connection> Connection for WiretapStream<S> {
    fn connected(&self) -> Connected {
        self.inner.connected()
    }
}

/// Client connector that taps every established connection.
///
/// Wraps the plain TCP connector; when no hook is installed the stream
/// wrapper is pass-through.
#[derive(Clone)]
pub struct WiretapConnector {
    inner: HttpConnector,
    hook: Option<Arc<dyn WiretapHook>>,
}

impl WiretapConnector {
    pub fn new(inner: HttpConnector, hook: Option<Arc<dyn WiretapHook>>) -> Self {
        Self { inner, hook }
    }
}

impl Service<Uri> for WiretapConnector {
    type Response = TokioIo<WiretapStream<TcpStream>>;
    type Error = BoxError;
    type Future =
        Pin<Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx).map_err(Into::into)
    }

    fn call(&mut self, dst: Uri) -> Self::Future {
        let connecting = self.inner.call(dst);
        let hook = self.hook.clone();
        Box::pin(async move {
            let io = connecting.await.map_err(Into::<BoxError>::into)?;
            let stream = WiretapStream::new(io.into_inner(), hook);
            Ok(TokioIo::new(stream))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    #[derive(Default)]
    struct RecordingHook {
        events: Mutex<Vec<(Direction, Vec<u8>)>>,
    }

    impl WiretapHook for RecordingHook {
        fn record(&self, direction: Direction, bytes: &[u8]) {
            self.events
                .lock()
                .unwrap()
                .push((direction, bytes.to_vec()));
        }
    }

    #[tokio::test]
    async fn hook_sees_both_directions() {
        let hook = Arc::new(RecordingHook::default());
        let (client, server) = tokio::io::duplex(64);
        let mut tapped = WiretapStream::new(client, Some(hook.clone() as Arc<dyn WiretapHook>));

        let echo = tokio::spawn(async move {
            let mut server = server;
            let mut buf = [0u8; 5];
            server.read_exact(&mut buf).await.unwrap();
            server.write_all(&buf).await.unwrap();
        });

        tapped.write_all(b"hello").await.unwrap();
        let mut buf = [0u8; 5];
        tapped.read_exact(&mut buf).await.unwrap();
        echo.await.unwrap();

        let events = hook.events.lock().unwrap();
        assert!(events
            .iter()
            .any(|(d, b)| *d == Direction::Egress && b == b"hello"));
        assert!(events
            .iter()
            .any(|(d, b)| *d == Direction::Ingress && b == b"hello"));
    }

    #[tokio::test]
    async fn absent_hook_is_pass_through() {
        let (client, server) = tokio::io::duplex(64);
        let mut tapped = WiretapStream::new(client, None);

        let writer = tokio::spawn(async move {
            let mut server = server;
            server.write_all(b"data").await.unwrap();
        });

        let mut buf = [0u8; 4];
        tapped.read_exact(&mut buf).await.unwrap();
        assert_eq!(&buf, b"data");
        writer.await.unwrap();
    }
}
