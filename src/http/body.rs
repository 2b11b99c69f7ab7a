//! Response/request body plumbing.
//!
//! Bodies are lazy byte streams. The codec layer (hyper) owns the framing;
//! this module only boxes streams into one uniform type and attaches the
//! exchange guard that keeps an exchange "in flight" until its response body
//! reaches end-of-stream.

use std::pin::Pin;
use std::task::{Context, Poll};

use bytes::Bytes;
use http_body_util::combinators::BoxBody;
use http_body_util::{BodyExt, Empty, Full};
use hyper::body::Incoming;

use crate::error::BoxError;
use crate::lifecycle::ExchangeGuard;

/// Uniform boxed body type used on both endpoints.
pub type Body = BoxBody<Bytes, BoxError>;

/// An empty body.
pub fn empty() -> Body {
    Empty::<Bytes>::new()
        .map_err(|never| match never {})
        .boxed()
}

/// A single-chunk body.
pub fn full(data: impl Into<Bytes>) -> Body {
    Full::new(data.into())
        .map_err(|never| match never {})
        .boxed()
}

/// Box a decoded wire body so it can be streamed onward (e.g. echoed).
pub(crate) fn from_incoming(incoming: Incoming) -> Body {
    incoming.map_err(|e| Box::new(e) as BoxError).boxed()
}

/// Attach an exchange guard to a body. The guard drops when the body does,
/// which is when the stream ends or its connection dies.
pub(crate) fn guarded(body: Body, guard: ExchangeGuard) -> Body {
    Guarded {
        inner: body,
        _guard: guard,
    }
    .boxed()
}

struct Guarded {
    inner: Body,
    _guard: ExchangeGuard,
}

// BoxBody is Unpin, so plain field projection is enough.
impl hyper::body::Body for Guarded {
    type Data = Bytes;
    type Error = BoxError;

    fn poll_frame(
        self: Pin<&mut Self>,
        cx: &mut Context<'_>,
    ) -> Poll<Option<Result<hyper::body::Frame<Self::Data>, Self::Error>>> {
        Pin::new(&mut self.get_mut().inner).poll_frame(cx)
    }

    fn is_end_stream(&self) -> bool {
        self.inner.is_end_stream()
    }

    fn size_hint(&self) -> hyper::body::SizeHint {
        self.inner.size_hint()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::{ExchangeId, ExchangeTracker};

    #[tokio::test]
    async fn full_body_collects_to_its_bytes() {
        let collected = full("hello").collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from("hello"));
    }

    #[tokio::test]
    async fn empty_body_collects_to_nothing() {
        let collected = empty().collect().await.unwrap().to_bytes();
        assert!(collected.is_empty());
    }

    #[tokio::test]
    async fn guard_is_released_at_end_of_stream() {
        let tracker = ExchangeTracker::new();
        let body = guarded(full("data"), tracker.track(ExchangeId::new()));
        assert_eq!(tracker.active_count(), 1);

        let collected = body.collect().await.unwrap().to_bytes();
        assert_eq!(collected, Bytes::from("data"));
        // Collect consumed and dropped the body, releasing the guard.
        assert_eq!(tracker.active_count(), 0);
    }
}
