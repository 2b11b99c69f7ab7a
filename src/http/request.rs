//! Incoming request context.

use std::collections::HashMap;

use bytes::Bytes;
use http::{HeaderMap, Method, Uri};
use http_body_util::BodyExt;
use hyper::body::Incoming;

use crate::cookie::{parse_cookie_header, Cookie};
use crate::error::Error;
use crate::http::body::{self, Body};
use crate::lifecycle::ExchangeId;

/// The decoded incoming request of one exchange.
///
/// Headers are available immediately; the body is a lazy byte stream that
/// can be streamed onward ([`into_body`]) or aggregated ([`collect_body`]).
///
/// [`into_body`]: Request::into_body
/// [`collect_body`]: Request::collect_body
#[derive(Debug)]
pub struct Request {
    id: ExchangeId,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: Incoming,
}

impl Request {
    pub(crate) fn from_parts(id: ExchangeId, parts: http::request::Parts, body: Incoming) -> Self {
        Self {
            id,
            method: parts.method,
            uri: parts.uri,
            headers: parts.headers,
            body,
        }
    }

    /// Identifier of the exchange this request belongs to.
    pub fn exchange_id(&self) -> ExchangeId {
        self.id
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    pub fn path(&self) -> &str {
        self.uri.path()
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    /// First value of the given header, when it is valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Cookies sent by the client, parsed from every `Cookie` header.
    ///
    /// Duplicate names keep the last occurrence, across headers as well as
    /// within one header. Malformed pairs are dropped.
    pub fn cookies(&self) -> HashMap<String, Cookie> {
        let mut cookies = HashMap::new();
        for value in self.headers.get_all(http::header::COOKIE) {
            if let Ok(value) = value.to_str() {
                cookies.extend(parse_cookie_header(value));
            }
        }
        cookies
    }

    /// Consume the request, yielding its body as a boxed stream.
    ///
    /// This is how a handler echoes: `resp.send(req.into_body())`.
    pub fn into_body(self) -> Body {
        body::from_incoming(self.body)
    }

    /// Consume the request and aggregate the body into a single buffer.
    pub async fn collect_body(self) -> Result<Bytes, Error> {
        self.body
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(Error::from_hyper)
    }
}
