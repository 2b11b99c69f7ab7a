//! Outbound request builder.

use bytes::Bytes;

use http::Method;

use crate::client::{HttpClient, ResponseMetadata};
use crate::error::Error;
use crate::http::body::{self, Body};

/// Fluent request builder.
///
/// Accumulates method, target, headers, and an optional body; everything is
/// validated at the terminal `response*` call. The response future resolves
/// exactly once, with either the aggregated response or an error, never both.
pub struct RequestBuilder<'a> {
    client: &'a HttpClient,
    method: Method,
    target: String,
    headers: Vec<(String, String)>,
    body: Option<Body>,
}

impl<'a> RequestBuilder<'a> {
    pub(crate) fn new(client: &'a HttpClient, method: Method, target: String) -> Self {
        Self {
            client,
            method,
            target,
            headers: Vec::new(),
            body: None,
        }
    }

    /// Append a request header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Attach a body stream. Without this the request body is empty.
    pub fn body(mut self, body: Body) -> Self {
        self.body = Some(body);
        self
    }

    /// Attach a single-chunk body.
    pub fn body_bytes(self, data: impl Into<Bytes>) -> Self {
        self.body(body::full(data))
    }

    /// Send the request and await the full response: metadata plus the
    /// aggregated body bytes.
    ///
    /// Suspends without blocking a thread. Fails with
    /// [`Error::ConnectTimeout`], [`Error::ConnectionReset`], or another
    /// transport error if the connection drops before completion.
    pub async fn response(self) -> Result<(ResponseMetadata, Bytes), Error> {
        let uri = self.client.resolve_target(&self.target)?;
        let mut builder = http::Request::builder().method(self.method).uri(uri);
        for (name, value) in &self.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        let request = builder
            .body(self.body.unwrap_or_else(body::empty))
            .map_err(|e| Error::Transport(Box::new(e)))?;
        self.client.execute(request).await
    }

    /// Send the request and reduce the full response with `aggregate`.
    ///
    /// The aggregator runs exactly once, after the entire body has arrived.
    pub async fn response_single<T, F>(self, aggregate: F) -> Result<T, Error>
    where
        F: FnOnce(ResponseMetadata, Bytes) -> T,
    {
        let (metadata, bytes) = self.response().await?;
        Ok(aggregate(metadata, bytes))
    }
}
