//! Client endpoint.
//!
//! # Data Flow
//! ```text
//! HttpClient::builder() … build()
//!     → client.get("/test") (fluent request builder)
//!     → response_single(aggregator)
//!         → pooled connection (tapped when wiretap is on)
//!         → await full response: metadata + aggregated body bytes
//!         → aggregator produces the caller's value, exactly once
//! ```
//!
//! # Design Decisions
//! - Connections are pooled; disposing the client drops the pool
//! - Relative targets resolve against the configured authority
//! - Connect timeout is enforced by the connector, surfaced as
//!   `Error::ConnectTimeout`

pub mod request;
pub mod response;

pub use request::RequestBuilder;
pub use response::ResponseMetadata;

use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use http::{Method, Uri};
use http_body_util::BodyExt;
use hyper_util::client::legacy::connect::HttpConnector;
use hyper_util::client::legacy::Client;
use hyper_util::rt::TokioExecutor;

use crate::config::ClientConfig;
use crate::error::Error;
use crate::http::Body;
use crate::net::{LogWiretap, WiretapConnector, WiretapHook};

/// Client endpoint with a pooled connection factory.
pub struct HttpClient {
    inner: Client<WiretapConnector, Body>,
    config: ClientConfig,
}

impl HttpClient {
    /// Start building a client.
    pub fn builder() -> ClientBuilder {
        ClientBuilder {
            config: ClientConfig::default(),
        }
    }

    /// A client with default configuration (absolute targets only).
    pub fn new() -> Self {
        Self::with_config(ClientConfig::default())
    }

    pub fn with_config(config: ClientConfig) -> Self {
        let mut connector = HttpConnector::new();
        connector.set_connect_timeout(Some(config.connect_timeout()));
        let hook: Option<Arc<dyn WiretapHook>> = if config.wiretap {
            Some(Arc::new(LogWiretap))
        } else {
            None
        };
        let inner = Client::builder(TokioExecutor::new())
            .build::<_, Body>(WiretapConnector::new(connector, hook));
        Self { inner, config }
    }

    /// Begin a request. The target is either an absolute `http://` URI or a
    /// path resolved against the configured authority.
    pub fn request(&self, method: Method, target: impl Into<String>) -> RequestBuilder<'_> {
        RequestBuilder::new(self, method, target.into())
    }

    pub fn get(&self, target: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::GET, target)
    }

    pub fn post(&self, target: impl Into<String>) -> RequestBuilder<'_> {
        self.request(Method::POST, target)
    }

    /// Dispose the client, dropping its connection pool.
    ///
    /// In-flight requests started from clones of the pool fail with a
    /// transport error.
    pub fn dispose(self) {
        tracing::debug!("Client disposed");
        drop(self);
    }

    pub(crate) fn resolve_target(&self, target: &str) -> Result<Uri, Error> {
        if target.starts_with('/') {
            let authority = self
                .config
                .authority
                .as_deref()
                .ok_or_else(|| Error::MissingAuthority(target.to_string()))?;
            Ok(format!("http://{authority}{target}").parse::<Uri>()?)
        } else {
            Ok(target.parse::<Uri>()?)
        }
    }

    /// Issue the request and aggregate the full response.
    pub(crate) async fn execute(
        &self,
        request: http::Request<Body>,
    ) -> Result<(ResponseMetadata, Bytes), Error> {
        let response = self
            .inner
            .request(request)
            .await
            .map_err(Error::from_client)?;
        let (parts, body) = response.into_parts();
        let bytes = body
            .collect()
            .await
            .map_err(Error::from_hyper)?
            .to_bytes();
        Ok((ResponseMetadata::new(parts.status, parts.headers), bytes))
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Fluent client configuration, validated at `build`.
pub struct ClientBuilder {
    config: ClientConfig,
}

impl ClientBuilder {
    /// Authority ("host:port") for relative request targets.
    pub fn authority(mut self, authority: impl Into<String>) -> Self {
        self.config.authority = Some(authority.into());
        self
    }

    /// Loopback shorthand: authority `127.0.0.1:port`.
    pub fn port(self, port: u16) -> Self {
        self.authority(format!("127.0.0.1:{port}"))
    }

    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout_ms = timeout.as_millis() as u64;
        self
    }

    /// Emit raw byte events for every pooled connection.
    pub fn wiretap(mut self, enabled: bool) -> Self {
        self.config.wiretap = enabled;
        self
    }

    pub fn build(self) -> HttpClient {
        HttpClient::with_config(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn relative_target_requires_authority() {
        let client = HttpClient::new();
        assert!(matches!(
            client.resolve_target("/test"),
            Err(Error::MissingAuthority(_))
        ));
    }

    #[test]
    fn relative_target_resolves_against_authority() {
        let client = HttpClient::builder().port(8080).build();
        let uri = client.resolve_target("/test").unwrap();
        assert_eq!(uri.to_string(), "http://127.0.0.1:8080/test");
    }

    #[test]
    fn absolute_target_passes_through() {
        let client = HttpClient::new();
        let uri = client.resolve_target("http://example.com/x").unwrap();
        assert_eq!(uri.host(), Some("example.com"));
    }

    #[test]
    fn garbage_target_is_invalid() {
        let client = HttpClient::new();
        assert!(matches!(
            client.resolve_target("http://exa mple"),
            Err(Error::InvalidUri(_))
        ));
    }
}
