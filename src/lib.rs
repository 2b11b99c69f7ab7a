//! Minimal asynchronous HTTP exchange core with first-class cookie handling.
//!
//! A server binds a port, routes each request to a handler that attaches
//! cookies before streaming its response body; a client issues a request and
//! awaits a single aggregated response whose cookies are queryable by name.
//! Wire framing is delegated to hyper; socket I/O to tokio.
//!
//! ```no_run
//! use filament::{Cookie, HttpClient, HttpServer, Router};
//! use http::Method;
//!
//! # async fn demo() -> Result<(), filament::Error> {
//! let mut router = Router::new();
//! router.register(Method::GET, "/test", |req: filament::Request, resp: filament::Responder| async move {
//!     resp.add_cookie(Cookie::new("cookie1", "test_value")?)?;
//!     resp.send(req.into_body())
//! })?;
//!
//! let server = HttpServer::new(router).bind().await?;
//!
//! let client = HttpClient::builder().port(server.address().port()).build();
//! let jar = client.get("/test").response_single(|meta, _body| meta.cookies()).await?;
//! assert!(jar.contains_value("cookie1", "test_value"));
//!
//! server.dispose().await;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod cookie;
pub mod error;
pub mod http;
pub mod lifecycle;
pub mod net;
pub mod observability;
pub mod routing;

pub use client::{HttpClient, RequestBuilder, ResponseMetadata};
pub use config::{ClientConfig, ServerConfig};
pub use cookie::{Cookie, CookieJar};
pub use error::Error;
pub use http::{Body, HttpServer, Request, Responder};
pub use lifecycle::{DisposableServer, EndpointState};
pub use routing::{Handler, Router};
