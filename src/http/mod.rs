//! HTTP exchange handling.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (hyper http1 serve, graceful shutdown)
//!     → request.rs (incoming context: method, path, headers, lazy body)
//!     → routing layer picks the handler
//!     → response.rs (responder: status, headers, cookies, then send)
//!     → body.rs (boxed byte streams, exchange-guarded until end-of-stream)
//! ```
//!
//! One exchange owns exactly one request and one response. Header writes
//! happen before body writes; cookie additions happen before the finalizing
//! send, after which no header mutation is observable.

pub mod body;
pub mod request;
pub mod response;
pub mod server;

pub use body::Body;
pub use request::Request;
pub use response::Responder;
pub use server::HttpServer;
