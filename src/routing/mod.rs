//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Registration (before bind):
//!     router.register(method, path, handler)
//!     → rejected with DuplicateRoute on an identical pair
//!     → frozen behind Arc when the server binds
//!
//! Dispatch (per request):
//!     router.lookup(method, path)
//!     → Some(handler): invoke with (Request, Responder)
//!     → None: fixed 404, empty body, no cookies
//! ```
//!
//! # Design Decisions
//! - Exact-method, exact-path matching only; patterns are an extension point
//! - Immutable after bind: concurrent lookups without locks
//! - Explicit no-match rather than a silent default handler

pub mod handler;
pub mod router;

pub use handler::{Handler, HandlerFuture};
pub use router::Router;
