//! Request handler contract.

use std::future::Future;
use std::pin::Pin;

use crate::error::Error;
use crate::http::{Request, Responder};

/// Boxed future returned by a handler invocation.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<(), Error>> + Send>>;

/// A request handler.
///
/// Given the incoming request and the response builder, a handler may add
/// cookies and headers any number of times before calling
/// [`Responder::send`] exactly once. Additions after `send` fail with
/// [`Error::LateCookie`].
///
/// Implemented for any matching async closure, so routes read as:
///
/// ```ignore
/// router.register(Method::GET, "/test", |req: Request, resp: Responder| async move {
///     resp.add_cookie(Cookie::new("cookie1", "test_value")?)?;
///     resp.send(req.into_body())
/// })?;
/// ```
pub trait Handler: Send + Sync {
    fn call(&self, request: Request, responder: Responder) -> HandlerFuture;
}

impl<F, Fut> Handler for F
where
    F: Fn(Request, Responder) -> Fut + Send + Sync,
    Fut: Future<Output = Result<(), Error>> + Send + 'static,
{
    fn call(&self, request: Request, responder: Responder) -> HandlerFuture {
        Box::pin((self)(request, responder))
    }
}
