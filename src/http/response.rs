//! Outgoing response builder.
//!
//! # Responsibilities
//! - Accumulate status, headers, and cookies before the body is sent
//! - Enforce the commit point: `send` exactly once, nothing mutates after
//! - Emit one `Set-Cookie` header per cookie, in insertion order

use std::sync::{Arc, Mutex};

use bytes::Bytes;
use http::header::{HeaderName, HeaderValue, SET_COOKIE};
use http::{HeaderMap, StatusCode};

use crate::cookie::Cookie;
use crate::error::Error;
use crate::http::body::{self, Body};
use crate::lifecycle::ExchangeId;

/// Response builder handed to a handler.
///
/// Cloneable; all clones share the same underlying state, so a cookie added
/// through one clone after another clone called [`send`] still fails with
/// [`Error::LateCookie`].
///
/// [`send`]: Responder::send
#[derive(Clone)]
pub struct Responder {
    id: ExchangeId,
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    status: StatusCode,
    headers: HeaderMap,
    cookies: Vec<Cookie>,
    /// Set once `send` succeeds; never cleared, even after the server takes
    /// the response for transmission.
    committed: bool,
    response: Option<http::Response<Body>>,
}

impl Responder {
    pub(crate) fn new(id: ExchangeId) -> Self {
        Self {
            id,
            inner: Arc::new(Mutex::new(Inner {
                status: StatusCode::OK,
                headers: HeaderMap::new(),
                cookies: Vec::new(),
                committed: false,
                response: None,
            })),
        }
    }

    /// Identifier of the exchange this responder belongs to.
    pub fn exchange_id(&self) -> ExchangeId {
        self.id
    }

    /// Set the response status. Defaults to 200.
    pub fn set_status(&self, status: StatusCode) -> Result<(), Error> {
        let mut inner = self.lock();
        if inner.committed {
            return Err(Error::AlreadySent);
        }
        inner.status = status;
        Ok(())
    }

    /// Append a response header.
    ///
    /// Fails with [`Error::InvalidHeader`] when the name or value is not
    /// valid HTTP.
    pub fn header(&self, name: &str, value: &str) -> Result<(), Error> {
        let name = name
            .parse::<HeaderName>()
            .map_err(|_| Error::InvalidHeader(format!("bad header name {name:?}")))?;
        let value = HeaderValue::from_str(value)
            .map_err(|_| Error::InvalidHeader(format!("bad value for header {name}")))?;
        let mut inner = self.lock();
        if inner.committed {
            return Err(Error::AlreadySent);
        }
        inner.headers.append(name, value);
        Ok(())
    }

    /// Add a cookie to the response.
    ///
    /// May be called any number of times before [`Responder::send`]; each
    /// cookie becomes its own `Set-Cookie` header, in insertion order.
    /// Fails with [`Error::LateCookie`] once the response is committed.
    pub fn add_cookie(&self, cookie: Cookie) -> Result<(), Error> {
        let mut inner = self.lock();
        if inner.committed {
            tracing::warn!(
                exchange_id = %self.id,
                cookie = %cookie,
                "Cookie added after response was sent"
            );
            return Err(Error::LateCookie);
        }
        inner.cookies.push(cookie);
        Ok(())
    }

    /// Commit the response with the given body stream.
    ///
    /// Must be called exactly once. Headers and cookies are fixed from this
    /// point; the body may still be streaming when this returns.
    pub fn send(&self, body: Body) -> Result<(), Error> {
        let mut inner = self.lock();
        if inner.committed {
            return Err(Error::AlreadySent);
        }

        // Validate cookie header values before committing anything.
        let mut cookie_values = Vec::with_capacity(inner.cookies.len());
        for cookie in &inner.cookies {
            let value = HeaderValue::from_str(&cookie.to_header_value())
                .map_err(|_| Error::MalformedCookie(format!("unencodable cookie {cookie}")))?;
            cookie_values.push(value);
        }

        let mut response = http::Response::new(body);
        *response.status_mut() = inner.status;
        *response.headers_mut() = std::mem::take(&mut inner.headers);
        for value in cookie_values {
            response.headers_mut().append(SET_COOKIE, value);
        }

        inner.committed = true;
        inner.response = Some(response);
        tracing::debug!(
            exchange_id = %self.id,
            status = %inner.status,
            cookies = inner.cookies.len(),
            "Response committed"
        );
        Ok(())
    }

    /// Commit with a single-chunk body.
    pub fn send_bytes(&self, data: impl Into<Bytes>) -> Result<(), Error> {
        self.send(body::full(data))
    }

    /// Commit with an empty body.
    pub fn send_empty(&self) -> Result<(), Error> {
        self.send(body::empty())
    }

    /// Whether the response has been committed.
    pub fn is_committed(&self) -> bool {
        self.lock().committed
    }

    /// Take the committed response for transmission. The commit flag stays
    /// set, so late mutations keep failing after the handler returns.
    pub(crate) fn take_response(&self) -> Option<http::Response<Body>> {
        self.lock().response.take()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().expect("responder lock poisoned")
    }
}
