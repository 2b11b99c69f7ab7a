//! Error taxonomy for the exchange core.
//!
//! # Design Decisions
//! - One crate-wide enum; callers match on variants rather than downcasting
//! - Transport failures abort the current exchange, never the endpoint
//! - `NoMatch` is not an error: route lookup returns `Option`

use http::Method;
use thiserror::Error;

/// Boxed error type used at the transport boundary.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// All failures surfaced by the exchange core.
#[derive(Debug, Error)]
pub enum Error {
    /// A `Set-Cookie` or `Cookie` pair could not be parsed.
    ///
    /// Recoverable: the offending cookie is dropped and parsing continues.
    #[error("malformed cookie: {0}")]
    MalformedCookie(String),

    /// A (method, path) pair was registered twice.
    #[error("duplicate route: {method} {path}")]
    DuplicateRoute { method: Method, path: String },

    /// Binding the listening socket failed (address in use, permission denied).
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A cookie was added after the response was committed to the wire.
    ///
    /// Programmer error. The response already in flight is unharmed.
    #[error("cookie added after the response was sent")]
    LateCookie,

    /// `send` was called on a responder that already committed a response.
    #[error("response already sent")]
    AlreadySent,

    /// A header name or value supplied by a handler is not valid HTTP.
    ///
    /// Programmer error, like [`Error::LateCookie`]; nothing was written to
    /// the wire.
    #[error("invalid header: {0}")]
    InvalidHeader(String),

    /// A relative request target was used without a configured authority.
    #[error("relative target {0:?} requires a configured authority")]
    MissingAuthority(String),

    /// The request target could not be parsed as a URI.
    #[error("invalid request target: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    /// The connection attempt did not complete within the configured timeout.
    #[error("connect timed out")]
    ConnectTimeout,

    /// The peer closed the connection before the exchange completed.
    #[error("connection reset by peer")]
    ConnectionReset,

    /// The exchange was cancelled by endpoint disposal.
    #[error("exchange cancelled")]
    Cancelled,

    /// Any other transport-level failure, with its source preserved.
    #[error("transport error: {0}")]
    Transport(#[source] BoxError),
}

impl Error {
    /// Map a hyper protocol error onto the taxonomy.
    pub(crate) fn from_hyper(err: hyper::Error) -> Self {
        if err.is_canceled() {
            return Error::Cancelled;
        }
        if err.is_incomplete_message() {
            return Error::ConnectionReset;
        }
        if let Some(kind) = find_io_kind(&err) {
            return Error::from_io_kind(kind, err);
        }
        Error::Transport(Box::new(err))
    }

    /// Map a pooled-client error onto the taxonomy by walking its source chain.
    pub(crate) fn from_client(err: hyper_util::client::legacy::Error) -> Self {
        if let Some(kind) = find_io_kind(&err) {
            return Error::from_io_kind(kind, err);
        }
        let mut source: Option<&(dyn std::error::Error + 'static)> = Some(&err);
        while let Some(cause) = source {
            if let Some(h) = cause.downcast_ref::<hyper::Error>() {
                if h.is_incomplete_message() || h.is_canceled() {
                    return Error::ConnectionReset;
                }
            }
            source = cause.source();
        }
        Error::Transport(Box::new(err))
    }

    fn from_io_kind<E>(kind: std::io::ErrorKind, err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        use std::io::ErrorKind;
        match kind {
            ErrorKind::TimedOut => Error::ConnectTimeout,
            ErrorKind::ConnectionReset
            | ErrorKind::ConnectionAborted
            | ErrorKind::BrokenPipe => Error::ConnectionReset,
            _ => Error::Transport(Box::new(err)),
        }
    }
}

/// Walk an error's source chain looking for the underlying I/O error kind.
fn find_io_kind(err: &(dyn std::error::Error + 'static)) -> Option<std::io::ErrorKind> {
    let mut source: Option<&(dyn std::error::Error + 'static)> = Some(err);
    while let Some(cause) = source {
        if let Some(io) = cause.downcast_ref::<std::io::Error>() {
            return Some(io.kind());
        }
        source = cause.source();
    }
    None
}
