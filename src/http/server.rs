//! Server endpoint.
//!
//! # Responsibilities
//! - Bind the listening socket (Unbound → Binding → Bound)
//! - Accept connections and serve them over hyper http1
//! - Construct one exchange per request and dispatch through the router
//! - Flush headers and cookies before the body, per the responder contract
//! - Drain in-flight exchanges on disposal, forcing close after the grace
//!   period

use std::convert::Infallible;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use http::StatusCode;
use hyper::body::Incoming;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use tokio::net::TcpStream;
use tokio::sync::watch;
use tokio::task::JoinSet;

use crate::config::ServerConfig;
use crate::error::Error;
use crate::http::body::{self, Body};
use crate::http::{Request, Responder};
use crate::lifecycle::{
    DisposableServer, EndpointState, ExchangeId, ExchangeTracker, Shutdown, ShutdownListener,
};
use crate::net::{ConnectionPermit, Listener, LogWiretap, WiretapHook, WiretapStream};
use crate::routing::Router;

/// HTTP server endpoint: routes built before bind, immutable after.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

/// State shared by the accept loop and every connection task.
struct Shared {
    router: Arc<Router>,
    tracker: ExchangeTracker,
    hook: Option<Arc<dyn WiretapHook>>,
}

impl HttpServer {
    /// Create a server with default configuration (ephemeral port).
    pub fn new(router: Router) -> Self {
        Self::with_config(router, ServerConfig::default())
    }

    pub fn with_config(router: Router, config: ServerConfig) -> Self {
        Self { router, config }
    }

    /// Bind the listener and start serving.
    ///
    /// On success the endpoint is `Bound` and the returned handle exposes the
    /// actual address and disposal. On failure nothing is left running.
    pub async fn bind(self) -> Result<DisposableServer, Error> {
        let state = Arc::new(Mutex::new(EndpointState::Binding));

        let listener = Listener::bind(&self.config).await?;
        let addr = listener.local_addr().map_err(|e| Error::Bind {
            addr: self.config.bind_address.clone(),
            source: e,
        })?;
        *state.lock().expect("endpoint state lock poisoned") = EndpointState::Bound;

        let shutdown = Shutdown::new();
        let tracker = ExchangeTracker::new();
        let (done_tx, done_rx) = watch::channel(false);
        let (done_sync_tx, done_sync_rx) = mpsc::channel();

        let hook: Option<Arc<dyn WiretapHook>> = if self.config.wiretap {
            Some(Arc::new(LogWiretap))
        } else {
            None
        };
        let shared = Arc::new(Shared {
            router: Arc::new(self.router),
            tracker: tracker.clone(),
            hook,
        });

        tracing::info!(address = %addr, routes = shared.router.len(), "Server bound");

        tokio::spawn(accept_loop(
            listener,
            shared,
            shutdown.clone(),
            Arc::clone(&state),
            done_tx,
            done_sync_tx,
            self.config.drain_grace(),
        ));

        Ok(DisposableServer::new(
            addr,
            shutdown,
            state,
            done_rx,
            done_sync_rx,
            tracker,
        ))
    }
}

#[allow(clippy::too_many_arguments)]
async fn accept_loop(
    listener: Listener,
    shared: Arc<Shared>,
    shutdown: Shutdown,
    state: Arc<Mutex<EndpointState>>,
    done_tx: watch::Sender<bool>,
    done_sync_tx: mpsc::Sender<()>,
    grace: Duration,
) {
    let mut stop = shutdown.subscribe();
    let mut connections = JoinSet::new();

    loop {
        tokio::select! {
            _ = stop.wait() => break,
            accepted = listener.accept() => match accepted {
                Ok((stream, _peer, permit)) => {
                    connections.spawn(serve_connection(
                        stream,
                        permit,
                        Arc::clone(&shared),
                        shutdown.subscribe(),
                    ));
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Accept failed");
                }
            },
            Some(finished) = connections.join_next(), if !connections.is_empty() => {
                if let Err(e) = finished {
                    if e.is_panic() {
                        tracing::error!("Connection task panicked");
                    }
                }
            }
        }
    }

    // Stop accepting, then drain. Listener drops here, freeing the port even
    // while stragglers finish.
    drop(listener);
    *state.lock().expect("endpoint state lock poisoned") = EndpointState::Disposing;
    tracing::info!(
        active_exchanges = shared.tracker.active_count(),
        "Disposing; draining in-flight exchanges"
    );

    if tokio::time::timeout(grace, shared.tracker.drained())
        .await
        .is_err()
    {
        tracing::warn!(
            active_exchanges = shared.tracker.active_count(),
            "Drain grace period elapsed; aborting remaining connections"
        );
    }
    connections.shutdown().await;

    *state.lock().expect("endpoint state lock poisoned") = EndpointState::Disposed;
    let _ = done_tx.send(true);
    let _ = done_sync_tx.send(());
    tracing::info!("Server disposed");
}

async fn serve_connection(
    stream: TcpStream,
    _permit: ConnectionPermit,
    shared: Arc<Shared>,
    mut shutdown: ShutdownListener,
) {
    let io = TokioIo::new(WiretapStream::new(stream, shared.hook.clone()));
    let service = service_fn({
        let shared = Arc::clone(&shared);
        move |req| handle_exchange(Arc::clone(&shared), req)
    });

    let conn = http1::Builder::new().serve_connection(io, service);
    tokio::pin!(conn);

    tokio::select! {
        result = conn.as_mut() => {
            if let Err(e) = result {
                tracing::debug!(error = %e, "Connection ended with error");
            }
        }
        _ = shutdown.wait() => {
            // Finish the in-flight exchange, then close.
            conn.as_mut().graceful_shutdown();
            if let Err(e) = conn.as_mut().await {
                tracing::debug!(error = %e, "Connection ended during shutdown");
            }
        }
    }
}

/// One request/response exchange: route, invoke, finalize.
async fn handle_exchange(
    shared: Arc<Shared>,
    req: hyper::Request<Incoming>,
) -> Result<http::Response<Body>, Infallible> {
    let id = ExchangeId::new();
    let guard = shared.tracker.track(id);

    let (parts, body_in) = req.into_parts();
    let method = parts.method.clone();
    let path = parts.uri.path().to_string();
    tracing::debug!(exchange_id = %id, method = %method, path = %path, "Exchange started");

    let response = match shared.router.lookup(&method, &path) {
        None => {
            tracing::debug!(exchange_id = %id, method = %method, path = %path, "No route matched");
            status_response(StatusCode::NOT_FOUND)
        }
        Some(handler) => {
            let request = Request::from_parts(id, parts, body_in);
            let responder = Responder::new(id);
            match handler.call(request, responder.clone()).await {
                Ok(()) => match responder.take_response() {
                    Some(response) => response,
                    None => {
                        tracing::warn!(exchange_id = %id, "Handler returned without sending");
                        status_response(StatusCode::INTERNAL_SERVER_ERROR)
                    }
                },
                Err(err) => match responder.take_response() {
                    // A committed response stays valid even when the handler
                    // failed afterwards (e.g. a late cookie).
                    Some(response) => {
                        tracing::warn!(exchange_id = %id, error = %err, "Handler failed after commit");
                        response
                    }
                    None => {
                        tracing::error!(exchange_id = %id, error = %err, "Handler failed");
                        status_response(StatusCode::INTERNAL_SERVER_ERROR)
                    }
                },
            }
        }
    };

    // The guard rides on the body: the exchange stays in flight until the
    // response stream reaches end-of-stream.
    let (parts, body_out) = response.into_parts();
    Ok(http::Response::from_parts(
        parts,
        body::guarded(body_out, guard),
    ))
}

fn status_response(status: StatusCode) -> http::Response<Body> {
    let mut response = http::Response::new(body::empty());
    *response.status_mut() = status;
    response
}
