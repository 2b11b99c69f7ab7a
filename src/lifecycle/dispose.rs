//! Disposable handle for a bound server endpoint.

use std::net::SocketAddr;
use std::sync::{mpsc, Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;

use crate::lifecycle::shutdown::Shutdown;
use crate::lifecycle::tracker::ExchangeTracker;

/// Lifecycle states of a server endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointState {
    Unbound,
    Binding,
    /// Listening and serving exchanges.
    Bound,
    /// Shutdown triggered; draining in-flight exchanges.
    Disposing,
    /// Fully stopped; no tasks remain.
    Disposed,
}

impl std::fmt::Display for EndpointState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            EndpointState::Unbound => "unbound",
            EndpointState::Binding => "binding",
            EndpointState::Bound => "bound",
            EndpointState::Disposing => "disposing",
            EndpointState::Disposed => "disposed",
        };
        f.write_str(s)
    }
}

/// Handle to a bound server.
///
/// Dropping the handle does not stop the server; call [`dispose`] or
/// [`dispose_now`].
///
/// [`dispose`]: DisposableServer::dispose
/// [`dispose_now`]: DisposableServer::dispose_now
#[derive(Debug)]
pub struct DisposableServer {
    addr: SocketAddr,
    shutdown: Shutdown,
    state: Arc<Mutex<EndpointState>>,
    done: watch::Receiver<bool>,
    // Sync completion signal for dispose_now. Guarded by a mutex to keep the
    // handle Sync; mpsc::Receiver itself is not.
    done_sync: Mutex<mpsc::Receiver<()>>,
    tracker: ExchangeTracker,
}

impl DisposableServer {
    pub(crate) fn new(
        addr: SocketAddr,
        shutdown: Shutdown,
        state: Arc<Mutex<EndpointState>>,
        done: watch::Receiver<bool>,
        done_sync: mpsc::Receiver<()>,
        tracker: ExchangeTracker,
    ) -> Self {
        Self {
            addr,
            shutdown,
            state,
            done,
            done_sync: Mutex::new(done_sync),
            tracker,
        }
    }

    /// The address the server is actually bound to. With a port-0 bind this
    /// is where the assigned port is read from.
    pub fn address(&self) -> SocketAddr {
        self.addr
    }

    /// Current lifecycle state.
    pub fn state(&self) -> EndpointState {
        *self.state.lock().expect("endpoint state lock poisoned")
    }

    /// Number of exchanges currently in flight.
    pub fn active_exchanges(&self) -> usize {
        self.tracker.active_count()
    }

    /// Trigger disposal and resolve once the endpoint has fully stopped.
    ///
    /// Non-blocking: in-flight exchanges drain in the background (bounded by
    /// the configured grace period). Idempotent.
    pub async fn dispose(&self) {
        self.shutdown.trigger();
        let mut done = self.done.clone();
        let _ = done.wait_for(|finished| *finished).await;
    }

    /// Trigger disposal and block the calling thread until in-flight
    /// exchanges drain or `grace` elapses, whichever comes first.
    ///
    /// Returns true if the endpoint fully stopped within the grace period.
    /// Must not be called from an async context; use [`dispose`] there, or
    /// wrap this in `spawn_blocking`.
    pub fn dispose_now(&self, grace: Duration) -> bool {
        self.shutdown.trigger();
        let receiver = self.done_sync.lock().expect("disposal lock poisoned");
        match receiver.recv_timeout(grace) {
            Ok(()) => true,
            Err(mpsc::RecvTimeoutError::Timeout) => {
                tracing::warn!(
                    address = %self.addr,
                    active_exchanges = self.tracker.active_count(),
                    "Grace period elapsed before drain; forcing close"
                );
                false
            }
            // Sender dropped after signalling: the endpoint already stopped.
            Err(mpsc::RecvTimeoutError::Disconnected) => true,
        }
    }
}
