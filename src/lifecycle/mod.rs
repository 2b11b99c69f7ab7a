//! Endpoint lifecycle management.
//!
//! # Data Flow
//! ```text
//! Bind:
//!     Unbound → Binding → Bound (accept loop running)
//!
//! Dispose:
//!     dispose()          → trigger shutdown → stop accepting → drain → Disposed
//!     dispose_now(grace) → trigger shutdown → block caller until drained
//!                          or the grace period elapses, then force close
//! ```
//!
//! # Design Decisions
//! - Shutdown is a level-triggered watch signal: late subscribers still see it
//! - In-flight exchanges are tracked by guard, released at body end-of-stream
//! - Disposal is idempotent; repeat calls await the same completion

pub mod dispose;
pub mod shutdown;
pub mod tracker;

pub use dispose::{DisposableServer, EndpointState};
pub use shutdown::{Shutdown, ShutdownListener};
pub use tracker::{ExchangeGuard, ExchangeId, ExchangeTracker};
