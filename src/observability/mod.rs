//! Observability.
//!
//! Structured logging via `tracing`; the byte-level wiretap lives at the
//! transport boundary in `net::wiretap` and feeds the same subscriber.

pub mod logging;
