//! Transport plumbing beneath the HTTP codec.
//!
//! # Responsibilities
//! - Bind and accept TCP connections with backpressure (`listener`)
//! - Optional byte-level wiretap instrumentation on both endpoints (`wiretap`)
//!
//! TLS is out of scope; a terminating proxy or a richer transport layer owns it.

pub mod listener;
pub mod wiretap;

pub use listener::{ConnectionPermit, Listener};
pub use wiretap::{Direction, LogWiretap, WiretapConnector, WiretapHook, WiretapStream};
