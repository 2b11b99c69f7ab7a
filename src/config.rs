//! Endpoint configuration.
//!
//! All types derive Serde traits so a host process can deserialize them from
//! whatever configuration source it uses. The core itself never reads files;
//! the host supplies addresses and lifecycle triggers.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Server endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address (e.g. "127.0.0.1:8080"). Port 0 picks a free port.
    pub bind_address: String,

    /// Maximum concurrent connections (accept backpressure).
    pub max_connections: usize,

    /// How long disposal waits for in-flight exchanges before forcing close.
    pub drain_grace_ms: u64,

    /// Emit raw ingress/egress byte events at trace level.
    pub wiretap: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            max_connections: 1024,
            drain_grace_ms: 5_000,
            wiretap: false,
        }
    }
}

impl ServerConfig {
    /// Drain grace period as a `Duration`.
    pub fn drain_grace(&self) -> Duration {
        Duration::from_millis(self.drain_grace_ms)
    }
}

/// Client endpoint configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Default authority ("host:port") for relative request targets.
    pub authority: Option<String>,

    /// Connection establishment timeout.
    pub connect_timeout_ms: u64,

    /// Emit raw ingress/egress byte events at trace level.
    pub wiretap: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            authority: None,
            connect_timeout_ms: 10_000,
            wiretap: false,
        }
    }
}

impl ClientConfig {
    /// Connect timeout as a `Duration`.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_millis(self.connect_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_bind_ephemeral_port() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_address, "127.0.0.1:0");
        assert!(config.max_connections > 0);
        assert!(!config.wiretap);
    }

    #[test]
    fn client_defaults_have_no_authority() {
        let config = ClientConfig::default();
        assert!(config.authority.is_none());
        assert_eq!(config.connect_timeout(), Duration::from_secs(10));
    }
}
