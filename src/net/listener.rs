//! Bounded TCP accept.
//!
//! # Responsibilities
//! - Bind the endpoint's listening socket
//! - Hand out connections together with a slot permit
//! - Cap concurrent connections at `max_connections`
//! - Surface every bind-time failure as `Error::Bind`

use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::Semaphore;

use crate::config::ServerConfig;
use crate::error::Error;

/// TCP listener that refuses to out-accept the server.
///
/// Each accepted connection holds one of `max_connections` semaphore slots;
/// once they are gone, accepting pauses until a connection ends.
pub struct Listener {
    inner: TcpListener,
    connection_limit: Arc<Semaphore>,
    max_connections: usize,
}

impl Listener {
    /// Bind to the address in `config`, with port 0 picking a free port.
    pub async fn bind(config: &ServerConfig) -> Result<Self, Error> {
        let addr: SocketAddr = config.bind_address.parse().map_err(|e| Error::Bind {
            addr: config.bind_address.clone(),
            source: std::io::Error::new(std::io::ErrorKind::InvalidInput, e),
        })?;

        let listener = TcpListener::bind(addr).await.map_err(|e| Error::Bind {
            addr: config.bind_address.clone(),
            source: e,
        })?;

        let local_addr = listener.local_addr().map_err(|e| Error::Bind {
            addr: config.bind_address.clone(),
            source: e,
        })?;

        tracing::info!(
            address = %local_addr,
            max_connections = config.max_connections,
            "Listener bound"
        );

        Ok(Self {
            inner: listener,
            connection_limit: Arc::new(Semaphore::new(config.max_connections)),
            max_connections: config.max_connections,
        })
    }

    /// Accept the next connection once a slot is free.
    ///
    /// The returned permit is the slot; it must live as long as the
    /// connection does.
    pub async fn accept(&self) -> std::io::Result<(TcpStream, SocketAddr, ConnectionPermit)> {
        // Slot before socket, so a full server stops pulling from the queue.
        let permit = self
            .connection_limit
            .clone()
            .acquire_owned()
            .await
            .expect("connection limit semaphore closed");

        let (stream, addr) = self.inner.accept().await?;

        tracing::debug!(
            peer = %addr,
            slots_left = self.connection_limit.available_permits(),
            "Connection accepted"
        );

        Ok((stream, addr, ConnectionPermit { _permit: permit }))
    }

    /// The address actually bound, including any assigned port.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.inner.local_addr()
    }

    /// Connection slots currently free.
    pub fn available_permits(&self) -> usize {
        self.connection_limit.available_permits()
    }

    pub fn max_connections(&self) -> usize {
        self.max_connections
    }
}

/// One held connection slot.
///
/// Dropping it frees the slot, including when the owning task panics.
#[derive(Debug)]
pub struct ConnectionPermit {
    _permit: tokio::sync::OwnedSemaphorePermit,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_config(max_connections: usize) -> ServerConfig {
        ServerConfig {
            bind_address: "127.0.0.1:0".into(),
            max_connections,
            ..ServerConfig::default()
        }
    }

    #[tokio::test]
    async fn bind_assigns_ephemeral_port() {
        let listener = Listener::bind(&test_config(4)).await.unwrap();
        assert_ne!(listener.local_addr().unwrap().port(), 0);
        assert_eq!(listener.available_permits(), 4);
    }

    #[tokio::test]
    async fn invalid_address_is_a_bind_error() {
        let config = ServerConfig {
            bind_address: "not-an-address".into(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            Listener::bind(&config).await,
            Err(Error::Bind { .. })
        ));
    }

    #[tokio::test]
    async fn address_in_use_is_a_bind_error() {
        let first = Listener::bind(&test_config(1)).await.unwrap();
        let taken = ServerConfig {
            bind_address: first.local_addr().unwrap().to_string(),
            ..ServerConfig::default()
        };
        assert!(matches!(
            Listener::bind(&taken).await,
            Err(Error::Bind { .. })
        ));
    }

    #[tokio::test]
    async fn permit_release_restores_capacity() {
        let listener = Listener::bind(&test_config(1)).await.unwrap();
        let addr = listener.local_addr().unwrap();

        let _client = TcpStream::connect(addr).await.unwrap();
        let (_stream, _peer, permit) = listener.accept().await.unwrap();
        assert_eq!(listener.available_permits(), 0);

        drop(permit);
        assert_eq!(listener.available_permits(), 1);
    }
}
