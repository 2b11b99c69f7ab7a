//! In-flight exchange tracking.
//!
//! # Responsibilities
//! - Generate unique exchange IDs for tracing
//! - Count exchanges from request receipt to response body end-of-stream
//! - Let disposal wait until the count drains to zero

use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Global atomic counter for exchange IDs.
/// Relaxed ordering is sufficient: we only need uniqueness.
static EXCHANGE_ID_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Unique identifier for one request/response exchange.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ExchangeId(u64);

impl ExchangeId {
    /// Generate a new unique exchange ID.
    pub fn new() -> Self {
        Self(EXCHANGE_ID_COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Default for ExchangeId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for ExchangeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "exchange-{}", self.0)
    }
}

/// Counts in-flight exchanges for graceful disposal.
#[derive(Debug, Clone, Default)]
pub struct ExchangeTracker {
    active: Arc<AtomicUsize>,
}

impl ExchangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new exchange. The returned guard decrements on drop; it is
    /// held by the response body so the exchange stays in flight until the
    /// body reaches end-of-stream.
    pub fn track(&self, id: ExchangeId) -> ExchangeGuard {
        self.active.fetch_add(1, Ordering::SeqCst);
        ExchangeGuard {
            active: Arc::clone(&self.active),
            id,
        }
    }

    /// Current in-flight exchange count.
    pub fn active_count(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    /// Wait until all exchanges complete, polling the counter.
    pub async fn drained(&self) {
        while self.active.load(Ordering::SeqCst) > 0 {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    }
}

/// Guard tracking one exchange's lifetime.
#[derive(Debug)]
pub struct ExchangeGuard {
    active: Arc<AtomicUsize>,
    id: ExchangeId,
}

impl ExchangeGuard {
    pub fn id(&self) -> ExchangeId {
        self.id
    }
}

impl Drop for ExchangeGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
        tracing::trace!(exchange_id = %self.id, "Exchange completed");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique() {
        let a = ExchangeId::new();
        let b = ExchangeId::new();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn guard_drop_drains_tracker() {
        let tracker = ExchangeTracker::new();
        let guard = tracker.track(ExchangeId::new());
        assert_eq!(tracker.active_count(), 1);
        drop(guard);
        assert_eq!(tracker.active_count(), 0);
        tracker.drained().await;
    }

    #[tokio::test]
    async fn drained_waits_for_outstanding_guard() {
        let tracker = ExchangeTracker::new();
        let guard = tracker.track(ExchangeId::new());
        let waiter = {
            let tracker = tracker.clone();
            tokio::spawn(async move { tracker.drained().await })
        };
        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(!waiter.is_finished());
        drop(guard);
        waiter.await.unwrap();
    }
}
