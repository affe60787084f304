//! Redelivery guard
//!
//! Telegram may hand the same update out again after a polling hiccup. Cart
//! mutations are not idempotent on the backend, so every update id is
//! remembered for a while and repeats are dropped. The memory is in-process:
//! an update redelivered after a restart is processed again.

use moka::future::Cache;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Cache of recently processed update ids
#[derive(Clone)]
pub struct RedeliveryGuard {
    /// Moka cache storing update_id -> () with automatic TTL
    seen: Cache<u32, ()>,
    /// Number of dropped repeats
    dropped: Arc<AtomicU64>,
}

impl RedeliveryGuard {
    /// Creates a guard remembering ids for `ttl_secs`, at most `max_capacity` of them
    ///
    /// # Examples
    ///
    /// ```
    /// use moltin_shop_bot::bot::RedeliveryGuard;
    ///
    /// let guard = RedeliveryGuard::new(600, 10_000);
    /// assert_eq!(guard.dropped_count(), 0);
    /// ```
    #[must_use]
    pub fn new(ttl_secs: u64, max_capacity: u64) -> Self {
        let seen = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            seen,
            dropped: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Returns `true` the first time an update id is offered, `false` for repeats
    pub async fn first_delivery(&self, update_id: u32) -> bool {
        let entry = self.seen.entry(update_id).or_insert(()).await;
        if entry.is_fresh() {
            return true;
        }

        let count = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
        debug!(update_id, dropped_total = count, "Dropping redelivered update");
        false
    }

    /// Number of repeats dropped so far
    #[must_use]
    pub fn dropped_count(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
