//! Time-windowed deduplication for side effects that must not repeat.
//!
//! Used to keep the verification-email endpoint from being hit twice for the
//! same address within a minute. The store is passed to the calls that need
//! it, so tests and alternative backends can supply their own.
//!
//! # Usage
//!
//! ```rust,ignore
//! let dedup = InMemoryDedupStore::default();
//! if dedup.try_record("maria@example.com", Utc::now()).await {
//!     if send().await.is_err() {
//!         dedup.forget("maria@example.com").await;
//!     }
//! }
//! ```

use std::num::NonZeroUsize;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use lru::LruCache;
use tokio::sync::RwLock;

// ============================================================================
// Constants
// ============================================================================

/// Default number of tracked keys.
pub const DEFAULT_CAPACITY: usize = 1024;

/// Default window in seconds.
pub const DEFAULT_WINDOW_SECS: i64 = 60;

// ============================================================================
// DedupStore
// ============================================================================

#[async_trait]
pub trait DedupStore: Send + Sync {
    /// `true` if `key` was recorded less than one window before `now`.
    async fn is_recent(&self, key: &str, now: DateTime<Utc>) -> bool;

    /// Record `key` at `at` unless it is already recent. Returns `false`
    /// when an unexpired entry exists. Check and insert are one step.
    async fn try_record(&self, key: &str, at: DateTime<Utc>) -> bool;

    async fn forget(&self, key: &str);
}

/// Keys are compared case-insensitively, ignoring surrounding whitespace.
pub fn normalize_key(key: &str) -> String {
    key.trim().to_lowercase()
}

// ============================================================================
// InMemoryDedupStore
// ============================================================================

/// Bounded in-process store. Expired entries are dropped when next looked at;
/// the LRU bound caps memory in between.
pub struct InMemoryDedupStore {
    entries: RwLock<LruCache<String, DateTime<Utc>>>,
    window: Duration,
}

impl InMemoryDedupStore {
    pub fn new(capacity: usize, window: Duration) -> Self {
        Self {
            entries: RwLock::new(LruCache::new(
                NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN),
            )),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl InMemoryDedupStore {
    /// Unexpired entry for `key`; expired ones are evicted on the way.
    fn is_live(
        &self,
        entries: &mut LruCache<String, DateTime<Utc>>,
        key: &str,
        now: DateTime<Utc>,
    ) -> bool {
        let Some(&at) = entries.peek(key) else {
            return false;
        };
        if now.signed_duration_since(at) < self.window {
            true
        } else {
            entries.pop(key);
            false
        }
    }
}

impl Default for InMemoryDedupStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY, Duration::seconds(DEFAULT_WINDOW_SECS))
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn is_recent(&self, key: &str, now: DateTime<Utc>) -> bool {
        let key = normalize_key(key);
        let mut entries = self.entries.write().await;
        self.is_live(&mut entries, &key, now)
    }

    async fn try_record(&self, key: &str, at: DateTime<Utc>) -> bool {
        let key = normalize_key(key);
        let mut entries = self.entries.write().await;
        if self.is_live(&mut entries, &key, at) {
            return false;
        }
        log::debug!("Dedup record: {}", key);
        entries.put(key, at);
        true
    }

    async fn forget(&self, key: &str) {
        let key = normalize_key(key);
        self.entries.write().await.pop(&key);
    }
}

// ============================================================================
// Tests
// ============================================================================
