//! Cache collaborator
//!
//! Best-effort by contract: a failed read is a miss and a failed write is
//! dropped. The pipeline must keep working with no cache at all.

use async_trait::async_trait;
use std::time::Duration;

/// Well-known key for the learned exact-text response map
pub const LEARNED_RESPONSES_KEY: &str = "learned_responses";

/// Well-known key for the cached snapshot of active training entries
pub const TRAINING_CORPUS_KEY: &str = "training_corpus";

/// Key/value cache with per-entry TTL
#[async_trait]
pub trait ResponseCache: Send + Sync {
    /// Returns `None` on miss, expiry, or backend failure
    async fn get(&self, key: &str) -> Option<serde_json::Value>;

    async fn put(&self, key: &str, value: serde_json::Value, ttl: Duration);

    async fn forget(&self, key: &str);
}
