//! Key-value store trait.
//!
//! The narrow contract the session adapter needs from an external store:
//! GET/SET/DEL over byte-string values, with store-enforced expiry via the
//! TTL passed to `set`.

use async_trait::async_trait;
use stagehand_core::error::Result;
use std::time::Duration;

/// An abstract key-value store with expiry.
///
/// Implementations must be safe for concurrent use; per-key write ordering
/// is sequenced by the caller, not the store.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Fetches the value stored under a key.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(bytes))`: value present and not expired
    /// - `Ok(None)`: key missing or expired
    /// - `Err(_)`: store access failed
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>>;

    /// Stores a value under a key, atomically replacing any previous value.
    /// A `ttl` of `None` stores without expiry.
    async fn set(&self, key: &str, value: Vec<u8>, ttl: Option<Duration>) -> Result<()>;

    /// Removes a key. Removing a missing key is not an error.
    async fn delete(&self, key: &str) -> Result<()>;
}
