//! Session repository trait.
//!
//! Defines the interface for session persistence, decoupling the navigation
//! engine from the concrete key-value backend.

use super::model::Session;
use crate::action::UserId;
use crate::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// An abstract repository for per-user session persistence.
///
/// `find` returning `None` is not an error: it signals "new user" (or an
/// expired session) and the engine seeds a fresh session at the stage's
/// entry screen. Expiry is enforced by the backing store via the TTL passed
/// to `save`, never polled by callers.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Finds the session for a user.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(Session))`: session found
    /// - `Ok(None)`: no session (new user or store-expired)
    /// - `Err(_)`: store access failed
    async fn find(&self, user_id: UserId) -> Result<Option<Session>>;

    /// Saves a session with the given idle TTL.
    ///
    /// Must be atomic per user id: a concurrent save for the same user
    /// overwrites in last-write-wins order as sequenced by the caller.
    async fn save(&self, session: &Session, ttl: Duration) -> Result<()>;

    /// Deletes the session for a user. Deleting a missing session is not an
    /// error.
    async fn delete(&self, user_id: UserId) -> Result<()>;
}
