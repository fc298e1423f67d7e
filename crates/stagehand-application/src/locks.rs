//! Per-user lock table.
//!
//! Serializes the load→mutate→save cycle for a single user while leaving
//! different users fully concurrent. The table is bounded: an entry is
//! reclaimed as soon as the last guard for that user drops.

use stagehand_core::action::UserId;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

type LockMap = Arc<Mutex<HashMap<UserId, Arc<AsyncMutex<()>>>>>;

/// A table of user-scoped exclusive locks.
#[derive(Debug, Default, Clone)]
pub struct UserLocks {
    inner: LockMap,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquires the exclusive lock for a user, waiting behind any in-flight
    /// request from the same user.
    pub async fn acquire(&self, user_id: UserId) -> UserLockGuard {
        let lock = {
            let mut map = self.inner.lock().unwrap_or_else(|e| e.into_inner());
            map.entry(user_id)
                .or_insert_with(|| Arc::new(AsyncMutex::new(())))
                .clone()
        };
        let guard = lock.lock_owned().await;
        UserLockGuard {
            user_id,
            map: self.inner.clone(),
            guard: Some(guard),
        }
    }

    /// Number of users currently tracked. Test and diagnostics helper.
    pub fn len(&self) -> usize {
        self.inner.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Held for the duration of one user's request-handling critical section.
pub struct UserLockGuard {
    user_id: UserId,
    map: LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for UserLockGuard {
    fn drop(&mut self) {
        // Release the lock first so a waiter never observes the entry gone
        // while still queued on it.
        drop(self.guard.take());
        let mut map = self.map.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(lock) = map.get(&self.user_id) {
            if Arc::strong_count(lock) == 1 {
                map.remove(&self.user_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn same_user_requests_are_serialized() {
        let locks = UserLocks::new();
        let counter = Arc::new(Mutex::new(0_i32));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let locks = locks.clone();
            let counter = counter.clone();
            handles.push(tokio::spawn(async move {
                let _guard = locks.acquire(UserId(1)).await;
                // Non-atomic read-modify-write; only safe under the lock.
                let read = *counter.lock().unwrap();
                tokio::time::sleep(Duration::from_millis(1)).await;
                *counter.lock().unwrap() = read + 1;
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(*counter.lock().unwrap(), 8);
    }

    #[tokio::test]
    async fn different_users_do_not_block_each_other() {
        let locks = UserLocks::new();
        let _one = locks.acquire(UserId(1)).await;
        // Completes immediately despite user 1 holding its lock.
        let _two = locks.acquire(UserId(2)).await;
        assert_eq!(locks.len(), 2);
    }

    #[tokio::test]
    async fn idle_entries_are_reclaimed() {
        let locks = UserLocks::new();
        {
            let _guard = locks.acquire(UserId(1)).await;
            assert_eq!(locks.len(), 1);
        }
        assert!(locks.is_empty());
    }
}
