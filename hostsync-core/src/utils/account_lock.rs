//! Per-account operation locks
//!
//! At most one reconciliation or single-resource mutation runs per hosting
//! account at a time. Different accounts never wait on each other.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

/// Held for the duration of one account operation.
pub type AccountGuard = OwnedMutexGuard<()>;

#[derive(Default)]
pub struct AccountLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl AccountLocks {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn entry(map: &mut HashMap<i64, Arc<Mutex<()>>>, account_id: i64) -> Arc<Mutex<()>> {
        // Only the map holds an idle lock; a guard keeps its own clone alive
        map.retain(|id, lock| *id == account_id || Arc::strong_count(lock) > 1);
        map.entry(account_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Wait until the account is free and lock it.
    pub async fn acquire(&self, account_id: i64) -> AccountGuard {
        let lock = {
            let mut map = self.locks.lock().await;
            Self::entry(&mut map, account_id)
        };
        lock.lock_owned().await
    }

    /// Lock the account if it is free right now.
    pub async fn try_acquire(&self, account_id: i64) -> Option<AccountGuard> {
        let lock = {
            let mut map = self.locks.lock().await;
            Self::entry(&mut map, account_id)
        };
        lock.try_lock_owned().ok()
    }

    /// Number of tracked accounts, idle ones included until the next prune.
    pub async fn tracked(&self) -> usize {
        self.locks.lock().await.len()
    }
}
