use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{ Mutex, OwnedMutexGuard };

/// Idle locks are dropped once the table grows past this size.
const PRUNE_THRESHOLD: usize = 1024;

/// Per-user async mutexes. Every ledger-changing operation holds the user's
/// lock for its whole read-check-write sequence.
#[derive(Clone, Default)]
pub struct UserLocks {
    inner: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
}

impl UserLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, user_id: &str) -> OwnedMutexGuard<()> {
        let lock = {
            let mut table = self.inner.lock().await;

            if table.len() >= PRUNE_THRESHOLD {
                // Only the table itself holds an idle lock
                table.retain(|_, lock| Arc::strong_count(lock) > 1);
            }

            table.entry(user_id.to_string()).or_default().clone()
        };

        lock.lock_owned().await
    }

    #[cfg(test)]
    async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
