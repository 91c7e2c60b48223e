//! Bounded store of live sessions.
//!
//! Request handlers receive this explicitly instead of reaching for a
//! process-wide registry. Capacity is fixed: the least-recently-used
//! session is evicted when a new campaign arrives at the bound. Evicted or
//! removed sessions stay alive for any handler still holding their `Arc`.

use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;
use tokio::sync::Mutex;

use crate::session::{GameSession, SessionError};

/// Default number of live sessions kept in memory.
pub const DEFAULT_CAPACITY: usize = 32;

/// An LRU cache of live sessions keyed by campaign name.
pub struct SessionStore {
    sessions: Mutex<LruCache<String, Arc<Mutex<GameSession>>>>,
}

impl SessionStore {
    /// Create a store holding at most `capacity` sessions.
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity)
            .unwrap_or_else(|| NonZeroUsize::new(DEFAULT_CAPACITY).expect("nonzero default"));
        Self {
            sessions: Mutex::new(LruCache::new(capacity)),
        }
    }

    /// Fetch the session for `key`, opening one with `open` when absent.
    ///
    /// The store lock is held across `open`, so two concurrent requests for
    /// the same new campaign open it once.
    pub async fn get_or_open<F, Fut>(
        &self,
        key: &str,
        open: F,
    ) -> Result<Arc<Mutex<GameSession>>, SessionError>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<GameSession, SessionError>>,
    {
        let mut sessions = self.sessions.lock().await;
        if let Some(session) = sessions.get(key) {
            return Ok(Arc::clone(session));
        }

        let session = Arc::new(Mutex::new(open().await?));
        if sessions.len() == usize::from(sessions.cap()) {
            if let Some((evicted, _)) = sessions.pop_lru() {
                tracing::debug!(campaign = %evicted, "evicting least-recently-used session");
            }
        }
        sessions.put(key.to_string(), Arc::clone(&session));
        Ok(session)
    }

    /// Drop the cached session for `key` (reset teardown).
    pub async fn remove(&self, key: &str) {
        self.sessions.lock().await.pop(key);
    }

    /// Number of cached sessions.
    pub async fn len(&self) -> usize {
        self.sessions.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.lock().await.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::campaign::CampaignSeed;
    use crate::character::Character;
    use crate::persist::CampaignStore;
    use crate::session::SessionConfig;
    use crate::testing::MockGateway;
    use tempfile::TempDir;

    async fn open_session(dir: &TempDir, name: &str) -> Result<GameSession, SessionError> {
        GameSession::open(
            CampaignStore::new(dir.path()),
            Arc::new(MockGateway::new()),
            SessionConfig::new(name),
            CampaignSeed::Random,
            "Hero",
            || Character::random("Hero"),
        )
        .await
    }

    #[tokio::test]
    async fn test_get_or_open_caches() {
        let tmp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(4);

        let a = store.get_or_open("c1", || open_session(&tmp, "c1")).await.unwrap();
        let b = store.get_or_open("c1", || open_session(&tmp, "c1")).await.unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_capacity_bound_holds() {
        let tmp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(2);

        for name in ["c1", "c2", "c3"] {
            store
                .get_or_open(name, || open_session(&tmp, name))
                .await
                .unwrap();
        }

        assert_eq!(store.len().await, 2);

        // The oldest entry was evicted; re-requesting it reopens.
        let reopened = store.get_or_open("c1", || open_session(&tmp, "c1")).await;
        assert!(reopened.is_ok());
    }

    #[tokio::test]
    async fn test_remove_evicts() {
        let tmp = TempDir::new().expect("temp dir");
        let store = SessionStore::new(4);

        store.get_or_open("c1", || open_session(&tmp, "c1")).await.unwrap();
        store.remove("c1").await;

        assert!(store.is_empty().await);
    }
}
