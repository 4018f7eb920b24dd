//! In-memory session store
//!
//! A shared `RwLock<HashMap>` with one reaper task per entry. The reaper holds
//! only a `Weak` handle to the map, so pending expiries are abandoned safely
//! when the store is dropped at shutdown. Explicit invalidation aborts the
//! reaper for the removed entry.

use super::{ContextStore, DocumentContext};
use crate::errors::Result;
use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::AbortHandle;
use tokio::time::Instant;
use tracing::debug;
use uuid::Uuid;

struct Entry {
    context: DocumentContext,
    /// Monotonic deadline used for the expiry check; `context.expires_at` is
    /// the wall-clock equivalent reported to clients.
    deadline: Instant,
    reaper: AbortHandle,
}

struct Inner {
    ttl: Duration,
    sessions: RwLock<HashMap<Uuid, Entry>>,
}

impl Inner {
    async fn remove(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id);
        match removed {
            Some(entry) => {
                entry.reaper.abort();
                metrics::counter!("lexplain_sessions_expired_total").increment(1);
                metrics::gauge!("lexplain_sessions_active").decrement(1.0);
                debug!(session_id = %id, "Session removed");
                true
            }
            None => false,
        }
    }
}

/// In-memory implementation of [`ContextStore`].
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            inner: Arc::new(Inner {
                ttl,
                sessions: RwLock::new(HashMap::new()),
            }),
        }
    }

    fn spawn_reaper(inner: &Arc<Inner>, id: Uuid, deadline: Instant) -> AbortHandle {
        let weak: Weak<Inner> = Arc::downgrade(inner);
        let handle = tokio::spawn(async move {
            tokio::time::sleep_until(deadline).await;
            if let Some(inner) = weak.upgrade() {
                inner.remove(id).await;
            }
        });
        handle.abort_handle()
    }
}

#[async_trait]
impl ContextStore for InMemoryStore {
    async fn create(&self, document_text: String) -> Result<DocumentContext> {
        let id = Uuid::new_v4();
        let created_at = Utc::now();
        let deadline = Instant::now() + self.inner.ttl;
        let context = DocumentContext {
            id,
            document_text: Arc::from(document_text),
            created_at,
            expires_at: created_at + chrono::Duration::seconds(self.inner.ttl.as_secs() as i64),
        };

        // Spawn while holding the write lock: even with a zero TTL the
        // reaper's remove cannot run until the entry is inserted.
        let mut sessions = self.inner.sessions.write().await;
        let reaper = Self::spawn_reaper(&self.inner, id, deadline);
        let previous = sessions.insert(
            id,
            Entry {
                context: context.clone(),
                deadline,
                reaper,
            },
        );
        // UUIDv4 ids never collide among live sessions in practice
        debug_assert!(previous.is_none());
        drop(sessions);

        metrics::counter!("lexplain_sessions_created_total").increment(1);
        metrics::gauge!("lexplain_sessions_active").increment(1.0);
        debug!(session_id = %id, ttl_secs = self.inner.ttl.as_secs(), "Session created");

        Ok(context)
    }

    async fn get(&self, id: Uuid) -> Result<Option<DocumentContext>> {
        let sessions = self.inner.sessions.read().await;
        match sessions.get(&id) {
            // Past-deadline entries the reaper has not yet collected count as
            // misses; the reaper will remove them shortly.
            Some(entry) if Instant::now() < entry.deadline => {
                debug!(session_id = %id, "Session hit");
                Ok(Some(entry.context.clone()))
            }
            Some(_) => {
                debug!(session_id = %id, "Session past deadline");
                Ok(None)
            }
            None => {
                debug!(session_id = %id, "Session miss");
                Ok(None)
            }
        }
    }

    async fn expire(&self, id: Uuid) -> bool {
        self.inner.remove(id).await
    }

    async fn len(&self) -> usize {
        self.inner.sessions.read().await.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const TTL: Duration = Duration::from_secs(30 * 60);

    #[tokio::test(start_paused = true)]
    async fn test_create_then_get_round_trips() {
        let store = InMemoryStore::new(TTL);
        let text = "Lease Agreement between A and B...";

        let created = store.create(text.to_string()).await.unwrap();
        let fetched = store.get(created.id).await.unwrap().unwrap();

        assert_eq!(&*fetched.document_text, text);
        assert_eq!(fetched.id, created.id);
    }

    #[tokio::test(start_paused = true)]
    async fn test_get_unknown_id_is_a_miss() {
        let store = InMemoryStore::new(TTL);
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_entry_unreachable_after_ttl() {
        let store = InMemoryStore::new(TTL);
        let created = store
            .create("Lease Agreement between A and B...".to_string())
            .await
            .unwrap();

        assert!(store.get(created.id).await.unwrap().is_some());

        tokio::time::advance(TTL + Duration::from_secs(1)).await;

        assert!(store.get(created.id).await.unwrap().is_none());

        // let the woken reaper task run, then the entry is gone from the map
        tokio::task::yield_now().await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ttl_is_fixed_not_sliding() {
        let ttl = Duration::from_secs(60);
        let store = InMemoryStore::new(ttl);
        let created = store.create("doc".to_string()).await.unwrap();

        // repeated reads must not push the deadline out
        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(store.get(created.id).await.unwrap().is_some());
        tokio::time::advance(Duration::from_secs(40)).await;
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_ttl_entry_is_still_reaped() {
        let store = InMemoryStore::new(Duration::ZERO);
        let created = store.create("doc".to_string()).await.unwrap();

        // already past its deadline, so never servable
        assert!(store.get(created.id).await.unwrap().is_none());

        // the reaper fires immediately and must still find the entry
        tokio::task::yield_now().await;
        assert_eq!(store.len().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_expire_is_idempotent() {
        let store = InMemoryStore::new(TTL);
        let created = store.create("doc".to_string()).await.unwrap();

        assert!(store.expire(created.id).await);
        assert!(!store.expire(created.id).await);
        assert!(store.get(created.id).await.unwrap().is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_creates_yield_distinct_ids() {
        let store = Arc::new(InMemoryStore::new(TTL));

        let tasks: Vec<_> = (0..32)
            .map(|i| {
                let store = store.clone();
                tokio::spawn(async move { store.create(format!("doc {i}")).await.unwrap().id })
            })
            .collect();

        let ids: HashSet<Uuid> = futures::future::join_all(tasks)
            .await
            .into_iter()
            .map(|res| res.unwrap())
            .collect();
        assert_eq!(ids.len(), 32);
        assert_eq!(store.len().await, 32);
    }

    #[tokio::test(start_paused = true)]
    async fn test_document_text_survives_unchanged() {
        let store = InMemoryStore::new(TTL);
        let text = "WHEREAS, the Tenant agrees to pay rent of $1,200 per month…";
        let created = store.create(text.to_string()).await.unwrap();

        for _ in 0..3 {
            let fetched = store.get(created.id).await.unwrap().unwrap();
            assert_eq!(&*fetched.document_text, text);
        }
    }
}
