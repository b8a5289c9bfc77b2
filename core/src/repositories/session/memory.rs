//! In-memory implementation of the session store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::domain::entities::session::Session;
use crate::errors::{DomainError, DomainResult};

use super::r#trait::SessionStore;

#[derive(Default)]
struct SessionIndex {
    by_id: HashMap<String, Session>,
    by_user: HashMap<Uuid, Vec<String>>,
}

/// Session store backed by process-local maps.
///
/// Suitable for a single-instance deployment and for tests. Holds a
/// `by_id` map plus a `by_user` index so per-user queries avoid a full
/// scan.
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    inner: Arc<RwLock<SessionIndex>>,
}

impl InMemorySessionStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of tracked sessions (active or not)
    pub async fn len(&self) -> usize {
        self.inner.read().await.by_id.len()
    }

    /// Whether the store tracks no sessions
    pub async fn is_empty(&self) -> bool {
        self.inner.read().await.by_id.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn insert(&self, session: Session) -> DomainResult<()> {
        let mut inner = self.inner.write().await;

        if inner.by_id.contains_key(&session.session_id) {
            return Err(DomainError::Validation {
                message: format!("session {} already exists", session.session_id),
            });
        }

        inner
            .by_user
            .entry(session.user_id)
            .or_default()
            .push(session.session_id.clone());
        inner.by_id.insert(session.session_id.clone(), session);
        Ok(())
    }

    async fn get(&self, session_id: &str) -> DomainResult<Option<Session>> {
        let inner = self.inner.read().await;
        Ok(inner.by_id.get(session_id).cloned())
    }

    async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> DomainResult<()> {
        let mut inner = self.inner.write().await;
        if let Some(session) = inner.by_id.get_mut(session_id) {
            session.touch(now);
        }
        Ok(())
    }

    async fn deactivate(&self, session_id: &str) -> DomainResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.by_id.get_mut(session_id) {
            Some(session) if session.is_active => {
                session.deactivate();
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn mark_mfa_verified(&self, session_id: &str) -> DomainResult<bool> {
        let mut inner = self.inner.write().await;
        match inner.by_id.get_mut(session_id) {
            Some(session) => {
                session.mfa_verified = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn active_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Session>> {
        let inner = self.inner.read().await;
        let mut sessions: Vec<Session> = inner
            .by_user
            .get(&user_id)
            .into_iter()
            .flatten()
            .filter_map(|id| inner.by_id.get(id))
            .filter(|s| s.is_active)
            .cloned()
            .collect();
        sessions.sort_by_key(|s| s.created_at);
        Ok(sessions)
    }

    async fn deactivate_all_for_user(&self, user_id: Uuid) -> DomainResult<usize> {
        let mut inner = self.inner.write().await;
        let ids: Vec<String> = inner.by_user.get(&user_id).cloned().unwrap_or_default();

        let mut count = 0;
        for id in ids {
            if let Some(session) = inner.by_id.get_mut(&id) {
                if session.is_active {
                    session.deactivate();
                    count += 1;
                }
            }
        }
        Ok(count)
    }

    async fn sweep(&self, now: DateTime<Utc>, timeout: Duration) -> DomainResult<usize> {
        let mut inner = self.inner.write().await;

        let expired: Vec<(String, Uuid)> = inner
            .by_id
            .values()
            .filter(|s| s.is_idle_expired(now, timeout))
            .map(|s| (s.session_id.clone(), s.user_id))
            .collect();

        for (id, user_id) in &expired {
            inner.by_id.remove(id);
            if let Some(ids) = inner.by_user.get_mut(user_id) {
                ids.retain(|existing| existing != id);
                if ids.is_empty() {
                    inner.by_user.remove(user_id);
                }
            }
        }

        Ok(expired.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_for(user_id: Uuid, created_at: DateTime<Utc>) -> Session {
        let mut session = Session::new(user_id, created_at);
        session.last_activity = created_at;
        session
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = InMemorySessionStore::new();
        let session = session_for(Uuid::new_v4(), Utc::now());
        let id = session.session_id.clone();

        store.insert(session.clone()).await.unwrap();
        let found = store.get(&id).await.unwrap().unwrap();
        assert_eq!(found, session);
    }

    #[tokio::test]
    async fn test_duplicate_insert_rejected() {
        let store = InMemorySessionStore::new();
        let session = session_for(Uuid::new_v4(), Utc::now());

        store.insert(session.clone()).await.unwrap();
        assert!(store.insert(session).await.is_err());
    }

    #[tokio::test]
    async fn test_active_for_user_is_fifo_by_creation() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let base = Utc::now();

        let newest = session_for(user_id, base + Duration::minutes(2));
        let oldest = session_for(user_id, base);
        let middle = session_for(user_id, base + Duration::minutes(1));

        store.insert(newest.clone()).await.unwrap();
        store.insert(oldest.clone()).await.unwrap();
        store.insert(middle.clone()).await.unwrap();

        let active = store.active_for_user(user_id).await.unwrap();
        assert_eq!(active.len(), 3);
        assert_eq!(active[0].session_id, oldest.session_id);
        assert_eq!(active[2].session_id, newest.session_id);
    }

    #[tokio::test]
    async fn test_deactivate_removes_from_active_view() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let session = session_for(user_id, Utc::now());
        let id = session.session_id.clone();

        store.insert(session).await.unwrap();
        assert!(store.deactivate(&id).await.unwrap());
        // second deactivation is a no-op
        assert!(!store.deactivate(&id).await.unwrap());

        assert!(store.active_for_user(user_id).await.unwrap().is_empty());
        // still present for inspection until swept
        assert!(store.get(&id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_deactivate_all_for_user() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let other = Uuid::new_v4();

        for _ in 0..3 {
            store.insert(session_for(user_id, Utc::now())).await.unwrap();
        }
        store.insert(session_for(other, Utc::now())).await.unwrap();

        assert_eq!(store.count_active(user_id).await.unwrap(), 3);
        assert_eq!(store.deactivate_all_for_user(user_id).await.unwrap(), 3);
        assert_eq!(store.count_active(user_id).await.unwrap(), 0);
        assert!(store.active_for_user(user_id).await.unwrap().is_empty());
        assert_eq!(store.active_for_user(other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sweep_removes_idle_sessions() {
        let store = InMemorySessionStore::new();
        let user_id = Uuid::new_v4();
        let base = Utc::now();

        let idle = session_for(user_id, base - Duration::hours(3));
        let idle_id = idle.session_id.clone();
        let fresh = session_for(user_id, base);

        store.insert(idle).await.unwrap();
        store.insert(fresh.clone()).await.unwrap();

        let removed = store.sweep(base, Duration::hours(1)).await.unwrap();
        assert_eq!(removed, 1);
        assert!(store.get(&idle_id).await.unwrap().is_none());
        assert!(store.get(&fresh.session_id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_touch_extends_idle_window() {
        let store = InMemorySessionStore::new();
        let base = Utc::now();
        let session = session_for(Uuid::new_v4(), base - Duration::hours(3));
        let id = session.session_id.clone();

        store.insert(session).await.unwrap();
        store.touch(&id, base).await.unwrap();

        let removed = store.sweep(base, Duration::hours(1)).await.unwrap();
        assert_eq!(removed, 0);
    }

    #[tokio::test]
    async fn test_mark_mfa_verified() {
        let store = InMemorySessionStore::new();
        let session = session_for(Uuid::new_v4(), Utc::now());
        let id = session.session_id.clone();

        store.insert(session).await.unwrap();
        assert!(store.mark_mfa_verified(&id).await.unwrap());
        assert!(store.get(&id).await.unwrap().unwrap().mfa_verified);
        assert!(!store.mark_mfa_verified("missing").await.unwrap());
    }
}
