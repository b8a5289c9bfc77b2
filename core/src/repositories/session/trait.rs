//! Session store trait defining the interface for session persistence.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use uuid::Uuid;

use crate::domain::entities::session::Session;
use crate::errors::DomainResult;

/// Storage interface for the session registry.
///
/// The registry owns its maps exclusively; all mutation goes through this
/// trait. A single-process deployment uses [`super::InMemorySessionStore`];
/// a multi-instance deployment must supply an implementation backed by a
/// shared store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Insert a new session.
    ///
    /// Fails if a session with the same id already exists.
    async fn insert(&self, session: Session) -> DomainResult<()>;

    /// Look up a session by id
    async fn get(&self, session_id: &str) -> DomainResult<Option<Session>>;

    /// Update `last_activity`; no-op if the session is absent
    async fn touch(&self, session_id: &str, now: DateTime<Utc>) -> DomainResult<()>;

    /// Mark a session inactive.
    ///
    /// Returns `true` if the session existed and was active.
    async fn deactivate(&self, session_id: &str) -> DomainResult<bool>;

    /// Mark the second factor confirmed for a session.
    ///
    /// Returns `true` if the session existed.
    async fn mark_mfa_verified(&self, session_id: &str) -> DomainResult<bool>;

    /// All active sessions for a user, oldest first by creation time
    async fn active_for_user(&self, user_id: Uuid) -> DomainResult<Vec<Session>>;

    /// Deactivate every active session for a user.
    ///
    /// Returns the number of sessions deactivated.
    async fn deactivate_all_for_user(&self, user_id: Uuid) -> DomainResult<usize>;

    /// Remove sessions idle longer than `timeout`, regardless of
    /// `is_active`. Returns the number removed.
    async fn sweep(&self, now: DateTime<Utc>, timeout: Duration) -> DomainResult<usize>;

    /// Number of active sessions for a user
    async fn count_active(&self, user_id: Uuid) -> DomainResult<usize> {
        Ok(self.active_for_user(user_id).await?.len())
    }
}
