//! Session entity binding a login instance to its device and network context.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A server-tracked login session.
///
/// One session corresponds to one token-pair lineage: the pair minted at
/// login and every pair produced by refreshing it carry the same session id.
/// The session outlives any individual access token and is deactivated on
/// logout, eviction, or idle timeout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Unique session identifier carried in token claims
    pub session_id: String,

    /// User this session belongs to
    pub user_id: Uuid,

    /// Device identifier supplied at login, if any
    pub device_id: Option<String>,

    /// IP address observed at login
    pub ip_address: Option<String>,

    /// User agent observed at login
    pub user_agent: Option<String>,

    /// Timestamp when the session was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of the most recent successful verification
    pub last_activity: DateTime<Utc>,

    /// Whether the session is live; inactive sessions fail verification
    pub is_active: bool,

    /// Whether a second factor has been confirmed for this session
    pub mfa_verified: bool,
}

impl Session {
    /// Creates a new active session
    pub fn new(user_id: Uuid, now: DateTime<Utc>) -> Self {
        Self {
            session_id: Uuid::new_v4().to_string(),
            user_id,
            device_id: None,
            ip_address: None,
            user_agent: None,
            created_at: now,
            last_activity: now,
            is_active: true,
            mfa_verified: false,
        }
    }

    /// Attach device context
    pub fn with_device(mut self, device_id: impl Into<String>) -> Self {
        self.device_id = Some(device_id.into());
        self
    }

    /// Attach network context
    pub fn with_network_context(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Records activity on the session
    pub fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    /// Marks the session as no longer usable
    pub fn deactivate(&mut self) {
        self.is_active = false;
    }

    /// Whether the session has been idle longer than `timeout`
    pub fn is_idle_expired(&self, now: DateTime<Utc>, timeout: Duration) -> bool {
        now - self.last_activity > timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_session_is_active() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let session = Session::new(user_id, now);

        assert_eq!(session.user_id, user_id);
        assert!(session.is_active);
        assert!(!session.mfa_verified);
        assert_eq!(session.created_at, now);
        assert_eq!(session.last_activity, now);
    }

    #[test]
    fn test_session_ids_are_unique() {
        let now = Utc::now();
        let a = Session::new(Uuid::new_v4(), now);
        let b = Session::new(Uuid::new_v4(), now);
        assert_ne!(a.session_id, b.session_id);
    }

    #[test]
    fn test_touch_updates_last_activity() {
        let now = Utc::now();
        let mut session = Session::new(Uuid::new_v4(), now);

        let later = now + Duration::minutes(10);
        session.touch(later);

        assert_eq!(session.last_activity, later);
        assert_eq!(session.created_at, now);
    }

    #[test]
    fn test_deactivate() {
        let mut session = Session::new(Uuid::new_v4(), Utc::now());
        session.deactivate();
        assert!(!session.is_active);
    }

    #[test]
    fn test_idle_expiry() {
        let now = Utc::now();
        let session = Session::new(Uuid::new_v4(), now);

        assert!(!session.is_idle_expired(now + Duration::minutes(30), Duration::hours(1)));
        assert!(session.is_idle_expired(now + Duration::hours(2), Duration::hours(1)));
    }

    #[test]
    fn test_context_builders() {
        let session = Session::new(Uuid::new_v4(), Utc::now())
            .with_device("device-1")
            .with_network_context(Some("10.0.0.1".to_string()), Some("cli/1.0".to_string()));

        assert_eq!(session.device_id.as_deref(), Some("device-1"));
        assert_eq!(session.ip_address.as_deref(), Some("10.0.0.1"));
        assert_eq!(session.user_agent.as_deref(), Some("cli/1.0"));
    }
}
