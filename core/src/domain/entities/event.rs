//! Security event entity for the append-only audit trail.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Severity taxonomy for security events
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// String form used in logs and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Event types recorded by the lifecycle engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SecurityEventType {
    // Issuance events
    TokenIssued,
    SingleUseTokenIssued,
    TokenRefreshed,
    Logout,

    // Verification events
    VerificationFailure,
    SuspiciousActivity,

    // Session events
    SessionEvicted,
    MfaVerified,

    // Revocation events
    TokenRevoked,
    MassRevocation,

    // Secret lifecycle events
    SecretRotated,
}

impl SecurityEventType {
    /// String form used for storage and statistics
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TokenIssued => "TOKEN_ISSUED",
            Self::SingleUseTokenIssued => "SINGLE_USE_TOKEN_ISSUED",
            Self::TokenRefreshed => "TOKEN_REFRESHED",
            Self::Logout => "LOGOUT",
            Self::VerificationFailure => "VERIFICATION_FAILURE",
            Self::SuspiciousActivity => "SUSPICIOUS_ACTIVITY",
            Self::SessionEvicted => "SESSION_EVICTED",
            Self::MfaVerified => "MFA_VERIFIED",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::MassRevocation => "MASS_REVOCATION",
            Self::SecretRotated => "SECRET_ROTATED",
        }
    }

    /// Default severity for this event type
    pub fn severity(&self) -> Severity {
        match self {
            Self::TokenIssued
            | Self::SingleUseTokenIssued
            | Self::TokenRefreshed
            | Self::MfaVerified
            | Self::Logout => Severity::Low,
            Self::SuspiciousActivity | Self::SessionEvicted | Self::SecretRotated => {
                Severity::Medium
            }
            Self::TokenRevoked | Self::VerificationFailure => Severity::High,
            Self::MassRevocation => Severity::Critical,
        }
    }
}

/// An append-only record of a security-relevant action.
///
/// Events are never mutated after creation; the builder methods below are
/// consumed before the event is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecurityEvent {
    /// Unique identifier for the event
    pub id: Uuid,

    /// Type of security event
    pub event_type: SecurityEventType,

    /// Severity of the event
    pub severity: Severity,

    /// User involved, if known
    pub user_id: Option<Uuid>,

    /// Session involved, if any
    pub session_id: Option<String>,

    /// IP address of the request
    pub ip_address: Option<String>,

    /// User agent string from the request
    pub user_agent: Option<String>,

    /// Additional event data in JSON format
    pub details: Option<JsonValue>,

    /// Timestamp when the event occurred
    pub created_at: DateTime<Utc>,
}

impl SecurityEvent {
    /// Create a new event with the type's default severity
    pub fn new(event_type: SecurityEventType, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_type,
            severity: event_type.severity(),
            user_id: None,
            session_id: None,
            ip_address: None,
            user_agent: None,
            details: None,
            created_at: now,
        }
    }

    /// Add user context
    pub fn with_user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Add session context
    pub fn with_session(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = Some(session_id.into());
        self
    }

    /// Add request context (IP and user agent)
    pub fn with_request_context(
        mut self,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> Self {
        self.ip_address = ip_address;
        self.user_agent = user_agent;
        self
    }

    /// Add event data as JSON
    pub fn with_details(mut self, details: JsonValue) -> Self {
        self.details = Some(details);
        self
    }

    /// Override the default severity (e.g. escalating repeated failures)
    pub fn with_severity(mut self, severity: Severity) -> Self {
        self.severity = severity;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_default_severities() {
        assert_eq!(SecurityEventType::TokenIssued.severity(), Severity::Low);
        assert_eq!(
            SecurityEventType::SuspiciousActivity.severity(),
            Severity::Medium
        );
        assert_eq!(SecurityEventType::TokenRevoked.severity(), Severity::High);
        assert_eq!(
            SecurityEventType::MassRevocation.severity(),
            Severity::Critical
        );
    }

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Low < Severity::Medium);
        assert!(Severity::High < Severity::Critical);
    }

    #[test]
    fn test_event_builder() {
        let now = Utc::now();
        let user_id = Uuid::new_v4();
        let event = SecurityEvent::new(SecurityEventType::SessionEvicted, now)
            .with_user(user_id)
            .with_session("sess-1")
            .with_request_context(Some("10.0.0.1".to_string()), None)
            .with_details(json!({ "evicted": "sess-0" }));

        assert_eq!(event.severity, Severity::Medium);
        assert_eq!(event.user_id, Some(user_id));
        assert_eq!(event.session_id.as_deref(), Some("sess-1"));
        assert_eq!(event.ip_address.as_deref(), Some("10.0.0.1"));
        assert!(event.details.is_some());
        assert_eq!(event.created_at, now);
    }

    #[test]
    fn test_severity_override() {
        let event = SecurityEvent::new(SecurityEventType::VerificationFailure, Utc::now())
            .with_severity(Severity::Critical);
        assert_eq!(event.severity, Severity::Critical);
    }
}
