//! Shared fixtures for token lifecycle tests

use chrono::{Duration, Utc};
use std::sync::Arc;
use uuid::Uuid;

use crate::repositories::{
    AuditSink, InMemoryRevocationStore, InMemorySessionStore, MemoryAuditSink,
};
use crate::services::audit::{SecurityEventLog, SecurityEventLogConfig};
use crate::services::token::{
    Clock, IssuePayload, ManualClock, SecretStore, TokenService, TokenServiceConfig,
};

pub type TestTokenService = TokenService<InMemorySessionStore, InMemoryRevocationStore>;

/// Everything a lifecycle test needs, wired over in-memory stores, a
/// manual clock, and a synchronous audit sink.
pub struct TestHarness {
    pub clock: Arc<ManualClock>,
    pub sink: Arc<MemoryAuditSink>,
    pub sessions: Arc<InMemorySessionStore>,
    pub revocations: Arc<InMemoryRevocationStore>,
    pub secrets: Arc<SecretStore>,
    pub service: Arc<TestTokenService>,
}

pub fn harness() -> TestHarness {
    harness_with(TokenServiceConfig::default())
}

pub fn harness_with(config: TokenServiceConfig) -> TestHarness {
    let clock = Arc::new(ManualClock::new(Utc::now()));
    let sink = Arc::new(MemoryAuditSink::new());
    let sessions = Arc::new(InMemorySessionStore::new());
    let revocations = Arc::new(InMemoryRevocationStore::new());
    let secrets = Arc::new(SecretStore::new(
        Arc::clone(&clock) as Arc<dyn Clock>,
        Duration::hours(24),
        2,
    ));
    let events = Arc::new(SecurityEventLog::new(
        Arc::clone(&sink) as Arc<dyn AuditSink>,
        SecurityEventLogConfig {
            capacity: 100,
            async_forwarding: false,
        },
    ));

    let service = Arc::new(TokenService::new(
        Arc::clone(&sessions),
        Arc::clone(&revocations),
        Arc::clone(&secrets),
        events,
        Arc::clone(&clock) as Arc<dyn Clock>,
        config,
    ));

    TestHarness {
        clock,
        sink,
        sessions,
        revocations,
        secrets,
        service,
    }
}

pub fn payload() -> IssuePayload {
    IssuePayload {
        user_id: Uuid::new_v4(),
        email: "u1@example.com".to_string(),
        role: "user".to_string(),
        permissions: vec!["read".to_string()],
    }
}
