//! Unit tests for the cleanup service

use chrono::Duration;
use std::sync::Arc;

use crate::domain::entities::token::TokenType;
use crate::errors::TokenError;
use crate::services::token::{
    Clock, IssueOptions, TokenCleanupConfig, TokenCleanupService, VerifyContext,
};

use super::support::{harness, payload, TestHarness};

fn cleanup_service(
    h: &TestHarness,
    config: TokenCleanupConfig,
) -> TokenCleanupService<
    crate::repositories::InMemorySessionStore,
    crate::repositories::InMemoryRevocationStore,
> {
    TokenCleanupService::new(
        Arc::clone(&h.sessions),
        Arc::clone(&h.revocations),
        Arc::clone(&h.secrets),
        Arc::clone(&h.clock) as Arc<dyn Clock>,
        config,
    )
}

#[tokio::test]
async fn test_sweep_removes_idle_sessions() {
    let h = harness();
    let pair = h
        .service
        .issue(payload(), IssueOptions::default())
        .await
        .unwrap();

    let cleanup = cleanup_service(
        &h,
        TokenCleanupConfig {
            session_idle_timeout: 3600,
            rotate_secrets: false,
            ..Default::default()
        },
    );

    // not idle yet
    let result = cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.sessions_removed, 0);

    h.clock.advance(Duration::hours(2));
    let result = cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.sessions_removed, 1);

    // the refresh token outlives the idle timeout but its session is gone
    let verification = h
        .service
        .verify(&pair.refresh_token, TokenType::Refresh, &VerifyContext::default())
        .await
        .unwrap();
    assert_eq!(verification.error, Some(TokenError::SessionInvalid));
}

#[tokio::test]
async fn test_sweep_spares_recently_active_sessions() {
    let h = harness();
    let pair = h
        .service
        .issue(payload(), IssueOptions::default())
        .await
        .unwrap();

    let cleanup = cleanup_service(
        &h,
        TokenCleanupConfig {
            session_idle_timeout: 3600,
            rotate_secrets: false,
            ..Default::default()
        },
    );

    // verification touches the session, resetting the idle window
    h.clock.advance(Duration::minutes(50));
    let verification = h
        .service
        .verify(&pair.access_token, TokenType::Access, &VerifyContext::default())
        .await
        .unwrap();
    assert!(verification.is_valid);

    h.clock.advance(Duration::minutes(50));
    let result = cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.sessions_removed, 0);
}

#[tokio::test]
async fn test_sweep_purges_expired_revocations() {
    let h = harness();
    let pair = h
        .service
        .issue(payload(), IssueOptions::default())
        .await
        .unwrap();
    h.service
        .revoke(&pair.access_token, "test")
        .await
        .unwrap();

    let cleanup = cleanup_service(
        &h,
        TokenCleanupConfig {
            revocation_retention: 3600,
            rotate_secrets: false,
            ..Default::default()
        },
    );

    let result = cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.revocations_removed, 0);

    h.clock.advance(Duration::hours(2));
    let result = cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.revocations_removed, 1);
}

#[tokio::test]
async fn test_scheduled_rotation_when_secret_is_due() {
    let h = harness();
    let cleanup = cleanup_service(
        &h,
        TokenCleanupConfig {
            rotation_interval: 86400,
            ..Default::default()
        },
    );

    let result = cleanup.run_cleanup().await.unwrap();
    assert!(!result.rotated);
    assert_eq!(h.secrets.current_version().await, 1);

    h.clock.advance(Duration::days(2));
    let result = cleanup.run_cleanup().await.unwrap();
    assert!(result.rotated);
    assert_eq!(h.secrets.current_version().await, 2);

    // the next run sees a fresh secret and leaves it alone
    let result = cleanup.run_cleanup().await.unwrap();
    assert!(!result.rotated);
}

#[tokio::test]
async fn test_superseded_versions_pruned_after_grace() {
    let h = harness();
    // harness grace period is 24h with 2 retained versions
    h.secrets.rotate().await;
    h.secrets.rotate().await;
    h.secrets.rotate().await;

    let cleanup = cleanup_service(
        &h,
        TokenCleanupConfig {
            rotate_secrets: false,
            ..Default::default()
        },
    );

    let result = cleanup.run_cleanup().await.unwrap();
    assert_eq!(result.secret_versions_pruned, 0);

    h.clock.advance(Duration::hours(25));
    let result = cleanup.run_cleanup().await.unwrap();
    // versions 1 and 2 fall outside the retained window; 3 and 4 stay
    assert_eq!(result.secret_versions_pruned, 2);
}

#[tokio::test]
async fn test_disabled_cleanup_is_a_noop() {
    let h = harness();
    h.service
        .issue(payload(), IssueOptions::default())
        .await
        .unwrap();

    let cleanup = cleanup_service(
        &h,
        TokenCleanupConfig {
            enabled: false,
            session_idle_timeout: 1,
            ..Default::default()
        },
    );

    h.clock.advance(Duration::days(365));
    let result = cleanup.run_cleanup().await.unwrap();
    assert!(!result.changed_state());
    assert!(result.is_success());
}
