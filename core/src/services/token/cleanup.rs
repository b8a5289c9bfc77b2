//! Periodic maintenance of the session registry, revocation registry,
//! and signing secrets.
//!
//! Each sweep is idempotent and bounded by the number of live entries.
//! The sweeps delegate to the stores, which batch their own locking, so
//! no lock is held across a whole cleanup run.

use chrono::Duration;
use std::sync::Arc;
use tracing::{error, info, warn};

use crate::errors::DomainResult;
use crate::repositories::{RevocationStore, SessionStore};

use super::clock::Clock;
use super::secrets::SecretStore;

/// Configuration for the cleanup service
#[derive(Debug, Clone)]
pub struct TokenCleanupConfig {
    /// How often to run cleanup (in seconds)
    pub interval_seconds: u64,
    /// Idle timeout in seconds after which a session is removed
    pub session_idle_timeout: i64,
    /// Retention in seconds for revoked-token entries; must exceed the
    /// refresh token expiry
    pub revocation_retention: i64,
    /// Age in seconds of the current secret version that triggers a
    /// scheduled rotation
    pub rotation_interval: i64,
    /// Whether scheduled secret rotation is enabled
    pub rotate_secrets: bool,
    /// Whether to enable cleanup at all
    pub enabled: bool,
}

impl Default for TokenCleanupConfig {
    fn default() -> Self {
        Self {
            interval_seconds: 60,
            session_idle_timeout: 86400,    // 24 hours
            revocation_retention: 1209600,  // 14 days
            rotation_interval: 2592000,     // 30 days
            rotate_secrets: true,
            enabled: true,
        }
    }
}

/// Result of a cleanup run
#[derive(Debug, Default)]
pub struct CleanupResult {
    /// Number of idle sessions removed
    pub sessions_removed: usize,
    /// Number of expired revocation entries removed
    pub revocations_removed: usize,
    /// Number of signing secret versions pruned
    pub secret_versions_pruned: usize,
    /// Whether a scheduled secret rotation ran
    pub rotated: bool,
    /// Any errors encountered during cleanup
    pub errors: Vec<String>,
}

impl CleanupResult {
    /// Check if the cleanup was successful (no errors)
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    /// Whether the run changed any state
    pub fn changed_state(&self) -> bool {
        self.sessions_removed > 0
            || self.revocations_removed > 0
            || self.secret_versions_pruned > 0
            || self.rotated
    }
}

/// Service sweeping the registries and rotating secrets on schedule
pub struct TokenCleanupService<S: SessionStore + 'static, R: RevocationStore + 'static> {
    sessions: Arc<S>,
    revocations: Arc<R>,
    secrets: Arc<SecretStore>,
    clock: Arc<dyn Clock>,
    config: TokenCleanupConfig,
}

impl<S: SessionStore, R: RevocationStore> TokenCleanupService<S, R> {
    /// Create a new cleanup service over the same stores the token
    /// service uses
    pub fn new(
        sessions: Arc<S>,
        revocations: Arc<R>,
        secrets: Arc<SecretStore>,
        clock: Arc<dyn Clock>,
        config: TokenCleanupConfig,
    ) -> Self {
        Self {
            sessions,
            revocations,
            secrets,
            clock,
            config,
        }
    }

    /// Run a single cleanup cycle:
    /// 1. Remove idle sessions
    /// 2. Purge revocation entries past retention
    /// 3. Prune superseded secret versions past grace
    /// 4. Rotate the signing secret if the current version is due
    pub async fn run_cleanup(&self) -> DomainResult<CleanupResult> {
        if !self.config.enabled {
            return Ok(CleanupResult::default());
        }

        let now = self.clock.now();
        let mut result = CleanupResult::default();

        match self
            .sessions
            .sweep(now, Duration::seconds(self.config.session_idle_timeout))
            .await
        {
            Ok(count) => result.sessions_removed = count,
            Err(e) => {
                error!("failed to sweep sessions: {}", e);
                result.errors.push(format!("session sweep error: {}", e));
            }
        }

        match self
            .revocations
            .sweep(now, Duration::seconds(self.config.revocation_retention))
            .await
        {
            Ok(count) => result.revocations_removed = count,
            Err(e) => {
                error!("failed to sweep revocation registry: {}", e);
                result.errors.push(format!("revocation sweep error: {}", e));
            }
        }

        result.secret_versions_pruned = self.secrets.prune().await;

        if self.config.rotate_secrets {
            let age = now - self.secrets.current_created_at().await;
            if age >= Duration::seconds(self.config.rotation_interval) {
                let version = self.secrets.rotate().await;
                info!(version, "scheduled secret rotation");
                result.rotated = true;
            }
        }

        if result.changed_state() {
            info!(
                sessions = result.sessions_removed,
                revocations = result.revocations_removed,
                secrets = result.secret_versions_pruned,
                rotated = result.rotated,
                "cleanup cycle completed"
            );
        }

        Ok(result)
    }

    /// Start the cleanup service as a background task.
    ///
    /// Spawns a tokio task that runs cleanup at the configured interval.
    pub fn start_background_task(self: Arc<Self>) {
        if !self.config.enabled {
            warn!("token cleanup service is disabled");
            return;
        }

        let interval = std::time::Duration::from_secs(self.config.interval_seconds);

        tokio::spawn(async move {
            info!(
                "token cleanup service started - will run every {} seconds",
                self.config.interval_seconds
            );

            let mut interval_timer = tokio::time::interval(interval);

            loop {
                interval_timer.tick().await;

                match self.run_cleanup().await {
                    Ok(result) => {
                        if !result.errors.is_empty() {
                            warn!("cleanup completed with errors: {:?}", result.errors);
                        }
                    }
                    Err(e) => {
                        error!("cleanup cycle failed: {}", e);
                    }
                }
            }
        });
    }
}
