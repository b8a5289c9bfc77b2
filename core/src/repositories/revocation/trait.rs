//! Revocation store trait defining the interface for the token blacklist.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};

use crate::errors::DomainResult;

/// Storage interface for the revocation registry.
///
/// Entries are keyed by the SHA-256 hash of the raw token so the registry
/// never holds a usable credential. Retention must exceed the longest
/// token TTL, or a revoked token could expire out of the blacklist while
/// still cryptographically valid.
#[async_trait]
pub trait RevocationStore: Send + Sync {
    /// Record a token hash as revoked. Idempotent: re-revoking an already
    /// revoked token keeps the original `revoked_at`.
    async fn insert(&self, token_hash: &str, revoked_at: DateTime<Utc>) -> DomainResult<()>;

    /// Whether the token hash is currently blacklisted
    async fn contains(&self, token_hash: &str) -> DomainResult<bool>;

    /// Atomically record the hash only if it is not already present.
    ///
    /// Returns `true` if this call inserted the entry, `false` if another
    /// caller got there first. This is the single-use primitive for
    /// refresh token consumption: exactly one of N concurrent callers
    /// observes `true`.
    async fn insert_if_absent(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
    ) -> DomainResult<bool>;

    /// Purge entries older than `retention`. Returns the number removed.
    async fn sweep(&self, now: DateTime<Utc>, retention: Duration) -> DomainResult<usize>;
}
