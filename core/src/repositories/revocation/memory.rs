//! In-memory implementation of the revocation store.

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::errors::DomainResult;

use super::r#trait::RevocationStore;

/// Revocation store backed by a process-local map.
///
/// `insert_if_absent` performs its check and insert under a single write
/// lock, which is what makes concurrent refresh consumption race-free in
/// a single process.
#[derive(Clone, Default)]
pub struct InMemoryRevocationStore {
    entries: Arc<RwLock<HashMap<String, DateTime<Utc>>>>,
}

impl InMemoryRevocationStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of blacklisted entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    /// Whether the blacklist is empty
    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl RevocationStore for InMemoryRevocationStore {
    async fn insert(&self, token_hash: &str, revoked_at: DateTime<Utc>) -> DomainResult<()> {
        let mut entries = self.entries.write().await;
        entries.entry(token_hash.to_string()).or_insert(revoked_at);
        Ok(())
    }

    async fn contains(&self, token_hash: &str) -> DomainResult<bool> {
        let entries = self.entries.read().await;
        Ok(entries.contains_key(token_hash))
    }

    async fn insert_if_absent(
        &self,
        token_hash: &str,
        revoked_at: DateTime<Utc>,
    ) -> DomainResult<bool> {
        let mut entries = self.entries.write().await;
        if entries.contains_key(token_hash) {
            return Ok(false);
        }
        entries.insert(token_hash.to_string(), revoked_at);
        Ok(true)
    }

    async fn sweep(&self, now: DateTime<Utc>, retention: Duration) -> DomainResult<usize> {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, revoked_at| now - *revoked_at <= retention);
        Ok(before - entries.len())
    }
}
