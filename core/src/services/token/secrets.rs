//! Versioned signing secret store and rotator.
//!
//! Tokens carry the version of the secret that signed them, so rotation
//! never invalidates outstanding tokens immediately: a superseded version
//! stays resolvable for a grace period at least as long as the access
//! token lifetime, then gets pruned. Tokens referencing a pruned version
//! fail verification permanently.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey};
use rand::RngCore;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::info;

use crate::errors::TokenError;

use super::clock::Clock;

/// Entropy of each generated signing secret, in bytes
const SECRET_LEN: usize = 64;

struct SecretVersion {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    created_at: DateTime<Utc>,
    superseded_at: Option<DateTime<Utc>>,
}

struct SecretRing {
    current: u32,
    versions: BTreeMap<u32, SecretVersion>,
}

/// Holder of the versioned signing secrets.
///
/// Reads (every verification) take a read lock; rotation is the
/// infrequent writer.
pub struct SecretStore {
    ring: RwLock<SecretRing>,
    clock: Arc<dyn Clock>,
    grace_period: Duration,
    retained_versions: usize,
}

impl SecretStore {
    /// Create a store with a freshly generated version 1 secret.
    ///
    /// `grace_period` must be at least the access token lifetime;
    /// `retained_versions` is clamped to a minimum of 2.
    pub fn new(clock: Arc<dyn Clock>, grace_period: Duration, retained_versions: usize) -> Self {
        let now = clock.now();
        let mut versions = BTreeMap::new();
        versions.insert(1, Self::generate_version(now));

        Self {
            ring: RwLock::new(SecretRing {
                current: 1,
                versions,
            }),
            clock,
            grace_period,
            retained_versions: retained_versions.max(2),
        }
    }

    fn generate_version(now: DateTime<Utc>) -> SecretVersion {
        let mut secret = [0u8; SECRET_LEN];
        rand::thread_rng().fill_bytes(&mut secret);

        SecretVersion {
            encoding_key: EncodingKey::from_secret(&secret),
            decoding_key: DecodingKey::from_secret(&secret),
            created_at: now,
            superseded_at: None,
        }
    }

    /// The current version and its signing key
    pub async fn current(&self) -> (u32, EncodingKey) {
        let ring = self.ring.read().await;
        let version = &ring.versions[&ring.current];
        (ring.current, version.encoding_key.clone())
    }

    /// The current version number
    pub async fn current_version(&self) -> u32 {
        self.ring.read().await.current
    }

    /// When the current version was created; drives scheduled rotation
    pub async fn current_created_at(&self) -> DateTime<Utc> {
        let ring = self.ring.read().await;
        ring.versions[&ring.current].created_at
    }

    /// Verification key for a declared token version.
    ///
    /// Fails with `SecretUnavailable` once the version has been pruned;
    /// this is permanent, not retried.
    pub async fn decoding_key(&self, version: u32) -> Result<DecodingKey, TokenError> {
        let ring = self.ring.read().await;
        ring.versions
            .get(&version)
            .map(|v| v.decoding_key.clone())
            .ok_or(TokenError::SecretUnavailable { version })
    }

    /// Number of versions currently resolvable
    pub async fn version_count(&self) -> usize {
        self.ring.read().await.versions.len()
    }

    /// Generate a new secret and make it current.
    ///
    /// The predecessor is marked superseded and becomes prunable once
    /// the grace period elapses. Returns the new version number.
    pub async fn rotate(&self) -> u32 {
        let now = self.clock.now();
        let mut ring = self.ring.write().await;

        let previous = ring.current;
        if let Some(version) = ring.versions.get_mut(&previous) {
            version.superseded_at = Some(now);
        }

        let new_version = previous + 1;
        ring.versions.insert(new_version, Self::generate_version(now));
        ring.current = new_version;

        Self::prune_locked(&mut ring, now, self.grace_period, self.retained_versions);

        info!(version = new_version, "signing secret rotated");
        new_version
    }

    /// Drop versions that are past grace and outside the retained window.
    /// Returns the number pruned.
    pub async fn prune(&self) -> usize {
        let now = self.clock.now();
        let mut ring = self.ring.write().await;
        Self::prune_locked(&mut ring, now, self.grace_period, self.retained_versions)
    }

    fn prune_locked(
        ring: &mut SecretRing,
        now: DateTime<Utc>,
        grace_period: Duration,
        retained_versions: usize,
    ) -> usize {
        let floor = ring.current.saturating_sub(retained_versions as u32 - 1);
        let current = ring.current;
        let before = ring.versions.len();

        ring.versions.retain(|&version, v| {
            if version == current || version >= floor {
                return true;
            }
            match v.superseded_at {
                Some(superseded_at) => now - superseded_at < grace_period,
                None => true,
            }
        });

        before - ring.versions.len()
    }
}
