//! Main token lifecycle service implementation

use chrono::Duration;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header, Validation};
use serde_json::json;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::domain::entities::event::{SecurityEvent, SecurityEventType};
use crate::domain::entities::session::Session;
use crate::domain::entities::token::{Claims, SingleUsePurpose, TokenPair, TokenType};
use crate::errors::{DomainError, DomainResult, TokenError};
use crate::repositories::{RevocationStore, SessionStore};
use crate::services::audit::SecurityEventLog;
use crate::services::mfa::MfaProvider;

use super::clock::Clock;
use super::config::TokenServiceConfig;
use super::secrets::SecretStore;

/// Identity carried into token issuance
#[derive(Debug, Clone)]
pub struct IssuePayload {
    /// The user's UUID
    pub user_id: Uuid,
    /// User email, required non-empty
    pub email: String,
    /// User role, required non-empty
    pub role: String,
    /// Granted permissions, required non-empty
    pub permissions: Vec<String>,
}

/// Request context captured at issuance
#[derive(Debug, Clone, Default)]
pub struct IssueOptions {
    /// Device identifier for session tracking
    pub device_id: Option<String>,
    /// IP address of the login request
    pub ip_address: Option<String>,
    /// User agent of the login request
    pub user_agent: Option<String>,
    /// Whether a second factor was already confirmed
    pub mfa_verified: bool,
}

/// Request context supplied to verification
#[derive(Debug, Clone, Default)]
pub struct VerifyContext {
    /// IP address of the request being authorized
    pub ip_address: Option<String>,
    /// User agent of the request being authorized
    pub user_agent: Option<String>,
}

/// Service managing the full signed-credential lifecycle: issuance,
/// verification, refresh, revocation, and secret rotation.
///
/// Explicitly constructed and dependency-injected; multiple isolated
/// instances can coexist (one per test, one per tenant).
pub struct TokenService<S: SessionStore, R: RevocationStore> {
    pub(crate) sessions: Arc<S>,
    pub(crate) revocations: Arc<R>,
    pub(crate) secrets: Arc<SecretStore>,
    pub(crate) events: Arc<SecurityEventLog>,
    pub(crate) clock: Arc<dyn Clock>,
    pub(crate) config: TokenServiceConfig,
    pub(crate) validation: Validation,
    pub(crate) peek_validation: Validation,
    mfa: Option<Arc<dyn MfaProvider>>,
}

impl<S: SessionStore, R: RevocationStore> TokenService<S, R> {
    /// Creates a new token service instance.
    ///
    /// Expiry and not-before are validated against the injected clock
    /// rather than the JWT library's wall clock, so the whole lifecycle
    /// is deterministic under test.
    pub fn new(
        sessions: Arc<S>,
        revocations: Arc<R>,
        secrets: Arc<SecretStore>,
        events: Arc<SecurityEventLog>,
        clock: Arc<dyn Clock>,
        config: TokenServiceConfig,
    ) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_issuer(&[&config.issuer]);
        validation.set_audience(&[&config.audience]);
        validation.validate_exp = false;
        validation.validate_nbf = false;

        // Untrusted decode used only to read the declared secret version
        let mut peek_validation = Validation::new(Algorithm::HS256);
        peek_validation.insecure_disable_signature_validation();
        peek_validation.validate_exp = false;
        peek_validation.validate_nbf = false;
        peek_validation.validate_aud = false;
        peek_validation.required_spec_claims.clear();

        Self {
            sessions,
            revocations,
            secrets,
            events,
            clock,
            config,
            validation,
            peek_validation,
            mfa: None,
        }
    }

    /// Attach an MFA provider
    pub fn with_mfa_provider(mut self, provider: Arc<dyn MfaProvider>) -> Self {
        self.mfa = Some(provider);
        self
    }

    /// Mints an access/refresh token pair bound to a new session.
    ///
    /// Enforces the per-user concurrency cap by evicting the oldest
    /// active session before registering the new one.
    pub async fn issue(&self, payload: IssuePayload, options: IssueOptions) -> DomainResult<TokenPair> {
        if payload.email.is_empty() {
            return Err(DomainError::Validation {
                message: "email must not be empty".to_string(),
            });
        }
        if payload.role.is_empty() {
            return Err(DomainError::Validation {
                message: "role must not be empty".to_string(),
            });
        }
        if payload.permissions.is_empty() {
            return Err(DomainError::Validation {
                message: "permissions must not be empty".to_string(),
            });
        }

        let now = self.clock.now();
        self.enforce_session_cap(payload.user_id, &options).await?;

        let mut session = Session::new(payload.user_id, now).with_network_context(
            options.ip_address.clone(),
            options.user_agent.clone(),
        );
        if let Some(device_id) = &options.device_id {
            session = session.with_device(device_id.clone());
        }
        session.mfa_verified = options.mfa_verified;

        let session_id = session.session_id.clone();
        self.sessions.insert(session).await?;

        let pair = self.mint_pair(&payload, &session_id).await?;

        self.events
            .record(
                SecurityEvent::new(SecurityEventType::TokenIssued, now)
                    .with_user(payload.user_id)
                    .with_session(session_id)
                    .with_request_context(options.ip_address, options.user_agent),
            )
            .await;

        Ok(pair)
    }

    /// Mints a single-use token outside any session, for email
    /// verification or password reset flows.
    ///
    /// The payload is minimal: no role, no permissions, no session
    /// binding. Consumers revoke the token once used.
    pub async fn issue_single_use(
        &self,
        user_id: Uuid,
        purpose: SingleUsePurpose,
        ttl_seconds: i64,
    ) -> DomainResult<String> {
        let now = self.clock.now();
        let (ver, key) = self.secrets.current().await;

        let claims = Claims {
            sub: user_id.to_string(),
            email: String::new(),
            role: String::new(),
            permissions: Vec::new(),
            sid: None,
            token_type: purpose.token_type(),
            ver,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(ttl_seconds)).timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };
        let token = self.sign(&claims, &key)?;

        self.events
            .record(
                SecurityEvent::new(SecurityEventType::SingleUseTokenIssued, now)
                    .with_user(user_id)
                    .with_details(json!({ "purpose": purpose.token_type().as_str() })),
            )
            .await;

        Ok(token)
    }

    /// Consumes a refresh token and mints a new pair for the same session.
    ///
    /// Consumption is a single atomic check-then-blacklist, so two
    /// concurrent calls on the same token yield exactly one new pair;
    /// the loser observes `ConcurrencyConflict`. A failed verification
    /// short-circuits with no writes at all.
    pub async fn refresh(&self, refresh_token: &str, context: &VerifyContext) -> DomainResult<TokenPair> {
        let result = self.verify(refresh_token, TokenType::Refresh, context).await?;
        let claims = match (result.is_valid, result.claims) {
            (true, Some(claims)) => claims,
            _ => {
                return Err(DomainError::Token(
                    result.error.unwrap_or(TokenError::TokenMalformed),
                ))
            }
        };

        let now = self.clock.now();

        if self.config.rotate_refresh_tokens {
            let consumed = self
                .revocations
                .insert_if_absent(&Self::hash_token(refresh_token), now)
                .await?;
            if !consumed {
                return Err(DomainError::Token(TokenError::ConcurrencyConflict));
            }
        }

        let user_id = claims
            .user_id()
            .map_err(|_| DomainError::Token(TokenError::TokenMalformed))?;
        let session_id = claims.sid.clone().ok_or(DomainError::Token(TokenError::MissingClaim {
            claim: "sid".to_string(),
        }))?;

        // Reconstruct the issuance payload from the verified claims;
        // refresh tokens carry no permissions, so neither does the pair
        // minted here until the next full login.
        let payload = IssuePayload {
            user_id,
            email: claims.email,
            role: claims.role,
            permissions: claims.permissions,
        };
        let pair = self.mint_pair(&payload, &session_id).await?;

        self.events
            .record(
                SecurityEvent::new(SecurityEventType::TokenRefreshed, now)
                    .with_user(user_id)
                    .with_session(session_id)
                    .with_request_context(context.ip_address.clone(), context.user_agent.clone()),
            )
            .await;

        Ok(pair)
    }

    /// Blacklists a token before its natural expiry. Idempotent.
    ///
    /// Revokes the single token only; the session stays live for its
    /// other tokens. Session-wide invalidation is `revoke_all_sessions`.
    pub async fn revoke(&self, token: &str, reason: &str) -> DomainResult<()> {
        let now = self.clock.now();
        self.revocations
            .insert(&Self::hash_token(token), now)
            .await?;

        let mut event = SecurityEvent::new(SecurityEventType::TokenRevoked, now)
            .with_details(json!({ "reason": reason }));
        if let Ok(claims) = self.peek_claims(token) {
            if let Ok(user_id) = claims.user_id() {
                event = event.with_user(user_id);
            }
            if let Some(sid) = claims.sid {
                event = event.with_session(sid);
            }
        }
        self.events.record(event).await;

        Ok(())
    }

    /// Revokes the presented token and deactivates its session.
    pub async fn logout(&self, token: &str) -> DomainResult<()> {
        let now = self.clock.now();
        self.revocations
            .insert(&Self::hash_token(token), now)
            .await?;

        let mut event = SecurityEvent::new(SecurityEventType::Logout, now);
        if let Ok(claims) = self.peek_claims(token) {
            if let Ok(user_id) = claims.user_id() {
                event = event.with_user(user_id);
            }
            if let Some(sid) = claims.sid {
                self.sessions.deactivate(&sid).await?;
                event = event.with_session(sid);
            }
        }
        self.events.record(event).await;

        Ok(())
    }

    /// Deactivates every active session for a user.
    ///
    /// Incident-response operation: global logout, compromised account.
    /// Returns the number of sessions deactivated.
    pub async fn revoke_all_sessions(&self, user_id: Uuid, reason: &str) -> DomainResult<usize> {
        let now = self.clock.now();
        let count = self.sessions.deactivate_all_for_user(user_id).await?;

        info!(%user_id, count, reason, "all sessions revoked");
        self.events
            .record(
                SecurityEvent::new(SecurityEventType::MassRevocation, now)
                    .with_user(user_id)
                    .with_details(json!({ "reason": reason, "sessions": count })),
            )
            .await;

        Ok(count)
    }

    /// Rotates the signing secret immediately.
    ///
    /// Used on suspected compromise; scheduled rotation goes through the
    /// cleanup service. Returns the new secret version.
    pub async fn rotate_secret(&self) -> DomainResult<u32> {
        let version = self.secrets.rotate().await;
        self.events
            .record(
                SecurityEvent::new(SecurityEventType::SecretRotated, self.clock.now())
                    .with_details(json!({ "version": version })),
            )
            .await;
        Ok(version)
    }

    /// Confirms a second factor for a session via the injected provider.
    ///
    /// Returns `true` and marks the session MFA-verified when the code
    /// checks out. Fails if no provider was configured; there is no
    /// silent fallback.
    pub async fn verify_mfa(&self, session_id: &str, code: &str) -> DomainResult<bool> {
        let provider = self.mfa.as_ref().ok_or_else(|| DomainError::Internal {
            message: "no MFA provider configured".to_string(),
        })?;

        let session = self
            .sessions
            .get(session_id)
            .await?
            .filter(|s| s.is_active)
            .ok_or(DomainError::Token(TokenError::SessionInvalid))?;

        if !provider.verify_code(session.user_id, code).await? {
            return Ok(false);
        }

        self.sessions.mark_mfa_verified(session_id).await?;
        self.events
            .record(
                SecurityEvent::new(SecurityEventType::MfaVerified, self.clock.now())
                    .with_user(session.user_id)
                    .with_session(session_id),
            )
            .await;
        Ok(true)
    }

    /// Evicts oldest active sessions so the new one fits under the cap
    async fn enforce_session_cap(&self, user_id: Uuid, options: &IssueOptions) -> DomainResult<()> {
        if self.sessions.count_active(user_id).await? < self.config.max_concurrent_sessions {
            return Ok(());
        }

        let active = self.sessions.active_for_user(user_id).await?;
        let excess = (active.len() + 1).saturating_sub(self.config.max_concurrent_sessions);
        for victim in active.iter().take(excess) {
            self.sessions.deactivate(&victim.session_id).await?;
            self.events
                .record(
                    SecurityEvent::new(SecurityEventType::SessionEvicted, self.clock.now())
                        .with_user(user_id)
                        .with_session(victim.session_id.clone())
                        .with_request_context(options.ip_address.clone(), options.user_agent.clone())
                        .with_details(json!({ "reason": "concurrent session cap" })),
                )
                .await;
        }
        Ok(())
    }

    /// Signs an access/refresh pair bound to `session_id` with the
    /// current secret version.
    async fn mint_pair(&self, payload: &IssuePayload, session_id: &str) -> DomainResult<TokenPair> {
        let now = self.clock.now();
        let (ver, key) = self.secrets.current().await;

        let base = Claims {
            sub: payload.user_id.to_string(),
            email: payload.email.clone(),
            role: payload.role.clone(),
            permissions: payload.permissions.clone(),
            sid: Some(session_id.to_string()),
            token_type: TokenType::Access,
            ver,
            iat: now.timestamp(),
            exp: (now + Duration::seconds(self.config.access_token_expiry)).timestamp(),
            nbf: now.timestamp(),
            iss: self.config.issuer.clone(),
            aud: self.config.audience.clone(),
            jti: Uuid::new_v4().to_string(),
        };

        let access_token = self.sign(&base, &key)?;

        // Refresh claims drop the permission set to minimize the blast
        // radius of a leaked long-lived token
        let refresh_claims = Claims {
            permissions: Vec::new(),
            token_type: TokenType::Refresh,
            exp: (now + Duration::seconds(self.config.refresh_token_expiry)).timestamp(),
            jti: Uuid::new_v4().to_string(),
            ..base
        };
        let refresh_token = self.sign(&refresh_claims, &key)?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            access_expires_in: self.config.access_token_expiry,
            refresh_expires_in: self.config.refresh_token_expiry,
            session_id: session_id.to_string(),
        })
    }

    /// Encodes claims into a JWT
    fn sign(&self, claims: &Claims, key: &EncodingKey) -> DomainResult<String> {
        encode(&Header::new(Algorithm::HS256), claims, key)
            .map_err(|_| DomainError::Token(TokenError::TokenGenerationFailed))
    }

    /// Hash used to key the revocation registry; the registry never
    /// stores a usable credential.
    pub(crate) fn hash_token(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}
