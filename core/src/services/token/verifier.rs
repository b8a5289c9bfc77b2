//! Token verification: the ordered checks every presented token runs
//! through, and the structured result returned to the caller.

use chrono::Duration;
use jsonwebtoken::{decode, errors::ErrorKind, DecodingKey};
use serde_json::json;

use crate::domain::entities::event::{SecurityEvent, SecurityEventType};
use crate::domain::entities::token::{Claims, TokenType};
use crate::errors::{DomainResult, TokenError};
use crate::repositories::{RevocationStore, SessionStore};

use super::service::{TokenService, VerifyContext};

/// Non-fatal observation made during verification
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecurityWarning {
    /// Request IP differs from the IP recorded on the session
    IpMismatch { expected: String, actual: String },
    /// Request user agent differs from the one recorded on the session
    UserAgentMismatch,
}

/// Outcome of verifying a token.
///
/// Expected failures are carried here as values, never as `Err`; the
/// `Err` channel of [`TokenService::verify`] is reserved for
/// infrastructure faults, on which callers fail closed.
#[derive(Debug, Clone)]
pub struct VerificationResult {
    /// Whether the token is valid for the requested context
    pub is_valid: bool,
    /// Decoded claims, present only when valid
    pub claims: Option<Claims>,
    /// Failure cause, present only when invalid
    pub error: Option<TokenError>,
    /// Whether the token is close enough to expiry to refresh now
    pub should_refresh: bool,
    /// Non-fatal observations (IP/device drift)
    pub security_warnings: Vec<SecurityWarning>,
}

impl VerificationResult {
    fn failure(error: TokenError) -> Self {
        Self {
            is_valid: false,
            claims: None,
            error: Some(error),
            should_refresh: false,
            security_warnings: Vec::new(),
        }
    }
}

impl<S: SessionStore, R: RevocationStore> TokenService<S, R> {
    /// Validates a token for the given context.
    ///
    /// Checks run in order, each a possible terminal failure: revocation,
    /// secret version resolution, signature, expiry/not-before against
    /// the injected clock, token type, then session liveness. IP and
    /// user-agent drift against the session produce warnings, escalating
    /// to a hard `IpMismatch` failure only under strict IP validation.
    pub async fn verify(
        &self,
        token: &str,
        expected_type: TokenType,
        context: &VerifyContext,
    ) -> DomainResult<VerificationResult> {
        let now = self.clock.now();

        if self.revocations.contains(&Self::hash_token(token)).await? {
            return Ok(VerificationResult::failure(TokenError::TokenRevoked));
        }

        let declared_version = match self.peek_claims(token) {
            Ok(claims) => claims.ver,
            Err(error) => {
                self.record_verification_failure(&error, context).await;
                return Ok(VerificationResult::failure(error));
            }
        };
        let decoding_key = match self.secrets.decoding_key(declared_version).await {
            Ok(key) => key,
            Err(error) => return Ok(VerificationResult::failure(error)),
        };

        let claims = match decode::<Claims>(token, &decoding_key, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                let error = match e.kind() {
                    ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                    _ => TokenError::TokenMalformed,
                };
                self.record_verification_failure(&error, context).await;
                return Ok(VerificationResult::failure(error));
            }
        };

        if now.timestamp() < claims.nbf {
            return Ok(VerificationResult::failure(TokenError::TokenNotYetValid));
        }
        if claims.is_expired_at(now) {
            return Ok(VerificationResult::failure(TokenError::TokenExpired));
        }

        if claims.token_type != expected_type {
            return Ok(VerificationResult::failure(TokenError::TypeMismatch));
        }

        let mut warnings = Vec::new();
        if let Some(sid) = &claims.sid {
            let session = match self.sessions.get(sid).await? {
                Some(session) if session.is_active => session,
                _ => return Ok(VerificationResult::failure(TokenError::SessionInvalid)),
            };

            if let (Some(expected), Some(actual)) = (&session.ip_address, &context.ip_address) {
                if expected != actual {
                    warnings.push(SecurityWarning::IpMismatch {
                        expected: expected.clone(),
                        actual: actual.clone(),
                    });
                }
            }
            if let (Some(expected), Some(actual)) = (&session.user_agent, &context.user_agent) {
                if expected != actual {
                    warnings.push(SecurityWarning::UserAgentMismatch);
                }
            }

            if !warnings.is_empty() {
                self.events
                    .record(
                        SecurityEvent::new(SecurityEventType::SuspiciousActivity, now)
                            .with_user(session.user_id)
                            .with_session(sid.clone())
                            .with_request_context(
                                context.ip_address.clone(),
                                context.user_agent.clone(),
                            )
                            .with_details(json!({ "warnings": warnings.len() })),
                    )
                    .await;

                let hard_ip_failure = self.config.strict_ip_validation
                    && warnings
                        .iter()
                        .any(|w| matches!(w, SecurityWarning::IpMismatch { .. }));
                if hard_ip_failure {
                    return Ok(VerificationResult::failure(TokenError::IpMismatch));
                }
            }

            self.sessions.touch(sid, now).await?;
        }

        let should_refresh =
            claims.remaining_lifetime(now) < Duration::seconds(self.config.refresh_threshold);

        Ok(VerificationResult {
            is_valid: true,
            claims: Some(claims),
            error: None,
            should_refresh,
            security_warnings: warnings,
        })
    }

    /// Decodes claims without trusting them, only to learn which secret
    /// version the token declares. Never used for authorization.
    pub(crate) fn peek_claims(&self, token: &str) -> Result<Claims, TokenError> {
        decode::<Claims>(token, &DecodingKey::from_secret(&[]), &self.peek_validation)
            .map(|data| data.claims)
            .map_err(|_| TokenError::TokenMalformed)
    }

    /// Malformed or tampered tokens are security-relevant; expiry is not.
    async fn record_verification_failure(&self, error: &TokenError, context: &VerifyContext) {
        self.events
            .record(
                SecurityEvent::new(SecurityEventType::VerificationFailure, self.clock.now())
                    .with_request_context(context.ip_address.clone(), context.user_agent.clone())
                    .with_details(json!({ "error": error.to_string() })),
            )
            .await;
    }
}
