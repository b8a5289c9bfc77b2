//! Token lifecycle error taxonomy
//!
//! Expected authentication failures are carried as values inside
//! `VerificationResult` rather than panics or faults, so the HTTP
//! boundary can map them to status codes without stack traces.
//! Infrastructure faults (storage unreachable) use `DomainError`
//! directly and the caller fails closed.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "code")]
pub enum TokenError {
    /// Token lifetime elapsed; recoverable via the refresh flow
    #[error("Token expired")]
    TokenExpired,

    /// Token was explicitly invalidated before natural expiry
    #[error("Token revoked")]
    TokenRevoked,

    /// Token `nbf` lies in the future
    #[error("Token not yet valid")]
    TokenNotYetValid,

    /// Token could not be decoded into claims
    #[error("Malformed token")]
    TokenMalformed,

    /// Signature check failed; possible tampering
    #[error("Token signature verification failed")]
    InvalidSignature,

    /// Session referenced by the token is missing or inactive
    #[error("Session invalid")]
    SessionInvalid,

    /// Token type does not match the verification context
    #[error("Token type mismatch")]
    TypeMismatch,

    /// The signing secret version the token references has been pruned.
    /// Permanent: tokens of that version can never verify again.
    #[error("Signing secret version {version} is no longer available")]
    SecretUnavailable { version: u32 },

    /// Lost a refresh race; the caller may retry with a fresh token
    #[error("Concurrent token consumption detected")]
    ConcurrencyConflict,

    /// Request IP does not match the session under strict validation
    #[error("IP address mismatch")]
    IpMismatch,

    /// Signing or encoding the token failed
    #[error("Token generation failed")]
    TokenGenerationFailed,

    /// A required claim is absent
    #[error("Missing claim: {claim}")]
    MissingClaim { claim: String },
}

impl TokenError {
    /// Whether the caller can recover by running the refresh flow
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::TokenExpired | Self::ConcurrencyConflict)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expired_is_recoverable() {
        assert!(TokenError::TokenExpired.is_recoverable());
        assert!(TokenError::ConcurrencyConflict.is_recoverable());
    }

    #[test]
    fn test_terminal_errors_are_not_recoverable() {
        assert!(!TokenError::TokenRevoked.is_recoverable());
        assert!(!TokenError::SecretUnavailable { version: 1 }.is_recoverable());
        assert!(!TokenError::TypeMismatch.is_recoverable());
    }

    #[test]
    fn test_error_serialization_carries_code() {
        let json = serde_json::to_string(&TokenError::SecretUnavailable { version: 3 }).unwrap();
        assert!(json.contains("secret_unavailable"));
        assert!(json.contains("3"));
    }
}
