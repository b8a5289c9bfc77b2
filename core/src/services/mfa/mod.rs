//! Pluggable multi-factor authentication boundary.
//!
//! The core never generates or checks one-time codes itself; a provider
//! is injected explicitly at construction. There is deliberately no
//! built-in fallback: a deployment without a provider simply cannot
//! confirm a second factor, it never gets mock crypto behavior.

use async_trait::async_trait;
use uuid::Uuid;

use crate::errors::DomainResult;

/// Material returned when enrolling a user in MFA
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MfaEnrollment {
    /// Shared secret to store against the user
    pub secret: String,
    /// Provisioning URL the client renders as a QR code
    pub otpauth_url: String,
}

/// Provider of time-based one-time code generation and verification.
#[async_trait]
pub trait MfaProvider: Send + Sync {
    /// Create a new shared secret for a user
    async fn generate_secret(&self, user_id: Uuid) -> DomainResult<MfaEnrollment>;

    /// Check a one-time code against the user's enrolled secret
    async fn verify_code(&self, user_id: Uuid, code: &str) -> DomainResult<bool>;
}
