//! Token entities for JWT-based authentication.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The role a token plays; must match the verification context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenType {
    /// Short-lived credential authorizing API calls
    Access,
    /// Long-lived credential used only to mint new access tokens
    Refresh,
    /// Single-use email verification token
    Verification,
    /// Single-use password reset token
    PasswordReset,
}

impl TokenType {
    /// String form used in security events and logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
            Self::Verification => "verification",
            Self::PasswordReset => "password_reset",
        }
    }
}

/// Purpose of a single-use token issued outside any session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SingleUsePurpose {
    EmailVerification,
    PasswordReset,
}

impl SingleUsePurpose {
    /// The token type minted for this purpose
    pub fn token_type(&self) -> TokenType {
        match self {
            Self::EmailVerification => TokenType::Verification,
            Self::PasswordReset => TokenType::PasswordReset,
        }
    }
}

/// Claims structure for the JWT payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,

    /// User email; empty for single-use tokens
    #[serde(default)]
    pub email: String,

    /// User role
    #[serde(default)]
    pub role: String,

    /// Granted permissions. Refresh tokens carry an empty set to
    /// minimize blast radius if one leaks.
    #[serde(default)]
    pub permissions: Vec<String>,

    /// Session this token is bound to; absent for single-use tokens
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sid: Option<String>,

    /// Role of this token in the lifecycle
    pub token_type: TokenType,

    /// Version of the signing secret used to sign this token
    pub ver: u32,

    /// Issued at timestamp
    pub iat: i64,

    /// Expiration timestamp
    pub exp: i64,

    /// Not before timestamp
    pub nbf: i64,

    /// Issuer
    pub iss: String,

    /// Audience
    pub aud: String,

    /// JWT ID (unique identifier for the token)
    pub jti: String,
}

impl Claims {
    /// Gets the user ID from the claims
    pub fn user_id(&self) -> Result<Uuid, uuid::Error> {
        Uuid::parse_str(&self.sub)
    }

    /// Checks expiry against the given instant
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        now.timestamp() >= self.exp
    }

    /// Remaining lifetime at the given instant, zero if already expired
    pub fn remaining_lifetime(&self, now: DateTime<Utc>) -> Duration {
        let remaining = self.exp - now.timestamp();
        if remaining > 0 {
            Duration::seconds(remaining)
        } else {
            Duration::zero()
        }
    }
}

/// Token pair returned to the client on issuance and refresh
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenPair {
    /// JWT access token
    pub access_token: String,

    /// JWT refresh token
    pub refresh_token: String,

    /// Access token expiry time in seconds
    pub access_expires_in: i64,

    /// Refresh token expiry time in seconds
    pub refresh_expires_in: i64,

    /// Session both tokens are bound to
    pub session_id: String,
}
