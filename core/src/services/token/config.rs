//! Configuration for the token service

use ks_shared::AuthConfig;

/// Configuration for the token service
#[derive(Debug, Clone)]
pub struct TokenServiceConfig {
    /// JWT issuer claim
    pub issuer: String,
    /// JWT audience claim
    pub audience: String,
    /// Access token expiry in seconds
    pub access_token_expiry: i64,
    /// Refresh token expiry in seconds
    pub refresh_token_expiry: i64,
    /// Remaining lifetime (seconds) under which verification sets
    /// `should_refresh`
    pub refresh_threshold: i64,
    /// Maximum concurrent active sessions per user
    pub max_concurrent_sessions: usize,
    /// Treat an IP mismatch as a hard failure instead of a warning
    pub strict_ip_validation: bool,
    /// Consume refresh tokens on use (single-use rotation)
    pub rotate_refresh_tokens: bool,
}

impl Default for TokenServiceConfig {
    fn default() -> Self {
        Self {
            issuer: "keystone".to_string(),
            audience: "keystone-api".to_string(),
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            refresh_threshold: 300,       // 5 minutes
            max_concurrent_sessions: 5,
            strict_ip_validation: false,
            rotate_refresh_tokens: true,
        }
    }
}

impl From<&AuthConfig> for TokenServiceConfig {
    fn from(config: &AuthConfig) -> Self {
        Self {
            issuer: config.jwt.issuer.clone(),
            audience: config.jwt.audience.clone(),
            access_token_expiry: config.jwt.access_token_expiry,
            refresh_token_expiry: config.jwt.refresh_token_expiry,
            refresh_threshold: config.jwt.refresh_threshold,
            max_concurrent_sessions: config.session.max_concurrent,
            strict_ip_validation: config.security.strict_ip_validation,
            rotate_refresh_tokens: config.security.rotate_refresh_tokens,
        }
    }
}
