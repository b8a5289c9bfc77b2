//! Authentication and token lifecycle configuration

use serde::{Deserialize, Serialize};

/// JWT token configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct JwtConfig {
    /// Access token expiry time in seconds
    pub access_token_expiry: i64,

    /// Refresh token expiry time in seconds
    pub refresh_token_expiry: i64,

    /// Remaining lifetime (seconds) under which verification
    /// recommends refreshing the access token
    pub refresh_threshold: i64,

    /// JWT issuer claim
    pub issuer: String,

    /// JWT audience claim
    pub audience: String,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            access_token_expiry: 900,     // 15 minutes
            refresh_token_expiry: 604800, // 7 days
            refresh_threshold: 300,       // 5 minutes
            issuer: String::from("keystone"),
            audience: String::from("keystone-api"),
        }
    }
}

impl JwtConfig {
    /// Set access token expiry in minutes
    pub fn with_access_expiry_minutes(mut self, minutes: i64) -> Self {
        self.access_token_expiry = minutes * 60;
        self
    }

    /// Set refresh token expiry in days
    pub fn with_refresh_expiry_days(mut self, days: i64) -> Self {
        self.refresh_token_expiry = days * 86400;
        self
    }
}

/// Session tracking configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Idle timeout in seconds before a session is swept
    pub idle_timeout: i64,

    /// Maximum concurrent active sessions per user; the oldest
    /// session is evicted when the cap is reached
    pub max_concurrent: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout: 86400, // 24 hours
            max_concurrent: 5,
        }
    }
}

/// Signing secret rotation configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RotationConfig {
    /// Interval in seconds between automatic rotations
    pub interval: i64,

    /// Grace period in seconds a superseded secret stays resolvable.
    /// Must be at least the access token expiry, or tokens signed
    /// moments before rotation would become unverifiable.
    pub grace_period: i64,

    /// Number of secret versions retained (minimum 2)
    pub retained_versions: usize,
}

impl Default for RotationConfig {
    fn default() -> Self {
        Self {
            interval: 2592000,   // 30 days
            grace_period: 86400, // 24 hours
            retained_versions: 3,
        }
    }
}

/// Security policy flags
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SecurityConfig {
    /// Treat an IP mismatch against the session as a hard verification
    /// failure instead of a soft warning (default: warning only)
    #[serde(default)]
    pub strict_ip_validation: bool,

    /// Consume refresh tokens on use so each can mint exactly one new pair
    #[serde(default = "default_true")]
    pub rotate_refresh_tokens: bool,

    /// Retention in seconds for revoked-token entries. Must exceed the
    /// refresh token expiry so a revoked token cannot expire out of the
    /// blacklist while still cryptographically valid.
    pub revocation_retention: i64,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            strict_ip_validation: false,
            rotate_refresh_tokens: true,
            revocation_retention: 1209600, // 14 days
        }
    }
}

/// Complete authentication configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthConfig {
    /// JWT configuration
    #[serde(default)]
    pub jwt: JwtConfig,

    /// Session configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Secret rotation configuration
    #[serde(default)]
    pub rotation: RotationConfig,

    /// Security policy flags
    #[serde(default)]
    pub security: SecurityConfig,
}

impl AuthConfig {
    /// Create from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            jwt: JwtConfig {
                access_token_expiry: env_i64("KS_ACCESS_TOKEN_EXPIRY", defaults.jwt.access_token_expiry),
                refresh_token_expiry: env_i64("KS_REFRESH_TOKEN_EXPIRY", defaults.jwt.refresh_token_expiry),
                refresh_threshold: env_i64("KS_REFRESH_THRESHOLD", defaults.jwt.refresh_threshold),
                issuer: std::env::var("KS_JWT_ISSUER").unwrap_or(defaults.jwt.issuer),
                audience: std::env::var("KS_JWT_AUDIENCE").unwrap_or(defaults.jwt.audience),
            },
            session: SessionConfig {
                idle_timeout: env_i64("KS_SESSION_IDLE_TIMEOUT", defaults.session.idle_timeout),
                max_concurrent: env_i64("KS_MAX_CONCURRENT_SESSIONS", defaults.session.max_concurrent as i64)
                    .max(1) as usize,
            },
            rotation: RotationConfig {
                interval: env_i64("KS_ROTATION_INTERVAL", defaults.rotation.interval),
                grace_period: env_i64("KS_ROTATION_GRACE_PERIOD", defaults.rotation.grace_period),
                retained_versions: env_i64("KS_RETAINED_SECRET_VERSIONS", defaults.rotation.retained_versions as i64)
                    .max(2) as usize,
            },
            security: SecurityConfig {
                strict_ip_validation: env_bool("KS_STRICT_IP_VALIDATION", defaults.security.strict_ip_validation),
                rotate_refresh_tokens: env_bool("KS_ROTATE_REFRESH_TOKENS", defaults.security.rotate_refresh_tokens),
                revocation_retention: env_i64("KS_REVOCATION_RETENTION", defaults.security.revocation_retention),
            },
        }
    }

    /// Check the cross-field invariants the lifecycle engine depends on.
    ///
    /// Returns a list of human-readable problems; empty means valid.
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.rotation.grace_period < self.jwt.access_token_expiry {
            problems.push(format!(
                "rotation grace period ({}s) is shorter than the access token expiry ({}s)",
                self.rotation.grace_period, self.jwt.access_token_expiry
            ));
        }

        if self.security.revocation_retention <= self.jwt.refresh_token_expiry {
            problems.push(format!(
                "revocation retention ({}s) must exceed the refresh token expiry ({}s)",
                self.security.revocation_retention, self.jwt.refresh_token_expiry
            ));
        }

        if self.rotation.retained_versions < 2 {
            problems.push("at least 2 secret versions must be retained for rotation grace".to_string());
        }

        if self.session.max_concurrent == 0 {
            problems.push("max_concurrent sessions must be at least 1".to_string());
        }

        problems
    }
}

fn env_i64(key: &str, default: i64) -> i64 {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn env_bool(key: &str, default: bool) -> bool {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

fn default_true() -> bool {
    true
}
