//! Business services containing the token lifecycle logic.

pub mod audit;
pub mod mfa;
pub mod token;

// Re-export commonly used types
pub use audit::{SecurityEventLog, SecurityEventLogConfig, SecurityEventStats};
pub use mfa::{MfaEnrollment, MfaProvider};
pub use token::{
    Clock, IssueOptions, IssuePayload, ManualClock, SecretStore, SecurityWarning, SystemClock,
    TokenCleanupConfig, TokenCleanupService, TokenService, TokenServiceConfig,
    VerificationResult, VerifyContext,
};
