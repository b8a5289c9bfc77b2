//! Token lifecycle module
//!
//! This module handles all token-related operations:
//! - JWT access/refresh/single-use token issuance
//! - Token verification against the revocation and session registries
//! - Single-use refresh token rotation
//! - Versioned signing secret storage and rotation
//! - Background cleanup of sessions, blacklist entries, and old secrets

mod cleanup;
mod clock;
mod config;
mod secrets;
mod service;
mod verifier;

#[cfg(test)]
mod tests;

pub use cleanup::{CleanupResult, TokenCleanupConfig, TokenCleanupService};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::TokenServiceConfig;
pub use secrets::SecretStore;
pub use service::{IssueOptions, IssuePayload, TokenService, VerifyContext};
pub use verifier::{SecurityWarning, VerificationResult};
