//! # Keystone Core
//!
//! Token lifecycle engine for the Keystone authentication platform.
//! This crate contains the domain entities, the token issuance /
//! verification / refresh services, the session and revocation
//! registries, the security event log, and the cleanup scheduler.

pub mod domain;
pub mod errors;
pub mod repositories;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::*;
pub use errors::*;
pub use repositories::*;
pub use services::*;
