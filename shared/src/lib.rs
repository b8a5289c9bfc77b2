//! Shared configuration types for the Keystone authentication core
//!
//! This crate provides the configuration surface consumed by `ks_core`:
//! - JWT signing and expiry settings
//! - Session tracking limits
//! - Secret rotation cadence
//! - Security policy flags

pub mod config;

// Re-export commonly used items at crate root
pub use config::{
    AuthConfig, JwtConfig, RotationConfig, SecurityConfig, SessionConfig,
};
