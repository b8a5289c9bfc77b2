//! Configuration types for the authentication core.

pub mod auth;

pub use auth::{AuthConfig, JwtConfig, RotationConfig, SecurityConfig, SessionConfig};
