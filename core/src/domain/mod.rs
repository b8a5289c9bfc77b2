//! Domain layer containing the entities of the token lifecycle.

pub mod entities;

// Re-export commonly used domain types
pub use entities::*;
