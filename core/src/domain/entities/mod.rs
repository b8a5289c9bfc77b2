//! Domain entities representing the core lifecycle objects.

pub mod event;
pub mod session;
pub mod token;

// Re-export commonly used types
pub use event::{SecurityEvent, SecurityEventType, Severity};
pub use session::Session;
pub use token::{
    Claims, SingleUsePurpose, TokenPair, TokenType,
};
