//! Revocation registry: blacklist of tokens invalidated before expiry.

mod memory;
mod r#trait;

pub use memory::InMemoryRevocationStore;
pub use r#trait::RevocationStore;
