//! Session registry: live-session tracking per user.

mod memory;
mod r#trait;

pub use memory::InMemorySessionStore;
pub use r#trait::SessionStore;
