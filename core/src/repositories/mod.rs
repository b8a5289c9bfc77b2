//! Storage capability interfaces and their in-memory implementations.
//!
//! The session and revocation registries are defined behind traits so a
//! multi-instance production deployment can plug in a shared external
//! store. The in-memory implementations shipped here are correct for a
//! single process and for tests; they are not a hidden limitation but a
//! documented constraint.

pub mod audit;
pub mod revocation;
pub mod session;

pub use audit::{AuditSink, MemoryAuditSink, NoopAuditSink};
pub use revocation::{InMemoryRevocationStore, RevocationStore};
pub use session::{InMemorySessionStore, SessionStore};
