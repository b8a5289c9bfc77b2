//! Audit sink boundary for the security event log.

mod memory;
mod noop;
mod r#trait;

pub use memory::MemoryAuditSink;
pub use noop::NoopAuditSink;
pub use r#trait::AuditSink;
