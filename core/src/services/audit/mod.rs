//! Security event log: bounded in-memory trail plus external forwarding.

mod service;

pub use service::{SecurityEventLog, SecurityEventLogConfig, SecurityEventStats};
