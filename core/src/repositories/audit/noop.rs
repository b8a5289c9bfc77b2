//! No-op audit sink for deployments without an external audit pipeline.

use async_trait::async_trait;

use crate::domain::entities::event::SecurityEvent;
use crate::errors::DomainResult;

use super::r#trait::AuditSink;

/// Sink that drops every event.
///
/// The in-memory ring buffer of the event log still retains recent
/// events; only external forwarding is disabled.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

#[async_trait]
impl AuditSink for NoopAuditSink {
    async fn record(&self, _event: SecurityEvent) -> DomainResult<()> {
        Ok(())
    }
}
