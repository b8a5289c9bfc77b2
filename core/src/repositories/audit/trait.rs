//! Audit sink trait: the explicit boundary external subscribers plug into.

use async_trait::async_trait;

use crate::domain::entities::event::SecurityEvent;
use crate::errors::DomainResult;

/// Destination for the full security event stream.
///
/// The event log forwards every recorded event here, best-effort and
/// without blocking the caller. Implementations typically ship events to
/// a SIEM, a database, or a message bus; failures are logged and dropped,
/// never propagated to the authentication path.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Persist or forward one event
    async fn record(&self, event: SecurityEvent) -> DomainResult<()>;
}
