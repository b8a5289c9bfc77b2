//! Recording audit sink used in tests and examples.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::domain::entities::event::{SecurityEvent, SecurityEventType};
use crate::errors::DomainResult;

use super::r#trait::AuditSink;

/// Sink that appends every event to an in-memory list.
#[derive(Clone, Default)]
pub struct MemoryAuditSink {
    events: Arc<Mutex<Vec<SecurityEvent>>>,
}

impl MemoryAuditSink {
    /// Create a new empty sink
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all recorded events
    pub async fn events(&self) -> Vec<SecurityEvent> {
        self.events.lock().await.clone()
    }

    /// Events of a given type, in arrival order
    pub async fn events_of_type(&self, event_type: SecurityEventType) -> Vec<SecurityEvent> {
        self.events
            .lock()
            .await
            .iter()
            .filter(|e| e.event_type == event_type)
            .cloned()
            .collect()
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, event: SecurityEvent) -> DomainResult<()> {
        self.events.lock().await.push(event);
        Ok(())
    }
}
