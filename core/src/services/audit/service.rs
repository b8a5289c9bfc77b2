//! Security event log service.
//!
//! Every component of the lifecycle engine records its security-relevant
//! actions here. Events land in a bounded ring buffer for health checks
//! and recent-activity inspection, and the full stream is forwarded to an
//! external [`AuditSink`] without blocking the caller.

use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::{debug, error, info, warn};

use crate::domain::entities::event::{SecurityEvent, Severity};
use crate::repositories::AuditSink;

/// Configuration for the security event log
#[derive(Debug, Clone)]
pub struct SecurityEventLogConfig {
    /// Maximum number of events retained in the ring buffer
    pub capacity: usize,
    /// Forward to the sink on a spawned task instead of awaiting inline.
    /// Disabled in tests for deterministic assertions.
    pub async_forwarding: bool,
}

impl Default for SecurityEventLogConfig {
    fn default() -> Self {
        Self {
            capacity: 1000,
            async_forwarding: true,
        }
    }
}

/// Counts of recorded events, for health checks
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityEventStats {
    /// Total events currently retained in the ring buffer
    pub total: usize,
    /// Counts by event type
    pub by_type: HashMap<&'static str, usize>,
    /// Counts by severity
    pub by_severity: HashMap<&'static str, usize>,
}

/// Append-only security event trail.
pub struct SecurityEventLog {
    recent: Mutex<VecDeque<SecurityEvent>>,
    sink: Arc<dyn AuditSink>,
    config: SecurityEventLogConfig,
}

impl SecurityEventLog {
    /// Create a new event log forwarding to the given sink
    pub fn new(sink: Arc<dyn AuditSink>, config: SecurityEventLogConfig) -> Self {
        Self {
            recent: Mutex::new(VecDeque::with_capacity(config.capacity)),
            sink,
            config,
        }
    }

    /// Record one event: trace it, retain it, forward it.
    ///
    /// Forwarding is best-effort; a failing sink is logged and never
    /// surfaces to the authentication path.
    pub async fn record(&self, event: SecurityEvent) {
        match event.severity {
            Severity::Low => debug!(
                event = event.event_type.as_str(),
                user = ?event.user_id,
                "security event"
            ),
            Severity::Medium => info!(
                event = event.event_type.as_str(),
                user = ?event.user_id,
                "security event"
            ),
            Severity::High => warn!(
                event = event.event_type.as_str(),
                user = ?event.user_id,
                "security event"
            ),
            Severity::Critical => error!(
                event = event.event_type.as_str(),
                user = ?event.user_id,
                "security event"
            ),
        }

        {
            let mut recent = self.recent.lock().await;
            if recent.len() == self.config.capacity {
                recent.pop_front();
            }
            recent.push_back(event.clone());
        }

        if self.config.async_forwarding {
            let sink = Arc::clone(&self.sink);
            tokio::spawn(async move {
                if let Err(e) = sink.record(event).await {
                    warn!("audit sink rejected event: {}", e);
                }
            });
        } else if let Err(e) = self.sink.record(event).await {
            warn!("audit sink rejected event: {}", e);
        }
    }

    /// Snapshot of the retained events, oldest first
    pub async fn recent(&self) -> Vec<SecurityEvent> {
        self.recent.lock().await.iter().cloned().collect()
    }

    /// Counts by type and severity over the retained events
    pub async fn stats(&self) -> SecurityEventStats {
        let recent = self.recent.lock().await;
        let mut stats = SecurityEventStats {
            total: recent.len(),
            ..Default::default()
        };
        for event in recent.iter() {
            *stats.by_type.entry(event.event_type.as_str()).or_default() += 1;
            *stats
                .by_severity
                .entry(event.severity.as_str())
                .or_default() += 1;
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::event::SecurityEventType;
    use crate::repositories::MemoryAuditSink;
    use chrono::Utc;

    fn sync_log(sink: Arc<MemoryAuditSink>, capacity: usize) -> SecurityEventLog {
        SecurityEventLog::new(
            sink,
            SecurityEventLogConfig {
                capacity,
                async_forwarding: false,
            },
        )
    }

    #[tokio::test]
    async fn test_events_are_forwarded_to_sink() {
        let sink = Arc::new(MemoryAuditSink::new());
        let log = sync_log(Arc::clone(&sink), 10);

        log.record(SecurityEvent::new(SecurityEventType::TokenIssued, Utc::now()))
            .await;
        log.record(SecurityEvent::new(SecurityEventType::TokenRevoked, Utc::now()))
            .await;

        let forwarded = sink.events().await;
        assert_eq!(forwarded.len(), 2);
        assert_eq!(forwarded[0].event_type, SecurityEventType::TokenIssued);
    }

    #[tokio::test]
    async fn test_ring_buffer_is_bounded() {
        let sink = Arc::new(MemoryAuditSink::new());
        let log = sync_log(Arc::clone(&sink), 3);

        for _ in 0..5 {
            log.record(SecurityEvent::new(SecurityEventType::TokenIssued, Utc::now()))
                .await;
        }

        // ring keeps only the newest 3; the sink saw the full stream
        assert_eq!(log.recent().await.len(), 3);
        assert_eq!(sink.events().await.len(), 5);
    }

    #[tokio::test]
    async fn test_stats_count_by_type_and_severity() {
        let sink = Arc::new(MemoryAuditSink::new());
        let log = sync_log(sink, 10);

        log.record(SecurityEvent::new(SecurityEventType::TokenIssued, Utc::now()))
            .await;
        log.record(SecurityEvent::new(SecurityEventType::TokenIssued, Utc::now()))
            .await;
        log.record(SecurityEvent::new(SecurityEventType::MassRevocation, Utc::now()))
            .await;

        let stats = log.stats().await;
        assert_eq!(stats.total, 3);
        assert_eq!(stats.by_type["TOKEN_ISSUED"], 2);
        assert_eq!(stats.by_severity["low"], 2);
        assert_eq!(stats.by_severity["critical"], 1);
    }
}
